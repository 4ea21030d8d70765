//! Contract tests for the DeploymentRegistry trait.
//!
//! These verify the behavioral contract (point lookups, write-once records,
//! conflict detection) against both the in-memory fake and the SurrealDB
//! backend. Any conforming implementation must pass these.

use chrono::Utc;
use ethers::types::Address;

use chainsmith_state::fakes::MemoryRegistry;
use chainsmith_state::{
    ComponentName, DeploymentRecord, DeploymentRegistry, ProxyInfo, ProxyKind, StorageError,
    SurrealRegistry,
};

fn record(name: &str, addr: u64) -> DeploymentRecord {
    DeploymentRecord {
        name: ComponentName::new(name),
        address: Address::from_low_u64_be(addr),
        artifact: format!("{name}.json"),
        proxy: Some(ProxyInfo {
            kind: ProxyKind::Uups,
            admin: None,
            implementation: Address::from_low_u64_be(addr + 1),
        }),
        created_at: Utc::now(),
    }
}

async fn lookup_absent_returns_none(registry: &dyn DeploymentRegistry) {
    let found = registry
        .lookup(&ComponentName::new("Nonexistent"))
        .await
        .unwrap();
    assert!(found.is_none());
}

async fn record_then_lookup(registry: &dyn DeploymentRegistry) {
    let rec = record("StakingManager", 0x10);
    registry.record(rec.clone()).await.unwrap();

    let found = registry.lookup(&rec.name).await.unwrap().expect("record");
    assert_eq!(found.address, rec.address);
    assert_eq!(found.artifact, rec.artifact);
    assert_eq!(found.proxy, rec.proxy);
}

async fn duplicate_identical_is_already_recorded(registry: &dyn DeploymentRegistry) {
    let rec = record("DepositManager", 0x20);
    registry.record(rec.clone()).await.unwrap();

    let err = registry.record(rec).await.unwrap_err();
    assert!(matches!(err, StorageError::AlreadyRecorded { .. }));
}

async fn duplicate_differing_is_conflict(registry: &dyn DeploymentRegistry) {
    let rec = record("EthStrategy", 0x30);
    registry.record(rec.clone()).await.unwrap();

    let mut other = rec;
    other.address = Address::from_low_u64_be(0x99);
    let err = registry.record(other).await.unwrap_err();
    assert!(matches!(err, StorageError::RecordConflict { .. }));
}

async fn conflict_does_not_overwrite(registry: &dyn DeploymentRegistry) {
    let rec = record("WrappedEth", 0x40);
    registry.record(rec.clone()).await.unwrap();

    let mut other = rec.clone();
    other.address = Address::from_low_u64_be(0x41);
    let _ = registry.record(other).await;

    let found = registry.lookup(&rec.name).await.unwrap().expect("record");
    assert_eq!(found.address, rec.address);
}

async fn list_returns_all_records(registry: &dyn DeploymentRegistry) {
    registry.record(record("Alpha", 1)).await.unwrap();
    registry.record(record("Beta", 2)).await.unwrap();

    let all = registry.list().await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|r| r.name.as_str() == "Alpha"));
    assert!(all.iter().any(|r| r.name.as_str() == "Beta"));
}

// ---------------------------------------------------------------------------
// MemoryRegistry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn memory_lookup_absent() {
    lookup_absent_returns_none(&MemoryRegistry::new()).await;
}

#[tokio::test]
async fn memory_record_then_lookup() {
    record_then_lookup(&MemoryRegistry::new()).await;
}

#[tokio::test]
async fn memory_duplicate_identical() {
    duplicate_identical_is_already_recorded(&MemoryRegistry::new()).await;
}

#[tokio::test]
async fn memory_duplicate_differing() {
    duplicate_differing_is_conflict(&MemoryRegistry::new()).await;
}

#[tokio::test]
async fn memory_conflict_does_not_overwrite() {
    conflict_does_not_overwrite(&MemoryRegistry::new()).await;
}

#[tokio::test]
async fn memory_list_all() {
    list_returns_all_records(&MemoryRegistry::new()).await;
}

#[tokio::test]
async fn memory_with_records_seeds_state() {
    let rec = record("StakingManager", 0x10);
    let registry = MemoryRegistry::with_records([rec.clone()]);
    let found = registry.lookup(&rec.name).await.unwrap().expect("seeded");
    assert_eq!(found.address, rec.address);
}

// ---------------------------------------------------------------------------
// SurrealRegistry (in-memory engine)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn surreal_lookup_absent() {
    let registry = SurrealRegistry::in_memory().await.unwrap();
    lookup_absent_returns_none(&registry).await;
}

#[tokio::test]
async fn surreal_record_then_lookup() {
    let registry = SurrealRegistry::in_memory().await.unwrap();
    record_then_lookup(&registry).await;
}

#[tokio::test]
async fn surreal_duplicate_identical() {
    let registry = SurrealRegistry::in_memory().await.unwrap();
    duplicate_identical_is_already_recorded(&registry).await;
}

#[tokio::test]
async fn surreal_duplicate_differing() {
    let registry = SurrealRegistry::in_memory().await.unwrap();
    duplicate_differing_is_conflict(&registry).await;
}

#[tokio::test]
async fn surreal_conflict_does_not_overwrite() {
    let registry = SurrealRegistry::in_memory().await.unwrap();
    conflict_does_not_overwrite(&registry).await;
}

#[tokio::test]
async fn surreal_list_all() {
    let registry = SurrealRegistry::in_memory().await.unwrap();
    list_returns_all_records(&registry).await;
}

#[tokio::test]
async fn surreal_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("surrealkv://{}", dir.path().join("registry").display());

    {
        let registry = SurrealRegistry::open(&url).await.unwrap();
        registry.record(record("StakingManager", 0x10)).await.unwrap();
    }

    let registry = SurrealRegistry::open(&url).await.unwrap();
    let found = registry
        .lookup(&ComponentName::new("StakingManager"))
        .await
        .unwrap()
        .expect("record survives reopen");
    assert_eq!(found.address, Address::from_low_u64_be(0x10));
}

#[tokio::test]
async fn surreal_preserves_non_proxy_records() {
    let registry = SurrealRegistry::in_memory().await.unwrap();
    let rec = DeploymentRecord {
        name: ComponentName::new("WrappedEth"),
        address: Address::from_low_u64_be(0x50),
        artifact: "WrappedToken.json".to_string(),
        proxy: None,
        created_at: Utc::now(),
    };
    registry.record(rec.clone()).await.unwrap();

    let found = registry.lookup(&rec.name).await.unwrap().expect("record");
    assert!(found.proxy.is_none());
    assert_eq!(found.address, rec.address);
}
