//! Registry trait definition and deployment records
//!
//! The registry is the durable checkpoint store of the provisioning
//! orchestrator: one record per logical component name, written once when the
//! component is deployed and read many times afterwards. Its durability across
//! process restarts is what makes repeated orchestrator runs resumable instead
//! of re-executing completed work.
//!
//! An in-memory fake is provided for testing via the `fakes` module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Result type for registry operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Logical name of a deployed component (e.g. "StakingManager").
///
/// Names key the registry; once a record exists for a name, its address never
/// changes except through an explicit upgrade step outside this crate's scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentName(String);

impl ComponentName {
    pub fn new(name: impl Into<String>) -> Self {
        ComponentName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ComponentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ComponentName {
    fn from(s: &str) -> Self {
        ComponentName(s.to_string())
    }
}

/// Proxy pattern used for an upgradeable deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyKind {
    /// UUPS: upgrade logic lives in the implementation.
    Uups,
    /// Transparent proxy with a separate admin contract.
    Transparent,
}

impl ProxyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyKind::Uups => "uups",
            ProxyKind::Transparent => "transparent",
        }
    }
}

impl std::str::FromStr for ProxyKind {
    type Err = StorageError;

    fn from_str(s: &str) -> StorageResult<Self> {
        match s {
            "uups" => Ok(ProxyKind::Uups),
            "transparent" => Ok(ProxyKind::Transparent),
            other => Err(StorageError::UnknownProxyKind {
                value: other.to_string(),
            }),
        }
    }
}

/// Proxy metadata attached to an upgradeable deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyInfo {
    pub kind: ProxyKind,
    /// Admin contract, if the proxy kind uses one.
    pub admin: Option<Address>,
    /// Current implementation behind the proxy.
    pub implementation: Address,
}

/// A single deployment record: the durable result of provisioning one
/// component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// Logical name keying this record.
    pub name: ComponentName,
    /// Address callers interact with (the proxy for upgradeable components).
    pub address: Address,
    /// Reference to the ABI / interface descriptor artifact.
    pub artifact: String,
    /// Proxy metadata; `None` for components deployed without a proxy
    /// (e.g. tokens created by another component's initializer).
    pub proxy: Option<ProxyInfo>,
    /// When the record was written.
    pub created_at: DateTime<Utc>,
}

impl DeploymentRecord {
    /// Whether two records describe the same deployment.
    ///
    /// `created_at` is excluded: two writers racing to record the same
    /// deployment may observe different timestamps.
    pub fn same_deployment(&self, other: &DeploymentRecord) -> bool {
        self.name == other.name
            && self.address == other.address
            && self.artifact == other.artifact
            && self.proxy == other.proxy
    }
}

/// Durable component registry.
///
/// Guarantees:
/// - `lookup` has no side effects.
/// - `record` is write-once per name: a second write for the same name fails
///   with `AlreadyRecorded` (identical value) or `RecordConflict` (different
///   value) and never overwrites.
/// - Records survive process restarts (backend permitting).
#[async_trait]
pub trait DeploymentRegistry: Send + Sync {
    /// Look up the record for a logical name, if one exists.
    async fn lookup(&self, name: &ComponentName) -> StorageResult<Option<DeploymentRecord>>;

    /// Record a new deployment. Write-once per name.
    async fn record(&self, record: DeploymentRecord) -> StorageResult<()>;

    /// All records currently in the registry.
    async fn list(&self) -> StorageResult<Vec<DeploymentRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, addr: u64) -> DeploymentRecord {
        DeploymentRecord {
            name: ComponentName::new(name),
            address: Address::from_low_u64_be(addr),
            artifact: format!("{name}.json"),
            proxy: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn same_deployment_ignores_timestamp() {
        let mut a = record("StakingManager", 1);
        let b = record("StakingManager", 1);
        a.created_at = Utc::now() - chrono::Duration::hours(1);
        assert!(a.same_deployment(&b));
    }

    #[test]
    fn same_deployment_detects_address_change() {
        let a = record("StakingManager", 1);
        let b = record("StakingManager", 2);
        assert!(!a.same_deployment(&b));
    }

    #[test]
    fn proxy_kind_round_trips_as_str() {
        for kind in [ProxyKind::Uups, ProxyKind::Transparent] {
            let parsed: ProxyKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("delegate".parse::<ProxyKind>().is_err());
    }
}
