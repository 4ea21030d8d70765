//! SurrealDB-backed registry implementation
//!
//! Stores one row per logical component name, converting between the flat
//! database row and `DeploymentRecord` at the boundary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::migrations;
use crate::registry::{
    ComponentName, DeploymentRecord, DeploymentRegistry, ProxyInfo, ProxyKind, StorageResult,
};

/// Database row for a deployment record.
///
/// Addresses are stored as 0x-prefixed lowercase hex strings so they stay
/// queryable and human-readable in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DeploymentRow {
    name: String,
    address: String,
    artifact: String,
    proxy_kind: Option<String>,
    proxy_admin: Option<String>,
    implementation: Option<String>,
    created_at: DateTime<Utc>,
}

impl DeploymentRow {
    fn from_record(record: &DeploymentRecord) -> Self {
        DeploymentRow {
            name: record.name.as_str().to_string(),
            address: encode_address(&record.address),
            artifact: record.artifact.clone(),
            proxy_kind: record.proxy.as_ref().map(|p| p.kind.as_str().to_string()),
            proxy_admin: record
                .proxy
                .as_ref()
                .and_then(|p| p.admin.as_ref())
                .map(encode_address),
            implementation: record
                .proxy
                .as_ref()
                .map(|p| encode_address(&p.implementation)),
            created_at: record.created_at,
        }
    }

    fn into_record(self) -> StorageResult<DeploymentRecord> {
        let proxy = match (self.proxy_kind, self.implementation) {
            (Some(kind), Some(implementation)) => Some(ProxyInfo {
                kind: kind.parse::<ProxyKind>()?,
                admin: self.proxy_admin.as_deref().map(decode_address).transpose()?,
                implementation: decode_address(&implementation)?,
            }),
            _ => None,
        };

        Ok(DeploymentRecord {
            name: ComponentName::new(self.name),
            address: decode_address(&self.address)?,
            artifact: self.artifact,
            proxy,
            created_at: self.created_at,
        })
    }
}

fn encode_address(addr: &Address) -> String {
    format!("{addr:?}")
}

fn decode_address(s: &str) -> StorageResult<Address> {
    s.parse::<Address>()
        .map_err(|_| StorageError::InvalidAddress {
            value: s.to_string(),
        })
}

/// SurrealDB-backed implementation of [`DeploymentRegistry`].
pub struct SurrealRegistry {
    db: Surreal<Any>,
}

impl SurrealRegistry {
    /// Create an in-memory instance for testing.
    ///
    /// Connects to `mem://`, selects `chainsmith/deployments`, and runs
    /// `init_schema`.
    pub async fn in_memory() -> crate::Result<Self> {
        Self::open("mem://").await
    }

    /// Connect to the given SurrealDB endpoint and initialize the schema.
    pub async fn open(url: &str) -> crate::Result<Self> {
        let db = surrealdb::engine::any::connect(url)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        db.use_ns("chainsmith")
            .use_db("deployments")
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        migrations::init_schema(&db).await?;

        info!("SurrealRegistry connected ({})", url);
        Ok(Self { db })
    }

    /// Create from the environment.
    ///
    /// Uses `CHAINSMITH_REGISTRY_URL` when set; otherwise falls back to local
    /// persistence in `.chainsmith/registry`.
    pub async fn from_env() -> crate::Result<Self> {
        if let Ok(url) = std::env::var("CHAINSMITH_REGISTRY_URL") {
            return Self::open(&url).await;
        }

        let path = ".chainsmith/registry";
        std::fs::create_dir_all(path).map_err(|e| {
            StorageError::Connection(format!("Failed to create registry directory {path}: {e}"))
        })?;
        let url = format!("surrealkv://{path}");
        info!("CHAINSMITH_REGISTRY_URL not set, using local persistence: {url}");
        Self::open(&url).await
    }

    async fn fetch_row(&self, name: &str) -> StorageResult<Option<DeploymentRow>> {
        let name_owned = name.to_string();
        let mut res = self
            .db
            .query("SELECT * FROM deployments WHERE name = $name")
            .bind(("name", name_owned))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<DeploymentRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl DeploymentRegistry for SurrealRegistry {
    async fn lookup(&self, name: &ComponentName) -> StorageResult<Option<DeploymentRecord>> {
        match self.fetch_row(name.as_str()).await? {
            Some(row) => Ok(Some(row.into_record()?)),
            None => Ok(None),
        }
    }

    async fn record(&self, record: DeploymentRecord) -> StorageResult<()> {
        if let Some(existing) = self.lookup(&record.name).await? {
            if existing.same_deployment(&record) {
                return Err(StorageError::AlreadyRecorded {
                    name: record.name.as_str().to_string(),
                });
            }
            return Err(StorageError::RecordConflict {
                name: record.name.as_str().to_string(),
            });
        }

        debug!(component = %record.name, address = %encode_address(&record.address), "recording deployment");

        let row = DeploymentRow::from_record(&record);
        let _created: Option<DeploymentRow> = self
            .db
            .create("deployments")
            .content(row)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<DeploymentRecord>> {
        let mut res = self
            .db
            .query("SELECT * FROM deployments ORDER BY name ASC")
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<DeploymentRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        rows.into_iter().map(DeploymentRow::into_record).collect()
    }
}
