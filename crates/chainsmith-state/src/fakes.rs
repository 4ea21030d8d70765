//! In-memory fake for the registry trait (testing only)
//!
//! `MemoryRegistry` satisfies the `DeploymentRegistry` contract without any
//! external dependencies. It is not durable; use `SurrealRegistry` outside of
//! tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::registry::{ComponentName, DeploymentRecord, DeploymentRegistry, StorageResult};

/// In-memory registry backed by a `HashMap<name, DeploymentRecord>`.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    records: Mutex<HashMap<String, DeploymentRecord>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the registry with pre-existing records (simulates a prior run).
    pub fn with_records(records: impl IntoIterator<Item = DeploymentRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|r| (r.name.as_str().to_string(), r))
            .collect();
        Self {
            records: Mutex::new(map),
        }
    }
}

#[async_trait]
impl DeploymentRegistry for MemoryRegistry {
    async fn lookup(&self, name: &ComponentName) -> StorageResult<Option<DeploymentRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records.get(name.as_str()).cloned())
    }

    async fn record(&self, record: DeploymentRecord) -> StorageResult<()> {
        let mut records = self.records.lock().unwrap();
        if let Some(existing) = records.get(record.name.as_str()) {
            if existing.same_deployment(&record) {
                return Err(StorageError::AlreadyRecorded {
                    name: record.name.as_str().to_string(),
                });
            }
            return Err(StorageError::RecordConflict {
                name: record.name.as_str().to_string(),
            });
        }
        records.insert(record.name.as_str().to_string(), record);
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<DeploymentRecord>> {
        let records = self.records.lock().unwrap();
        let mut all: Vec<DeploymentRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        Ok(all)
    }
}
