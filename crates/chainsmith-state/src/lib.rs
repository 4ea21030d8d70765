//! Chainsmith-State: durable component registry
//!
//! This crate provides the persistence layer for the provisioning
//! orchestrator: a write-once registry mapping logical component names to
//! their deployment records (address, interface artifact, proxy metadata).
//!
//! The registry is the durable checkpoint that makes orchestrator runs
//! idempotent and resumable: repeated invocations consult it before deploying
//! or initializing anything, and completed steps are never re-executed.
//!
//! ## Key components
//!
//! - [`DeploymentRegistry`]: the async registry trait
//! - [`SurrealRegistry`]: SurrealDB-backed durable implementation
//! - [`fakes::MemoryRegistry`]: in-memory fake for tests

mod error;
pub mod fakes;
mod migrations;
mod registry;
mod surreal_registry;

pub use error::StorageError;
pub use registry::{
    ComponentName, DeploymentRecord, DeploymentRegistry, ProxyInfo, ProxyKind, StorageResult,
};
pub use surreal_registry::SurrealRegistry;

/// Result type for chainsmith-state operations
pub type Result<T> = std::result::Result<T, StorageError>;
