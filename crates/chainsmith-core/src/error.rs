//! Error taxonomy for the provisioning orchestrator
//!
//! Every variant is fatal to the run. Prior steps' mutations are already
//! durably committed on-chain, so there is no rollback; the remedy is
//! operator intervention followed by a resumed run, which skips completed
//! steps via the registry checkpoints.

use thiserror::Error;

use crate::chain::ChainError;
use chainsmith_state::StorageError;

/// Errors that abort a provisioning run
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// A step requires a component that is not in the registry.
    #[error("step '{step}': prerequisite component '{name}' is not in the registry")]
    PrerequisiteMissing { step: String, name: String },

    /// A post-condition failed after a mutation.
    #[error("verification failed on {component}.{method}: expected {expected}, got {actual}")]
    Verification {
        component: String,
        method: String,
        expected: String,
        actual: String,
    },

    /// A deployment or wiring transaction was rejected. Never retried:
    /// replaying identical arguments against unchanged remote state would
    /// revert identically.
    #[error("transaction rejected on {component}.{method}: {reason}")]
    Transaction {
        component: String,
        method: String,
        reason: String,
    },

    /// Registry failure, including write conflicts on an inconsistent or
    /// concurrently modified registry.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Chain client failure other than a rejected transaction.
    #[error("chain client error: {0}")]
    Chain(#[from] ChainError),

    /// No address is configured for a named role.
    #[error("no address configured for role '{role}'")]
    UnknownRole { role: String },

    /// A role resolved to the zero address at the point of use.
    #[error("role '{role}' resolves to the zero address")]
    ZeroAddressRole { role: String },

    /// A remote call exceeded the configured confirmation timeout.
    #[error("remote call timed out: {operation}")]
    Timeout { operation: String },

    /// Source verification submission failed.
    #[error("verification submission for '{component}' failed: {reason}")]
    Submission { component: String, reason: String },

    /// Invalid deployment configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for chainsmith-core operations
pub type Result<T> = std::result::Result<T, ProvisionError>;
