//! Chainsmith Core Library
//!
//! Idempotent, resumable, fail-fast provisioning of an interdependent set of
//! upgradeable on-chain components. The orchestrator interprets a declarative
//! [`plan::ProvisionPlan`] against a durable deployment registry: completed
//! deployments are skipped via registry checkpoints, wiring stages are
//! skipped when their post-conditions already hold, and the first failed
//! invariant aborts the run.

pub mod accounts;
pub mod args;
pub mod chain;
pub mod config;
pub mod context;
pub mod deployer;
pub mod error;
pub mod fakes;
pub mod orchestrator;
pub mod plan;
pub mod staking;
pub mod submitter;
pub mod verifier;
pub mod wiring;

pub use accounts::{NamedAccounts, Role};
pub use args::Arg;
pub use chain::{
    ChainClient, ChainError, ChainResult, DeployedProxy, Method, ProxyDeployment, TxConfirmation,
};
pub use config::ProvisionConfig;
pub use context::ProvisionContext;
pub use deployer::ProxyDeployer;
pub use error::{ProvisionError, Result};
pub use orchestrator::{Orchestrator, RunReport, StepAction, StepReport};
pub use plan::{
    ComponentProvision, DerivedRecord, ProvisionPlan, StepSpec, StrategyProvision, WiringCall,
    WiringStage,
};
pub use submitter::{
    SubmissionReport, SubmissionStatus, TokenVerification, VerificationSubmitter, VerifierConfig,
};
pub use verifier::{Expectation, Expected, InvariantVerifier, PostCondition, StateQuery};
pub use wiring::WiringExecutor;

pub use chainsmith_state::{
    ComponentName, DeploymentRecord, DeploymentRegistry, ProxyInfo, ProxyKind, SurrealRegistry,
};
