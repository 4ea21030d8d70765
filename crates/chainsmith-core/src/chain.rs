//! Remote state client boundary
//!
//! Abstracts the chain as "read method M with args A on component C"
//! (non-mutating) and "call method M with args A on component C, as sender S"
//! (mutating, confirmed or rejected). The concrete wire protocol is an
//! external collaborator; implementations are injected through [`ChainClient`].
//!
//! Orchestration code never handles raw method-name strings: methods are
//! wrapped in the [`Method`] newtype and declared once, next to the plan that
//! uses them.

use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use chainsmith_state::ProxyKind;

/// Result type for chain operations
pub type ChainResult<T> = std::result::Result<T, ChainError>;

/// Errors surfaced by the chain client
#[derive(Error, Debug)]
pub enum ChainError {
    /// Transport or node-side failure.
    #[error("rpc failure: {0}")]
    Rpc(String),

    /// The transaction was mined but reverted, or rejected outright.
    #[error("transaction reverted: {reason}")]
    Reverted { reason: String },

    /// No bytecode/ABI artifact is known under this name.
    #[error("unknown contract artifact: {name}")]
    UnknownArtifact { name: String },
}

/// A contract method name, validated once at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Method(String);

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Method(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Method {
    fn from(s: &str) -> Self {
        Method(s.to_string())
    }
}

/// Confirmation of a mined, non-reverted transaction.
#[derive(Debug, Clone)]
pub struct TxConfirmation {
    pub tx_hash: String,
}

/// Everything needed to deploy one upgradeable component: implementation,
/// proxy, and the single initialization call.
#[derive(Debug, Clone)]
pub struct ProxyDeployment {
    /// Artifact name of the implementation contract.
    pub artifact: String,
    pub proxy_kind: ProxyKind,
    /// Account that signs the deployment transactions.
    pub deployer: Address,
    pub init_method: Method,
    pub init_args: Vec<Token>,
}

/// Result of a confirmed proxy deployment.
#[derive(Debug, Clone)]
pub struct DeployedProxy {
    /// Address callers interact with.
    pub proxy: Address,
    pub implementation: Address,
    /// Admin contract, when the proxy kind uses one.
    pub admin: Option<Address>,
}

/// Remote state client.
///
/// Guarantees:
/// - `read` has no on-chain side effects.
/// - `execute` and `deploy_proxy` return only once the network has confirmed
///   (or rejected) the transaction; a rejection is `ChainError::Reverted`.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Read state from a deployed component.
    async fn read(&self, target: Address, method: &Method, args: &[Token]) -> ChainResult<Token>;

    /// Submit a state-mutating call and block until confirmed or rejected.
    async fn execute(
        &self,
        target: Address,
        sender: Address,
        method: &Method,
        args: &[Token],
    ) -> ChainResult<TxConfirmation>;

    /// Deploy an implementation plus proxy and issue the initialization call.
    async fn deploy_proxy(&self, deployment: &ProxyDeployment) -> ChainResult<DeployedProxy>;
}
