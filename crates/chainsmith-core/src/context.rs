//! Provisioning context
//!
//! Explicit context object passed to every step: owns the registry handle,
//! the chain client, and the named account set. No process-wide implicit
//! state. Every remote call goes through the context so it gets a bounded
//! confirmation timeout; a hung call surfaces as `Timeout` instead of
//! blocking the run forever.

use std::sync::Arc;
use std::time::Duration;

use ethers::abi::Token;
use ethers::types::Address;

use chainsmith_state::{ComponentName, DeploymentRecord, DeploymentRegistry};

use crate::accounts::NamedAccounts;
use crate::chain::{ChainClient, DeployedProxy, Method, ProxyDeployment, TxConfirmation};
use crate::error::{ProvisionError, Result};

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Shared state for one provisioning run.
pub struct ProvisionContext {
    pub registry: Arc<dyn DeploymentRegistry>,
    pub chain: Arc<dyn ChainClient>,
    pub accounts: NamedAccounts,
    call_timeout: Duration,
}

impl ProvisionContext {
    pub fn new(
        registry: Arc<dyn DeploymentRegistry>,
        chain: Arc<dyn ChainClient>,
        accounts: NamedAccounts,
    ) -> Self {
        Self {
            registry,
            chain,
            accounts,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Read state from a component, with a bounded wait.
    pub async fn read(&self, target: Address, method: &Method, args: &[Token]) -> Result<Token> {
        let value = tokio::time::timeout(self.call_timeout, self.chain.read(target, method, args))
            .await
            .map_err(|_| ProvisionError::Timeout {
                operation: format!("read {method}"),
            })??;
        Ok(value)
    }

    /// Submit a mutating call and wait (bounded) for confirmation.
    pub async fn execute(
        &self,
        target: Address,
        sender: Address,
        method: &Method,
        args: &[Token],
    ) -> Result<TxConfirmation> {
        let confirmation = tokio::time::timeout(
            self.call_timeout,
            self.chain.execute(target, sender, method, args),
        )
        .await
        .map_err(|_| ProvisionError::Timeout {
            operation: format!("execute {method}"),
        })??;
        Ok(confirmation)
    }

    /// Deploy an implementation + proxy and wait (bounded) for confirmation.
    pub async fn deploy_proxy(&self, deployment: &ProxyDeployment) -> Result<DeployedProxy> {
        let deployed =
            tokio::time::timeout(self.call_timeout, self.chain.deploy_proxy(deployment))
                .await
                .map_err(|_| ProvisionError::Timeout {
                    operation: format!("deploy {}", deployment.artifact),
                })??;
        Ok(deployed)
    }

    /// Look up a record that a step depends on; absence is fatal.
    pub async fn require_record(
        &self,
        step: &str,
        name: &ComponentName,
    ) -> Result<DeploymentRecord> {
        self.registry
            .lookup(name)
            .await?
            .ok_or_else(|| ProvisionError::PrerequisiteMissing {
                step: step.to_string(),
                name: name.as_str().to_string(),
            })
    }
}
