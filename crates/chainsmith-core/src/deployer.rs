//! Checkpointed proxy deployment
//!
//! Each deployment step is gated on the registry: a recorded component is
//! never redeployed, its existing record is reused. A step only records
//! after the deployment is confirmed AND its post-init checks pass, so a
//! failed deploy or a failed verification leaves no checkpoint and the step
//! reruns from scratch.

use chainsmith_state::{DeploymentRecord, ProxyInfo};

use crate::accounts::Role;
use crate::args::resolve_args;
use crate::chain::{ChainError, ProxyDeployment};
use crate::context::ProvisionContext;
use crate::error::{ProvisionError, Result};
use crate::plan::StepSpec;
use crate::verifier::{InvariantVerifier, PostCondition};

/// Deploys upgradeable components behind proxies, idempotently.
pub struct ProxyDeployer;

impl ProxyDeployer {
    /// Deploy `step` unless the registry already holds a record for it.
    ///
    /// A fresh deployment must pass all of `checks` before its record is
    /// written; the checkpoint therefore always means deploy and verify both
    /// completed. Returns the record and whether a deployment happened.
    pub async fn deploy_if_absent(
        ctx: &ProvisionContext,
        step: &StepSpec,
        checks: &[PostCondition],
    ) -> Result<(DeploymentRecord, bool)> {
        if let Some(existing) = ctx.registry.lookup(&step.name).await? {
            tracing::info!(
                component = %step.name,
                address = ?existing.address,
                "already deployed, skipping"
            );
            return Ok((existing, false));
        }

        let label = format!("deploy:{}", step.name);
        let init_args = resolve_args(ctx, &label, &step.init_args).await?;
        let deployer = ctx.accounts.address_of(&Role::deployer())?;

        tracing::info!(component = %step.name, artifact = %step.artifact, "deploying");
        let deployed = ctx
            .deploy_proxy(&ProxyDeployment {
                artifact: step.artifact.clone(),
                proxy_kind: step.proxy,
                deployer,
                init_method: step.init_method.clone(),
                init_args,
            })
            .await
            .map_err(|err| match err {
                ProvisionError::Chain(ChainError::Reverted { reason }) => {
                    ProvisionError::Transaction {
                        component: step.name.as_str().to_string(),
                        method: step.init_method.as_str().to_string(),
                        reason,
                    }
                }
                other => other,
            })?;

        let record = DeploymentRecord {
            name: step.name.clone(),
            address: deployed.proxy,
            artifact: step.artifact.clone(),
            proxy: Some(ProxyInfo {
                kind: step.proxy,
                admin: deployed.admin,
                implementation: deployed.implementation,
            }),
            created_at: chrono::Utc::now(),
        };

        // Verification gates the checkpoint: a record is only written once
        // the deployed component's invariants hold, so a resumed run never
        // skips over an unverified deployment.
        InvariantVerifier::verify_pending(ctx, checks, &record).await?;

        ctx.registry.record(record.clone()).await?;
        tracing::info!(component = %step.name, address = ?record.address, "verified and recorded");

        Ok((record, true))
    }
}
