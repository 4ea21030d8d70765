//! Wiring call execution
//!
//! Wiring calls mutate already-deployed components to point at each other.
//! The target must be in the registry; the sender role and every argument
//! are resolved immediately before submission.

use crate::args::resolve_args;
use crate::chain::ChainError;
use crate::context::ProvisionContext;
use crate::error::{ProvisionError, Result};
use crate::plan::WiringCall;

/// Executes the mutating calls of a wiring stage.
pub struct WiringExecutor;

impl WiringExecutor {
    pub async fn execute(ctx: &ProvisionContext, call: &WiringCall) -> Result<()> {
        let label = format!("wire:{}.{}", call.component, call.method);
        let target = ctx.require_record(&label, &call.component).await?;
        let sender = ctx.accounts.address_of(&call.sender)?;
        let args = resolve_args(ctx, &label, &call.args).await?;

        tracing::info!(
            component = %call.component,
            method = %call.method,
            sender = %call.sender,
            "wiring"
        );
        let confirmation = ctx
            .execute(target.address, sender, &call.method, &args)
            .await
            .map_err(|err| match err {
                ProvisionError::Chain(ChainError::Reverted { reason }) => {
                    ProvisionError::Transaction {
                        component: call.component.as_str().to_string(),
                        method: call.method.as_str().to_string(),
                        reason,
                    }
                }
                other => other,
            })?;
        tracing::debug!(tx = %confirmation.tx_hash, "confirmed");
        Ok(())
    }
}
