//! Provisioning orchestrator
//!
//! Interprets a [`ProvisionPlan`] strictly in order: root component,
//! dependent component, wire-back stage, each strategy, then any trailing
//! wiring stages. Every step is idempotent. Deployments are gated on the
//! registry, wiring stages on their own post-conditions, so a rerun of a
//! completed plan mutates nothing. The first failure aborts the run; the
//! registry checkpoints make the subsequent run resume past completed work.

use std::time::Instant;

use uuid::Uuid;

use chainsmith_state::DeploymentRecord;

use crate::context::ProvisionContext;
use crate::deployer::ProxyDeployer;
use crate::error::Result;
use crate::plan::{ComponentProvision, DerivedRecord, ProvisionPlan, WiringStage};
use crate::verifier::InvariantVerifier;
use crate::wiring::WiringExecutor;

/// What the orchestrator did for one plan step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    Executed,
    Skipped { reason: String },
}

#[derive(Debug, Clone)]
pub struct StepReport {
    pub step: String,
    pub action: StepAction,
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub steps: Vec<StepReport>,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn executed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.action == StepAction::Executed)
            .count()
    }
}

pub struct Orchestrator {
    plan: ProvisionPlan,
}

impl Orchestrator {
    pub fn new(plan: ProvisionPlan) -> Self {
        Self { plan }
    }

    /// Run the plan to completion or first failure.
    pub async fn run(&self, ctx: &ProvisionContext) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let mut steps = Vec::new();

        tracing::info!(%run_id, "provisioning run started");

        self.provision_component(ctx, &self.plan.root, &mut steps)
            .await?;
        self.provision_component(ctx, &self.plan.dependent, &mut steps)
            .await?;
        self.run_wiring(ctx, &self.plan.wire_back, &mut steps).await?;

        for strategy in &self.plan.strategies {
            self.provision_component(ctx, &strategy.component, &mut steps)
                .await?;
            self.run_wiring(ctx, &strategy.wiring, &mut steps).await?;
        }

        for stage in &self.plan.extra_wiring {
            self.run_wiring(ctx, stage, &mut steps).await?;
        }

        let report = RunReport {
            run_id,
            steps,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        tracing::info!(
            %run_id,
            executed = report.executed_count(),
            total = report.steps.len(),
            duration_ms = report.duration_ms,
            "provisioning run complete"
        );
        Ok(report)
    }

    async fn provision_component(
        &self,
        ctx: &ProvisionContext,
        component: &ComponentProvision,
        steps: &mut Vec<StepReport>,
    ) -> Result<()> {
        // The deployer gates the record on the post-init checks, so a record
        // always means deploy and verify both completed. Skipped deployments
        // are not re-checked; later wiring legitimately rewrites some of the
        // checked fields, so re-checking on a resumed run would reject
        // correctly wired state.
        let (record, deployed) =
            ProxyDeployer::deploy_if_absent(ctx, &component.step, &component.checks).await?;
        steps.push(StepReport {
            step: format!("deploy:{}", component.step.name),
            action: if deployed {
                StepAction::Executed
            } else {
                StepAction::Skipped {
                    reason: "already recorded".to_string(),
                }
            },
        });

        for derived in &component.derived {
            let recorded = self.record_derived(ctx, &record, derived).await?;
            steps.push(StepReport {
                step: format!("derive:{}", derived.name),
                action: if recorded {
                    StepAction::Executed
                } else {
                    StepAction::Skipped {
                        reason: "already recorded".to_string(),
                    }
                },
            });
        }
        Ok(())
    }

    async fn record_derived(
        &self,
        ctx: &ProvisionContext,
        source: &DeploymentRecord,
        derived: &DerivedRecord,
    ) -> Result<bool> {
        if ctx.registry.lookup(&derived.name).await?.is_some() {
            tracing::info!(component = %derived.name, "derived record exists, skipping");
            return Ok(false);
        }

        let token = ctx
            .read(source.address, &derived.address_query, &[])
            .await?;
        let address = match token {
            ethers::abi::Token::Address(address) => address,
            other => {
                return Err(crate::error::ProvisionError::Verification {
                    component: derived.source.as_str().to_string(),
                    method: derived.address_query.as_str().to_string(),
                    expected: "address".to_string(),
                    actual: format!("{other:?}"),
                })
            }
        };

        ctx.registry
            .record(DeploymentRecord {
                name: derived.name.clone(),
                address,
                artifact: derived.artifact.clone(),
                proxy: None,
                created_at: chrono::Utc::now(),
            })
            .await?;
        tracing::info!(component = %derived.name, address = ?address, "derived record saved");
        Ok(true)
    }

    async fn run_wiring(
        &self,
        ctx: &ProvisionContext,
        stage: &WiringStage,
        steps: &mut Vec<StepReport>,
    ) -> Result<()> {
        if InvariantVerifier::probe(ctx, &stage.establishes).await? {
            tracing::info!(stage = %stage.label, "already wired, skipping");
            steps.push(StepReport {
                step: format!("wire:{}", stage.label),
                action: StepAction::Skipped {
                    reason: "already wired".to_string(),
                },
            });
            return Ok(());
        }

        for call in &stage.calls {
            WiringExecutor::execute(ctx, call).await?;
        }
        InvariantVerifier::verify(ctx, &stage.establishes).await?;

        steps.push(StepReport {
            step: format!("wire:{}", stage.label),
            action: StepAction::Executed,
        });
        Ok(())
    }
}
