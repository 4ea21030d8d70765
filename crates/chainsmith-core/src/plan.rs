//! Provisioning plan model
//!
//! A plan is pure data: deployment steps, derived records, wiring stages and
//! their post-conditions. The orchestrator interprets it generically, so the
//! dependency order lives in one declarative place instead of being threaded
//! through control flow.

use chainsmith_state::{ComponentName, ProxyKind};

use crate::accounts::Role;
use crate::args::Arg;
use crate::chain::Method;
use crate::verifier::PostCondition;

/// One checkpointed deployment step.
#[derive(Debug, Clone)]
pub struct StepSpec {
    /// Registry name the resulting record is keyed under.
    pub name: ComponentName,
    /// Implementation artifact to deploy.
    pub artifact: String,
    pub proxy: ProxyKind,
    pub init_method: Method,
    pub init_args: Vec<Arg>,
}

/// A registry record derived from a deployed component's state rather than
/// from a deployment of its own (components the initializer created).
#[derive(Debug, Clone)]
pub struct DerivedRecord {
    pub name: ComponentName,
    pub artifact: String,
    /// Component whose state holds the derived address.
    pub source: ComponentName,
    /// Read returning the derived component's address.
    pub address_query: Method,
}

/// One mutating call of a wiring stage.
#[derive(Debug, Clone)]
pub struct WiringCall {
    pub component: ComponentName,
    /// Role whose address signs the call.
    pub sender: Role,
    pub method: Method,
    pub args: Vec<Arg>,
}

/// A group of wiring calls plus the state they establish. The stage is
/// skipped as a whole when its post-conditions already hold.
#[derive(Debug, Clone)]
pub struct WiringStage {
    pub label: String,
    pub calls: Vec<WiringCall>,
    pub establishes: Vec<PostCondition>,
}

/// Deployment step together with its invariants and derived records.
#[derive(Debug, Clone)]
pub struct ComponentProvision {
    pub step: StepSpec,
    /// Verified after deployment and on every resumed run.
    pub checks: Vec<PostCondition>,
    pub derived: Vec<DerivedRecord>,
}

/// One strategy: its component deployment and the wiring that registers and
/// activates it.
#[derive(Debug, Clone)]
pub struct StrategyProvision {
    pub component: ComponentProvision,
    pub wiring: WiringStage,
}

/// The full provisioning sequence, in execution order.
#[derive(Debug, Clone)]
pub struct ProvisionPlan {
    /// Root component, deployed first.
    pub root: ComponentProvision,
    /// Component depending on the root's address.
    pub dependent: ComponentProvision,
    /// Wiring pointing the root back at the dependent.
    pub wire_back: WiringStage,
    /// Strategies, provisioned in order after the core pair is wired.
    pub strategies: Vec<StrategyProvision>,
    /// Stages run after all strategies (external endpoint wiring).
    pub extra_wiring: Vec<WiringStage>,
}
