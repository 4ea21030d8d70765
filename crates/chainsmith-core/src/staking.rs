//! The staking system provisioning plan
//!
//! The authored sequence: StakingManager (root), DepositManager (dependent,
//! initialized with the root's address), wire-back of the root's staker and
//! depositor to the deposit manager, then one wiring-heavy provision per
//! yield strategy. The bridge endpoint wiring is a separate opt-in stage.
//! Everything here is data; the orchestrator interprets it.

use ethers::types::U256;

use chainsmith_state::{ComponentName, ProxyKind};

use crate::accounts::Role;
use crate::args::Arg;
use crate::chain::Method;
use crate::plan::{
    ComponentProvision, DerivedRecord, ProvisionPlan, StepSpec, StrategyProvision, WiringCall,
    WiringStage,
};
use crate::submitter::TokenVerification;
use crate::verifier::{Expected, PostCondition};

pub const STAKING_MANAGER: &str = "StakingManager";
pub const DEPOSIT_MANAGER: &str = "DepositManager";
pub const WRAPPED_ETH: &str = "WrappedEth";
pub const WRAPPED_USD: &str = "WrappedUsd";

/// One yield strategy to provision and activate.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    /// Registry name, e.g. "EthStrategy".
    pub name: ComponentName,
    pub artifact: String,
    /// The asset the strategy manages, resolved at wiring time.
    pub asset: Arg,
}

/// Strategy for the native staking asset. Its asset address is the root
/// component's `ETH_ADDRESS` sentinel constant.
pub fn eth_strategy() -> StrategyConfig {
    StrategyConfig {
        name: ComponentName::new("EthStrategy"),
        artifact: "EthStrategy".to_string(),
        asset: Arg::ReadFrom {
            component: ComponentName::new(STAKING_MANAGER),
            method: Method::new("ETH_ADDRESS"),
        },
    }
}

/// Strategy holding a stablecoin; the asset address comes from the deployed
/// strategy itself.
pub fn dai_strategy() -> StrategyConfig {
    StrategyConfig {
        name: ComponentName::new("DaiStrategy"),
        artifact: "DaiStrategy".to_string(),
        asset: Arg::ReadFrom {
            component: ComponentName::new("DaiStrategy"),
            method: Method::new("underlyingAsset"),
        },
    }
}

/// Build the plan for the given strategies, in activation order.
///
/// The bridge endpoint wiring is not part of the base plan; append
/// [`bridge_wiring_stage`] to `extra_wiring` once the L2 counterpart
/// addresses are known.
pub fn staking_plan(strategies: Vec<StrategyConfig>) -> ProvisionPlan {
    ProvisionPlan {
        root: root_provision(),
        dependent: deposit_provision(),
        wire_back: wire_back_stage(),
        strategies: strategies.into_iter().map(strategy_provision).collect(),
        extra_wiring: vec![],
    }
}

fn root_provision() -> ComponentProvision {
    ComponentProvision {
        step: StepSpec {
            name: ComponentName::new(STAKING_MANAGER),
            artifact: STAKING_MANAGER.to_string(),
            proxy: ProxyKind::Uups,
            init_method: Method::new("initialize"),
            init_args: vec![Arg::Role(Role::owner()), Arg::Role(Role::staker())],
        },
        // The owner check against the staker account reproduces the deployed
        // system's convention that both roles are held by the same key.
        checks: vec![
            PostCondition::equals(STAKING_MANAGER, "staker", Expected::Role(Role::staker())),
            PostCondition::equals(STAKING_MANAGER, "owner", Expected::Role(Role::staker())),
        ],
        derived: vec![],
    }
}

fn deposit_provision() -> ComponentProvision {
    ComponentProvision {
        step: StepSpec {
            name: ComponentName::new(DEPOSIT_MANAGER),
            artifact: DEPOSIT_MANAGER.to_string(),
            proxy: ProxyKind::Uups,
            init_method: Method::new("initialize"),
            init_args: vec![
                Arg::Role(Role::owner()),
                Arg::Role(Role::bridge()),
                Arg::Recorded(ComponentName::new(STAKING_MANAGER)),
            ],
        },
        checks: vec![
            PostCondition::equals(DEPOSIT_MANAGER, "owner", Expected::Role(Role::owner())),
            PostCondition::equals(
                DEPOSIT_MANAGER,
                "l1StandardBridge",
                Expected::Role(Role::bridge()),
            ),
            PostCondition::equals(
                DEPOSIT_MANAGER,
                "stakingManager",
                Expected::Recorded(ComponentName::new(STAKING_MANAGER)),
            ),
            PostCondition::is_false(DEPOSIT_MANAGER, "autoBridge"),
            PostCondition::non_zero_address(DEPOSIT_MANAGER, "wrappedEth"),
            PostCondition::non_zero_address(DEPOSIT_MANAGER, "wrappedUsd"),
        ],
        // The initializer deploys the two wrapped tokens itself; their
        // addresses are registry entries in their own right so later runs
        // and the verification submitter can find them by name.
        derived: vec![
            DerivedRecord {
                name: ComponentName::new(WRAPPED_ETH),
                artifact: "WrappedToken".to_string(),
                source: ComponentName::new(DEPOSIT_MANAGER),
                address_query: Method::new("wrappedEth"),
            },
            DerivedRecord {
                name: ComponentName::new(WRAPPED_USD),
                artifact: "WrappedToken".to_string(),
                source: ComponentName::new(DEPOSIT_MANAGER),
                address_query: Method::new("wrappedUsd"),
            },
        ],
    }
}

fn wire_back_stage() -> WiringStage {
    WiringStage {
        label: "root-to-deposit".to_string(),
        calls: vec![
            WiringCall {
                component: ComponentName::new(STAKING_MANAGER),
                sender: Role::owner(),
                method: Method::new("setStaker"),
                args: vec![Arg::Recorded(ComponentName::new(DEPOSIT_MANAGER))],
            },
            WiringCall {
                component: ComponentName::new(STAKING_MANAGER),
                sender: Role::owner(),
                method: Method::new("setDepositor"),
                args: vec![Arg::Recorded(ComponentName::new(DEPOSIT_MANAGER))],
            },
        ],
        establishes: vec![
            PostCondition::equals(
                STAKING_MANAGER,
                "staker",
                Expected::Recorded(ComponentName::new(DEPOSIT_MANAGER)),
            ),
            PostCondition::equals(
                STAKING_MANAGER,
                "depositor",
                Expected::Recorded(ComponentName::new(DEPOSIT_MANAGER)),
            ),
            // Rewiring the staker must not have disturbed ownership.
            PostCondition::equals(STAKING_MANAGER, "owner", Expected::Role(Role::owner())),
        ],
    }
}

fn strategy_provision(config: StrategyConfig) -> StrategyProvision {
    let name = config.name.clone();
    StrategyProvision {
        component: ComponentProvision {
            step: StepSpec {
                name: name.clone(),
                artifact: config.artifact,
                proxy: ProxyKind::Uups,
                init_method: Method::new("initialize"),
                init_args: vec![
                    Arg::Role(Role::owner()),
                    Arg::Recorded(ComponentName::new(STAKING_MANAGER)),
                ],
            },
            checks: vec![
                PostCondition::equals(name.clone(), "owner", Expected::Role(Role::owner())),
                PostCondition::equals(
                    name.clone(),
                    "stakingManager",
                    Expected::Recorded(ComponentName::new(STAKING_MANAGER)),
                ),
            ],
            derived: vec![],
        },
        wiring: WiringStage {
            label: format!("activate-{name}"),
            calls: vec![
                WiringCall {
                    component: name.clone(),
                    sender: Role::owner(),
                    method: Method::new("setAutoStake"),
                    args: vec![Arg::Bool(false)],
                },
                WiringCall {
                    component: ComponentName::new(STAKING_MANAGER),
                    sender: Role::owner(),
                    method: Method::new("addStrategy"),
                    args: vec![config.asset.clone(), Arg::Recorded(name.clone())],
                },
                WiringCall {
                    component: ComponentName::new(STAKING_MANAGER),
                    sender: Role::owner(),
                    method: Method::new("setActiveStrategy"),
                    args: vec![config.asset, Arg::Uint(U256::zero())],
                },
            ],
            establishes: vec![
                PostCondition::is_false(name.clone(), "autoStake"),
                PostCondition::equals_query(
                    STAKING_MANAGER,
                    "getActiveStrategy",
                    vec![Arg::ReadFrom {
                        component: name.clone(),
                        method: Method::new("underlyingAsset"),
                    }],
                    Expected::Recorded(name),
                ),
            ],
        },
    }
}

/// Point the deposit manager at the bridge endpoints. Opt-in; append to the
/// plan's `extra_wiring` once the L2 counterpart addresses exist. The calls
/// are signed by the deployer, matching the live runbook.
pub fn bridge_wiring_stage() -> WiringStage {
    WiringStage {
        label: "bridge-endpoints".to_string(),
        calls: vec![
            WiringCall {
                component: ComponentName::new(DEPOSIT_MANAGER),
                sender: Role::deployer(),
                method: Method::new("setL1StandardBridge"),
                args: vec![Arg::Role(Role::bridge())],
            },
            WiringCall {
                component: ComponentName::new(DEPOSIT_MANAGER),
                sender: Role::deployer(),
                method: Method::new("setL2Eth"),
                args: vec![Arg::Role(Role::new("l2_eth"))],
            },
            WiringCall {
                component: ComponentName::new(DEPOSIT_MANAGER),
                sender: Role::deployer(),
                method: Method::new("setL2Usd"),
                args: vec![Arg::Role(Role::new("l2_usd"))],
            },
        ],
        establishes: vec![
            PostCondition::equals(
                DEPOSIT_MANAGER,
                "l1StandardBridge",
                Expected::Role(Role::bridge()),
            ),
            PostCondition::equals(DEPOSIT_MANAGER, "l2Eth", Expected::Role(Role::new("l2_eth"))),
            PostCondition::equals(DEPOSIT_MANAGER, "l2Usd", Expected::Role(Role::new("l2_usd"))),
        ],
    }
}

/// The wrapped tokens to submit for source verification after a run.
pub fn token_verifications() -> Vec<TokenVerification> {
    vec![
        TokenVerification {
            token: ComponentName::new(WRAPPED_ETH),
            issuer: ComponentName::new(DEPOSIT_MANAGER),
        },
        TokenVerification {
            token: ComponentName::new(WRAPPED_USD),
            issuer: ComponentName::new(DEPOSIT_MANAGER),
        },
    ]
}
