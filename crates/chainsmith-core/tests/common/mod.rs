#![allow(dead_code)]

//! Shared simulated staking system for integration tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use ethers::abi::Token;
use ethers::types::Address;

use chainsmith_core::accounts::{NamedAccounts, Role};
use chainsmith_core::context::ProvisionContext;
use chainsmith_core::fakes::{setter_field, FakeChain, InitOutcome, SimArtifact, Spawned};
use chainsmith_state::fakes::MemoryRegistry;

pub const DEPLOYER_ADDR: u64 = 0x01;
// Owner and staker are the same key, as in the live deployment.
pub const OWNER_ADDR: u64 = 0xAA;
pub const BRIDGE_ADDR: u64 = 0xB1;
pub const L2_ETH_ADDR: u64 = 0xE2;
pub const L2_USD_ADDR: u64 = 0xD2;

/// Sentinel the root component uses for the native asset.
pub fn eth_sentinel() -> Address {
    Address::repeat_byte(0xEE)
}

pub fn dai_address() -> Address {
    Address::from_low_u64_be(0xDA1)
}

pub fn accounts() -> NamedAccounts {
    NamedAccounts::new()
        .with_account(Role::deployer(), Address::from_low_u64_be(DEPLOYER_ADDR))
        .with_account(Role::owner(), Address::from_low_u64_be(OWNER_ADDR))
        .with_account(Role::staker(), Address::from_low_u64_be(OWNER_ADDR))
        .with_account(Role::bridge(), Address::from_low_u64_be(BRIDGE_ADDR))
        .with_account(Role::new("l2_eth"), Address::from_low_u64_be(L2_ETH_ADDR))
        .with_account(Role::new("l2_usd"), Address::from_low_u64_be(L2_USD_ADDR))
}

fn as_address(token: &Token) -> Result<Address, String> {
    match token {
        Token::Address(address) => Ok(*address),
        other => Err(format!("expected address, got {other:?}")),
    }
}

fn staking_manager_artifact() -> SimArtifact {
    SimArtifact::new()
        .on_init(|args| {
            let mut state = BTreeMap::new();
            state.insert("owner".to_string(), args[0].clone());
            state.insert("staker".to_string(), args[1].clone());
            state.insert("ETH_ADDRESS".to_string(), Token::Address(eth_sentinel()));
            InitOutcome {
                state,
                spawned: vec![],
            }
        })
        .on_call(|state, method, args| match method {
            "addStrategy" => {
                let asset = as_address(&args[0])?;
                let key = format!("strategies:{asset:?}");
                let mut list = match state.get(&key) {
                    Some(Token::Array(entries)) => entries.clone(),
                    _ => vec![],
                };
                list.push(args[1].clone());
                state.insert(key, Token::Array(list));
                Ok(())
            }
            "setActiveStrategy" => {
                let asset = as_address(&args[0])?;
                let index = match &args[1] {
                    Token::Uint(i) => i.as_usize(),
                    other => return Err(format!("expected index, got {other:?}")),
                };
                let entries = match state.get(&format!("strategies:{asset:?}")) {
                    Some(Token::Array(entries)) => entries.clone(),
                    _ => return Err(format!("no strategies for {asset:?}")),
                };
                let strategy = entries
                    .get(index)
                    .ok_or_else(|| format!("no strategy at index {index}"))?;
                state.insert(format!("activeStrategy:{asset:?}"), strategy.clone());
                Ok(())
            }
            _ => {
                let field =
                    setter_field(method).ok_or_else(|| format!("unknown method '{method}'"))?;
                state.insert(field, args[0].clone());
                Ok(())
            }
        })
        .on_read(|state, method, args| {
            if method == "getActiveStrategy" {
                let asset = as_address(args.first()?).ok()?;
                state.get(&format!("activeStrategy:{asset:?}")).cloned()
            } else {
                state.get(method).cloned()
            }
        })
}

fn deposit_manager_artifact() -> SimArtifact {
    SimArtifact::new().on_init(|args| {
        let mut state = BTreeMap::new();
        state.insert("owner".to_string(), args[0].clone());
        state.insert("l1StandardBridge".to_string(), args[1].clone());
        state.insert("stakingManager".to_string(), args[2].clone());
        state.insert("autoBridge".to_string(), Token::Bool(false));
        InitOutcome {
            state,
            spawned: vec![
                Spawned {
                    field: "wrappedEth".to_string(),
                    artifact: "WrappedToken".to_string(),
                    state: BTreeMap::from([
                        (
                            "name".to_string(),
                            Token::String("Wrapped Ether".to_string()),
                        ),
                        ("symbol".to_string(), Token::String("wETH".to_string())),
                    ]),
                },
                Spawned {
                    field: "wrappedUsd".to_string(),
                    artifact: "WrappedToken".to_string(),
                    state: BTreeMap::from([
                        ("name".to_string(), Token::String("Wrapped USD".to_string())),
                        ("symbol".to_string(), Token::String("wUSD".to_string())),
                    ]),
                },
            ],
        }
    })
}

fn strategy_artifact(asset: Address) -> SimArtifact {
    SimArtifact::new().on_init(move |args| {
        let mut state = BTreeMap::new();
        state.insert("owner".to_string(), args[0].clone());
        state.insert("stakingManager".to_string(), args[1].clone());
        state.insert("underlyingAsset".to_string(), Token::Address(asset));
        InitOutcome {
            state,
            spawned: vec![],
        }
    })
}

/// Chain with every artifact of the staking system registered.
pub fn staking_chain() -> Arc<FakeChain> {
    let chain = FakeChain::new();
    chain.register_artifact("StakingManager", staking_manager_artifact());
    chain.register_artifact("DepositManager", deposit_manager_artifact());
    chain.register_artifact("WrappedToken", SimArtifact::new());
    chain.register_artifact("EthStrategy", strategy_artifact(eth_sentinel()));
    chain.register_artifact("DaiStrategy", strategy_artifact(dai_address()));
    Arc::new(chain)
}

pub fn context(chain: Arc<FakeChain>, registry: Arc<MemoryRegistry>) -> ProvisionContext {
    ProvisionContext::new(registry, chain, accounts())
}

/// Install a test subscriber honoring RUST_LOG. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
