//! In-memory fake chain for testing
//!
//! `FakeChain` satisfies [`ChainClient`] without any network. Tests register
//! artifact simulations (init/call/read behavior per contract artifact),
//! and the fake allocates deterministic addresses, tracks mutation counts,
//! and supports failure injection (forced reverts, hung calls).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::Address;

use chainsmith_state::ProxyKind;

use crate::chain::{
    ChainClient, ChainError, ChainResult, DeployedProxy, Method, ProxyDeployment, TxConfirmation,
};

/// Result of simulating an initialization call.
#[derive(Default)]
pub struct InitOutcome {
    /// Initial state of the deployed component.
    pub state: BTreeMap<String, Token>,
    /// Extra components created by the initializer (e.g. wrapped tokens).
    pub spawned: Vec<Spawned>,
}

/// A component created as a side effect of another component's initializer.
/// Its address is written into the parent's state under `field`.
pub struct Spawned {
    pub field: String,
    pub artifact: String,
    pub state: BTreeMap<String, Token>,
}

type InitFn = dyn Fn(&[Token]) -> InitOutcome + Send + Sync;
type CallFn =
    dyn Fn(&mut BTreeMap<String, Token>, &str, &[Token]) -> std::result::Result<(), String>
        + Send
        + Sync;
type ReadFn = dyn Fn(&BTreeMap<String, Token>, &str, &[Token]) -> Option<Token> + Send + Sync;

/// Simulated behavior of one contract artifact.
pub struct SimArtifact {
    init: Box<InitFn>,
    call: Box<CallFn>,
    read: Box<ReadFn>,
}

impl Default for SimArtifact {
    fn default() -> Self {
        Self::new()
    }
}

impl SimArtifact {
    /// Artifact with default behavior: empty init state, `setFoo(x)` writes
    /// field `foo`, reads return the state entry named after the method.
    pub fn new() -> Self {
        SimArtifact {
            init: Box::new(|_| InitOutcome::default()),
            call: Box::new(|state, method, args| {
                let field = setter_field(method)
                    .ok_or_else(|| format!("unknown method '{method}'"))?;
                let value = args
                    .first()
                    .cloned()
                    .ok_or_else(|| format!("'{method}' expects one argument"))?;
                state.insert(field, value);
                Ok(())
            }),
            read: Box::new(|state, method, _| state.get(method).cloned()),
        }
    }

    pub fn on_init(mut self, f: impl Fn(&[Token]) -> InitOutcome + Send + Sync + 'static) -> Self {
        self.init = Box::new(f);
        self
    }

    pub fn on_call(
        mut self,
        f: impl Fn(&mut BTreeMap<String, Token>, &str, &[Token]) -> std::result::Result<(), String>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.call = Box::new(f);
        self
    }

    pub fn on_read(
        mut self,
        f: impl Fn(&BTreeMap<String, Token>, &str, &[Token]) -> Option<Token> + Send + Sync + 'static,
    ) -> Self {
        self.read = Box::new(f);
        self
    }
}

/// `setFoo` → `foo`, `setAutoStake` → `autoStake`.
pub fn setter_field(method: &str) -> Option<String> {
    let rest = method.strip_prefix("set")?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    Some(first.to_lowercase().chain(chars).collect())
}

struct Component {
    artifact: String,
    state: BTreeMap<String, Token>,
}

/// In-memory chain client fake.
#[derive(Default)]
pub struct FakeChain {
    artifacts: Mutex<HashMap<String, Arc<SimArtifact>>>,
    components: Mutex<HashMap<Address, Component>>,
    revert_on: Mutex<HashSet<String>>,
    hang_on: Mutex<HashSet<String>>,
    next_address: AtomicU64,
    deploys: AtomicUsize,
    executes: AtomicUsize,
    reads: AtomicUsize,
}

impl FakeChain {
    pub fn new() -> Self {
        FakeChain {
            next_address: AtomicU64::new(0xA000),
            ..Default::default()
        }
    }

    pub fn register_artifact(&self, name: impl Into<String>, artifact: SimArtifact) {
        self.artifacts
            .lock()
            .unwrap()
            .insert(name.into(), Arc::new(artifact));
    }

    /// Pre-seed a component at a fixed address (e.g. an existing asset token).
    pub fn add_component(
        &self,
        address: Address,
        artifact: impl Into<String>,
        state: BTreeMap<String, Token>,
    ) {
        self.components.lock().unwrap().insert(
            address,
            Component {
                artifact: artifact.into(),
                state,
            },
        );
    }

    /// Overwrite one state field of a deployed component (corruption for
    /// failure tests).
    pub fn set_state(&self, address: Address, field: impl Into<String>, value: Token) {
        if let Some(component) = self.components.lock().unwrap().get_mut(&address) {
            component.state.insert(field.into(), value);
        }
    }

    /// Force every call to `method` to revert.
    pub fn revert_on(&self, method: impl Into<String>) {
        self.revert_on.lock().unwrap().insert(method.into());
    }

    /// Make every call to `method` hang forever (timeout testing).
    pub fn hang_on(&self, method: impl Into<String>) {
        self.hang_on.lock().unwrap().insert(method.into());
    }

    pub fn deploy_count(&self) -> usize {
        self.deploys.load(Ordering::SeqCst)
    }

    pub fn execute_count(&self) -> usize {
        self.executes.load(Ordering::SeqCst)
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Current value of one state field, if the component and field exist.
    pub fn state_of(&self, address: Address, field: &str) -> Option<Token> {
        self.components
            .lock()
            .unwrap()
            .get(&address)
            .and_then(|c| c.state.get(field).cloned())
    }

    fn alloc_address(&self) -> Address {
        let n = self.next_address.fetch_add(1, Ordering::SeqCst);
        Address::from_low_u64_be(n)
    }

    fn artifact_named(&self, name: &str) -> ChainResult<Arc<SimArtifact>> {
        self.artifacts
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| ChainError::UnknownArtifact {
                name: name.to_string(),
            })
    }

    fn artifact_of(&self, target: Address) -> ChainResult<Arc<SimArtifact>> {
        let name = {
            let components = self.components.lock().unwrap();
            components
                .get(&target)
                .map(|c| c.artifact.clone())
                .ok_or_else(|| ChainError::Rpc(format!("no component at {target:?}")))?
        };
        self.artifact_named(&name)
    }

    async fn maybe_hang(&self, method: &str) {
        let hang = self.hang_on.lock().unwrap().contains(method);
        if hang {
            std::future::pending::<()>().await;
        }
    }

    fn should_revert(&self, method: &str) -> bool {
        self.revert_on.lock().unwrap().contains(method)
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn read(&self, target: Address, method: &Method, args: &[Token]) -> ChainResult<Token> {
        self.maybe_hang(method.as_str()).await;
        self.reads.fetch_add(1, Ordering::SeqCst);

        let artifact = self.artifact_of(target)?;
        let components = self.components.lock().unwrap();
        let component = components
            .get(&target)
            .ok_or_else(|| ChainError::Rpc(format!("no component at {target:?}")))?;

        // An unset state entry rejects the read, like a reverting getter.
        // Transport-level failures are modeled as `Rpc` (unknown component).
        (artifact.read)(&component.state, method.as_str(), args).ok_or_else(|| {
            ChainError::Reverted {
                reason: format!("{}: no state for '{method}'", component.artifact),
            }
        })
    }

    async fn execute(
        &self,
        target: Address,
        _sender: Address,
        method: &Method,
        args: &[Token],
    ) -> ChainResult<TxConfirmation> {
        self.maybe_hang(method.as_str()).await;
        let n = self.executes.fetch_add(1, Ordering::SeqCst);

        if self.should_revert(method.as_str()) {
            return Err(ChainError::Reverted {
                reason: format!("forced revert of '{method}'"),
            });
        }

        let artifact = self.artifact_of(target)?;
        let mut components = self.components.lock().unwrap();
        let component = components
            .get_mut(&target)
            .ok_or_else(|| ChainError::Rpc(format!("no component at {target:?}")))?;

        (artifact.call)(&mut component.state, method.as_str(), args)
            .map_err(|reason| ChainError::Reverted { reason })?;

        Ok(TxConfirmation {
            tx_hash: format!("0xtx{n:08x}"),
        })
    }

    async fn deploy_proxy(&self, deployment: &ProxyDeployment) -> ChainResult<DeployedProxy> {
        self.maybe_hang(deployment.init_method.as_str()).await;
        self.deploys.fetch_add(1, Ordering::SeqCst);

        if self.should_revert(deployment.init_method.as_str())
            || self.should_revert(&deployment.artifact)
        {
            return Err(ChainError::Reverted {
                reason: format!("forced revert deploying '{}'", deployment.artifact),
            });
        }

        let artifact = self.artifact_named(&deployment.artifact)?;
        let outcome = (artifact.init)(&deployment.init_args);

        let implementation = self.alloc_address();
        let proxy = self.alloc_address();
        let admin = match deployment.proxy_kind {
            ProxyKind::Uups => None,
            ProxyKind::Transparent => Some(self.alloc_address()),
        };

        let mut state = outcome.state;
        let mut components = self.components.lock().unwrap();
        for spawned in outcome.spawned {
            let address = self.alloc_address();
            state.insert(spawned.field, Token::Address(address));
            components.insert(
                address,
                Component {
                    artifact: spawned.artifact,
                    state: spawned.state,
                },
            );
        }
        components.insert(
            proxy,
            Component {
                artifact: deployment.artifact.clone(),
                state,
            },
        );

        Ok(DeployedProxy {
            proxy,
            implementation,
            admin,
        })
    }
}
