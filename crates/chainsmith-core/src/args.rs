//! Call-argument values
//!
//! Init and wiring arguments may reference state produced by earlier steps:
//! a recorded component's address, or a value read from a live component at
//! call time (the original sequence passes e.g. the root's `ETH_ADDRESS`
//! constant and a strategy's `underlyingAsset` this way). Resolution happens
//! against the context immediately before the call, so every cross-reference
//! reflects the registry's current contents.

use ethers::abi::Token;
use ethers::types::{Address, U256};

use chainsmith_state::ComponentName;

use crate::accounts::Role;
use crate::chain::Method;
use crate::context::ProvisionContext;
use crate::error::Result;

/// One argument of an initialization or wiring call.
#[derive(Debug, Clone)]
pub enum Arg {
    /// A pre-encoded ABI token.
    Literal(Token),
    Address(Address),
    Uint(U256),
    Bool(bool),
    Str(String),
    /// Address of a named account role.
    Role(Role),
    /// Address of a previously recorded component.
    Recorded(ComponentName),
    /// Value read from a recorded component at call time.
    ReadFrom {
        component: ComponentName,
        method: Method,
    },
}

impl Arg {
    /// Resolve to an ABI token. `step` labels the consuming step for
    /// prerequisite errors.
    pub async fn resolve(&self, ctx: &ProvisionContext, step: &str) -> Result<Token> {
        match self {
            Arg::Literal(token) => Ok(token.clone()),
            Arg::Address(address) => Ok(Token::Address(*address)),
            Arg::Uint(value) => Ok(Token::Uint(*value)),
            Arg::Bool(value) => Ok(Token::Bool(*value)),
            Arg::Str(value) => Ok(Token::String(value.clone())),
            Arg::Role(role) => Ok(Token::Address(ctx.accounts.address_of(role)?)),
            Arg::Recorded(name) => {
                let record = ctx.require_record(step, name).await?;
                Ok(Token::Address(record.address))
            }
            Arg::ReadFrom { component, method } => {
                let record = ctx.require_record(step, component).await?;
                ctx.read(record.address, method, &[]).await
            }
        }
    }
}

/// Resolve an ordered argument list.
pub async fn resolve_args(ctx: &ProvisionContext, step: &str, args: &[Arg]) -> Result<Vec<Token>> {
    let mut resolved = Vec::with_capacity(args.len());
    for arg in args {
        resolved.push(arg.resolve(ctx, step).await?);
    }
    Ok(resolved)
}
