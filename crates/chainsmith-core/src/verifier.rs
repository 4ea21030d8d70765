//! Post-condition verification
//!
//! After every mutation (deployment init, wiring call) the orchestrator
//! verifies the resulting remote state by reading it back. Post-conditions
//! are declared as data next to the plan and evaluated strictly in order;
//! the first failed check aborts the run with the component, method,
//! expected and actual values.

use ethers::abi::Token;
use ethers::types::Address;

use chainsmith_state::{ComponentName, DeploymentRecord};

use crate::accounts::Role;
use crate::args::{resolve_args, Arg};
use crate::chain::{ChainError, Method};
use crate::context::ProvisionContext;
use crate::error::{ProvisionError, Result};

/// A read issued against a component to fetch the state under check.
#[derive(Debug, Clone)]
pub struct StateQuery {
    pub method: Method,
    pub args: Vec<Arg>,
}

/// The value a queried state is expected to equal, resolved at check time.
#[derive(Debug, Clone)]
pub enum Expected {
    Literal(Token),
    /// Address of a named account role.
    Role(Role),
    /// Address of a recorded component.
    Recorded(ComponentName),
}

/// What must hold for the queried state.
#[derive(Debug, Clone)]
pub enum Expectation {
    Equals(Expected),
    /// The state is an address and it is not zero.
    NonZeroAddress,
    /// The state is boolean false.
    IsFalse,
}

/// One verifiable invariant over a component's remote state.
#[derive(Debug, Clone)]
pub struct PostCondition {
    pub component: ComponentName,
    pub query: StateQuery,
    pub expect: Expectation,
}

impl PostCondition {
    /// Zero-argument read must equal `expected`.
    pub fn equals(
        component: impl Into<ComponentName>,
        method: impl Into<Method>,
        expected: Expected,
    ) -> Self {
        PostCondition {
            component: component.into(),
            query: StateQuery {
                method: method.into(),
                args: vec![],
            },
            expect: Expectation::Equals(expected),
        }
    }

    /// Read with arguments must equal `expected`.
    pub fn equals_query(
        component: impl Into<ComponentName>,
        method: impl Into<Method>,
        args: Vec<Arg>,
        expected: Expected,
    ) -> Self {
        PostCondition {
            component: component.into(),
            query: StateQuery {
                method: method.into(),
                args,
            },
            expect: Expectation::Equals(expected),
        }
    }

    /// Zero-argument read must be a non-zero address.
    pub fn non_zero_address(
        component: impl Into<ComponentName>,
        method: impl Into<Method>,
    ) -> Self {
        PostCondition {
            component: component.into(),
            query: StateQuery {
                method: method.into(),
                args: vec![],
            },
            expect: Expectation::NonZeroAddress,
        }
    }

    /// Zero-argument read must be boolean false.
    pub fn is_false(component: impl Into<ComponentName>, method: impl Into<Method>) -> Self {
        PostCondition {
            component: component.into(),
            query: StateQuery {
                method: method.into(),
                args: vec![],
            },
            expect: Expectation::IsFalse,
        }
    }
}

enum CheckOutcome {
    Satisfied,
    Mismatch { expected: String, actual: String },
}

/// Evaluates post-conditions against live remote state.
pub struct InvariantVerifier;

impl InvariantVerifier {
    /// Verify all conditions in order; the first failure aborts.
    pub async fn verify(ctx: &ProvisionContext, conditions: &[PostCondition]) -> Result<()> {
        Self::verify_inner(ctx, conditions, None).await
    }

    /// Verify conditions for a component whose record is not yet written.
    ///
    /// The deployer gates the registry checkpoint on its post-init checks;
    /// at that point the record only exists in memory, so references to the
    /// pending component resolve against `record` instead of the registry.
    pub async fn verify_pending(
        ctx: &ProvisionContext,
        conditions: &[PostCondition],
        record: &DeploymentRecord,
    ) -> Result<()> {
        Self::verify_inner(ctx, conditions, Some(record)).await
    }

    async fn verify_inner(
        ctx: &ProvisionContext,
        conditions: &[PostCondition],
        pending: Option<&DeploymentRecord>,
    ) -> Result<()> {
        for condition in conditions {
            match Self::check(ctx, condition, pending).await? {
                CheckOutcome::Satisfied => {
                    tracing::debug!(
                        component = %condition.component,
                        method = %condition.query.method,
                        "post-condition holds"
                    );
                }
                CheckOutcome::Mismatch { expected, actual } => {
                    return Err(ProvisionError::Verification {
                        component: condition.component.as_str().to_string(),
                        method: condition.query.method.as_str().to_string(),
                        expected,
                        actual,
                    });
                }
            }
        }
        Ok(())
    }

    /// Non-fatal variant: report whether all conditions already hold.
    ///
    /// Used to decide whether a wiring stage can be skipped. A read the
    /// component rejects (e.g. a mapping entry that was never written)
    /// counts as "does not hold"; transport failures, registry errors and
    /// account failures still propagate.
    pub async fn probe(ctx: &ProvisionContext, conditions: &[PostCondition]) -> Result<bool> {
        for condition in conditions {
            match Self::check(ctx, condition, None).await {
                Ok(CheckOutcome::Satisfied) => {}
                Ok(CheckOutcome::Mismatch { .. }) => return Ok(false),
                Err(ProvisionError::Chain(ChainError::Reverted { .. })) => return Ok(false),
                Err(other) => return Err(other),
            }
        }
        Ok(true)
    }

    async fn check(
        ctx: &ProvisionContext,
        condition: &PostCondition,
        pending: Option<&DeploymentRecord>,
    ) -> Result<CheckOutcome> {
        let step = format!("verify:{}", condition.component);
        let address = Self::resolve_component(ctx, &step, &condition.component, pending).await?;
        let args = resolve_args(ctx, &step, &condition.query.args).await?;
        let actual = ctx.read(address, &condition.query.method, &args).await?;

        let outcome = match &condition.expect {
            Expectation::Equals(expected) => {
                let expected = Self::resolve_expected(ctx, &step, expected, pending).await?;
                // An address that matched only because both sides are zero is
                // still a broken wiring, not an established one.
                let zero_actual = matches!(&actual, Token::Address(a) if a.is_zero());
                if actual == expected && !zero_actual {
                    CheckOutcome::Satisfied
                } else {
                    CheckOutcome::Mismatch {
                        expected: format!("{expected:?}"),
                        actual: format!("{actual:?}"),
                    }
                }
            }
            Expectation::NonZeroAddress => match &actual {
                Token::Address(a) if !a.is_zero() => CheckOutcome::Satisfied,
                _ => CheckOutcome::Mismatch {
                    expected: "non-zero address".to_string(),
                    actual: format!("{actual:?}"),
                },
            },
            Expectation::IsFalse => {
                if actual == Token::Bool(false) {
                    CheckOutcome::Satisfied
                } else {
                    CheckOutcome::Mismatch {
                        expected: "false".to_string(),
                        actual: format!("{actual:?}"),
                    }
                }
            }
        };
        Ok(outcome)
    }

    async fn resolve_expected(
        ctx: &ProvisionContext,
        step: &str,
        expected: &Expected,
        pending: Option<&DeploymentRecord>,
    ) -> Result<Token> {
        match expected {
            Expected::Literal(token) => Ok(token.clone()),
            Expected::Role(role) => Ok(Token::Address(ctx.accounts.address_of(role)?)),
            Expected::Recorded(name) => {
                let address = Self::resolve_component(ctx, step, name, pending).await?;
                Ok(Token::Address(address))
            }
        }
    }

    async fn resolve_component(
        ctx: &ProvisionContext,
        step: &str,
        name: &ComponentName,
        pending: Option<&DeploymentRecord>,
    ) -> Result<Address> {
        if let Some(record) = pending {
            if record.name == *name {
                return Ok(record.address);
            }
        }
        Ok(ctx.require_record(step, name).await?.address)
    }
}
