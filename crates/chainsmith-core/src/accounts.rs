//! Named account roles
//!
//! Externally supplied addresses with fixed semantic roles (deployer, owner,
//! staker, bridge, ...). None may be the zero address at the point of use.

use std::collections::BTreeMap;

use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::error::{ProvisionError, Result};

/// Semantic role of a configured account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Role(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Signs deployment transactions.
    pub fn deployer() -> Self {
        Role::new("deployer")
    }

    /// Owns the deployed components.
    pub fn owner() -> Self {
        Role::new("owner")
    }

    /// Initial staker account of the root component.
    pub fn staker() -> Self {
        Role::new("staker")
    }

    /// L1 standard bridge endpoint.
    pub fn bridge() -> Self {
        Role::new("bridge")
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Role(s.to_string())
    }
}

/// The set of named accounts a run operates with.
#[derive(Debug, Clone, Default)]
pub struct NamedAccounts {
    accounts: BTreeMap<Role, Address>,
}

impl NamedAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a role-name → address map (deployment configuration).
    pub fn from_map(map: BTreeMap<String, Address>) -> Self {
        let accounts = map.into_iter().map(|(k, v)| (Role::new(k), v)).collect();
        Self { accounts }
    }

    pub fn with_account(mut self, role: Role, address: Address) -> Self {
        self.accounts.insert(role, address);
        self
    }

    /// Resolve a role to its address.
    ///
    /// Fails on an unconfigured role or the zero address; a zero-address
    /// sender or init argument would otherwise surface much later as an
    /// inscrutable on-chain revert.
    pub fn address_of(&self, role: &Role) -> Result<Address> {
        let address = self
            .accounts
            .get(role)
            .copied()
            .ok_or_else(|| ProvisionError::UnknownRole {
                role: role.as_str().to_string(),
            })?;
        if address.is_zero() {
            return Err(ProvisionError::ZeroAddressRole {
                role: role.as_str().to_string(),
            });
        }
        Ok(address)
    }
}
