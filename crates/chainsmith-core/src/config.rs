//! Deployment configuration
//!
//! TOML file with the named accounts, the call timeout, and optionally the
//! verification service. Addresses are 0x-prefixed hex.
//!
//! ```toml
//! call_timeout_secs = 90
//!
//! [accounts]
//! deployer = "0x52908400098527886e0f7030069857d2e4169ee7"
//! owner = "0x8617e340b3d01fa5f11f306f4090fd50e238070d"
//!
//! [verifier]
//! endpoint = "https://verify.example/api"
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::accounts::NamedAccounts;
use crate::error::{ProvisionError, Result};
use crate::submitter::VerifierConfig;

fn default_call_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Role name to account address.
    pub accounts: BTreeMap<String, Address>,

    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Absent means no source verification submission.
    #[serde(default)]
    pub verifier: Option<VerifierConfig>,
}

impl ProvisionConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|err| ProvisionError::Config(err.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|err| {
            ProvisionError::Config(format!("{}: {err}", path.as_ref().display()))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn named_accounts(&self) -> NamedAccounts {
        NamedAccounts::from_map(self.accounts.clone())
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}
