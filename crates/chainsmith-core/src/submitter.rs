//! Source verification submission
//!
//! Independent of the provisioning sequence: posts each wrapped token's
//! address and constructor arguments (issuer address, name, symbol read back
//! from the live component) to an external verification service. Safe to run
//! any number of times; the service reporting the source as already verified
//! is a success.

use serde::{Deserialize, Serialize};
use serde_json::json;

use chainsmith_state::ComponentName;

use crate::chain::Method;
use crate::context::ProvisionContext;
use crate::error::{ProvisionError, Result};

/// Connection settings for the external verification service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// A token to verify: the recorded token component and the recorded
/// component that issued it (whose address is the token's constructor
/// argument).
#[derive(Debug, Clone)]
pub struct TokenVerification {
    pub token: ComponentName,
    pub issuer: ComponentName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Verified,
    AlreadyVerified,
}

/// Per-token outcome of a batch submission.
#[derive(Debug)]
pub struct SubmissionReport {
    pub token: ComponentName,
    pub outcome: Result<SubmissionStatus>,
}

pub struct VerificationSubmitter {
    config: VerifierConfig,
    http: reqwest::Client,
}

impl VerificationSubmitter {
    pub fn new(config: VerifierConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Submit one token. Requires both registry records to exist.
    pub async fn submit(
        &self,
        ctx: &ProvisionContext,
        verification: &TokenVerification,
    ) -> Result<SubmissionStatus> {
        let label = format!("submit:{}", verification.token);
        let token = ctx.require_record(&label, &verification.token).await?;
        let issuer = ctx.require_record(&label, &verification.issuer).await?;

        let name = self.read_string(ctx, token.address, "name").await?;
        let symbol = self.read_string(ctx, token.address, "symbol").await?;

        let body = json!({
            "address": format!("{:?}", token.address),
            "constructor_arguments": [format!("{:?}", issuer.address), name, symbol],
        });

        let mut request = self.http.post(&self.config.endpoint).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| ProvisionError::Submission {
                component: verification.token.as_str().to_string(),
                reason: err.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ProvisionError::Submission {
                component: verification.token.as_str().to_string(),
                reason: format!("service returned {}", response.status()),
            });
        }

        let payload: serde_json::Value =
            response
                .json()
                .await
                .map_err(|err| ProvisionError::Submission {
                    component: verification.token.as_str().to_string(),
                    reason: err.to_string(),
                })?;

        let status = if payload.get("status").and_then(|s| s.as_str()) == Some("already_verified")
        {
            SubmissionStatus::AlreadyVerified
        } else {
            SubmissionStatus::Verified
        };
        tracing::info!(token = %verification.token, ?status, "verification submitted");
        Ok(status)
    }

    /// Submit every token. A failure fails that submission only; the whole
    /// batch is independently retryable.
    pub async fn submit_all(
        &self,
        ctx: &ProvisionContext,
        verifications: &[TokenVerification],
    ) -> Vec<SubmissionReport> {
        let mut reports = Vec::with_capacity(verifications.len());
        for verification in verifications {
            let outcome = self.submit(ctx, verification).await;
            if let Err(err) = &outcome {
                tracing::warn!(token = %verification.token, %err, "submission failed");
            }
            reports.push(SubmissionReport {
                token: verification.token.clone(),
                outcome,
            });
        }
        reports
    }

    async fn read_string(
        &self,
        ctx: &ProvisionContext,
        target: ethers::types::Address,
        method: &str,
    ) -> Result<String> {
        match ctx.read(target, &Method::new(method), &[]).await? {
            ethers::abi::Token::String(value) => Ok(value),
            other => Err(ProvisionError::Submission {
                component: format!("{target:?}"),
                reason: format!("'{method}' returned {other:?}, expected a string"),
            }),
        }
    }
}
