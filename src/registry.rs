//! Client for the agent registry service.

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use crate::error::{RegistrationError, Result};
use crate::types::{AgentRegisterReq, AgentRegistrationResult, Challenge};

/// The service that turns a verified challenge into an API credential.
#[async_trait]
pub trait AgentRegistry: Send + Sync {
    async fn register(
        &self,
        agent_name: &str,
        challenge: &Challenge,
    ) -> Result<AgentRegistrationResult>;
}

#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: Client,
    api_url: String,
}

impl RegistryClient {
    pub fn new(http: Client, api_url: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/agent/register", self.api_url)
    }
}

#[async_trait]
impl AgentRegistry for RegistryClient {
    async fn register(
        &self,
        agent_name: &str,
        challenge: &Challenge,
    ) -> Result<AgentRegistrationResult> {
        let res = self
            .http
            .post(self.endpoint())
            .json(&AgentRegisterReq {
                agent_name,
                clawkey_challenge: challenge,
            })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(RegistrationError::RegistrationFailed {
                status: status.as_u16(),
                body,
            });
        }

        let result: AgentRegistrationResult = res.json().await?;
        info!(
            "registered agent {} (id {}), wallet {}",
            result.agent.agent_name, result.agent.id, result.wallet.wallet_address
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_normalizes_trailing_slashes() {
        let c = RegistryClient::new(Client::new(), "https://sentry.example.com//");
        assert_eq!(c.endpoint(), "https://sentry.example.com/api/agent/register");
    }
}
