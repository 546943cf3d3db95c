//! Client for the ClawKey identity-verification service.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::error::{RegistrationError, Result};
use crate::types::{Challenge, SessionStatus, SessionStatusRes, VerificationSession, VerifySignatureRes};

pub const DEFAULT_API_BASE: &str = "https://api.clawkey.ai/v1";

/// The three remote steps of the verification handshake.
#[async_trait]
pub trait VerificationService: Send + Sync {
    /// Open a verification session. `None` means the device is already
    /// verified and there is nothing to wait for.
    async fn initiate(&self, challenge: &Challenge) -> Result<Option<VerificationSession>>;

    async fn poll_status(&self, session_id: &str) -> Result<SessionStatus>;

    /// Succeeds only when the service reports the device both verified and
    /// registered.
    async fn verify_signature(&self, challenge: &Challenge) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct ClawkeyClient {
    http: Client,
    api_base: String,
}

impl ClawkeyClient {
    pub fn new(http: Client, api_base: impl Into<String>) -> Self {
        let api_base: String = api_base.into();
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

#[async_trait]
impl VerificationService for ClawkeyClient {
    async fn initiate(&self, challenge: &Challenge) -> Result<Option<VerificationSession>> {
        let res = self
            .http
            .post(format!("{}/agent/register/init", self.api_base))
            .json(challenge)
            .send()
            .await?;

        if res.status() == StatusCode::CONFLICT {
            debug!("device {} already verified", challenge.device_id);
            return Ok(None);
        }
        if !res.status().is_success() {
            return Err(remote_error("init", res).await);
        }
        Ok(Some(res.json::<VerificationSession>().await?))
    }

    async fn poll_status(&self, session_id: &str) -> Result<SessionStatus> {
        let res = self
            .http
            .get(format!(
                "{}/agent/register/{}/status",
                self.api_base,
                urlencoding::encode(session_id)
            ))
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(remote_error("status", res).await);
        }
        Ok(res.json::<SessionStatusRes>().await?.status)
    }

    async fn verify_signature(&self, challenge: &Challenge) -> Result<()> {
        let res = self
            .http
            .post(format!("{}/agent/verify/signature", self.api_base))
            .json(challenge)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(remote_error("verify", res).await);
        }

        let body = res.text().await?;
        // an unparseable body confirms nothing
        let parsed: VerifySignatureRes = serde_json::from_str(&body).unwrap_or_default();
        if parsed.verified && parsed.registered {
            Ok(())
        } else {
            warn!(
                verified = parsed.verified,
                registered = parsed.registered,
                "signature verification not confirmed"
            );
            Err(RegistrationError::VerificationFailed { body })
        }
    }
}

async fn remote_error(operation: &'static str, res: reqwest::Response) -> RegistrationError {
    let status = res.status().as_u16();
    let body = res.text().await.unwrap_or_default();
    RegistrationError::RemoteError {
        operation,
        status,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let c = ClawkeyClient::new(Client::new(), "https://api.clawkey.ai/v1///");
        assert_eq!(c.api_base(), DEFAULT_API_BASE);
    }
}
