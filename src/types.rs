//! Wire types shared by the ClawKey and registry clients.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Signed assertion binding a device identity to one registration attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub device_id: String,
    /// SPKI DER, base64.
    pub public_key: String,
    pub message: String,
    /// Ed25519 over `message`, base64.
    pub signature: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSession {
    pub session_id: String,
    pub registration_url: String,
    pub expires_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Completed,
    Expired,
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionStatus::Pending)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Completed => "completed",
            SessionStatus::Expired => "expired",
            SessionStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Deserialize)]
pub struct SessionStatusRes {
    pub status: SessionStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifySignatureRes {
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub registered: bool,
}

#[derive(Serialize)]
pub struct AgentRegisterReq<'a> {
    pub agent_name: &'a str,
    pub clawkey_challenge: &'a Challenge,
}

/// What the registry hands back once the agent exists. The caller owns
/// persisting it; `api_key` is the credential for every later call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRegistrationResult {
    #[serde(default)]
    pub success: bool,
    pub agent: RegisteredAgent,
    #[serde(rename = "apiKey")]
    pub api_key: String,
    pub wallet: AgentWallet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredAgent {
    pub id: i64,
    pub agent_name: String,
    #[serde(default)]
    pub moltbook_handle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentWallet {
    pub wallet_address: String,
    #[serde(default)]
    pub harvest_wallet_address: Option<String>,
    #[serde(default)]
    pub agent_id: Option<i64>,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub moltbook_handle: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub created: bool,
}
