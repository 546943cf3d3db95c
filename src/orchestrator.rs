//! Registration handshake.
//!
//! ```text
//! Start ─┬─ SessionInitiated ── Polling ─┐
//!        └─ AlreadyVerified ─────────────┴─ SignatureVerifying ── Registering ── Done
//! ```
//!
//! Each state owns the one [`Challenge`] built in `Start`; it is moved from
//! state to state and never rebuilt, so init, verify and register all carry
//! the same signature. Any error aborts the attempt.

use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::{debug, info};

use crate::challenge;
use crate::clawkey::{ClawkeyClient, VerificationService};
use crate::clock::{Clock, TokioClock};
use crate::config::RegistrationConfig;
use crate::error::{RegistrationError, Result};
use crate::identity;
use crate::registry::{AgentRegistry, RegistryClient};
use crate::types::{AgentRegistrationResult, Challenge, SessionStatus, VerificationSession};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub enum HandshakeState {
    Start,
    SessionInitiated {
        challenge: Challenge,
        session: VerificationSession,
    },
    AlreadyVerified {
        challenge: Challenge,
    },
    Polling {
        challenge: Challenge,
        session_id: String,
        started: Instant,
    },
    SignatureVerifying {
        challenge: Challenge,
    },
    Registering {
        challenge: Challenge,
    },
    Done(AgentRegistrationResult),
}

impl HandshakeState {
    pub fn name(&self) -> &'static str {
        match self {
            HandshakeState::Start => "start",
            HandshakeState::SessionInitiated { .. } => "session_initiated",
            HandshakeState::AlreadyVerified { .. } => "already_verified",
            HandshakeState::Polling { .. } => "polling",
            HandshakeState::SignatureVerifying { .. } => "signature_verifying",
            HandshakeState::Registering { .. } => "registering",
            HandshakeState::Done(_) => "done",
        }
    }
}

pub struct Orchestrator<V, R, C = TokioClock> {
    config: RegistrationConfig,
    verifier: V,
    registry: R,
    clock: C,
}

impl Orchestrator<ClawkeyClient, RegistryClient, TokioClock> {
    /// Wire up the real HTTP clients for `config`.
    pub fn from_config(config: RegistrationConfig) -> Result<Self> {
        let http = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        let verifier = ClawkeyClient::new(http.clone(), config.clawkey_api_base.clone());
        let registry = RegistryClient::new(http, config.api_url.clone());
        Ok(Self::new(config, verifier, registry, TokioClock))
    }
}

impl<V, R, C> Orchestrator<V, R, C>
where
    V: VerificationService,
    R: AgentRegistry,
    C: Clock,
{
    pub fn new(config: RegistrationConfig, verifier: V, registry: R, clock: C) -> Self {
        Self {
            config,
            verifier,
            registry,
            clock,
        }
    }

    /// Drive the handshake from `Start` to `Done`.
    pub async fn run(&self) -> Result<AgentRegistrationResult> {
        let mut state = HandshakeState::Start;
        loop {
            state = match self.step(state).await? {
                HandshakeState::Done(result) => return Ok(result),
                next => next,
            };
        }
    }

    /// Perform the work of `state` and return the state that follows it.
    /// `Polling` yields another `Polling` after each pending status.
    pub async fn step(&self, state: HandshakeState) -> Result<HandshakeState> {
        let from = state.name();
        let next = match state {
            HandshakeState::Start => {
                let identity = identity::load(self.config.identity_path.as_deref())?;
                let challenge = challenge::build(&identity)?;
                info!("starting ClawKey handshake for device {}", challenge.device_id);

                match self.verifier.initiate(&challenge).await? {
                    Some(session) => HandshakeState::SessionInitiated { challenge, session },
                    None => HandshakeState::AlreadyVerified { challenge },
                }
            }
            HandshakeState::SessionInitiated { challenge, session } => {
                println!(
                    "Open this link to complete verification: {}",
                    session.registration_url
                );
                info!(
                    session_id = %session.session_id,
                    expires_at = %session.expires_at,
                    "waiting for out-of-band approval"
                );
                HandshakeState::Polling {
                    challenge,
                    session_id: session.session_id,
                    started: self.clock.now(),
                }
            }
            HandshakeState::AlreadyVerified { challenge } => {
                info!("device already verified, skipping approval");
                HandshakeState::SignatureVerifying { challenge }
            }
            HandshakeState::Polling {
                challenge,
                session_id,
                started,
            } => {
                let elapsed = self.clock.now().saturating_duration_since(started);
                if elapsed >= self.config.poll_timeout {
                    return Err(RegistrationError::HandshakeTimeout(self.config.poll_timeout));
                }

                let status = self.verifier.poll_status(&session_id).await?;
                debug!(%status, terminal = status.is_terminal(), ?elapsed, "polled session");
                match status {
                    SessionStatus::Completed => HandshakeState::SignatureVerifying { challenge },
                    SessionStatus::Expired | SessionStatus::Failed => {
                        return Err(RegistrationError::HandshakeTerminated { reason: status });
                    }
                    SessionStatus::Pending => {
                        self.clock.sleep(self.config.poll_interval).await;
                        HandshakeState::Polling {
                            challenge,
                            session_id,
                            started,
                        }
                    }
                }
            }
            HandshakeState::SignatureVerifying { challenge } => {
                self.verifier.verify_signature(&challenge).await?;
                HandshakeState::Registering { challenge }
            }
            HandshakeState::Registering { challenge } => {
                let result = self
                    .registry
                    .register(&self.config.agent_name, &challenge)
                    .await?;
                HandshakeState::Done(result)
            }
            done @ HandshakeState::Done(_) => done,
        };
        if next.name() != from {
            debug!("handshake {from} -> {}", next.name());
        }
        Ok(next)
    }
}

/// Run one registration attempt against the real services.
pub async fn register_agent(config: RegistrationConfig) -> Result<AgentRegistrationResult> {
    Orchestrator::from_config(config)?.run().await
}
