//! Provision an OpenClaw device identity with ClawKey and exchange the proof
//! for an agent API key on the registry service.
//!
//! ```no_run
//! # async fn demo() -> clawkey_register::Result<()> {
//! use clawkey_register::{register_agent, RegistrationConfig};
//!
//! let config = RegistrationConfig::new("https://sentry.example.com", "bot1");
//! let result = register_agent(config).await?;
//! println!("api key issued for agent {}", result.agent.id);
//! # Ok(())
//! # }
//! ```

pub mod challenge;
pub mod clawkey;
pub mod clock;
pub mod config;
pub mod error;
pub mod identity;
pub mod orchestrator;
pub mod registry;
pub mod types;

pub use clawkey::{ClawkeyClient, VerificationService, DEFAULT_API_BASE};
pub use clock::{Clock, ManualClock, TokioClock};
pub use config::RegistrationConfig;
pub use error::{RegistrationError, Result};
pub use identity::DeviceIdentity;
pub use orchestrator::{register_agent, HandshakeState, Orchestrator};
pub use registry::{AgentRegistry, RegistryClient};
pub use types::{AgentRegistrationResult, Challenge, SessionStatus, VerificationSession};
