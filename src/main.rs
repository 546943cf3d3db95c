//! `clawkey-register`: one registration run configured from the environment.

use clawkey_register::{register_agent, RegistrationConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = RegistrationConfig::from_env()?;
    info!(
        "registering agent {} with {} via {}",
        config.agent_name, config.api_url, config.clawkey_api_base
    );

    let result = match register_agent(config).await {
        Ok(result) => result,
        Err(e) => {
            error!("registration failed: {e}");
            return Err(e.into());
        }
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
