use dotenv::dotenv;
use horizon_admin_client::{client::KeycloakAdminClient, config::ConfigFromEnv};
use horizon_gerrit_setup::{Config, SetupConfig};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Initialize config from environment variables
    let config = SetupConfig::try_from(Config::from_env()?)?;

    let mut client = KeycloakAdminClient::new(config.keycloak.clone())?;

    let result = horizon_gerrit_setup::run(&mut client, &config).await;

    // the failure was logged with its stage, only the exit code is left to report
    Ok(horizon_gerrit_setup::report(&result))
}
