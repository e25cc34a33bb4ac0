use canary_mesh::adapters::start_api_server;
use canary_mesh::agent::build_sensor;
use canary_mesh::cli::{Cli, Commands};
use canary_mesh::config::AppConfig;
use canary_mesh::error::{CanaryError, Result};
use tracing::{error, info};

pub(crate) async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::Serve { port }) => run_serve(cli, *port).await,
        Some(Commands::Agent {
            vault_url,
            hostname,
        }) => run_agent(cli, vault_url.clone(), hostname.clone()).await,
        Some(Commands::CheckConfig) => {
            crate::main_runtime::init_logging_simple();
            let config = AppConfig::load_from(&cli.config)?;
            validate(&config)?;
            println!("✓ Configuration OK");
            println!("  vault:  {}", config.vault.log_path().display());
            println!("  listen: {}:{}", config.server.bind, config.server.port);
            println!("  agent → {}", config.agent.vault_url);
            Ok(())
        }
        None => run_serve(cli, None).await,
    }
}

fn validate(config: &AppConfig) -> Result<()> {
    if let Err(errors) = config.validate() {
        for e in &errors {
            error!("Config error: {}", e);
        }
        return Err(CanaryError::Validation(errors.join("; ")));
    }
    Ok(())
}

async fn run_serve(cli: &Cli, port: Option<u16>) -> Result<()> {
    let mut config = AppConfig::load_from(&cli.config)?;
    crate::main_runtime::init_logging(&config.logging);
    if let Some(port) = port {
        config.server.port = port;
    }
    validate(&config)?;
    start_api_server(&config).await
}

async fn run_agent(cli: &Cli, vault_url: Option<String>, hostname: Option<String>) -> Result<()> {
    let mut config = AppConfig::load_from(&cli.config)?;
    crate::main_runtime::init_logging(&config.logging);
    if let Some(url) = vault_url {
        config.agent.vault_url = url;
    }
    if hostname.is_some() {
        config.agent.hostname = hostname;
    }
    validate(&config)?;

    let sensor = build_sensor(&config.agent)?;
    info!(vault = %config.agent.vault_url, "Starting canary sensor");

    tokio::select! {
        _ = sensor.run() => Ok(()),
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, sensor stopping");
            Ok(())
        }
    }
}
