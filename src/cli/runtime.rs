use clap::{Parser, Subcommand};

/// Runtime CLI for the vault and the endpoint sensor.
#[derive(Parser, Debug)]
#[command(name = "canary-mesh")]
#[command(version = "0.1.0")]
#[command(
    about = "Canary-file deception mesh: coordination vault and endpoint sensor",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config directory (default.toml plus the CANARY_ENV overlay)
    #[arg(short, long, default_value = "config")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the coordination API (vault + dashboard backend)
    Serve {
        /// Port to listen on (default: from config/env, usually 8000)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run the endpoint sensor on this host
    Agent {
        /// Vault API base URL, e.g. http://10.0.0.5:8000/api
        #[arg(long, env = "CANARY_VAULT_URL")]
        vault_url: Option<String>,
        /// Hostname to report instead of the OS hostname
        #[arg(long)]
        hostname: Option<String>,
    },

    /// Load and validate the configuration, then exit
    CheckConfig,
}
