//! # CLI Interface
//!
//! Command-line arguments for `helium-constructor`, via `clap` derive. Every
//! `run` flag falls back to an environment variable so the service can be
//! configured the same way in a container.

use clap::{Parser, Subcommand};

use constructor_protocol::config::DEFAULT_PORT;
use constructor_protocol::Network;

use crate::logging::LogFormat;

/// Helium payment transaction constructor.
///
/// Builds unsigned payments, attaches client signatures, and relays signed
/// transactions to the chain API. Never holds private keys.
#[derive(Parser, Debug)]
#[command(
    name = "helium-constructor",
    about = "Helium payment transaction constructor",
    version,
    propagate_version = true
)]
pub struct ConstructorCli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP service.
    Run(RunArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Network to serve. Exactly `testnet` selects the test network;
    /// anything else selects mainnet.
    #[arg(long, env = "NETWORK", default_value = "mainnet")]
    pub network: String,

    /// Override for the chain API base URL, e.g. `http://localhost:4000/v1`.
    #[arg(long, env = "HELIUM_API_URL")]
    pub api_url: Option<String>,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

impl RunArgs {
    pub fn network(&self) -> Network {
        Network::from_env_value(&self.network)
    }

    pub fn log_format(&self) -> LogFormat {
        LogFormat::from_str_lossy(&self.log_format)
    }
}
