//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dnac_domain::Scheme;

#[derive(Debug, Parser)]
#[command(name = "dnac-session")]
#[command(about = "Log in to a DNA Center controller and reuse its session cookies")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// URL scheme for controller calls
    #[arg(long, global = true)]
    pub scheme: Option<Scheme>,

    /// Accept any server certificate (lab controllers only)
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Directory holding the session file
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session cookies
    Login {
        /// Controller host or host:port
        controller: String,

        /// Account name
        #[arg(short, long, env = "DNAC_USERNAME")]
        username: String,

        /// Account password
        #[arg(short, long, env = "DNAC_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Print the headers for an authenticated call
    Headers {
        /// Controller host or host:port
        controller: String,
    },

    /// Forget the stored session
    Logout {
        /// Controller host or host:port
        controller: String,
    },

    /// Show whether a controller has a stored session
    Status {
        /// Controller host or host:port; all stored controllers when omitted
        controller: Option<String>,
    },

    /// Print the URL of a controller service
    Url {
        /// Controller host or host:port
        controller: String,

        /// Service path, e.g. /dna/intent/api/v1/network-device
        path: Option<String>,
    },

    /// Send an authenticated GET and print the response body
    Get {
        /// Controller host or host:port
        controller: String,

        /// Service path, e.g. /dna/intent/api/v1/network-device
        path: String,
    },
}
