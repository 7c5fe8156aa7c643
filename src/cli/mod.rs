//! CLI entry point for authflight.

pub mod auth;

use clap::{Parser, Subcommand};

/// authflight CLI
#[derive(Parser, Debug)]
#[command(name = "authflight", version, about = "Authenticated HTTP client CLI")]
pub struct Cli {
    /// Server base URL (overrides AUTHFLIGHT_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Session profile name
    #[arg(long, global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session
    Login(LoginArgs),
    /// Forget the stored session
    Logout,
    /// Show whether a session is stored
    Status,
    /// Send an authenticated request
    Request(RequestArgs),
}

/// Arguments for `authflight login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Account identifier (usually an email address)
    pub identifier: String,

    /// Password; read from AUTHFLIGHT_PASSWORD when omitted
    #[arg(long, env = "AUTHFLIGHT_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Arguments for `authflight request`.
#[derive(Parser, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, DELETE, ...)
    pub method: String,

    /// Path relative to the base URL
    pub path: String,

    /// JSON body
    #[arg(long)]
    pub json: Option<String>,
}
