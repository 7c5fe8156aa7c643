//! authflight: an authenticated HTTP client with single-flight token refresh.
//!
//! Every request goes out with the current bearer token. When the server
//! answers 401, exactly one refresh is issued no matter how many requests
//! observe the rejection concurrently; the rest wait for its outcome and are
//! retried once with the new token.
//!
//! # Quick Start
//!
//! ```no_run
//! use authflight::{AuthClient, ClientConfig};
//!
//! # async fn example() -> authflight::error::Result<()> {
//! let client = AuthClient::with_file_store(ClientConfig::from_env()?)?;
//! client.login("1234@1234.com", "secret").await?;
//! let response = client.get("/chat/history").await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;

pub use client::AuthClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
