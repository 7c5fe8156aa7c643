//! CLI command handlers.

use reqwest::Method;

use super::{Cli, LoginArgs, RequestArgs};
use crate::client::AuthClient;
use crate::config::ClientConfig;
use crate::http::ApiRequest;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Build a file-backed client from env config plus CLI overrides.
pub fn client_from_cli(cli: &Cli) -> Result<AuthClient, Box<dyn std::error::Error>> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.base_url {
        config.base_url = url.clone();
    }
    if let Some(profile) = &cli.profile {
        config.profile = profile.clone();
    }
    Ok(AuthClient::with_file_store(config)?)
}

/// Handle `authflight login <identifier>`.
pub async fn handle_login(client: &AuthClient, args: &LoginArgs) -> CliResult {
    client.login(&args.identifier, &args.password).await?;
    println!("✅ Logged in as {}", args.identifier);
    Ok(())
}

/// Handle `authflight logout`.
pub fn handle_logout(client: &AuthClient) -> CliResult {
    client.logout()?;
    println!("Logged out");
    Ok(())
}

/// Handle `authflight status`.
pub fn handle_status(client: &AuthClient) -> CliResult {
    match (client.access_token(), client.refresh_token()) {
        (Some(access), Some(refresh)) => {
            println!("✅ Session stored");
            println!("   access:  {}", redact(&access));
            println!("   refresh: {}", redact(&refresh));
        }
        _ => println!("Not logged in"),
    }
    Ok(())
}

/// Handle `authflight request <METHOD> <PATH>`.
pub async fn handle_request(client: &AuthClient, args: &RequestArgs) -> CliResult {
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .map_err(|_| format!("Invalid HTTP method: '{}'", args.method))?;
    let mut request = ApiRequest::new(method, args.path.clone());
    if let Some(raw) = &args.json {
        let body: serde_json::Value = serde_json::from_str(raw)?;
        request = request.with_json(&body)?;
    }

    let response = client.authenticated_request(request).await?;
    eprintln!("status: {}", response.status);
    println!("{}", response.text());
    Ok(())
}

fn redact(token: &str) -> String {
    let visible: String = token.chars().take(6).collect();
    if token.chars().count() <= 6 {
        "*".repeat(token.chars().count())
    } else {
        format!("{visible}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_hides_short_tokens_entirely() {
        assert_eq!(redact("abc"), "***");
        assert_eq!(redact("abcdefghij"), "abcdef…");
    }
}
