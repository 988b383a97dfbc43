//! Device authorization example.
//!
//! Asks for a device code, waits for the user to approve it on trakt.tv and
//! saves the token to `trakt-token.json`, then prints the user's watchlist.
//! Later runs reuse the saved token.
//!
//! Run with: cargo run --example device_auth

use std::sync::Arc;

use trakt_rs::{
    ClientConfig, Credentials, FileTokenStore, MediaType, ReqwestTransport, TraktClient,
};

#[tokio::main]
async fn main() -> trakt_rs::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = ClientConfig::default();
    let http = reqwest::Client::builder().timeout(config.timeout).build()?;
    let client = TraktClient::with_parts(
        Credentials::from_env()?,
        config,
        Arc::new(ReqwestTransport::new(http)),
        Arc::new(FileTokenStore::new("trakt-token.json")),
    )?;

    match client.token().await {
        Some(token) if token.is_expired() => {
            println!("Saved token expired, refreshing...");
            client.auth().refresh().await?;
        }
        Some(_) => println!("Using saved token."),
        None => {
            let code = client.auth().device_code().await?;
            println!(
                "Go to {} and enter the code {}",
                code.verification_url, code.user_code
            );
            client.auth().wait_for_device(&code).await?;
            println!("Authorized!");
        }
    }

    let profile = client.users().profile(None).await?;
    println!(
        "\nSigned in as {}",
        profile
            .get("username")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
    );

    for media_type in [MediaType::Movies, MediaType::Shows] {
        let items = client.sync().watchlist(media_type).await?;
        println!("\nWatchlist {} ({}):", media_type, items.len());
        for item in &items {
            println!("  - {}", item.title().unwrap_or("untitled"));
        }
    }

    Ok(())
}
