//! Log in, post a message and log out.
//!
//! Usage:
//!   LV20_USER=name LV20_PASSWORD=secret cargo run --example chat -- "hello all"
//!   cargo run --example chat -- --debug "hello all"
//!
//! Environment:
//!   LV20_URL       endpoint, defaults to the public service
//!   LV20_USER      account name
//!   LV20_PASSWORD  account password
//!   LV20_TELL      optional recipient for a private message

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use anyhow::{Context, bail};
use lv20_client::{Chat, Client, ClientOptions, Subscription};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let debug = args.iter().any(|a| a == "--debug");
    init_logging(debug);

    let text = args
        .iter()
        .filter(|a| !a.starts_with("--"))
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");

    if let Err(e) = run(&text).await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

async fn run(text: &str) -> anyhow::Result<()> {
    println!("=== LV-20 chat ===\n");

    let mut options = ClientOptions::new().with_login_timeout(Duration::from_secs(10));
    if let Ok(url) = std::env::var("LV20_URL") {
        options = options.with_url(url);
    }

    let user = std::env::var("LV20_USER").context("LV20_USER is not set")?;
    let password = std::env::var("LV20_PASSWORD").context("LV20_PASSWORD is not set")?;

    let client = Client::builder().options(options).build()?;

    // ========================================================================
    // Session
    // ========================================================================

    println!("[1] Connecting to {}", client.options().url);
    if !client.connect().await? {
        bail!("server did not establish a session in time");
    }
    println!("    ✓ Session {:?}\n", client.session().session_id);

    println!("[2] Logging in as {user}");
    if !client.login(&user, &password).await? {
        bail!("login was not confirmed in time");
    }
    println!("    ✓ {:?}\n", client.state());

    client.subscribe(&Subscription::Globals)?;

    // ========================================================================
    // Chat
    // ========================================================================

    if !text.is_empty() {
        println!("[3] Posting to {}", Chat::Universe);
        client.send(Chat::Universe, text)?;

        if let Ok(recipient) = std::env::var("LV20_TELL") {
            println!("    Telling {recipient}");
            client.tell(&recipient, text)?;
        }
        println!();
    }

    // ========================================================================
    // Shutdown
    // ========================================================================

    println!("[4] Closing");
    client.close().await?;
    println!("    ✓ {:?}", client.state());

    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(debug: bool) {
    let filter = if debug {
        "lv20_client=debug,lv20_client::traffic=trace"
    } else {
        "lv20_client=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}
