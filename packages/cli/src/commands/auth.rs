// ABOUTME: CLI commands for the Cloudflare OAuth connection
// ABOUTME: Browser-based connect, disconnect, and the configuration probe

use std::process;
use std::sync::Arc;

use colored::*;
use edgecron_auth::{CallbackServer, OAuthManager};
use edgecron_settings::SettingsStore;
use tracing::debug;

/// Run the authorization-code flow end to end in the terminal.
///
/// Opens the browser at the authorization URL, waits for the loopback
/// redirect, and exchanges the code. The URL is always printed so the
/// flow still works when no browser can be launched.
pub async fn connect(store: Arc<dyn SettingsStore>) -> anyhow::Result<()> {
    let manager = OAuthManager::new(store);
    let auth_url = manager.start().await?;

    println!("{}", "🔐 Connecting to Cloudflare...".bold().cyan());
    println!();
    println!("Open this URL in your browser to authorize:");
    println!();
    println!("  {}", auth_url.cyan());
    println!();

    if let Err(e) = open::that(&auth_url) {
        debug!("Could not open the browser automatically: {}", e);
    }

    println!("{}", "Waiting for the authorization to finish...".dimmed());

    let params = CallbackServer::new().wait_for_callback().await?;
    let email = manager.complete_callback(params).await?;

    println!();
    if email.is_empty() {
        println!("{} Cloudflare connected", "✓".green().bold());
    } else {
        println!(
            "{} Cloudflare connected as {}",
            "✓".green().bold(),
            email.cyan()
        );
    }
    println!(
        "   Run {} to deploy the cron Worker",
        "edgecron setup".yellow()
    );

    Ok(())
}

pub async fn disconnect(store: Arc<dyn SettingsStore>) -> anyhow::Result<()> {
    OAuthManager::new(store).disconnect().await?;
    println!("{} Cloudflare credential removed", "✓".green().bold());
    Ok(())
}

/// Print every probe check and exit non-zero when any failed
pub async fn probe(store: Arc<dyn SettingsStore>) -> anyhow::Result<()> {
    let manager = OAuthManager::new(store);

    println!("{}", "📡 OAuth Configuration Probe".bold().cyan());
    println!();

    let checks = manager.probe().await?;
    let mut failed = 0;

    for check in &checks {
        let icon = if check.ok {
            "✓".green().bold()
        } else {
            "✗".red().bold()
        };
        println!("  {} {}", icon, check.label.bold());
        println!("        {}", check.detail.dimmed());
        if !check.ok {
            failed += 1;
        }
    }

    println!();
    if failed == 0 {
        println!("{} All {} checks passed", "✓".green().bold(), checks.len());
        Ok(())
    } else {
        println!(
            "{} {} of {} checks failed",
            "✗".red().bold(),
            failed,
            checks.len()
        );
        process::exit(1);
    }
}
