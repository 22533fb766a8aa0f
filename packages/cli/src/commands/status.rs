// ABOUTME: Configuration checklist shown by `edgecron status`
// ABOUTME: Summarizes what is set up and details the Cloudflare connection

use std::sync::Arc;

use chrono::{DateTime, Utc};
use colored::*;
use edgecron_settings::SettingsStore;

pub async fn status(store: Arc<dyn SettingsStore>) -> anyhow::Result<()> {
    let settings = store.load().await?;
    let credential = &settings.credential;

    println!("{}", "🔐 Edgecron Status".bold().cyan());
    println!();

    // A pasted API token counts as saved; OAuth additionally needs a
    // recorded authorization or a refresh token to act on
    let oauth_connected = credential.has_token()
        && (credential.connected_at > 0 || !credential.refresh_token.is_empty());

    let checks = [
        ("Site URL configured", !settings.site_url.trim().is_empty()),
        ("Secret key configured", !settings.secret_key.is_empty()),
        ("Cloudflare token saved", credential.has_token()),
        ("Cloudflare OAuth connected", oauth_connected),
    ];

    for (label, ok) in checks {
        let icon = if ok {
            "✓".green().bold()
        } else {
            "✗".red().bold()
        };
        println!("  {} {}", icon, label);
    }

    if oauth_connected {
        println!();
        if !credential.connected_email.is_empty() {
            println!("        Account: {}", credential.connected_email.cyan());
        }
        if credential.connected_at > 0 {
            println!(
                "        Connected: {}",
                format_timestamp(credential.connected_at)
            );
        }
        if credential.expires_at > 0 {
            let expires = format_timestamp(credential.expires_at);
            if credential.expires_at < Utc::now().timestamp() {
                println!("        Expires: {} {}", expires.red(), "(expired)".red());
            } else {
                println!("        Expires: {}", expires.green());
            }
        }
    }

    println!();
    println!(
        "Use {} to connect and {} to deploy",
        "edgecron connect".yellow(),
        "edgecron setup".yellow()
    );

    Ok(())
}

fn format_timestamp(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "Invalid date".to_string(),
    }
}
