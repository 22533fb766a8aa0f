//! Provisioning and trigger-test commands

use std::process;
use std::sync::Arc;

use colored::*;
use edgecron_provision::SetupOrchestrator;
use edgecron_settings::SettingsStore;
use edgecron_trigger::{run_probe, TriggerClient};

/// Run the full auto-setup pipeline and report its outcome
pub async fn setup(store: Arc<dyn SettingsStore>) -> anyhow::Result<()> {
    println!("{}", "🚀 Provisioning the cron Worker...".bold().cyan());
    println!();

    let outcome = SetupOrchestrator::new(store).run().await;

    if outcome.ok {
        println!("{} {}", "✓".green().bold(), outcome.message);
        println!(
            "   Run {} to confirm the endpoint answers",
            "edgecron test".yellow()
        );
        Ok(())
    } else {
        println!("{} {}", "✗".red().bold(), outcome.message);
        process::exit(1);
    }
}

/// Fire one trigger request the way the deployed Worker does
pub async fn test(store: Arc<dyn SettingsStore>) -> anyhow::Result<()> {
    let settings = store.load().await?;

    println!("{}", "⏱  Triggering the cron endpoint...".bold().cyan());
    println!();

    let client = TriggerClient::new();
    let outcome = run_probe(&client, &settings.site_url, &settings.secret_key).await;

    if outcome.is_success() {
        println!("{} {}", "✓".green().bold(), outcome);
        Ok(())
    } else {
        println!("{} {}", "✗".red().bold(), outcome);
        process::exit(1);
    }
}
