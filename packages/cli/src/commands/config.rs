// ABOUTME: CLI commands for reading and writing the stored settings
// ABOUTME: `config show` masks secrets; `config set` writes one key at a time

use std::sync::Arc;

use clap::Subcommand;
use colored::*;
use edgecron_settings::types::SUGGESTED_SCOPE;
use edgecron_settings::SettingsStore;

const VALID_KEYS: &str = "site_url, worker_name, cron_expression, secret_key, \
     oauth.client_id, oauth.client_secret, oauth.auth_url, oauth.token_url, \
     oauth.scope, api_token";

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the stored settings with secrets masked
    Show,
    /// Set one settings value
    Set {
        /// Settings key, e.g. site_url or oauth.client_id
        key: String,
        /// New value
        value: String,
    },
}

pub async fn handle_config(
    store: Arc<dyn SettingsStore>,
    command: ConfigCommands,
) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Show => show(store).await,
        ConfigCommands::Set { key, value } => set(store, &key, &value).await,
    }
}

async fn show(store: Arc<dyn SettingsStore>) -> anyhow::Result<()> {
    let settings = store.load().await?;

    println!("{}", "⚙️  Edgecron Settings".bold().cyan());
    println!();
    println!("  site_url:            {}", shown(&settings.site_url));
    println!("  worker_name:         {}", shown(&settings.worker_name));
    println!(
        "  cron_expression:     {}",
        shown(&settings.cron_expression)
    );
    println!("  secret_key:          {}", masked(&settings.secret_key));
    println!("  oauth.client_id:     {}", shown(&settings.oauth.client_id));
    println!(
        "  oauth.client_secret: {}",
        masked(&settings.oauth.client_secret)
    );
    println!("  oauth.auth_url:      {}", shown(&settings.oauth.auth_url));
    println!("  oauth.token_url:     {}", shown(&settings.oauth.token_url));
    println!("  oauth.scope:         {}", shown(&settings.oauth.scope));
    println!(
        "  api_token:           {}",
        masked(&settings.credential.access_token)
    );

    if settings.oauth.scope.trim().is_empty() {
        println!();
        println!("Suggested OAuth scope: {}", SUGGESTED_SCOPE.yellow());
    }

    Ok(())
}

async fn set(store: Arc<dyn SettingsStore>, key: &str, value: &str) -> anyhow::Result<()> {
    let mut settings = store.load().await?;

    match key {
        "site_url" => settings.site_url = value.to_string(),
        "worker_name" => settings.worker_name = value.to_string(),
        "cron_expression" => settings.cron_expression = value.to_string(),
        "secret_key" => settings.secret_key = value.to_string(),
        "oauth.client_id" => settings.oauth.client_id = value.to_string(),
        "oauth.client_secret" => settings.oauth.client_secret = value.to_string(),
        "oauth.auth_url" => settings.oauth.auth_url = value.to_string(),
        "oauth.token_url" => settings.oauth.token_url = value.to_string(),
        "oauth.scope" => settings.oauth.scope = value.to_string(),
        // A static API token shares the access-token slot with OAuth
        "api_token" => settings.credential.access_token = value.to_string(),
        _ => anyhow::bail!("Unknown settings key: {}. Valid keys: {}", key, VALID_KEYS),
    }

    store.save(&settings).await?;
    println!("{} {} updated", "✓".green().bold(), key);

    Ok(())
}

fn shown(value: &str) -> String {
    if value.trim().is_empty() {
        "(not set)".dimmed().to_string()
    } else {
        value.to_string()
    }
}

fn masked(value: &str) -> String {
    if value.trim().is_empty() {
        "(not set)".dimmed().to_string()
    } else {
        "(set)".green().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgecron_settings::{MemoryStore, Settings};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn set_writes_one_key_and_rejects_unknown_ones() {
        let store: Arc<dyn SettingsStore> = Arc::new(MemoryStore::new(Settings::default()));

        set(store.clone(), "site_url", "https://example.com")
            .await
            .unwrap();
        set(store.clone(), "api_token", "cf-token").await.unwrap();
        set(store.clone(), "oauth.client_id", "cid").await.unwrap();

        let settings = store.load().await.unwrap();
        assert_eq!(settings.site_url, "https://example.com");
        assert_eq!(settings.credential.access_token, "cf-token");
        assert_eq!(settings.oauth.client_id, "cid");

        let err = set(store.clone(), "nope", "x").await.unwrap_err();
        assert!(err.to_string().contains("Unknown settings key: nope"));
    }

    #[test]
    fn masking_never_prints_secret_material() {
        assert!(masked("super-secret").contains("(set)"));
        assert!(!masked("super-secret").contains("super-secret"));
        assert!(masked("  ").contains("(not set)"));
    }
}
