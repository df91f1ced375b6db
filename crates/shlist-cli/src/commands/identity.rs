//! Identity command handler

use anyhow::Result;

use shlist_core::{Config, SyncStore};

use crate::output::{Output, OutputFormat};

/// Show this installation's client identifier
///
/// The identifier is created on first use, so this also initializes it.
pub async fn whoami(store: &SyncStore, config: &Config, output: &Output) -> Result<()> {
    let client_id = store.client_id().await?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "client_id": client_id,
                    "api_url": config.api_url,
                    "secrets_path": config.secrets_path()
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", client_id);
        }
        OutputFormat::Human => {
            println!("Client ID: {}", client_id);
            println!("Service:   {}", config.api_url);
            println!();
            println!("Stored in: {}", config.secrets_path().display());
        }
    }

    Ok(())
}
