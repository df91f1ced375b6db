//! Client identity management
//!
//! Every list on the remote service is scoped to the installation that
//! created it. The scope is a random identifier generated on first use and
//! kept in secret storage under the `clientId` key. It is never rotated or
//! deleted by the client.

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::storage::{FileSecretStore, SecretStore, StorageResult};

/// Secret storage key holding the client identifier
pub const CLIENT_ID_KEY: &str = "clientId";

/// Identity provider for this installation
pub struct Identity {
    store: Box<dyn SecretStore>,
    cached: Option<String>,
}

impl Identity {
    /// Create an identity provider over any secret store
    pub fn new(store: impl SecretStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            cached: None,
        }
    }

    /// Create an identity provider using the configured secrets file
    pub fn from_config(config: &Config) -> Self {
        Self::new(FileSecretStore::from_config(config))
    }

    /// Read the persisted identifier without creating one
    pub fn client_id(&self) -> StorageResult<Option<String>> {
        if let Some(ref id) = self.cached {
            return Ok(Some(id.clone()));
        }
        Ok(self
            .store
            .get(CLIENT_ID_KEY)?
            .filter(|id| !id.trim().is_empty()))
    }

    /// Return the identifier, generating and persisting one on first use
    ///
    /// A blank persisted value counts as absent. If persisting the new
    /// identifier fails, the error is returned and nothing is cached, so no
    /// list operation can run under an identifier that would not survive a
    /// restart.
    pub fn get_or_create_client_id(&mut self) -> StorageResult<String> {
        if let Some(id) = self.client_id()? {
            self.cached = Some(id.clone());
            return Ok(id);
        }

        let id = Uuid::new_v4().to_string();
        debug!("No client identifier stored, generating one");
        self.store.set(CLIENT_ID_KEY, &id)?;
        info!("Created client identifier {}", id);

        self.cached = Some(id.clone());
        Ok(id)
    }
}
