//! Synchronization store
//!
//! The `SyncStore` is the one process-wide object shared by the list views.
//! It owns:
//! - the handle to the remote list service
//! - the client identity, resolved lazily on the first list operation
//! - the "history needs refetch" signal raised by the active view when a
//!   list is completed and consumed by the history view
//!
//! Views hold it as `Arc<SyncStore>`; there is no global instance.
//!
//! ## Usage
//!
//! ```ignore
//! let store = Arc::new(SyncStore::open()?);
//! let active = ActiveLists::new(Arc::clone(&store));
//! let history = Arc::new(HistoryLists::new(store));
//! let _listener = history.spawn_refresh_listener();
//!
//! active.refresh().await?;
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

use crate::api::{HttpListService, ListService};
use crate::config::Config;
use crate::error::ShlistError;
use crate::identity::Identity;
use crate::models::{Ack, Category, ListItem, ListRequest, ListUpdate, NewList, Page, ServerId};

/// Shared state for the list views
pub struct SyncStore {
    service: Arc<dyn ListService>,
    identity: Mutex<Identity>,
    history_refresh: watch::Sender<bool>,
}

impl SyncStore {
    /// Create a store over a service and identity provider
    pub fn new(service: Arc<dyn ListService>, identity: Identity) -> Self {
        let (history_refresh, _) = watch::channel(false);
        Self {
            service,
            identity: Mutex::new(identity),
            history_refresh,
        }
    }

    /// Open the store with configuration from the default location
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(&config)
    }

    /// Open the store against the configured deployment
    pub fn open_with_config(config: &Config) -> Result<Self> {
        let service = HttpListService::from_config(config)
            .with_context(|| format!("Failed to create client for {}", config.api_url))?;
        Ok(Self::new(Arc::new(service), Identity::from_config(config)))
    }

    /// The installation's client identifier, created on first use
    pub async fn client_id(&self) -> Result<String, ShlistError> {
        let mut identity = self.identity.lock().await;
        Ok(identity.get_or_create_client_id()?)
    }

    // ==================== Remote Operations ====================

    /// Fetch one page of a category for this installation
    pub async fn fetch_page(&self, category: Category, page: u32) -> Result<Page<ListItem>, ShlistError> {
        let client_id = self.client_id().await?;
        self.service
            .fetch_page(category, &client_id, page)
            .await
            .map_err(|e| ShlistError::fetch_failed(category, e))
    }

    /// Send a new list
    ///
    /// Validation happens before anything is sent.
    pub async fn create_list(&self, list: &NewList) -> Result<Ack, ShlistError> {
        let content = list.normalized()?;
        let client_id = self.client_id().await?;
        let ack = self.service.create(&ListRequest::new(content, client_id)).await?;
        info!("Created list {}", list.name.trim().to_uppercase());
        Ok(ack)
    }

    /// Mark a list completed
    pub async fn complete_list(&self, id: ServerId) -> Result<Ack, ShlistError> {
        self.client_id().await?;
        let ack = self.service.complete(id).await?;
        info!("Completed list {}", id);
        Ok(ack)
    }

    /// Replace a list's name and items
    pub async fn update_list(&self, id: ServerId, update: &ListUpdate) -> Result<Ack, ShlistError> {
        let content = update.normalized()?;
        let client_id = self.client_id().await?;
        let ack = self
            .service
            .update(id, &ListRequest::new(content, client_id))
            .await?;
        info!("Updated list {}", id);
        Ok(ack)
    }

    /// Delete a list
    ///
    /// Callers are responsible for confirming with the user first.
    pub async fn delete_list(&self, id: ServerId) -> Result<Ack, ShlistError> {
        self.client_id().await?;
        let ack = self.service.delete(id).await?;
        info!("Deleted list {}", id);
        Ok(ack)
    }

    // ==================== History Refresh Signal ====================

    /// Subscribe to changes of the history refresh flag
    pub fn subscribe_history_refresh(&self) -> watch::Receiver<bool> {
        self.history_refresh.subscribe()
    }

    /// Mark the history as needing a refetch
    pub fn request_history_refresh(&self) {
        let raised = self.history_refresh.send_if_modified(|pending| {
            let changed = !*pending;
            *pending = true;
            changed
        });
        if raised {
            debug!("History refresh requested");
        }
    }

    /// Whether a history refetch is pending
    pub fn history_refresh_pending(&self) -> bool {
        *self.history_refresh.borrow()
    }

    /// Consume the flag, returning whether it was set
    pub fn take_history_refresh(&self) -> bool {
        let mut was_pending = false;
        self.history_refresh.send_if_modified(|pending| {
            was_pending = *pending;
            *pending = false;
            was_pending
        });
        was_pending
    }
}
