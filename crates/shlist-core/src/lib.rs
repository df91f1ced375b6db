//! shlist Core Library
//!
//! This crate provides the client side of shlist, a shopping-list service:
//! users create named lists of items, complete them, and browse their
//! history. Lists live on a remote REST service; this crate keeps the local
//! view of them in step.
//!
//! # Architecture
//!
//! - **Remote service**: [`ListService`] trait, [`HttpListService`] over reqwest
//! - **Identity**: a random client identifier scoping every query to this
//!   installation, kept in a [`SecretStore`]
//! - **Pagination**: a [`Cursor`] per category, with request generations so
//!   stale responses are dropped
//! - **Store**: [`SyncStore`], shared by the views, carrying the history
//!   refresh signal
//! - **Views**: [`ActiveLists`] and [`HistoryLists`]
//!
//! # Quick Start
//!
//! ```text
//! let store = Arc::new(SyncStore::open()?);
//! let active = ActiveLists::new(Arc::clone(&store));
//!
//! active.create(&NewList::new("weekly", ["eggs", "bread"])).await?;
//! active.load_more().await?;
//! let snapshot = active.snapshot().await;
//! ```
//!
//! # Modules
//!
//! - `api`: Remote list service client
//! - `config`: Application configuration
//! - `error`: Operation errors
//! - `identity`: Client identifier management
//! - `models`: Lists, pages and request bodies
//! - `pagination`: Per-category cursor
//! - `storage`: Local secret storage
//! - `store`: Shared synchronization store
//! - `views`: Active and history views

pub mod api;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod pagination;
pub mod storage;
pub mod store;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{HttpListService, ListService, PAGE_SIZE};
pub use config::Config;
pub use error::ShlistError;
pub use identity::Identity;
pub use models::{Ack, Category, Item, ListId, ListItem, ListUpdate, NewList, Page, ServerId};
pub use pagination::{ApplyOutcome, ContentOrder, Cursor, PaginationState};
pub use storage::{FileSecretStore, MemorySecretStore, SecretStore, StorageError};
pub use store::SyncStore;
pub use views::{ActiveLists, HistoryLists, ListSnapshot, MutationOutcome};
