//! Local storage layer
//!
//! The only state kept on the device is the client identifier, held in a
//! [`SecretStore`]. Lists themselves always live on the remote service.

pub mod error;
pub mod secrets;

pub use error::{StorageError, StorageResult};
pub use secrets::{FileSecretStore, MemorySecretStore, SecretStore};
