//! Errors surfaced by list operations
//!
//! Every operation either succeeds or fails with one [`ShlistError`]; the
//! caller turns it into a notification with [`ShlistError::user_message`].
//! Nothing is retried automatically.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::Category;
use crate::storage::StorageError;

/// Generic text shown for connectivity problems
pub const NETWORK_FAILED_MESSAGE: &str =
    "Could not reach the list service. Check your connection and try again.";

/// Errors from list operations
#[derive(Error, Debug)]
pub enum ShlistError {
    /// Input rejected, either locally or by the service
    #[error("{message}: {}", format_fields(.fields))]
    ValidationFailed {
        message: String,
        fields: BTreeMap<String, String>,
    },

    /// Connectivity, timeout, or a response that could not be understood
    #[error("Network request failed: {message}")]
    NetworkFailed { message: String },

    /// The service answered with an error and an explanation
    #[error("List service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The list does not exist (any more)
    #[error("List not found: {message}")]
    NotFound { message: String },

    /// The client identifier could not be read or stored
    #[error("Client identity unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    /// Loading a page failed; view state was left untouched
    #[error("Failed to load {category} lists: {source}")]
    FetchFailed {
        category: Category,
        #[source]
        source: Box<ShlistError>,
    },
}

impl ShlistError {
    /// Wrap an error as a failed fetch of `category`
    pub fn fetch_failed(category: Category, source: ShlistError) -> Self {
        ShlistError::FetchFailed {
            category,
            source: Box::new(source),
        }
    }

    /// Text for a user-facing notification
    ///
    /// Validation messages are shown verbatim, one field per line.
    pub fn user_message(&self) -> String {
        match self {
            ShlistError::ValidationFailed { message, fields } => {
                if fields.is_empty() {
                    message.clone()
                } else {
                    format_fields(fields)
                }
            }
            ShlistError::NetworkFailed { .. } => NETWORK_FAILED_MESSAGE.to_string(),
            ShlistError::Rejected { message, .. } => message.clone(),
            ShlistError::NotFound { .. } => {
                "That list no longer exists. Refresh and try again.".to_string()
            }
            ShlistError::StorageUnavailable(e) => match e.recovery_suggestion() {
                Some(hint) => format!("{} {}", e, hint),
                None => e.to_string(),
            },
            ShlistError::FetchFailed { source, .. } => source.user_message(),
        }
    }

    /// Heading for the notification
    pub fn title(&self) -> &'static str {
        match self {
            ShlistError::ValidationFailed { .. } => "Validation error",
            ShlistError::FetchFailed { .. } => "Could not load lists",
            _ => "Error",
        }
    }
}

impl From<reqwest::Error> for ShlistError {
    fn from(error: reqwest::Error) -> Self {
        ShlistError::NetworkFailed {
            message: error.to_string(),
        }
    }
}

fn format_fields(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("\n")
}
