//! Data models for shlist
//!
//! Wire-compatible with the list service's JSON: field names are camelCase
//! and unknown fields in responses are ignored.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ShlistError;

/// Server-assigned list identifier
pub type ServerId = i64;

/// Identity of a list
///
/// Lists only get a server id once the service has stored them. Drafts shown
/// before that carry a local id from a separate id space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListId {
    /// Assigned by the service
    Confirmed(ServerId),
    /// Temporary id for a list the service has not stored yet
    Local(String),
}

impl ListId {
    /// New random local id
    pub fn local() -> Self {
        ListId::Local(format!("local-{}", Uuid::new_v4()))
    }

    /// The server id, if the list has been stored
    pub fn server_id(&self) -> Option<ServerId> {
        match self {
            ListId::Confirmed(id) => Some(*id),
            ListId::Local(_) => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, ListId::Local(_))
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListId::Confirmed(id) => write!(f, "{}", id),
            ListId::Local(id) => write!(f, "{}", id),
        }
    }
}

/// One entry of a shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ServerId>,
    pub name: String,
}

/// A shopping list as returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: ListId,
    pub name: String,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
    /// `true` while active, `false` once completed
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl ListItem {
    /// Category this list belongs to
    pub fn category(&self) -> Category {
        if self.enabled {
            Category::Active
        } else {
            Category::Completed
        }
    }
}

/// One page of a paginated response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    /// Zero-based page index
    pub number: u32,
}

impl<T> Page<T> {
    /// Whether pages exist after this one
    pub fn has_more(&self) -> bool {
        has_more_after(self.number, self.total_pages)
    }
}

/// `page < total_pages - 1`, false for an empty result
pub fn has_more_after(page: u32, total_pages: u32) -> bool {
    total_pages > 0 && page < total_pages - 1
}

/// Partition of lists served by its own endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Lists still in use (`enabled = true`)
    Active,
    /// Completed lists, shown as history (`enabled = false`)
    Completed,
}

impl Category {
    /// Path segment of the fetch endpoint
    pub fn path_segment(&self) -> &'static str {
        match self {
            Category::Active => "active-list",
            Category::Completed => "history-list",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Active => write!(f, "active"),
            Category::Completed => write!(f, "history"),
        }
    }
}

/// Input for creating a list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewList {
    pub name: String,
    pub items: Vec<String>,
}

impl NewList {
    pub fn new<I, S>(name: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Trim and uppercase the name and every item name
    ///
    /// Fails with per-field messages when the name is blank, there are no
    /// items, or an item name is blank.
    pub fn normalized(&self) -> Result<ListContent, ShlistError> {
        let mut fields = BTreeMap::new();

        let name = normalize_name(&self.name);
        if name.is_empty() {
            fields.insert("name".to_string(), "Name cannot be blank".to_string());
        }

        if self.items.is_empty() {
            fields.insert("items".to_string(), "Add at least one item".to_string());
        }
        let mut items = Vec::with_capacity(self.items.len());
        for (index, item) in self.items.iter().enumerate() {
            let item = normalize_name(item);
            if item.is_empty() {
                fields.insert(format!("items[{}]", index), "Item cannot be blank".to_string());
            }
            items.push(item);
        }

        if !fields.is_empty() {
            return Err(ShlistError::ValidationFailed {
                message: "Validation error".to_string(),
                fields,
            });
        }

        Ok(ListContent { name, items })
    }

    /// Draft shown before the service confirms the list
    pub fn preview(&self) -> Result<ListItem, ShlistError> {
        let content = self.normalized()?;
        Ok(ListItem {
            id: ListId::local(),
            name: content.name,
            items: content
                .items
                .into_iter()
                .map(|name| Item { id: None, name })
                .collect(),
            created_date: Some(Utc::now()),
            enabled: true,
            client_id: None,
        })
    }
}

/// Full replacement of a list's name and items
pub type ListUpdate = NewList;

/// Normalized name and items, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListContent {
    pub name: String,
    pub items: Vec<String>,
}

fn normalize_name(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Body of create and update requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    pub name: String,
    pub items: Vec<ItemRequest>,
    pub client_id: String,
}

impl ListRequest {
    pub fn new(content: ListContent, client_id: impl Into<String>) -> Self {
        Self {
            name: content.name,
            items: content
                .items
                .into_iter()
                .map(|name| ItemRequest { name })
                .collect(),
            client_id: client_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
    pub name: String,
}

/// Body of the complete request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub enabled: bool,
}

/// Acknowledgement returned by mutations
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_trims_and_uppercases() {
        let content = NewList::new("  milk  ", ["eggs", " bread "])
            .normalized()
            .unwrap();

        assert_eq!(content.name, "MILK");
        assert_eq!(content.items, vec!["EGGS", "BREAD"]);
    }

    #[test]
    fn test_normalize_reports_every_field() {
        let err = NewList::new("   ", ["eggs", "  "]).normalized().unwrap_err();

        match err {
            ShlistError::ValidationFailed { fields, .. } => {
                assert!(fields.contains_key("name"));
                assert!(fields.contains_key("items[1]"));
                assert!(!fields.contains_key("items[0]"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_normalize_requires_items() {
        let err = NewList::new("weekly", Vec::<String>::new())
            .normalized()
            .unwrap_err();
        assert!(matches!(err, ShlistError::ValidationFailed { ref fields, .. } if fields.contains_key("items")));
    }

    #[test]
    fn test_preview_has_local_id() {
        let draft = NewList::new("party", ["chips"]).preview().unwrap();

        assert!(draft.id.is_local());
        assert!(draft.id.server_id().is_none());
        assert_eq!(draft.name, "PARTY");
        assert_eq!(draft.category(), Category::Active);
    }

    #[test]
    fn test_list_request_wire_format() {
        let content = NewList::new("milk", ["eggs"]).normalized().unwrap();
        let body = serde_json::to_value(ListRequest::new(content, "client-1")).unwrap();

        assert_eq!(
            body,
            json!({"name": "MILK", "items": [{"name": "EGGS"}], "clientId": "client-1"})
        );
    }

    #[test]
    fn test_list_id_wire_forms() {
        let confirmed: ListId = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(confirmed, ListId::Confirmed(42));

        let local: ListId = serde_json::from_value(json!("local-1")).unwrap();
        assert_eq!(local, ListId::Local("local-1".to_string()));
    }

    #[test]
    fn test_page_from_service_json() {
        let page: Page<ListItem> = serde_json::from_value(json!({
            "content": [{
                "id": 7,
                "name": "WEEKLY",
                "createdDate": "2024-05-01T10:20:30.123+00:00",
                "enabled": false,
                "items": [{"id": 1, "name": "EGGS"}]
            }],
            "pageable": {"pageNumber": 0, "pageSize": 5},
            "totalElements": 6,
            "totalPages": 2,
            "number": 0,
            "size": 5
        }))
        .unwrap();

        assert_eq!(page.content.len(), 1);
        let list = &page.content[0];
        assert_eq!(list.id.server_id(), Some(7));
        assert_eq!(list.category(), Category::Completed);
        assert!(list.created_date.is_some());
        assert_eq!(list.items[0].id, Some(1));
        assert!(page.has_more());
    }

    #[test]
    fn test_has_more_after() {
        assert!(!has_more_after(0, 0));
        assert!(!has_more_after(0, 1));
        assert!(has_more_after(0, 2));
        assert!(!has_more_after(1, 2));
        assert!(!has_more_after(5, 2));
    }
}
