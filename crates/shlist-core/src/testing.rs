//! In-memory list service for tests
//!
//! Behaves like the real service: lists are sorted newest first, pages hold
//! five lists, completing flips `enabled`. Every call is recorded. Fetches
//! can be held back with a gate to simulate slow responses.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::api::{ListService, PAGE_SIZE};
use crate::error::ShlistError;
use crate::models::{Ack, Category, Item, ListId, ListItem, ListRequest, Page, ServerId};

/// A recorded service call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch {
        category: Category,
        client_id: String,
        page: u32,
    },
    Create(ListRequest),
    Complete(ServerId),
    Update(ServerId, ListRequest),
    Delete(ServerId),
}

#[derive(Default)]
struct FakeState {
    lists: Vec<ListItem>,
    next_id: ServerId,
    calls: Vec<Call>,
    failing_fetches: usize,
}

#[derive(Default)]
pub struct FakeListService {
    state: Mutex<FakeState>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeListService {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_id: 1,
                ..FakeState::default()
            }),
            gate: None,
        }
    }

    /// Service holding `active` and `completed` lists (ids as given)
    pub fn with_lists(active: &[ServerId], completed: &[ServerId]) -> Self {
        let service = Self::new();
        {
            let mut state = service.state.lock().unwrap();
            for &id in active {
                state.lists.push(list(id, true));
            }
            for &id in completed {
                state.lists.push(list(id, false));
            }
            state.next_id = active.iter().chain(completed).max().copied().unwrap_or(0) + 1;
        }
        service
    }

    /// Hold every fetch until a permit is added to the returned semaphore
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Fetch { .. }))
            .count()
    }

    /// Make the next `n` fetches fail with a network error
    pub fn fail_next_fetches(&self, n: usize) {
        self.state.lock().unwrap().failing_fetches = n;
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn find(state: &mut FakeState, id: ServerId) -> Result<&mut ListItem, ShlistError> {
        state
            .lists
            .iter_mut()
            .find(|l| l.id == ListId::Confirmed(id))
            .ok_or_else(|| ShlistError::NotFound {
                message: format!("List {} not found", id),
            })
    }
}

fn list(id: ServerId, enabled: bool) -> ListItem {
    ListItem {
        id: ListId::Confirmed(id),
        name: format!("LIST {}", id),
        items: vec![Item {
            id: Some(id * 10),
            name: "ITEM".to_string(),
        }],
        created_date: None,
        enabled,
        client_id: None,
    }
}

fn ack(message: &str) -> Ack {
    Ack {
        message: message.to_string(),
    }
}

#[async_trait]
impl ListService for FakeListService {
    async fn fetch_page(
        &self,
        category: Category,
        client_id: &str,
        page: u32,
    ) -> Result<Page<ListItem>, ShlistError> {
        let failing = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Fetch {
                category,
                client_id: client_id.to_string(),
                page,
            });
            if state.failing_fetches > 0 {
                state.failing_fetches -= 1;
                true
            } else {
                false
            }
        };

        if let Some(ref gate) = self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        if failing {
            return Err(ShlistError::NetworkFailed {
                message: "connection reset".to_string(),
            });
        }

        let state = self.state.lock().unwrap();
        let mut matching: Vec<ListItem> = state
            .lists
            .iter()
            .filter(|l| l.category() == category)
            .filter(|l| l.client_id.as_deref().map_or(true, |owner| owner == client_id))
            .cloned()
            .collect();
        matching.sort_by_key(|l| std::cmp::Reverse(l.id.server_id()));

        let total_elements = matching.len() as u64;
        let total_pages = matching.len().div_ceil(PAGE_SIZE as usize) as u32;
        let content = matching
            .into_iter()
            .skip(page as usize * PAGE_SIZE as usize)
            .take(PAGE_SIZE as usize)
            .collect();

        Ok(Page {
            content,
            total_elements,
            total_pages,
            number: page,
        })
    }

    async fn create(&self, request: &ListRequest) -> Result<Ack, ShlistError> {
        self.record(Call::Create(request.clone()));
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        state.lists.push(ListItem {
            id: ListId::Confirmed(id),
            name: request.name.clone(),
            items: request
                .items
                .iter()
                .map(|i| Item {
                    id: None,
                    name: i.name.clone(),
                })
                .collect(),
            created_date: None,
            enabled: true,
            client_id: Some(request.client_id.clone()),
        });
        Ok(ack("List is created."))
    }

    async fn complete(&self, id: ServerId) -> Result<Ack, ShlistError> {
        self.record(Call::Complete(id));
        let mut state = self.state.lock().unwrap();
        Self::find(&mut state, id)?.enabled = false;
        Ok(ack("List is completed."))
    }

    async fn update(&self, id: ServerId, request: &ListRequest) -> Result<Ack, ShlistError> {
        self.record(Call::Update(id, request.clone()));
        let mut state = self.state.lock().unwrap();
        let list = Self::find(&mut state, id)?;
        list.name = request.name.clone();
        list.items = request
            .items
            .iter()
            .map(|i| Item {
                id: None,
                name: i.name.clone(),
            })
            .collect();
        Ok(ack("List is updated."))
    }

    async fn delete(&self, id: ServerId) -> Result<Ack, ShlistError> {
        self.record(Call::Delete(id));
        let mut state = self.state.lock().unwrap();
        Self::find(&mut state, id)?;
        state.lists.retain(|l| l.id != ListId::Confirmed(id));
        Ok(ack("List is deleted."))
    }
}
