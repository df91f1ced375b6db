//! List views
//!
//! [`ActiveLists`] and [`HistoryLists`] are what a screen renders. Each owns
//! the pagination cursor for its category and turns user intents into store
//! operations followed by the refetch the operation calls for:
//!
//! | Intent | View | Follow-up |
//! |---|---|---|
//! | create | active | refetch active page 0 |
//! | complete | active | raise history refresh signal, refetch active page 0 |
//! | update | active | refetch active page 0 |
//! | delete (confirmed) | history | refetch history page 0 |
//!
//! Nothing is inserted or toggled optimistically; the views show only what
//! the service returned.
//!
//! Methods take `&self`. The cursor lock is never held while waiting on the
//! network, so fetches may overlap; the cursor's request generations decide
//! which response wins.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::ShlistError;
use crate::models::{Ack, Category, ListItem, ListUpdate, NewList, ServerId};
use crate::pagination::{ApplyOutcome, ContentOrder, Cursor, PageRequest, PaginationState};
use crate::store::SyncStore;

/// Point-in-time copy of a view, for rendering
#[derive(Debug, Clone, Serialize)]
pub struct ListSnapshot {
    pub category: Category,
    pub lists: Vec<ListItem>,
    #[serde(flatten)]
    pub state: PaginationState,
    pub total_elements: u64,
}

/// Result of a mutation and the refetch that followed it
#[derive(Debug)]
pub struct MutationOutcome {
    pub ack: Ack,
    /// The follow-up refetch; a failure here does not undo the mutation
    pub refresh: Result<ApplyOutcome, ShlistError>,
}

/// Cursor plus the store it loads from
struct ListFeed {
    store: Arc<SyncStore>,
    cursor: Mutex<Cursor>,
}

impl ListFeed {
    fn new(store: Arc<SyncStore>, cursor: Cursor) -> Self {
        Self {
            store,
            cursor: Mutex::new(cursor),
        }
    }

    async fn fetch_page(&self, page: u32, append: bool) -> Result<ApplyOutcome, ShlistError> {
        let request = self.cursor.lock().await.begin(page, append);
        self.run(request).await
    }

    async fn load_more(&self) -> Result<Option<ApplyOutcome>, ShlistError> {
        let Some(request) = self.cursor.lock().await.next_request() else {
            debug!("Load more skipped");
            return Ok(None);
        };
        self.run(request).await.map(Some)
    }

    async fn run(&self, request: PageRequest) -> Result<ApplyOutcome, ShlistError> {
        debug!(
            "Fetching {} page {} (append={}, generation={})",
            request.category,
            request.page,
            request.append,
            request.generation()
        );

        match self.store.fetch_page(request.category, request.page).await {
            Ok(page) => {
                let outcome = self.cursor.lock().await.apply(&request, page);
                if outcome == ApplyOutcome::Stale {
                    debug!(
                        "Discarding stale {} page {} (generation {})",
                        request.category,
                        request.page,
                        request.generation()
                    );
                }
                Ok(outcome)
            }
            Err(e) => {
                warn!("Fetching {} page {} failed: {}", request.category, request.page, e);
                self.cursor.lock().await.fail(&request);
                Err(e)
            }
        }
    }

    async fn snapshot(&self) -> ListSnapshot {
        let cursor = self.cursor.lock().await;
        ListSnapshot {
            category: cursor.category(),
            lists: cursor.items().to_vec(),
            state: cursor.state(),
            total_elements: cursor.total_elements(),
        }
    }

    async fn find(&self, id: ServerId) -> Option<ListItem> {
        self.cursor
            .lock()
            .await
            .items()
            .iter()
            .find(|l| l.id.server_id() == Some(id))
            .cloned()
    }
}

/// View of lists still in use
pub struct ActiveLists {
    feed: ListFeed,
}

impl ActiveLists {
    pub fn new(store: Arc<SyncStore>) -> Self {
        Self::with_order(store, ContentOrder::for_category(Category::Active))
    }

    /// View with a specific content ordering
    pub fn with_order(store: Arc<SyncStore>, order: ContentOrder) -> Self {
        Self {
            feed: ListFeed::new(store, Cursor::new(Category::Active).with_order(order)),
        }
    }

    /// Replace the view with page 0
    pub async fn refresh(&self) -> Result<ApplyOutcome, ShlistError> {
        self.feed.fetch_page(0, false).await
    }

    /// Fetch a page, appending to or replacing what is loaded
    pub async fn fetch_page(&self, page: u32, append: bool) -> Result<ApplyOutcome, ShlistError> {
        self.feed.fetch_page(page, append).await
    }

    /// Append the next page; `None` if nothing was requested
    pub async fn load_more(&self) -> Result<Option<ApplyOutcome>, ShlistError> {
        self.feed.load_more().await
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        self.feed.snapshot().await
    }

    /// Create a list, then refetch page 0 to show it
    pub async fn create(&self, list: &NewList) -> Result<MutationOutcome, ShlistError> {
        let ack = self.feed.store.create_list(list).await?;
        Ok(MutationOutcome {
            ack,
            refresh: self.refresh().await,
        })
    }

    /// Complete a list and tell the history view to refetch
    pub async fn complete(&self, id: ServerId) -> Result<MutationOutcome, ShlistError> {
        let ack = self.feed.store.complete_list(id).await?;
        self.feed.store.request_history_refresh();
        Ok(MutationOutcome {
            ack,
            refresh: self.refresh().await,
        })
    }

    /// Replace a list's name and items, then refetch page 0
    pub async fn update(&self, id: ServerId, update: &ListUpdate) -> Result<MutationOutcome, ShlistError> {
        let ack = self.feed.store.update_list(id, update).await?;
        Ok(MutationOutcome {
            ack,
            refresh: self.refresh().await,
        })
    }

    /// Loaded list with this id
    pub async fn find(&self, id: ServerId) -> Option<ListItem> {
        self.feed.find(id).await
    }
}

/// View of completed lists
pub struct HistoryLists {
    feed: ListFeed,
}

impl HistoryLists {
    pub fn new(store: Arc<SyncStore>) -> Self {
        Self {
            feed: ListFeed::new(store, Cursor::new(Category::Completed)),
        }
    }

    /// Replace the view with page 0
    pub async fn refresh(&self) -> Result<ApplyOutcome, ShlistError> {
        self.feed.fetch_page(0, false).await
    }

    /// Fetch a page, appending to or replacing what is loaded
    pub async fn fetch_page(&self, page: u32, append: bool) -> Result<ApplyOutcome, ShlistError> {
        self.feed.fetch_page(page, append).await
    }

    /// Append the next page; `None` if nothing was requested
    pub async fn load_more(&self) -> Result<Option<ApplyOutcome>, ShlistError> {
        self.feed.load_more().await
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        self.feed.snapshot().await
    }

    /// Loaded list with this id
    pub async fn find(&self, id: ServerId) -> Option<ListItem> {
        self.feed.find(id).await
    }

    /// Delete a completed list after the user confirms
    ///
    /// `confirm` receives a prompt naming the list. If it returns `false`
    /// no request is sent and `Ok(None)` is returned.
    pub async fn delete<F>(&self, id: ServerId, confirm: F) -> Result<Option<MutationOutcome>, ShlistError>
    where
        F: FnOnce(&str) -> bool,
    {
        let prompt = match self.find(id).await {
            Some(list) => format!("Delete list {} ({})?", list.name, id),
            None => format!("Delete list {}?", id),
        };
        if !confirm(&prompt) {
            debug!("Delete of list {} cancelled", id);
            return Ok(None);
        }

        let ack = self.feed.store.delete_list(id).await?;
        Ok(Some(MutationOutcome {
            ack,
            refresh: self.refresh().await,
        }))
    }

    /// Refetch page 0 if the active view asked for it
    ///
    /// The flag is cleared before fetching, so a completion that lands
    /// while the fetch is in flight raises it again. Returns `None` when no
    /// refresh was pending.
    pub async fn sync_if_signalled(&self) -> Option<Result<ApplyOutcome, ShlistError>> {
        if !self.feed.store.take_history_refresh() {
            return None;
        }
        debug!("History refresh signal consumed");
        Some(self.refresh().await)
    }

    /// Refetch whenever the refresh signal is raised
    ///
    /// Runs until the returned task is aborted.
    pub fn spawn_refresh_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let mut signal = self.feed.store.subscribe_history_refresh();
        let history = Arc::clone(self);

        tokio::spawn(async move {
            loop {
                let pending = *signal.borrow_and_update();
                if pending {
                    if let Some(Err(e)) = history.sync_if_signalled().await {
                        warn!("History refresh failed: {}", e);
                    }
                }
                if signal.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}
