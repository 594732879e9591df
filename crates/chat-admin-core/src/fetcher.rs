use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::cache::ResourceCache;
use crate::error::TransportError;
use crate::model::ChatId;
use crate::transport::AdminTransport;

/// Snapshot of the globally selected chat, handed to every controller call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChatSelection {
    pub is_loaded: bool,
    pub selected: Option<ChatId>,
}

impl ChatSelection {
    #[must_use]
    pub fn loaded(chat_id: ChatId) -> Self {
        Self {
            is_loaded: true,
            selected: Some(chat_id),
        }
    }

    /// The chat to administer, once the chat list has loaded.
    #[must_use]
    pub fn active_chat(&self) -> Option<ChatId> {
        if self.is_loaded { self.selected } else { None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// No key: nothing selected or the chat list is still loading.
    Idle,
    /// A response object this fetcher has not seen before.
    Fresh(Rc<Value>),
    /// The same response object as last time.
    Unchanged,
    Failed(TransportError),
    /// The key changed while the request was in flight; the result was dropped.
    Stale,
}

#[derive(Debug, Default)]
struct FetcherState {
    key: Option<String>,
    data: Option<Rc<Value>>,
    error: Option<TransportError>,
}

pub struct RemoteRecordFetcher {
    endpoint: fn(ChatId) -> String,
    state: RefCell<FetcherState>,
}

impl RemoteRecordFetcher {
    #[must_use]
    pub fn new(endpoint: fn(ChatId) -> String) -> Self {
        Self {
            endpoint,
            state: RefCell::new(FetcherState::default()),
        }
    }

    #[must_use]
    pub fn request_key(&self, selection: &ChatSelection) -> Option<String> {
        selection.active_chat().map(self.endpoint)
    }

    #[must_use]
    pub fn key(&self) -> Option<String> {
        self.state.borrow().key.clone()
    }

    #[must_use]
    pub fn data(&self) -> Option<Rc<Value>> {
        self.state.borrow().data.clone()
    }

    #[must_use]
    pub fn error(&self) -> Option<TransportError> {
        self.state.borrow().error.clone()
    }

    /// Points the fetcher at the key for `selection` and loads it. Switching
    /// keys drops the previous key's data before anything is awaited.
    pub async fn sync<T>(&self, cache: &ResourceCache<T>, selection: &ChatSelection) -> FetchOutcome
    where
        T: AdminTransport + 'static,
    {
        let key = self.request_key(selection);
        {
            let mut state = self.state.borrow_mut();
            if state.key != key {
                tracing::debug!(from = ?state.key, to = ?key, "fetch key changed");
                *state = FetcherState {
                    key: key.clone(),
                    data: None,
                    error: None,
                };
            }
        }

        let Some(key) = key else {
            return FetchOutcome::Idle;
        };
        let result = cache.fetch(&key).await;
        self.accept(&key, result)
    }

    pub async fn revalidate<T>(&self, cache: &ResourceCache<T>) -> FetchOutcome
    where
        T: AdminTransport + 'static,
    {
        let Some(key) = self.key() else {
            return FetchOutcome::Idle;
        };
        let result = cache.revalidate(&key).await;
        self.accept(&key, result)
    }

    fn accept(&self, key: &str, result: Result<Rc<Value>, TransportError>) -> FetchOutcome {
        let mut state = self.state.borrow_mut();
        if state.key.as_deref() != Some(key) {
            tracing::debug!(key, "dropping response for a key that is no longer current");
            return FetchOutcome::Stale;
        }

        match result {
            Ok(value) => {
                state.error = None;
                if state
                    .data
                    .as_ref()
                    .is_some_and(|current| Rc::ptr_eq(current, &value))
                {
                    return FetchOutcome::Unchanged;
                }
                state.data = Some(Rc::clone(&value));
                FetchOutcome::Fresh(value)
            }
            Err(error) => {
                state.error = Some(error.clone());
                FetchOutcome::Failed(error)
            }
        }
    }
}
