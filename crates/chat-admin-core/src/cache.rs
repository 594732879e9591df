use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use serde_json::Value;

use crate::error::TransportError;
use crate::transport::{AdminTransport, ApiRequest};

type PendingFetch = Shared<LocalBoxFuture<'static, Result<Rc<Value>, TransportError>>>;

#[derive(Default)]
struct CacheEntries {
    values: HashMap<String, Rc<Value>>,
    in_flight: HashMap<String, PendingFetch>,
}

/// GET cache keyed by request path.
///
/// Callers asking for the same key while a request is outstanding join that
/// request instead of issuing another one. Every completed request stores a
/// fresh `Rc`, so consumers can tell a new response from a cached one by
/// pointer identity.
pub struct ResourceCache<T> {
    transport: Rc<T>,
    entries: Rc<RefCell<CacheEntries>>,
}

impl<T> ResourceCache<T>
where
    T: AdminTransport + 'static,
{
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::from_shared(Rc::new(transport))
    }

    #[must_use]
    pub fn from_shared(transport: Rc<T>) -> Self {
        Self {
            transport,
            entries: Rc::new(RefCell::new(CacheEntries::default())),
        }
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn cached(&self, key: &str) -> Option<Rc<Value>> {
        self.entries.borrow().values.get(key).cloned()
    }

    #[must_use]
    pub fn is_in_flight(&self, key: &str) -> bool {
        self.entries.borrow().in_flight.contains_key(key)
    }

    /// Cached value if present, otherwise the (possibly shared) request.
    pub async fn fetch(&self, key: &str) -> Result<Rc<Value>, TransportError> {
        if let Some(value) = self.cached(key) {
            return Ok(value);
        }
        self.pending(key).await
    }

    /// Ignores cache freshness. A request already in flight may predate the
    /// caller's last write, so it is awaited and then a new one is issued.
    pub async fn revalidate(&self, key: &str) -> Result<Rc<Value>, TransportError> {
        let in_flight = self.entries.borrow().in_flight.get(key).cloned();
        if let Some(earlier) = in_flight {
            tracing::debug!(key, "revalidation waiting for an earlier fetch");
            let _ = earlier.await;
        }
        self.pending(key).await
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.borrow_mut().values.remove(key);
    }

    fn pending(&self, key: &str) -> PendingFetch {
        let mut entries = self.entries.borrow_mut();
        if let Some(pending) = entries.in_flight.get(key) {
            tracing::debug!(key, "joining in-flight resource fetch");
            return pending.clone();
        }

        let transport = Rc::clone(&self.transport);
        let shared_entries = Rc::clone(&self.entries);
        let owned_key = key.to_string();
        let pending = async move {
            tracing::debug!(key = %owned_key, "resource fetch started");
            let result = transport
                .send(ApiRequest::get(owned_key.clone()))
                .await
                .map(Rc::new);

            let mut entries = shared_entries.borrow_mut();
            entries.in_flight.remove(&owned_key);
            match &result {
                Ok(value) => {
                    entries.values.insert(owned_key, Rc::clone(value));
                }
                Err(error) => {
                    tracing::debug!(key = %owned_key, error = %error, "resource fetch failed");
                }
            }
            result
        }
        .boxed_local()
        .shared();

        entries.in_flight.insert(key.to_string(), pending.clone());
        pending
    }
}
