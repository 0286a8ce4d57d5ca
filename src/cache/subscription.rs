//! Live query subscriptions and the views they expose.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tokio::sync::watch;

use crate::endpoint::Payload;
use crate::transport::ApiError;

use super::keys::QueryKey;
use super::store::{CacheStore, Lease, Subscribed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryOptions {
    /// Do not touch the cache or the network; the view stays `Uninitialized`.
    pub skip: bool,
}

impl QueryOptions {
    pub fn skip(skip: bool) -> Self {
        Self { skip }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Uninitialized,
    Pending,
    Fulfilled,
    Rejected,
}

impl QueryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryStatus::Uninitialized => "uninitialized",
            QueryStatus::Pending => "pending",
            QueryStatus::Fulfilled => "fulfilled",
            QueryStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Erased state of one cache entry, published to every subscriber.
#[derive(Clone)]
pub struct Snapshot {
    pub status: QueryStatus,
    pub data: Option<Arc<Payload>>,
    pub error: Option<ApiError>,
    pub is_fetching: bool,
    pub is_stale: bool,
}

impl Snapshot {
    pub fn uninitialized() -> Self {
        Self {
            status: QueryStatus::Uninitialized,
            data: None,
            error: None,
            is_fetching: false,
            is_stale: false,
        }
    }

    pub(crate) fn rejected(error: ApiError) -> Self {
        Self {
            status: QueryStatus::Rejected,
            error: Some(error),
            ..Self::uninitialized()
        }
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("status", &self.status)
            .field("has_data", &self.data.is_some())
            .field("error", &self.error)
            .field("is_fetching", &self.is_fetching)
            .field("is_stale", &self.is_stale)
            .finish()
    }
}

/// Typed view of a cache entry at one point in time.
pub struct QueryView<T> {
    pub status: QueryStatus,
    /// Last successful payload; kept while a refetch is in flight.
    pub data: Option<Arc<T>>,
    pub error: Option<ApiError>,
    /// Fetching and no data has ever been received for this key.
    pub is_loading: bool,
    pub is_fetching: bool,
    pub is_stale: bool,
}

impl<T: Any + Send + Sync> QueryView<T> {
    pub(crate) fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut error = snapshot.error.clone();
        let data = match snapshot.data.clone().map(|data| data.downcast::<T>()) {
            Some(Ok(data)) => Some(data),
            Some(Err(_)) => {
                error = Some(ApiError::Parse(format!(
                    "cached payload is not a `{}`",
                    std::any::type_name::<T>()
                )));
                None
            }
            None => None,
        };
        Self {
            status: snapshot.status,
            is_loading: snapshot.is_fetching && data.is_none(),
            data,
            error,
            is_fetching: snapshot.is_fetching,
            is_stale: snapshot.is_stale,
        }
    }
}

impl<T> QueryView<T> {
    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Fulfilled
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Rejected
    }

    /// Settled outcome: the error of a rejected fetch, otherwise the data.
    pub fn into_result(self) -> Result<Arc<T>, ApiError> {
        if self.status == QueryStatus::Rejected {
            return Err(self
                .error
                .unwrap_or_else(|| ApiError::request("query failed without an error value")));
        }
        match (self.data, self.error) {
            (Some(data), _) => Ok(data),
            (None, Some(error)) => Err(error),
            (None, None) if self.status == QueryStatus::Uninitialized => {
                Err(ApiError::request("query was skipped"))
            }
            (None, None) => Err(ApiError::request("query has not settled")),
        }
    }
}

impl<T> Clone for QueryView<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            is_loading: self.is_loading,
            is_fetching: self.is_fetching,
            is_stale: self.is_stale,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for QueryView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryView")
            .field("status", &self.status)
            .field("data", &self.data)
            .field("error", &self.error)
            .field("is_loading", &self.is_loading)
            .field("is_fetching", &self.is_fetching)
            .field("is_stale", &self.is_stale)
            .finish()
    }
}

/// A live dependency on one cache entry.
///
/// Dropping the subscription releases the entry; once it has no subscribers
/// left it is evicted after the configured grace period.
pub struct QuerySubscription<T> {
    key: Option<QueryKey>,
    receiver: watch::Receiver<Snapshot>,
    store: Option<(CacheStore, Lease)>,
    _type: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> QuerySubscription<T> {
    pub(crate) fn attached(store: CacheStore, key: QueryKey, subscribed: Subscribed) -> Self {
        Self {
            key: Some(key),
            receiver: subscribed.receiver,
            store: Some((store, subscribed.lease)),
            _type: PhantomData,
        }
    }

    /// A subscription that never receives updates (skipped or failed to start).
    pub(crate) fn detached(key: Option<QueryKey>, snapshot: Snapshot) -> Self {
        let (_sender, receiver) = watch::channel(snapshot);
        Self {
            key,
            receiver,
            store: None,
            _type: PhantomData,
        }
    }

    pub fn key(&self) -> Option<&QueryKey> {
        self.key.as_ref()
    }

    /// Whether this subscription still follows a live cache entry.
    ///
    /// False for skipped and rejected-at-subscribe queries, and after a reset.
    pub fn is_attached(&self) -> bool {
        match (&self.store, &self.key) {
            (Some((store, lease)), Some(key)) => store.holds(key, *lease),
            _ => false,
        }
    }

    pub fn current(&self) -> QueryView<T> {
        QueryView::from_snapshot(&self.receiver.borrow())
    }

    /// Wait for the next state change. `None` once no further updates can
    /// arrive (skipped subscription, or the store was reset).
    pub async fn changed(&mut self) -> Option<QueryView<T>> {
        self.store.as_ref()?;
        match self.receiver.changed().await {
            Ok(()) => Some(QueryView::from_snapshot(&self.receiver.borrow_and_update())),
            Err(_) => None,
        }
    }

    /// Wait until no fetch is in flight for this entry, then return its view.
    pub async fn settled(&mut self) -> QueryView<T> {
        if let (Some((store, lease)), Some(key)) = (&self.store, &self.key) {
            while let Some(done) = store.in_flight(key, *lease) {
                done.await;
            }
        }
        QueryView::from_snapshot(&self.receiver.borrow_and_update())
    }

    /// Start a new fetch for this entry, superseding any in-flight one.
    pub fn refetch(&self) {
        if let (Some((store, lease)), Some(key)) = (&self.store, &self.key) {
            store.refetch(key, *lease);
        }
    }
}

impl<T> Drop for QuerySubscription<T> {
    fn drop(&mut self) {
        if let (Some((store, lease)), Some(key)) = (self.store.take(), self.key.as_ref()) {
            store.release(key, lease);
        }
    }
}

impl<T> fmt::Debug for QuerySubscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySubscription")
            .field("key", &self.key)
            .field("attached", &self.store.is_some())
            .field("snapshot", &*self.receiver.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fulfilled(data: Arc<Payload>) -> Snapshot {
        Snapshot {
            status: QueryStatus::Fulfilled,
            data: Some(data),
            ..Snapshot::uninitialized()
        }
    }

    #[test]
    fn view_downcasts_payload() {
        let snapshot = fulfilled(Arc::new(vec![1u32, 2]));
        let view = QueryView::<Vec<u32>>::from_snapshot(&snapshot);
        assert!(view.is_success());
        assert_eq!(view.data.as_deref(), Some(&vec![1, 2]));
        assert!(!view.is_loading);
    }

    #[test]
    fn view_reports_type_mismatch_as_error() {
        let snapshot = fulfilled(Arc::new("text".to_string()));
        let view = QueryView::<Vec<u32>>::from_snapshot(&snapshot);
        assert!(view.data.is_none());
        assert!(matches!(view.error, Some(ApiError::Parse(_))));
    }

    #[test]
    fn loading_only_without_data() {
        let mut snapshot = Snapshot {
            status: QueryStatus::Pending,
            is_fetching: true,
            ..Snapshot::uninitialized()
        };
        assert!(QueryView::<u32>::from_snapshot(&snapshot).is_loading);

        snapshot.data = Some(Arc::new(5u32));
        let view = QueryView::<u32>::from_snapshot(&snapshot);
        assert!(!view.is_loading);
        assert!(view.is_fetching);
    }

    #[test]
    fn into_result_prefers_rejection() {
        let view = QueryView::<u32>::from_snapshot(&Snapshot::rejected(ApiError::http(
            422,
            serde_json::json!({"message": "X"}),
        )));
        let err = view.into_result().expect_err("rejected");
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.message(), "X");
    }

    #[tokio::test]
    async fn skipped_subscription_is_inert() {
        let mut subscription = QuerySubscription::<u32>::detached(None, Snapshot::uninitialized());
        assert!(!subscription.is_attached());
        assert_eq!(subscription.current().status, QueryStatus::Uninitialized);
        assert!(subscription.changed().await.is_none());
        let view = subscription.settled().await;
        assert_eq!(
            view.into_result().expect_err("skipped"),
            ApiError::request("query was skipped")
        );
    }
}
