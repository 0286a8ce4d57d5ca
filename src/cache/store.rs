//! Query cache store.
//!
//! Single owner of every cache entry. Entries are keyed by [`QueryKey`] and
//! live behind one mutex that is never held across an await; network calls run
//! in spawned tasks and commit their result back under the lock.
//!
//! Each fetch takes a fresh generation from a store-wide counter. A result only
//! commits if its generation is still the entry's current one, so a slow fetch
//! that was superseded by a refetch is dropped silently.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use metrics::counter;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::endpoint::{Args, MutationDefinition, Payload, QueryDefinition};
use crate::transport::{ApiError, ApiRequest, Transport};

use super::config::CacheConfig;
use super::keys::QueryKey;
use super::lock::mutex_lock;
use super::metric_names::{
    CACHE_DEDUP_TOTAL, CACHE_EVICT_TOTAL, CACHE_HIT_TOTAL, CACHE_INVALIDATED_TOTAL, CACHE_MISS_TOTAL,
};
use super::registry::TagRegistry;
use super::subscription::{QueryStatus, Snapshot};
use super::tags::Tag;

const SOURCE: &str = "cache::store";

/// Resolves when the fetch task of an entry has finished.
pub type FetchDone = Shared<BoxFuture<'static, ()>>;

/// Shared handle to the query cache.
#[derive(Clone)]
pub struct CacheStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    transport: Arc<dyn Transport>,
    config: CacheConfig,
    generations: AtomicU64,
    state: Mutex<StoreState>,
}

#[derive(Default)]
struct StoreState {
    entries: HashMap<QueryKey, Entry>,
    tags: TagRegistry,
}

struct Entry {
    /// Distinguishes this entry from a later one under the same key.
    id: u64,
    definition: Arc<QueryDefinition>,
    args: Arc<Args>,
    status: QueryStatus,
    data: Option<Arc<Payload>>,
    error: Option<ApiError>,
    stale: bool,
    /// Generation value taken by the latest invalidation.
    invalidated_at: u64,
    /// Generation of the most recently started fetch.
    generation: u64,
    in_flight: Option<InFlight>,
    subscribers: usize,
    /// Bumped whenever a pending eviction must be abandoned.
    evict_token: u64,
    sender: watch::Sender<Snapshot>,
}

struct InFlight {
    done: FetchDone,
    abort: AbortHandle,
}

/// Proof of one subscription to a specific entry, returned to `release` it.
///
/// An entry dropped by `reset` and recreated under the same key gets a new id,
/// so releasing an old lease cannot steal a subscriber from the new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lease {
    entry: u64,
}

/// Result of [`CacheStore::subscribe`].
#[derive(Debug)]
pub struct Subscribed {
    pub receiver: watch::Receiver<Snapshot>,
    pub outcome: SubscribeOutcome,
    pub lease: Lease,
}

/// How a subscription was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    /// Fresh data was already cached.
    Hit,
    /// A new fetch was started.
    Miss,
    /// Joined a fetch that was already in flight.
    Joined,
}

impl Entry {
    fn new(id: u64, definition: Arc<QueryDefinition>, args: Arc<Args>) -> Self {
        let (sender, _) = watch::channel(Snapshot::uninitialized());
        Self {
            id,
            definition,
            args,
            status: QueryStatus::Uninitialized,
            data: None,
            error: None,
            stale: false,
            invalidated_at: 0,
            generation: 0,
            in_flight: None,
            subscribers: 0,
            evict_token: 0,
            sender,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            is_fetching: self.in_flight.is_some(),
            is_stale: self.stale,
        }
    }

    fn publish(&self) {
        self.sender.send_replace(self.snapshot());
    }

    fn needs_fetch(&self) -> bool {
        self.stale || matches!(self.status, QueryStatus::Uninitialized | QueryStatus::Rejected)
    }
}

impl CacheStore {
    pub fn new(transport: Arc<dyn Transport>, config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                transport,
                config,
                generations: AtomicU64::new(0),
                state: Mutex::new(StoreState::default()),
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.inner.transport
    }

    /// Add a subscriber to the entry for `key`, creating it on first use.
    ///
    /// Starts a fetch when the entry has never loaded, was invalidated, or last
    /// failed; joins the in-flight fetch when there is one.
    pub fn subscribe(
        &self,
        definition: Arc<QueryDefinition>,
        key: QueryKey,
        args: Arc<Args>,
    ) -> Subscribed {
        let mut state = mutex_lock(&self.inner.state, SOURCE, "subscribe");
        let StoreState { entries, tags } = &mut *state;
        let entry = entries.entry(key.clone()).or_insert_with(|| {
            // Indexed before the first fetch so an invalidation racing it still lands.
            let provided = definition.provided_tags(args.as_ref(), None);
            tags.register(&key, provided.into_iter().collect());
            Entry::new(self.inner.next_generation(), definition, args)
        });
        entry.subscribers += 1;
        entry.evict_token += 1;

        let outcome = if entry.in_flight.is_some() {
            counter!(CACHE_DEDUP_TOTAL, "endpoint" => key.endpoint()).increment(1);
            SubscribeOutcome::Joined
        } else if entry.needs_fetch() {
            counter!(CACHE_MISS_TOTAL, "endpoint" => key.endpoint()).increment(1);
            self.inner.start_fetch(&key, entry);
            SubscribeOutcome::Miss
        } else {
            counter!(CACHE_HIT_TOTAL, "endpoint" => key.endpoint()).increment(1);
            SubscribeOutcome::Hit
        };
        debug!(
            endpoint = key.endpoint(),
            key = %key,
            subscribers = entry.subscribers,
            outcome = ?outcome,
            "query subscribed"
        );
        Subscribed {
            receiver: entry.sender.subscribe(),
            outcome,
            lease: Lease { entry: entry.id },
        }
    }

    /// Drop one subscriber; the last one schedules eviction.
    ///
    /// Leases of an entry that no longer exists are ignored.
    pub fn release(&self, key: &QueryKey, lease: Lease) {
        let mut state = mutex_lock(&self.inner.state, SOURCE, "release");
        let Some(entry) = state.entries.get_mut(key).filter(|e| e.id == lease.entry) else {
            return;
        };
        entry.subscribers = entry.subscribers.saturating_sub(1);
        debug!(
            endpoint = key.endpoint(),
            key = %key,
            subscribers = entry.subscribers,
            "query released"
        );
        if entry.subscribers == 0 {
            self.inner.schedule_eviction(&mut state, key);
        }
    }

    /// Whether `lease` still refers to the live entry for `key`.
    pub fn holds(&self, key: &QueryKey, lease: Lease) -> bool {
        let state = mutex_lock(&self.inner.state, SOURCE, "holds");
        state.entries.get(key).is_some_and(|e| e.id == lease.entry)
    }

    /// Start a fetch that supersedes any in-flight one.
    ///
    /// `None` when the leased entry is gone, e.g. after a reset.
    pub fn refetch(&self, key: &QueryKey, lease: Lease) -> Option<FetchDone> {
        let mut state = mutex_lock(&self.inner.state, SOURCE, "refetch");
        let entry = state.entries.get_mut(key).filter(|e| e.id == lease.entry)?;
        Some(self.inner.start_fetch(key, entry))
    }

    /// Completion future of the fetch currently in flight for the leased entry.
    pub fn in_flight(&self, key: &QueryKey, lease: Lease) -> Option<FetchDone> {
        let state = mutex_lock(&self.inner.state, SOURCE, "in_flight");
        state
            .entries
            .get(key)
            .filter(|e| e.id == lease.entry)
            .and_then(|entry| entry.in_flight.as_ref())
            .map(|in_flight| in_flight.done.clone())
    }

    /// Mark every entry matching `tags` stale and refetch the subscribed ones.
    ///
    /// Returns the number of matched entries.
    pub fn invalidate(&self, tags: &[Tag]) -> usize {
        if tags.is_empty() {
            return 0;
        }
        let mut state = mutex_lock(&self.inner.state, SOURCE, "invalidate");
        let keys = state.tags.keys_matching(tags);
        let mut refetching = 0usize;
        for key in &keys {
            let Some(entry) = state.entries.get_mut(key) else {
                continue;
            };
            entry.stale = true;
            entry.invalidated_at = self.inner.next_generation();
            if entry.subscribers > 0 {
                self.inner.start_fetch(key, entry);
                refetching += 1;
            } else {
                entry.publish();
            }
        }
        counter!(CACHE_INVALIDATED_TOTAL).increment(keys.len() as u64);
        info!(
            tags = %format_tags(tags),
            matched = keys.len(),
            refetching,
            "cache invalidated"
        );
        keys.len()
    }

    /// Run a mutation to completion and invalidate its tags on success.
    ///
    /// The request runs in its own task, so dropping the returned future does
    /// not cancel it.
    pub async fn mutate(
        &self,
        definition: Arc<MutationDefinition>,
        args: Arc<Args>,
    ) -> Result<Box<Payload>, ApiError> {
        let store = self.clone();
        let task = tokio::spawn(async move {
            let name = definition.name();
            let request = definition.build_request(args.as_ref())?;
            let value = store.inner.transport.execute(request).await.inspect_err(|error| {
                debug!(endpoint = name, error = %error, "mutation failed");
            })?;
            let payload = definition.decode(value)?;
            let tags = definition.invalidated_tags(args.as_ref(), payload.as_ref());
            debug!(endpoint = name, tags = %format_tags(&tags), "mutation succeeded");
            store.invalidate(&tags);
            Ok::<_, ApiError>(payload)
        });
        task.await
            .map_err(|e| ApiError::request(format!("mutation task failed: {e}")))?
    }

    /// Drop every entry and tag, aborting in-flight fetches.
    ///
    /// Existing subscriptions stop receiving updates.
    pub fn reset(&self) {
        let mut state = mutex_lock(&self.inner.state, SOURCE, "reset");
        let entries = state.entries.len();
        for entry in state.entries.values() {
            if let Some(in_flight) = &entry.in_flight {
                in_flight.abort.abort();
            }
        }
        state.entries.clear();
        state.tags.clear();
        info!(entries, "cache reset");
    }

    pub fn snapshot(&self, key: &QueryKey) -> Option<Snapshot> {
        let state = mutex_lock(&self.inner.state, SOURCE, "snapshot");
        state.entries.get(key).map(Entry::snapshot)
    }

    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        let state = mutex_lock(&self.inner.state, SOURCE, "subscriber_count");
        state.entries.get(key).map_or(0, |entry| entry.subscribers)
    }

    pub fn tags_for(&self, key: &QueryKey) -> HashSet<Tag> {
        let state = mutex_lock(&self.inner.state, SOURCE, "tags_for");
        state.tags.tags_for_key(key)
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        let state = mutex_lock(&self.inner.state, SOURCE, "contains");
        state.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        let state = mutex_lock(&self.inner.state, SOURCE, "len");
        state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StoreInner {
    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Begin a fetch for `entry`. Must be called with the state lock held.
    fn start_fetch(self: &Arc<Self>, key: &QueryKey, entry: &mut Entry) -> FetchDone {
        let generation = self.next_generation();
        entry.generation = generation;
        entry.status = QueryStatus::Pending;
        if entry.in_flight.take().is_some() {
            debug!(endpoint = key.endpoint(), generation, "superseding in-flight fetch");
        }

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!(endpoint = key.endpoint(), "no async runtime, fetch rejected");
                entry.status = QueryStatus::Rejected;
                entry.error = Some(ApiError::request("no async runtime available for fetch"));
                entry.publish();
                return futures::future::ready(()).boxed().shared();
            }
        };

        let inner = Arc::clone(self);
        let task_key = key.clone();
        let definition = Arc::clone(&entry.definition);
        let args = Arc::clone(&entry.args);
        let handle = runtime.spawn(async move {
            let result = inner.fetch(&definition, args.as_ref()).await;
            inner.commit(&task_key, generation, result);
        });
        let abort = handle.abort_handle();
        let done = async move {
            let _ = handle.await;
        }
        .boxed()
        .shared();

        entry.in_flight = Some(InFlight {
            done: done.clone(),
            abort,
        });
        entry.publish();
        debug!(endpoint = key.endpoint(), key = %key, generation, "fetch started");
        done
    }

    async fn fetch(
        &self,
        definition: &QueryDefinition,
        args: &Args,
    ) -> Result<Arc<Payload>, ApiError> {
        let request = definition.build_request(args)?;
        let value = self.execute_with_retry(definition.name(), request).await?;
        definition.decode(value).map(Arc::from)
    }

    async fn execute_with_retry(
        &self,
        endpoint: &'static str,
        request: ApiRequest,
    ) -> Result<serde_json::Value, ApiError> {
        let retries = if request.is_idempotent_read() {
            self.config.effective_retries()
        } else {
            0
        };
        let mut attempt = 0;
        loop {
            match self.transport.execute(request.clone()).await {
                Err(error) if attempt < retries && error.is_retryable() => {
                    let delay = self.config.retry_delay(attempt);
                    warn!(
                        endpoint,
                        attempt = attempt + 1,
                        retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "query failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    fn commit(
        self: &Arc<Self>,
        key: &QueryKey,
        generation: u64,
        result: Result<Arc<Payload>, ApiError>,
    ) {
        let mut state = mutex_lock(&self.state, SOURCE, "commit");
        let StoreState { entries, tags } = &mut *state;
        let Some(entry) = entries.get_mut(key) else {
            debug!(endpoint = key.endpoint(), generation, "entry gone, result dropped");
            return;
        };
        if entry.generation != generation {
            debug!(
                endpoint = key.endpoint(),
                generation,
                current = entry.generation,
                "superseded fetch result dropped"
            );
            return;
        }

        entry.in_flight = None;
        let provided = match result {
            Ok(payload) => {
                let provided = entry
                    .definition
                    .provided_tags(entry.args.as_ref(), Some(payload.as_ref()));
                entry.data = Some(payload);
                entry.error = None;
                entry.status = QueryStatus::Fulfilled;
                provided
            }
            Err(error) => {
                debug!(endpoint = key.endpoint(), generation, error = %error, "fetch rejected");
                entry.error = Some(error);
                entry.status = QueryStatus::Rejected;
                entry.definition.provided_tags(entry.args.as_ref(), None)
            }
        };
        entry.stale = entry.invalidated_at > generation;
        tags.register(key, provided.into_iter().collect());
        entry.publish();
        debug!(
            endpoint = key.endpoint(),
            generation,
            status = %entry.status,
            stale = entry.stale,
            "fetch committed"
        );

        if entry.subscribers == 0 {
            self.schedule_eviction(&mut state, key);
        }
    }

    /// Evict `key` after the grace period unless it is resubscribed first.
    fn schedule_eviction(self: &Arc<Self>, state: &mut StoreState, key: &QueryKey) {
        let Some(entry) = state.entries.get_mut(key) else {
            return;
        };
        entry.evict_token += 1;
        if entry.in_flight.is_some() {
            // Rescheduled when the fetch commits.
            return;
        }
        let token = entry.evict_token;
        let grace = self.config.keep_unused_for();
        let runtime = match Handle::try_current() {
            Ok(runtime) if !grace.is_zero() => runtime,
            _ => {
                evict(state, key);
                return;
            }
        };
        let store: Weak<StoreInner> = Arc::downgrade(self);
        let key = key.clone();
        runtime.spawn(async move {
            tokio::time::sleep(grace).await;
            if let Some(inner) = store.upgrade() {
                inner.evict_if_unused(&key, token);
            }
        });
    }

    fn evict_if_unused(&self, key: &QueryKey, token: u64) {
        let mut state = mutex_lock(&self.state, SOURCE, "evict");
        let unused = state.entries.get(key).is_some_and(|entry| {
            entry.subscribers == 0 && entry.evict_token == token && entry.in_flight.is_none()
        });
        if unused {
            evict(&mut state, key);
        }
    }
}

fn evict(state: &mut StoreState, key: &QueryKey) {
    if state.entries.remove(key).is_some() {
        state.tags.unregister(key);
        counter!(CACHE_EVICT_TOTAL, "endpoint" => key.endpoint()).increment(1);
        debug!(endpoint = key.endpoint(), key = %key, "entry evicted");
    }
}

fn format_tags(tags: &[Tag]) -> String {
    tags.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
