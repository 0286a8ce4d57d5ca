//! Client facade: the one object an application builds at startup.
//!
//! Owns the session, the endpoint registry and the cache store. Every typed
//! call resolves its endpoint through the registry by name and goes through
//! the store, so deduplication and invalidation apply to all callers.

use std::sync::Arc;

use deptportal_api_types::NoArgs;
use deptportal_api_types::auth::{LoginRequest, LoginResponse};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, instrument, warn};

use crate::cache::{
    CacheConfig, CacheStore, QueryKey, QueryOptions, QuerySubscription, Snapshot, Tag, TagType,
};
use crate::config::Settings;
use crate::endpoint::{EndpointRegistry, MutationEndpoint, QueryEndpoint};
use crate::endpoints::{self, auth};
use crate::infra::error::ClientError;
use crate::session::{CookieSession, SessionStore};
use crate::transport::{ApiError, HttpTransport, Transport};

#[derive(Clone)]
pub struct PortalClient {
    store: CacheStore,
    registry: Arc<EndpointRegistry>,
    session: Arc<dyn SessionStore>,
}

impl PortalClient {
    /// Build the HTTP-backed client described by `settings`.
    pub fn init(settings: &Settings) -> Result<Self, ClientError> {
        let session: Arc<dyn SessionStore> = match settings.session.cookie_file.as_ref() {
            Some(path) => Arc::new(CookieSession::open(path, settings.session.token_ttl)?),
            None => Arc::new(CookieSession::in_memory().with_ttl(settings.session.token_ttl)),
        };
        let transport = HttpTransport::from_settings(&settings.api, Arc::clone(&session))?;
        info!(
            base_url = %settings.api.base_url,
            persistent_session = settings.session.cookie_file.is_some(),
            "portal client initialized"
        );
        Ok(Self::with_transport(
            Arc::new(transport),
            session,
            settings.cache.clone(),
        ))
    }

    /// Build a client over any transport, with the full endpoint catalog.
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionStore>,
        cache: CacheConfig,
    ) -> Self {
        Self::with_registry(transport, session, cache, endpoints::registry())
    }

    pub fn with_registry(
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionStore>,
        cache: CacheConfig,
        registry: EndpointRegistry,
    ) -> Self {
        Self {
            store: CacheStore::new(transport, cache),
            registry: Arc::new(registry),
            session,
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Subscribe to a query.
    ///
    /// Every case below performs no request and returns a detached
    /// subscription (`is_attached()` is false):
    ///
    /// - skipped: status `Uninitialized`, no key;
    /// - arguments that cannot be keyed: `Rejected` with a `Request` error, no key;
    /// - endpoint not declared as a query: `Rejected` with a `Request`
    ///   error, key set.
    pub fn subscribe<A, T>(
        &self,
        endpoint: &QueryEndpoint<A, T>,
        args: A,
        options: QueryOptions,
    ) -> QuerySubscription<T>
    where
        A: Serialize + Send + Sync + 'static,
        T: DeserializeOwned + Send + Sync + 'static,
    {
        if options.skip {
            return QuerySubscription::detached(None, Snapshot::uninitialized());
        }
        let key = match QueryKey::new(endpoint.name(), &args) {
            Ok(key) => key,
            Err(error) => return QuerySubscription::detached(None, Snapshot::rejected(error)),
        };
        let definition = match self.registry.query(endpoint.name()) {
            Ok(definition) => definition,
            Err(error) => {
                warn!(endpoint = endpoint.name(), error = %error, "query not subscribed");
                return QuerySubscription::detached(Some(key), Snapshot::rejected(error));
            }
        };
        let subscribed = self.store.subscribe(definition, key.clone(), Arc::new(args));
        QuerySubscription::attached(self.store.clone(), key, subscribed)
    }

    /// Subscribe, wait for the fetch to settle and release the entry.
    pub async fn query<A, T>(&self, endpoint: &QueryEndpoint<A, T>, args: A) -> Result<Arc<T>, ApiError>
    where
        A: Serialize + Send + Sync + 'static,
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let mut subscription = self.subscribe(endpoint, args, QueryOptions::default());
        subscription.settled().await.into_result()
    }

    /// Run a mutation; its invalidation tags are applied before this returns.
    #[instrument(skip_all, fields(endpoint = endpoint.name()))]
    pub async fn mutate<A, T>(&self, endpoint: &MutationEndpoint<A, T>, args: A) -> Result<T, ApiError>
    where
        A: Send + Sync + 'static,
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let definition = self.registry.mutation(endpoint.name())?;
        let payload = self.store.mutate(definition, Arc::new(args)).await?;
        payload.downcast::<T>().map(|payload| *payload).map_err(|_| {
            ApiError::Parse(format!(
                "`{}` returned a payload that is not a `{}`",
                endpoint.name(),
                std::any::type_name::<T>()
            ))
        })
    }

    /// Mark every entry matching `tags` stale; subscribed ones refetch.
    pub fn invalidate(&self, tags: &[Tag]) -> usize {
        self.store.invalidate(tags)
    }

    /// Drop all cached data, e.g. when the signed-in user changes.
    pub fn reset(&self) {
        self.store.reset();
    }

    /// Sign in and keep the returned token for later requests.
    ///
    /// The token is stored before `Auth` is invalidated, so the refetched
    /// profile is requested with the new credential.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: LoginRequest) -> Result<LoginResponse, ClientError> {
        let response = self.mutate(&auth::LOGIN, credentials).await?;
        self.session.store_token(&response.token)?;
        self.store.invalidate(&[Tag::of(TagType::Auth)]);
        info!(user = %response.user.id, "signed in");
        Ok(response)
    }

    /// Sign out locally even when the server call fails, then purge the cache.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<(), ClientError> {
        if let Err(error) = self.mutate(&auth::LOGOUT, NoArgs::default()).await {
            warn!(error = %error, "server logout failed, clearing local session");
        }
        self.session.clear()?;
        self.store.reset();
        info!("signed out");
        Ok(())
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.token().is_some()
    }
}
