// Token manager
//
// Single-flight credential acquisition. However many callers find the
// store empty at once, exactly one issuance call runs; every caller
// awaits the same `Shared` outcome. The pending slot is only touched
// under `pending`'s lock, and that lock is never held across an await.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::Error;
use crate::models::{Envelope, TokenData};
use crate::session::{TOKEN_PATH, endpoint_url, preview};
use crate::session::store::CredentialStore;

/// Default bound on a single issuance call.
pub const DEFAULT_ISSUANCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Obtains a fresh credential from the backend.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self) -> BoxFuture<'_, Result<SecretString, Error>>;
}

/// Issues credentials via `POST /auth/token`.
///
/// The request carries no body and never an `Authorization` header.
#[derive(Debug, Clone)]
pub struct HttpTokenIssuer {
    http: reqwest::Client,
    url: Url,
}

impl HttpTokenIssuer {
    pub fn new(http: reqwest::Client, base_url: &Url) -> Result<Self, Error> {
        let url = endpoint_url(base_url, TOKEN_PATH)?;
        Ok(Self { http, url })
    }

    async fn request_token(&self) -> Result<SecretString, Error> {
        debug!("POST {}", self.url);

        let resp = self.http.post(self.url.clone()).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(Error::IssuanceRejected {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }

        let envelope: Envelope<TokenData> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            })?;

        let token = envelope.data.map(|d| d.token).filter(|t| !t.is_empty());
        match token {
            Some(token) if envelope.status == "success" => Ok(SecretString::from(token)),
            _ => Err(Error::IssuanceRejected {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| format!("no token in response (status={})", envelope.status)),
            }),
        }
    }
}

impl TokenIssuer for HttpTokenIssuer {
    fn issue(&self) -> BoxFuture<'_, Result<SecretString, Error>> {
        self.request_token().boxed()
    }
}

type Acquisition = Shared<BoxFuture<'static, Result<SecretString, Arc<Error>>>>;

struct PendingAcquisition {
    id: u64,
    outcome: Acquisition,
}

/// Hands out a valid credential, acquiring one at most once at a time.
pub struct TokenManager {
    store: Arc<CredentialStore>,
    issuer: Arc<dyn TokenIssuer>,
    pending: Arc<Mutex<Option<PendingAcquisition>>>,
    next_id: AtomicU64,
    issuance_timeout: Duration,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("store", &self.store)
            .field("issuance_timeout", &self.issuance_timeout)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    pub fn new(store: Arc<CredentialStore>, issuer: Arc<dyn TokenIssuer>) -> Self {
        Self {
            store,
            issuer,
            pending: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(0),
            issuance_timeout: DEFAULT_ISSUANCE_TIMEOUT,
        }
    }

    /// Bound each issuance call. A hung call fails every waiter with
    /// `Error::Timeout` instead of blocking them forever.
    pub fn with_issuance_timeout(mut self, timeout: Duration) -> Self {
        self.issuance_timeout = timeout;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// A credential to send. Makes no network call while one is stored.
    pub async fn get_valid(&self) -> Result<SecretString, Error> {
        if let Some(token) = self.store.read() {
            return Ok(token);
        }

        let acquisition = {
            let mut slot = self.pending.lock().expect("pending acquisition lock poisoned");
            if let Some(pending) = slot.as_ref() {
                debug!(acquisition = pending.id, "joining pending credential acquisition");
                pending.outcome.clone()
            } else if let Some(token) = self.store.read() {
                // Another acquisition finished between the fast path and the lock.
                return Ok(token);
            } else {
                self.start_acquisition(&mut slot)
            }
        };

        acquisition.await.map_err(Error::Issuance)
    }

    /// Drop the stored credential and acquire a new one.
    ///
    /// Joins an acquisition already in flight rather than starting a
    /// second one; the store is only cleared when a new one starts.
    pub async fn force_refresh(&self) -> Result<SecretString, Error> {
        self.refresh(None).await
    }

    /// Replace `refused` after the backend rejected it.
    ///
    /// If the store already holds a different credential, `refused` was
    /// superseded while its request was in flight and the current
    /// credential is returned without another issuance.
    pub async fn refresh_rejected(&self, refused: &SecretString) -> Result<SecretString, Error> {
        self.refresh(Some(refused)).await
    }

    async fn refresh(&self, refused: Option<&SecretString>) -> Result<SecretString, Error> {
        let acquisition = {
            let mut slot = self.pending.lock().expect("pending acquisition lock poisoned");
            if let Some(pending) = slot.as_ref() {
                debug!(acquisition = pending.id, "refresh joins pending acquisition");
                pending.outcome.clone()
            } else {
                let superseded = refused.and_then(|refused| {
                    self.store
                        .read()
                        .filter(|current| current.expose_secret() != refused.expose_secret())
                });
                if let Some(current) = superseded {
                    debug!("refused credential already replaced");
                    return Ok(current);
                }
                self.store.clear();
                self.start_acquisition(&mut slot)
            }
        };

        acquisition.await.map_err(Error::Issuance)
    }

    /// Register a new acquisition in `slot`. Caller holds the lock.
    fn start_acquisition(&self, slot: &mut Option<PendingAcquisition>) -> Acquisition {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let issuer = Arc::clone(&self.issuer);
        let store = Arc::clone(&self.store);
        let pending = Arc::clone(&self.pending);
        let limit = self.issuance_timeout;

        let outcome = async move {
            debug!(acquisition = id, "requesting new credential");

            let result = match tokio::time::timeout(limit, issuer.issue()).await {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout {
                    timeout_secs: limit.as_secs(),
                }),
            };

            match &result {
                Ok(token) => {
                    store.write(token);
                    info!(acquisition = id, "credential acquired");
                }
                Err(e) => warn!(acquisition = id, error = %e, "credential acquisition failed"),
            }

            let mut slot = pending.lock().expect("pending acquisition lock poisoned");
            if slot.as_ref().is_some_and(|p| p.id == id) {
                *slot = None;
            }
            drop(slot);

            result.map_err(Arc::new)
        }
        .boxed()
        .shared();

        *slot = Some(PendingAcquisition {
            id,
            outcome: outcome.clone(),
        });
        outcome
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use futures_util::future::join_all;

    use super::*;
    use crate::session::store::MemoryTokenCache;

    /// Issues `tok-1`, `tok-2`, ... after a short delay, counting calls.
    struct CountingIssuer {
        calls: AtomicUsize,
        delay: Duration,
        fail: bool,
    }

    impl CountingIssuer {
        fn new(delay: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(Duration::from_millis(10))
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TokenIssuer for CountingIssuer {
        fn issue(&self) -> BoxFuture<'_, Result<SecretString, Error>> {
            async move {
                let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(self.delay).await;
                if self.fail {
                    return Err(Error::IssuanceRejected {
                        status: 503,
                        message: "unavailable".into(),
                    });
                }
                Ok(SecretString::from(format!("tok-{n}")))
            }
            .boxed()
        }
    }

    fn manager(issuer: &Arc<CountingIssuer>) -> TokenManager {
        TokenManager::new(
            Arc::new(CredentialStore::in_memory()),
            Arc::clone(issuer) as Arc<dyn TokenIssuer>,
        )
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_issuance() {
        let issuer = Arc::new(CountingIssuer::new(Duration::from_millis(50)));
        let tokens = manager(&issuer);

        let results = join_all((0..16).map(|_| tokens.get_valid())).await;

        assert_eq!(issuer.calls(), 1);
        for result in results {
            assert_eq!(result.unwrap().expose_secret(), "tok-1");
        }
    }

    #[tokio::test]
    async fn stored_credential_needs_no_issuance() {
        let issuer = Arc::new(CountingIssuer::new(Duration::ZERO));
        let tokens = manager(&issuer);

        tokens.get_valid().await.unwrap();
        for _ in 0..5 {
            assert_eq!(tokens.get_valid().await.unwrap().expose_secret(), "tok-1");
        }
        assert_eq!(issuer.calls(), 1);
    }

    #[tokio::test]
    async fn cached_credential_from_a_previous_run_is_used() {
        let issuer = Arc::new(CountingIssuer::new(Duration::ZERO));
        let store = CredentialStore::new(Arc::new(MemoryTokenCache::with_token("from-disk")));
        let tokens = TokenManager::new(Arc::new(store), Arc::clone(&issuer) as Arc<dyn TokenIssuer>);

        assert_eq!(tokens.get_valid().await.unwrap().expose_secret(), "from-disk");
        assert_eq!(issuer.calls(), 0);
    }

    #[tokio::test]
    async fn force_refresh_replaces_the_credential() {
        let issuer = Arc::new(CountingIssuer::new(Duration::ZERO));
        let tokens = manager(&issuer);

        tokens.get_valid().await.unwrap();
        let fresh = tokens.force_refresh().await.unwrap();

        assert_eq!(fresh.expose_secret(), "tok-2");
        assert_eq!(tokens.get_valid().await.unwrap().expose_secret(), "tok-2");
        assert_eq!(issuer.calls(), 2);
    }

    #[tokio::test]
    async fn concurrent_refreshes_share_one_issuance() {
        let issuer = Arc::new(CountingIssuer::new(Duration::from_millis(50)));
        let tokens = manager(&issuer);
        tokens.get_valid().await.unwrap();

        let results = join_all((0..8).map(|_| tokens.force_refresh())).await;

        assert_eq!(issuer.calls(), 2);
        for result in results {
            assert_eq!(result.unwrap().expose_secret(), "tok-2");
        }
    }

    #[tokio::test]
    async fn rejection_of_a_replaced_credential_reuses_the_current_one() {
        let issuer = Arc::new(CountingIssuer::new(Duration::ZERO));
        let tokens = manager(&issuer);

        let first = tokens.get_valid().await.unwrap();
        let second = tokens.refresh_rejected(&first).await.unwrap();
        let again = tokens.refresh_rejected(&first).await.unwrap();

        assert_eq!(second.expose_secret(), "tok-2");
        assert_eq!(again.expose_secret(), "tok-2");
        assert_eq!(issuer.calls(), 2);
    }

    #[tokio::test]
    async fn refresh_joining_a_pending_acquisition_keeps_its_credential() {
        let issuer = Arc::new(CountingIssuer::new(Duration::from_millis(50)));
        let tokens = manager(&issuer);

        let (acquired, refreshed) = tokio::join!(tokens.get_valid(), tokens.force_refresh());

        assert_eq!(acquired.unwrap().expose_secret(), "tok-1");
        assert_eq!(refreshed.unwrap().expose_secret(), "tok-1");
        assert_eq!(tokens.store().read().unwrap().expose_secret(), "tok-1");
        assert_eq!(issuer.calls(), 1);
    }

    #[tokio::test]
    async fn failure_reaches_every_waiter_and_is_not_cached() {
        let issuer = Arc::new(CountingIssuer::failing());
        let tokens = manager(&issuer);

        let results = join_all((0..4).map(|_| tokens.get_valid())).await;
        assert_eq!(issuer.calls(), 1);
        for result in results {
            let err = result.unwrap_err();
            assert!(matches!(err, Error::Issuance(_)), "got {err:?}");
            assert_eq!(err.status(), Some(503));
        }

        // The slot was cleared, so the next caller starts afresh.
        assert!(tokens.get_valid().await.is_err());
        assert_eq!(issuer.calls(), 2);
        assert!(tokens.store().read().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn hung_issuance_times_out() {
        let issuer = Arc::new(CountingIssuer::new(Duration::from_secs(3600)));
        let tokens = manager(&issuer).with_issuance_timeout(Duration::from_secs(5));

        let err = tokens.get_valid().await.unwrap_err();
        match err {
            Error::Issuance(inner) => {
                assert!(matches!(*inner, Error::Timeout { timeout_secs: 5 }));
            }
            other => panic!("expected issuance timeout, got {other:?}"),
        }
    }
}
