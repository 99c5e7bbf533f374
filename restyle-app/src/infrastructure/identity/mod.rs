mod fingerprint;
mod storage;

pub use fingerprint::{rolling_hash, to_base36, BrowserEnvironment};
pub use storage::{ClientStorage, FileStorage, MemoryStorage};

use crate::domain::Identity;
use async_trait::async_trait;
use rand::Rng;
use restyle_errors::AppError;
use std::sync::{Arc, Mutex};

pub const BROWSER_ID_KEY: &str = "restyle_browser_id";

/// Resolves who is voting.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn get_user_identifier(&self) -> Result<Identity, AppError>;
}

/// An already-resolved identity, e.g. one taken from request headers.
#[async_trait]
impl IdentityProvider for Identity {
    async fn get_user_identifier(&self) -> Result<Identity, AppError> {
        Ok(self.clone())
    }
}

/// Source of the signed-in user, if any.
#[async_trait]
pub trait AuthSession: Send + Sync {
    async fn user_id(&self) -> Option<String>;
}

/// Anonymous identity persisted in client storage.
///
/// The id is a deduplication hint, not a credential: clearing storage or a
/// fingerprint collision silently yields a different voter.
pub struct BrowserIdentityProvider<S> {
    storage: S,
    environment: BrowserEnvironment,
    session: Option<Arc<dyn AuthSession>>,
    // Held across the storage read and write in `initialize`.
    init_lock: Mutex<()>,
}

impl<S: ClientStorage> BrowserIdentityProvider<S> {
    pub fn new(storage: S, environment: BrowserEnvironment) -> Self {
        Self {
            storage,
            environment,
            session: None,
            init_lock: Mutex::new(()),
        }
    }

    pub fn with_session(mut self, session: Arc<dyn AuthSession>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the stored browser id, generating and persisting one first if
    /// storage has none.
    pub fn initialize(&self) -> Result<String, AppError> {
        let _guard = self
            .init_lock
            .lock()
            .map_err(|_| AppError::Internal("browser id lock poisoned".to_string()))?;

        if let Some(existing) = self.storage.get(BROWSER_ID_KEY)? {
            if !existing.is_empty() {
                return Ok(existing);
            }
        }

        let browser_id = self.generate_browser_id();
        self.storage.set(BROWSER_ID_KEY, &browser_id)?;
        tracing::debug!(browser_id = %browser_id, "Generated new browser id");
        Ok(browser_id)
    }

    pub fn browser_id(&self) -> Result<String, AppError> {
        self.initialize()
    }

    fn generate_browser_id(&self) -> String {
        let created = to_base36(chrono::Utc::now().timestamp_millis().unsigned_abs());
        let mut suffix = to_base36(rand::thread_rng().gen::<u64>());
        suffix.truncate(9);
        format!("fp_{}_{}_{}", self.environment.fingerprint(), created, suffix)
    }
}

#[async_trait]
impl<S: ClientStorage> IdentityProvider for BrowserIdentityProvider<S> {
    async fn get_user_identifier(&self) -> Result<Identity, AppError> {
        let browser_id = self.browser_id()?;
        let user_id = match &self.session {
            Some(session) => session.user_id().await,
            None => None,
        };
        Ok(Identity {
            user_id,
            browser_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SignedIn;

    #[async_trait]
    impl AuthSession for SignedIn {
        async fn user_id(&self) -> Option<String> {
            Some("user-42".to_string())
        }
    }

    fn environment() -> BrowserEnvironment {
        BrowserEnvironment {
            user_agent: "Mozilla/5.0".into(),
            language: "en-US".into(),
            screen_width: 1440,
            screen_height: 900,
            color_depth: 24,
            timezone_offset: 0,
            hardware_concurrency: Some(8),
            platform: "MacIntel".into(),
        }
    }

    #[tokio::test]
    async fn test_browser_id_is_stable() {
        let provider = BrowserIdentityProvider::new(MemoryStorage::new(), environment());

        let first = provider.get_user_identifier().await.unwrap();
        let second = provider.get_user_identifier().await.unwrap();

        assert_eq!(first.browser_id, second.browser_id);
        assert!(first.user_id.is_none());
        assert!(first
            .browser_id
            .starts_with(&format!("fp_{}_", environment().fingerprint())));
    }

    #[tokio::test]
    async fn test_cleared_storage_yields_new_id() {
        let provider = BrowserIdentityProvider::new(MemoryStorage::new(), environment());
        let before = provider.browser_id().unwrap();

        provider.storage().clear().unwrap();
        let after = provider.browser_id().unwrap();

        assert_ne!(before, after);
        assert_eq!(
            provider.storage().get(BROWSER_ID_KEY).unwrap().as_deref(),
            Some(after.as_str())
        );
    }

    #[tokio::test]
    async fn test_session_user_is_reported_alongside_browser_id() {
        let provider = BrowserIdentityProvider::new(MemoryStorage::new(), environment())
            .with_session(Arc::new(SignedIn));

        let identity = provider.get_user_identifier().await.unwrap();
        assert_eq!(identity.user_id.as_deref(), Some("user-42"));
        assert!(!identity.browser_id.is_empty());
        assert_eq!(identity.voter_key(), "user-42");
    }

    #[test]
    fn test_concurrent_first_calls_agree_on_one_id() {
        let provider = BrowserIdentityProvider::new(MemoryStorage::new(), environment());

        let ids: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| provider.browser_id().unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(ids.iter().all(|id| id == &ids[0]));
        assert_eq!(
            provider.storage().get(BROWSER_ID_KEY).unwrap().as_deref(),
            Some(ids[0].as_str())
        );
    }

    #[tokio::test]
    async fn test_existing_id_is_reused() {
        let storage = MemoryStorage::new();
        storage.set(BROWSER_ID_KEY, "fp_saved").unwrap();
        let provider = BrowserIdentityProvider::new(storage, environment());

        assert_eq!(provider.browser_id().unwrap(), "fp_saved");
    }
}
