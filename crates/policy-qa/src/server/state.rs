//! Application state for the policy server

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::assistant::PolicyAssistant;
use crate::config::{AppConfig, LlmConfig};
use crate::error::{Error, Result};
use crate::ingestion::{LopdfBackend, PdfBackend};
use crate::providers::{LlmProvider, OpenAiClient};
use crate::session::Session;

/// Builds a provider for a session from its API key
pub type ProviderFactory =
    Arc<dyn Fn(&LlmConfig, &str) -> Result<Arc<dyn LlmProvider>> + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: AppConfig,
    /// PDF backend shared by all sessions
    backend: Arc<dyn PdfBackend>,
    /// Provider constructor
    provider_factory: ProviderFactory,
    /// Live sessions; each one serializes its own interactions
    sessions: DashMap<Uuid, SessionSlot>,
}

/// A live session and when a request last touched it
struct SessionSlot {
    session: Arc<Mutex<Session>>,
    last_used: DateTime<Utc>,
}

impl SessionSlot {
    fn is_expired(&self, now: DateTime<Utc>, ttl: ChronoDuration) -> bool {
        now.signed_duration_since(self.last_used) > ttl
    }
}

fn openai_provider(config: &LlmConfig, api_key: &str) -> Result<Arc<dyn LlmProvider>> {
    Ok(Arc::new(OpenAiClient::new(config, api_key)?))
}

impl AppState {
    /// Create state with the `lopdf` backend and the OpenAI-compatible client
    pub fn new(config: AppConfig) -> Self {
        tracing::info!("Initializing policy server state...");
        Self::with_parts(config, Arc::new(LopdfBackend), Arc::new(openai_provider))
    }

    /// Create state with custom collaborators
    pub fn with_parts(
        config: AppConfig,
        backend: Arc<dyn PdfBackend>,
        provider_factory: ProviderFactory,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                provider_factory,
                sessions: DashMap::new(),
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Prefer the key sent with the upload, then the configured one
    pub fn resolve_api_key(&self, provided: Option<String>) -> Result<String> {
        provided
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .or_else(|| self.inner.config.llm.api_key.clone())
            .ok_or_else(|| Error::config("Please provide an API key to continue"))
    }

    /// Build an empty session that talks to the provider with `api_key`
    pub fn new_session(&self, api_key: &str) -> Result<Session> {
        let llm = (self.inner.provider_factory)(&self.inner.config.llm, api_key)?;
        let assistant = PolicyAssistant::with_backend(
            &self.inner.config,
            llm,
            Arc::clone(&self.inner.backend),
        );
        Ok(Session::new(assistant))
    }

    fn session_ttl(&self) -> ChronoDuration {
        let secs = i64::try_from(self.inner.config.server.session_ttl_secs).unwrap_or(i64::MAX);
        ChronoDuration::try_seconds(secs).unwrap_or(ChronoDuration::MAX)
    }

    /// Register a session, making room under `server.max_sessions` first
    pub fn insert_session(&self, session: Session) -> Uuid {
        let now = Utc::now();
        self.evict_expired_at(now);

        let max_sessions = self.inner.config.server.max_sessions;
        while self.inner.sessions.len() >= max_sessions {
            let oldest = self
                .inner
                .sessions
                .iter()
                .min_by_key(|entry| entry.value().last_used)
                .map(|entry| *entry.key());
            match oldest {
                Some(oldest) => {
                    self.inner.sessions.remove(&oldest);
                    tracing::info!("Session {} evicted (limit of {} reached)", oldest, max_sessions);
                }
                None => break,
            }
        }

        let id = session.id();
        self.inner.sessions.insert(
            id,
            SessionSlot {
                session: Arc::new(Mutex::new(session)),
                last_used: now,
            },
        );
        tracing::info!("Session {} opened ({} active)", id, self.inner.sessions.len());
        id
    }

    /// Get a session by ID and mark it as used. Idle sessions past
    /// `server.session_ttl_secs` are dropped and reported as not found.
    pub fn session(&self, id: &Uuid) -> Result<Arc<Mutex<Session>>> {
        let now = Utc::now();
        let ttl = self.session_ttl();

        if let Some(mut slot) = self.inner.sessions.get_mut(id) {
            if !slot.is_expired(now, ttl) {
                slot.last_used = now;
                return Ok(Arc::clone(&slot.session));
            }
        }

        if self
            .inner
            .sessions
            .remove_if(id, |_, slot| slot.is_expired(now, ttl))
            .is_some()
        {
            tracing::info!("Session {} expired", id);
        }
        Err(Error::SessionNotFound(id.to_string()))
    }

    /// Remove a session
    pub fn remove_session(&self, id: &Uuid) -> Result<()> {
        self.inner
            .sessions
            .remove(id)
            .map(|_| tracing::info!("Session {} closed", id))
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))
    }

    /// Drop every session idle for longer than the TTL; returns how many went
    pub fn evict_expired(&self) -> usize {
        self.evict_expired_at(Utc::now())
    }

    fn evict_expired_at(&self, now: DateTime<Utc>) -> usize {
        let ttl = self.session_ttl();
        let before = self.inner.sessions.len();
        self.inner.sessions.retain(|_, slot| !slot.is_expired(now, ttl));
        before.saturating_sub(self.inner.sessions.len())
    }

    /// Periodically evict idle sessions for as long as the runtime lives
    pub fn spawn_session_sweeper(&self) -> JoinHandle<()> {
        let state = self.clone();
        let period = Duration::from_secs(self.inner.config.server.session_ttl_secs.clamp(1, 60));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let evicted = state.evict_expired();
                if evicted > 0 {
                    tracing::info!(
                        "Evicted {} idle session(s), {} active",
                        evicted,
                        state.session_count()
                    );
                }
            }
        })
    }

    /// Number of live sessions
    pub fn session_count(&self) -> usize {
        self.inner.sessions.len()
    }
}
