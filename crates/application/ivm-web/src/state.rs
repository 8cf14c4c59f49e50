//! Application state for the showroom server

use ivm_config::ShowroomConfig;
use ivm_core::Catalog;
use ivm_showroom::autosave::{DEFAULT_DEBOUNCE, DEFAULT_STATUS_HOLD};
use ivm_showroom::{DraftAutosave, FileStorage, SharedStore, ShowroomStore, StoreError};
use ivm_vertex::{DirectVideoProxy, TextProxy, UpstreamClient, VertexError, VideoWorkflow};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

/// One visitor's store and its pending draft write.
pub struct VisitorSession {
    pub store: SharedStore,
    pub autosave: DraftAutosave,
    last_seen: Mutex<Instant>,
}

impl VisitorSession {
    fn touch(&self) {
        if let Ok(mut last_seen) = self.last_seen.lock() {
            *last_seen = Instant::now();
        }
    }
}

/// Idle past `ttl` with no request or autosave task holding it.
fn evictable(session: &Arc<VisitorSession>, ttl: Duration) -> bool {
    let idle = session
        .last_seen
        .lock()
        .map(|seen| seen.elapsed() >= ttl)
        .unwrap_or(true);
    idle && Arc::strong_count(session) == 1 && Arc::strong_count(&session.store) == 1
}

pub struct AppState {
    pub config: ShowroomConfig,
    pub catalog: Catalog,
    pub videos: VideoWorkflow,
    pub text: TextProxy,
    pub direct: DirectVideoProxy,
    visitors: RwLock<HashMap<String, Arc<VisitorSession>>>,
    visitor_dir: PathBuf,
    debounce: Duration,
    status_hold: Duration,
    session_ttl: Duration,
    started_at: Instant,
}

impl AppState {
    pub fn new(config: ShowroomConfig) -> Result<Self, VertexError> {
        let client = UpstreamClient::new(&config)?;
        let videos = VideoWorkflow::new(client.clone(), config.storage.videos_dir());
        let direct = DirectVideoProxy::new(client.clone());
        let text = TextProxy::new(client);
        let visitor_dir = config.storage.visitor_dir();
        let session_ttl = config.server.session_ttl();

        Ok(Self {
            config,
            catalog: Catalog::default(),
            videos,
            text,
            direct,
            visitors: RwLock::new(HashMap::new()),
            visitor_dir,
            debounce: DEFAULT_DEBOUNCE,
            status_hold: DEFAULT_STATUS_HOLD,
            session_ttl,
            started_at: Instant::now(),
        })
    }

    /// Override draft autosave timing (tests use short windows).
    pub fn with_autosave_timing(mut self, debounce: Duration, status_hold: Duration) -> Self {
        self.debounce = debounce;
        self.status_hold = status_hold;
        self
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn visitor_count(&self) -> usize {
        self.visitors.read().map(|v| v.len()).unwrap_or(0)
    }

    /// Session for a visitor id, hydrated from its storage file on first use.
    /// Creating a session also sweeps idle ones out of memory.
    pub fn visitor(&self, id: &str) -> Result<Arc<VisitorSession>, StoreError> {
        if let Some(session) = self
            .visitors
            .read()
            .map_err(|_| StoreError::Poisoned)?
            .get(id)
        {
            session.touch();
            return Ok(session.clone());
        }

        let mut visitors = self.visitors.write().map_err(|_| StoreError::Poisoned)?;
        if let Some(session) = visitors.get(id) {
            session.touch();
            return Ok(session.clone());
        }

        let before = visitors.len();
        visitors.retain(|_, session| !evictable(session, self.session_ttl));
        if visitors.len() < before {
            tracing::debug!("Evicted {} idle visitor sessions", before - visitors.len());
        }

        let storage = FileStorage::for_visitor(&self.visitor_dir, id)?;
        tracing::debug!("Loading visitor storage {}", storage.path().display());
        let session = Arc::new(VisitorSession {
            store: Arc::new(RwLock::new(ShowroomStore::load(Box::new(storage)))),
            autosave: DraftAutosave::new(self.debounce, self.status_hold),
            last_seen: Mutex::new(Instant::now()),
        });
        visitors.insert(id.to_string(), session.clone());
        Ok(session)
    }
}
