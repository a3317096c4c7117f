//! Shared application state for the negotiation server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use negotiator::io::model::ModelClient;
use negotiator::io::prompt::PromptEngine;
use negotiator::session::Negotiator;
use tokio::sync::Mutex as AsyncMutex;
use tracing::info;

/// Session id used when a request does not name one.
pub const DEFAULT_SESSION_ID: &str = "default";

pub type SharedNegotiator = Arc<AsyncMutex<Negotiator>>;

struct SessionEntry {
    negotiator: SharedNegotiator,
    last_used: u64,
}

/// In-memory sessions keyed by id, bounded by `capacity`.
struct SessionRegistry {
    entries: HashMap<String, SessionEntry>,
    capacity: usize,
    clock: u64,
}

impl SessionRegistry {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn get(&mut self, id: &str) -> Option<SharedNegotiator> {
        let now = self.tick();
        let entry = self.entries.get_mut(id)?;
        entry.last_used = now;
        Some(entry.negotiator.clone())
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(id, _)| id.clone());
        if let Some(id) = oldest {
            self.entries.remove(&id);
            info!(session_id = %id, "evicted least recently used session");
        }
    }
}

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    model: Arc<dyn ModelClient>,
    prompts: Arc<PromptEngine>,
    recent_messages: usize,
    sessions: Arc<Mutex<SessionRegistry>>,
}

impl AppState {
    pub fn new(model: Arc<dyn ModelClient>, recent_messages: usize, max_sessions: usize) -> Self {
        Self {
            model,
            prompts: Arc::new(PromptEngine::new()),
            recent_messages,
            sessions: Arc::new(Mutex::new(SessionRegistry {
                entries: HashMap::new(),
                capacity: max_sessions.max(1),
                clock: 0,
            })),
        }
    }

    /// Existing session for `id`, or a fresh uninitialized one.
    ///
    /// Each session sits behind its own async mutex: turns on one session are
    /// serialized while other sessions proceed. At capacity, a new id evicts
    /// the least recently used session; a request already holding it finishes
    /// normally.
    pub fn session_or_create(&self, id: &str) -> SharedNegotiator {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = sessions.get(id) {
            return existing;
        }
        if sessions.entries.len() >= sessions.capacity {
            sessions.evict_least_recent();
        }

        let negotiator = Negotiator::new(self.model.clone())
            .with_prompts(self.prompts.clone())
            .with_recent_messages(self.recent_messages);
        let shared = Arc::new(AsyncMutex::new(negotiator));
        let last_used = sessions.tick();
        sessions.entries.insert(
            id.to_string(),
            SessionEntry {
                negotiator: shared.clone(),
                last_used,
            },
        );
        shared
    }

    /// Session for `id`, if one was created and not evicted.
    pub fn session(&self, id: &str) -> Option<SharedNegotiator> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
    }
}
