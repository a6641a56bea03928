//! Registry of independent sessions
//!
//! Each session sits behind its own mutex, so frames for the same session are
//! processed one at a time while different sessions never contend with each
//! other beyond the brief map lookup.

use crate::config::Config;
use crate::landmarks::{Frame, LandmarkError, RawFrame};
use crate::session::{FrameResult, Session, SessionStatus};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Session registry errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Unknown session: {0}")]
    UnknownSession(Uuid),

    #[error("Malformed frame: {0}")]
    Landmarks(#[from] LandmarkError),
}

/// Shared handle to one session
pub type SharedSession = Arc<Mutex<Session>>;

/// Owns every live session, keyed by id
#[derive(Debug, Default)]
pub struct SessionRegistry {
    config: Config,
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
}

impl SessionRegistry {
    /// Creates a registry whose sessions use `config`
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a new session and return its id
    pub fn create_session(&self) -> Uuid {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(Session::with_config(self.config.clone())));
        self.sessions.write().insert(id, session);
        tracing::info!("Session {} created", id);
        id
    }

    /// Handle to a session, if it exists
    pub fn session(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().get(&id).cloned()
    }

    fn require(&self, id: Uuid) -> Result<SharedSession, SessionError> {
        self.session(id).ok_or(SessionError::UnknownSession(id))
    }

    /// Validate and process one raw frame for a session
    ///
    /// A malformed frame is rejected before the session is locked, so its
    /// state is left exactly as it was.
    pub fn process(
        &self,
        id: Uuid,
        raw: RawFrame,
        now: Instant,
    ) -> Result<FrameResult, SessionError> {
        let session = self.require(id)?;
        let frame = Frame::try_from(raw).map_err(|e| {
            tracing::warn!("Rejected frame for session {}: {}", id, e);
            e
        })?;
        let result = session.lock().process(&frame, now);
        Ok(result)
    }

    pub fn reset_calibration(&self, id: Uuid) -> Result<(), SessionError> {
        self.require(id)?.lock().reset_calibration();
        Ok(())
    }

    pub fn status(&self, id: Uuid) -> Result<SessionStatus, SessionError> {
        Ok(self.require(id)?.lock().status())
    }

    /// Drop a session; returns false if it did not exist
    pub fn remove_session(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().remove(&id).is_some();
        if removed {
            tracing::info!("Session {} removed", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
