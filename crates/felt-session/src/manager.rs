use super::session::Session;
use super::session::SessionRecord;
use super::session::Socket;
use felt_core::Chips;
use felt_core::Position;
use felt_core::canonical;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

/// Binding failures. Identity conflicts never mutate state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    UnknownSession(String),
    IdentityTaken(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownSession(id) => write!(f, "unknown session {}", id),
            Self::IdentityTaken(user) => write!(f, "identity {} already bound", user),
        }
    }
}

impl std::error::Error for SessionError {}

#[derive(Debug, Default)]
struct Inner {
    by_id: HashMap<String, Session>,
    /// Single-valued index: each user id belongs to at most one session.
    by_user: HashMap<String, String>,
}

/// Owns every live session and the identity index.
///
/// Single-writer per session: mutations come from the session's transport
/// task or its grace timer, both serialized by the internal lock. Expired
/// sessions are surfaced over a channel so the bridge can unseat them.
#[derive(Debug)]
pub struct SessionManager {
    inner: Mutex<Inner>,
    grace: Duration,
    expired: UnboundedSender<SessionRecord>,
}

impl SessionManager {
    pub fn new(grace: Duration) -> (Arc<Self>, UnboundedReceiver<SessionRecord>) {
        let (expired, rx) = unbounded_channel();
        let manager = Arc::new(Self {
            inner: Mutex::new(Inner::default()),
            grace,
            expired,
        });
        (manager, rx)
    }

    /// Mints a fresh session for a new connection.
    pub async fn create(&self, socket: Socket) -> SessionRecord {
        let id = uuid::Uuid::now_v7().to_string();
        let record = SessionRecord::new(id.clone());
        let session = Session::new(record.clone(), socket);
        self.inner.lock().await.by_id.insert(id.clone(), session);
        log::debug!("[sessions] created {}", id);
        record
    }

    /// Binds a normalized identity to a session. Refuses if the identity
    /// already belongs to a different live session; rebinding the same
    /// session replaces its previous identity.
    pub async fn bind(&self, session_id: &str, user_id: &str) -> Result<SessionRecord, SessionError> {
        let user = canonical(user_id);
        let mut inner = self.inner.lock().await;
        match inner.by_user.get(&user) {
            Some(owner) if owner != session_id => {
                return Err(SessionError::IdentityTaken(user));
            }
            _ => {}
        }
        let prev = match inner.by_id.get(session_id) {
            Some(session) => session.record.user_id.clone(),
            None => return Err(SessionError::UnknownSession(session_id.to_string())),
        };
        if let Some(prev) = prev {
            inner.by_user.remove(&prev);
        }
        inner.by_user.insert(user.clone(), session_id.to_string());
        let session = inner.by_id.get_mut(session_id).expect("checked above");
        session.record.user_id = Some(user);
        Ok(session.record.clone())
    }

    /// Records the table binding taken by a SIT (or cleared by a LEAVE).
    pub async fn bind_room(
        &self,
        session_id: &str,
        room_id: Option<String>,
        seat: Option<Position>,
        chips: Chips,
        nickname: Option<String>,
    ) -> Result<SessionRecord, SessionError> {
        let mut inner = self.inner.lock().await;
        let session = inner
            .by_id
            .get_mut(session_id)
            .ok_or_else(|| SessionError::UnknownSession(session_id.to_string()))?;
        session.record.room_id = room_id;
        session.record.seat = seat;
        session.record.chips = chips;
        session.record.nickname = nickname;
        Ok(session.record.clone())
    }

    pub async fn set_in_hand(&self, session_id: &str, in_hand: bool) {
        if let Some(session) = self.inner.lock().await.by_id.get_mut(session_id) {
            session.record.in_active_hand = in_hand;
        }
    }

    /// Swaps the transport without touching identity.
    pub async fn replace_socket(&self, session_id: &str, socket: Socket) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().await;
        let session = inner
            .by_id
            .get_mut(session_id)
            .ok_or_else(|| SessionError::UnknownSession(session_id.to_string()))?;
        session.socket = Some(socket);
        Ok(())
    }

    /// Connection lost: drop the socket and arm the grace timer. If no
    /// reattach arrives in time the session expires, its indices drop,
    /// and the record is surfaced for unseating.
    pub async fn handle_disconnect(self: &Arc<Self>, session_id: &str) {
        let mut inner = self.inner.lock().await;
        let Some(session) = inner.by_id.get_mut(session_id) else {
            return;
        };
        session.socket = None;
        if let Some(prev) = session.grace.take() {
            prev.abort();
        }
        let manager = Arc::clone(self);
        let id = session_id.to_string();
        let grace = self.grace;
        session.grace = Some(tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            manager.expire(&id).await;
        }));
        log::debug!("[sessions] {} disconnected, grace armed", session_id);
    }

    /// Reattach within grace: cancel the timer, keep everything bound.
    pub async fn handle_reconnect(&self, session_id: &str, socket: Socket) -> Option<SessionRecord> {
        let mut inner = self.inner.lock().await;
        let session = inner.by_id.get_mut(session_id)?;
        if let Some(grace) = session.grace.take() {
            grace.abort();
        }
        session.socket = Some(socket);
        log::debug!("[sessions] {} reconnected", session_id);
        Some(session.record.clone())
    }

    /// Rebuilds a session from its persisted record on reattach after the
    /// in-memory state is gone (restart or post-grace).
    pub async fn restore(&self, record: SessionRecord, socket: Socket) -> Result<SessionRecord, SessionError> {
        let mut inner = self.inner.lock().await;
        if let Some(user) = &record.user_id {
            match inner.by_user.get(user) {
                Some(owner) if owner != &record.session_id => {
                    return Err(SessionError::IdentityTaken(user.clone()));
                }
                _ => {
                    inner.by_user.insert(user.clone(), record.session_id.clone());
                }
            }
        }
        let session = Session::new(record.clone(), socket);
        inner.by_id.insert(record.session_id.clone(), session);
        log::debug!("[sessions] restored {}", record.session_id);
        Ok(record)
    }

    /// Grace elapsed without reattach: drop all indices and surface the
    /// final record so seats and registries can be cleaned up.
    async fn expire(&self, session_id: &str) {
        let mut inner = self.inner.lock().await;
        let Some(session) = inner.by_id.get(session_id) else {
            return;
        };
        if session.is_connected() {
            // reattached while the timer raced the lock
            return;
        }
        let session = inner.by_id.remove(session_id).expect("present above");
        if let Some(user) = &session.record.user_id {
            inner.by_user.remove(user);
        }
        log::info!("[sessions] {} expired after grace", session_id);
        let _ = self.expired.send(session.record);
    }

    pub async fn remove(&self, session_id: &str) {
        let mut inner = self.inner.lock().await;
        if let Some(session) = inner.by_id.remove(session_id) {
            if let Some(grace) = session.grace {
                grace.abort();
            }
            if let Some(user) = &session.record.user_id {
                inner.by_user.remove(user);
            }
        }
    }

    pub async fn get(&self, session_id: &str) -> Option<SessionRecord> {
        self.inner
            .lock()
            .await
            .by_id
            .get(session_id)
            .map(|s| s.record.clone())
    }

    pub async fn session_of_user(&self, user_id: &str) -> Option<String> {
        self.inner.lock().await.by_user.get(&canonical(user_id)).cloned()
    }

    /// Every live (record, socket) pair bound to the given room: the
    /// broadcast fan-out set.
    pub async fn sessions_in_room(&self, room_id: &str) -> Vec<(SessionRecord, Socket)> {
        self.inner
            .lock()
            .await
            .by_id
            .values()
            .filter(|s| s.record.room_id.as_deref() == Some(room_id))
            .filter_map(|s| s.socket.clone().map(|sock| (s.record.clone(), sock)))
            .collect()
    }

    pub async fn send_to(&self, session_id: &str, frame: String) {
        if let Some(session) = self.inner.lock().await.by_id.get(session_id) {
            session.send(frame);
        }
    }

    pub async fn count(&self) -> usize {
        self.inner.lock().await.by_id.len()
    }
}
