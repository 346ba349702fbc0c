use felt_core::Chips;
use felt_core::Position;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Outbound frame sink for one connection. Frames are serialized JSON;
/// the transport preserves their order per connection.
pub type Socket = UnboundedSender<String>;

/// The persistable slice of a session: everything except the live socket
/// and the grace-timer handle. This is what `session:<id>` keys hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    /// Canonical (trimmed, lowercased) player identity, once bound.
    pub user_id: Option<String>,
    pub room_id: Option<String>,
    pub seat: Option<Position>,
    pub chips: Chips,
    pub nickname: Option<String>,
    pub in_active_hand: bool,
}

impl SessionRecord {
    pub fn new(session_id: String) -> Self {
        Self {
            session_id,
            user_id: None,
            room_id: None,
            seat: None,
            chips: 0,
            nickname: None,
            in_active_hand: false,
        }
    }
    /// The identity commands resolve against: bound user id if any,
    /// else the session id itself.
    pub fn canonical_id(&self) -> String {
        self.user_id
            .clone()
            .unwrap_or_else(|| felt_core::canonical(&self.session_id))
    }
}

/// A live session: persistable record plus transport-bound state.
#[derive(Debug)]
pub struct Session {
    pub record: SessionRecord,
    pub socket: Option<Socket>,
    pub grace: Option<JoinHandle<()>>,
}

impl Session {
    pub fn new(record: SessionRecord, socket: Socket) -> Self {
        Self {
            record,
            socket: Some(socket),
            grace: None,
        }
    }
    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }
    /// Queues a frame if the connection is live. Send failures mean the
    /// transport already went away; the disconnect flow handles that.
    pub fn send(&self, frame: String) {
        if let Some(socket) = &self.socket {
            let _ = socket.send(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_falls_back_to_session_id() {
        let record = SessionRecord::new("ABC-123".into());
        assert_eq!(record.canonical_id(), "abc-123");
    }

    #[test]
    fn record_round_trips() {
        let mut record = SessionRecord::new("s1".into());
        record.user_id = Some("alice".into());
        record.room_id = Some("holdem-1".into());
        record.seat = Some(3);
        let json = serde_json::to_string(&record).unwrap();
        let back: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
