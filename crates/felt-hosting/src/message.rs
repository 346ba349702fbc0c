use super::directory::LobbyTable;
use super::snapshot::TableView;
use felt_core::Chips;
use felt_core::HandNumber;
use felt_core::Position;
use felt_engine::CountdownKind;
use felt_engine::Distribution;
use felt_engine::Event;
use felt_engine::Reveal;
use serde::Serialize;

/// Messages sent from server to client over the WebSocket.
///
/// Per-hand messages carry the hand number so clients can discard stale
/// frames from a previous hand. Snapshots are built separately per viewer
/// and never pass through [`Message::encode`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    #[serde(rename_all = "camelCase")]
    Session {
        session_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },
    TableList {
        tables: Vec<LobbyTable>,
    },
    TableCreated {
        table: LobbyTable,
    },
    #[serde(rename_all = "camelCase")]
    TableSnapshot {
        table_id: String,
        table: TableView,
    },
    HandStart {
        hand: HandNumber,
        button: Position,
    },
    DealFlop {
        hand: HandNumber,
        cards: Vec<u8>,
    },
    DealTurn {
        hand: HandNumber,
        card: u8,
    },
    DealRiver {
        hand: HandNumber,
        card: u8,
    },
    Showdown {
        hand: HandNumber,
        reveals: Vec<RevealView>,
    },
    #[serde(rename_all = "camelCase")]
    WinnerAnnouncement {
        winners: Vec<Winner>,
        pot_amount: Chips,
    },
    HandEnd {
        hand: HandNumber,
    },
    #[serde(rename_all = "camelCase")]
    CountdownStart {
        countdown_type: CountdownKind,
        start_time: u64,
        duration_ms: u64,
        metadata: serde_json::Value,
    },
    Timer {
        countdown: u64,
    },
    #[serde(rename_all = "camelCase")]
    PlayerWaiting {
        seat: Position,
        player_id: String,
    },
    #[serde(rename_all = "camelCase")]
    PlayerDisconnected {
        table_id: String,
        seat: Position,
        player_id: String,
    },
    Error {
        code: &'static str,
        msg: String,
    },
}

/// A showdown reveal on the wire: numeric codes or nothing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealView {
    pub seat: Position,
    pub player_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    pub seat: Position,
    pub player_id: String,
    pub amount: Chips,
    pub pot: usize,
}

impl Message {
    pub fn error(code: &'static str, msg: impl Into<String>) -> Self {
        Self::Error {
            code,
            msg: msg.into(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize server message")
    }

    /// Converts an engine event into its broadcast message, if it has one.
    ///
    /// Deals of hole cards and seat-state changes have no dedicated wire
    /// message: viewers learn them from the sanitized snapshot that
    /// follows every batch. Returning `None` keeps them off the wire.
    pub fn encode(event: &Event, hand: HandNumber) -> Option<Message> {
        match event {
            Event::StartHand { hand, button, .. } => Some(Message::HandStart {
                hand: *hand,
                button: *button,
            }),
            Event::EnterStreet { street, cards, .. } => {
                let codes = cards.iter().map(|c| u8::from(*c)).collect::<Vec<u8>>();
                match street {
                    felt_cards::Street::Flop => Some(Message::DealFlop { hand, cards: codes }),
                    felt_cards::Street::Turn => Some(Message::DealTurn { hand, card: codes[0] }),
                    felt_cards::Street::Rive => Some(Message::DealRiver { hand, card: codes[0] }),
                    felt_cards::Street::Pref => None,
                }
            }
            Event::Showdown { reveals } => Some(Message::Showdown {
                hand,
                reveals: reveals.iter().map(RevealView::from).collect(),
            }),
            Event::Payout { distributions } => Some(Message::from_payout(distributions)),
            Event::HandEnd { hand } => Some(Message::HandEnd { hand: *hand }),
            Event::ActionTimeout { .. } => Some(Message::Timer { countdown: 0 }),
            Event::CountdownStart { countdown, duration_ms, metadata } => {
                Some(Message::CountdownStart {
                    countdown_type: *countdown,
                    start_time: now_ms(),
                    duration_ms: *duration_ms,
                    metadata: metadata.clone(),
                })
            }
            Event::PlayerWaiting { seat, pid } => Some(Message::PlayerWaiting {
                seat: *seat,
                player_id: pid.clone(),
            }),
            // covered by the per-viewer snapshot
            Event::PlayerJoin { .. }
            | Event::PlayerLeave { .. }
            | Event::PlayerSitOut { .. }
            | Event::PlayerSitIn { .. }
            | Event::PostBlind { .. }
            | Event::DealHole { .. }
            | Event::Action { .. } => None,
        }
    }

    fn from_payout(distributions: &[Distribution]) -> Message {
        Message::WinnerAnnouncement {
            winners: distributions
                .iter()
                .map(|d| Winner {
                    seat: d.seat,
                    player_id: d.pid.clone(),
                    amount: d.amount,
                    pot: d.pot,
                })
                .collect(),
            pot_amount: distributions.iter().map(|d| d.amount).sum(),
        }
    }
}

impl From<&Reveal> for RevealView {
    fn from(reveal: &Reveal) -> Self {
        Self {
            seat: reveal.seat,
            player_id: reveal.pid.clone(),
            cards: reveal
                .hole
                .map(|h| h.cards().iter().map(|c| u8::from(*c)).collect()),
        }
    }
}

pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_the_wire_contract() {
        let msg = Message::Session {
            session_id: "s".into(),
            user_id: None,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "SESSION");
        assert!(json.get("userId").is_none());

        let msg = Message::error("TABLE_NOT_FOUND", "no such table");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "ERROR");
        assert_eq!(json["code"], "TABLE_NOT_FOUND");
    }

    #[test]
    fn hole_deals_stay_off_the_wire() {
        let event = Event::DealHole {
            seat: 0,
            hole: felt_cards::Hole::try_from("Ah Kd").unwrap(),
        };
        assert!(Message::encode(&event, 1).is_none());
    }

    #[test]
    fn timeout_encodes_as_zero_countdown() {
        let event = Event::ActionTimeout {
            seat: 2,
            resolved: felt_engine::Action::Fold,
        };
        let msg = Message::encode(&event, 1).unwrap();
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "TIMER");
        assert_eq!(json["countdown"], 0);
    }

    #[test]
    fn street_entries_encode_as_deals() {
        let event = Event::EnterStreet {
            street: felt_cards::Street::Turn,
            cards: vec![felt_cards::Card::from(17u8)],
            burn: felt_cards::Card::from(3u8),
        };
        let msg = Message::encode(&event, 7).unwrap();
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "DEAL_TURN");
        assert_eq!(json["card"], 17);
        assert_eq!(json["hand"], 7);
    }
}
