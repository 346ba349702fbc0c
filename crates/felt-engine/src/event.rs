use felt_cards::Card;
use felt_cards::Hole;
use felt_cards::Street;
use felt_core::Chips;
use felt_core::HandNumber;
use felt_core::Position;
use felt_core::Sequence;
use serde::Deserialize;
use serde::Serialize;

/// A betting decision, normalized by the engine.
///
/// `Bet` and `Raise` amounts are the target total street commitment
/// ("raise to"), not the increment. A client-tagged all-in is classified
/// into one of these before logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Action {
    Fold,
    Check,
    Call,
    Bet { amount: Chips },
    Raise { amount: Chips },
    AllIn,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Fold => write!(f, "fold"),
            Self::Check => write!(f, "check"),
            Self::Call => write!(f, "call"),
            Self::Bet { amount } => write!(f, "bet {}", amount),
            Self::Raise { amount } => write!(f, "raise {}", amount),
            Self::AllIn => write!(f, "all-in"),
        }
    }
}

/// Which forced bet a seat posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Blind {
    Small,
    Big,
}

/// Countdown kinds the timer wheel tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CountdownKind {
    /// Waiting on the actor's decision.
    Action,
    /// Pause between streets for client animation.
    StreetDeal,
    /// Delay before attempting the next hand.
    NewHand,
    /// Per-player grace after a disconnect.
    Reconnect,
}

/// A hole-card reveal at showdown. `hole: None` is a muck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reveal {
    pub seat: Position,
    pub pid: String,
    pub hole: Option<Hole>,
}

/// Why a distribution was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PayoutReason {
    /// Won (or chopped) the pot at showdown.
    Showdown,
    /// Everyone else folded.
    Uncontested,
}

/// One payout line: who got how much from which pot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub seat: Position,
    pub pid: String,
    pub amount: Chips,
    pub pot: usize,
    pub reason: PayoutReason,
}

/// Everything the engine accepts or emits.
///
/// External intents (joins, leaves, sit-outs, hand starts, actions,
/// timeouts) are *inputs*; the rest are *derived*, produced while applying
/// an input. The log records both in order; replay re-injects only the
/// inputs and the derived events regenerate deterministically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Event {
    PlayerJoin {
        seat: Position,
        pid: String,
        nickname: String,
        chips: Chips,
    },
    PlayerLeave {
        seat: Position,
        pid: String,
    },
    PlayerSitOut {
        seat: Position,
    },
    PlayerSitIn {
        seat: Position,
    },
    PlayerWaiting {
        seat: Position,
        pid: String,
    },
    StartHand {
        hand: HandNumber,
        seed: u64,
        button: Position,
    },
    PostBlind {
        seat: Position,
        blind: Blind,
        amount: Chips,
    },
    DealHole {
        seat: Position,
        hole: Hole,
    },
    EnterStreet {
        street: Street,
        cards: Vec<Card>,
        burn: Card,
    },
    Action {
        seat: Position,
        action: Action,
    },
    ActionTimeout {
        seat: Position,
        resolved: Action,
    },
    Showdown {
        reveals: Vec<Reveal>,
    },
    Payout {
        distributions: Vec<Distribution>,
    },
    HandEnd {
        hand: HandNumber,
    },
    CountdownStart {
        countdown: CountdownKind,
        duration_ms: u64,
        metadata: serde_json::Value,
    },
}

impl Event {
    /// True for externally-injectable variants. Derived variants are
    /// regenerated by replay and rejected by dispatch.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            Event::PlayerJoin { .. }
                | Event::PlayerLeave { .. }
                | Event::PlayerSitOut { .. }
                | Event::PlayerSitIn { .. }
                | Event::StartHand { .. }
                | Event::Action { .. }
                | Event::ActionTimeout { .. }
        )
    }
    pub fn kind(&self) -> &'static str {
        match self {
            Event::PlayerJoin { .. } => "playerJoin",
            Event::PlayerLeave { .. } => "playerLeave",
            Event::PlayerSitOut { .. } => "playerSitOut",
            Event::PlayerSitIn { .. } => "playerSitIn",
            Event::PlayerWaiting { .. } => "playerWaiting",
            Event::StartHand { .. } => "startHand",
            Event::PostBlind { .. } => "postBlind",
            Event::DealHole { .. } => "dealHole",
            Event::EnterStreet { .. } => "enterStreet",
            Event::Action { .. } => "action",
            Event::ActionTimeout { .. } => "actionTimeout",
            Event::Showdown { .. } => "showdown",
            Event::Payout { .. } => "payout",
            Event::HandEnd { .. } => "handEnd",
            Event::CountdownStart { .. } => "countdownStart",
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Event::PlayerJoin { seat, pid, chips, .. } => {
                write!(f, "join {} at seat {} for {}", pid, seat, chips)
            }
            Event::PlayerLeave { seat, pid } => write!(f, "leave {} from seat {}", pid, seat),
            Event::PlayerSitOut { seat } => write!(f, "seat {} sits out", seat),
            Event::PlayerSitIn { seat } => write!(f, "seat {} sits in", seat),
            Event::PlayerWaiting { seat, .. } => write!(f, "seat {} waits for next hand", seat),
            Event::StartHand { hand, button, .. } => {
                write!(f, "hand #{} (button {})", hand, button)
            }
            Event::PostBlind { seat, blind, amount } => {
                write!(f, "seat {} posts {:?} blind {}", seat, blind, amount)
            }
            Event::DealHole { seat, .. } => write!(f, "hole cards to seat {}", seat),
            Event::EnterStreet { street, cards, .. } => {
                write!(f, "{}: {} cards", street, cards.len())
            }
            Event::Action { seat, action } => write!(f, "seat {}: {}", seat, action),
            Event::ActionTimeout { seat, resolved } => {
                write!(f, "seat {} timed out: {}", seat, resolved)
            }
            Event::Showdown { reveals } => write!(f, "showdown ({} reveals)", reveals.len()),
            Event::Payout { distributions } => write!(f, "payout ({})", distributions.len()),
            Event::HandEnd { hand } => write!(f, "hand #{} over", hand),
            Event::CountdownStart { countdown, duration_ms, .. } => {
                write!(f, "countdown {:?} {}ms", countdown, duration_ms)
            }
        }
    }
}

/// An event committed to the log with its gap-free sequence number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedEvent {
    pub seq: Sequence,
    pub event: Event,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_classification() {
        let join = Event::PlayerJoin {
            seat: 0,
            pid: "p".into(),
            nickname: "P".into(),
            chips: 100,
        };
        assert!(join.is_input());
        let end = Event::HandEnd { hand: 1 };
        assert!(!end.is_input());
    }

    #[test]
    fn serde_round_trip() {
        let event = Event::Action {
            seat: 3,
            action: Action::Raise { amount: 30 },
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
