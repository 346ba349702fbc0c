use felt_cards::Street;
use serde::Deserialize;
use serde::Serialize;

/// Top-level table phase.
///
/// Transitions are monotonic within a hand:
/// `waiting → preflop → flop → turn → river → showdown → settling → waiting`,
/// with early exits to settling when a hand goes uncontested.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Waiting,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    Settling,
}

impl Phase {
    /// True while a betting round can be open.
    pub fn is_betting(&self) -> bool {
        matches!(self, Self::Preflop | Self::Flop | Self::Turn | Self::River)
    }
    /// True from first deal to final payout.
    pub fn in_hand(&self) -> bool {
        !matches!(self, Self::Waiting)
    }
    /// The street being bet, if any.
    pub fn street(&self) -> Option<Street> {
        match self {
            Self::Preflop => Some(Street::Pref),
            Self::Flop => Some(Street::Flop),
            Self::Turn => Some(Street::Turn),
            Self::River => Some(Street::Rive),
            _ => None,
        }
    }
}

impl From<Street> for Phase {
    fn from(street: Street) -> Self {
        match street {
            Street::Pref => Self::Preflop,
            Street::Flop => Self::Flop,
            Street::Turn => Self::Turn,
            Street::Rive => Self::River,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Preflop => write!(f, "preflop"),
            Self::Flop => write!(f, "flop"),
            Self::Turn => write!(f, "turn"),
            Self::River => write!(f, "river"),
            Self::Showdown => write!(f, "showdown"),
            Self::Settling => write!(f, "settling"),
        }
    }
}
