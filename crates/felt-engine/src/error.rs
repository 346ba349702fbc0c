use felt_core::Chips;
use felt_core::Position;

/// Rejections and failures surfaced by the engine.
///
/// Validation rejections are routine (logged at debug by callers) and leave
/// state untouched. `Invariant` is fatal for the current hand: the table is
/// reset to waiting and a fresh snapshot broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The acting seat is not the current actor.
    NotYourTurn(Position),
    /// The action kind is not legal in the current state.
    IllegalAction(String),
    /// The action kind is fine but the amount is not.
    IllegalAmount(Chips),
    SeatOutOfRange(Position),
    SeatOccupied(Position),
    SeatVacant(Position),
    AlreadySeated(String),
    NotEnoughPlayers,
    /// Expiry of a timer that no longer corresponds to live state.
    StaleTimer,
    /// The event variant cannot be injected from outside.
    NotAnInput(&'static str),
    /// Internal contradiction; the table has been reset to waiting.
    Invariant(String),
}

impl EngineError {
    /// Wire error code for the bridge layer.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotYourTurn(_) | Self::IllegalAction(_) => "ILLEGAL_ACTION",
            Self::IllegalAmount(_) => "ILLEGAL_AMOUNT",
            _ => "COMMAND_FAILED",
        }
    }
    /// True for expiries of cancelled timers, which callers drop silently.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleTimer)
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotYourTurn(seat) => write!(f, "seat {} is not the actor", seat),
            Self::IllegalAction(s) => write!(f, "illegal action: {}", s),
            Self::IllegalAmount(n) => write!(f, "illegal amount: {}", n),
            Self::SeatOutOfRange(seat) => write!(f, "seat {} out of range", seat),
            Self::SeatOccupied(seat) => write!(f, "seat {} is occupied", seat),
            Self::SeatVacant(seat) => write!(f, "seat {} is vacant", seat),
            Self::AlreadySeated(pid) => write!(f, "{} is already seated", pid),
            Self::NotEnoughPlayers => write!(f, "not enough players"),
            Self::StaleTimer => write!(f, "stale timer expiry"),
            Self::NotAnInput(kind) => write!(f, "{} cannot be injected", kind),
            Self::Invariant(s) => write!(f, "invariant violation: {}", s),
        }
    }
}

impl std::error::Error for EngineError {}
