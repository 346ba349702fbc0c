use felt_cards::Hole;
use felt_core::Chips;
use felt_core::HandNumber;
use felt_core::Position;
use serde::Deserialize;
use serde::Serialize;

/// A seat's standing at the table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeatState {
    /// No player; the seat is available.
    #[default]
    Empty,
    /// Dealt in (or eligible to be) and able to act.
    Active,
    /// Out of the current hand.
    Folded,
    /// Committed the whole stack; no further decisions this hand.
    AllIn,
    /// Seated but skipping hands.
    SittingOut,
    /// Joined mid-hand; dealt in from the next hand.
    WaitingNextHand,
}

/// One of the table's nine seats.
///
/// `street_committed` and `hand_committed` track chips moved into the pot
/// this betting round and this hand. `acted` records a voluntary action
/// since the last full raise — blind posts don't count, and short all-ins
/// don't clear it — which is exactly the state the betting-round
/// completion rule needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    id: Position,
    pid: String,
    nickname: String,
    chips: Chips,
    hole: Option<Hole>,
    street_committed: Chips,
    hand_committed: Chips,
    state: SeatState,
    acted: bool,
    /// Left mid-hand: folded now, seat vacates at settlement so the
    /// committed chips stay in the pot.
    pending_leave: bool,
    joined_hand: HandNumber,
}

impl Seat {
    pub fn vacant(id: Position) -> Self {
        Self {
            id,
            pid: String::new(),
            nickname: String::new(),
            chips: 0,
            hole: None,
            street_committed: 0,
            hand_committed: 0,
            state: SeatState::Empty,
            acted: false,
            pending_leave: false,
            joined_hand: 0,
        }
    }

    //
    pub fn id(&self) -> Position {
        self.id
    }
    pub fn pid(&self) -> &str {
        &self.pid
    }
    pub fn nickname(&self) -> &str {
        &self.nickname
    }
    pub fn chips(&self) -> Chips {
        self.chips
    }
    pub fn hole(&self) -> Option<Hole> {
        self.hole
    }
    pub fn street_committed(&self) -> Chips {
        self.street_committed
    }
    pub fn hand_committed(&self) -> Chips {
        self.hand_committed
    }
    pub fn state(&self) -> SeatState {
        self.state
    }
    pub fn acted(&self) -> bool {
        self.acted
    }
    pub fn pending_leave(&self) -> bool {
        self.pending_leave
    }
    pub fn joined_hand(&self) -> HandNumber {
        self.joined_hand
    }

    //
    pub fn is_empty(&self) -> bool {
        self.state == SeatState::Empty
    }
    pub fn is_occupied(&self) -> bool {
        self.state != SeatState::Empty
    }
    /// Still contesting the pot.
    pub fn in_pot(&self) -> bool {
        matches!(self.state, SeatState::Active | SeatState::AllIn)
    }
    /// Able to take a decision right now.
    pub fn can_act(&self) -> bool {
        self.state == SeatState::Active && self.chips > 0
    }

    //
    pub fn occupy(&mut self, pid: String, nickname: String, chips: Chips, hand: HandNumber) {
        self.pid = pid;
        self.nickname = nickname;
        self.chips = chips;
        self.joined_hand = hand;
        self.state = SeatState::Active;
    }
    pub fn vacate(&mut self) {
        *self = Self::vacant(self.id);
    }
    pub fn reset_state(&mut self, state: SeatState) {
        self.state = state;
    }
    pub fn reset_acted(&mut self, acted: bool) {
        self.acted = acted;
    }

    /// Moves chips into the pot, capped by the stack; flips to all-in when
    /// the stack empties. Returns the amount actually committed.
    pub fn commit(&mut self, amount: Chips) -> Chips {
        let committed = amount.min(self.chips);
        self.chips -= committed;
        self.street_committed += committed;
        self.hand_committed += committed;
        if self.chips == 0 && self.state == SeatState::Active {
            self.state = SeatState::AllIn;
        }
        committed
    }
    pub fn award(&mut self, amount: Chips) {
        self.chips += amount;
    }
    pub fn fold(&mut self) {
        self.state = SeatState::Folded;
    }
    pub fn mark_leaving(&mut self) {
        self.pending_leave = true;
    }

    /// New betting round: street commitments and acted flags reset.
    pub fn reset_street(&mut self) {
        self.street_committed = 0;
        self.acted = false;
    }
    /// New hand: cards and commitments reset, eligibility recomputed.
    pub fn reset_hand(&mut self, hole: Option<Hole>) {
        self.hole = hole;
        self.street_committed = 0;
        self.hand_committed = 0;
        self.acted = false;
    }
    /// Hand is settled: commitments zeroed, busted stacks sit out.
    pub fn settle_hand(&mut self) {
        self.street_committed = 0;
        self.hand_committed = 0;
        self.acted = false;
        match self.state {
            SeatState::Folded | SeatState::AllIn | SeatState::Active => {
                self.state = if self.chips > 0 {
                    SeatState::Active
                } else {
                    SeatState::SittingOut
                };
            }
            SeatState::WaitingNextHand => self.state = SeatState::Active,
            SeatState::Empty | SeatState::SittingOut => {}
        }
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{}] {:?} {} ({})", self.id, self.state, self.pid, self.chips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_caps_at_stack() {
        let mut seat = Seat::vacant(0);
        seat.occupy("p1".into(), "P1".into(), 50, 1);
        assert_eq!(seat.commit(80), 50);
        assert_eq!(seat.chips(), 0);
        assert_eq!(seat.state(), SeatState::AllIn);
        assert_eq!(seat.hand_committed(), 50);
    }

    #[test]
    fn settle_busted_seat_sits_out() {
        let mut seat = Seat::vacant(2);
        seat.occupy("p1".into(), "P1".into(), 10, 1);
        seat.commit(10);
        seat.settle_hand();
        assert_eq!(seat.state(), SeatState::SittingOut);
    }

    #[test]
    fn settle_restores_active() {
        let mut seat = Seat::vacant(3);
        seat.occupy("p1".into(), "P1".into(), 100, 1);
        seat.fold();
        seat.settle_hand();
        assert_eq!(seat.state(), SeatState::Active);
        assert_eq!(seat.hand_committed(), 0);
    }
}
