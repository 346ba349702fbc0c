use super::event::Event;
use super::event::LoggedEvent;
use super::phase::Phase;
use super::pot::Pot;
use super::seat::Seat;
use super::seat::SeatState;
use felt_cards::Board;
use felt_cards::Card;
use felt_cards::Deck;
use felt_core::Chips;
use felt_core::HandNumber;
use felt_core::N;
use felt_core::Position;
use felt_core::Sequence;
use serde::Deserialize;
use serde::Serialize;

/// Authoritative state of one table, including its append-only event log.
///
/// Everything here serializes, so a table round-trips through the
/// persistence layer unchanged. The engine is the only writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    id: String,
    small_blind: Chips,
    big_blind: Chips,
    phase: Phase,
    seats: Vec<Seat>,
    board: Board,
    burns: Vec<Card>,
    deck: Deck,
    button: Position,
    actor: Option<Position>,
    current_bet: Chips,
    min_raise: Chips,
    last_aggressor: Option<Position>,
    sb_seat: Option<Position>,
    bb_seat: Option<Position>,
    pots: Vec<Pot>,
    hand_number: HandNumber,
    /// Distributions already paid out this hand.
    paid: Chips,
    log: Vec<LoggedEvent>,
}

impl Table {
    pub fn new(id: String, small_blind: Chips, big_blind: Chips) -> Self {
        assert!(small_blind > 0 && big_blind >= small_blind);
        Self {
            id,
            small_blind,
            big_blind,
            phase: Phase::Waiting,
            seats: (0..N).map(Seat::vacant).collect(),
            board: Board::empty(),
            burns: Vec::new(),
            deck: Deck::default(),
            button: 0,
            actor: None,
            current_bet: 0,
            min_raise: big_blind,
            last_aggressor: None,
            sb_seat: None,
            bb_seat: None,
            pots: Vec::new(),
            hand_number: 0,
            paid: 0,
            log: Vec::new(),
        }
    }

    //
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn small_blind(&self) -> Chips {
        self.small_blind
    }
    pub fn big_blind(&self) -> Chips {
        self.big_blind
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }
    pub fn seat(&self, pos: Position) -> &Seat {
        &self.seats[pos]
    }
    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn burns(&self) -> &[Card] {
        &self.burns
    }
    pub fn deck(&self) -> &Deck {
        &self.deck
    }
    pub fn button(&self) -> Position {
        self.button
    }
    pub fn actor(&self) -> Option<Position> {
        self.actor
    }
    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }
    pub fn min_raise(&self) -> Chips {
        self.min_raise
    }
    pub fn last_aggressor(&self) -> Option<Position> {
        self.last_aggressor
    }
    pub fn sb_seat(&self) -> Option<Position> {
        self.sb_seat
    }
    pub fn bb_seat(&self) -> Option<Position> {
        self.bb_seat
    }
    pub fn pots(&self) -> &[Pot] {
        &self.pots
    }
    pub fn hand_number(&self) -> HandNumber {
        self.hand_number
    }
    pub fn paid(&self) -> Chips {
        self.paid
    }
    pub fn log(&self) -> &[LoggedEvent] {
        &self.log
    }

    //
    pub(crate) fn seat_mut(&mut self, pos: Position) -> &mut Seat {
        &mut self.seats[pos]
    }
    pub(crate) fn seats_mut(&mut self) -> &mut [Seat] {
        &mut self.seats
    }
    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }
    pub(crate) fn set_actor(&mut self, actor: Option<Position>) {
        self.actor = actor;
    }
    pub(crate) fn set_button(&mut self, button: Position) {
        self.button = button;
    }
    pub(crate) fn set_current_bet(&mut self, bet: Chips) {
        self.current_bet = bet;
    }
    pub(crate) fn set_min_raise(&mut self, raise: Chips) {
        self.min_raise = raise;
    }
    pub(crate) fn set_last_aggressor(&mut self, seat: Option<Position>) {
        self.last_aggressor = seat;
    }
    pub(crate) fn set_blind_seats(&mut self, sb: Option<Position>, bb: Option<Position>) {
        self.sb_seat = sb;
        self.bb_seat = bb;
    }
    pub(crate) fn set_pots(&mut self, pots: Vec<Pot>) {
        self.pots = pots;
    }
    pub(crate) fn set_paid(&mut self, paid: Chips) {
        self.paid = paid;
    }
    pub(crate) fn set_hand_number(&mut self, hand: HandNumber) {
        self.hand_number = hand;
    }
    pub(crate) fn set_deck(&mut self, deck: Deck) {
        self.deck = deck;
    }
    pub(crate) fn deck_mut(&mut self) -> &mut Deck {
        &mut self.deck
    }
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }
    pub(crate) fn burns_mut(&mut self) -> &mut Vec<Card> {
        &mut self.burns
    }

    /// Appends to the event log, returning the assigned sequence number.
    pub(crate) fn record(&mut self, event: Event) -> Sequence {
        let seq = self.log.len() as Sequence;
        self.log.push(LoggedEvent { seq, event });
        seq
    }

    // ------------------------------------------------------------------
    // seat iteration
    // ------------------------------------------------------------------
    /// Seats dealt into the current hand and still contesting.
    pub fn in_pot(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter().filter(|s| s.in_pot())
    }
    pub fn n_in_pot(&self) -> usize {
        self.in_pot().count()
    }
    /// Occupied seat whose pid matches, if any.
    pub fn seat_of(&self, pid: &str) -> Option<&Seat> {
        self.seats.iter().filter(|s| s.is_occupied()).find(|s| s.pid() == pid)
    }
    /// First decision-capable seat strictly clockwise of `pos`.
    pub fn next_actor_after(&self, pos: Position) -> Option<Position> {
        (1..=N)
            .map(|step| (pos + step) % N)
            .find(|p| self.seats[*p].can_act())
    }
    /// First seat clockwise of `pos` eligible to be dealt a hand.
    pub fn next_dealt_after(&self, pos: Position) -> Option<Position> {
        (1..=N)
            .map(|step| (pos + step) % N)
            .find(|p| self.seats[*p].in_pot())
    }

    // ------------------------------------------------------------------
    // invariants
    // ------------------------------------------------------------------
    /// Checks the structural invariants that must hold after every
    /// committed event. A violation is fatal for the current hand.
    pub fn check(&self) -> Result<(), String> {
        let committed = self.seats.iter().map(Seat::hand_committed).sum::<Chips>();
        let potted = self.pots.iter().map(|p| p.amount).sum::<Chips>();
        if potted != committed.saturating_sub(self.paid) {
            return Err(format!(
                "pot total {} != committed {} - paid {}",
                potted, committed, self.paid
            ));
        }
        if let Some(actor) = self.actor {
            let seat = &self.seats[actor];
            if !seat.can_act() {
                return Err(format!("actor {} cannot act ({:?})", actor, seat.state()));
            }
        }
        let street_max = self
            .seats
            .iter()
            .filter(|s| s.in_pot())
            .map(Seat::street_committed)
            .max()
            .unwrap_or(0);
        if self.phase.is_betting() && self.current_bet < street_max {
            return Err(format!(
                "current bet {} below max street commitment {}",
                self.current_bet, street_max
            ));
        }
        for seat in self.seats.iter() {
            if seat.state() == SeatState::Empty && !seat.pid().is_empty() {
                return Err(format!("empty seat {} holds pid {}", seat.id(), seat.pid()));
            }
        }
        for (i, logged) in self.log.iter().enumerate() {
            if logged.seq != i as Sequence {
                return Err(format!("log gap at {}", i));
            }
        }
        Ok(())
    }

    /// Total chips sitting behind plus everything committed and not yet
    /// paid out. Constant across a hand (chip conservation).
    pub fn total_chips(&self) -> Chips {
        self.seats.iter().map(|s| s.chips() + s.hand_committed()).sum::<Chips>()
            - self.paid
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} hand #{} pot {}",
            self.id,
            self.phase,
            self.hand_number,
            self.pots.iter().map(|p| p.amount).sum::<Chips>(),
        )
    }
}
