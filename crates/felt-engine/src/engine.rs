use super::error::EngineError;
use super::event::Action;
use super::event::Blind;
use super::event::CountdownKind;
use super::event::Distribution;
use super::event::Event;
use super::event::LoggedEvent;
use super::event::PayoutReason;
use super::event::Reveal;
use super::phase::Phase;
use super::pot::Pot;
use super::seat::SeatState;
use super::table::Table;
use felt_cards::Deck;
use felt_cards::Hand;
use felt_cards::Strength;
use felt_cards::Street;
use felt_core::Chips;
use felt_core::MIN_PLAYERS;
use felt_core::N;
use felt_core::Position;
use rand::Rng;
use serde_json::json;

/// Countdown durations the engine stamps onto emitted events.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub action_ms: u64,
    pub street_deal_ms: u64,
    pub new_hand_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            action_ms: 15_000,
            street_deal_ms: 600,
            new_hand_ms: 4_000,
        }
    }
}

impl From<&felt_core::Config> for Timing {
    fn from(config: &felt_core::Config) -> Self {
        Self {
            action_ms: config.action_timeout.as_millis() as u64,
            street_deal_ms: config.street_deal_delay.as_millis() as u64,
            new_hand_ms: config.new_hand_delay.as_millis() as u64,
        }
    }
}

/// The rules of the game, wrapped around one [`Table`].
///
/// [`Engine::dispatch`] accepts external intents, validates them against
/// the current state, applies them together with every synchronously
/// derived consequence, and returns the batch of events appended to the
/// log. [`Engine::expire`] is the timer wheel's entry point. Both leave
/// state untouched on rejection; an invariant violation after an applied
/// event quarantines the table back to `waiting`.
#[derive(Debug)]
pub struct Engine {
    table: Table,
    timing: Timing,
}

impl Engine {
    pub fn new(id: &str, small_blind: Chips, big_blind: Chips, timing: Timing) -> Self {
        let mut table = Table::new(id.to_string(), small_blind, big_blind);
        // seat N-1 holds the button marker so the first hand rotates to 0
        table.set_button(N - 1);
        Self { table, timing }
    }
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Rebuilds an engine by re-injecting the external events of a log.
    /// Derived events regenerate deterministically from the logged seeds.
    pub fn replay(
        id: &str,
        small_blind: Chips,
        big_blind: Chips,
        timing: Timing,
        log: &[LoggedEvent],
    ) -> Result<Self, EngineError> {
        let mut engine = Self::new(id, small_blind, big_blind, timing);
        for logged in log.iter().filter(|l| l.event.is_input()) {
            engine.dispatch(logged.event.clone())?;
        }
        Ok(engine)
    }

    // ------------------------------------------------------------------
    // entry points
    // ------------------------------------------------------------------
    pub fn dispatch(&mut self, event: Event) -> Result<Vec<Event>, EngineError> {
        let context = event.to_string();
        let result = match event {
            Event::PlayerJoin { seat, pid, nickname, chips } => {
                self.on_join(seat, pid, nickname, chips)
            }
            Event::PlayerLeave { seat, pid } => self.on_leave(seat, pid),
            Event::PlayerSitOut { seat } => self.on_sit_out(seat),
            Event::PlayerSitIn { seat } => self.on_sit_in(seat),
            Event::StartHand { seed, .. } => self.on_start_hand(seed),
            Event::Action { seat, action } => self.on_action(seat, action),
            Event::ActionTimeout { seat, .. } => self.on_timeout(seat),
            other => return Err(EngineError::NotAnInput(other.kind())),
        };
        self.seal(&context, result)
    }

    /// Timer-wheel expiry. Stale expiries are rejected with
    /// [`EngineError::StaleTimer`], which callers drop silently.
    pub fn expire(&mut self, kind: CountdownKind) -> Result<Vec<Event>, EngineError> {
        match kind {
            CountdownKind::Action => {
                let seat = self.table.actor().ok_or(EngineError::StaleTimer)?;
                self.dispatch(Event::ActionTimeout {
                    seat,
                    resolved: Action::Fold,
                })
            }
            CountdownKind::StreetDeal => {
                let result = self.on_street_deal();
                self.seal("street deal", result)
            }
            CountdownKind::NewHand => {
                if self.table.phase() != Phase::Waiting {
                    return Err(EngineError::StaleTimer);
                }
                let seed = rand::rng().random::<u64>();
                self.dispatch(Event::StartHand { hand: 0, seed, button: 0 })
            }
            CountdownKind::Reconnect => Err(EngineError::StaleTimer),
        }
    }

    /// Post-apply invariant gate: a violated table is quarantined back to
    /// `waiting` with commitments refunded, and the error surfaced.
    fn seal(
        &mut self,
        context: &str,
        result: Result<Vec<Event>, EngineError>,
    ) -> Result<Vec<Event>, EngineError> {
        match result {
            Ok(batch) => match self.table.check() {
                Ok(()) => Ok(batch),
                Err(msg) => {
                    log::error!(
                        "[table {}] invariant violated applying {}: {}",
                        self.table.id(),
                        context,
                        msg
                    );
                    self.quarantine();
                    Err(EngineError::Invariant(msg))
                }
            },
            Err(e) => Err(e),
        }
    }

    /// Fatal-path reset: refund commitments, void the hand, return to
    /// waiting. The table stays available for new hands.
    fn quarantine(&mut self) {
        for pos in 0..N {
            let refund = self.table.seat(pos).hand_committed();
            let seat = self.table.seat_mut(pos);
            seat.award(refund);
            if seat.pending_leave() {
                seat.vacate();
            } else {
                seat.settle_hand();
            }
        }
        self.table.set_pots(Vec::new());
        self.table.set_paid(0);
        self.table.set_actor(None);
        self.table.set_current_bet(0);
        self.table.set_min_raise(self.table.big_blind());
        self.table.set_last_aggressor(None);
        self.table.set_blind_seats(None, None);
        self.table.set_phase(Phase::Waiting);
    }

    // ------------------------------------------------------------------
    // seating
    // ------------------------------------------------------------------
    fn on_join(
        &mut self,
        seat: Position,
        pid: String,
        nickname: String,
        chips: Chips,
    ) -> Result<Vec<Event>, EngineError> {
        if seat >= N {
            return Err(EngineError::SeatOutOfRange(seat));
        }
        if self.table.seat(seat).is_occupied() {
            return Err(EngineError::SeatOccupied(seat));
        }
        if self.table.seat_of(&pid).is_some() {
            return Err(EngineError::AlreadySeated(pid));
        }
        // buy-in ranges are directory policy, enforced at the bridge;
        // the engine only refuses a chipless seat
        if chips == 0 {
            return Err(EngineError::IllegalAmount(chips));
        }
        let mut out = Vec::new();
        let hand = self.table.hand_number();
        let mid_hand = self.table.phase().in_hand();
        self.table
            .seat_mut(seat)
            .occupy(pid.clone(), nickname.clone(), chips, hand);
        self.emit(
            &mut out,
            Event::PlayerJoin { seat, pid: pid.clone(), nickname, chips },
        );
        if mid_hand {
            self.table.seat_mut(seat).reset_state(SeatState::WaitingNextHand);
            self.emit(&mut out, Event::PlayerWaiting { seat, pid });
        } else if self.can_deal() {
            self.emit_countdown(&mut out, CountdownKind::NewHand, json!({}));
        }
        Ok(out)
    }

    fn on_leave(&mut self, seat: Position, pid: String) -> Result<Vec<Event>, EngineError> {
        if seat >= N {
            return Err(EngineError::SeatOutOfRange(seat));
        }
        if self.table.seat(seat).is_empty() {
            return Err(EngineError::SeatVacant(seat));
        }
        if self.table.seat(seat).pid() != pid {
            return Err(EngineError::IllegalAction("pid does not own seat".into()));
        }
        let mut out = Vec::new();
        self.emit(&mut out, Event::PlayerLeave { seat, pid });
        let mid_hand = self.table.phase().in_hand();
        if mid_hand && self.table.seat(seat).in_pot() {
            // implicit fold first; the seat vacates at settlement so its
            // committed chips stay in the pot
            self.table.seat_mut(seat).mark_leaving();
            self.fold_out(seat, &mut out);
        } else if mid_hand && self.table.seat(seat).hand_committed() > 0 {
            // already folded this hand: defer the vacate the same way
            self.table.seat_mut(seat).mark_leaving();
        } else {
            self.table.seat_mut(seat).vacate();
        }
        Ok(out)
    }

    fn on_sit_out(&mut self, seat: Position) -> Result<Vec<Event>, EngineError> {
        if seat >= N {
            return Err(EngineError::SeatOutOfRange(seat));
        }
        if self.table.seat(seat).is_empty() {
            return Err(EngineError::SeatVacant(seat));
        }
        if self.table.seat(seat).state() == SeatState::AllIn {
            return Err(EngineError::IllegalAction("cannot sit out while all-in".into()));
        }
        let mut out = Vec::new();
        self.emit(&mut out, Event::PlayerSitOut { seat });
        if self.table.phase().in_hand() && self.table.seat(seat).in_pot() {
            self.fold_out(seat, &mut out);
        }
        self.table.seat_mut(seat).reset_state(SeatState::SittingOut);
        Ok(out)
    }

    fn on_sit_in(&mut self, seat: Position) -> Result<Vec<Event>, EngineError> {
        if seat >= N {
            return Err(EngineError::SeatOutOfRange(seat));
        }
        let state = self.table.seat(seat).state();
        if state == SeatState::Empty {
            return Err(EngineError::SeatVacant(seat));
        }
        if state != SeatState::SittingOut {
            return Err(EngineError::IllegalAction("not sitting out".into()));
        }
        if self.table.seat(seat).chips() == 0 {
            return Err(EngineError::IllegalAction("no chips to play".into()));
        }
        let mut out = Vec::new();
        self.emit(&mut out, Event::PlayerSitIn { seat });
        if self.table.phase().in_hand() {
            self.table.seat_mut(seat).reset_state(SeatState::WaitingNextHand);
            let pid = self.table.seat(seat).pid().to_string();
            self.emit(&mut out, Event::PlayerWaiting { seat, pid });
        } else {
            self.table.seat_mut(seat).reset_state(SeatState::Active);
            if self.can_deal() {
                self.emit_countdown(&mut out, CountdownKind::NewHand, json!({}));
            }
        }
        Ok(out)
    }

    /// Folds a seat outside its turn (leave, sit-out, disconnect expiry)
    /// and resolves any cascade: uncontested settlement, actor repair, or
    /// a round that the fold just closed.
    fn fold_out(&mut self, seat: Position, out: &mut Vec<Event>) {
        let was_actor = self.table.actor() == Some(seat);
        self.table.seat_mut(seat).fold();
        self.table.set_pots(Pot::build(self.table.seats()));
        if self.table.n_in_pot() <= 1 {
            self.table.set_actor(None);
            self.settle_uncontested(out);
        } else if was_actor || self.round_complete() {
            self.advance(seat, out);
        }
    }

    // ------------------------------------------------------------------
    // hand lifecycle
    // ------------------------------------------------------------------
    fn on_start_hand(&mut self, seed: u64) -> Result<Vec<Event>, EngineError> {
        if self.table.phase() != Phase::Waiting {
            return Err(EngineError::IllegalAction("hand already in flight".into()));
        }
        let funded = (0..N)
            .filter(|p| self.table.seat(*p).state() == SeatState::Active)
            .filter(|p| self.table.seat(*p).chips() >= self.table.big_blind())
            .count();
        if funded < MIN_PLAYERS {
            return Err(EngineError::NotEnoughPlayers);
        }

        let hand = self.table.hand_number() + 1;
        self.table.set_hand_number(hand);
        self.table.set_deck(Deck::shuffled(seed));
        self.table.board_mut().clear();
        self.table.burns_mut().clear();
        self.table.set_pots(Vec::new());
        self.table.set_paid(0);
        for pos in 0..N {
            let seat = self.table.seat_mut(pos);
            if seat.is_occupied() {
                seat.reset_hand(None);
            }
        }
        // every funded active seat is dealt in
        let dealt = (0..N)
            .filter(|p| self.table.seat(*p).state() == SeatState::Active)
            .filter(|p| self.table.seat(*p).chips() > 0)
            .collect::<Vec<Position>>();
        let button = self
            .table
            .next_dealt_after(self.table.button())
            .expect("dealt seats exist");
        self.table.set_button(button);
        self.table.set_phase(Phase::Preflop);

        let mut out = Vec::new();
        self.emit(&mut out, Event::StartHand { hand, seed, button });

        // blinds: heads-up the button is the small blind
        let (sb, bb) = if dealt.len() == 2 {
            (button, self.table.next_dealt_after(button).expect("two dealt"))
        } else {
            let sb = self.table.next_dealt_after(button).expect("dealt seats");
            let bb = self.table.next_dealt_after(sb).expect("dealt seats");
            (sb, bb)
        };
        self.table.set_blind_seats(Some(sb), Some(bb));
        let small = self.table.small_blind();
        let big = self.table.big_blind();
        let posted = self.table.seat_mut(sb).commit(small);
        self.emit(&mut out, Event::PostBlind { seat: sb, blind: Blind::Small, amount: posted });
        let posted = self.table.seat_mut(bb).commit(big);
        self.emit(&mut out, Event::PostBlind { seat: bb, blind: Blind::Big, amount: posted });
        self.table.set_current_bet(big);
        self.table.set_min_raise(big);
        self.table.set_last_aggressor(None);
        self.table.set_pots(Pot::build(self.table.seats()));

        // deal clockwise from the button
        let mut pos = button;
        for _ in 0..dealt.len() {
            pos = self.table.next_dealt_after(pos).expect("dealt seats");
            match self.table.deck_mut().hole() {
                Some(hole) => {
                    self.table.seat_mut(pos).reset_hand(Some(hole));
                    self.emit(&mut out, Event::DealHole { seat: pos, hole });
                }
                None => unreachable!("52 cards cover 9 holes"),
            }
        }

        // first to act: heads-up the button opens, else left of the big blind
        let first = if dealt.len() == 2 {
            Some(sb).filter(|p| self.table.seat(*p).can_act())
        } else {
            self.table.next_actor_after(bb)
        };
        match first {
            Some(actor) => {
                self.table.set_actor(Some(actor));
                self.emit_action_countdown(&mut out, actor);
            }
            // blinds put everyone all-in: run the board out
            None => self.emit_countdown(
                &mut out,
                CountdownKind::StreetDeal,
                json!({ "street": "flop" }),
            ),
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // actions
    // ------------------------------------------------------------------
    fn on_action(&mut self, seat: Position, action: Action) -> Result<Vec<Event>, EngineError> {
        let actor = self
            .table
            .actor()
            .ok_or_else(|| EngineError::IllegalAction("no action pending".into()))?;
        if actor != seat {
            return Err(EngineError::NotYourTurn(seat));
        }
        let action = self.normalize(seat, action);
        self.validate(seat, action)?;
        let mut out = Vec::new();
        self.emit(&mut out, Event::Action { seat, action });
        self.apply_action(seat, action);
        self.advance(seat, &mut out);
        Ok(out)
    }

    fn on_timeout(&mut self, seat: Position) -> Result<Vec<Event>, EngineError> {
        match self.table.actor() {
            Some(actor) if actor == seat => {}
            _ => return Err(EngineError::StaleTimer),
        }
        let resolved = if self.to_call(seat) == 0 {
            Action::Check
        } else {
            Action::Fold
        };
        let mut out = Vec::new();
        self.emit(&mut out, Event::ActionTimeout { seat, resolved });
        self.apply_action(seat, resolved);
        self.advance(seat, &mut out);
        Ok(out)
    }

    /// Client-tagged intents normalize to what the pot actually allows:
    /// a bet into an open bet is a raise, an all-in is classified by the
    /// resulting commitment.
    fn normalize(&self, seat: Position, action: Action) -> Action {
        let bet = self.table.current_bet();
        match action {
            Action::Bet { amount } if bet > 0 => Action::Raise { amount },
            Action::Raise { amount } if bet == 0 => Action::Bet { amount },
            Action::AllIn => {
                let total =
                    self.table.seat(seat).street_committed() + self.table.seat(seat).chips();
                if bet == 0 {
                    Action::Bet { amount: total }
                } else if total <= bet {
                    Action::Call
                } else {
                    Action::Raise { amount: total }
                }
            }
            other => other,
        }
    }

    fn validate(&self, seat: Position, action: Action) -> Result<(), EngineError> {
        let table = &self.table;
        let s = table.seat(seat);
        match action {
            Action::Fold => Ok(()),
            Action::Check => match self.to_call(seat) {
                0 => Ok(()),
                _ => Err(EngineError::IllegalAction("cannot check facing a bet".into())),
            },
            Action::Call => match self.to_call(seat) {
                0 => Err(EngineError::IllegalAction("nothing to call".into())),
                _ => Ok(()),
            },
            Action::Bet { amount } => {
                if amount == 0 || amount > s.chips() {
                    return Err(EngineError::IllegalAmount(amount));
                }
                if amount < table.big_blind() && amount < s.chips() {
                    return Err(EngineError::IllegalAmount(amount));
                }
                Ok(())
            }
            Action::Raise { amount } => {
                if s.acted() {
                    // short all-ins do not reopen action for seats that
                    // already matched the current bet
                    return Err(EngineError::IllegalAction("raising is closed".into()));
                }
                if amount <= table.current_bet() {
                    return Err(EngineError::IllegalAmount(amount));
                }
                let put_in = amount - s.street_committed();
                if put_in > s.chips() {
                    return Err(EngineError::IllegalAmount(amount));
                }
                let increment = amount - table.current_bet();
                let all_in = put_in == s.chips();
                if increment < table.min_raise() && !all_in {
                    return Err(EngineError::IllegalAmount(amount));
                }
                Ok(())
            }
            Action::AllIn => unreachable!("normalized before validation"),
        }
    }

    fn apply_action(&mut self, seat: Position, action: Action) {
        match action {
            Action::Fold => {
                self.table.seat_mut(seat).fold();
            }
            Action::Check => {
                self.table.seat_mut(seat).reset_acted(true);
            }
            Action::Call => {
                let owed = self.to_call(seat);
                self.table.seat_mut(seat).commit(owed);
                self.table.seat_mut(seat).reset_acted(true);
            }
            Action::Bet { amount } => {
                self.table.seat_mut(seat).commit(amount);
                let committed = self.table.seat(seat).street_committed();
                self.table.set_current_bet(committed);
                if amount >= self.table.big_blind() {
                    self.table.set_min_raise(amount);
                    self.table.set_last_aggressor(Some(seat));
                    self.reopen_action(seat);
                }
                self.table.seat_mut(seat).reset_acted(true);
            }
            Action::Raise { amount } => {
                let increment = amount - self.table.current_bet();
                let put_in = amount - self.table.seat(seat).street_committed();
                let full = increment >= self.table.min_raise();
                self.table.seat_mut(seat).commit(put_in);
                let committed = self.table.seat(seat).street_committed();
                self.table.set_current_bet(committed);
                if full {
                    self.table.set_min_raise(increment);
                    self.table.set_last_aggressor(Some(seat));
                    self.reopen_action(seat);
                }
                self.table.seat_mut(seat).reset_acted(true);
            }
            Action::AllIn => unreachable!("normalized before application"),
        }
        self.table.set_pots(Pot::build(self.table.seats()));
    }

    /// A full-sized bet or raise reopens action for everyone else.
    fn reopen_action(&mut self, aggressor: Position) {
        for pos in 0..N {
            if pos != aggressor && self.table.seat(pos).state() == SeatState::Active {
                self.table.seat_mut(pos).reset_acted(false);
            }
        }
    }

    /// After an applied action: settle, pause for the next street, or
    /// move to the next actor.
    fn advance(&mut self, from: Position, out: &mut Vec<Event>) {
        if self.table.n_in_pot() <= 1 {
            self.table.set_actor(None);
            self.settle_uncontested(out);
        } else if self.round_complete() {
            self.table.set_actor(None);
            if self.table.phase() == Phase::River {
                self.settle_showdown(out);
            } else {
                let street = self.table.phase().street().expect("betting phase").next();
                self.emit_countdown(
                    &mut *out,
                    CountdownKind::StreetDeal,
                    json!({ "street": street }),
                );
            }
        } else {
            let next = self
                .table
                .next_actor_after(from)
                .expect("incomplete round has an actor");
            self.table.set_actor(Some(next));
            self.emit_action_countdown(out, next);
        }
    }

    /// The betting-round completion rule.
    ///
    /// Complete when one seat remains, when nobody can act, or when every
    /// decision-capable seat has matched the bet and acted since the last
    /// full raise. The `acted` flag encodes both the big-blind option
    /// (blind posts don't set it) and the return-to-aggressor rule (full
    /// raises clear it for everyone else).
    fn round_complete(&self) -> bool {
        if self.table.n_in_pot() <= 1 {
            return true;
        }
        let actives = self
            .table
            .seats()
            .iter()
            .filter(|s| s.can_act())
            .collect::<Vec<_>>();
        if actives.is_empty() {
            return true;
        }
        let matched = actives
            .iter()
            .all(|s| s.street_committed() == self.table.current_bet());
        if actives.len() == 1 {
            // a lone seat with chips against all-ins has nobody to bet at
            return matched;
        }
        matched && actives.iter().all(|s| s.acted())
    }

    // ------------------------------------------------------------------
    // streets
    // ------------------------------------------------------------------
    /// Arms on the street-deal countdown: burn one, reveal the street,
    /// reset the round, and either open betting or keep running out.
    fn on_street_deal(&mut self) -> Result<Vec<Event>, EngineError> {
        if !self.pending_deal() {
            return Err(EngineError::StaleTimer);
        }
        let street = self.table.phase().street().expect("betting phase").next();
        let burn = self
            .table
            .deck_mut()
            .draw()
            .ok_or_else(|| EngineError::Invariant("deck exhausted".into()))?;
        self.table.burns_mut().push(burn);
        let mut cards = Vec::with_capacity(street.n_revealed());
        for _ in 0..street.n_revealed() {
            let card = self
                .table
                .deck_mut()
                .draw()
                .ok_or_else(|| EngineError::Invariant("deck exhausted".into()))?;
            cards.push(card);
        }
        self.table.board_mut().reveal(&cards);
        self.table.set_phase(Phase::from(street));
        for pos in 0..N {
            if self.table.seat(pos).is_occupied() {
                self.table.seat_mut(pos).reset_street();
            }
        }
        self.table.set_current_bet(0);
        self.table.set_min_raise(self.table.big_blind());
        self.table.set_last_aggressor(None);

        let mut out = Vec::new();
        self.emit(&mut out, Event::EnterStreet { street, cards, burn });
        if self.round_complete() {
            // run-out: nobody left to bet
            if street == Street::Rive {
                self.settle_showdown(&mut out);
            } else {
                self.emit_countdown(
                    &mut out,
                    CountdownKind::StreetDeal,
                    json!({ "street": street.next() }),
                );
            }
        } else {
            let first = self
                .table
                .next_actor_after(self.table.button())
                .expect("incomplete round has an actor");
            self.table.set_actor(Some(first));
            self.emit_action_countdown(&mut out, first);
        }
        Ok(out)
    }

    /// True between the end of a betting round and the next reveal.
    pub fn pending_deal(&self) -> bool {
        self.table.phase().is_betting()
            && self.table.phase() != Phase::River
            && self.table.actor().is_none()
            && self.table.n_in_pot() >= 2
    }

    // ------------------------------------------------------------------
    // settlement
    // ------------------------------------------------------------------
    fn settle_uncontested(&mut self, out: &mut Vec<Event>) {
        self.table.set_phase(Phase::Settling);
        let winner = self
            .table
            .in_pot()
            .next()
            .map(|s| (s.id(), s.pid().to_string()))
            .expect("one seat remains");
        let mut distributions = Vec::new();
        for (index, pot) in self.table.pots().to_vec().into_iter().enumerate() {
            distributions.push(Distribution {
                seat: winner.0,
                pid: winner.1.clone(),
                amount: pot.amount,
                pot: index,
                reason: PayoutReason::Uncontested,
            });
        }
        self.pay(&distributions);
        self.emit(&mut *out, Event::Payout { distributions });
        self.finish_hand(out);
    }

    fn settle_showdown(&mut self, out: &mut Vec<Event>) {
        self.table.set_phase(Phase::Showdown);
        let reveals = self
            .table
            .in_pot()
            .map(|s| Reveal {
                seat: s.id(),
                pid: s.pid().to_string(),
                hole: s.hole(),
            })
            .collect::<Vec<Reveal>>();
        self.emit(&mut *out, Event::Showdown { reveals });

        self.table.set_phase(Phase::Settling);
        let board = Hand::from(self.table.board());
        let mut distributions = Vec::new();
        for (index, pot) in self.table.pots().to_vec().into_iter().enumerate() {
            let mut contenders = pot
                .eligible
                .iter()
                .copied()
                .filter(|p| self.table.seat(*p).in_pot())
                .filter_map(|p| {
                    self.table.seat(p).hole().map(|hole| {
                        let cards = Hand::add(Hand::from(hole), board);
                        (p, Strength::from(cards))
                    })
                })
                .collect::<Vec<(Position, Strength)>>();
            // earliest clockwise from the button collects odd chips
            contenders.sort_by_key(|(p, _)| self.clockwise_from_button(*p));
            let best = match contenders.iter().map(|(_, s)| *s).max() {
                Some(best) => best,
                None => continue,
            };
            let winners = contenders
                .into_iter()
                .filter(|(_, s)| *s == best)
                .map(|(p, _)| p)
                .collect::<Vec<Position>>();
            let share = pot.amount / winners.len() as Chips;
            let odd = pot.amount % winners.len() as Chips;
            for (i, pos) in winners.into_iter().enumerate() {
                let bonus = if (i as Chips) < odd { 1 } else { 0 };
                distributions.push(Distribution {
                    seat: pos,
                    pid: self.table.seat(pos).pid().to_string(),
                    amount: share + bonus,
                    pot: index,
                    reason: PayoutReason::Showdown,
                });
            }
        }
        self.pay(&distributions);
        self.emit(&mut *out, Event::Payout { distributions });
        self.finish_hand(out);
    }

    fn pay(&mut self, distributions: &[Distribution]) {
        let mut paid = self.table.paid();
        for dist in distributions {
            self.table.seat_mut(dist.seat).award(dist.amount);
            paid += dist.amount;
        }
        self.table.set_paid(paid);
    }

    fn finish_hand(&mut self, out: &mut Vec<Event>) {
        let hand = self.table.hand_number();
        self.emit(&mut *out, Event::HandEnd { hand });
        for pos in 0..N {
            let seat = self.table.seat_mut(pos);
            if seat.is_empty() {
                continue;
            }
            if seat.pending_leave() {
                seat.vacate();
            } else {
                seat.settle_hand();
            }
        }
        self.table.set_pots(Vec::new());
        self.table.set_paid(0);
        self.table.set_actor(None);
        self.table.set_current_bet(0);
        self.table.set_min_raise(self.table.big_blind());
        self.table.set_last_aggressor(None);
        self.table.set_blind_seats(None, None);
        self.table.set_phase(Phase::Waiting);
        if self.can_deal() {
            self.emit_countdown(&mut *out, CountdownKind::NewHand, json!({}));
        }
    }

    // ------------------------------------------------------------------
    // helpers
    // ------------------------------------------------------------------
    fn emit(&mut self, out: &mut Vec<Event>, event: Event) {
        self.table.record(event.clone());
        out.push(event);
    }

    fn emit_countdown(
        &mut self,
        out: &mut Vec<Event>,
        countdown: CountdownKind,
        metadata: serde_json::Value,
    ) {
        let duration_ms = match countdown {
            CountdownKind::Action => self.timing.action_ms,
            CountdownKind::StreetDeal => self.timing.street_deal_ms,
            CountdownKind::NewHand => self.timing.new_hand_ms,
            CountdownKind::Reconnect => 0,
        };
        self.emit(out, Event::CountdownStart { countdown, duration_ms, metadata });
    }

    fn emit_action_countdown(&mut self, out: &mut Vec<Event>, seat: Position) {
        let to_call = self.to_call(seat);
        self.emit_countdown(
            out,
            CountdownKind::Action,
            json!({ "seat": seat, "toCall": to_call }),
        );
    }

    fn to_call(&self, seat: Position) -> Chips {
        self.table
            .current_bet()
            .saturating_sub(self.table.seat(seat).street_committed())
    }

    fn can_deal(&self) -> bool {
        self.table.phase() == Phase::Waiting
            && (0..N)
                .filter(|p| self.table.seat(*p).state() == SeatState::Active)
                .filter(|p| self.table.seat(*p).chips() >= self.table.big_blind())
                .count()
                >= MIN_PLAYERS
    }

    /// Distance clockwise from the seat after the button; used for odd
    /// chips and winner ordering.
    fn clockwise_from_button(&self, pos: Position) -> usize {
        (pos + N - self.table.button() - 1) % N
    }

    /// Convenience constructor: the hand number and button in a
    /// `StartHand` input are placeholders the engine recomputes.
    pub fn start_event(seed: u64) -> Event {
        Event::StartHand { hand: 0, seed, button: 0 }
    }
}
