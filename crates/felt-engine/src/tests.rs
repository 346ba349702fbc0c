use super::*;
use felt_cards::Hand;
use felt_cards::Strength;
use felt_core::Chips;
use felt_core::Position;

fn engine() -> Engine {
    Engine::new("holdem-test", 5, 10, Timing::default())
}

fn join(e: &mut Engine, seat: Position, chips: Chips) {
    e.dispatch(Event::PlayerJoin {
        seat,
        pid: format!("p{}", seat),
        nickname: format!("P{}", seat),
        chips,
    })
    .unwrap();
}

fn start(e: &mut Engine, seed: u64) -> Vec<Event> {
    e.dispatch(Engine::start_event(seed)).unwrap()
}

fn act(e: &mut Engine, seat: Position, action: Action) -> Vec<Event> {
    e.dispatch(Event::Action { seat, action }).unwrap()
}

/// Runs queued street deals until betting reopens or the hand ends.
fn run_out(e: &mut Engine) -> Vec<Event> {
    let mut out = Vec::new();
    while e.pending_deal() {
        out.extend(e.expire(CountdownKind::StreetDeal).unwrap());
    }
    out
}

fn chips(e: &Engine, seat: Position) -> Chips {
    e.table().seat(seat).chips()
}

fn total_chips(e: &Engine) -> Chips {
    e.table().total_chips()
}

fn payouts(events: &[Event]) -> Vec<Distribution> {
    events
        .iter()
        .find_map(|ev| match ev {
            Event::Payout { distributions } => Some(distributions.clone()),
            _ => None,
        })
        .expect("payout emitted")
}

fn heads_up(stack: Chips) -> Engine {
    let mut e = engine();
    join(&mut e, 0, stack);
    join(&mut e, 1, stack);
    start(&mut e, 42);
    e
}

// ----------------------------------------------------------------------
// setup and turn order
// ----------------------------------------------------------------------

#[test]
fn first_hand_rotates_button_to_seat_zero() {
    let e = heads_up(100);
    assert_eq!(e.table().button(), 0);
    assert_eq!(e.table().sb_seat(), Some(0));
    assert_eq!(e.table().bb_seat(), Some(1));
}

#[test]
fn heads_up_button_acts_first_preflop() {
    let e = heads_up(100);
    assert_eq!(e.table().phase(), Phase::Preflop);
    assert_eq!(e.table().actor(), Some(0));
    assert_eq!(e.table().current_bet(), 10);
}

#[test]
fn heads_up_non_button_acts_first_postflop() {
    let mut e = heads_up(100);
    act(&mut e, 0, Action::Call);
    act(&mut e, 1, Action::Check);
    run_out(&mut e);
    assert_eq!(e.table().phase(), Phase::Flop);
    assert_eq!(e.table().actor(), Some(1));
}

#[test]
fn multiway_first_to_act_is_left_of_big_blind() {
    let mut e = engine();
    join(&mut e, 0, 500);
    join(&mut e, 1, 500);
    join(&mut e, 2, 500);
    join(&mut e, 3, 500);
    start(&mut e, 7);
    // button 0, sb 1, bb 2, utg 3
    assert_eq!(e.table().button(), 0);
    assert_eq!(e.table().sb_seat(), Some(1));
    assert_eq!(e.table().bb_seat(), Some(2));
    assert_eq!(e.table().actor(), Some(3));
}

#[test]
fn start_requires_two_funded_players() {
    let mut e = engine();
    join(&mut e, 0, 100);
    let err = e.dispatch(Engine::start_event(1)).unwrap_err();
    assert_eq!(err, EngineError::NotEnoughPlayers);
    assert_eq!(e.table().phase(), Phase::Waiting);
}

#[test]
fn blinds_are_forced_not_voluntary() {
    let e = heads_up(100);
    assert!(!e.table().seat(0).acted());
    assert!(!e.table().seat(1).acted());
}

// ----------------------------------------------------------------------
// scenario: walk
// ----------------------------------------------------------------------

#[test]
fn walk_folds_blinds_to_big_blind() {
    let mut e = heads_up(100);
    let events = act(&mut e, 0, Action::Fold);
    let dists = payouts(&events);
    assert_eq!(dists.len(), 1);
    assert_eq!(dists[0].seat, 1);
    assert_eq!(dists[0].amount, 15);
    assert_eq!(dists[0].reason, PayoutReason::Uncontested);
    assert!(events.iter().any(|ev| matches!(ev, Event::HandEnd { .. })));
    assert_eq!(chips(&e, 0), 95);
    assert_eq!(chips(&e, 1), 105);
    assert_eq!(total_chips(&e), 200);
    assert_eq!(e.table().phase(), Phase::Waiting);
}

// ----------------------------------------------------------------------
// scenario: limp and check down to showdown
// ----------------------------------------------------------------------

#[test]
fn limp_check_down_awards_pot_to_better_hand() {
    let mut e = heads_up(100);
    act(&mut e, 0, Action::Call);
    act(&mut e, 1, Action::Check);
    run_out(&mut e);
    act(&mut e, 1, Action::Check);
    act(&mut e, 0, Action::Check);
    run_out(&mut e);
    act(&mut e, 1, Action::Check);
    act(&mut e, 0, Action::Check);
    run_out(&mut e);
    act(&mut e, 1, Action::Check);
    // capture holes before settlement clears the hand
    let board = Hand::from(e.table().board());
    let hole0 = e.table().seat(0).hole().unwrap();
    let hole1 = e.table().seat(1).hole().unwrap();
    let events = act(&mut e, 0, Action::Check);
    assert!(events.iter().any(|ev| matches!(ev, Event::Showdown { .. })));
    let dists = payouts(&events);
    let strength0 = Strength::from(Hand::add(Hand::from(hole0), board));
    let strength1 = Strength::from(Hand::add(Hand::from(hole1), board));
    let won0 = dists.iter().filter(|d| d.seat == 0).map(|d| d.amount).sum::<Chips>();
    let won1 = dists.iter().filter(|d| d.seat == 1).map(|d| d.amount).sum::<Chips>();
    assert_eq!(won0 + won1, 20);
    match strength0.cmp(&strength1) {
        std::cmp::Ordering::Greater => assert_eq!(won0, 20),
        std::cmp::Ordering::Less => assert_eq!(won1, 20),
        std::cmp::Ordering::Equal => assert_eq!(won0, won1),
    }
    assert_eq!(total_chips(&e), 200);
}

// ----------------------------------------------------------------------
// scenario: 3-bet all-in preflop
// ----------------------------------------------------------------------

#[test]
fn three_bet_all_in_runs_out_one_pot() {
    let mut e = heads_up(100);
    act(&mut e, 0, Action::Raise { amount: 30 });
    act(&mut e, 1, Action::AllIn);
    assert_eq!(e.table().current_bet(), 100);
    let events = act(&mut e, 0, Action::Call);
    // both all-in: the board runs out without further decisions
    assert!(events.iter().any(|ev| matches!(
        ev,
        Event::CountdownStart { countdown: CountdownKind::StreetDeal, .. }
    )));
    let settled = run_out(&mut e);
    assert_eq!(e.table().board().len(), 5);
    let dists = payouts(&settled);
    assert!(dists.iter().all(|d| d.pot == 0));
    assert_eq!(dists.iter().map(|d| d.amount).sum::<Chips>(), 200);
    assert_eq!(total_chips(&e), 200);
}

// ----------------------------------------------------------------------
// scenario: short all-in builds a side pot
// ----------------------------------------------------------------------

#[test]
fn short_stack_all_in_splits_main_and_side_pots() {
    let mut e = engine();
    join(&mut e, 0, 100);
    join(&mut e, 1, 100);
    join(&mut e, 2, 30);
    start(&mut e, 99);
    // button 0, sb 1, bb 2; utg is the button in a 3-handed game
    assert_eq!(e.table().actor(), Some(0));
    act(&mut e, 0, Action::AllIn);
    act(&mut e, 1, Action::AllIn);
    let _ = act(&mut e, 2, Action::AllIn);
    // pots are layered before the run-out
    assert_eq!(e.table().pots().len(), 2);
    assert_eq!(e.table().pots()[0].amount, 90);
    assert_eq!(e.table().pots()[0].eligible, vec![0, 1, 2]);
    assert_eq!(e.table().pots()[1].amount, 140);
    assert_eq!(e.table().pots()[1].eligible, vec![0, 1]);
    let settled = run_out(&mut e);
    let dists = payouts(&settled);
    let main = dists.iter().filter(|d| d.pot == 0).map(|d| d.amount).sum::<Chips>();
    let side = dists.iter().filter(|d| d.pot == 1).map(|d| d.amount).sum::<Chips>();
    assert_eq!(main, 90);
    assert_eq!(side, 140);
    // the short stack can never win the side pot
    assert!(dists.iter().filter(|d| d.pot == 1).all(|d| d.seat != 2));
    assert_eq!(total_chips(&e), 230);
}

// ----------------------------------------------------------------------
// scenario: action timeout
// ----------------------------------------------------------------------

#[test]
fn timeout_facing_a_bet_folds() {
    let mut e = heads_up(100);
    act(&mut e, 0, Action::Call);
    act(&mut e, 1, Action::Check);
    run_out(&mut e);
    act(&mut e, 1, Action::Bet { amount: 20 });
    assert_eq!(e.table().actor(), Some(0));
    let events = e.expire(CountdownKind::Action).unwrap();
    assert!(events.iter().any(|ev| matches!(
        ev,
        Event::ActionTimeout { seat: 0, resolved: Action::Fold }
    )));
    let dists = payouts(&events);
    assert_eq!(dists[0].seat, 1);
    assert_eq!(dists[0].amount, 40);
    assert_eq!(chips(&e, 0), 90);
    assert_eq!(chips(&e, 1), 110);
}

#[test]
fn timeout_resolves_to_check_when_legal() {
    let mut e = heads_up(100);
    act(&mut e, 0, Action::Call);
    act(&mut e, 1, Action::Check);
    run_out(&mut e);
    assert_eq!(e.table().actor(), Some(1));
    let events = e.expire(CountdownKind::Action).unwrap();
    assert!(events.iter().any(|ev| matches!(
        ev,
        Event::ActionTimeout { seat: 1, resolved: Action::Check }
    )));
    assert_eq!(e.table().phase(), Phase::Flop);
    assert_eq!(e.table().actor(), Some(0));
}

#[test]
fn stale_action_expiry_is_ignored() {
    let mut e = heads_up(100);
    act(&mut e, 0, Action::Fold);
    let err = e.expire(CountdownKind::Action).unwrap_err();
    assert!(err.is_stale());
}

// ----------------------------------------------------------------------
// betting discipline
// ----------------------------------------------------------------------

#[test]
fn big_blind_keeps_the_option_after_limps() {
    let mut e = heads_up(100);
    act(&mut e, 0, Action::Call);
    // pot is matched but the big blind has not acted voluntarily
    assert_eq!(e.table().phase(), Phase::Preflop);
    assert_eq!(e.table().actor(), Some(1));
}

#[test]
fn big_blind_can_raise_the_option() {
    let mut e = heads_up(100);
    act(&mut e, 0, Action::Call);
    act(&mut e, 1, Action::Raise { amount: 30 });
    assert_eq!(e.table().current_bet(), 30);
    assert_eq!(e.table().actor(), Some(0));
}

#[test]
fn acting_out_of_turn_is_rejected() {
    let mut e = heads_up(100);
    let err = e
        .dispatch(Event::Action { seat: 1, action: Action::Fold })
        .unwrap_err();
    assert_eq!(err, EngineError::NotYourTurn(1));
    // state untouched
    assert_eq!(e.table().actor(), Some(0));
    assert_eq!(e.table().seat(1).state(), SeatState::Active);
}

#[test]
fn check_facing_a_bet_is_rejected() {
    let mut e = heads_up(100);
    let err = e
        .dispatch(Event::Action { seat: 0, action: Action::Check })
        .unwrap_err();
    assert!(matches!(err, EngineError::IllegalAction(_)));
}

#[test]
fn undersized_raise_is_rejected() {
    let mut e = heads_up(100);
    // min raise increment preflop is the big blind: raise to at least 20
    let err = e
        .dispatch(Event::Action { seat: 0, action: Action::Raise { amount: 15 } })
        .unwrap_err();
    assert!(matches!(err, EngineError::IllegalAmount(15)));
}

#[test]
fn undersized_bet_is_rejected_unless_all_in() {
    let mut e = heads_up(100);
    act(&mut e, 0, Action::Call);
    act(&mut e, 1, Action::Check);
    run_out(&mut e);
    let err = e
        .dispatch(Event::Action { seat: 1, action: Action::Bet { amount: 5 } })
        .unwrap_err();
    assert!(matches!(err, EngineError::IllegalAmount(5)));
}

#[test]
fn client_bet_into_open_bet_normalizes_to_raise() {
    let mut e = heads_up(100);
    let events = act(&mut e, 0, Action::Bet { amount: 30 });
    assert!(events.iter().any(|ev| matches!(
        ev,
        Event::Action { seat: 0, action: Action::Raise { amount: 30 } }
    )));
    assert_eq!(e.table().current_bet(), 30);
}

#[test]
fn full_raise_updates_min_raise_increment() {
    let mut e = heads_up(100);
    act(&mut e, 0, Action::Raise { amount: 35 });
    assert_eq!(e.table().min_raise(), 25);
    assert_eq!(e.table().last_aggressor(), Some(0));
}

#[test]
fn short_all_in_raise_does_not_reopen_action() {
    let mut e = engine();
    join(&mut e, 0, 100);
    join(&mut e, 1, 45);
    start(&mut e, 11);
    // button/sb seat 0 raises to 30; bb shoves 45, an increment of 15 < 20
    act(&mut e, 0, Action::Raise { amount: 30 });
    act(&mut e, 1, Action::AllIn);
    assert_eq!(e.table().current_bet(), 45);
    // min raise and aggressor unchanged by the short shove
    assert_eq!(e.table().min_raise(), 20);
    assert_eq!(e.table().last_aggressor(), Some(0));
    // the original raiser may call or fold but not raise again
    let err = e
        .dispatch(Event::Action { seat: 0, action: Action::Raise { amount: 70 } })
        .unwrap_err();
    assert!(matches!(err, EngineError::IllegalAction(_)));
    let events = act(&mut e, 0, Action::Call);
    assert!(events.iter().any(|ev| matches!(
        ev,
        Event::CountdownStart { countdown: CountdownKind::StreetDeal, .. }
    )));
}

#[test]
fn short_blind_posts_all_in_and_contests_main_pot_only() {
    let mut e = engine();
    join(&mut e, 0, 200);
    join(&mut e, 1, 200);
    join(&mut e, 2, 10);
    start(&mut e, 3);
    // bb seat 2 posts its whole stack
    assert_eq!(e.table().seat(2).state(), SeatState::AllIn);
    assert_eq!(e.table().seat(2).street_committed(), 10);
    act(&mut e, 0, Action::Raise { amount: 50 });
    act(&mut e, 1, Action::Call);
    // the two deep stacks check the hand down
    let mut events = Vec::new();
    for _ in 0..3 {
        events.extend(run_out(&mut e));
        if e.table().actor().is_some() {
            act(&mut e, 1, Action::Check);
            events.extend(act(&mut e, 0, Action::Check));
        }
    }
    let dists = payouts(&events);
    let main = dists.iter().filter(|d| d.pot == 0).map(|d| d.amount).sum::<Chips>();
    let side = dists.iter().filter(|d| d.pot == 1).map(|d| d.amount).sum::<Chips>();
    assert_eq!(main, 30);
    assert_eq!(side, 80);
    assert!(dists.iter().filter(|d| d.pot == 1).all(|d| d.seat != 2));
    assert_eq!(total_chips(&e), 410);
}

// ----------------------------------------------------------------------
// seating flows
// ----------------------------------------------------------------------

#[test]
fn join_mid_hand_waits_for_next_hand() {
    let mut e = heads_up(100);
    let events = e
        .dispatch(Event::PlayerJoin {
            seat: 4,
            pid: "p4".into(),
            nickname: "P4".into(),
            chips: 300,
        })
        .unwrap();
    assert_eq!(e.table().seat(4).state(), SeatState::WaitingNextHand);
    assert_eq!(e.table().seat(4).joined_hand(), 1);
    assert!(events.iter().any(|ev| matches!(ev, Event::PlayerWaiting { seat: 4, .. })));
    // dealt in once the current hand settles and the next one starts
    act(&mut e, 0, Action::Fold);
    start(&mut e, 43);
    assert_eq!(e.table().seat(4).state(), SeatState::Active);
    assert!(e.table().seat(4).hole().is_some());
}

#[test]
fn duplicate_pid_cannot_sit_twice() {
    let mut e = engine();
    join(&mut e, 0, 100);
    let err = e
        .dispatch(Event::PlayerJoin {
            seat: 1,
            pid: "p0".into(),
            nickname: "again".into(),
            chips: 100,
        })
        .unwrap_err();
    assert_eq!(err, EngineError::AlreadySeated("p0".into()));
}

#[test]
fn occupied_seat_cannot_be_taken() {
    let mut e = engine();
    join(&mut e, 0, 100);
    let err = e
        .dispatch(Event::PlayerJoin {
            seat: 0,
            pid: "px".into(),
            nickname: "X".into(),
            chips: 100,
        })
        .unwrap_err();
    assert_eq!(err, EngineError::SeatOccupied(0));
}

#[test]
fn leave_on_your_turn_folds_first() {
    let mut e = heads_up(100);
    let events = e
        .dispatch(Event::PlayerLeave { seat: 0, pid: "p0".into() })
        .unwrap();
    // implicit fold ends the hand uncontested; the seat vacates at settlement
    let dists = payouts(&events);
    assert_eq!(dists[0].seat, 1);
    assert_eq!(dists[0].amount, 15);
    assert!(e.table().seat(0).is_empty());
    assert_eq!(chips(&e, 1), 105);
}

#[test]
fn leave_mid_hand_keeps_committed_chips_in_pot() {
    let mut e = engine();
    join(&mut e, 0, 100);
    join(&mut e, 1, 100);
    join(&mut e, 2, 100);
    start(&mut e, 5);
    act(&mut e, 0, Action::Call);
    // the sb leaves on its turn: implicit fold, 5 chips stay in the pot
    e.dispatch(Event::PlayerLeave { seat: 1, pid: "p1".into() }).unwrap();
    assert_eq!(e.table().seat(1).state(), SeatState::Folded);
    assert!(e.table().seat(1).pending_leave());
    let events = act(&mut e, 2, Action::Check);
    // hand continues heads-up to the flop
    assert!(events.iter().any(|ev| matches!(ev, Event::CountdownStart { .. })));
    let pot_total = e.table().pots().iter().map(|p| p.amount).sum::<Chips>();
    assert_eq!(pot_total, 25);
}

#[test]
fn sit_out_and_back_in() {
    let mut e = engine();
    join(&mut e, 0, 100);
    join(&mut e, 1, 100);
    e.dispatch(Event::PlayerSitOut { seat: 1 }).unwrap();
    assert_eq!(e.table().seat(1).state(), SeatState::SittingOut);
    // one active player is not enough to deal
    let err = e.dispatch(Engine::start_event(1)).unwrap_err();
    assert_eq!(err, EngineError::NotEnoughPlayers);
    e.dispatch(Event::PlayerSitIn { seat: 1 }).unwrap();
    assert_eq!(e.table().seat(1).state(), SeatState::Active);
    start(&mut e, 1);
    assert_eq!(e.table().phase(), Phase::Preflop);
}

// ----------------------------------------------------------------------
// event log, replay, serialization
// ----------------------------------------------------------------------

#[test]
fn event_log_is_gap_free() {
    let mut e = heads_up(100);
    act(&mut e, 0, Action::Call);
    act(&mut e, 1, Action::Check);
    run_out(&mut e);
    for (i, logged) in e.table().log().iter().enumerate() {
        assert_eq!(logged.seq, i as u64);
    }
}

#[test]
fn replaying_the_log_reproduces_the_table() {
    let mut e = heads_up(100);
    act(&mut e, 0, Action::Raise { amount: 30 });
    act(&mut e, 1, Action::AllIn);
    act(&mut e, 0, Action::Call);
    run_out(&mut e);
    let replayed =
        Engine::replay("holdem-test", 5, 10, Timing::default(), e.table().log()).unwrap();
    assert_eq!(replayed.table(), e.table());
}

#[test]
fn table_serde_round_trip() {
    let mut e = heads_up(100);
    act(&mut e, 0, Action::Call);
    let json = serde_json::to_string(e.table()).unwrap();
    let back: Table = serde_json::from_str(&json).unwrap();
    assert_eq!(&back, e.table());
}

#[test]
fn derived_events_cannot_be_injected() {
    let mut e = heads_up(100);
    let err = e.dispatch(Event::HandEnd { hand: 1 }).unwrap_err();
    assert_eq!(err, EngineError::NotAnInput("handEnd"));
}

#[test]
fn chip_conservation_across_many_hands() {
    let mut e = heads_up(100);
    for seed in 0..10u64 {
        // alternate walks and showdowns
        let actor = e.table().actor().unwrap();
        if seed % 2 == 0 {
            act(&mut e, actor, Action::Fold);
        } else {
            act(&mut e, actor, Action::AllIn);
            let next = e.table().actor().unwrap();
            act(&mut e, next, Action::Call);
            run_out(&mut e);
        }
        assert_eq!(total_chips(&e), 200);
        if e.table().phase() == Phase::Waiting {
            match e.dispatch(Engine::start_event(seed)) {
                Ok(_) => {}
                Err(EngineError::NotEnoughPlayers) => break,
                Err(other) => panic!("unexpected: {}", other),
            }
        }
    }
}

#[test]
fn deck_never_collides_with_dealt_cards() {
    let mut e = engine();
    for seat in 0..6 {
        join(&mut e, seat, 400);
    }
    start(&mut e, 1234);
    let mut seen = Hand::empty();
    for seat in e.table().seats().iter().filter(|s| s.is_occupied()) {
        let hole = Hand::from(seat.hole().unwrap());
        assert_eq!(u64::from(seen) & u64::from(hole), 0);
        seen = Hand::add(seen, hole);
    }
    for card in e.table().deck().cards() {
        assert!(!seen.contains(card));
    }
}
