use felt_core::Chips;
use felt_core::HandNumber;
use felt_core::Position;
use felt_engine::Phase;
use felt_engine::SeatState;
use felt_engine::Table;
use serde::Serialize;

/// Broadcastable view of a table.
///
/// Built from the authoritative [`Table`] but deliberately narrower: no
/// deck, no shuffle seed, no event log. [`TableView::sanitized_for`] is
/// the single choke point that strips other players' hole cards; every
/// snapshot broadcast passes through it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub id: String,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub phase: Phase,
    pub hand_number: HandNumber,
    pub button: Position,
    pub actor: Option<Position>,
    pub current_bet: Chips,
    pub min_raise: Chips,
    pub community_cards: Vec<u8>,
    pub burns: Vec<u8>,
    pub pots: Vec<PotView>,
    pub seats: Vec<SeatView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PotView {
    pub amount: Chips,
    pub eligible: Vec<Position>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatView {
    pub id: Position,
    pub pid: String,
    pub nickname: String,
    pub chips: Chips,
    pub state: SeatState,
    pub street_committed: Chips,
    pub hand_committed: Chips,
    /// Present only for the viewer's own seat after sanitization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole_cards: Option<Vec<u8>>,
}

impl From<&Table> for TableView {
    fn from(table: &Table) -> Self {
        Self {
            id: table.id().to_string(),
            small_blind: table.small_blind(),
            big_blind: table.big_blind(),
            phase: table.phase(),
            hand_number: table.hand_number(),
            button: table.button(),
            actor: table.actor(),
            current_bet: table.current_bet(),
            min_raise: table.min_raise(),
            community_cards: table.board().cards().iter().map(|c| u8::from(*c)).collect(),
            burns: table.burns().iter().map(|c| u8::from(*c)).collect(),
            pots: table
                .pots()
                .iter()
                .map(|p| PotView {
                    amount: p.amount,
                    eligible: p.eligible.clone(),
                })
                .collect(),
            seats: table
                .seats()
                .iter()
                .map(|s| SeatView {
                    id: s.id(),
                    pid: s.pid().to_string(),
                    nickname: s.nickname().to_string(),
                    chips: s.chips(),
                    state: s.state(),
                    street_committed: s.street_committed(),
                    hand_committed: s.hand_committed(),
                    hole_cards: s
                        .hole()
                        .map(|h| h.cards().iter().map(|c| u8::from(*c)).collect()),
                })
                .collect(),
        }
    }
}

impl TableView {
    /// Strips every hole card that doesn't belong to the viewer.
    pub fn sanitized_for(mut self, viewer: &str) -> Self {
        for seat in self.seats.iter_mut() {
            if seat.pid != viewer {
                seat.hole_cards = None;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use felt_engine::Engine;
    use felt_engine::Event;
    use felt_engine::Timing;

    fn dealt_table() -> Table {
        let mut engine = Engine::new("t", 5, 10, Timing::default());
        for seat in 0..2 {
            engine
                .dispatch(Event::PlayerJoin {
                    seat,
                    pid: format!("p{}", seat),
                    nickname: format!("P{}", seat),
                    chips: 1000,
                })
                .unwrap();
        }
        engine.dispatch(Engine::start_event(9)).unwrap();
        engine.table().clone()
    }

    #[test]
    fn view_never_carries_deck_or_log() {
        let table = dealt_table();
        let json = serde_json::to_value(TableView::from(&table)).unwrap();
        assert!(json.get("deck").is_none());
        assert!(json.get("deckRemaining").is_none());
        assert!(json.get("log").is_none());
        assert!(json.get("eventLog").is_none());
    }

    #[test]
    fn sanitization_keeps_only_the_viewers_holes() {
        let table = dealt_table();
        let view = TableView::from(&table).sanitized_for("p0");
        for seat in view.seats.iter() {
            match seat.pid.as_str() {
                "p0" => assert!(seat.hole_cards.is_some()),
                _ => assert!(seat.hole_cards.is_none()),
            }
        }
    }

    #[test]
    fn sanitization_for_spectators_strips_everything() {
        let table = dealt_table();
        let view = TableView::from(&table).sanitized_for("lurker");
        assert!(view.seats.iter().all(|s| s.hole_cards.is_none()));
    }

    #[test]
    fn stripped_holes_are_absent_from_json() {
        let table = dealt_table();
        let view = TableView::from(&table).sanitized_for("p1");
        let json = serde_json::to_value(&view).unwrap();
        for seat in json["seats"].as_array().unwrap() {
            if seat["pid"] == "p1" {
                assert!(seat.get("holeCards").is_some());
            } else {
                assert!(seat.get("holeCards").is_none());
            }
        }
    }

    #[test]
    fn card_fields_are_numeric_codes() {
        let mut engine = Engine::new("t", 5, 10, Timing::default());
        for seat in 0..2 {
            engine
                .dispatch(Event::PlayerJoin {
                    seat,
                    pid: format!("p{}", seat),
                    nickname: format!("P{}", seat),
                    chips: 1000,
                })
                .unwrap();
        }
        engine.dispatch(Engine::start_event(4)).unwrap();
        engine
            .dispatch(Event::Action { seat: 0, action: felt_engine::Action::Call })
            .unwrap();
        engine
            .dispatch(Event::Action { seat: 1, action: felt_engine::Action::Check })
            .unwrap();
        engine.expire(felt_engine::CountdownKind::StreetDeal).unwrap();
        let view = TableView::from(engine.table());
        assert_eq!(view.community_cards.len(), 3);
        assert!(view.community_cards.iter().all(|c| *c < 52));
        assert_eq!(view.burns.len(), 1);
    }
}
