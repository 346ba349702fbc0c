use super::card::Card;
use super::hand::Hand;
use super::street::Street;
use serde::Deserialize;
use serde::Serialize;

/// The community cards visible to all players, in deal order.
///
/// A board contains 0, 3, 4, or 5 cards corresponding to preflop, flop,
/// turn, and river. Deal order is preserved because the wire format
/// announces flop/turn/river reveals as ordered card codes.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board(Vec<Card>);

impl Board {
    /// Creates an empty board (preflop state).
    pub fn empty() -> Self {
        Self(Vec::new())
    }
    /// Adds revealed cards. Panics if the result exceeds five cards.
    pub fn reveal(&mut self, cards: &[Card]) {
        self.0.extend_from_slice(cards);
        assert!(self.0.len() <= 5);
    }
    /// Resets the board for a new hand.
    pub fn clear(&mut self) {
        self.0.clear();
    }
    /// Infers the current street from board size.
    pub fn street(&self) -> Street {
        match self.0.len() {
            0 => Street::Pref,
            3 => Street::Flop,
            4 => Street::Turn,
            5 => Street::Rive,
            n => unreachable!("board of {} cards", n),
        }
    }
    pub fn cards(&self) -> &[Card] {
        &self.0
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&Board> for Hand {
    fn from(board: &Board) -> Self {
        Hand::from(board.0.clone())
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<String>>()
                .join(" ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn street_tracking() {
        let mut board = Board::empty();
        assert_eq!(board.street(), Street::Pref);
        board.reveal(&[Card::from("2c"), Card::from("7d"), Card::from("Js")]);
        assert_eq!(board.street(), Street::Flop);
        board.reveal(&[Card::from("Th")]);
        assert_eq!(board.street(), Street::Turn);
        board.reveal(&[Card::from("As")]);
        assert_eq!(board.street(), Street::Rive);
    }

    #[test]
    fn preserves_deal_order(){
        let mut board = Board::empty();
        board.reveal(&[Card::from("Js"), Card::from("2c"), Card::from("7d")]);
        assert_eq!(board.cards()[0], Card::from("Js"));
        assert_eq!(board.cards()[2], Card::from("7d"));
    }
}
