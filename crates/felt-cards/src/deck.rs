use super::card::Card;
use super::hole::Hole;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde::Serialize;

/// A shuffled deck dealt sequentially from the top.
///
/// The shuffle is a Fisher-Yates driven by a `SmallRng` seeded from a
/// `u64`, so the same seed always produces the same deal order. Hands
/// record their seed in the event log, which makes replays exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deck(Vec<Card>);

impl Deck {
    /// A full 52-card deck shuffled by the given seed.
    pub fn shuffled(seed: u64) -> Self {
        let mut cards = (0..52u8).map(Card::from).collect::<Vec<Card>>();
        let mut rng = SmallRng::seed_from_u64(seed);
        cards.shuffle(&mut rng);
        Self(cards)
    }

    /// Deals the top card, if any remain.
    pub fn draw(&mut self) -> Option<Card> {
        self.0.pop()
    }

    /// Deals two cards as a Hole.
    pub fn hole(&mut self) -> Option<Hole> {
        let a = self.draw()?;
        let b = self.draw()?;
        Some(Hole::from((a, b)))
    }

    pub fn remaining(&self) -> usize {
        self.0.len()
    }
    pub fn cards(&self) -> &[Card] {
        &self.0
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self(Vec::new())
    }
}
