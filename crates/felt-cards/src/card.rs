use super::rank::Rank;
use super::suit::Suit;
use serde::Deserialize;
use serde::Serialize;

/// Card represents a playing card.
/// It is a tuple of Rank and Suit packed into a single byte.
///
/// The byte is the wire card code: `rank * 4 + suit`, so `0 = 2c`
/// and `51 = As`. Snapshots and deal events carry these codes verbatim.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Card(u8);

impl Card {
    pub fn rank(&self) -> Rank {
        Rank::from(self.0 / 4)
    }
    pub fn suit(&self) -> Suit {
        Suit::from(self.0 % 4)
    }
}

/// (Rank, Suit) isomorphism
impl From<(Rank, Suit)> for Card {
    fn from((r, s): (Rank, Suit)) -> Self {
        Self(u8::from(r) * 4 + u8::from(s))
    }
}

/// u8 isomorphism
/// each card is mapped to its location in a sorted deck 0-51
impl From<Card> for u8 {
    fn from(c: Card) -> u8 {
        c.0
    }
}
impl From<u8> for Card {
    fn from(n: u8) -> Self {
        debug_assert!(n < 52);
        Self(n)
    }
}

/// u64 isomorphism
/// each card is just one bit turned on
impl From<u64> for Card {
    fn from(n: u64) -> Self {
        Self(63 - n.leading_zeros() as u8)
    }
}
impl From<Card> for u64 {
    fn from(c: Card) -> u64 {
        1 << u8::from(c)
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", self.rank(), self.suit())
    }
}

/// str isomorphism
impl From<&str> for Card {
    fn from(s: &str) -> Self {
        assert!(s.len() == 2);
        let rank = Rank::from(&s[0..1]);
        let suit = Suit::from(&s[1..2]);
        Card::from((rank, suit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bijective_rank_suit() {
        for n in 0..52u8 {
            let card = Card::from(n);
            assert_eq!(card, Card::from((card.rank(), card.suit())));
        }
    }

    #[test]
    fn bijective_u64() {
        for n in 0..52u8 {
            let card = Card::from(n);
            assert_eq!(card, Card::from(u64::from(card)));
        }
    }

    #[test]
    fn wire_codes() {
        assert_eq!(Card::from("2c"), Card::from(0u8));
        assert_eq!(Card::from("As"), Card::from(51u8));
        assert_eq!(Card::from("Ts"), Card::from(35u8));
    }
}
