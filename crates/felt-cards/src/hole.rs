use super::card::Card;
use super::hand::Hand;
use serde::Deserialize;
use serde::Serialize;

/// A player's two private hole cards, in deal order.
///
/// Never leaves the server except to the owning viewer; snapshot
/// sanitization strips it for everyone else.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hole([Card; 2]);

impl Hole {
    pub fn cards(&self) -> [Card; 2] {
        self.0
    }
}

impl From<(Card, Card)> for Hole {
    fn from((a, b): (Card, Card)) -> Self {
        debug_assert!(a != b);
        Self([a, b])
    }
}

impl From<Hole> for Hand {
    fn from(hole: Hole) -> Self {
        Hand::from(hole.0.to_vec())
    }
}

impl TryFrom<&str> for Hole {
    type Error = anyhow::Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let cards = s.split_whitespace().map(Card::from).collect::<Vec<Card>>();
        match cards[..] {
            [a, b] if a != b => Ok(Self([a, b])),
            _ => Err(anyhow::anyhow!("hole must contain exactly two cards")),
        }
    }
}

impl std::fmt::Display for Hole {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {}", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let hole = Hole::try_from("Ah Kd").unwrap();
        assert_eq!(hole.to_string(), "Ah Kd");
    }

    #[test]
    fn rejects_duplicates() {
        assert!(Hole::try_from("Ah Ah").is_err());
        assert!(Hole::try_from("Ah").is_err());
    }
}
