/// Card suit: clubs, diamonds, hearts, spades.
///
/// Suits never outrank one another; the ordering (C < D < H < S) is
/// arbitrary but consistent, fixed by the wire card-code contract.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Suit {
    #[default]
    C = 0,
    D = 1,
    H = 2,
    S = 3,
}

impl Suit {
    /// All four suits in canonical order.
    pub const fn all() -> [Suit; 4] {
        [Suit::C, Suit::D, Suit::H, Suit::S]
    }
}

/// u8 isomorphism
impl From<u8> for Suit {
    fn from(n: u8) -> Suit {
        match n {
            0 => Suit::C,
            1 => Suit::D,
            2 => Suit::H,
            3 => Suit::S,
            _ => unreachable!("invalid suit"),
        }
    }
}
impl From<Suit> for u8 {
    fn from(s: Suit) -> u8 {
        s as u8
    }
}

impl std::fmt::Display for Suit {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Suit::C => 'c',
                Suit::D => 'd',
                Suit::H => 'h',
                Suit::S => 's',
            }
        )
    }
}

impl From<&str> for Suit {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "c" => Suit::C,
            "d" => Suit::D,
            "h" => Suit::H,
            "s" => Suit::S,
            _ => unreachable!("invalid suit string"),
        }
    }
}
