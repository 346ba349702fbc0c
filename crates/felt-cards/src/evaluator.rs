use super::hand::Hand;
use super::kicks::Kickers;
use super::rank::Rank;
use super::ranking::Ranking;
use super::suit::Suit;

/// Finds the best 5-card ranking within a Hand of up to 7 cards.
///
/// Works on rank counts and 13-bit rank masks rather than enumerating
/// 5-card subsets. Checks categories from strongest to weakest, so the
/// first match is the hand's value.
pub struct Evaluator(Hand);

impl From<Hand> for Evaluator {
    fn from(hand: Hand) -> Self {
        debug_assert!(hand.size() >= 5);
        Self(hand)
    }
}

impl Evaluator {
    pub fn find_ranking(&self) -> Ranking {
        None.or_else(|| self.find_straight_flush())
            .or_else(|| self.find_four_oak())
            .or_else(|| self.find_full_house())
            .or_else(|| self.find_flush())
            .or_else(|| self.find_straight())
            .or_else(|| self.find_three_oak())
            .or_else(|| self.find_two_pair())
            .or_else(|| self.find_one_pair())
            .unwrap_or_else(|| self.find_high_card())
    }

    pub fn find_kickers(&self, ranking: Ranking) -> Kickers {
        let mask = self.rank_mask();
        match ranking {
            Ranking::Straight(_) | Ranking::StraightFlush(_) | Ranking::FullHouse(..) => {
                Kickers::none()
            }
            Ranking::Flush(hi) => {
                let suited = self
                    .flush_suit()
                    .map(|s| self.0.suited(&s))
                    .unwrap_or_default();
                Self::top_n(suited & !u16::from(hi), 4)
            }
            Ranking::FourOAK(r) => Self::top_n(mask & !u16::from(r), 1),
            Ranking::ThreeOAK(r) => Self::top_n(mask & !u16::from(r), 2),
            Ranking::TwoPair(a, b) => Self::top_n(mask & !u16::from(a) & !u16::from(b), 1),
            Ranking::OnePair(r) => Self::top_n(mask & !u16::from(r), 3),
            Ranking::HighCard(r) => Self::top_n(mask & !u16::from(r), 4),
        }
    }

    //
    fn find_straight_flush(&self) -> Option<Ranking> {
        self.flush_suit()
            .and_then(|s| Self::straight_high(self.0.suited(&s)))
            .map(Ranking::StraightFlush)
    }
    fn find_four_oak(&self) -> Option<Ranking> {
        self.rank_with_count(4, None).map(Ranking::FourOAK)
    }
    fn find_full_house(&self) -> Option<Ranking> {
        let trips = self.rank_with_count(3, None)?;
        let pair = self.rank_with_count(2, Some(trips))?;
        Some(Ranking::FullHouse(trips, pair))
    }
    fn find_flush(&self) -> Option<Ranking> {
        self.flush_suit()
            .map(|s| Rank::from(self.0.suited(&s)))
            .map(Ranking::Flush)
    }
    fn find_straight(&self) -> Option<Ranking> {
        Self::straight_high(self.rank_mask()).map(Ranking::Straight)
    }
    fn find_three_oak(&self) -> Option<Ranking> {
        self.rank_with_count(3, None).map(Ranking::ThreeOAK)
    }
    fn find_two_pair(&self) -> Option<Ranking> {
        let hi = self.rank_with_count(2, None)?;
        let lo = self.rank_with_count(2, Some(hi))?;
        Some(Ranking::TwoPair(hi, lo))
    }
    fn find_one_pair(&self) -> Option<Ranking> {
        self.rank_with_count(2, None).map(Ranking::OnePair)
    }
    fn find_high_card(&self) -> Ranking {
        Ranking::HighCard(Rank::from(self.rank_mask()))
    }

    //
    /// highest rank appearing at least n times, excluding one rank
    fn rank_with_count(&self, n: u8, except: Option<Rank>) -> Option<Rank> {
        let counts = self.rank_counts();
        Rank::all()
            .into_iter()
            .rev()
            .filter(|r| Some(*r) != except)
            .find(|r| counts[u8::from(*r) as usize] >= n)
    }
    fn rank_counts(&self) -> [u8; 13] {
        let mut counts = [0u8; 13];
        for card in self.0 {
            counts[u8::from(card.rank()) as usize] += 1;
        }
        counts
    }
    fn rank_mask(&self) -> u16 {
        u16::from(self.0)
    }
    fn flush_suit(&self) -> Option<Suit> {
        let counts = self.0.suit_count();
        Suit::all().into_iter().find(|s| counts[u8::from(*s) as usize] >= 5)
    }

    /// highest rank completing a 5-long run in the mask, wheel included
    fn straight_high(mask: u16) -> Option<Rank> {
        const RUN: u16 = 0b11111;
        const WHEEL: u16 = 0b1000000001111;
        for hi in (4..13u8).rev() {
            if (mask >> (hi - 4)) & RUN == RUN {
                return Some(Rank::from(hi));
            }
        }
        if mask & WHEEL == WHEEL {
            return Some(Rank::Five);
        }
        None
    }

    /// keep the n highest set bits of a rank mask
    fn top_n(mask: u16, n: usize) -> Kickers {
        let mut mask = mask;
        while mask.count_ones() as usize > n {
            mask &= mask - 1;
        }
        Kickers::from(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking(s: &str) -> Ranking {
        Evaluator::from(Hand::from(s)).find_ranking()
    }

    #[test]
    fn straight_flush() {
        assert_eq!(
            ranking("5h 6h 7h 8h 9h Ad Ac"),
            Ranking::StraightFlush(Rank::Nine)
        );
    }

    #[test]
    fn wheel_straight_flush() {
        assert_eq!(
            ranking("Ah 2h 3h 4h 5h Kd Qc"),
            Ranking::StraightFlush(Rank::Five)
        );
    }

    #[test]
    fn four_of_a_kind() {
        assert_eq!(ranking("Ac Ad Ah As 2c 3d 4h"), Ranking::FourOAK(Rank::Ace));
    }

    #[test]
    fn full_house_prefers_higher_trips() {
        assert_eq!(
            ranking("Ac Ad Ah Kc Kd Kh 2s"),
            Ranking::FullHouse(Rank::Ace, Rank::King)
        );
    }

    #[test]
    fn flush_beats_straight() {
        assert_eq!(
            ranking("2h 4h 6h 8h Th 9c 7d"),
            Ranking::Flush(Rank::Ten)
        );
    }

    #[test]
    fn wheel_straight() {
        assert_eq!(ranking("Ah 2c 3d 4h 5s 9c 9d"), Ranking::Straight(Rank::Five));
    }

    #[test]
    fn broadway_straight() {
        assert_eq!(ranking("Th Jc Qd Kh As 2c 2d"), Ranking::Straight(Rank::Ace));
    }

    #[test]
    fn two_pair_picks_top_two() {
        assert_eq!(
            ranking("Ac Ad Kc Kd Qc Qd 2h"),
            Ranking::TwoPair(Rank::Ace, Rank::King)
        );
    }

    #[test]
    fn high_card() {
        assert_eq!(ranking("2c 4d 6h 8s Tc Qd Ah"), Ranking::HighCard(Rank::Ace));
    }

    #[test]
    fn kickers_exclude_ranking_ranks() {
        let hand = Hand::from("Ac Ad Kc Qd Jh 3s 2h");
        let eval = Evaluator::from(hand);
        let ranking = eval.find_ranking();
        assert_eq!(ranking, Ranking::OnePair(Rank::Ace));
        let kicks = eval.find_kickers(ranking);
        assert_eq!(kicks.ranks(), vec![Rank::King, Rank::Queen, Rank::Jack]);
    }

    #[test]
    fn flush_kickers_stay_suited() {
        // the As is not a heart and must not appear in the kickers
        let hand = Hand::from("2h 4h 6h 8h Th As Ks");
        let eval = Evaluator::from(hand);
        let ranking = eval.find_ranking();
        assert_eq!(ranking, Ranking::Flush(Rank::Ten));
        let kicks = eval.find_kickers(ranking);
        assert_eq!(
            kicks.ranks(),
            vec![Rank::Eight, Rank::Six, Rank::Four, Rank::Two]
        );
    }
}
