use super::seat::Seat;
use felt_core::Chips;
use felt_core::Position;
use serde::Deserialize;
use serde::Serialize;

/// A pot layer: collected chips plus the seats entitled to contest them.
///
/// The first pot is the main pot; later entries are side pots created by
/// shorter all-in commitments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pot {
    pub amount: Chips,
    pub eligible: Vec<Position>,
}

impl Pot {
    /// Rebuilds the pot stack from scratch off per-seat hand commitments.
    ///
    /// Seats are layered by distinct commitment level ascending; each layer
    /// collects `level - previous` from every seat that reached it and is
    /// contested by the non-folded seats among them. Adjacent layers with
    /// identical eligibility (caused by folded contributions) merge, so the
    /// result is minimal: one main pot plus one side pot per short stack.
    pub fn build(seats: &[Seat]) -> Vec<Pot> {
        let mut levels = seats
            .iter()
            .map(Seat::hand_committed)
            .filter(|c| *c > 0)
            .collect::<Vec<Chips>>();
        levels.sort_unstable();
        levels.dedup();
        let mut pots: Vec<Pot> = Vec::new();
        let mut floor = 0;
        for level in levels {
            let amount = seats
                .iter()
                .map(Seat::hand_committed)
                .map(|c| c.min(level).saturating_sub(floor))
                .sum::<Chips>();
            let eligible = seats
                .iter()
                .filter(|s| s.in_pot())
                .filter(|s| s.hand_committed() >= level)
                .map(Seat::id)
                .collect::<Vec<Position>>();
            match pots.last_mut() {
                Some(prev) if prev.eligible == eligible => prev.amount += amount,
                _ => pots.push(Pot { amount, eligible }),
            }
            floor = level;
        }
        pots
    }
}
