use felt_core::Chips;
use felt_core::DEFAULT_BUYIN_BB;
use felt_core::MAX_BUYIN_BB;
use felt_core::MIN_BUYIN_BB;
use serde::Serialize;

/// One catalog entry: the static description of a table.
#[derive(Debug, Clone)]
pub struct TableSpec {
    pub id: String,
    pub name: String,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub stake_level: String,
}

impl TableSpec {
    pub fn new(id: &str, name: &str, small: Chips, big: Chips, stake: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            small_blind: small,
            big_blind: big,
            stake_level: stake.to_string(),
        }
    }
    pub fn min_buyin(&self) -> Chips {
        MIN_BUYIN_BB * self.big_blind
    }
    pub fn max_buyin(&self) -> Chips {
        MAX_BUYIN_BB * self.big_blind
    }
    pub fn default_buyin(&self) -> Chips {
        DEFAULT_BUYIN_BB * self.big_blind
    }
    pub fn lobby(&self) -> LobbyTable {
        LobbyTable {
            id: self.id.clone(),
            name: self.name.clone(),
            blinds: Blinds {
                small: self.small_blind,
                big: self.big_blind,
            },
            buy_in: BuyInRange {
                min: self.min_buyin(),
                max: self.max_buyin(),
                default: self.default_buyin(),
            },
            stake_level: self.stake_level.clone(),
        }
    }
}

/// The fixed catalog, loaded once at boot to pre-create engines.
pub fn catalog() -> Vec<TableSpec> {
    vec![
        TableSpec::new("holdem-micro-1", "Driftwood", 1, 2, "micro"),
        TableSpec::new("holdem-micro-2", "Sawdust", 1, 2, "micro"),
        TableSpec::new("holdem-low-1", "Riverbed", 5, 10, "low"),
        TableSpec::new("holdem-low-2", "Felt Court", 5, 10, "low"),
        TableSpec::new("holdem-mid-1", "Brass Rail", 25, 50, "mid"),
        TableSpec::new("holdem-high-1", "High Water", 100, 200, "high"),
    ]
}

/// Wire shape of a catalog entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyTable {
    pub id: String,
    pub name: String,
    pub blinds: Blinds,
    pub buy_in: BuyInRange,
    pub stake_level: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Blinds {
    pub small: Chips,
    pub big: Chips,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuyInRange {
    pub min: Chips,
    pub max: Chips,
    pub default: Chips,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        let specs = catalog();
        let mut ids = specs.iter().map(|s| s.id.clone()).collect::<Vec<_>>();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), specs.len());
    }

    #[test]
    fn buyin_multiples_follow_blinds() {
        for spec in catalog() {
            assert_eq!(spec.min_buyin(), 20 * spec.big_blind);
            assert_eq!(spec.max_buyin(), 200 * spec.big_blind);
            assert_eq!(spec.default_buyin(), 100 * spec.big_blind);
        }
    }

    #[test]
    fn lobby_serializes_nested_ranges() {
        let spec = TableSpec::new("t", "T", 5, 10, "low");
        let json = serde_json::to_value(spec.lobby()).unwrap();
        assert_eq!(json["blinds"]["small"], 5);
        assert_eq!(json["buyIn"]["max"], 2000);
        assert_eq!(json["stakeLevel"], "low");
    }
}
