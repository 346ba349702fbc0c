use felt_core::Position;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Bidirectional player ↔ seat map for one table.
///
/// The two maps are kept mutually inverse: `set` evicts any previous
/// mapping of either side before inserting.
#[derive(Debug, Default)]
pub struct SeatMap {
    to_seat: HashMap<String, Position>,
    to_pid: HashMap<Position, String>,
}

impl SeatMap {
    pub fn set(&mut self, pid: &str, seat: Position) {
        if let Some(prev) = self.to_seat.remove(pid) {
            self.to_pid.remove(&prev);
        }
        if let Some(prev) = self.to_pid.remove(&seat) {
            self.to_seat.remove(&prev);
        }
        self.to_seat.insert(pid.to_string(), seat);
        self.to_pid.insert(seat, pid.to_string());
    }
    pub fn remove_pid(&mut self, pid: &str) {
        if let Some(seat) = self.to_seat.remove(pid) {
            self.to_pid.remove(&seat);
        }
    }
    pub fn seat_of(&self, pid: &str) -> Option<Position> {
        self.to_seat.get(pid).copied()
    }
    pub fn pid_at(&self, seat: Position) -> Option<&str> {
        self.to_pid.get(&seat).map(String::as_str)
    }
    /// Every entry must invert exactly.
    pub fn is_consistent(&self) -> bool {
        self.to_seat.len() == self.to_pid.len()
            && self
                .to_seat
                .iter()
                .all(|(pid, seat)| self.to_pid.get(seat).map(String::as_str) == Some(pid))
    }
}

/// Process-wide seat-mapping registry, partitioned by table id.
///
/// Mutations happen on the bridge path around engine dispatches for the
/// same table, so the per-call lock here never contends with itself.
#[derive(Debug, Default)]
pub struct Registry {
    tables: Mutex<HashMap<String, SeatMap>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }
    pub async fn set(&self, table: &str, pid: &str, seat: Position) {
        self.tables
            .lock()
            .await
            .entry(table.to_string())
            .or_default()
            .set(pid, seat);
    }
    pub async fn remove(&self, table: &str, pid: &str) {
        if let Some(map) = self.tables.lock().await.get_mut(table) {
            map.remove_pid(pid);
        }
    }
    pub async fn seat_of(&self, table: &str, pid: &str) -> Option<Position> {
        self.tables.lock().await.get(table).and_then(|m| m.seat_of(pid))
    }
    pub async fn pid_at(&self, table: &str, seat: Position) -> Option<String> {
        self.tables
            .lock()
            .await
            .get(table)
            .and_then(|m| m.pid_at(seat).map(String::from))
    }
    /// Test hook: bidirectional-consistency assertion for one table.
    pub async fn validate_consistency(&self, table: &str) -> bool {
        self.tables
            .lock()
            .await
            .get(table)
            .map(SeatMap::is_consistent)
            .unwrap_or(true)
    }
}
