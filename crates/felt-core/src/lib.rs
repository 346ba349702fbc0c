//! Core type aliases, constants, and configuration for feltd.
//!
//! This crate provides the foundational types and runtime parameters
//! used throughout the feltd workspace.

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Chip amounts: stacks, bets, blinds, pots.
pub type Chips = u32;
/// Seat index around the table (0..N).
pub type Position = usize;
/// Monotonic per-table hand counter.
pub type HandNumber = u64;
/// Gap-free per-table event sequence number.
pub type Sequence = u64;

// ============================================================================
// TABLE CONSTANTS
// ============================================================================
/// Seats per table.
pub const N: usize = 9;
/// Minimum funded, active seats required to start a hand.
pub const MIN_PLAYERS: usize = 2;
/// Buy-in floor as a multiple of the big blind.
pub const MIN_BUYIN_BB: Chips = 20;
/// Buy-in ceiling as a multiple of the big blind.
pub const MAX_BUYIN_BB: Chips = 200;
/// Default buy-in as a multiple of the big blind.
pub const DEFAULT_BUYIN_BB: Chips = 100;

// ============================================================================
// CONFIGURATION
// ============================================================================
use std::time::Duration;

/// Runtime configuration, read once from the environment at startup.
///
/// # Environment
///
/// - `PORT` — listen port (default 8080)
/// - `ACTION_TIMEOUT_SECONDS` — per-decision countdown (default 15)
/// - `RECONNECT_GRACE_SECONDS` — disconnect grace period (default 30)
/// - `STORE_URL` — optional durable store URL; absent means in-memory
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub action_timeout: Duration,
    pub reconnect_grace: Duration,
    pub street_deal_delay: Duration,
    pub new_hand_delay: Duration,
    pub store_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            action_timeout: Duration::from_secs(15),
            reconnect_grace: Duration::from_secs(30),
            street_deal_delay: Duration::from_millis(600),
            new_hand_delay: Duration::from_secs(4),
            store_url: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            port: env_parse("PORT").unwrap_or(base.port),
            action_timeout: env_parse("ACTION_TIMEOUT_SECONDS")
                .map(Duration::from_secs)
                .unwrap_or(base.action_timeout),
            reconnect_grace: env_parse("RECONNECT_GRACE_SECONDS")
                .map(Duration::from_secs)
                .unwrap_or(base.reconnect_grace),
            street_deal_delay: env_parse("STREET_DEAL_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(base.street_deal_delay),
            new_hand_delay: env_parse("NEW_HAND_DELAY_SECONDS")
                .map(Duration::from_secs)
                .unwrap_or(base.new_hand_delay),
            store_url: std::env::var("STORE_URL").ok().filter(|s| !s.is_empty()),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

// ============================================================================
// IDENTITY
// ============================================================================
/// Canonical player identity: trimmed and lowercased.
/// Every registry in the system keys players by this form.
pub fn canonical(id: &str) -> String {
    id.trim().to_lowercase()
}

// ============================================================================
// PROCESS SETUP
// ============================================================================
/// Initialize the terminal logger. Call once from the binary.
pub fn log() {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    simplelog::TermLogger::init(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )
    .expect("initialize logger");
}

/// Register a Ctrl+C handler for immediate termination.
pub fn interrupt() {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.expect("install ctrl-c handler");
        println!();
        log::warn!("interrupt received, exiting");
        std::process::exit(0);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_normalizes() {
        assert_eq!(canonical("  Alice "), "alice");
        assert_eq!(canonical("BOB"), "bob");
        assert_eq!(canonical("carol"), "carol");
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.action_timeout, Duration::from_secs(15));
        assert_eq!(config.reconnect_grace, Duration::from_secs(30));
        assert!(config.store_url.is_none());
    }

    #[test]
    fn buyin_multiples() {
        assert!(MIN_BUYIN_BB < DEFAULT_BUYIN_BB);
        assert!(DEFAULT_BUYIN_BB < MAX_BUYIN_BB);
    }
}
