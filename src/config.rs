use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Longest innings a match can be configured for.
pub const MAX_OVERS_PER_INNINGS: u32 = 1_000;

/// Rules for a limited-overs match scored live.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    pub overs_per_innings: u32,
    /// How many recent deliveries the live feed keeps.
    pub last_balls_feed_size: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            overs_per_innings: 20,
            last_balls_feed_size: 6,
        }
    }
}

impl MatchConfig {
    pub fn with_overs_per_innings(mut self, overs: u32) -> Self {
        self.overs_per_innings = overs;
        self
    }

    pub fn with_last_balls_feed_size(mut self, size: usize) -> Self {
        self.last_balls_feed_size = size;
        self
    }

    pub fn max_legal_balls(&self) -> u32 {
        self.overs_per_innings
            .saturating_mul(crate::ball::BALLS_PER_OVER)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsConfig {
    /// Head-to-head summaries kept, most recent matches first.
    pub recent_matches_limit: usize,
    pub max_compared_players: usize,
    /// Most recent matches considered for a trend; `None` means all.
    pub trend_match_limit: Option<usize>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            recent_matches_limit: 5,
            max_compared_players: 4,
            trend_match_limit: None,
        }
    }
}

impl StatsConfig {
    pub fn with_recent_matches_limit(mut self, limit: usize) -> Self {
        self.recent_matches_limit = limit;
        self
    }

    pub fn with_trend_match_limit(mut self, limit: Option<usize>) -> Self {
        self.trend_match_limit = limit;
        self
    }
}

/// Configuration for the simulated delivery feed
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub tick_interval: Duration,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub match_config: MatchConfig,
    pub stats: StatsConfig,
    pub simulation: SimulationConfig,
}

impl EngineConfig {
    pub const OVERS_VAR: &'static str = "CRICKET_OVERS_PER_INNINGS";
    pub const TICK_VAR: &'static str = "CRICKET_TICK_MS";
    pub const SEED_VAR: &'static str = "CRICKET_SIM_SEED";

    /// Defaults overlaid with any `CRICKET_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(overs) = parse_var_in(&lookup, Self::OVERS_VAR, 1..=MAX_OVERS_PER_INNINGS) {
            config.match_config.overs_per_innings = overs;
        }
        if let Some(millis) = parse_var_in(&lookup, Self::TICK_VAR, 1..=u64::MAX) {
            config.simulation.tick_interval = Duration::from_millis(millis);
        }
        if let Some(seed) = parse_var::<u64>(&lookup, Self::SEED_VAR) {
            config.simulation.seed = Some(seed);
        }

        config
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparsable configuration value");
            None
        }
    }
}

fn parse_var_in<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    range: RangeInclusive<T>,
) -> Option<T>
where
    T: FromStr + PartialOrd + Display,
{
    let value = parse_var::<T>(lookup, key)?;
    if !range.contains(&value) {
        warn!(
            key,
            %value,
            min = %range.start(),
            max = %range.end(),
            "Ignoring out of range configuration value"
        );
        return None;
    }
    Some(value)
}
