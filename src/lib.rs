// Library crate for ball-by-ball cricket scoring and derived statistics
// This file exposes the public API for the binary and integration tests

pub mod ball;
pub mod config;
pub mod live;
pub mod match_data;
pub mod shared;
pub mod stats;
pub mod wagon_wheel;

// Re-export commonly used types for easier access in tests
pub use ball::{Ball, BallError, DeliveryOutcome, InningsTally, ShotPlacement};
pub use config::{EngineConfig, MatchConfig, SimulationConfig, StatsConfig};
pub use live::{
    LiveMatch, LiveScoringError, LiveScoringService, LiveSnapshot, MatchFeed, MatchSetup,
    MatchState,
};
pub use match_data::{CompletedMatch, InMemoryMatchRepository, MatchDocument, MatchRepository};
pub use shared::ServiceResponse;
pub use stats::{StatsError, StatsScope, StatsService};
pub use wagon_wheel::{FieldGeometry, Shot, ShotFilter};
