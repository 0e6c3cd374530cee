pub mod feed;
pub mod scorecard;
pub mod scoring;
pub mod service;
pub mod setup;
pub mod win_probability;

mod errors;
mod state;

pub use errors::LiveScoringError;
pub use feed::{
    spawn_ticker, ChannelDeliverySource, DeliverySource, MatchFeed, SimulatedDeliverySource, Tick,
};
pub use scorecard::{BowlerSpell, DeliveryEffect, FallOfWicket, InningsScorecard};
pub use scoring::{LiveMatch, LiveSnapshot, INNINGS_PER_MATCH};
pub use service::{LiveScoringService, LiveScoringServiceBuilder};
pub use setup::{MatchSetup, TeamLineup, TossDecision, TossResult};
pub use state::MatchState;
pub use win_probability::{
    clamp_probability, MomentumHeuristic, ProbabilityContext, WinProbabilityModel,
};
