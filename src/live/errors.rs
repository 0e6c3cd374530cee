use thiserror::Error;

use super::MatchState;
use crate::ball::BallError;
use crate::stats::StatsError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LiveScoringError {
    #[error("Cannot {action} while match is {state}")]
    InvalidStateTransition {
        state: MatchState,
        action: &'static str,
    },

    #[error("Malformed ball event: {0}")]
    MalformedBallEvent(String),

    #[error("Invalid match setup: {0}")]
    InvalidSetup(String),

    #[error("Match not found: {0}")]
    MatchNotFound(String),

    #[error("Failed to record match: {0}")]
    Persistence(#[from] StatsError),
}

impl From<BallError> for LiveScoringError {
    fn from(err: BallError) -> Self {
        LiveScoringError::MalformedBallEvent(err.to_string())
    }
}
