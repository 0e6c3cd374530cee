use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Lifecycle of a match.
///
/// ```text
/// Scheduled ──start──▶ Live ──▶ Completed
///     │                │  ▲
///     │          suspend│  │resume
///     │                ▼  │
///     │             Suspended
///     └──────────▶ Abandoned ◀── (from Live or Suspended)
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MatchState {
    Scheduled,
    Live,
    Suspended,
    Completed,
    Abandoned,
}

impl MatchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchState::Completed | MatchState::Abandoned)
    }

    pub fn accepts_deliveries(self) -> bool {
        self == MatchState::Live
    }

    pub fn can_transition_to(self, next: MatchState) -> bool {
        use MatchState::*;
        matches!(
            (self, next),
            (Scheduled, Live)
                | (Scheduled, Abandoned)
                | (Live, Suspended)
                | (Live, Completed)
                | (Live, Abandoned)
                | (Suspended, Live)
                | (Suspended, Abandoned)
        )
    }
}
