use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ball::{PlayerId, WicketKind};
use crate::stats::StatsError;

/// A match as it sits in the document store.
///
/// Every field is optional: the store is loosely typed and documents are only
/// trusted after [`CompletedMatch::try_from`](super::CompletedMatch) has
/// checked them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDocument {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "state")]
    pub status: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub team1_id: Option<String>,
    #[serde(default)]
    pub team2_id: Option<String>,
    #[serde(default)]
    pub winner_id: Option<String>,
    /// Free-form result tag, e.g. `"tie"` or `"no_result"`.
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub innings: Vec<InningsDocument>,
}

impl MatchDocument {
    /// Parses a raw store document. A document that does not even have the
    /// right shape is reported as a malformed record.
    pub fn from_json(value: serde_json::Value) -> Result<Self, StatsError> {
        let match_id = value
            .get("id")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("<unknown>")
            .to_string();

        serde_json::from_value(value).map_err(|err| StatsError::malformed(match_id, err.to_string()))
    }

    pub fn display_id(&self) -> &str {
        self.id.as_deref().unwrap_or("<unknown>")
    }

    pub fn involves_team(&self, team_id: &str) -> bool {
        self.team1_id.as_deref() == Some(team_id) || self.team2_id.as_deref() == Some(team_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InningsDocument {
    #[serde(default)]
    pub batting_team_id: Option<String>,
    #[serde(default)]
    pub total_runs: u32,
    #[serde(default)]
    pub total_wickets: u32,
    #[serde(default)]
    pub batsmen: Vec<BattingStatLine>,
    #[serde(default)]
    pub bowlers: Vec<BowlingStatLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattingStatLine {
    #[serde(default)]
    pub player_id: PlayerId,
    #[serde(default)]
    pub runs: u32,
    #[serde(default)]
    pub balls: u32,
    #[serde(default)]
    pub fours: u32,
    #[serde(default)]
    pub sixes: u32,
    #[serde(default)]
    pub is_out: bool,
    #[serde(default)]
    pub dismissal: Option<DismissalRecord>,
}

impl BattingStatLine {
    pub fn new(player_id: impl Into<PlayerId>) -> Self {
        Self {
            player_id: player_id.into(),
            ..Self::default()
        }
    }
}

/// How a batter got out, used to credit fielders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissalRecord {
    pub kind: WicketKind,
    #[serde(default)]
    pub bowler_id: Option<PlayerId>,
    #[serde(default)]
    pub fielder_id: Option<PlayerId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlingStatLine {
    #[serde(default)]
    pub player_id: PlayerId,
    /// Overs in cricket notation: `3.4` is three overs and four balls.
    #[serde(default)]
    pub overs: f64,
    #[serde(default, alias = "runsConceded")]
    pub runs: u32,
    #[serde(default)]
    pub wickets: u32,
    #[serde(default)]
    pub maidens: u32,
}
