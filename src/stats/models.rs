use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ball::PlayerId;

/// Which matches a career aggregate covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "year", rename_all = "snake_case")]
pub enum StatsScope {
    #[default]
    Career,
    Season(i32),
}

impl StatsScope {
    pub fn includes(&self, date: &DateTime<Utc>) -> bool {
        match self {
            StatsScope::Career => true,
            StatsScope::Season(year) => date.year() == *year,
        }
    }
}

/// A bowler's single-innings figures, ranked by wickets then fewest runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestFigures {
    pub wickets: u32,
    pub runs: u32,
}

impl BestFigures {
    pub fn new(wickets: u32, runs: u32) -> Self {
        Self { wickets, runs }
    }

    pub fn is_better_than(&self, other: &BestFigures) -> bool {
        self.wickets > other.wickets || (self.wickets == other.wickets && self.runs < other.runs)
    }
}

impl fmt::Display for BestFigures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.wickets, self.runs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattingCareer {
    pub innings: u32,
    pub not_outs: u32,
    pub times_out: u32,
    pub runs: u32,
    pub balls_faced: u32,
    pub fours: u32,
    pub sixes: u32,
    pub highest_score: u32,
    pub highest_not_out: bool,
    pub fifties: u32,
    /// Any score of 100 or more counts once, double hundreds included.
    pub hundreds: u32,
    pub average: f64,
    pub strike_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlingCareer {
    pub innings: u32,
    pub balls_bowled: u32,
    /// Cricket notation, e.g. `"43.2"`.
    pub overs: String,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub maidens: u32,
    pub average: f64,
    pub economy: f64,
    pub strike_rate: f64,
    pub best_figures: Option<BestFigures>,
    pub five_wicket_hauls: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldingCareer {
    pub catches: u32,
    pub stumpings: u32,
    pub run_outs: u32,
}

/// Derived career totals. Always rebuilt from match documents, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCareerStats {
    pub player_id: PlayerId,
    pub scope: StatsScope,
    pub matches: u32,
    pub batting: BattingCareer,
    pub bowling: BowlingCareer,
    pub fielding: FieldingCareer,
}

/// One match's contribution to a player's trend chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceDataPoint {
    pub match_id: String,
    pub date: DateTime<Utc>,
    pub runs: u32,
    pub balls_faced: u32,
    pub wickets: u32,
    pub runs_conceded: u32,
    pub balls_bowled: u32,
    pub strike_rate: f64,
    pub economy: f64,
    /// Batting average over this match and every earlier one in the series.
    pub cumulative_average: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadToHeadOutcome {
    Team1Win,
    Team2Win,
    Tie,
    NoResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub match_id: String,
    pub date: DateTime<Utc>,
    pub outcome: HeadToHeadOutcome,
    pub team1_runs: u32,
    pub team2_runs: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHeadStats {
    pub team1_id: String,
    pub team2_id: String,
    pub total_matches: u32,
    pub team1_wins: u32,
    pub team2_wins: u32,
    pub ties: u32,
    pub no_results: u32,
    /// Oldest first, ready for display.
    pub recent_matches: Vec<MatchSummary>,
}

/// Independent career aggregates laid side by side, in the order requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerComparison {
    pub scope: StatsScope,
    pub players: Vec<PlayerCareerStats>,
}
