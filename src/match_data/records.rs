use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BattingStatLine, BowlingStatLine, InningsDocument, MatchDocument};
use crate::ball::{balls_from_overs_notation, PlayerId};
use crate::live::MatchState;
use crate::stats::StatsError;

/// Maximum wickets a bowler can take in one innings.
pub const MAX_INNINGS_WICKETS: u32 = 10;

/// Upper bound on any single run or ball count in one innings. Larger values
/// can only come from a corrupt document.
pub const MAX_INNINGS_TALLY: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchResult {
    Won { team_id: String },
    Tie,
    NoResult,
}

impl MatchResult {
    pub fn winner(&self) -> Option<&str> {
        match self {
            MatchResult::Won { team_id } => Some(team_id),
            _ => None,
        }
    }
}

/// Bowling line with overs already converted to a legal-ball count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlingFigures {
    pub player_id: PlayerId,
    pub balls_bowled: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub maidens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InningsRecord {
    pub batting_team_id: Option<String>,
    pub total_runs: u32,
    pub total_wickets: u32,
    pub batting: Vec<BattingStatLine>,
    pub bowling: Vec<BowlingFigures>,
}

/// A completed match whose document passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedMatch {
    pub id: String,
    pub date: DateTime<Utc>,
    pub team1_id: String,
    pub team2_id: String,
    pub result: MatchResult,
    pub innings: Vec<InningsRecord>,
}

impl CompletedMatch {
    pub fn involves_team(&self, team_id: &str) -> bool {
        self.team1_id == team_id || self.team2_id == team_id
    }

    pub fn batting_lines<'a>(&'a self, player_id: &'a str) -> impl Iterator<Item = &'a BattingStatLine> {
        self.innings
            .iter()
            .flat_map(|innings| innings.batting.iter())
            .filter(move |line| line.player_id == player_id)
    }

    pub fn bowling_figures<'a>(&'a self, player_id: &'a str) -> impl Iterator<Item = &'a BowlingFigures> {
        self.innings
            .iter()
            .flat_map(|innings| innings.bowling.iter())
            .filter(move |figures| figures.player_id == player_id)
    }

    /// Runs scored by a team across all of its innings in this match.
    pub fn team_runs(&self, team_id: &str) -> u32 {
        self.innings
            .iter()
            .filter(|innings| innings.batting_team_id.as_deref() == Some(team_id))
            .fold(0u32, |total, innings| total.saturating_add(innings.total_runs))
    }
}

impl TryFrom<&MatchDocument> for CompletedMatch {
    type Error = StatsError;

    fn try_from(doc: &MatchDocument) -> Result<Self, Self::Error> {
        let match_id = doc.display_id().to_string();
        let malformed = |reason: &str| StatsError::malformed(match_id.clone(), reason);

        let id = doc
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| malformed("missing id"))?;

        let status = doc
            .status
            .as_deref()
            .ok_or_else(|| malformed("missing status"))?;
        let state = MatchState::from_str(status)
            .map_err(|_| malformed(&format!("unknown status '{status}'")))?;
        if state != MatchState::Completed {
            return Err(malformed(&format!("status is {state}, expected completed")));
        }

        let date = doc.date.ok_or_else(|| malformed("missing date"))?;
        let team1_id = required_team(doc.team1_id.as_deref()).ok_or_else(|| malformed("missing team1Id"))?;
        let team2_id = required_team(doc.team2_id.as_deref()).ok_or_else(|| malformed("missing team2Id"))?;
        if team1_id == team2_id {
            return Err(malformed("a team cannot play itself"));
        }

        let result = match doc.winner_id.as_deref().filter(|w| !w.trim().is_empty()) {
            Some(winner) if winner == team1_id || winner == team2_id => MatchResult::Won {
                team_id: winner.to_string(),
            },
            Some(winner) => {
                return Err(malformed(&format!("winner '{winner}' did not play in the match")))
            }
            None if is_tie(doc.result.as_deref()) => MatchResult::Tie,
            None => MatchResult::NoResult,
        };

        let innings = doc
            .innings
            .iter()
            .enumerate()
            .map(|(index, innings)| {
                validate_innings(innings).map_err(|reason| {
                    malformed(&format!("innings {}: {reason}", index + 1))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompletedMatch {
            id,
            date,
            team1_id,
            team2_id,
            result,
            innings,
        })
    }
}

fn required_team(team_id: Option<&str>) -> Option<String> {
    team_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn is_tie(result: Option<&str>) -> bool {
    result.is_some_and(|r| r.trim().eq_ignore_ascii_case("tie"))
}

fn check_tally(what: &str, value: u32) -> Result<(), String> {
    if value > MAX_INNINGS_TALLY {
        return Err(format!("{what} of {value} is implausible"));
    }
    Ok(())
}

fn validate_innings(doc: &InningsDocument) -> Result<InningsRecord, String> {
    check_tally("total runs", doc.total_runs)?;
    for line in &doc.batsmen {
        if line.player_id.trim().is_empty() {
            return Err("batting line without a player id".to_string());
        }
        check_tally(&format!("{} runs", line.player_id), line.runs)?;
        check_tally(&format!("{} balls faced", line.player_id), line.balls)?;
        check_tally(&format!("{} fours", line.player_id), line.fours)?;
        check_tally(&format!("{} sixes", line.player_id), line.sixes)?;
    }

    let bowling = doc
        .bowlers
        .iter()
        .map(validate_bowling_line)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(InningsRecord {
        batting_team_id: doc.batting_team_id.clone(),
        total_runs: doc.total_runs,
        total_wickets: doc.total_wickets,
        batting: doc.batsmen.clone(),
        bowling,
    })
}

fn validate_bowling_line(line: &BowlingStatLine) -> Result<BowlingFigures, String> {
    if line.player_id.trim().is_empty() {
        return Err("bowling line without a player id".to_string());
    }
    if line.wickets > MAX_INNINGS_WICKETS {
        return Err(format!(
            "{} took {} wickets in one innings",
            line.player_id, line.wickets
        ));
    }
    let balls_bowled = balls_from_overs_notation(line.overs)
        .ok_or_else(|| format!("{} has invalid overs {}", line.player_id, line.overs))?;
    check_tally(&format!("{} balls bowled", line.player_id), balls_bowled)?;
    check_tally(&format!("{} runs conceded", line.player_id), line.runs)?;
    check_tally(&format!("{} maidens", line.player_id), line.maidens)?;

    Ok(BowlingFigures {
        player_id: line.player_id.clone(),
        balls_bowled,
        runs_conceded: line.runs,
        wickets: line.wickets,
        maidens: line.maidens,
    })
}
