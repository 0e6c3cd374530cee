use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::LiveScoringError;
use crate::ball::PlayerId;

pub const MIN_LINEUP_SIZE: usize = 2;
pub const MAX_LINEUP_SIZE: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLineup {
    pub team_id: String,
    /// Players in batting order.
    pub players: Vec<PlayerId>,
}

impl TeamLineup {
    pub fn new(team_id: impl Into<String>, players: Vec<PlayerId>) -> Self {
        Self {
            team_id: team_id.into(),
            players,
        }
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p == player_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TossDecision {
    Bat,
    Bowl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TossResult {
    pub winner_team_id: String,
    pub decision: TossDecision,
}

/// Everything needed to move a scheduled match into play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSetup {
    pub toss: TossResult,
    pub lineups: [TeamLineup; 2],
}

impl MatchSetup {
    pub fn new(toss: TossResult, first: TeamLineup, second: TeamLineup) -> Self {
        Self {
            toss,
            lineups: [first, second],
        }
    }

    /// Checks the setup against the two scheduled teams.
    pub fn validate(&self, team1_id: &str, team2_id: &str) -> Result<(), LiveScoringError> {
        let invalid = |reason: String| Err(LiveScoringError::InvalidSetup(reason));

        let mut teams: Vec<&str> = self.lineups.iter().map(|l| l.team_id.as_str()).collect();
        teams.sort_unstable();
        let mut scheduled = vec![team1_id, team2_id];
        scheduled.sort_unstable();
        if teams != scheduled {
            return invalid(format!(
                "lineups are for {teams:?}, match is between {team1_id} and {team2_id}"
            ));
        }

        if !self
            .lineups
            .iter()
            .any(|l| l.team_id == self.toss.winner_team_id)
        {
            return invalid(format!(
                "toss winner {} is not playing",
                self.toss.winner_team_id
            ));
        }

        let mut seen = HashSet::new();
        for lineup in &self.lineups {
            if !(MIN_LINEUP_SIZE..=MAX_LINEUP_SIZE).contains(&lineup.players.len()) {
                return invalid(format!(
                    "{} named {} players, expected {MIN_LINEUP_SIZE} to {MAX_LINEUP_SIZE}",
                    lineup.team_id,
                    lineup.players.len()
                ));
            }
            for player in &lineup.players {
                if player.trim().is_empty() || !seen.insert(player.as_str()) {
                    return invalid(format!("invalid or duplicate player '{player}'"));
                }
            }
        }

        Ok(())
    }

    /// Lineups ordered (batting first, fielding first) according to the toss.
    pub fn batting_order(&self) -> (&TeamLineup, &TeamLineup) {
        let [a, b] = &self.lineups;
        let (winner, loser) = if a.team_id == self.toss.winner_team_id {
            (a, b)
        } else {
            (b, a)
        };
        match self.toss.decision {
            TossDecision::Bat => (winner, loser),
            TossDecision::Bowl => (loser, winner),
        }
    }
}
