use std::collections::HashSet;

use crate::match_data::{CompletedMatch, MatchResult};

use super::{HeadToHeadOutcome, HeadToHeadStats, MatchSummary, StatsError};

pub const MIN_COMPARED_PLAYERS: usize = 2;

/// Win/loss/tie record between two teams over the given matches.
///
/// Only matches between exactly these two teams count. `recent_limit`
/// summaries are kept, chosen newest first and returned oldest first.
pub fn head_to_head(
    team1_id: &str,
    team2_id: &str,
    matches: &[CompletedMatch],
    recent_limit: usize,
) -> Result<HeadToHeadStats, StatsError> {
    if team1_id.trim().is_empty() || team2_id.trim().is_empty() {
        return Err(StatsError::Validation("team ids cannot be empty".into()));
    }
    if team1_id == team2_id {
        return Err(StatsError::Validation(format!(
            "head to head needs two different teams, got {team1_id} twice"
        )));
    }

    let mut between: Vec<&CompletedMatch> = matches
        .iter()
        .filter(|record| record.involves_team(team1_id) && record.involves_team(team2_id))
        .collect();
    between.sort_by(|a, b| b.date.cmp(&a.date));

    let mut stats = HeadToHeadStats {
        team1_id: team1_id.to_string(),
        team2_id: team2_id.to_string(),
        ..HeadToHeadStats::default()
    };

    for record in &between {
        let outcome = match &record.result {
            MatchResult::Won { team_id } if team_id == team1_id => HeadToHeadOutcome::Team1Win,
            MatchResult::Won { .. } => HeadToHeadOutcome::Team2Win,
            MatchResult::Tie => HeadToHeadOutcome::Tie,
            MatchResult::NoResult => HeadToHeadOutcome::NoResult,
        };
        stats.total_matches += 1;
        match outcome {
            HeadToHeadOutcome::Team1Win => stats.team1_wins += 1,
            HeadToHeadOutcome::Team2Win => stats.team2_wins += 1,
            HeadToHeadOutcome::Tie => stats.ties += 1,
            HeadToHeadOutcome::NoResult => stats.no_results += 1,
        }

        if stats.recent_matches.len() < recent_limit {
            stats.recent_matches.push(MatchSummary {
                match_id: record.id.clone(),
                date: record.date,
                outcome,
                team1_runs: record.team_runs(team1_id),
                team2_runs: record.team_runs(team2_id),
            });
        }
    }

    stats.recent_matches.reverse();
    Ok(stats)
}

/// Checks a comparison request names between two and `max` distinct players.
pub fn validate_comparison_ids(player_ids: &[String], max: usize) -> Result<(), StatsError> {
    if !(MIN_COMPARED_PLAYERS..=max).contains(&player_ids.len()) {
        return Err(StatsError::Validation(format!(
            "compare between {MIN_COMPARED_PLAYERS} and {max} players, got {}",
            player_ids.len()
        )));
    }

    let mut seen = HashSet::new();
    for id in player_ids {
        if id.trim().is_empty() {
            return Err(StatsError::Validation("player id cannot be empty".into()));
        }
        if !seen.insert(id.as_str()) {
            return Err(StatsError::Validation(format!("{id} listed more than once")));
        }
    }
    Ok(())
}
