use chrono::{TimeZone, Utc};

use cricket_core::ball::WicketKind;
use cricket_core::match_data::{
    BattingStatLine, BowlingStatLine, DismissalRecord, InningsDocument, MatchDocument,
};

// ============================================================================
// Stat Line Helpers
// ============================================================================

pub fn batting(player_id: &str, runs: u32, balls: u32, is_out: bool) -> BattingStatLine {
    BattingStatLine {
        runs,
        balls,
        is_out,
        dismissal: is_out.then(|| DismissalRecord {
            kind: WicketKind::Bowled,
            bowler_id: None,
            fielder_id: None,
        }),
        ..BattingStatLine::new(player_id)
    }
}

pub fn bowling(player_id: &str, overs: f64, runs: u32, wickets: u32) -> BowlingStatLine {
    BowlingStatLine {
        player_id: player_id.to_string(),
        overs,
        runs,
        wickets,
        maidens: 0,
    }
}

// ============================================================================
// Match Document Builder
// ============================================================================

/// Builds store documents, completed on 1 May 2024 unless told otherwise.
pub struct MatchDocumentBuilder {
    document: MatchDocument,
}

impl MatchDocumentBuilder {
    pub fn new(id: &str, team1_id: &str, team2_id: &str) -> Self {
        Self {
            document: MatchDocument {
                id: Some(id.to_string()),
                status: Some("completed".to_string()),
                date: Some(Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap()),
                team1_id: Some(team1_id.to_string()),
                team2_id: Some(team2_id.to_string()),
                ..MatchDocument::default()
            },
        }
    }

    pub fn on(mut self, year: i32, month: u32, day: u32) -> Self {
        self.document.date = Some(Utc.with_ymd_and_hms(year, month, day, 14, 0, 0).unwrap());
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.document.status = Some(status.to_string());
        self
    }

    pub fn won_by(mut self, team_id: &str) -> Self {
        self.document.winner_id = Some(team_id.to_string());
        self
    }

    pub fn tied(mut self) -> Self {
        self.document.winner_id = None;
        self.document.result = Some("tie".to_string());
        self
    }

    pub fn with_innings(
        mut self,
        batting_team_id: &str,
        total_runs: u32,
        batsmen: Vec<BattingStatLine>,
        bowlers: Vec<BowlingStatLine>,
    ) -> Self {
        let total_wickets = batsmen.iter().filter(|line| line.is_out).count() as u32;
        self.document.innings.push(InningsDocument {
            batting_team_id: Some(batting_team_id.to_string()),
            total_runs,
            total_wickets,
            batsmen,
            bowlers,
        });
        self
    }

    pub fn build(self) -> MatchDocument {
        self.document
    }
}
