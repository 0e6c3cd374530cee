use serde::{Deserialize, Serialize};

use super::{LiveScoringError, TeamLineup};
use crate::ball::{
    format_overs, overs_notation, Ball, DeliveryOutcome, InningsTally, OverSummary, PlayerId,
};
use crate::match_data::{BattingStatLine, BowlingStatLine, DismissalRecord, InningsDocument};

/// A bowler's running figures within one innings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlerSpell {
    pub player_id: PlayerId,
    pub legal_balls: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub maidens: u32,
}

impl BowlerSpell {
    pub fn to_stat_line(&self) -> BowlingStatLine {
        BowlingStatLine {
            player_id: self.player_id.clone(),
            overs: overs_notation(self.legal_balls),
            runs: self.runs_conceded,
            wickets: self.wickets,
            maidens: self.maidens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallOfWicket {
    pub wicket_number: u32,
    pub player_id: PlayerId,
    pub team_runs: u32,
    pub overs: String,
}

/// What a single delivery did to the innings.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryEffect {
    pub completed_over: Option<OverSummary>,
    pub innings_closed: bool,
}

/// Live batting and bowling card for one innings.
///
/// Deliveries go through [`prepare`](Self::prepare), which checks them
/// against the state of play without touching anything, and then
/// [`apply`](Self::apply), which cannot fail. A rejected delivery therefore
/// leaves the card exactly as it was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InningsScorecard {
    number: u8,
    batting_team_id: String,
    bowling_team_id: String,
    batting_order: Vec<PlayerId>,
    fielding_side: Vec<PlayerId>,
    next_batter: usize,
    striker: Option<PlayerId>,
    non_striker: Option<PlayerId>,
    max_legal_balls: u32,
    target: Option<u32>,
    tally: InningsTally,
    batting: Vec<BattingStatLine>,
    bowling: Vec<BowlerSpell>,
    fall_of_wickets: Vec<FallOfWicket>,
    previous_over_bowler: Option<PlayerId>,
}

impl InningsScorecard {
    /// Opens an innings with the first two names in the batting order at the crease.
    pub fn open(
        number: u8,
        batting: &TeamLineup,
        bowling: &TeamLineup,
        max_legal_balls: u32,
        target: Option<u32>,
    ) -> Self {
        let mut order = batting.players.iter().cloned();
        let striker = order.next();
        let non_striker = order.next();
        let batting_lines = striker
            .iter()
            .chain(non_striker.iter())
            .map(|id| BattingStatLine::new(id.clone()))
            .collect();

        Self {
            number,
            batting_team_id: batting.team_id.clone(),
            bowling_team_id: bowling.team_id.clone(),
            batting_order: batting.players.clone(),
            fielding_side: bowling.players.clone(),
            next_batter: 2,
            striker,
            non_striker,
            max_legal_balls,
            target,
            tally: InningsTally::new(),
            batting: batting_lines,
            bowling: Vec::new(),
            fall_of_wickets: Vec::new(),
            previous_over_bowler: None,
        }
    }

    /// Validates an outcome against the state of play and builds the ball.
    pub fn prepare(&self, outcome: DeliveryOutcome) -> Result<Ball, LiveScoringError> {
        let malformed = |reason: String| Err(LiveScoringError::MalformedBallEvent(reason));

        let (Some(striker), Some(non_striker)) = (&self.striker, &self.non_striker) else {
            return malformed(format!("innings {} has no batters at the crease", self.number));
        };

        if !outcome.bowler_id.is_empty() && !self.fielding_side.contains(&outcome.bowler_id) {
            return malformed(format!(
                "bowler {} is not in the {} lineup",
                outcome.bowler_id, self.bowling_team_id
            ));
        }

        match self.tally.over_in_progress().and_then(|over| over.bowler_id()) {
            Some(current) if current != outcome.bowler_id => {
                return malformed(format!(
                    "over is being bowled by {current}, not {}",
                    outcome.bowler_id
                ));
            }
            None if self.previous_over_bowler.as_deref() == Some(outcome.bowler_id.as_str()) => {
                return malformed(format!(
                    "{} bowled the previous over and cannot bowl consecutive overs",
                    outcome.bowler_id
                ));
            }
            _ => {}
        }

        if let Some(dismissed) = &outcome.dismissed_player_id {
            if outcome.is_wicket && dismissed != striker && dismissed != non_striker {
                return malformed(format!("{dismissed} is not at the crease"));
            }
        }

        if let Some(fielder) = &outcome.fielder_id {
            if !self.fielding_side.contains(fielder) {
                return malformed(format!("fielder {fielder} is not in the fielding side"));
            }
        }

        Ok(outcome.into_ball(self.tally.next_sequence(), striker)?)
    }

    /// Folds a prepared ball into the card.
    pub fn apply(&mut self, ball: Ball) -> DeliveryEffect {
        if let Some(line) = find_line(&mut self.batting, ball.striker_id()) {
            line.runs += ball.batter_runs();
            if ball.counts_as_ball_faced() {
                line.balls += 1;
            }
            if ball.is_four() {
                line.fours += 1;
            }
            if ball.is_six() {
                line.sixes += 1;
            }
        }

        let spell = self.spell_mut(ball.bowler_id());
        spell.runs_conceded += ball.bowler_runs_conceded();
        if ball.is_legal_delivery() {
            spell.legal_balls += 1;
        }
        if ball.credits_bowler() {
            spell.wickets += 1;
        }

        if ball.rotates_strike() {
            self.swap_ends();
        }

        let dismissal = ball.wicket().map(|wicket| {
            let record = DismissalRecord {
                kind: wicket.kind,
                bowler_id: ball
                    .credits_bowler()
                    .then(|| ball.bowler_id().to_string()),
                fielder_id: wicket.fielder_id.clone(),
            };
            (wicket.dismissed_player_id.clone(), record)
        });

        let completed_over = self.tally.push(ball);

        if let Some((dismissed, record)) = dismissal {
            self.dismiss(&dismissed, record);
        }

        if let Some(summary) = &completed_over {
            if summary.is_maiden {
                self.spell_mut(&summary.bowler_id).maidens += 1;
            }
            self.previous_over_bowler = Some(summary.bowler_id.clone());
            self.swap_ends();
        }

        DeliveryEffect {
            completed_over,
            innings_closed: self.is_closed(),
        }
    }

    fn dismiss(&mut self, player_id: &str, record: DismissalRecord) {
        if let Some(line) = find_line(&mut self.batting, player_id) {
            line.is_out = true;
            line.dismissal = Some(record);
        }

        self.fall_of_wickets.push(FallOfWicket {
            wicket_number: self.tally.wickets(),
            player_id: player_id.to_string(),
            team_runs: self.tally.runs(),
            overs: self.tally.overs_bowled(),
        });

        // The incoming batter takes the dismissed batter's end.
        let incoming = self.batting_order.get(self.next_batter).cloned();
        if incoming.is_some() {
            self.next_batter += 1;
        }
        if let Some(id) = &incoming {
            self.batting.push(BattingStatLine::new(id.clone()));
        }

        if self.striker.as_deref() == Some(player_id) {
            self.striker = incoming;
        } else if self.non_striker.as_deref() == Some(player_id) {
            self.non_striker = incoming;
        }
    }

    fn swap_ends(&mut self) {
        std::mem::swap(&mut self.striker, &mut self.non_striker);
    }

    fn spell_mut(&mut self, bowler_id: &str) -> &mut BowlerSpell {
        let index = match self.bowling.iter().position(|s| s.player_id == bowler_id) {
            Some(index) => index,
            None => {
                self.bowling.push(BowlerSpell {
                    player_id: bowler_id.to_string(),
                    ..BowlerSpell::default()
                });
                self.bowling.len() - 1
            }
        };
        &mut self.bowling[index]
    }

    pub fn is_all_out(&self) -> bool {
        self.striker.is_none() || self.non_striker.is_none()
    }

    pub fn overs_exhausted(&self) -> bool {
        self.tally.legal_balls() >= self.max_legal_balls
    }

    pub fn target_reached(&self) -> bool {
        self.target.is_some_and(|target| self.tally.runs() >= target)
    }

    pub fn is_closed(&self) -> bool {
        self.is_all_out() || self.overs_exhausted() || self.target_reached()
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn batting_team_id(&self) -> &str {
        &self.batting_team_id
    }

    pub fn bowling_team_id(&self) -> &str {
        &self.bowling_team_id
    }

    pub fn fielding_side(&self) -> &[PlayerId] {
        &self.fielding_side
    }

    pub fn striker(&self) -> Option<&str> {
        self.striker.as_deref()
    }

    pub fn non_striker(&self) -> Option<&str> {
        self.non_striker.as_deref()
    }

    pub fn current_bowler(&self) -> Option<&str> {
        self.tally.over_in_progress().and_then(|over| over.bowler_id())
    }

    pub fn previous_over_bowler(&self) -> Option<&str> {
        self.previous_over_bowler.as_deref()
    }

    pub fn target(&self) -> Option<u32> {
        self.target
    }

    pub fn max_legal_balls(&self) -> u32 {
        self.max_legal_balls
    }

    pub fn balls_remaining(&self) -> u32 {
        self.max_legal_balls.saturating_sub(self.tally.legal_balls())
    }

    pub fn tally(&self) -> &InningsTally {
        &self.tally
    }

    pub fn batting(&self) -> &[BattingStatLine] {
        &self.batting
    }

    pub fn bowling(&self) -> &[BowlerSpell] {
        &self.bowling
    }

    pub fn fall_of_wickets(&self) -> &[FallOfWicket] {
        &self.fall_of_wickets
    }

    pub fn overs(&self) -> String {
        format_overs(self.tally.legal_balls())
    }

    pub fn to_document(&self) -> InningsDocument {
        InningsDocument {
            batting_team_id: Some(self.batting_team_id.clone()),
            total_runs: self.tally.runs(),
            total_wickets: self.tally.wickets(),
            batsmen: self.batting.clone(),
            bowlers: self.bowling.iter().map(BowlerSpell::to_stat_line).collect(),
        }
    }
}

fn find_line<'a>(lines: &'a mut [BattingStatLine], player_id: &str) -> Option<&'a mut BattingStatLine> {
    lines.iter_mut().find(|line| line.player_id == player_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::{ExtraKind, WicketKind};

    fn lineup(team: &str, size: usize) -> TeamLineup {
        TeamLineup::new(team, (1..=size).map(|i| format!("{team}-{i}")).collect())
    }

    fn scorecard(batters: usize) -> InningsScorecard {
        InningsScorecard::open(1, &lineup("bat", batters), &lineup("bowl", 11), 12, None)
    }

    fn bowl(card: &mut InningsScorecard, outcome: DeliveryOutcome) -> DeliveryEffect {
        let ball = card.prepare(outcome).unwrap();
        card.apply(ball)
    }

    #[test]
    fn single_rotates_strike_and_over_end_rotates_back() {
        let mut card = scorecard(11);
        bowl(&mut card, DeliveryOutcome::runs("bowl-1", 1));
        assert_eq!(card.striker(), Some("bat-2"));

        for _ in 0..4 {
            bowl(&mut card, DeliveryOutcome::dot("bowl-1"));
        }
        let effect = bowl(&mut card, DeliveryOutcome::runs("bowl-1", 1));

        // Single off the last ball brings bat-1 back on strike, then the over ends.
        assert!(effect.completed_over.is_some());
        assert_eq!(card.striker(), Some("bat-2"));
        assert_eq!(card.previous_over_bowler(), Some("bowl-1"));
    }

    #[test]
    fn credits_batter_and_bowler_lines() {
        let mut card = scorecard(11);
        bowl(&mut card, DeliveryOutcome::runs("bowl-1", 4));
        bowl(&mut card, DeliveryOutcome::no_ball("bowl-1", 6));
        bowl(&mut card, DeliveryOutcome::wide("bowl-1"));
        bowl(&mut card, DeliveryOutcome::extra("bowl-1", ExtraKind::LegBye, 1));

        let opener = &card.batting()[0];
        assert_eq!((opener.runs, opener.balls, opener.fours, opener.sixes), (10, 3, 1, 1));

        let spell = &card.bowling()[0];
        assert_eq!(spell.runs_conceded, 12);
        assert_eq!(spell.legal_balls, 2);
        assert_eq!(card.tally().runs(), 13);
    }

    #[test]
    fn maiden_is_credited_on_over_completion() {
        let mut card = scorecard(11);
        for _ in 0..6 {
            bowl(&mut card, DeliveryOutcome::dot("bowl-3"));
        }
        assert_eq!(card.bowling()[0].maidens, 1);
        assert_eq!(card.bowling()[0].to_stat_line().overs, 1.0);
    }

    #[test]
    fn rejects_consecutive_overs_and_mid_over_change() {
        let mut card = scorecard(11);
        bowl(&mut card, DeliveryOutcome::dot("bowl-1"));
        assert!(matches!(
            card.prepare(DeliveryOutcome::dot("bowl-2")),
            Err(LiveScoringError::MalformedBallEvent(_))
        ));

        for _ in 0..5 {
            bowl(&mut card, DeliveryOutcome::dot("bowl-1"));
        }
        assert!(card.prepare(DeliveryOutcome::dot("bowl-1")).is_err());
        assert!(card.prepare(DeliveryOutcome::dot("bowl-2")).is_ok());
        assert!(card.prepare(DeliveryOutcome::dot("bat-3")).is_err());
    }

    #[test]
    fn wicket_brings_in_next_batter_and_records_fall() {
        let mut card = scorecard(11);
        bowl(&mut card, DeliveryOutcome::runs("bowl-1", 2));
        bowl(
            &mut card,
            DeliveryOutcome::wicket("bowl-1", WicketKind::Caught, "bat-1").with_fielder("bowl-7"),
        );

        assert_eq!(card.striker(), Some("bat-3"));
        assert_eq!(card.non_striker(), Some("bat-2"));
        let out = &card.batting()[0];
        assert!(out.is_out);
        let dismissal = out.dismissal.as_ref().unwrap();
        assert_eq!(dismissal.bowler_id.as_deref(), Some("bowl-1"));
        assert_eq!(dismissal.fielder_id.as_deref(), Some("bowl-7"));
        assert_eq!(
            card.fall_of_wickets()[0],
            FallOfWicket {
                wicket_number: 1,
                player_id: "bat-1".into(),
                team_runs: 2,
                overs: "0.2".into(),
            }
        );
    }

    #[test]
    fn run_out_of_non_striker_keeps_striker() {
        let mut card = scorecard(11);
        bowl(
            &mut card,
            DeliveryOutcome::dot("bowl-1").with_wicket(WicketKind::RunOut, "bat-2"),
        );

        assert_eq!(card.striker(), Some("bat-1"));
        assert_eq!(card.non_striker(), Some("bat-3"));
        assert_eq!(card.bowling()[0].wickets, 0);
    }

    #[test]
    fn rejects_dismissal_of_player_not_at_crease() {
        let card = scorecard(11);
        let outcome = DeliveryOutcome::dot("bowl-1").with_wicket(WicketKind::RunOut, "bat-7");
        assert!(card.prepare(outcome).is_err());
    }

    #[test]
    fn closes_when_all_out() {
        let mut card = scorecard(3);
        bowl(&mut card, DeliveryOutcome::wicket("bowl-1", WicketKind::Bowled, "bat-1"));
        let effect = bowl(&mut card, DeliveryOutcome::wicket("bowl-1", WicketKind::Lbw, "bat-3"));

        assert!(effect.innings_closed);
        assert!(card.is_all_out());
        assert_eq!(card.batting().len(), 3);
    }

    #[test]
    fn closes_when_overs_run_out_or_target_passed() {
        let mut card = scorecard(11);
        let bowlers = ["bowl-1", "bowl-2"];
        for over in 0..2 {
            for _ in 0..6 {
                bowl(&mut card, DeliveryOutcome::dot(bowlers[over]));
            }
        }
        assert!(card.overs_exhausted());
        assert!(card.is_closed());

        let mut chase =
            InningsScorecard::open(2, &lineup("bat", 11), &lineup("bowl", 11), 12, Some(5));
        assert!(!bowl(&mut chase, DeliveryOutcome::runs("bowl-1", 4)).innings_closed);
        assert!(bowl(&mut chase, DeliveryOutcome::runs("bowl-1", 1)).innings_closed);
    }
}
