use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};

use super::{
    clamp_probability, FallOfWicket, InningsScorecard, LiveScoringError, MatchSetup, MatchState,
    ProbabilityContext, WinProbabilityModel,
};
use crate::ball::{DeliveryOutcome, PlayerId, BALLS_PER_OVER};
use crate::config::{MatchConfig, MAX_OVERS_PER_INNINGS};
use crate::match_data::{BattingStatLine, BowlingStatLine, MatchDocument, MatchResult};
use crate::shared::{ratio_or_zero, round_to_two};

pub const INNINGS_PER_MATCH: usize = 2;

/// Everything the live display needs after a change to the match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSnapshot {
    pub match_id: String,
    pub state: MatchState,
    /// 0 before the first ball, then 1 or 2.
    pub innings_number: u8,
    pub batting_team_id: Option<String>,
    pub bowling_team_id: Option<String>,
    pub runs: u32,
    pub wickets: u32,
    pub overs: String,
    pub legal_balls: u32,
    pub last_balls: Vec<String>,
    pub run_rate: f64,
    /// `None` when not chasing or when no balls remain.
    pub required_run_rate: Option<f64>,
    pub target: Option<u32>,
    /// Batting side's point of view.
    pub win_probability: f64,
    pub striker: Option<PlayerId>,
    pub non_striker: Option<PlayerId>,
    pub current_bowler: Option<PlayerId>,
    pub previous_over_bowler: Option<PlayerId>,
    pub bowling_side: Vec<PlayerId>,
    pub batting: Vec<BattingStatLine>,
    pub bowling: Vec<BowlingStatLine>,
    pub fall_of_wickets: Vec<FallOfWicket>,
    pub result: Option<MatchResult>,
    pub suspension_reason: Option<String>,
}

/// A match in progress.
///
/// Owns its innings and is the only thing allowed to change them: every
/// change goes through one of the transition methods below, which either
/// succeed completely or leave the match untouched.
pub struct LiveMatch {
    id: String,
    team1_id: String,
    team2_id: String,
    state: MatchState,
    config: MatchConfig,
    model: Arc<dyn WinProbabilityModel>,
    innings: Vec<InningsScorecard>,
    setup: Option<MatchSetup>,
    last_balls: VecDeque<String>,
    win_probability: f64,
    result: Option<MatchResult>,
    suspension_reason: Option<String>,
    started_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for LiveMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveMatch")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("model", &self.model.model_name())
            .field("innings", &self.innings.len())
            .finish()
    }
}

impl LiveMatch {
    pub fn new(
        id: impl Into<String>,
        team1_id: impl Into<String>,
        team2_id: impl Into<String>,
        config: MatchConfig,
        model: Arc<dyn WinProbabilityModel>,
    ) -> Result<Self, LiveScoringError> {
        let (team1_id, team2_id) = (team1_id.into(), team2_id.into());
        if team1_id.trim().is_empty() || team2_id.trim().is_empty() {
            return Err(LiveScoringError::InvalidSetup("team ids cannot be empty".into()));
        }
        if team1_id == team2_id {
            return Err(LiveScoringError::InvalidSetup(format!(
                "{team1_id} cannot play itself"
            )));
        }
        if config.overs_per_innings == 0 || config.last_balls_feed_size == 0 {
            return Err(LiveScoringError::InvalidSetup(
                "overs per innings and feed size must be positive".into(),
            ));
        }
        if config.overs_per_innings > MAX_OVERS_PER_INNINGS {
            return Err(LiveScoringError::InvalidSetup(format!(
                "{} overs per innings exceeds the maximum of {MAX_OVERS_PER_INNINGS}",
                config.overs_per_innings
            )));
        }

        let win_probability = clamp_probability(50.0, model.initial());
        Ok(Self {
            id: id.into(),
            team1_id,
            team2_id,
            state: MatchState::Scheduled,
            last_balls: VecDeque::with_capacity(config.last_balls_feed_size),
            config,
            model,
            innings: Vec::with_capacity(INNINGS_PER_MATCH),
            setup: None,
            win_probability,
            result: None,
            suspension_reason: None,
            started_at: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn result(&self) -> Option<&MatchResult> {
        self.result.as_ref()
    }

    pub fn innings(&self) -> &[InningsScorecard] {
        &self.innings
    }

    pub fn setup(&self) -> Option<&MatchSetup> {
        self.setup.as_ref()
    }

    fn ensure_transition(
        &self,
        next: MatchState,
        action: &'static str,
    ) -> Result<(), LiveScoringError> {
        if self.state.can_transition_to(next) {
            Ok(())
        } else {
            Err(LiveScoringError::InvalidStateTransition {
                state: self.state,
                action,
            })
        }
    }

    /// Toss and lineups in, first innings opened, match live.
    pub fn start(&mut self, setup: MatchSetup) -> Result<LiveSnapshot, LiveScoringError> {
        self.ensure_transition(MatchState::Live, "start the match")?;
        setup.validate(&self.team1_id, &self.team2_id)?;

        let (batting, bowling) = setup.batting_order();
        let first =
            InningsScorecard::open(1, batting, bowling, self.config.max_legal_balls(), None);
        info!(
            match_id = %self.id,
            batting = %first.batting_team_id(),
            toss_winner = %setup.toss.winner_team_id,
            "Match started"
        );

        self.innings.push(first);
        self.setup = Some(setup);
        self.state = MatchState::Live;
        self.started_at = Some(Utc::now());
        Ok(self.snapshot())
    }

    /// Validates and applies one delivery. On error nothing changes.
    pub fn record_delivery(
        &mut self,
        outcome: DeliveryOutcome,
    ) -> Result<LiveSnapshot, LiveScoringError> {
        if !self.state.accepts_deliveries() {
            return Err(LiveScoringError::InvalidStateTransition {
                state: self.state,
                action: "record a delivery",
            });
        }
        let Some(innings) = self.innings.last_mut() else {
            return Err(LiveScoringError::InvalidStateTransition {
                state: self.state,
                action: "record a delivery",
            });
        };

        let ball = innings.prepare(outcome)?;
        let label = ball.feed_label();
        let effect = innings.apply(ball);

        if let Some(ball) = innings.tally().last_ball() {
            let context = ProbabilityContext {
                ball,
                completed_over: effect.completed_over.as_ref(),
                innings_number: innings.number(),
            };
            let next = self.model.after_delivery(self.win_probability, &context);
            self.win_probability = clamp_probability(self.win_probability, next);
        }

        self.last_balls.push_back(label);
        while self.last_balls.len() > self.config.last_balls_feed_size {
            self.last_balls.pop_front();
        }

        if let Some(over) = &effect.completed_over {
            debug!(
                match_id = %self.id,
                over = over.number,
                runs = over.runs,
                total = over.cumulative_runs,
                "Over completed"
            );
        }

        if effect.innings_closed {
            self.close_innings();
        }

        Ok(self.snapshot())
    }

    fn close_innings(&mut self) {
        let Some(closed) = self.innings.last() else {
            return;
        };
        let runs = closed.tally().runs();
        info!(
            match_id = %self.id,
            innings = closed.number(),
            runs,
            wickets = closed.tally().wickets(),
            overs = %closed.overs(),
            "Innings closed"
        );

        if self.innings.len() < INNINGS_PER_MATCH {
            let target = runs + 1;
            let second = self.setup.as_ref().map(|setup| {
                let (first_batting, first_bowling) = setup.batting_order();
                InningsScorecard::open(
                    2,
                    first_bowling,
                    first_batting,
                    self.config.max_legal_balls(),
                    Some(target),
                )
            });
            if let Some(second) = second {
                self.innings.push(second);
                self.last_balls.clear();
                let flipped = self.model.at_innings_break(self.win_probability);
                self.win_probability = clamp_probability(self.win_probability, flipped);
                return;
            }
        }

        let result = self.decide_result();
        info!(match_id = %self.id, result = ?result, "Match completed");
        self.result = Some(result);
        self.state = MatchState::Completed;
    }

    fn decide_result(&self) -> MatchResult {
        let (Some(first), Some(second)) = (self.innings.first(), self.innings.get(1)) else {
            return MatchResult::NoResult;
        };
        let (defended, chased) = (first.tally().runs(), second.tally().runs());
        let winner = match chased.cmp(&defended) {
            std::cmp::Ordering::Greater => second.batting_team_id(),
            std::cmp::Ordering::Less => first.batting_team_id(),
            std::cmp::Ordering::Equal => return MatchResult::Tie,
        };
        MatchResult::Won {
            team_id: winner.to_string(),
        }
    }

    pub fn suspend(&mut self, reason: impl Into<String>) -> Result<LiveSnapshot, LiveScoringError> {
        self.ensure_transition(MatchState::Suspended, "suspend the match")?;
        let reason = reason.into();
        info!(match_id = %self.id, reason = %reason, "Match suspended");
        self.suspension_reason = Some(reason);
        self.state = MatchState::Suspended;
        Ok(self.snapshot())
    }

    pub fn resume(&mut self) -> Result<LiveSnapshot, LiveScoringError> {
        if self.state != MatchState::Suspended {
            return Err(LiveScoringError::InvalidStateTransition {
                state: self.state,
                action: "resume the match",
            });
        }
        info!(match_id = %self.id, "Match resumed");
        self.suspension_reason = None;
        self.state = MatchState::Live;
        Ok(self.snapshot())
    }

    pub fn abandon(&mut self, reason: impl Into<String>) -> Result<LiveSnapshot, LiveScoringError> {
        self.ensure_transition(MatchState::Abandoned, "abandon the match")?;
        let reason = reason.into();
        info!(match_id = %self.id, reason = %reason, "Match abandoned");
        self.suspension_reason = Some(reason);
        self.result = Some(MatchResult::NoResult);
        self.state = MatchState::Abandoned;
        Ok(self.snapshot())
    }

    pub fn snapshot(&self) -> LiveSnapshot {
        let innings = self.innings.last();
        let tally = innings.map(InningsScorecard::tally);
        let runs = tally.map_or(0, |t| t.runs());
        let legal_balls = tally.map_or(0, |t| t.legal_balls());
        let target = innings.and_then(InningsScorecard::target);

        let run_rate = round_to_two(ratio_or_zero(
            f64::from(runs) * f64::from(BALLS_PER_OVER),
            f64::from(legal_balls),
        ));
        let required_run_rate = innings
            .filter(|_| self.state.accepts_deliveries() || self.state == MatchState::Suspended)
            .and_then(|innings| {
                let target = innings.target()?;
                let balls_remaining = innings.balls_remaining();
                if balls_remaining == 0 {
                    return None;
                }
                let needed = target.saturating_sub(runs);
                Some(round_to_two(
                    f64::from(needed) * f64::from(BALLS_PER_OVER) / f64::from(balls_remaining),
                ))
            });

        LiveSnapshot {
            match_id: self.id.clone(),
            state: self.state,
            innings_number: innings.map_or(0, InningsScorecard::number),
            batting_team_id: innings.map(|i| i.batting_team_id().to_string()),
            bowling_team_id: innings.map(|i| i.bowling_team_id().to_string()),
            runs,
            wickets: tally.map_or(0, |t| t.wickets()),
            overs: innings.map_or_else(|| "0.0".to_string(), InningsScorecard::overs),
            legal_balls,
            last_balls: self.last_balls.iter().cloned().collect(),
            run_rate,
            required_run_rate,
            target,
            win_probability: self.win_probability,
            striker: innings.and_then(|i| i.striker().map(str::to_string)),
            non_striker: innings.and_then(|i| i.non_striker().map(str::to_string)),
            current_bowler: innings.and_then(|i| i.current_bowler().map(str::to_string)),
            previous_over_bowler: innings
                .and_then(|i| i.previous_over_bowler().map(str::to_string)),
            bowling_side: innings.map_or_else(Vec::new, |i| i.fielding_side().to_vec()),
            batting: innings.map_or_else(Vec::new, |i| i.batting().to_vec()),
            bowling: innings.map_or_else(Vec::new, |i| {
                i.bowling().iter().map(|spell| spell.to_stat_line()).collect()
            }),
            fall_of_wickets: innings.map_or_else(Vec::new, |i| i.fall_of_wickets().to_vec()),
            result: self.result.clone(),
            suspension_reason: self.suspension_reason.clone(),
        }
    }

    /// The finished match in store form, ready for the career aggregator.
    pub fn to_match_document(&self) -> Result<MatchDocument, LiveScoringError> {
        if self.state != MatchState::Completed {
            return Err(LiveScoringError::InvalidStateTransition {
                state: self.state,
                action: "export the match",
            });
        }

        let (winner_id, result) = match &self.result {
            Some(MatchResult::Won { team_id }) => (Some(team_id.clone()), None),
            Some(MatchResult::Tie) => (None, Some("tie".to_string())),
            _ => (None, Some("no_result".to_string())),
        };

        Ok(MatchDocument {
            id: Some(self.id.clone()),
            status: Some(MatchState::Completed.to_string()),
            date: Some(self.started_at.unwrap_or_else(Utc::now)),
            team1_id: Some(self.team1_id.clone()),
            team2_id: Some(self.team2_id.clone()),
            winner_id,
            result,
            innings: self.innings.iter().map(InningsScorecard::to_document).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::WicketKind;
    use crate::live::{MomentumHeuristic, TeamLineup, TossDecision, TossResult};
    use crate::match_data::CompletedMatch;
    use rstest::rstest;

    fn lineup(team: &str) -> TeamLineup {
        TeamLineup::new(team, (1..=11).map(|i| format!("{team}-{i}")).collect())
    }

    fn setup() -> MatchSetup {
        MatchSetup::new(
            TossResult {
                winner_team_id: "lions".into(),
                decision: TossDecision::Bat,
            },
            lineup("lions"),
            lineup("tigers"),
        )
    }

    fn live_match(overs: u32) -> LiveMatch {
        let mut live = LiveMatch::new(
            "m1",
            "lions",
            "tigers",
            MatchConfig::default().with_overs_per_innings(overs),
            Arc::new(MomentumHeuristic::default()),
        )
        .unwrap();
        live.start(setup()).unwrap();
        live
    }

    /// Bowls a full over of `runs` per ball by `bowler`.
    fn bowl_over(live: &mut LiveMatch, bowler: &str, runs: u8) -> LiveSnapshot {
        let mut snapshot = live.snapshot();
        for _ in 0..6 {
            snapshot = live
                .record_delivery(DeliveryOutcome::runs(bowler, runs))
                .unwrap();
        }
        snapshot
    }

    #[test]
    fn rejects_delivery_before_start_and_after_completion() {
        let mut scheduled = LiveMatch::new(
            "m0",
            "lions",
            "tigers",
            MatchConfig::default(),
            Arc::new(MomentumHeuristic::default()),
        )
        .unwrap();
        assert_eq!(
            scheduled.record_delivery(DeliveryOutcome::dot("tigers-1")),
            Err(LiveScoringError::InvalidStateTransition {
                state: MatchState::Scheduled,
                action: "record a delivery",
            })
        );

        let mut live = live_match(1);
        bowl_over(&mut live, "tigers-1", 1);
        bowl_over(&mut live, "lions-1", 1);
        assert_eq!(live.state(), MatchState::Completed);
        assert!(matches!(
            live.record_delivery(DeliveryOutcome::dot("lions-2")),
            Err(LiveScoringError::InvalidStateTransition { .. })
        ));
    }

    #[rstest]
    #[case(0)]
    #[case(MAX_OVERS_PER_INNINGS + 1)]
    #[case(1_000_000_000)]
    fn rejects_out_of_range_overs(#[case] overs: u32) {
        let result = LiveMatch::new(
            "m0",
            "lions",
            "tigers",
            MatchConfig::default().with_overs_per_innings(overs),
            Arc::new(MomentumHeuristic::default()),
        );
        assert!(matches!(result, Err(LiveScoringError::InvalidSetup(_))));
    }

    #[test]
    fn longest_innings_is_accepted() {
        let live = live_match(MAX_OVERS_PER_INNINGS);
        assert_eq!(live.state(), MatchState::Live);
    }

    #[test]
    fn malformed_delivery_leaves_state_unchanged() {
        let mut live = live_match(20);
        live.record_delivery(DeliveryOutcome::runs("tigers-1", 4)).unwrap();
        let before = live.snapshot();

        let bad = DeliveryOutcome {
            is_wicket: true,
            ..DeliveryOutcome::dot("tigers-1")
        };
        assert!(matches!(
            live.record_delivery(bad),
            Err(LiveScoringError::MalformedBallEvent(_))
        ));
        assert_eq!(live.snapshot(), before);
    }

    #[test]
    fn feed_keeps_last_six_balls() {
        let mut live = live_match(20);
        for runs in [1, 2, 3, 4, 6, 0] {
            live.record_delivery(DeliveryOutcome::runs("tigers-1", runs))
                .unwrap();
        }
        let snapshot = live.record_delivery(DeliveryOutcome::wide("tigers-2")).unwrap();

        assert_eq!(snapshot.last_balls, vec!["2", "3", "4", "6", "•", "wd"]);
        assert_eq!(snapshot.runs, 17);
        assert_eq!(snapshot.overs, "1.0");
        assert_eq!(snapshot.run_rate, 17.0);
        assert_eq!(snapshot.required_run_rate, None);
    }

    #[test]
    fn win_probability_moves_and_stays_in_bounds() {
        let mut live = live_match(20);
        let snapshot = live.record_delivery(DeliveryOutcome::runs("tigers-1", 6)).unwrap();
        assert_eq!(snapshot.win_probability, 52.0);

        let mut snapshot = snapshot;
        for batter in ["lions-1", "lions-3", "lions-4", "lions-5", "lions-6"] {
            let striker = snapshot.striker.clone().unwrap();
            assert_eq!(striker, batter);
            snapshot = live
                .record_delivery(DeliveryOutcome::wicket("tigers-1", WicketKind::Bowled, striker))
                .unwrap();
        }
        assert_eq!(snapshot.win_probability, 27.0);
        assert!((0.0..=100.0).contains(&snapshot.win_probability));
    }

    #[test]
    fn chase_sets_target_and_required_rate() {
        let mut live = live_match(2);
        bowl_over(&mut live, "tigers-1", 1);
        let first = bowl_over(&mut live, "tigers-2", 1);

        assert_eq!(first.innings_number, 2);
        assert_eq!(first.target, Some(13));
        assert_eq!(first.batting_team_id.as_deref(), Some("tigers"));
        assert_eq!(first.required_run_rate, Some(6.5));
        assert!(first.last_balls.is_empty());

        let snapshot = live.record_delivery(DeliveryOutcome::runs("lions-1", 6)).unwrap();
        assert_eq!(snapshot.required_run_rate, Some(3.82));
    }

    #[test]
    fn chasing_side_wins_on_passing_target() {
        let mut live = live_match(2);
        bowl_over(&mut live, "tigers-1", 1);
        bowl_over(&mut live, "tigers-2", 0);

        live.record_delivery(DeliveryOutcome::runs("lions-1", 4)).unwrap();
        let snapshot = live.record_delivery(DeliveryOutcome::runs("lions-1", 4)).unwrap();

        assert_eq!(snapshot.state, MatchState::Completed);
        assert_eq!(
            snapshot.result,
            Some(MatchResult::Won {
                team_id: "tigers".into()
            })
        );
    }

    #[test]
    fn level_scores_are_a_tie() {
        let mut live = live_match(1);
        bowl_over(&mut live, "tigers-1", 1);
        bowl_over(&mut live, "lions-1", 1);

        assert_eq!(live.result(), Some(&MatchResult::Tie));
        let document = live.to_match_document().unwrap();
        assert_eq!(document.result.as_deref(), Some("tie"));
    }

    #[test]
    fn suspend_blocks_deliveries_until_resumed() {
        let mut live = live_match(20);
        let snapshot = live.suspend("rain").unwrap();
        assert_eq!(snapshot.suspension_reason.as_deref(), Some("rain"));
        assert!(live.record_delivery(DeliveryOutcome::dot("tigers-1")).is_err());
        assert!(live.suspend("again").is_err());

        live.resume().unwrap();
        assert!(live.record_delivery(DeliveryOutcome::dot("tigers-1")).is_ok());

        live.abandon("bad light").unwrap();
        assert_eq!(live.state(), MatchState::Abandoned);
        assert!(live.resume().is_err());
        assert!(live.to_match_document().is_err());
    }

    #[test]
    fn completed_match_converts_to_valid_document() {
        let mut live = live_match(1);
        live.record_delivery(
            DeliveryOutcome::wicket("tigers-1", WicketKind::Caught, "lions-1").with_fielder("tigers-4"),
        )
        .unwrap();
        for _ in 0..5 {
            live.record_delivery(DeliveryOutcome::runs("tigers-1", 2)).unwrap();
        }
        for _ in 0..3 {
            live.record_delivery(DeliveryOutcome::runs("lions-1", 4)).unwrap();
        }

        let document = live.to_match_document().unwrap();
        let completed = CompletedMatch::try_from(&document).unwrap();

        assert_eq!(completed.result.winner(), Some("tigers"));
        assert_eq!(completed.innings.len(), 2);
        assert_eq!(completed.innings[0].total_runs, 10);
        let figures: Vec<_> = completed.bowling_figures("tigers-1").collect();
        assert_eq!(figures[0].balls_bowled, 6);
        assert_eq!(figures[0].wickets, 1);
    }
}
