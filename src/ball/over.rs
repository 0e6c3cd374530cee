use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Ball, BallError, PlayerId};

pub const BALLS_PER_OVER: u32 = 6;

/// Cricket overs notation for a legal-ball count: 22 balls is `3.4`.
pub fn overs_notation(legal_balls: u32) -> f64 {
    f64::from(legal_balls / BALLS_PER_OVER) + f64::from(legal_balls % BALLS_PER_OVER) / 10.0
}

pub fn format_overs(legal_balls: u32) -> String {
    format!(
        "{}.{}",
        legal_balls / BALLS_PER_OVER,
        legal_balls % BALLS_PER_OVER
    )
}

/// Inverse of [`overs_notation`]. Returns `None` for negative values, a
/// ball digit above 5, or a count too large for a `u32`.
pub fn balls_from_overs_notation(overs: f64) -> Option<u32> {
    if !overs.is_finite() || overs < 0.0 {
        return None;
    }
    let whole = overs.trunc();
    let partial = ((overs - whole) * 10.0).round();
    if partial >= f64::from(BALLS_PER_OVER) {
        return None;
    }
    if whole > f64::from(u32::MAX) {
        return None;
    }
    // Both parts are non-negative integers in range at this point.
    (whole as u32)
        .checked_mul(BALLS_PER_OVER)?
        .checked_add(partial as u32)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverSummary {
    /// 1-based over number within the innings.
    pub number: u32,
    pub bowler_id: PlayerId,
    pub runs: u32,
    pub wickets: u32,
    pub legal_deliveries: u32,
    pub is_maiden: bool,
    /// Innings total at the end of this over.
    pub cumulative_runs: u32,
    pub cumulative_wickets: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Over {
    number: u32,
    balls: Vec<Ball>,
}

impl Over {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            balls: Vec::new(),
        }
    }

    /// Appends a delivery. Fails once six legal deliveries have been bowled.
    pub fn push(&mut self, ball: Ball) -> Result<(), BallError> {
        if self.is_complete() {
            return Err(BallError::OverComplete(self.number));
        }
        self.balls.push(ball);
        Ok(())
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn bowler_id(&self) -> Option<&str> {
        self.balls.first().map(Ball::bowler_id)
    }

    pub fn legal_deliveries(&self) -> u32 {
        self.balls.iter().filter(|b| b.is_legal_delivery()).count() as u32
    }

    pub fn is_complete(&self) -> bool {
        self.legal_deliveries() >= BALLS_PER_OVER
    }

    pub fn runs(&self) -> u32 {
        self.balls.iter().map(Ball::runs_from_ball).sum()
    }

    pub fn wickets(&self) -> u32 {
        self.balls.iter().filter(|b| b.is_wicket()).count() as u32
    }

    pub fn bowler_runs_conceded(&self) -> u32 {
        self.balls.iter().map(Ball::bowler_runs_conceded).sum()
    }

    /// A complete over with nothing charged to the bowler. Byes and leg-byes
    /// do not spoil a maiden.
    pub fn is_maiden(&self) -> bool {
        self.is_complete() && self.bowler_runs_conceded() == 0
    }
}

/// Running fold of an innings' deliveries into overs and totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InningsTally {
    overs: Vec<Over>,
    summaries: Vec<OverSummary>,
    runs: u32,
    wickets: u32,
    legal_balls: u32,
    extras: u32,
}

impl InningsTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a delivery into the current over, opening a new over when the
    /// previous one is complete. Returns the over's summary when this ball
    /// completes it.
    pub fn push(&mut self, ball: Ball) -> Option<OverSummary> {
        if self.current_over().map_or(true, Over::is_complete) {
            let number = self.overs.len() as u32 + 1;
            self.overs.push(Over::new(number));
        }

        let runs = ball.runs_from_ball();
        let extras = ball.extra_runs();
        let is_wicket = ball.is_wicket();
        let is_legal = ball.is_legal_delivery();

        let index = self.overs.len() - 1;
        let over = &mut self.overs[index];
        if let Err(err) = over.push(ball) {
            warn!(error = %err, "delivery not added to innings tally");
            return None;
        }

        self.runs = self.runs.saturating_add(runs);
        self.extras = self.extras.saturating_add(extras);
        if is_wicket {
            self.wickets += 1;
        }
        if is_legal {
            self.legal_balls += 1;
        }

        if !over.is_complete() {
            return None;
        }

        let summary = OverSummary {
            number: over.number,
            bowler_id: over.bowler_id().unwrap_or_default().to_string(),
            runs: over.runs(),
            wickets: over.wickets(),
            legal_deliveries: over.legal_deliveries(),
            is_maiden: over.is_maiden(),
            cumulative_runs: self.runs,
            cumulative_wickets: self.wickets,
        };
        self.summaries.push(summary.clone());
        Some(summary)
    }

    pub fn overs(&self) -> &[Over] {
        &self.overs
    }

    pub fn current_over(&self) -> Option<&Over> {
        self.overs.last()
    }

    /// The over still being bowled, if any.
    pub fn over_in_progress(&self) -> Option<&Over> {
        self.current_over().filter(|over| !over.is_complete())
    }

    /// Sequence number the next delivery will carry within its over.
    pub fn next_sequence(&self) -> u8 {
        self.over_in_progress()
            .map_or(1, |over| over.balls().len() as u8 + 1)
    }

    pub fn completed_overs(&self) -> &[OverSummary] {
        &self.summaries
    }

    pub fn runs(&self) -> u32 {
        self.runs
    }

    pub fn wickets(&self) -> u32 {
        self.wickets
    }

    pub fn legal_balls(&self) -> u32 {
        self.legal_balls
    }

    pub fn extras(&self) -> u32 {
        self.extras
    }

    pub fn overs_bowled(&self) -> String {
        format_overs(self.legal_balls)
    }

    pub fn balls(&self) -> impl Iterator<Item = &Ball> {
        self.overs.iter().flat_map(|over| over.balls.iter())
    }

    pub fn last_ball(&self) -> Option<&Ball> {
        self.current_over().and_then(|over| over.balls.last())
    }
}
