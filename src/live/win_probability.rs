//! Win-probability indicator for the live display.
//!
//! This is a presentation heuristic, not a statistical model. It nudges a
//! number between 0 and 100 up on boundaries and down on wickets so the live
//! screen has something that moves. Nothing downstream should treat it as a
//! real probability.

use crate::ball::{Ball, OverSummary};

pub const MIN_PROBABILITY: f64 = 0.0;
pub const MAX_PROBABILITY: f64 = 100.0;

/// What the model gets to see after each delivery.
#[derive(Debug, Clone, Copy)]
pub struct ProbabilityContext<'a> {
    pub ball: &'a Ball,
    /// Set when this ball completed an over.
    pub completed_over: Option<&'a OverSummary>,
    pub innings_number: u8,
}

/// Pluggable win-probability strategy. Values are from the batting side's
/// point of view; the caller clamps every result to `[0, 100]`.
pub trait WinProbabilityModel: Send + Sync {
    fn initial(&self) -> f64 {
        50.0
    }

    fn after_delivery(&self, current: f64, context: &ProbabilityContext<'_>) -> f64;

    /// The batting side changes at the break, so the view flips.
    fn at_innings_break(&self, current: f64) -> f64 {
        MAX_PROBABILITY - current
    }

    fn model_name(&self) -> &'static str;
}

/// Clamps into `[0, 100]`; a non-finite value keeps the previous one.
pub fn clamp_probability(previous: f64, next: f64) -> f64 {
    if next.is_finite() {
        next.clamp(MIN_PROBABILITY, MAX_PROBABILITY)
    } else {
        previous.clamp(MIN_PROBABILITY, MAX_PROBABILITY)
    }
}

/// Default heuristic: small bumps for boundaries and big overs, a sharp drop
/// for each wicket.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentumHeuristic {
    pub boundary_bonus: f64,
    pub big_over_bonus: f64,
    pub big_over_threshold: u32,
    pub wicket_penalty: f64,
}

impl Default for MomentumHeuristic {
    fn default() -> Self {
        Self {
            boundary_bonus: 2.0,
            big_over_bonus: 2.0,
            big_over_threshold: 12,
            wicket_penalty: 5.0,
        }
    }
}

impl WinProbabilityModel for MomentumHeuristic {
    fn after_delivery(&self, current: f64, context: &ProbabilityContext<'_>) -> f64 {
        let mut next = current;
        if context.ball.is_boundary() {
            next += self.boundary_bonus;
        }
        if context.ball.is_wicket() {
            next -= self.wicket_penalty;
        }
        if context
            .completed_over
            .is_some_and(|over| over.runs >= self.big_over_threshold)
        {
            next += self.big_over_bonus;
        }
        next
    }

    fn model_name(&self) -> &'static str {
        "MomentumHeuristic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::{DeliveryOutcome, WicketKind};

    fn context(ball: &Ball) -> ProbabilityContext<'_> {
        ProbabilityContext {
            ball,
            completed_over: None,
            innings_number: 1,
        }
    }

    #[test]
    fn boundaries_raise_and_wickets_drop() {
        let model = MomentumHeuristic::default();
        let six = DeliveryOutcome::runs("b", 6).into_ball(1, "s").unwrap();
        let wicket = DeliveryOutcome::wicket("b", WicketKind::Bowled, "s")
            .into_ball(2, "s")
            .unwrap();

        assert_eq!(model.after_delivery(50.0, &context(&six)), 52.0);
        assert_eq!(model.after_delivery(50.0, &context(&wicket)), 45.0);
    }

    #[test]
    fn big_over_adds_bonus() {
        let model = MomentumHeuristic::default();
        let ball = DeliveryOutcome::runs("b", 1).into_ball(6, "s").unwrap();
        let over = OverSummary {
            number: 4,
            bowler_id: "b".into(),
            runs: 15,
            wickets: 0,
            legal_deliveries: 6,
            is_maiden: false,
            cumulative_runs: 40,
            cumulative_wickets: 1,
        };
        let context = ProbabilityContext {
            ball: &ball,
            completed_over: Some(&over),
            innings_number: 1,
        };

        assert_eq!(model.after_delivery(50.0, &context), 52.0);
    }

    #[test]
    fn clamps_into_bounds() {
        assert_eq!(clamp_probability(50.0, 104.0), 100.0);
        assert_eq!(clamp_probability(50.0, -3.0), 0.0);
        assert_eq!(clamp_probability(42.0, f64::NAN), 42.0);
        assert_eq!(MomentumHeuristic::default().at_innings_break(70.0), 30.0);
    }
}
