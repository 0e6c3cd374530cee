// Ball-by-ball data model
//
// A delivery enters the system as a loosely-shaped `DeliveryOutcome`, is
// validated into an immutable `Ball`, and is folded into overs and innings
// totals by `InningsTally`.

pub use models::{
    Ball, Extra, ExtraKind, PlayerId, ShotPlacement, ShotType, Wicket, WicketKind,
    ILLEGAL_DELIVERY_PENALTY, MAX_BAT_RUNS, MAX_EXTRA_RUNS,
};
pub use outcome::DeliveryOutcome;
pub use over::{
    balls_from_overs_notation, format_overs, overs_notation, InningsTally, Over, OverSummary,
    BALLS_PER_OVER,
};

mod models;
mod outcome;
mod over;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BallError {
    #[error("delivery recorded without a bowler")]
    MissingBowler,

    #[error("bat runs {0} exceed the maximum of {}", MAX_BAT_RUNS)]
    BatRunsOutOfRange(u8),

    #[error("{0} extra runs recorded without an extra kind")]
    ExtraRunsWithoutKind(u8),

    #[error("{0} extra runs exceed the maximum of {}", MAX_EXTRA_RUNS)]
    ExtraRunsOutOfRange(u8),

    #[error("bat runs cannot be scored off a {0}")]
    BatRunsOnExtra(ExtraKind),

    #[error("a {0} must carry at least one run, including any penalty")]
    MissingPenalty(ExtraKind),

    #[error("dismissal details given for a delivery not marked as a wicket")]
    InconsistentWicket,

    #[error("wicket recorded without a dismissal kind")]
    MissingWicketKind,

    #[error("wicket recorded without a dismissed player")]
    MissingDismissedPlayer,

    #[error("{kind} is not possible off a {extra}")]
    ImpossibleDismissal { kind: WicketKind, extra: ExtraKind },

    #[error("{kind} can only dismiss the batter on strike, not {dismissed}")]
    DismissalNotOnStrike { kind: WicketKind, dismissed: PlayerId },

    #[error("shot placement out of range: {0}")]
    ShotOutOfRange(String),

    #[error("over {0} already has {} legal deliveries", BALLS_PER_OVER)]
    OverComplete(u32),
}
