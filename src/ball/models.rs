use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use super::BallError;

pub type PlayerId = String;

/// Maximum runs a batter can score off a single delivery.
pub const MAX_BAT_RUNS: u8 = 6;

/// Ceiling for extras off one delivery (five wides plus the penalty, overthrows included).
pub const MAX_EXTRA_RUNS: u8 = 7;

/// Penalty run awarded for a wide or a no-ball.
pub const ILLEGAL_DELIVERY_PENALTY: u8 = 1;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ExtraKind {
    Wide,
    NoBall,
    Bye,
    LegBye,
}

impl ExtraKind {
    /// Wides and no-balls must be re-bowled and do not count toward the over.
    pub fn is_illegal_delivery(self) -> bool {
        matches!(self, ExtraKind::Wide | ExtraKind::NoBall)
    }

    /// Whether the extra runs go against the bowler's figures.
    pub fn charged_to_bowler(self) -> bool {
        self.is_illegal_delivery()
    }

    fn label(self) -> &'static str {
        match self {
            ExtraKind::Wide => "wd",
            ExtraKind::NoBall => "nb",
            ExtraKind::Bye => "b",
            ExtraKind::LegBye => "lb",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extra {
    pub kind: ExtraKind,
    /// Total extras off the delivery, including the wide/no-ball penalty.
    pub runs: u8,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum WicketKind {
    Bowled,
    Caught,
    CaughtAndBowled,
    Lbw,
    Stumped,
    RunOut,
    HitWicket,
    RetiredOut,
    ObstructingTheField,
}

impl WicketKind {
    /// Dismissals that count toward the bowler's wickets.
    pub fn credits_bowler(self) -> bool {
        !matches!(
            self,
            WicketKind::RunOut | WicketKind::RetiredOut | WicketKind::ObstructingTheField
        )
    }

    /// Dismissals that can only ever remove the batter on strike.
    pub fn requires_striker(self) -> bool {
        matches!(
            self,
            WicketKind::Bowled
                | WicketKind::Caught
                | WicketKind::CaughtAndBowled
                | WicketKind::Lbw
                | WicketKind::Stumped
                | WicketKind::HitWicket
        )
    }

    /// Whether this mode of dismissal is possible off the given kind of delivery.
    pub fn possible_on(self, extra: Option<ExtraKind>) -> bool {
        match extra {
            Some(ExtraKind::Wide) => matches!(
                self,
                WicketKind::Stumped
                    | WicketKind::RunOut
                    | WicketKind::HitWicket
                    | WicketKind::ObstructingTheField
            ),
            Some(ExtraKind::NoBall) => {
                matches!(self, WicketKind::RunOut | WicketKind::ObstructingTheField)
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wicket {
    pub kind: WicketKind,
    pub dismissed_player_id: PlayerId,
    pub fielder_id: Option<PlayerId>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ShotType {
    Defensive,
    Drive,
    Cut,
    Pull,
    Hook,
    Sweep,
    Flick,
    Glance,
    Loft,
    Edge,
    Other,
}

/// Where the ball went, in wagon-wheel polar coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotPlacement {
    /// Degrees clockwise from straight down the ground, in `[0, 360)`.
    pub angle: f64,
    /// Percentage of the boundary radius, in `[0, 100]`.
    pub distance: f64,
    #[serde(default)]
    pub shot_type: Option<ShotType>,
}

impl ShotPlacement {
    pub fn validate(&self) -> Result<(), BallError> {
        if !(self.angle.is_finite() && (0.0..360.0).contains(&self.angle)) {
            return Err(BallError::ShotOutOfRange(format!("angle {}", self.angle)));
        }
        if !(self.distance.is_finite() && (0.0..=100.0).contains(&self.distance)) {
            return Err(BallError::ShotOutOfRange(format!(
                "distance {}",
                self.distance
            )));
        }
        Ok(())
    }
}

/// A single recorded delivery.
///
/// Balls are only built through [`DeliveryOutcome::into_ball`](super::DeliveryOutcome::into_ball),
/// which rejects impossible shapes, and cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ball {
    pub(super) sequence: u8,
    pub(super) bowler_id: PlayerId,
    pub(super) striker_id: PlayerId,
    pub(super) bat_runs: u8,
    pub(super) extra: Option<Extra>,
    pub(super) wicket: Option<Wicket>,
    pub(super) shot: Option<ShotPlacement>,
}

impl Ball {
    /// Position of the delivery within its over, starting at 1.
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    pub fn bowler_id(&self) -> &str {
        &self.bowler_id
    }

    pub fn striker_id(&self) -> &str {
        &self.striker_id
    }

    pub fn bat_runs(&self) -> u8 {
        self.bat_runs
    }

    pub fn extra(&self) -> Option<&Extra> {
        self.extra.as_ref()
    }

    pub fn wicket(&self) -> Option<&Wicket> {
        self.wicket.as_ref()
    }

    pub fn shot(&self) -> Option<&ShotPlacement> {
        self.shot.as_ref()
    }

    pub fn is_wicket(&self) -> bool {
        self.wicket.is_some()
    }

    /// False for wides and no-balls. Only legal deliveries advance the over
    /// and the bowler's balls-bowled count.
    pub fn is_legal_delivery(&self) -> bool {
        self.extra
            .map_or(true, |extra| !extra.kind.is_illegal_delivery())
    }

    pub fn extra_runs(&self) -> u32 {
        self.extra.map_or(0, |extra| u32::from(extra.runs))
    }

    /// Runs added to the team total: bat runs plus extras.
    pub fn runs_from_ball(&self) -> u32 {
        u32::from(self.bat_runs) + self.extra_runs()
    }

    /// Runs credited to the striker. Bat runs off a no-ball belong to the
    /// batter; the penalty run does not.
    pub fn batter_runs(&self) -> u32 {
        u32::from(self.bat_runs)
    }

    /// Runs that go against the bowler. Byes and leg-byes are not charged.
    pub fn bowler_runs_conceded(&self) -> u32 {
        let charged_extras = match self.extra {
            Some(extra) if extra.kind.charged_to_bowler() => u32::from(extra.runs),
            _ => 0,
        };
        u32::from(self.bat_runs) + charged_extras
    }

    /// A wide is not a ball faced; everything else, no-balls included, is.
    pub fn counts_as_ball_faced(&self) -> bool {
        !matches!(self.extra, Some(Extra { kind: ExtraKind::Wide, .. }))
    }

    pub fn credits_bowler(&self) -> bool {
        self.wicket
            .as_ref()
            .is_some_and(|wicket| wicket.kind.credits_bowler())
    }

    pub fn is_four(&self) -> bool {
        self.bat_runs == 4
    }

    pub fn is_six(&self) -> bool {
        self.bat_runs == 6
    }

    pub fn is_boundary(&self) -> bool {
        self.is_four() || self.is_six()
    }

    /// Runs physically completed between the wickets, which decide whether
    /// the batters have changed ends.
    pub fn runs_run(&self) -> u32 {
        if self.is_boundary() {
            return 0;
        }
        match self.extra {
            Some(extra) if extra.kind.is_illegal_delivery() => {
                u32::from(self.bat_runs)
                    + u32::from(extra.runs.saturating_sub(ILLEGAL_DELIVERY_PENALTY))
            }
            Some(extra) => u32::from(extra.runs),
            None => u32::from(self.bat_runs),
        }
    }

    pub fn rotates_strike(&self) -> bool {
        self.runs_run() % 2 == 1
    }

    /// Short label for the recent-balls feed, e.g. `4`, `W`, `2wd`, `2lb`.
    pub fn feed_label(&self) -> String {
        if self.is_wicket() {
            return match self.extra {
                Some(extra) => format!("W+{}", extra.kind.label()),
                None => "W".to_string(),
            };
        }
        match self.extra {
            Some(extra) if extra.kind == ExtraKind::NoBall && self.bat_runs > 0 => {
                format!("{}nb", self.bat_runs)
            }
            Some(extra) if extra.kind.is_illegal_delivery() && extra.runs <= 1 => {
                extra.kind.label().to_string()
            }
            Some(extra) => format!("{}{}", extra.runs, extra.kind.label()),
            None if self.bat_runs == 0 => "•".to_string(),
            None => self.bat_runs.to_string(),
        }
    }
}
