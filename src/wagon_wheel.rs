//! Wagon-wheel geometry.
//!
//! Shots are stored as polar coordinates around the pitch: angle in degrees
//! clockwise from straight down the ground (up on screen), distance as a
//! percentage of the boundary. Screen coordinates grow rightwards and
//! downwards.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::ball::{Ball, ShotPlacement, ShotType};

pub const MAX_DISTANCE: f64 = 100.0;
const FULL_TURN: f64 = 360.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("field radius must be a positive number, got {0}")]
    InvalidRadius(f64),
}

/// The drawn field: a circle of `max_radius` around `center`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldGeometry {
    center_x: f64,
    center_y: f64,
    max_radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarPoint {
    pub angle: f64,
    pub distance: f64,
}

impl PolarPoint {
    pub fn into_placement(self, shot_type: Option<ShotType>) -> ShotPlacement {
        ShotPlacement {
            angle: self.angle,
            distance: self.distance,
            shot_type,
        }
    }
}

impl FieldGeometry {
    pub fn new(center_x: f64, center_y: f64, max_radius: f64) -> Result<Self, GeometryError> {
        if !(max_radius.is_finite() && max_radius > 0.0) {
            return Err(GeometryError::InvalidRadius(max_radius));
        }
        Ok(Self {
            center_x,
            center_y,
            max_radius,
        })
    }

    /// Square canvas of side `size` with the field filling it.
    pub fn square(size: f64) -> Result<Self, GeometryError> {
        Self::new(size / 2.0, size / 2.0, size / 2.0)
    }

    /// Pointer position to polar shot coordinates. Points beyond the
    /// boundary are pulled in to distance 100.
    pub fn polar_from_pointer(&self, x: f64, y: f64) -> PolarPoint {
        let (dx, dy) = (x - self.center_x, y - self.center_y);
        let radius = dx.hypot(dy);

        PolarPoint {
            angle: normalize_angle(dy.atan2(dx).to_degrees() + 90.0),
            distance: (radius / self.max_radius * MAX_DISTANCE).min(MAX_DISTANCE),
        }
    }

    /// Polar shot coordinates back to a point on the canvas.
    pub fn pointer_from_polar(&self, angle: f64, distance: f64) -> (f64, f64) {
        let theta = (angle - 90.0).to_radians();
        let radius = distance.clamp(0.0, MAX_DISTANCE) / MAX_DISTANCE * self.max_radius;
        (
            self.center_x + radius * theta.cos(),
            self.center_y + radius * theta.sin(),
        )
    }
}

/// Maps any finite angle into `[0, 360)`.
pub fn normalize_angle(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(FULL_TURN);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= FULL_TURN {
        0.0
    } else {
        wrapped
    }
}

/// A recorded shot as drawn on the wagon wheel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shot {
    pub angle: f64,
    pub distance: f64,
    pub runs: u32,
    pub is_wicket: bool,
    pub shot_type: Option<ShotType>,
}

impl Shot {
    /// `None` for deliveries recorded without a placement.
    pub fn from_ball(ball: &Ball) -> Option<Self> {
        let placement = ball.shot()?;
        Some(Self {
            angle: placement.angle,
            distance: placement.distance,
            runs: ball.batter_runs(),
            is_wicket: ball.is_wicket(),
            shot_type: placement.shot_type,
        })
    }

    pub fn is_four(&self) -> bool {
        self.runs == 4
    }

    pub fn is_six(&self) -> bool {
        self.runs == 6
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ShotFilter {
    #[default]
    All,
    Fours,
    Sixes,
    Wickets,
    /// Shots that were run rather than hit to the boundary.
    Runs,
}

impl ShotFilter {
    pub fn matches(self, shot: &Shot) -> bool {
        match self {
            ShotFilter::All => true,
            ShotFilter::Fours => shot.is_four(),
            ShotFilter::Sixes => shot.is_six(),
            ShotFilter::Wickets => shot.is_wicket,
            ShotFilter::Runs => shot.runs > 0 && !shot.is_four() && !shot.is_six(),
        }
    }
}

pub fn shots_from_balls<'a>(balls: impl IntoIterator<Item = &'a Ball>) -> Vec<Shot> {
    balls.into_iter().filter_map(Shot::from_ball).collect()
}

/// Borrowing view of the shots matching `filter`; the list itself is untouched.
pub fn filter_shots(shots: &[Shot], filter: ShotFilter) -> Vec<&Shot> {
    shots.iter().filter(|shot| filter.matches(shot)).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WagonWheelSummary {
    pub total: usize,
    pub fours: usize,
    pub sixes: usize,
    pub wickets: usize,
    pub runs: usize,
    pub total_runs: u32,
}

pub fn summarize(shots: &[Shot]) -> WagonWheelSummary {
    let count = |filter: ShotFilter| shots.iter().filter(|s| filter.matches(s)).count();
    WagonWheelSummary {
        total: shots.len(),
        fours: count(ShotFilter::Fours),
        sixes: count(ShotFilter::Sixes),
        wickets: count(ShotFilter::Wickets),
        runs: count(ShotFilter::Runs),
        total_runs: shots.iter().map(|s| s.runs).sum(),
    }
}
