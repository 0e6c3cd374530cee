use serde::{Deserialize, Serialize};

use super::{
    Ball, BallError, Extra, ExtraKind, PlayerId, ShotPlacement, Wicket, WicketKind,
    ILLEGAL_DELIVERY_PENALTY, MAX_BAT_RUNS, MAX_EXTRA_RUNS,
};

/// Raw scorer input for one delivery, as entered on the scoring screen.
///
/// The shape is deliberately loose so it can be deserialized straight from a
/// client payload; [`DeliveryOutcome::into_ball`] is the only way to turn it
/// into a [`Ball`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    pub bowler_id: PlayerId,
    #[serde(default)]
    pub bat_runs: u8,
    #[serde(default)]
    pub extra_kind: Option<ExtraKind>,
    #[serde(default)]
    pub extra_runs: u8,
    #[serde(default)]
    pub is_wicket: bool,
    #[serde(default)]
    pub wicket_kind: Option<WicketKind>,
    #[serde(default)]
    pub dismissed_player_id: Option<PlayerId>,
    #[serde(default)]
    pub fielder_id: Option<PlayerId>,
    #[serde(default)]
    pub shot: Option<ShotPlacement>,
}

impl DeliveryOutcome {
    /// A legal delivery with `runs` off the bat.
    pub fn runs(bowler_id: impl Into<PlayerId>, runs: u8) -> Self {
        Self {
            bowler_id: bowler_id.into(),
            bat_runs: runs,
            ..Self::default()
        }
    }

    pub fn dot(bowler_id: impl Into<PlayerId>) -> Self {
        Self::runs(bowler_id, 0)
    }

    /// An extra of the given kind. For wides and no-balls `runs` includes the penalty.
    pub fn extra(bowler_id: impl Into<PlayerId>, kind: ExtraKind, runs: u8) -> Self {
        Self {
            bowler_id: bowler_id.into(),
            extra_kind: Some(kind),
            extra_runs: runs,
            ..Self::default()
        }
    }

    pub fn wide(bowler_id: impl Into<PlayerId>) -> Self {
        Self::extra(bowler_id, ExtraKind::Wide, ILLEGAL_DELIVERY_PENALTY)
    }

    /// A no-ball with `bat_runs` struck off it.
    pub fn no_ball(bowler_id: impl Into<PlayerId>, bat_runs: u8) -> Self {
        Self {
            bat_runs,
            ..Self::extra(bowler_id, ExtraKind::NoBall, ILLEGAL_DELIVERY_PENALTY)
        }
    }

    pub fn wicket(
        bowler_id: impl Into<PlayerId>,
        kind: WicketKind,
        dismissed_player_id: impl Into<PlayerId>,
    ) -> Self {
        Self {
            bowler_id: bowler_id.into(),
            ..Self::default()
        }
        .with_wicket(kind, dismissed_player_id)
    }

    pub fn with_wicket(mut self, kind: WicketKind, dismissed_player_id: impl Into<PlayerId>) -> Self {
        self.is_wicket = true;
        self.wicket_kind = Some(kind);
        self.dismissed_player_id = Some(dismissed_player_id.into());
        self
    }

    pub fn with_fielder(mut self, fielder_id: impl Into<PlayerId>) -> Self {
        self.fielder_id = Some(fielder_id.into());
        self
    }

    pub fn with_shot(mut self, shot: ShotPlacement) -> Self {
        self.shot = Some(shot);
        self
    }

    /// Validates the outcome and builds the immutable [`Ball`].
    ///
    /// `sequence` is the delivery's position within its over and `striker_id`
    /// the batter on strike when it was bowled.
    pub fn into_ball(self, sequence: u8, striker_id: &str) -> Result<Ball, BallError> {
        if self.bowler_id.trim().is_empty() {
            return Err(BallError::MissingBowler);
        }
        if self.bat_runs > MAX_BAT_RUNS {
            return Err(BallError::BatRunsOutOfRange(self.bat_runs));
        }

        let extra = self.validate_extra()?;
        let wicket = self.validate_wicket(extra.map(|e| e.kind), striker_id)?;

        if let Some(shot) = &self.shot {
            shot.validate()?;
        }

        Ok(Ball {
            sequence,
            bowler_id: self.bowler_id,
            striker_id: striker_id.to_string(),
            bat_runs: self.bat_runs,
            extra,
            wicket,
            shot: self.shot,
        })
    }

    fn validate_extra(&self) -> Result<Option<Extra>, BallError> {
        let Some(kind) = self.extra_kind else {
            if self.extra_runs > 0 {
                return Err(BallError::ExtraRunsWithoutKind(self.extra_runs));
            }
            return Ok(None);
        };

        if self.extra_runs > MAX_EXTRA_RUNS {
            return Err(BallError::ExtraRunsOutOfRange(self.extra_runs));
        }

        match kind {
            ExtraKind::Wide | ExtraKind::Bye | ExtraKind::LegBye if self.bat_runs > 0 => {
                Err(BallError::BatRunsOnExtra(kind))
            }
            ExtraKind::Wide | ExtraKind::NoBall if self.extra_runs < ILLEGAL_DELIVERY_PENALTY => {
                Err(BallError::MissingPenalty(kind))
            }
            ExtraKind::Bye | ExtraKind::LegBye if self.extra_runs == 0 => {
                Err(BallError::MissingPenalty(kind))
            }
            _ => Ok(Some(Extra {
                kind,
                runs: self.extra_runs,
            })),
        }
    }

    fn validate_wicket(
        &self,
        extra: Option<ExtraKind>,
        striker_id: &str,
    ) -> Result<Option<Wicket>, BallError> {
        if !self.is_wicket {
            if self.wicket_kind.is_some() || self.dismissed_player_id.is_some() {
                return Err(BallError::InconsistentWicket);
            }
            return Ok(None);
        }

        let kind = self.wicket_kind.ok_or(BallError::MissingWicketKind)?;
        let dismissed = self
            .dismissed_player_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or(BallError::MissingDismissedPlayer)?;

        if let Some(extra) = extra.filter(|extra| !kind.possible_on(Some(*extra))) {
            return Err(BallError::ImpossibleDismissal { kind, extra });
        }
        if kind.requires_striker() && dismissed != striker_id {
            return Err(BallError::DismissalNotOnStrike { kind, dismissed });
        }

        let fielder_id = match kind {
            WicketKind::CaughtAndBowled => Some(self.bowler_id.clone()),
            _ => self.fielder_id.clone(),
        };

        Ok(Some(Wicket {
            kind,
            dismissed_player_id: dismissed,
            fielder_id,
        }))
    }
}
