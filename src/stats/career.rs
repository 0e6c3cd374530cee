use crate::ball::{format_overs, WicketKind, BALLS_PER_OVER};
use crate::match_data::CompletedMatch;
use crate::shared::{ratio_or_zero, round_to_two};

use super::{
    BattingCareer, BestFigures, BowlingCareer, FieldingCareer, PlayerCareerStats, StatsScope,
};

const FIFTY: u32 = 50;
const HUNDRED: u32 = 100;
const FIVE_WICKET_HAUL: u32 = 5;

/// Raw career counts for one player.
///
/// Built per match with [`from_match`](Self::from_match) and combined with
/// [`merge`](Self::merge). Merging is commutative and associative, so matches
/// can be folded in any order or in parallel; rates are only derived in
/// [`finalize`](Self::finalize).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CareerAccumulator {
    matches: u32,

    batting_innings: u32,
    times_out: u32,
    runs: u32,
    balls_faced: u32,
    fours: u32,
    sixes: u32,
    /// (runs, not out). A not-out ranks above the same score out.
    highest: Option<(u32, bool)>,
    fifties: u32,
    hundreds: u32,

    bowling_innings: u32,
    balls_bowled: u32,
    runs_conceded: u32,
    wickets: u32,
    maidens: u32,
    five_wicket_hauls: u32,
    figures: Vec<BestFigures>,

    catches: u32,
    stumpings: u32,
    run_outs: u32,
}

impl CareerAccumulator {
    /// Everything `player_id` contributed to one match.
    pub fn from_match(player_id: &str, record: &CompletedMatch) -> Self {
        let mut acc = Self::default();

        for line in record.batting_lines(player_id) {
            acc.batting_innings += 1;
            acc.runs = acc.runs.saturating_add(line.runs);
            acc.balls_faced = acc.balls_faced.saturating_add(line.balls);
            acc.fours = acc.fours.saturating_add(line.fours);
            acc.sixes = acc.sixes.saturating_add(line.sixes);
            if line.is_out {
                acc.times_out += 1;
            }
            if line.runs >= HUNDRED {
                acc.hundreds += 1;
            } else if line.runs >= FIFTY {
                acc.fifties += 1;
            }
            acc.highest = acc.highest.max(Some((line.runs, !line.is_out)));
        }

        for figures in record.bowling_figures(player_id) {
            acc.bowling_innings += 1;
            acc.balls_bowled = acc.balls_bowled.saturating_add(figures.balls_bowled);
            acc.runs_conceded = acc.runs_conceded.saturating_add(figures.runs_conceded);
            acc.wickets = acc.wickets.saturating_add(figures.wickets);
            acc.maidens = acc.maidens.saturating_add(figures.maidens);
            if figures.wickets >= FIVE_WICKET_HAUL {
                acc.five_wicket_hauls += 1;
            }
            acc.figures
                .push(BestFigures::new(figures.wickets, figures.runs_conceded));
        }

        let dismissals = record
            .innings
            .iter()
            .flat_map(|innings| innings.batting.iter())
            .filter_map(|line| line.dismissal.as_ref())
            .filter(|dismissal| dismissal.fielder_id.as_deref() == Some(player_id));
        for dismissal in dismissals {
            match dismissal.kind {
                WicketKind::Caught | WicketKind::CaughtAndBowled => acc.catches += 1,
                WicketKind::Stumped => acc.stumpings += 1,
                WicketKind::RunOut => acc.run_outs += 1,
                _ => {}
            }
        }

        if acc.appeared() {
            acc.matches = 1;
        }
        acc
    }

    /// Whether the player batted, bowled or took part in a dismissal.
    pub fn appeared(&self) -> bool {
        self.batting_innings > 0
            || self.bowling_innings > 0
            || self.catches + self.stumpings + self.run_outs > 0
    }

    pub fn batting_innings(&self) -> u32 {
        self.batting_innings
    }

    pub fn times_out(&self) -> u32 {
        self.times_out
    }

    pub fn runs(&self) -> u32 {
        self.runs
    }

    pub fn balls_faced(&self) -> u32 {
        self.balls_faced
    }

    pub fn wickets(&self) -> u32 {
        self.wickets
    }

    pub fn runs_conceded(&self) -> u32 {
        self.runs_conceded
    }

    pub fn balls_bowled(&self) -> u32 {
        self.balls_bowled
    }

    pub fn merge(mut self, other: Self) -> Self {
        self.matches = self.matches.saturating_add(other.matches);
        self.batting_innings = self.batting_innings.saturating_add(other.batting_innings);
        self.times_out = self.times_out.saturating_add(other.times_out);
        self.runs = self.runs.saturating_add(other.runs);
        self.balls_faced = self.balls_faced.saturating_add(other.balls_faced);
        self.fours = self.fours.saturating_add(other.fours);
        self.sixes = self.sixes.saturating_add(other.sixes);
        self.highest = self.highest.max(other.highest);
        self.fifties = self.fifties.saturating_add(other.fifties);
        self.hundreds = self.hundreds.saturating_add(other.hundreds);
        self.bowling_innings = self.bowling_innings.saturating_add(other.bowling_innings);
        self.balls_bowled = self.balls_bowled.saturating_add(other.balls_bowled);
        self.runs_conceded = self.runs_conceded.saturating_add(other.runs_conceded);
        self.wickets = self.wickets.saturating_add(other.wickets);
        self.maidens = self.maidens.saturating_add(other.maidens);
        self.five_wicket_hauls = self.five_wicket_hauls.saturating_add(other.five_wicket_hauls);
        self.figures.extend(other.figures);
        self.catches = self.catches.saturating_add(other.catches);
        self.stumpings = self.stumpings.saturating_add(other.stumpings);
        self.run_outs = self.run_outs.saturating_add(other.run_outs);
        self
    }

    pub fn finalize(self, player_id: &str, scope: StatsScope) -> PlayerCareerStats {
        let (highest_score, highest_not_out) = self.highest.unwrap_or((0, false));

        let batting = BattingCareer {
            innings: self.batting_innings,
            not_outs: self.batting_innings.saturating_sub(self.times_out),
            times_out: self.times_out,
            runs: self.runs,
            balls_faced: self.balls_faced,
            fours: self.fours,
            sixes: self.sixes,
            highest_score,
            highest_not_out,
            fifties: self.fifties,
            hundreds: self.hundreds,
            average: batting_average(self.runs, self.times_out),
            strike_rate: strike_rate(self.runs, self.balls_faced),
        };

        let bowling = BowlingCareer {
            innings: self.bowling_innings,
            balls_bowled: self.balls_bowled,
            overs: format_overs(self.balls_bowled),
            runs_conceded: self.runs_conceded,
            wickets: self.wickets,
            maidens: self.maidens,
            average: round_to_two(ratio_or_zero(
                f64::from(self.runs_conceded),
                f64::from(self.wickets),
            )),
            economy: economy_rate(self.runs_conceded, self.balls_bowled),
            strike_rate: round_to_two(ratio_or_zero(
                f64::from(self.balls_bowled),
                f64::from(self.wickets),
            )),
            best_figures: select_best_figures(&self.figures),
            five_wicket_hauls: self.five_wicket_hauls,
        };

        PlayerCareerStats {
            player_id: player_id.to_string(),
            scope,
            matches: self.matches,
            batting,
            bowling,
            fielding: FieldingCareer {
                catches: self.catches,
                stumpings: self.stumpings,
                run_outs: self.run_outs,
            },
        }
    }
}

/// Runs per dismissal. A player never dismissed is credited with their runs.
pub fn batting_average(runs: u32, times_out: u32) -> f64 {
    if times_out > 0 {
        round_to_two(f64::from(runs) / f64::from(times_out))
    } else {
        f64::from(runs)
    }
}

pub fn strike_rate(runs: u32, balls: u32) -> f64 {
    round_to_two(ratio_or_zero(f64::from(runs), f64::from(balls)) * 100.0)
}

pub fn economy_rate(runs_conceded: u32, balls_bowled: u32) -> f64 {
    round_to_two(
        ratio_or_zero(f64::from(runs_conceded), f64::from(balls_bowled))
            * f64::from(BALLS_PER_OVER),
    )
}

/// Best of a set of innings figures. The result does not depend on order.
pub fn select_best_figures(figures: &[BestFigures]) -> Option<BestFigures> {
    figures.iter().copied().fold(None, |best, candidate| match best {
        Some(current) if !candidate.is_better_than(&current) => Some(current),
        _ => Some(candidate),
    })
}

/// Folds every in-scope match into one career aggregate. Zero matches give a
/// zero-valued, well-formed result.
pub fn aggregate_career(
    player_id: &str,
    matches: &[CompletedMatch],
    scope: StatsScope,
) -> PlayerCareerStats {
    matches
        .iter()
        .filter(|record| scope.includes(&record.date))
        .map(|record| CareerAccumulator::from_match(player_id, record))
        .fold(CareerAccumulator::default(), CareerAccumulator::merge)
        .finalize(player_id, scope)
}
