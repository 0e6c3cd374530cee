use crate::match_data::CompletedMatch;

use super::career::{batting_average, economy_rate, strike_rate, CareerAccumulator};
use super::PerformanceDataPoint;

/// Builds a player's per-match trend, oldest match first.
///
/// `matches` are expected newest first, the way the store hands them out.
/// Matches the player did not appear in are skipped and do not count toward
/// `limit`, which keeps only the most recent appearances.
pub fn build_performance_trend(
    player_id: &str,
    matches: &[CompletedMatch],
    limit: Option<usize>,
) -> Vec<PerformanceDataPoint> {
    let mut appearances: Vec<(&CompletedMatch, CareerAccumulator)> = matches
        .iter()
        .map(|record| (record, CareerAccumulator::from_match(player_id, record)))
        .filter(|(_, contribution)| contribution.appeared())
        .take(limit.unwrap_or(usize::MAX))
        .collect();

    appearances.reverse();
    // Stable, so same-day matches keep the store's relative order.
    appearances.sort_by_key(|(record, _)| record.date);

    let mut total_runs: u32 = 0;
    let mut total_outs: u32 = 0;
    appearances
        .into_iter()
        .map(|(record, contribution)| {
            total_runs = total_runs.saturating_add(contribution.runs());
            total_outs = total_outs.saturating_add(contribution.times_out());

            PerformanceDataPoint {
                match_id: record.id.clone(),
                date: record.date,
                runs: contribution.runs(),
                balls_faced: contribution.balls_faced(),
                wickets: contribution.wickets(),
                runs_conceded: contribution.runs_conceded(),
                balls_bowled: contribution.balls_bowled(),
                strike_rate: strike_rate(contribution.runs(), contribution.balls_faced()),
                economy: economy_rate(contribution.runs_conceded(), contribution.balls_bowled()),
                cumulative_average: batting_average(total_runs, total_outs),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_data::{BattingStatLine, BowlingFigures, InningsRecord, MatchResult};
    use chrono::{TimeZone, Utc};

    fn record(id: &str, day: u32, batting: Vec<BattingStatLine>, bowling: Vec<BowlingFigures>) -> CompletedMatch {
        CompletedMatch {
            id: id.into(),
            date: Utc.with_ymd_and_hms(2024, 7, day, 14, 0, 0).unwrap(),
            team1_id: "lions".into(),
            team2_id: "tigers".into(),
            result: MatchResult::Won {
                team_id: "lions".into(),
            },
            innings: vec![InningsRecord {
                batting_team_id: Some("lions".into()),
                total_runs: 150,
                total_wickets: 5,
                batting,
                bowling,
            }],
        }
    }

    fn innings(runs: u32, balls: u32, is_out: bool) -> BattingStatLine {
        BattingStatLine {
            runs,
            balls,
            is_out,
            ..BattingStatLine::new("p1")
        }
    }

    #[test]
    fn newest_first_input_gives_chronological_series() {
        let newest_first = vec![
            record("m3", 3, vec![innings(10, 10, true)], vec![]),
            record("m2", 2, vec![innings(40, 20, false)], vec![]),
            record("m1", 1, vec![innings(20, 16, true)], vec![]),
        ];
        let trend = build_performance_trend("p1", &newest_first, None);

        let ids: Vec<&str> = trend.iter().map(|p| p.match_id.as_str()).collect();
        assert_eq!(ids, ["m1", "m2", "m3"]);

        let averages: Vec<f64> = trend.iter().map(|p| p.cumulative_average).collect();
        assert_eq!(averages, [20.0, 60.0, 35.0]);
        assert_eq!(trend[1].strike_rate, 200.0);
    }

    #[test]
    fn skips_matches_without_the_player() {
        let newest_first = vec![
            record("m3", 3, vec![innings(10, 10, true)], vec![]),
            record("m2", 2, vec![BattingStatLine::new("someone-else")], vec![]),
            record(
                "m1",
                1,
                vec![],
                vec![BowlingFigures {
                    player_id: "p1".into(),
                    balls_bowled: 24,
                    runs_conceded: 30,
                    wickets: 2,
                    maidens: 0,
                }],
            ),
        ];
        let trend = build_performance_trend("p1", &newest_first, None);

        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].match_id, "m1");
        assert_eq!(trend[0].economy, 7.5);
        assert_eq!(trend[0].cumulative_average, 0.0);
        assert_eq!(trend[1].cumulative_average, 10.0);
    }

    #[test]
    fn limit_keeps_most_recent_appearances() {
        let newest_first: Vec<_> = (1..=5)
            .rev()
            .map(|day| record(&format!("m{day}"), day, vec![innings(day * 10, 10, true)], vec![]))
            .collect();
        let trend = build_performance_trend("p1", &newest_first, Some(2));

        let ids: Vec<&str> = trend.iter().map(|p| p.match_id.as_str()).collect();
        assert_eq!(ids, ["m4", "m5"]);
        assert_eq!(trend[1].cumulative_average, 45.0);
    }

    #[test]
    fn no_matches_gives_empty_series() {
        assert!(build_performance_trend("p1", &[], None).is_empty());
    }
}
