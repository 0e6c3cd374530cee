use std::str::FromStr;
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info, instrument, warn};

use crate::config::StatsConfig;
use crate::live::MatchState;
use crate::match_data::{CompletedMatch, MatchDocument, MatchRepository};

use super::{
    aggregate_career, build_performance_trend, head_to_head, validate_comparison_ids,
    HeadToHeadStats, PerformanceDataPoint, PlayerCareerStats, PlayerComparison, StatsError,
    StatsScope,
};

/// Read-side entry point for derived statistics.
///
/// Every call fetches a fresh set of documents and recomputes from them;
/// nothing derived is cached or stored.
pub struct StatsService {
    repository: Arc<dyn MatchRepository>,
    config: StatsConfig,
}

impl StatsService {
    pub fn builder(repository: Arc<dyn MatchRepository>) -> StatsServiceBuilder {
        StatsServiceBuilder::new(repository)
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    #[instrument(skip(self))]
    pub async fn career_stats(
        &self,
        player_id: &str,
        scope: StatsScope,
    ) -> Result<PlayerCareerStats, StatsError> {
        require_player_id(player_id)?;
        let documents = self.repository.fetch_completed_matches().await?;
        let matches = load_completed(&documents);
        let stats = aggregate_career(player_id, &matches, scope);
        debug!(
            player_id,
            matches = stats.matches,
            runs = stats.batting.runs,
            wickets = stats.bowling.wickets,
            "Career stats computed"
        );
        Ok(stats)
    }

    /// Per-match trend, oldest first. `limit` falls back to the configured window.
    #[instrument(skip(self))]
    pub async fn performance_trend(
        &self,
        player_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<PerformanceDataPoint>, StatsError> {
        require_player_id(player_id)?;
        let documents = self.repository.fetch_matches_in_date_desc_order(None).await?;
        let matches = load_completed(&documents);
        Ok(build_performance_trend(
            player_id,
            &matches,
            limit.or(self.config.trend_match_limit),
        ))
    }

    #[instrument(skip(self))]
    pub async fn head_to_head(
        &self,
        team1_id: &str,
        team2_id: &str,
    ) -> Result<HeadToHeadStats, StatsError> {
        let documents = self.repository.fetch_matches_for_team(team1_id).await?;
        let matches = load_completed(&documents);
        head_to_head(
            team1_id,
            team2_id,
            &matches,
            self.config.recent_matches_limit,
        )
    }

    /// Career aggregates for 2 to `max_compared_players` players, fetched
    /// concurrently and returned in the order asked for.
    #[instrument(skip(self))]
    pub async fn compare_players(
        &self,
        player_ids: &[String],
        scope: StatsScope,
    ) -> Result<PlayerComparison, StatsError> {
        validate_comparison_ids(player_ids, self.config.max_compared_players)?;

        let players = try_join_all(
            player_ids
                .iter()
                .map(|player_id| self.career_stats(player_id, scope)),
        )
        .await?;

        info!(players = players.len(), "Player comparison assembled");
        Ok(PlayerComparison { scope, players })
    }
}

fn require_player_id(player_id: &str) -> Result<(), StatsError> {
    if player_id.trim().is_empty() {
        return Err(StatsError::Validation("player id cannot be empty".into()));
    }
    Ok(())
}

/// Keeps the completed matches that validate. Documents in another state are
/// passed over quietly; malformed ones are logged and skipped so one bad
/// record cannot fail the whole scan.
pub fn load_completed(documents: &[MatchDocument]) -> Vec<CompletedMatch> {
    documents
        .iter()
        .filter(|doc| {
            let state = doc.status.as_deref().map(MatchState::from_str);
            match state {
                Some(Ok(state)) if state != MatchState::Completed => {
                    debug!(match_id = %doc.display_id(), %state, "Skipping match not completed");
                    false
                }
                _ => true,
            }
        })
        .filter_map(|doc| match CompletedMatch::try_from(doc) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(match_id = %doc.display_id(), error = %err, "Skipping malformed match record");
                None
            }
        })
        .collect()
}

pub struct StatsServiceBuilder {
    repository: Arc<dyn MatchRepository>,
    config: StatsConfig,
}

impl StatsServiceBuilder {
    fn new(repository: Arc<dyn MatchRepository>) -> Self {
        Self {
            repository,
            config: StatsConfig::default(),
        }
    }

    pub fn with_config(mut self, config: StatsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> StatsService {
        StatsService {
            repository: self.repository,
            config: self.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_data::{BattingStatLine, InMemoryMatchRepository, InningsDocument};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn document(id: &str, status: &str, day: u32, runs: u32) -> MatchDocument {
        MatchDocument {
            id: Some(id.into()),
            status: Some(status.into()),
            date: Some(Utc.with_ymd_and_hms(2024, 9, day, 10, 0, 0).unwrap()),
            team1_id: Some("lions".into()),
            team2_id: Some("tigers".into()),
            winner_id: Some("lions".into()),
            result: None,
            innings: vec![InningsDocument {
                batting_team_id: Some("lions".into()),
                total_runs: runs,
                total_wickets: 3,
                batsmen: vec![BattingStatLine {
                    runs,
                    balls: runs,
                    is_out: true,
                    ..BattingStatLine::new("p1")
                }],
                bowlers: vec![],
            }],
        }
    }

    #[test]
    fn load_completed_skips_malformed_and_unfinished() {
        let mut malformed = document("m2", "completed", 2, 10);
        malformed.team2_id = None;
        let documents = vec![
            document("m1", "completed", 1, 30),
            malformed,
            document("m3", "live", 3, 0),
            MatchDocument::default(),
        ];

        let loaded = load_completed(&documents);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "m1");
    }

    #[tokio::test]
    async fn career_stats_survive_a_bad_record() {
        let mut malformed = document("m2", "completed", 2, 99);
        malformed.winner_id = Some("bears".into());
        let repo = Arc::new(InMemoryMatchRepository::with_documents(vec![
            document("m1", "completed", 1, 30),
            malformed,
            document("m3", "completed", 3, 50),
        ]));
        let service = StatsService::builder(repo).build();

        let stats = service.career_stats("p1", StatsScope::Career).await.unwrap();
        assert_eq!(stats.matches, 2);
        assert_eq!(stats.batting.runs, 80);
        assert_eq!(stats.batting.average, 40.0);
    }

    #[tokio::test]
    async fn rejects_empty_player_id() {
        let service = StatsService::builder(Arc::new(InMemoryMatchRepository::new())).build();
        assert!(matches!(
            service.career_stats("  ", StatsScope::Career).await,
            Err(StatsError::Validation(_))
        ));
    }

    struct CountingRepository {
        inner: InMemoryMatchRepository,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl MatchRepository for CountingRepository {
        async fn fetch_completed_matches(&self) -> Result<Vec<MatchDocument>, StatsError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_completed_matches().await
        }

        async fn fetch_matches_for_team(
            &self,
            team_id: &str,
        ) -> Result<Vec<MatchDocument>, StatsError> {
            self.inner.fetch_matches_for_team(team_id).await
        }

        async fn fetch_matches_in_date_desc_order(
            &self,
            limit: Option<usize>,
        ) -> Result<Vec<MatchDocument>, StatsError> {
            self.inner.fetch_matches_in_date_desc_order(limit).await
        }

        async fn record_match(&self, document: MatchDocument) -> Result<(), StatsError> {
            self.inner.record_match(document).await
        }
    }

    #[tokio::test]
    async fn compare_fetches_each_player_independently() {
        let repo = Arc::new(CountingRepository {
            inner: InMemoryMatchRepository::with_documents(vec![document("m1", "completed", 1, 30)]),
            fetches: AtomicUsize::new(0),
        });
        let service = StatsService::builder(repo.clone()).build();

        let ids = vec!["p1".to_string(), "p2".to_string(), "p3".to_string()];
        let comparison = service
            .compare_players(&ids, StatsScope::Career)
            .await
            .unwrap();

        assert_eq!(repo.fetches.load(Ordering::SeqCst), 3);
        let players: Vec<&str> = comparison.players.iter().map(|p| p.player_id.as_str()).collect();
        assert_eq!(players, ["p1", "p2", "p3"]);
        assert_eq!(comparison.players[0].batting.runs, 30);
        assert_eq!(comparison.players[1].matches, 0);
    }

    #[tokio::test]
    async fn trend_uses_configured_limit() {
        let repo = Arc::new(InMemoryMatchRepository::with_documents(vec![
            document("m1", "completed", 1, 10),
            document("m3", "completed", 3, 30),
            document("m2", "completed", 2, 20),
        ]));
        let service = StatsService::builder(repo)
            .with_config(StatsConfig::default().with_trend_match_limit(Some(2)))
            .build();

        let trend = service.performance_trend("p1", None).await.unwrap();
        let ids: Vec<&str> = trend.iter().map(|p| p.match_id.as_str()).collect();
        assert_eq!(ids, ["m2", "m3"]);

        let full = service.performance_trend("p1", Some(10)).await.unwrap();
        assert_eq!(full.len(), 3);
    }
}
