use async_trait::async_trait;

use cricket_core::match_data::{InMemoryMatchRepository, MatchDocument, MatchRepository};
use cricket_core::StatsError;

// ============================================================================
// Mock Repositories
// ============================================================================

/// A store that cannot be reached at all.
pub struct UnreachableRepository;

#[async_trait]
impl MatchRepository for UnreachableRepository {
    async fn fetch_completed_matches(&self) -> Result<Vec<MatchDocument>, StatsError> {
        Err(StatsError::DataFetch("connection refused".to_string()))
    }

    async fn fetch_matches_for_team(&self, _team_id: &str) -> Result<Vec<MatchDocument>, StatsError> {
        Err(StatsError::DataFetch("connection refused".to_string()))
    }

    async fn fetch_matches_in_date_desc_order(
        &self,
        _limit: Option<usize>,
    ) -> Result<Vec<MatchDocument>, StatsError> {
        Err(StatsError::DataFetch("connection refused".to_string()))
    }

    async fn record_match(&self, _document: MatchDocument) -> Result<(), StatsError> {
        Err(StatsError::DataFetch("connection refused".to_string()))
    }
}

/// Reads work; writes fail until `accept_writes` is flipped.
pub struct RejectingWritesRepository {
    pub inner: InMemoryMatchRepository,
    pub accept_writes: std::sync::atomic::AtomicBool,
}

impl RejectingWritesRepository {
    pub fn new() -> Self {
        Self {
            inner: InMemoryMatchRepository::new(),
            accept_writes: std::sync::atomic::AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl MatchRepository for RejectingWritesRepository {
    async fn fetch_completed_matches(&self) -> Result<Vec<MatchDocument>, StatsError> {
        self.inner.fetch_completed_matches().await
    }

    async fn fetch_matches_for_team(&self, team_id: &str) -> Result<Vec<MatchDocument>, StatsError> {
        self.inner.fetch_matches_for_team(team_id).await
    }

    async fn fetch_matches_in_date_desc_order(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<MatchDocument>, StatsError> {
        self.inner.fetch_matches_in_date_desc_order(limit).await
    }

    async fn record_match(&self, document: MatchDocument) -> Result<(), StatsError> {
        if !self.accept_writes.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(StatsError::DataFetch("store is read-only".to_string()));
        }
        self.inner.record_match(document).await
    }
}
