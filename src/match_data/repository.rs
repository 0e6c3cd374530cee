use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::MatchDocument;
use crate::live::MatchState;
use crate::stats::StatsError;

/// Read access to the match document store, plus recording of matches
/// finished through live scoring.
#[async_trait]
pub trait MatchRepository: Send + Sync {
    async fn fetch_completed_matches(&self) -> Result<Vec<MatchDocument>, StatsError>;

    async fn fetch_matches_for_team(&self, team_id: &str) -> Result<Vec<MatchDocument>, StatsError>;

    /// Matches ordered most recent first, optionally capped at `limit`.
    async fn fetch_matches_in_date_desc_order(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<MatchDocument>, StatsError>;

    async fn record_match(&self, document: MatchDocument) -> Result<(), StatsError>;
}

/// In-memory implementation of MatchRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryMatchRepository {
    documents: Arc<RwLock<Vec<MatchDocument>>>,
}

impl InMemoryMatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: Vec<MatchDocument>) -> Self {
        Self {
            documents: Arc::new(RwLock::new(documents)),
        }
    }
}

fn is_completed(document: &MatchDocument) -> bool {
    document
        .status
        .as_deref()
        .and_then(|status| status.parse::<MatchState>().ok())
        == Some(MatchState::Completed)
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    #[instrument(skip(self))]
    async fn fetch_completed_matches(&self) -> Result<Vec<MatchDocument>, StatsError> {
        let documents = self.documents.read().await;
        let completed: Vec<MatchDocument> =
            documents.iter().filter(|d| is_completed(d)).cloned().collect();
        debug!(count = completed.len(), "Fetched completed matches");
        Ok(completed)
    }

    #[instrument(skip(self))]
    async fn fetch_matches_for_team(&self, team_id: &str) -> Result<Vec<MatchDocument>, StatsError> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|d| d.involves_team(team_id))
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn fetch_matches_in_date_desc_order(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<MatchDocument>, StatsError> {
        let documents = self.documents.read().await;
        let mut ordered: Vec<MatchDocument> = documents.clone();
        // Undated documents sort last.
        ordered.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(limit) = limit {
            ordered.truncate(limit);
        }
        Ok(ordered)
    }

    #[instrument(skip(self, document), fields(match_id = %document.display_id()))]
    async fn record_match(&self, document: MatchDocument) -> Result<(), StatsError> {
        let mut documents = self.documents.write().await;
        match documents
            .iter_mut()
            .find(|existing| existing.id.is_some() && existing.id == document.id)
        {
            Some(existing) => *existing = document,
            None => documents.push(document),
        }
        debug!(total = documents.len(), "Recorded match document");
        Ok(())
    }
}
