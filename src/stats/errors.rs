use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// The match store could not be reached. Never retried here.
    #[error("Data fetch error: {0}")]
    DataFetch(String),

    #[error("Malformed record {match_id}: {reason}")]
    MalformedRecord { match_id: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl StatsError {
    pub fn malformed(match_id: impl Into<String>, reason: impl Into<String>) -> Self {
        StatsError::MalformedRecord {
            match_id: match_id.into(),
            reason: reason.into(),
        }
    }
}
