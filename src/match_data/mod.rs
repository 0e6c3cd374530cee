// Match documents supplied by the surrounding league application
//
// Documents come out of the store loosely typed; `CompletedMatch` is the
// validated form the aggregators work on.

pub use documents::{
    BattingStatLine, BowlingStatLine, DismissalRecord, InningsDocument, MatchDocument,
};
pub use records::{
    BowlingFigures, CompletedMatch, InningsRecord, MatchResult, MAX_INNINGS_WICKETS,
};
pub use repository::{InMemoryMatchRepository, MatchRepository};

mod documents;
mod records;
mod repository;
