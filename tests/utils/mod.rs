pub mod match_builders;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use match_builders::{batting, bowling, MatchDocumentBuilder};
#[allow(unused_imports)]
pub use mocks::{RejectingWritesRepository, UnreachableRepository};
#[allow(unused_imports)]
pub use setup::{lineup, lions_bat_first, LiveTestSetup, LiveTestSetupBuilder, AWAY, HOME};
