use std::sync::Arc;

use cricket_core::live::{LiveScoringService, MatchSetup, TeamLineup, TossDecision, TossResult};
use cricket_core::match_data::{InMemoryMatchRepository, MatchRepository};
use cricket_core::{MatchConfig, StatsService};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const HOME: &str = "lions";
pub const AWAY: &str = "tigers";

pub fn lineup(team_id: &str) -> TeamLineup {
    TeamLineup::new(team_id, (1..=11).map(|i| format!("{team_id}-{i}")).collect())
}

/// Lions bat first.
pub fn lions_bat_first() -> MatchSetup {
    MatchSetup::new(
        TossResult {
            winner_team_id: HOME.to_string(),
            decision: TossDecision::Bat,
        },
        lineup(HOME),
        lineup(AWAY),
    )
}

pub struct LiveTestSetup {
    pub repository: Arc<dyn MatchRepository>,
    pub live: Arc<LiveScoringService>,
    pub stats: StatsService,
    pub match_id: String,
}

pub struct LiveTestSetupBuilder {
    overs: u32,
    repository: Arc<dyn MatchRepository>,
}

impl LiveTestSetupBuilder {
    pub fn new() -> Self {
        Self {
            overs: 20,
            repository: Arc::new(InMemoryMatchRepository::new()),
        }
    }

    pub fn with_overs(mut self, overs: u32) -> Self {
        self.overs = overs;
        self
    }

    pub fn with_repository(mut self, repository: Arc<dyn MatchRepository>) -> Self {
        self.repository = repository;
        self
    }

    /// Schedules and starts a lions v tigers match.
    pub async fn build(self) -> LiveTestSetup {
        let live = Arc::new(
            LiveScoringService::builder(self.repository.clone())
                .with_config(MatchConfig::default().with_overs_per_innings(self.overs))
                .build(),
        );
        let stats = StatsService::builder(self.repository.clone()).build();

        let match_id = live.schedule_match(HOME, AWAY).await.unwrap();
        live.start_match(&match_id, lions_bat_first()).await.unwrap();

        LiveTestSetup {
            repository: self.repository,
            live,
            stats,
            match_id,
        }
    }
}
