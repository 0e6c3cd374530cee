use std::error::Error;
use std::sync::Arc;

use cricket_core::live::{
    spawn_ticker, SimulatedDeliverySource, TeamLineup, TossDecision, TossResult,
};
use cricket_core::wagon_wheel::{self, ShotFilter};
use cricket_core::{
    EngineConfig, InMemoryMatchRepository, LiveScoringService, MatchFeed, MatchSetup,
    ServiceResponse, StatsScope, StatsService,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HOME_TEAM: &str = "lions";
const AWAY_TEAM: &str = "tigers";

fn lineup(team_id: &str) -> TeamLineup {
    TeamLineup::new(
        team_id,
        (1..=11).map(|slot| format!("{team_id}-{slot}")).collect(),
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cricket_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env();
    info!(
        overs = config.match_config.overs_per_innings,
        tick_ms = config.simulation.tick_interval.as_millis() as u64,
        seed = ?config.simulation.seed,
        "Starting simulated match"
    );

    let repository = Arc::new(InMemoryMatchRepository::new());
    let live = Arc::new(
        LiveScoringService::builder(repository.clone())
            .with_config(config.match_config.clone())
            .build(),
    );
    let stats = StatsService::builder(repository)
        .with_config(config.stats.clone())
        .build();

    let match_id = live.schedule_match(HOME_TEAM, AWAY_TEAM).await?;
    let setup = MatchSetup::new(
        TossResult {
            winner_team_id: AWAY_TEAM.into(),
            decision: TossDecision::Bowl,
        },
        lineup(HOME_TEAM),
        lineup(AWAY_TEAM),
    );
    live.start_match(&match_id, setup).await?;

    let source = Arc::new(SimulatedDeliverySource::new(config.simulation.seed));
    let feed = MatchFeed::new(live.clone(), source, match_id.clone());
    let (ticks, ticker) = spawn_ticker(config.simulation.tick_interval);
    let finished = feed.run(ticks).await;
    ticker.abort();

    let finished = match finished {
        Ok(snapshot) => snapshot,
        Err(err) => {
            error!(match_id = %match_id, error = %err, "Match feed failed");
            return Err(err.into());
        }
    };
    info!(
        state = %finished.state,
        result = ?finished.result,
        "Match finished"
    );

    let top_scorer = finished
        .batting
        .iter()
        .max_by_key(|line| line.runs)
        .map(|line| line.player_id.clone());
    if let Some(player_id) = top_scorer {
        let response =
            ServiceResponse::from(stats.career_stats(&player_id, StatsScope::Career).await);
        info!(
            player_id = %player_id,
            career = %serde_json::to_string(&response)?,
            "Career stats for the top scorer"
        );
    }

    let head_to_head = ServiceResponse::from(stats.head_to_head(HOME_TEAM, AWAY_TEAM).await);
    info!(head_to_head = %serde_json::to_string(&head_to_head)?, "Head to head");

    let innings_number = finished.innings_number.max(1);
    let shots = wagon_wheel::shots_from_balls(&live.deliveries(&match_id, innings_number).await?);
    let boundaries = wagon_wheel::filter_shots(&shots, ShotFilter::Fours).len()
        + wagon_wheel::filter_shots(&shots, ShotFilter::Sixes).len();
    info!(
        innings_number,
        boundaries,
        summary = %serde_json::to_string(&wagon_wheel::summarize(&shots))?,
        "Wagon wheel for the last innings"
    );

    Ok(())
}
