use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex as AsyncMutex, RwLock};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::{
    LiveMatch, LiveScoringError, LiveSnapshot, MatchSetup, MatchState, MomentumHeuristic,
    WinProbabilityModel,
};
use crate::ball::{Ball, DeliveryOutcome};
use crate::config::MatchConfig;
use crate::match_data::MatchRepository;

const SNAPSHOT_CHANNEL_CAPACITY: usize = 100;

type MatchHandle = Arc<AsyncMutex<LiveMatch>>;

/// Owns every live match and is the only way to change one.
///
/// Each match sits behind its own mutex, so deliveries for one match are
/// applied strictly one after another while different matches proceed
/// independently. Every accepted change is broadcast as a [`LiveSnapshot`].
pub struct LiveScoringService {
    repository: Arc<dyn MatchRepository>,
    config: MatchConfig,
    model: Arc<dyn WinProbabilityModel>,
    matches: Arc<RwLock<HashMap<String, MatchHandle>>>,
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<LiveSnapshot>>>>,
}

impl LiveScoringService {
    pub fn builder(repository: Arc<dyn MatchRepository>) -> LiveScoringServiceBuilder {
        LiveScoringServiceBuilder::new(repository)
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Registers a new scheduled match and returns its id.
    #[instrument(skip(self))]
    pub async fn schedule_match(
        &self,
        team1_id: &str,
        team2_id: &str,
    ) -> Result<String, LiveScoringError> {
        let match_id = format!("match-{}", Uuid::new_v4());
        let live = LiveMatch::new(
            match_id.clone(),
            team1_id,
            team2_id,
            self.config.clone(),
            Arc::clone(&self.model),
        )?;

        self.matches
            .write()
            .await
            .insert(match_id.clone(), Arc::new(AsyncMutex::new(live)));
        self.channels
            .write()
            .await
            .entry(match_id.clone())
            .or_insert_with(|| broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY).0);

        info!(match_id = %match_id, team1_id, team2_id, "Match scheduled");
        Ok(match_id)
    }

    #[instrument(skip(self, setup))]
    pub async fn start_match(
        &self,
        match_id: &str,
        setup: MatchSetup,
    ) -> Result<LiveSnapshot, LiveScoringError> {
        let handle = self.match_handle(match_id).await?;
        let snapshot = handle.lock().await.start(setup)?;
        self.publish(&snapshot).await;
        Ok(snapshot)
    }

    /// Applies a delivery. When it ends the match, the finished match is
    /// written to the repository before returning.
    #[instrument(skip(self, outcome), fields(bowler = %outcome.bowler_id))]
    pub async fn record_delivery(
        &self,
        match_id: &str,
        outcome: DeliveryOutcome,
    ) -> Result<LiveSnapshot, LiveScoringError> {
        let handle = self.match_handle(match_id).await?;
        let mut live = handle.lock().await;

        let snapshot = live.record_delivery(outcome).map_err(|err| {
            warn!(match_id, error = %err, "Delivery rejected");
            err
        })?;
        self.publish(&snapshot).await;

        if snapshot.state == MatchState::Completed {
            let document = live.to_match_document()?;
            drop(live);
            self.repository.record_match(document).await.map_err(|err| {
                error!(match_id, error = %err, "Failed to record completed match");
                LiveScoringError::Persistence(err)
            })?;
            info!(match_id, "Completed match recorded");
        }

        Ok(snapshot)
    }

    #[instrument(skip(self))]
    pub async fn suspend_match(
        &self,
        match_id: &str,
        reason: &str,
    ) -> Result<LiveSnapshot, LiveScoringError> {
        let handle = self.match_handle(match_id).await?;
        let snapshot = handle.lock().await.suspend(reason)?;
        self.publish(&snapshot).await;
        Ok(snapshot)
    }

    #[instrument(skip(self))]
    pub async fn resume_match(&self, match_id: &str) -> Result<LiveSnapshot, LiveScoringError> {
        let handle = self.match_handle(match_id).await?;
        let snapshot = handle.lock().await.resume()?;
        self.publish(&snapshot).await;
        Ok(snapshot)
    }

    #[instrument(skip(self))]
    pub async fn abandon_match(
        &self,
        match_id: &str,
        reason: &str,
    ) -> Result<LiveSnapshot, LiveScoringError> {
        let handle = self.match_handle(match_id).await?;
        let snapshot = handle.lock().await.abandon(reason)?;
        self.publish(&snapshot).await;
        Ok(snapshot)
    }

    pub async fn snapshot(&self, match_id: &str) -> Result<LiveSnapshot, LiveScoringError> {
        let handle = self.match_handle(match_id).await?;
        let snapshot = handle.lock().await.snapshot();
        Ok(snapshot)
    }

    /// Every ball bowled in the given innings (1 or 2), in order.
    pub async fn deliveries(
        &self,
        match_id: &str,
        innings_number: u8,
    ) -> Result<Vec<Ball>, LiveScoringError> {
        let handle = self.match_handle(match_id).await?;
        let live = handle.lock().await;
        let balls = live
            .innings()
            .iter()
            .find(|innings| innings.number() == innings_number)
            .map(|innings| {
                innings
                    .tally()
                    .overs()
                    .iter()
                    .flat_map(|over| over.balls().iter().cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(balls)
    }

    /// Receives every snapshot published for the match from now on.
    pub async fn subscribe(
        &self,
        match_id: &str,
    ) -> Result<broadcast::Receiver<LiveSnapshot>, LiveScoringError> {
        let channels = self.channels.read().await;
        channels
            .get(match_id)
            .map(broadcast::Sender::subscribe)
            .ok_or_else(|| LiveScoringError::MatchNotFound(match_id.to_string()))
    }

    /// Writes a completed match to the repository again, e.g. after a
    /// failed attempt at the end of the match.
    #[instrument(skip(self))]
    pub async fn persist_match(&self, match_id: &str) -> Result<(), LiveScoringError> {
        let handle = self.match_handle(match_id).await?;
        let document = handle.lock().await.to_match_document()?;
        self.repository.record_match(document).await?;
        info!(match_id, "Completed match recorded");
        Ok(())
    }

    /// Drops a match that has reached a terminal state.
    #[instrument(skip(self))]
    pub async fn remove_match(&self, match_id: &str) -> Result<(), LiveScoringError> {
        let handle = self.match_handle(match_id).await?;
        let state = handle.lock().await.state();
        if !state.is_terminal() {
            return Err(LiveScoringError::InvalidStateTransition {
                state,
                action: "remove the match",
            });
        }

        self.matches.write().await.remove(match_id);
        self.channels.write().await.remove(match_id);
        debug!(match_id, "Match removed");
        Ok(())
    }

    async fn match_handle(&self, match_id: &str) -> Result<MatchHandle, LiveScoringError> {
        let matches = self.matches.read().await;
        matches
            .get(match_id)
            .cloned()
            .ok_or_else(|| LiveScoringError::MatchNotFound(match_id.to_string()))
    }

    async fn publish(&self, snapshot: &LiveSnapshot) {
        let channels = self.channels.read().await;
        let Some(sender) = channels.get(&snapshot.match_id) else {
            return;
        };
        match sender.send(snapshot.clone()) {
            Ok(receivers) => {
                debug!(match_id = %snapshot.match_id, receivers, "Snapshot published");
            }
            Err(_) => {
                debug!(match_id = %snapshot.match_id, "Snapshot published with no receivers");
            }
        }
    }
}

pub struct LiveScoringServiceBuilder {
    repository: Arc<dyn MatchRepository>,
    config: MatchConfig,
    model: Arc<dyn WinProbabilityModel>,
}

impl LiveScoringServiceBuilder {
    fn new(repository: Arc<dyn MatchRepository>) -> Self {
        Self {
            repository,
            config: MatchConfig::default(),
            model: Arc::new(MomentumHeuristic::default()),
        }
    }

    pub fn with_config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_model(mut self, model: Arc<dyn WinProbabilityModel>) -> Self {
        self.model = model;
        self
    }

    pub fn build(self) -> LiveScoringService {
        LiveScoringService {
            repository: self.repository,
            config: self.config,
            model: self.model,
            matches: Arc::new(RwLock::new(HashMap::new())),
            channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
