//! Tick-driven delivery feed.
//!
//! A ticker emits [`Tick`]s on a channel; [`MatchFeed`] takes them one at a
//! time, asks a [`DeliverySource`] for the next outcome and hands it to the
//! [`LiveScoringService`]. Swapping the simulated source for scorer input
//! needs no other change.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use super::{LiveScoringError, LiveScoringService, LiveSnapshot, MatchState};
use crate::ball::{DeliveryOutcome, ExtraKind, ShotPlacement, ShotType, WicketKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub sequence: u64,
}

/// Shortest period a ticker runs at.
pub const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

/// Spawns a task that sends a tick every `period` until the receiver is dropped.
/// Periods below [`MIN_TICK_PERIOD`] are raised to it.
pub fn spawn_ticker(period: Duration) -> (mpsc::Receiver<Tick>, JoinHandle<()>) {
    let period = if period < MIN_TICK_PERIOD {
        warn!(?period, "Tick period too short, using the minimum");
        MIN_TICK_PERIOD
    } else {
        period
    };
    let (sender, receiver) = mpsc::channel(1);
    let handle = tokio::spawn(async move {
        let mut ticks = interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sequence = 0;
        loop {
            ticks.tick().await;
            sequence += 1;
            if sender.send(Tick { sequence }).await.is_err() {
                debug!(sequence, "Tick receiver dropped, stopping ticker");
                break;
            }
        }
    });
    (receiver, handle)
}

/// Where the next delivery comes from.
#[async_trait]
pub trait DeliverySource: Send + Sync {
    /// `None` means the source has nothing more to give.
    async fn next_delivery(&self, snapshot: &LiveSnapshot) -> Option<DeliveryOutcome>;

    fn source_name(&self) -> &'static str;
}

/// Random but plausible deliveries, reproducible with a seed.
pub struct SimulatedDeliverySource {
    rng: Mutex<StdRng>,
}

impl SimulatedDeliverySource {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn pick_bowler(rng: &mut StdRng, snapshot: &LiveSnapshot) -> Option<String> {
        if let Some(current) = &snapshot.current_bowler {
            return Some(current.clone());
        }
        // Bowlers come from the back half of the lineup.
        let side = &snapshot.bowling_side;
        let candidates: Vec<&String> = side
            .iter()
            .skip(side.len() / 2)
            .filter(|id| snapshot.previous_over_bowler.as_ref() != Some(*id))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[rng.random_range(0..candidates.len())].clone())
    }

    fn pick_fielder(rng: &mut StdRng, snapshot: &LiveSnapshot) -> Option<String> {
        let side = &snapshot.bowling_side;
        (!side.is_empty()).then(|| side[rng.random_range(0..side.len())].clone())
    }

    fn shot(rng: &mut StdRng, runs: u8) -> ShotPlacement {
        let distance = match runs {
            6 => 100.0,
            4 => rng.random_range(90.0..=100.0),
            0 => rng.random_range(5.0..30.0),
            _ => rng.random_range(25.0..85.0),
        };
        let shot_type = match runs {
            6 => ShotType::Loft,
            4 => ShotType::Drive,
            0 => ShotType::Defensive,
            _ => ShotType::Flick,
        };
        ShotPlacement {
            angle: rng.random_range(0.0..360.0),
            distance,
            shot_type: Some(shot_type),
        }
    }
}

#[async_trait]
impl DeliverySource for SimulatedDeliverySource {
    async fn next_delivery(&self, snapshot: &LiveSnapshot) -> Option<DeliveryOutcome> {
        let striker = snapshot.striker.clone()?;
        let mut rng = self.rng.lock().await;
        let bowler = Self::pick_bowler(&mut rng, snapshot)?;

        let roll = rng.random_range(0..100);
        let outcome = match roll {
            0..=34 => DeliveryOutcome::dot(bowler),
            35..=59 => DeliveryOutcome::runs(bowler, 1),
            60..=67 => DeliveryOutcome::runs(bowler, 2),
            68..=69 => DeliveryOutcome::runs(bowler, 3),
            70..=79 => DeliveryOutcome::runs(bowler, 4),
            80..=83 => DeliveryOutcome::runs(bowler, 6),
            84..=87 => DeliveryOutcome::wide(bowler),
            88..=89 => DeliveryOutcome::no_ball(bowler, 0),
            90..=92 => DeliveryOutcome::extra(bowler, ExtraKind::LegBye, 1),
            _ => {
                let kind = match rng.random_range(0..4) {
                    0 => WicketKind::Bowled,
                    1 => WicketKind::Lbw,
                    _ => WicketKind::Caught,
                };
                let outcome = DeliveryOutcome::wicket(bowler, kind, striker);
                return Some(match (kind, Self::pick_fielder(&mut rng, snapshot)) {
                    (WicketKind::Caught, Some(fielder)) => outcome.with_fielder(fielder),
                    (WicketKind::Caught, None) => DeliveryOutcome {
                        wicket_kind: Some(WicketKind::Bowled),
                        ..outcome
                    },
                    _ => outcome,
                });
            }
        };

        if outcome.extra_kind.is_none() {
            let runs = outcome.bat_runs;
            return Some(outcome.with_shot(Self::shot(&mut rng, runs)));
        }
        Some(outcome)
    }

    fn source_name(&self) -> &'static str {
        "simulated"
    }
}

/// Deliveries typed in by a scorer, received over a channel.
pub struct ChannelDeliverySource {
    receiver: Mutex<mpsc::Receiver<DeliveryOutcome>>,
}

impl ChannelDeliverySource {
    pub fn new(capacity: usize) -> (Self, mpsc::Sender<DeliveryOutcome>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                receiver: Mutex::new(receiver),
            },
            sender,
        )
    }
}

#[async_trait]
impl DeliverySource for ChannelDeliverySource {
    async fn next_delivery(&self, _snapshot: &LiveSnapshot) -> Option<DeliveryOutcome> {
        self.receiver.lock().await.recv().await
    }

    fn source_name(&self) -> &'static str {
        "channel"
    }
}

/// Drives one match from a tick stream and a delivery source.
pub struct MatchFeed {
    service: Arc<LiveScoringService>,
    source: Arc<dyn DeliverySource>,
    match_id: String,
}

impl MatchFeed {
    pub fn new(
        service: Arc<LiveScoringService>,
        source: Arc<dyn DeliverySource>,
        match_id: impl Into<String>,
    ) -> Self {
        Self {
            service,
            source,
            match_id: match_id.into(),
        }
    }

    /// Consumes ticks until the match ends, the source runs dry or the tick
    /// stream closes, and returns the last snapshot.
    ///
    /// While the match is suspended ticks are skipped. A rejected delivery
    /// is logged and the feed moves on to the next tick.
    #[instrument(skip(self, ticks), fields(match_id = %self.match_id, source = self.source.source_name()))]
    pub async fn run(
        &self,
        mut ticks: mpsc::Receiver<Tick>,
    ) -> Result<LiveSnapshot, LiveScoringError> {
        let mut snapshot = self.service.snapshot(&self.match_id).await?;

        while let Some(tick) = ticks.recv().await {
            snapshot = self.service.snapshot(&self.match_id).await?;
            if snapshot.state.is_terminal() {
                break;
            }
            if snapshot.state != MatchState::Live {
                debug!(tick = tick.sequence, state = %snapshot.state, "Skipping tick");
                continue;
            }

            let Some(outcome) = self.source.next_delivery(&snapshot).await else {
                info!(tick = tick.sequence, "Delivery source exhausted");
                break;
            };

            match self.service.record_delivery(&self.match_id, outcome).await {
                Ok(next) => snapshot = next,
                Err(
                    err @ (LiveScoringError::MalformedBallEvent(_)
                    | LiveScoringError::InvalidStateTransition { .. }),
                ) => {
                    warn!(tick = tick.sequence, error = %err, "Skipping rejected delivery");
                }
                Err(err) => return Err(err),
            }

            if snapshot.state.is_terminal() {
                break;
            }
        }

        info!(
            state = %snapshot.state,
            runs = snapshot.runs,
            wickets = snapshot.wickets,
            "Match feed finished"
        );
        Ok(snapshot)
    }
}
