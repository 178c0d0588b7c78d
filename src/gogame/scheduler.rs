use crate::core::entities::GameId;
use crate::core::errors::GameError;
use crate::gogame::game::GameState;
use crate::gogame::game_message::GameMessage;
use crate::gogame::store::{Snapshot, Store};
use crate::gogame::votes::{pick_vote, VotePool};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Everything that belongs to one game and must change together.
#[derive(Debug)]
pub struct GameRecord {
    pub state: GameState,
    pub votes: VotePool,
    rng: StdRng,
    version: u64,
}

pub type SharedRecord = Arc<Mutex<GameRecord>>;

impl GameRecord {
    pub fn new(state: GameState, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        GameRecord {
            state,
            votes: VotePool::new(),
            rng,
            version: 0,
        }
    }

    /// Continues the version count of a record loaded from a store.
    pub fn resumed_at(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Serializes the current state under a new version.
    pub fn snapshot(&mut self, id: GameId) -> Result<Snapshot, GameError> {
        let blob = self.state.to_json()?;
        self.version += 1;
        Ok(Snapshot {
            id,
            version: self.version,
            blob,
        })
    }

    pub fn shared(self) -> SharedRecord {
        Arc::new(Mutex::new(self))
    }
}

/// Writes a snapshot taken earlier. Failures are logged, the game goes on.
pub fn persist(store: &dyn Store, id: GameId, snapshot: Result<Snapshot, GameError>) {
    if let Err(e) = snapshot.and_then(|snapshot| store.save(&snapshot)) {
        error!("could not save game {}: {}", id, e);
    }
}

/// Locks a game. A panic while the lock was held does not make the game
/// unusable: every mutation commits only after its checks pass.
pub fn lock(record: &SharedRecord) -> MutexGuard<'_, GameRecord> {
    record.lock().unwrap_or_else(|e| e.into_inner())
}

/// Drains the vote pool, picks one vote and plays it.
///
/// The whole round happens under the caller's lock on `record`, so a vote is
/// either counted in this round or still pending for the next one. When the
/// chosen vote can no longer be played its error is returned and no other
/// vote is tried.
pub fn resolve_round(id: GameId, record: &mut GameRecord) -> Result<GameMessage, GameError> {
    let votes = record.votes.drain();
    let vote = pick_vote(&votes, &mut record.rng).ok_or(GameError::NoVotesCast)?;

    debug!(
        "game {}: picked {} of {} votes ({})",
        id,
        vote.player,
        votes.len(),
        vote.proposal
    );

    record.state.apply(&vote.player, vote.proposal)?;

    let details = format!("voted to {}", vote.proposal);
    Ok(GameMessage::updated(id, &record.state, &details))
}

/// Lets the owner stop a running scheduler.
#[derive(Debug)]
pub struct SchedulerHandle {
    stop: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Asks the task to stop. It exits at its next wake up without resolving.
    pub fn stop(self) -> JoinHandle<()> {
        // the task may already be gone, which is what we want anyway
        let _ = self.stop.send(true);
        self.join
    }
}

/// Resolves the votes of one game every `interval` until the game finishes,
/// voting gets turned off or the handle is stopped.
pub struct Scheduler {
    id: GameId,
    record: SharedRecord,
    interval: Duration,
    events: mpsc::UnboundedSender<GameMessage>,
    store: Arc<dyn Store>,
}

impl Scheduler {
    pub fn new(
        id: GameId,
        record: SharedRecord,
        interval: Duration,
        events: mpsc::UnboundedSender<GameMessage>,
        store: Arc<dyn Store>,
    ) -> Self {
        Scheduler {
            id,
            record,
            interval,
            events,
            store,
        }
    }

    pub fn spawn(self, runtime: &Handle) -> SchedulerHandle {
        let (stop, stopped) = watch::channel(false);
        let join = runtime.spawn(self.run(stopped));
        SchedulerHandle { stop, join }
    }

    async fn run(self, mut stopped: watch::Receiver<bool>) {
        loop {
            debug!("scheduling vote for {} in {:?}", self.id, self.interval);

            let timer = tokio::time::sleep(self.interval);
            tokio::pin!(timer);

            tokio::select! {
                _ = &mut timer => {}
                _ = stopped.changed() => {
                    debug!("scheduler for {} stopped", self.id);
                    return;
                }
            }

            if !self.fire() {
                return;
            }
        }
    }

    /// Runs one timed round. Returns whether another round should follow.
    fn fire(&self) -> bool {
        let mut record = lock(&self.record);

        if record.state.finished() || !record.state.is_voting() {
            debug!("scheduler for {} has nothing left to do", self.id);
            return false;
        }

        let (message, snapshot) = match resolve_round(self.id, &mut record) {
            Ok(message) => {
                info!("game {}: {}", self.id, message.details());
                (message, Some(record.snapshot(self.id)))
            }
            Err(GameError::NoVotesCast) => (
                GameMessage::text(format!("game {}: {}", self.id, GameError::NoVotesCast)),
                None,
            ),
            Err(e) => {
                warn!("game {}: vote could not be played: {}", self.id, e);
                (GameMessage::text(format!("game {}: {}", self.id, e)), None)
            }
        };
        let keep_going = !record.state.finished();
        drop(record);

        if let Some(snapshot) = snapshot {
            persist(self.store.as_ref(), self.id, snapshot);
        }

        if self.events.send(message).is_err() {
            warn!("game {}: nobody is listening for results", self.id);
        }
        if !keep_going {
            info!("game {} finished", self.id);
        }
        keep_going
    }
}
