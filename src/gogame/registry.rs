use crate::core::config::AppConfig;
use crate::core::entities::{GameId, Move, Players};
use crate::core::errors::GameError;
use crate::gogame::board::Board;
use crate::gogame::command::{Command, GameSelector};
use crate::gogame::game::{GameState, Voting};
use crate::gogame::game_message::GameMessage;
use crate::gogame::locator::{self, Playable};
use crate::gogame::scheduler::{
    lock, persist, resolve_round, GameRecord, Scheduler, SchedulerHandle, SharedRecord,
};
use crate::gogame::store::{Snapshot, Store};
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

struct GameEntry {
    record: SharedRecord,
    scheduler: Option<SchedulerHandle>,
}

struct Games {
    entries: BTreeMap<GameId, GameEntry>,
    next_id: GameId,
}

/// What the locator needs to know about a game, read under its lock.
struct Summary {
    id: GameId,
    players: Players,
    updated_at: DateTime<Utc>,
    finished: bool,
    record: SharedRecord,
}

impl Playable for Summary {
    fn id(&self) -> GameId {
        self.id
    }

    fn is_player(&self, player: &str) -> bool {
        self.players.is_player(player)
    }
}

/// Owns every game, its vote pool and its scheduler.
///
/// Commands for different games run in parallel; each game is behind its own
/// lock, which the scheduler takes too when it resolves a round. The registry
/// lock is only held to find or add games, never while a game is played.
/// Records are serialized under the game lock and written to the store after
/// every lock is released.
pub struct Registry {
    games: Mutex<Games>,
    board_size: usize,
    interval: Duration,
    seed: Option<u64>,
    store: Arc<dyn Store>,
    events: mpsc::UnboundedSender<GameMessage>,
    runtime: Handle,
}

impl Registry {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn Store>,
        events: mpsc::UnboundedSender<GameMessage>,
        runtime: Handle,
    ) -> Self {
        Registry {
            games: Mutex::new(Games {
                entries: BTreeMap::new(),
                next_id: 1,
            }),
            board_size: config.board.size,
            interval: config.voting.interval(),
            seed: config.voting.seed,
            store,
            events,
            runtime,
        }
    }

    /// Brings back every stored game and restarts the schedulers of the
    /// unfinished voting ones. Returns how many games were loaded.
    pub fn restore(&self) -> Result<usize, GameError> {
        let stored = self.store.load_all()?;
        let count = stored.len();
        let mut games = self.games();

        for Snapshot { id, version, blob } in stored {
            let state = GameState::from_json(&blob)?;
            let record = GameRecord::new(state, self.seed_for(id))
                .resumed_at(version)
                .shared();
            let scheduler = self.scheduler_for(id, &record);
            games.entries.insert(id, GameEntry { record, scheduler });
            games.next_id = games.next_id.max(id + 1);
        }

        info!("restored {} games", count);
        Ok(count)
    }

    pub fn handle(&self, player: &str, command: Command) -> Result<GameMessage, GameError> {
        match command {
            Command::Start { players, voting } => self.start(players, voting),
            Command::Move { game, coords } => self.play(player, game, Move::Place(coords)),
            Command::Pass { game } => self.play(player, game, Move::Pass),
            Command::VoteMove { game, coords } => self.vote(player, game, Move::Place(coords)),
            Command::VotePass { game } => self.vote(player, game, Move::Pass),
            Command::ResolveNow { game } => self.resolve_now(player, game),
            Command::Show { game } => {
                let (id, record) = self.locate(player, game)?;
                let record = lock(&record);
                Ok(GameMessage::updated(id, &record.state, ""))
            }
            Command::List { all } => Ok(self.list(all)),
            Command::SetVoting { game, enabled } => self.set_voting(player, game, enabled),
        }
    }

    /// Stops every scheduler and waits until they have all exited.
    pub async fn shutdown(&self) {
        let handles: Vec<_> = {
            let mut games = self.games();
            games
                .entries
                .values_mut()
                .filter_map(|entry| entry.scheduler.take())
                .map(SchedulerHandle::stop)
                .collect()
        };

        debug!("waiting for {} schedulers", handles.len());
        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                error!("scheduler task failed: {}", e);
            }
        }
    }

    fn start(&self, players: Players, voting: Voting) -> Result<GameMessage, GameError> {
        let board = Board::new(self.board_size, self.board_size);
        let state = GameState::new(players, voting, board);
        let (id, message, snapshot) = {
            let mut games = self.games();
            let id = games.next_id;
            games.next_id += 1;

            let message = GameMessage::updated(id, &state, &format!("started game {}", id));
            let mut record = GameRecord::new(state, self.seed_for(id));
            let snapshot = record.snapshot(id);
            let record = record.shared();
            let scheduler = self.scheduler_for(id, &record);
            games.entries.insert(id, GameEntry { record, scheduler });

            info!("started game {} (voting: {})", id, voting.required);
            (id, message, snapshot)
        };
        self.save(id, snapshot);
        Ok(message)
    }

    fn play(&self, player: &str, game: GameSelector, mv: Move) -> Result<GameMessage, GameError> {
        let (id, record) = self.locate(player, game)?;
        let (message, snapshot) = {
            let mut record = lock(&record);

            if record.state.finished() {
                return Err(GameError::GameOver);
            }
            if record.state.is_voting() {
                return Err(GameError::VotingRequired);
            }
            record.state.apply(player, mv)?;

            if record.state.finished() {
                info!("game {} finished", id);
            }
            let message = GameMessage::updated(id, &record.state, &mv.to_string());
            (message, record.snapshot(id))
        };
        self.save(id, snapshot);
        Ok(message)
    }

    fn vote(&self, player: &str, game: GameSelector, mv: Move) -> Result<GameMessage, GameError> {
        let (id, record) = self.locate(player, game)?;
        let mut record = lock(&record);

        if record.state.finished() {
            return Err(GameError::GameOver);
        }
        if !record.state.is_voting() {
            return Err(GameError::VotingNotAllowed);
        }
        if !record.state.is_authorized(player) {
            return Err(GameError::Unauthorized);
        }

        // legality is only checked once the vote is picked
        if let Some(previous) = record.votes.record(player, mv) {
            debug!("game {}: {} changed vote from {} to {}", id, player, previous, mv);
        } else {
            debug!("game {}: {} voted to {}", id, player, mv);
        }
        Ok(GameMessage::text("thanks for voting"))
    }

    fn resolve_now(&self, player: &str, game: GameSelector) -> Result<GameMessage, GameError> {
        let (id, record) = self.locate(player, game)?;
        let mut guard = lock(&record);

        if guard.state.finished() {
            return Err(GameError::GameOver);
        }
        if !guard.state.is_voting() {
            return Err(GameError::VotingNotAllowed);
        }

        let message = resolve_round(id, &mut guard)?;
        info!("game {}: {}", id, message.details());

        let snapshot = guard.snapshot(id);
        let finished = guard.state.finished();
        drop(guard);
        self.save(id, snapshot);
        if finished {
            info!("game {} finished", id);
            self.stop_scheduler(id);
        }
        Ok(message)
    }

    fn set_voting(
        &self,
        player: &str,
        game: GameSelector,
        enabled: bool,
    ) -> Result<GameMessage, GameError> {
        let (id, record) = self.locate(player, game)?;
        let mut games = self.games();
        let mut guard = lock(&record);

        if guard.state.finished() {
            return Err(GameError::GameOver);
        }
        if guard.state.is_voting() == enabled {
            return Ok(GameMessage::updated(id, &guard.state, "voting unchanged"));
        }

        let details = if enabled {
            guard.state.set_voting(Voting::every(self.interval));
            "voting enabled"
        } else {
            guard.state.set_voting(Voting::disabled());
            let dropped = guard.votes.drain();
            debug!("game {}: dropped {} pending votes", id, dropped.len());
            "voting disabled"
        };
        let message = GameMessage::updated(id, &guard.state, details);
        let snapshot = guard.snapshot(id);
        drop(guard);

        if let Some(entry) = games.entries.get_mut(&id) {
            if let Some(scheduler) = entry.scheduler.take() {
                drop(scheduler.stop());
            }
            if enabled {
                entry.scheduler = self.scheduler_for(id, &record);
            }
        }
        drop(games);

        self.save(id, snapshot);
        info!("game {}: {}", id, details);
        Ok(message)
    }

    fn list(&self, all: bool) -> GameMessage {
        let lines: Vec<String> = self
            .summaries()
            .iter()
            .filter(|s| all || !s.finished)
            .map(|s| {
                let record = lock(&s.record);
                let state = &record.state;
                let status = if state.finished() {
                    "finished".to_string()
                } else {
                    format!("{} to move", state.next.name())
                };
                let mode = if state.is_voting() { ", voting" } else { "" };
                format!("game {}: {}, {} moves{}", s.id, status, state.history.len() - 1, mode)
            })
            .collect();

        if lines.is_empty() {
            GameMessage::text("no games")
        } else {
            GameMessage::text(lines.join("\n"))
        }
    }

    fn locate(
        &self,
        player: &str,
        game: GameSelector,
    ) -> Result<(GameId, SharedRecord), GameError> {
        let summaries = self.summaries();
        let found = locator::find(game, &summaries, player)?;
        Ok((found.id, found.record.clone()))
    }

    /// Every game, most recently updated first.
    fn summaries(&self) -> Vec<Summary> {
        let games = self.games();
        let mut summaries: Vec<Summary> = games
            .entries
            .iter()
            .map(|(id, entry)| {
                let record = lock(&entry.record);
                Summary {
                    id: *id,
                    players: record.state.players.clone(),
                    updated_at: record.state.updated_at,
                    finished: record.state.finished(),
                    record: entry.record.clone(),
                }
            })
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        summaries
    }

    fn scheduler_for(&self, id: GameId, record: &SharedRecord) -> Option<SchedulerHandle> {
        let interval = {
            let guard = lock(record);
            if guard.state.finished() || !guard.state.is_voting() {
                return None;
            }
            guard.state.voting.interval()
        };

        let scheduler = Scheduler::new(
            id,
            record.clone(),
            interval,
            self.events.clone(),
            self.store.clone(),
        );
        Some(scheduler.spawn(&self.runtime))
    }

    fn stop_scheduler(&self, id: GameId) {
        let mut games = self.games();
        if let Some(scheduler) = games.entries.get_mut(&id).and_then(|e| e.scheduler.take()) {
            debug!("stopping scheduler for {}", id);
            drop(scheduler.stop());
        }
    }

    fn seed_for(&self, id: GameId) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(id))
    }

    fn save(&self, id: GameId, snapshot: Result<Snapshot, GameError>) {
        persist(self.store.as_ref(), id, snapshot);
    }

    fn games(&self) -> MutexGuard<'_, Games> {
        self.games.lock().unwrap_or_else(|e| e.into_inner())
    }
}
