//! The match store: durable state, mutation operations, change notification.
//!
//! The store owns nothing in memory between calls. Every operation is a full
//! load -> validate -> derive -> mutate -> persist -> notify cycle against
//! the injected [`StateStorage`], so a store always acts on the latest
//! persisted record, including writes made by another process ("tab") under
//! the same key.
//!
//! The cycle is not atomic across processes: two tabs can load the same
//! prior record, mutate independently, and the second write wins. Staleness
//! is mitigated (see [`MatchStore::handle_storage_change`]), the race is not.

use crate::engine::{self, GameView, StatsView};
use crate::error::{InvalidMove, StoreError};
use crate::storage::StateStorage;
use crate::types::{GameRecord, MatchState, Move, Player, SquareId};
use tracing::{info, instrument, warn};

/// Callback invoked with fresh views after every state change.
pub type Subscriber = Box<dyn FnMut(&GameView, &StatsView)>;

/// A mutation request: either a complete replacement record or a pure
/// transform of the current one.
///
/// The shape is fixed by the caller's constructor choice; there is no
/// runtime "wrong kind of argument" path.
pub enum StateUpdate {
    /// Persist this record as-is.
    Replace(MatchState),
    /// Load the current record and persist the transform's output.
    Transform(Box<dyn FnOnce(MatchState) -> MatchState>),
}

impl std::fmt::Debug for StateUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateUpdate::Replace(state) => f.debug_tuple("Replace").field(state).finish(),
            StateUpdate::Transform(_) => f.debug_tuple("Transform").finish(),
        }
    }
}

/// Persists the match record and notifies subscribers of every change.
///
/// Construction takes the storage adapter, the fixed storage key, and the
/// ordered pair of players (turn order alternates by position, `players[0]`
/// first). The player list is immutable for the life of the store.
pub struct MatchStore<S> {
    storage: S,
    key: String,
    players: [Player; 2],
    subscribers: Vec<Subscriber>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for MatchStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchStore")
            .field("storage", &self.storage)
            .field("key", &self.key)
            .field("players", &self.players)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<S: StateStorage> MatchStore<S> {
    /// Creates a store over the given storage surface.
    pub fn new(storage: S, key: impl Into<String>, players: [Player; 2]) -> Self {
        Self {
            storage,
            key: key.into(),
            players,
            subscribers: Vec::new(),
        }
    }

    /// The registered players, in turn order.
    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    /// Loads and validates the persisted record.
    ///
    /// An absent value yields the default empty record; a value that fails
    /// invariant validation is rejected as [`StoreError::Corrupt`] rather
    /// than fed to the engine.
    ///
    /// # Errors
    ///
    /// Fails on storage access, on malformed JSON, or on a corrupt record.
    pub fn state(&self) -> Result<MatchState, StoreError> {
        let state = match self.storage.get(&self.key)? {
            Some(raw) => serde_json::from_str::<MatchState>(&raw)?,
            None => MatchState::default(),
        };
        state.validate().map_err(|e| {
            warn!(key = %self.key, error = %e, "persisted record failed validation");
            e
        })?;
        Ok(state)
    }

    /// Derived view of the active game, always from the latest record.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::state`] failures.
    pub fn game(&self) -> Result<GameView, StoreError> {
        let state = self.state()?;
        Ok(engine::derive_game(&state.current_game_moves, &self.players))
    }

    /// Derived round scoreboard, always from the latest record.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::state`] failures.
    pub fn stats(&self) -> Result<StatsView, StoreError> {
        let state = self.state()?;
        Ok(engine::derive_stats(
            &self.players,
            &state.history.current_round_games,
        ))
    }

    /// Records a move on the given square for whoever's turn it is.
    ///
    /// The acting player is re-derived from the move count at call time, so
    /// a caller cannot spoof attribution.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMove::GameComplete`] when the game has already
    /// ended and [`InvalidMove::SquareOccupied`] when the square is taken.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn record_move(&mut self, square_id: SquareId) -> Result<(), StoreError> {
        let state = self.state()?;
        let game = engine::derive_game(&state.current_game_moves, &self.players);

        if game.status.is_complete {
            warn!(%square_id, "move rejected: game already complete");
            return Err(InvalidMove::GameComplete.into());
        }
        if state
            .current_game_moves
            .iter()
            .any(|mv| mv.square_id == square_id)
        {
            warn!(%square_id, "move rejected: square occupied");
            return Err(InvalidMove::SquareOccupied(square_id).into());
        }

        let player = game.current_player;
        info!(%square_id, player_id = player.id, "recording move");
        self.apply(StateUpdate::Transform(Box::new(move |mut state| {
            state.current_game_moves.push(Move::new(square_id, player));
            state
        })))
    }

    /// Resets the active game.
    ///
    /// A complete game is archived into the current round's history first;
    /// an in-progress game is discarded and leaves no trace in statistics.
    ///
    /// # Errors
    ///
    /// Propagates load and persist failures.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn reset_game(&mut self) -> Result<(), StoreError> {
        let game = self.game()?;
        info!(
            archived = game.status.is_complete,
            moves = game.moves.len(),
            "resetting game"
        );
        self.apply(StateUpdate::Transform(Box::new(move |mut state| {
            if game.status.is_complete {
                state.history.current_round_games.push(GameRecord {
                    moves: game.moves,
                    status: game.status,
                });
            }
            state.current_game_moves.clear();
            state
        })))
    }

    /// Ends the round: resets the game, then folds the round's games into
    /// the permanent history and zeroes the scoreboard.
    ///
    /// # Errors
    ///
    /// Propagates load and persist failures.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn start_new_round(&mut self) -> Result<(), StoreError> {
        self.reset_game()?;
        info!("starting new round");
        self.apply(StateUpdate::Transform(Box::new(|mut state| {
            let finished = std::mem::take(&mut state.history.current_round_games);
            state.history.all_games.extend(finished);
            state
        })))
    }

    /// Registers a subscriber, invoked with fresh `(GameView, StatsView)`
    /// after every successful write and on every external change signal.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&GameView, &StatsView) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Hook for the external "storage changed" signal (another tab wrote
    /// under the same key): re-derives from the latest record and
    /// re-publishes to subscribers.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::state`] failures.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn handle_storage_change(&mut self) -> Result<(), StoreError> {
        info!("state changed externally, re-deriving");
        self.notify()
    }

    /// Applies a mutation request: resolves it to the next record,
    /// validates, persists, and notifies subscribers.
    ///
    /// The three named operations all funnel through here; the method is
    /// public for callers that need a bespoke transition (e.g. restoring a
    /// backup), which still cannot bypass validation.
    ///
    /// # Errors
    ///
    /// Fails on load (for [`StateUpdate::Transform`]), on a resulting
    /// record that violates the model invariants, or on persist.
    pub fn apply(&mut self, update: StateUpdate) -> Result<(), StoreError> {
        let next = match update {
            StateUpdate::Replace(state) => state,
            StateUpdate::Transform(transform) => transform(self.state()?),
        };
        next.validate()?;

        let encoded = serde_json::to_string(&next)?;
        self.storage.set(&self.key, &encoded)?;
        self.notify()
    }

    /// Derives fresh views and delivers them to every subscriber.
    ///
    /// Fire-and-forget, synchronous, at most one delivery per mutation.
    fn notify(&mut self) -> Result<(), StoreError> {
        let state = self.state()?;
        let game = engine::derive_game(&state.current_game_moves, &self.players);
        let stats = engine::derive_stats(&self.players, &state.history.current_round_games);
        for subscriber in &mut self.subscribers {
            subscriber(&game, &stats);
        }
        Ok(())
    }
}
