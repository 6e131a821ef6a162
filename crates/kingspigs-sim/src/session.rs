//! Sequences level loads, input and ticks for one play-through.
//!
//! Level documents and textures load on a tokio task and come back over a channel tagged
//! with a [`LoadTicket`]. Only the ticket from the most recent
//! [`LevelSession::begin_load`] is accepted; anything older is dropped, so a
//! slow load for a level the player already left can never overwrite the
//! current geometry.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use kingspigs_core::{Action, Block, DoorKind, GameEvent, InputEvent};

use crate::animation::AnimationKind;
use crate::config::GameConfig;
use crate::error::{LevelError, LoadError};
use crate::level::{Decorations, Door, Level, LevelLoader, LevelTexture, Pickup};
use crate::level_state::{LevelState, LevelStats, LevelTimer, PlayerView};
use crate::player::Player;

/// Identifies one load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub index: u32,
    pub generation: u64,
}

/// One half of a level load arriving from the load task.
#[derive(Debug)]
pub enum Loaded {
    Level(Result<Level, LevelError>),
    Texture(Result<LevelTexture, LoadError>),
}

type LoadResult = (LoadTicket, Loaded);

/// Read-only view of a session for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub index: u32,
    pub stats: LevelStats,
    pub player: PlayerView,
    pub action: AnimationKind,
    pub items: Vec<Pickup>,
    pub doors: Vec<Door>,
    pub boxes: Vec<Block>,
    pub decorations: Decorations,
}

pub struct LevelSession {
    config: GameConfig,
    loader: LevelLoader,
    state: LevelState,
    player: Player,
    ready: bool,
    generation: u64,
    pending: Option<JoinHandle<()>>,
    awaiting_level: bool,
    awaiting_texture: bool,
    load_tx: mpsc::UnboundedSender<LoadResult>,
    load_rx: mpsc::UnboundedReceiver<LoadResult>,
    timer_task: JoinHandle<()>,
    events: Vec<GameEvent>,
}

impl LevelSession {
    /// Create a session on the configured first level. Nothing loads until
    /// [`begin_load`](Self::begin_load) is called.
    ///
    /// Must be called from within a Tokio runtime: the level timer starts here.
    pub fn new(config: GameConfig) -> Self {
        let timer = LevelTimer::new();
        let timer_task = timer.spawn(Duration::from_secs(1));
        let state = LevelState::new(config.level.first_level, config.level.starting_lives, timer);
        let player = Player::spawn(state.level.initial_position, &config);
        let (load_tx, load_rx) = mpsc::unbounded_channel();
        Self {
            loader: LevelLoader::new(config.level.clone()),
            config,
            state,
            player,
            ready: false,
            generation: 0,
            pending: None,
            awaiting_level: false,
            awaiting_texture: false,
            load_tx,
            load_rx,
            timer_task,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &LevelState {
        &self.state
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn stats(&self) -> LevelStats {
        self.state.stats()
    }

    /// True once the current level's geometry is installed.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Start loading the current level's document and texture, superseding
    /// any load in flight.
    pub fn begin_load(&mut self) -> LoadTicket {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
        self.generation += 1;
        self.ready = false;
        self.awaiting_level = true;
        self.awaiting_texture = true;
        let ticket = LoadTicket {
            index: self.state.index(),
            generation: self.generation,
        };

        let loader = self.loader.clone();
        let tx = self.load_tx.clone();
        self.pending = Some(tokio::spawn(async move {
            let level = async {
                let result = loader.load_level(ticket.index).await;
                let _ = tx.send((ticket, Loaded::Level(result)));
            };
            let texture = async {
                let result = loader.load_texture(ticket.index).await;
                let _ = tx.send((ticket, Loaded::Texture(result)));
            };
            tokio::join!(level, texture);
        }));

        tracing::info!(
            index = ticket.index,
            generation = ticket.generation,
            "Loading level"
        );
        ticket
    }

    /// Install whatever has finished loading without blocking.
    ///
    /// Returns the installed index, `None` if no current document has
    /// arrived, or the error that blocks entering the level. Textures are
    /// installed as they arrive and never produce a result here.
    pub fn poll_loads(&mut self) -> Result<Option<u32>, LevelError> {
        while let Ok((ticket, loaded)) = self.load_rx.try_recv() {
            if let Some(outcome) = self.accept(ticket, loaded) {
                return outcome.map(Some);
            }
        }
        Ok(None)
    }

    /// Wait until the current load has delivered both document and texture.
    ///
    /// Returns early with the error if the document fails. Without a load in
    /// flight this returns immediately: the current index if it is installed,
    /// [`LevelError::NotRequested`] otherwise.
    pub async fn wait_for_level(&mut self) -> Result<u32, LevelError> {
        let mut installed = None;
        while self.awaiting_level || self.awaiting_texture {
            let Some((ticket, loaded)) = self.load_rx.recv().await else {
                break;
            };
            match self.accept(ticket, loaded) {
                Some(Err(e)) => return Err(e),
                Some(Ok(index)) => installed = Some(index),
                None => {},
            }
        }
        match installed {
            Some(index) => Ok(index),
            None if self.ready => Ok(self.state.index()),
            None => Err(LevelError::NotRequested(self.state.index())),
        }
    }

    fn accept(&mut self, ticket: LoadTicket, loaded: Loaded) -> Option<Result<u32, LevelError>> {
        if ticket.generation != self.generation || ticket.index != self.state.index() {
            tracing::debug!(
                index = ticket.index,
                generation = ticket.generation,
                current = self.generation,
                "Discarding stale level load"
            );
            return None;
        }

        let outcome = match loaded {
            Loaded::Texture(result) => {
                self.awaiting_texture = false;
                match result {
                    Ok(texture) => {
                        self.state.install_texture(texture);
                    },
                    Err(e) => tracing::warn!(index = ticket.index, "Level texture unavailable: {e}"),
                }
                None
            },
            Loaded::Level(result) => {
                self.awaiting_level = false;
                Some(result.map(|level| self.install(ticket.index, level)))
            },
        };
        if !self.awaiting_level && !self.awaiting_texture {
            self.pending = None;
        }
        if let Some(Err(e)) = &outcome {
            tracing::warn!(index = ticket.index, "Level load failed: {e}");
        }
        outcome
    }

    fn install(&mut self, index: u32, level: Level) -> u32 {
        self.state.install(level);
        self.player = Player::spawn(self.state.level.initial_position, &self.config);
        if let Some(door) = self.state.level.door_mut(DoorKind::Prev) {
            door.open();
        }
        self.events.push(GameEvent::DoorOpened(DoorKind::Prev));
        self.ready = true;

        tracing::info!(
            index,
            items = self.state.level.items.len(),
            "Level installed"
        );
        index
    }

    /// Route an input edge to the player. Ignored while a level is loading.
    pub fn handle_input(&mut self, event: InputEvent) {
        if !self.ready {
            return;
        }
        match event {
            InputEvent::Start(Action::Left) => self.player.press_run(true),
            InputEvent::Start(Action::Right) => self.player.press_run(false),
            InputEvent::End(Action::Left) => self.player.stop_run(true),
            InputEvent::End(Action::Right) => self.player.stop_run(false),
            InputEvent::Start(Action::Up) => self.player.press_up(&mut self.state),
            InputEvent::End(Action::Up) => self.player.release_up(),
            InputEvent::Start(Action::Special) => {
                self.player.attack();
            },
            InputEvent::End(Action::Special) => {},
        }
    }

    /// Run one frame. The player only ticks once geometry is installed.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let mut events = std::mem::take(&mut self.events);
        if !self.ready {
            return events;
        }
        events.extend(self.player.tick(&mut self.state));
        if events.contains(&GameEvent::LevelComplete) {
            self.advance_level();
        }
        events
    }

    /// Clear the current geometry and start loading the next index.
    pub fn advance_level(&mut self) -> LoadTicket {
        let index = self.state.advance_level();
        let stats = self.state.stats();
        tracing::info!(index, diamonds = stats.diamonds, lives = stats.lives, "Advancing level");
        self.begin_load()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            index: self.state.index(),
            stats: self.state.stats(),
            player: self.state.player,
            action: self.player.action(),
            items: self.state.level.items.clone(),
            doors: self.state.level.doors.clone(),
            boxes: self.state.level.boxes.clone(),
            decorations: self.state.level.decorations.clone(),
        }
    }

    /// MessagePack encoding of [`snapshot`](Self::snapshot).
    pub fn serialize_state(&self) -> Vec<u8> {
        rmp_serde::to_vec(&self.snapshot()).unwrap_or_default()
    }
}

impl Drop for LevelSession {
    fn drop(&mut self) {
        self.timer_task.abort();
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::OFFSCREEN;

    fn session() -> LevelSession {
        let mut config = GameConfig::default();
        config.level.assets_dir = "does/not/exist".into();
        LevelSession::new(config)
    }

    #[tokio::test]
    async fn new_session_waits_for_geometry() {
        let mut session = session();
        assert!(!session.is_ready());
        assert_eq!(session.state().index(), 1);

        session.handle_input(InputEvent::Start(Action::Right));
        assert!(session.tick().is_empty());
        assert_eq!(session.player().position, OFFSCREEN);
    }

    #[tokio::test]
    async fn missing_document_surfaces_io_error() {
        let mut session = session();
        session.begin_load();
        let err = session.wait_for_level().await.unwrap_err();
        assert!(matches!(err, LevelError::Load(crate::error::LoadError::Io { .. })));
        assert!(!session.is_ready());
    }

    #[tokio::test]
    async fn stale_ticket_is_discarded() {
        let mut session = session();
        let first = session.begin_load();
        let second = session.begin_load();
        assert_eq!(second.generation, first.generation + 1);

        let stale = session.accept(first, Loaded::Level(Ok(Level::empty(1))));
        assert!(stale.is_none());
        assert!(!session.is_ready());
    }

    #[tokio::test]
    async fn stale_texture_is_discarded() {
        let mut session = session();
        let first = session.begin_load();
        let second = session.begin_load();
        let texture = || {
            Loaded::Texture(Ok(LevelTexture {
                index: 1,
                bytes: vec![7],
            }))
        };

        assert!(session.accept(first, texture()).is_none());
        assert!(session.state().texture.is_none());

        assert!(session.accept(second, texture()).is_none());
        assert_eq!(session.state().texture.as_ref().map(|t| t.bytes.clone()), Some(vec![7]));
    }

    #[tokio::test]
    async fn waiting_without_a_load_returns_immediately() {
        let mut session = session();
        assert_eq!(
            session.wait_for_level().await,
            Err(LevelError::NotRequested(1))
        );
    }

    #[tokio::test]
    async fn snapshot_decodes() {
        let session = session();
        let bytes = session.serialize_state();
        let snapshot: SessionSnapshot = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(snapshot, session.snapshot());
        assert_eq!(snapshot.stats.lives, 3);
    }
}
