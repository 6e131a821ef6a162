//! Mutable per-level session data shared between the player simulation and
//! the presentation collaborators.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use kingspigs_core::{Block, Point};

use crate::level::{Level, LevelTexture, Pickup};

/// Counters shown on the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStats {
    pub diamonds: u32,
    /// Seconds since the session started.
    pub timer: u32,
    pub lives: u32,
}

/// Elapsed-seconds counter written by a background task and read by the tick.
///
/// The counter is the only state mutated off the tick, so it is a single
/// atomic with one writer.
#[derive(Debug, Clone, Default)]
pub struct LevelTimer {
    seconds: Arc<AtomicU32>,
}

impl LevelTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&self) {
        self.seconds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn seconds(&self) -> u32 {
        self.seconds.load(Ordering::Relaxed)
    }

    /// Start a task that ticks once per `period`. Abort the handle to stop it.
    pub fn spawn(&self, period: Duration) -> JoinHandle<()> {
        let timer = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // First tick of a tokio interval completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                timer.tick();
            }
        })
    }
}

/// What the renderer needs from the player each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub position: Point,
    pub attack_hitbox: Option<Block>,
}

#[derive(Debug)]
pub struct LevelState {
    pub level: Level,
    diamonds: u32,
    lives: u32,
    timer: LevelTimer,
    pub player: PlayerView,
    /// Raster for the current level, once it has arrived.
    pub texture: Option<LevelTexture>,
}

impl LevelState {
    pub fn new(index: u32, lives: u32, timer: LevelTimer) -> Self {
        let level = Level::empty(index);
        Self {
            player: PlayerView {
                position: level.initial_position,
                attack_hitbox: None,
            },
            level,
            diamonds: 0,
            lives,
            timer,
            texture: None,
        }
    }

    pub fn index(&self) -> u32 {
        self.level.index
    }

    pub fn stats(&self) -> LevelStats {
        LevelStats {
            diamonds: self.diamonds,
            timer: self.timer.seconds(),
            lives: self.lives,
        }
    }

    /// Swap loaded geometry in as a whole. Ignored if it belongs to another index.
    pub fn install(&mut self, level: Level) -> bool {
        if level.index != self.level.index {
            return false;
        }
        self.level = level;
        true
    }

    /// Keep a texture for the current index. Ignored if it belongs to another.
    pub fn install_texture(&mut self, texture: LevelTexture) -> bool {
        if texture.index != self.level.index {
            return false;
        }
        self.texture = Some(texture);
        true
    }

    /// Move to the next index with empty geometry and no texture. Stats carry over.
    pub fn advance_level(&mut self) -> u32 {
        self.level = Level::empty(self.level.index + 1);
        self.texture = None;
        self.level.index
    }

    /// Remove the pickup at `index`; later pickups shift down by one.
    pub fn take_item(&mut self, index: usize) -> Option<Pickup> {
        (index < self.level.items.len()).then(|| self.level.items.remove(index))
    }

    pub fn add_diamond(&mut self) -> u32 {
        self.diamonds += 1;
        self.diamonds
    }

    /// Returns the lives left, never going below zero.
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    pub fn publish_player(&mut self, view: PlayerView) {
        self.player = view;
    }
}
