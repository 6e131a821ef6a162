//! One-shot notifications emitted by the simulation for presentation
//! collaborators (renderer, audio, dialog bubbles).
//!
//! The simulation never waits on these. A tick returns the events it
//! produced in emission order and the caller forwards them.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Named sound effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    Run,
    Jump,
    Fall,
    Kill,
    Sword,
    Diamond,
    DoorIn,
    DoorOut,
}

/// Decorative particle effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Run,
    Jump,
    Fall,
    Diamond,
    Disappearing,
}

/// Speech bubbles shown above the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogKind {
    /// Idle too long.
    Hello,
    /// Standing in front of an enterable door.
    Exclamation,
}

/// Which door of the level pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorKind {
    Prev,
    Next,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PlaySound(SoundCue),
    StopSound(SoundCue),
    Particle {
        kind: ParticleKind,
        position: Point,
        /// Mirrors the player's `inverted` flag.
        facing_left: bool,
    },
    ShowDialog(DialogKind),
    ClearDialog,
    DoorOpened(DoorKind),
    DoorIdled(DoorKind),
    DiamondCollected {
        position: Point,
        total: u32,
    },
    LifeLost {
        remaining: u32,
    },
    LivesExhausted,
    Respawned {
        position: Point,
    },
    /// The exit door animation finished; the session advances the level.
    LevelComplete,
}
