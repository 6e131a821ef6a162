//! Level geometry: the immutable result of loading one tile-map document.

pub mod document;
pub mod loader;

use serde::{Deserialize, Serialize};

use kingspigs_core::{Block, DoorKind, Point};

pub use document::{CellSize, LevelDocument, blocks_from_2d, parse_2d};
pub use loader::{LevelLoader, LevelTexture, parse_level, resolve_doors};

/// Animation phase of a door sprite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorPhase {
    #[default]
    Idle,
    Opening,
}

/// A level transition trigger. Every level has exactly one of each kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub kind: DoorKind,
    pub hitbox: Block,
    pub phase: DoorPhase,
}

impl Door {
    pub fn new(kind: DoorKind, hitbox: Block) -> Self {
        Self {
            kind,
            hitbox,
            phase: DoorPhase::Idle,
        }
    }

    pub fn open(&mut self) {
        self.phase = DoorPhase::Opening;
    }

    pub fn idle(&mut self) {
        self.phase = DoorPhase::Idle;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Diamond,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub kind: PickupKind,
    pub hitbox: Block,
}

/// Non-colliding props drawn by the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Decorations {
    pub candles: Vec<Block>,
    pub small_chains: Vec<Block>,
    pub big_chains: Vec<Block>,
    pub windows: Vec<Block>,
}

/// Engine-ready geometry for one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub index: u32,
    pub collision_blocks: Vec<Block>,
    /// One-way platforms.
    pub platform_blocks: Vec<Block>,
    pub boxes: Vec<Block>,
    pub doors: Vec<Door>,
    pub items: Vec<Pickup>,
    pub decorations: Decorations,
    pub initial_position: Point,
}

/// Spawn point used before any geometry has arrived.
pub const OFFSCREEN: Point = Point::new(-100.0, -100.0);

impl Level {
    /// A level whose geometry has not been loaded yet. It has no obstacles.
    pub fn empty(index: u32) -> Self {
        Self {
            index,
            collision_blocks: Vec::new(),
            platform_blocks: Vec::new(),
            boxes: Vec::new(),
            doors: Vec::new(),
            items: Vec::new(),
            decorations: Decorations::default(),
            initial_position: OFFSCREEN,
        }
    }

    pub fn door(&self, kind: DoorKind) -> Option<&Door> {
        self.doors.iter().find(|d| d.kind == kind)
    }

    pub fn door_mut(&mut self, kind: DoorKind) -> Option<&mut Door> {
        self.doors.iter_mut().find(|d| d.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_level_has_no_obstacles() {
        let level = Level::empty(4);
        assert_eq!(level.index, 4);
        assert!(level.collision_blocks.is_empty());
        assert!(level.door(DoorKind::Prev).is_none());
    }

    #[test]
    fn door_open_and_idle() {
        let mut door = Door::new(DoorKind::Next, Block::new(0.0, 0.0, 46.0, 56.0));
        assert_eq!(door.phase, DoorPhase::Idle);
        door.open();
        assert_eq!(door.phase, DoorPhase::Opening);
        door.idle();
        assert_eq!(door.phase, DoorPhase::Idle);
    }
}
