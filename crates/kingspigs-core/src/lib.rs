pub mod events;
pub mod geometry;
pub mod input;

pub use events::{DialogKind, DoorKind, GameEvent, ParticleKind, SoundCue};
pub use geometry::{Block, Point};
pub use input::{Action, InputEvent};

/// Tile pitch of the level grid in pixels.
pub const TILE_SIZE: f32 = 16.0;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::geometry::Block;
    use crate::TILE_SIZE;

    /// A solid floor `tiles` wide whose top edge sits at `top`.
    pub fn floor(x: f32, top: f32, tiles: u32) -> Block {
        Block::new(x, top, tiles as f32 * TILE_SIZE, TILE_SIZE)
    }

    /// A vertical wall `tiles` high whose left edge sits at `left`.
    pub fn wall(left: f32, y: f32, tiles: u32) -> Block {
        Block::new(left, y, TILE_SIZE, tiles as f32 * TILE_SIZE)
    }

    /// A thin one-way platform with the default 32x10 footprint.
    pub fn platform(x: f32, top: f32) -> Block {
        Block::new(x, top, 32.0, 10.0)
    }

    /// Count events matching a predicate.
    pub fn count_events<T>(events: &[T], pred: impl Fn(&T) -> bool) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }
}
