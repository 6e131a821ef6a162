use serde::{Deserialize, Serialize};

/// A 2D point in level pixels. `y` grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned rectangle used for every collidable and detectable region.
///
/// Blocks are plain values. Moving one produces a new block; nothing else
/// holds a reference to it, so an actor updating its hitbox can never leak
/// that change into level geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub position: Point,
    pub width: f32,
    pub height: f32,
}

impl Block {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Point::new(x, y),
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.position.x
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.position.y
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.height
    }

    /// Closed-interval AABB test: blocks that only share an edge overlap.
    pub fn overlaps(&self, other: &Block) -> bool {
        self.left() <= other.right()
            && self.right() >= other.left()
            && self.bottom() >= other.top()
            && self.top() <= other.bottom()
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        self.with_position(self.position.offset(dx, dy))
    }

    pub fn with_position(&self, position: Point) -> Self {
        Self { position, ..*self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges() {
        let b = Block::new(10.0, 20.0, 16.0, 8.0);
        assert_eq!(b.left(), 10.0);
        assert_eq!(b.right(), 26.0);
        assert_eq!(b.top(), 20.0);
        assert_eq!(b.bottom(), 28.0);
    }

    #[test]
    fn touching_edges_count_as_overlap() {
        let a = Block::new(0.0, 0.0, 16.0, 16.0);
        let right_neighbour = Block::new(16.0, 0.0, 16.0, 16.0);
        let below = Block::new(0.0, 16.0, 16.0, 16.0);
        assert!(a.overlaps(&right_neighbour));
        assert!(a.overlaps(&below));
    }

    #[test]
    fn separated_blocks_do_not_overlap() {
        let a = Block::new(0.0, 0.0, 16.0, 16.0);
        let b = Block::new(16.5, 0.0, 16.0, 16.0);
        let c = Block::new(0.0, 40.0, 16.0, 16.0);
        assert!(!a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn translated_leaves_original_untouched() {
        let a = Block::new(0.0, 0.0, 24.0, 26.0);
        let moved = a.translated(5.0, -3.0);
        assert_eq!(a.position, Point::new(0.0, 0.0));
        assert_eq!(moved.position, Point::new(5.0, -3.0));
        assert_eq!(moved.width, 24.0);
        assert_eq!(moved.height, 26.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn block() -> impl Strategy<Value = Block> {
            (-500.0f32..500.0, -500.0f32..500.0, 1.0f32..64.0, 1.0f32..64.0)
                .prop_map(|(x, y, w, h)| Block::new(x, y, w, h))
        }

        proptest! {
            #[test]
            fn overlap_is_symmetric(a in block(), b in block()) {
                prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
            }

            #[test]
            fn block_overlaps_itself(a in block()) {
                prop_assert!(a.overlaps(&a));
            }
        }
    }
}
