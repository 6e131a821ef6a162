//! Axis-separated collision correction against static rectangles.
//!
//! Each resolver takes a [`Body`] snapshot and returns the corrected one.
//! A block qualifies when the body's edge crossed the block's edge this tick
//! (closed interval on the resolved axis, so resting contact keeps resolving)
//! and the spans on the other axis strictly overlap (so sliding flush along a
//! wall or a floor seam never snags). The first qualifying block in slice
//! order wins.

use kingspigs_core::{Block, Point};

/// Kinematic state handed to the resolvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Point,
    pub velocity: Point,
    pub hitbox: Block,
    /// Hitbox as it was at the end of the previous tick.
    pub previous: Block,
}

/// What vertical resolution did to the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalContact {
    None,
    /// Came to rest on top of a block.
    Floor,
    /// Bumped a block from below.
    Ceiling,
}

impl Body {
    fn shifted(mut self, dx: f32, dy: f32) -> Self {
        self.position = self.position.offset(dx, dy);
        self.hitbox = self.hitbox.translated(dx, dy);
        self
    }
}

fn spans_x(a: &Block, b: &Block) -> bool {
    a.left() < b.right() && a.right() > b.left()
}

fn spans_y(a: &Block, b: &Block) -> bool {
    a.top() < b.bottom() && a.bottom() > b.top()
}

/// Stop horizontal motion at the first wall the hitbox ran into.
pub fn resolve_horizontal(body: Body, blocks: &[Block]) -> Body {
    let hb = body.hitbox;
    for block in blocks {
        if !spans_y(&hb, block) {
            continue;
        }
        if body.velocity.x > 0.0 && hb.right() >= block.left() && body.previous.right() <= block.left()
        {
            return body.shifted(block.left() - hb.right(), 0.0);
        }
        if body.velocity.x < 0.0 && hb.left() <= block.right() && body.previous.left() >= block.right()
        {
            return body.shifted(block.right() - hb.left(), 0.0);
        }
    }
    body
}

/// Land on, or bump the underside of, the first qualifying block.
pub fn resolve_vertical(body: Body, blocks: &[Block]) -> (Body, VerticalContact) {
    let hb = body.hitbox;
    for block in blocks {
        if !spans_x(&hb, block) {
            continue;
        }
        if body.velocity.y > 0.0 && lands_on(&body, block) {
            return (land(body, block), VerticalContact::Floor);
        }
        if body.velocity.y < 0.0 && hb.top() <= block.bottom() && body.previous.top() >= block.bottom()
        {
            let mut next = body.shifted(0.0, block.bottom() - hb.top());
            next.velocity.y = 0.0;
            return (next, VerticalContact::Ceiling);
        }
    }
    (body, VerticalContact::None)
}

/// One-way platforms only catch a body coming down onto them from above.
///
/// The test reads the previous hitbox rather than trusting `velocity.y`, which
/// an earlier pass in the same tick may already have zeroed. A rising body is
/// never obstructed.
pub fn resolve_one_way(body: Body, platforms: &[Block]) -> (Body, VerticalContact) {
    if body.velocity.y < 0.0 {
        return (body, VerticalContact::None);
    }
    for platform in platforms {
        if spans_x(&body.hitbox, platform) && lands_on(&body, platform) {
            return (land(body, platform), VerticalContact::Floor);
        }
    }
    (body, VerticalContact::None)
}

fn lands_on(body: &Body, block: &Block) -> bool {
    body.hitbox.bottom() >= block.top() && body.previous.bottom() <= block.top()
}

fn land(body: Body, block: &Block) -> Body {
    let mut next = body.shifted(0.0, block.top() - body.hitbox.bottom());
    next.velocity.y = 0.0;
    next
}
