//! Player animation table and frame clock.
//!
//! Non-looping animations declare what happens when their last frame has been
//! shown: an [`Effect`] fired once on completion, and optionally a successor
//! animation entered after the transition linger.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationKind {
    Idle,
    Run,
    Jump,
    DoubleJump,
    Fall,
    Attack,
    Hit,
    Dead,
    /// Emerging from the prev door on level entry or respawn.
    DoorIn,
    /// Walking into the next door.
    DoorOut,
}

/// Side effect of a finished non-looping animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Door closes behind the player: door-out sound, prev door back to idle.
    SettleEntry,
    /// Player is through the exit; the level should advance.
    ExitLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub effect: Effect,
    pub next: Option<AnimationKind>,
    /// Wait the transition linger before entering `next`.
    pub linger: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSpec {
    pub frames: u32,
    /// Ticks each frame stays on screen.
    pub frame_buffer: u32,
    pub looping: bool,
    pub blocks_movement: bool,
    pub completion: Completion,
}

const HOLD: Completion = Completion {
    effect: Effect::None,
    next: None,
    linger: false,
};

impl AnimationKind {
    pub const fn spec(self) -> AnimationSpec {
        match self {
            Self::Idle => looping(11, 4),
            Self::Run => looping(8, 4),
            Self::Jump | Self::DoubleJump | Self::Fall => once(1, 1, false, HOLD),
            Self::Attack => once(
                3,
                8,
                true,
                Completion {
                    effect: Effect::None,
                    next: Some(Self::Idle),
                    linger: true,
                },
            ),
            Self::Hit => once(
                2,
                8,
                true,
                Completion {
                    effect: Effect::None,
                    next: Some(Self::Idle),
                    linger: false,
                },
            ),
            Self::Dead => once(4, 8, true, HOLD),
            Self::DoorIn => once(
                8,
                8,
                true,
                Completion {
                    effect: Effect::SettleEntry,
                    next: Some(Self::Idle),
                    linger: true,
                },
            ),
            Self::DoorOut => once(
                8,
                8,
                true,
                Completion {
                    effect: Effect::ExitLevel,
                    next: None,
                    linger: false,
                },
            ),
        }
    }

    /// Poses driven by vertical motion rather than by a clock.
    pub fn is_airborne(self) -> bool {
        matches!(self, Self::Jump | Self::DoubleJump | Self::Fall)
    }
}

const fn looping(frames: u32, frame_buffer: u32) -> AnimationSpec {
    AnimationSpec {
        frames,
        frame_buffer,
        looping: true,
        blocks_movement: false,
        completion: HOLD,
    }
}

const fn once(
    frames: u32,
    frame_buffer: u32,
    blocks_movement: bool,
    completion: Completion,
) -> AnimationSpec {
    AnimationSpec {
        frames,
        frame_buffer,
        looping: false,
        blocks_movement,
        completion,
    }
}

/// What a clock step produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationSignal {
    /// The final frame finished showing.
    Completed(Effect),
    /// Linger elapsed; switch to this animation.
    Advance(AnimationKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationState {
    pub kind: AnimationKind,
    elapsed: u32,
    finished: bool,
    linger_left: u32,
}

impl AnimationState {
    pub fn start(kind: AnimationKind) -> Self {
        Self {
            kind,
            elapsed: 0,
            finished: false,
            linger_left: 0,
        }
    }

    pub fn spec(&self) -> AnimationSpec {
        self.kind.spec()
    }

    /// Frame currently on screen.
    pub fn frame(&self) -> u32 {
        let spec = self.spec();
        let frame = self.elapsed / spec.frame_buffer.max(1);
        if spec.looping {
            frame % spec.frames.max(1)
        } else {
            frame.min(spec.frames.saturating_sub(1))
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance one tick.
    pub fn advance(&mut self, linger_ticks: u32) -> Option<AnimationSignal> {
        let spec = self.spec();
        if spec.looping {
            self.elapsed = self.elapsed.wrapping_add(1);
            return None;
        }
        if self.finished {
            let next = spec.completion.next?;
            if self.linger_left > 0 {
                self.linger_left -= 1;
                return None;
            }
            return Some(AnimationSignal::Advance(next));
        }
        self.elapsed += 1;
        if self.elapsed >= spec.frames * spec.frame_buffer {
            self.finished = true;
            self.linger_left = if spec.completion.linger {
                linger_ticks
            } else {
                0
            };
            return Some(AnimationSignal::Completed(spec.completion.effect));
        }
        None
    }
}
