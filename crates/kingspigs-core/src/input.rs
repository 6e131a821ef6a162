use serde::{Deserialize, Serialize};

/// Logical actions, independent of the device that produced them
/// (keyboard, touch button, joystick axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Left,
    Right,
    Up,
    Special,
}

/// A discrete start/end edge for one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    Start(Action),
    End(Action),
}

impl InputEvent {
    pub fn action(&self) -> Action {
        match self {
            Self::Start(a) | Self::End(a) => *a,
        }
    }
}
