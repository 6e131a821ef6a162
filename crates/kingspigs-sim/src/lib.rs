//! Simulation core for Kings and Pigs: level loading, collision, the player
//! state machine and the session driver that ties them to a fixed tick.

pub mod animation;
pub mod collision;
pub mod config;
pub mod error;
pub mod level;
pub mod level_state;
pub mod player;
pub mod session;

pub use config::GameConfig;
pub use error::{GeometryError, LevelError, LoadError};
pub use level::{Level, LevelLoader};
pub use level_state::{LevelState, LevelStats, LevelTimer};
pub use player::Player;
pub use session::{LevelSession, LoadTicket, Loaded, SessionSnapshot};
