use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Downward acceleration per tick.
pub const GRAVITY: f32 = 1.0;
/// Horizontal speed while running.
pub const RUN_SPEED: f32 = 5.0;
/// Upward velocity of a ground jump.
pub const JUMP_POWER: f32 = 15.0;
/// A double jump launches with `JUMP_POWER / DOUBLE_JUMP_DIVISOR`.
pub const DOUBLE_JUMP_DIVISOR: f32 = 1.5;
/// Falling faster than this lands hard (fall effects).
pub const FALL_THRESHOLD: f32 = 10.0;
/// Falling faster than this is fatal on landing.
pub const DEATH_THRESHOLD: f32 = 25.0;

/// Player physics and geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub run_speed: f32,
    pub jump_power: f32,
    pub double_jump_divisor: f32,
    pub fall_threshold: f32,
    pub death_threshold: f32,
    pub hitbox_width: f32,
    pub hitbox_height: f32,
    /// Hitbox x offset from the sprite origin when facing right.
    pub hitbox_offset_x: f32,
    /// Hitbox x offset from the sprite origin when facing left.
    pub hitbox_offset_x_inverted: f32,
    pub hitbox_offset_y: f32,
    /// Sprite origin shift applied when the run direction flips.
    pub turn_shift: f32,
    pub attack_width: f32,
    pub attack_height: f32,
    pub attack_reach: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            run_speed: RUN_SPEED,
            jump_power: JUMP_POWER,
            double_jump_divisor: DOUBLE_JUMP_DIVISOR,
            fall_threshold: FALL_THRESHOLD,
            death_threshold: DEATH_THRESHOLD,
            hitbox_width: 24.0,
            hitbox_height: 26.0,
            hitbox_offset_x: 18.0,
            hitbox_offset_x_inverted: 36.0,
            hitbox_offset_y: 18.0,
            turn_shift: 24.0,
            attack_width: 32.0,
            attack_height: 24.0,
            attack_reach: 24.0,
        }
    }
}

/// Tick counts for timed behaviour. One tick is one rendered frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub idle_hint_ticks: u32,
    pub respawn_delay_ticks: u32,
    /// Pause between a finished attack/door-in animation and going idle.
    pub transition_linger_ticks: u32,
    pub run_particle_interval: u32,
    /// How long the sword sound plays; attacks are rejected meanwhile.
    pub attack_sound_ticks: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            idle_hint_ticks: 5 * 60,
            respawn_delay_ticks: 60,
            transition_linger_ticks: 6,
            run_particle_interval: 20,
            attack_sound_ticks: 30,
        }
    }
}

/// Level asset location and tile-map interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub assets_dir: PathBuf,
    pub first_level: u32,
    pub starting_lives: u32,
    pub tile_size: f32,
    pub platform_width: f32,
    pub platform_height: f32,
    /// Horizontal offset from the prev door to the spawn point.
    pub spawn_nudge: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets/levels"),
            first_level: 1,
            starting_lives: 3,
            tile_size: kingspigs_core::TILE_SIZE,
            platform_width: 32.0,
            platform_height: 10.0,
            spawn_nudge: -16.0,
        }
    }
}

/// Top-level game configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub timing: TimingConfig,
    pub level: LevelConfig,
}

impl GameConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("KINGSPIGS_CONFIG")
            .unwrap_or_else(|_| "config/kingspigs.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    GameConfig::default()
                },
            },
            Err(_) => GameConfig::default(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.physics.gravity, GRAVITY);
        assert_eq!(cfg.physics.jump_power, JUMP_POWER);
        assert_eq!(cfg.timing.idle_hint_ticks, 300);
        assert_eq!(cfg.level.starting_lives, 3);
        assert_eq!(cfg.level.tile_size, 16.0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = GameConfig::from_toml_str(
            r#"
            [physics]
            jump_power = 18.0

            [level]
            assets_dir = "data/chapter-1"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.physics.jump_power, 18.0);
        assert_eq!(cfg.physics.run_speed, RUN_SPEED);
        assert_eq!(cfg.level.assets_dir, PathBuf::from("data/chapter-1"));
        assert_eq!(cfg.timing, TimingConfig::default());
    }

    #[test]
    fn empty_toml_is_default() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, GameConfig::default());
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let shipped = include_str!("../../../config/kingspigs.toml");
        let cfg = GameConfig::from_toml_str(shipped).unwrap();
        assert_eq!(cfg, GameConfig::default());
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(GameConfig::from_toml_str("[physics]\ngravity = \"heavy\"").is_err());
    }
}
