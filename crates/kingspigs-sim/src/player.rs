//! The player actor: fixed-tick physics, collision correction and the
//! behavioural state machine (idle, run, jump, double jump, fall, attack, hit,
//! dead, door transitions).
//!
//! One call to [`Player::tick`] runs one rendered frame. Input edges arrive
//! between ticks through the `press_*`/`release_*` methods; everything the
//! player wants presentation to do is queued as [`GameEvent`]s and handed out
//! by the next tick.

use serde::{Deserialize, Serialize};

use kingspigs_core::{
    Block, DialogKind, DoorKind, GameEvent, ParticleKind, Point, SoundCue,
};

use crate::animation::{AnimationKind, AnimationSignal, AnimationState, Effect};
use crate::collision::{Body, VerticalContact, resolve_horizontal, resolve_one_way, resolve_vertical};
use crate::config::{GameConfig, PhysicsConfig, TimingConfig};
use crate::level_state::{LevelState, PlayerView};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpState {
    pub power: f32,
    /// One airborne jump per airborne period.
    pub double_available: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerFlags {
    pub is_running: bool,
    /// Up is held; a new jump needs a fresh press.
    pub is_jumping: bool,
    /// Armed by a hard fall, fires on landing.
    pub is_falling: bool,
    /// Armed by a fatal fall, fires on landing.
    pub is_dead: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub position: Point,
    pub velocity: Point,
    pub gravity: f32,
    pub inverted: bool,
    pub jump: JumpState,
    pub animation: AnimationState,
    pub flags: PlayerFlags,
    pub grounded: bool,
    pub inactivity_ticks: u32,
    previous_hitbox: Block,
    elapsed_ticks: u32,
    sword_ticks: u32,
    respawn_in: Option<u32>,
    dialog: Option<DialogKind>,
    physics: PhysicsConfig,
    timing: TimingConfig,
    events: Vec<GameEvent>,
}

impl Player {
    /// A fresh player emerging from the prev door.
    pub fn spawn(position: Point, config: &GameConfig) -> Self {
        let mut player = Self {
            position,
            velocity: Point::default(),
            gravity: config.physics.gravity,
            inverted: false,
            jump: JumpState {
                power: config.physics.jump_power,
                double_available: true,
            },
            animation: AnimationState::start(AnimationKind::DoorIn),
            flags: PlayerFlags::default(),
            grounded: false,
            inactivity_ticks: 0,
            previous_hitbox: Block::default(),
            elapsed_ticks: 0,
            sword_ticks: 0,
            respawn_in: None,
            dialog: None,
            physics: config.physics.clone(),
            timing: config.timing.clone(),
            events: Vec::new(),
        };
        player.previous_hitbox = player.hitbox();
        player
    }

    /// Collidable rectangle, derived from position and facing.
    pub fn hitbox(&self) -> Block {
        let offset_x = if self.inverted {
            self.physics.hitbox_offset_x_inverted
        } else {
            self.physics.hitbox_offset_x
        };
        Block::new(
            self.position.x + offset_x,
            self.position.y + self.physics.hitbox_offset_y,
            self.physics.hitbox_width,
            self.physics.hitbox_height,
        )
    }

    /// Sword reach, present only while the attack animation plays.
    pub fn attack_hitbox(&self) -> Option<Block> {
        (self.animation.kind == AnimationKind::Attack).then(|| {
            let hb = self.hitbox();
            let reach = if self.inverted {
                -self.physics.attack_reach
            } else {
                self.physics.attack_reach
            };
            Block::new(
                hb.left() + reach,
                hb.top(),
                self.physics.attack_width,
                self.physics.attack_height,
            )
        })
    }

    pub fn action(&self) -> AnimationKind {
        self.animation.kind
    }

    /// Attack, door transitions, death and hit reactions freeze horizontal movement.
    pub fn movement_blocked(&self) -> bool {
        self.animation.spec().blocks_movement
    }

    pub fn is_respawning(&self) -> bool {
        self.respawn_in.is_some()
    }

    /// Events queued by input handlers since the last tick.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn play(&mut self, kind: AnimationKind) {
        self.animation = AnimationState::start(kind);
    }

    fn particle(&mut self, kind: ParticleKind, position: Point) {
        self.events.push(GameEvent::Particle {
            kind,
            position,
            facing_left: self.inverted,
        });
    }

    fn overlapping_door(&self, world: &LevelState, kind: DoorKind) -> bool {
        let hb = self.hitbox();
        world
            .level
            .door(kind)
            .is_some_and(|door| door.hitbox.overlaps(&hb))
    }

    // ----------------------------------------------------------------
    // Input
    // ----------------------------------------------------------------

    pub fn press_run(&mut self, left: bool) {
        if self.flags.is_running || self.movement_blocked() {
            return;
        }
        self.flags.is_running = true;
        if left != self.inverted {
            self.position.x += if left {
                -self.physics.turn_shift
            } else {
                self.physics.turn_shift
            };
        }
        self.inverted = left;
        self.velocity.x = if left {
            -self.physics.run_speed
        } else {
            self.physics.run_speed
        };
        if !self.animation.kind.is_airborne() {
            self.play(AnimationKind::Run);
        }
        self.events.push(GameEvent::PlaySound(SoundCue::Run));
    }

    /// Releasing a direction only stops the run it started.
    pub fn stop_run(&mut self, left: bool) {
        if !self.flags.is_running || self.inverted != left {
            return;
        }
        self.flags.is_running = false;
        self.velocity.x = 0.0;
        if self.animation.kind == AnimationKind::Run {
            self.play(AnimationKind::Idle);
        }
        self.events.push(GameEvent::StopSound(SoundCue::Run));
    }

    /// Up enters an overlapped next door, otherwise jumps or double-jumps.
    pub fn press_up(&mut self, world: &mut LevelState) {
        if self.animation.kind == AnimationKind::DoorOut || self.movement_blocked() {
            return;
        }
        if self.flags.is_jumping {
            return;
        }
        self.flags.is_jumping = true;

        if self.overlapping_door(world, DoorKind::Next) {
            if let Some(door) = world.level.door_mut(DoorKind::Next) {
                door.open();
            }
            self.events.push(GameEvent::DoorOpened(DoorKind::Next));
            self.events.push(GameEvent::PlaySound(SoundCue::DoorIn));
            self.play(AnimationKind::DoorOut);
        } else if self.grounded {
            self.particle(ParticleKind::Jump, self.position);
            self.events.push(GameEvent::PlaySound(SoundCue::Jump));
            self.velocity.y = -self.jump.power;
            self.grounded = false;
            self.jump.double_available = true;
            self.play(AnimationKind::Jump);
        } else if self.jump.double_available {
            self.particle(ParticleKind::Jump, self.position);
            self.events.push(GameEvent::PlaySound(SoundCue::Jump));
            self.velocity.y = -self.jump.power / self.physics.double_jump_divisor;
            self.jump.double_available = false;
            // A double jump arrests the fall that armed these.
            self.flags.is_falling = false;
            self.flags.is_dead = false;
            self.play(AnimationKind::DoubleJump);
        }
    }

    pub fn release_up(&mut self) {
        self.flags.is_jumping = false;
    }

    /// Swing the sword. Rejected while the previous swing's sound still plays
    /// or while movement is blocked.
    pub fn attack(&mut self) -> bool {
        if self.sword_ticks > 0 || self.movement_blocked() {
            return false;
        }
        self.sword_ticks = self.timing.attack_sound_ticks;
        self.events.push(GameEvent::PlaySound(SoundCue::Sword));
        self.play(AnimationKind::Attack);
        true
    }

    /// React to being struck.
    pub fn take_hit(&mut self) {
        if matches!(
            self.animation.kind,
            AnimationKind::Dead | AnimationKind::DoorIn | AnimationKind::DoorOut
        ) {
            return;
        }
        self.play(AnimationKind::Hit);
    }

    // ----------------------------------------------------------------
    // Tick
    // ----------------------------------------------------------------

    /// Advance one frame against the world's geometry.
    pub fn tick(&mut self, world: &mut LevelState) -> Vec<GameEvent> {
        if let Some(left) = self.respawn_in {
            if left <= 1 {
                self.respawn(world);
            } else {
                self.respawn_in = Some(left - 1);
            }
        }
        self.elapsed_ticks = self.elapsed_ticks.wrapping_add(1);
        self.sword_ticks = self.sword_ticks.saturating_sub(1);

        self.step_physics(world);
        self.check_fall_outcome(world);
        self.update_pose();
        self.advance_animation(world);
        self.check_dialogs(world);
        self.check_pickups(world);

        if self.elapsed_ticks % self.timing.run_particle_interval.max(1) == 0
            && self.flags.is_running
            && self.velocity.y == 0.0
        {
            self.particle(ParticleKind::Run, self.position);
        }

        world.publish_player(PlayerView {
            position: self.position,
            attack_hitbox: self.attack_hitbox(),
        });
        self.drain_events()
    }

    fn body(&self) -> Body {
        Body {
            position: self.position,
            velocity: self.velocity,
            hitbox: self.hitbox(),
            previous: self.previous_hitbox,
        }
    }

    /// Horizontal move and correction strictly before vertical.
    fn step_physics(&mut self, world: &LevelState) {
        let level = &world.level;

        let blocked = self.movement_blocked();
        if !blocked {
            self.position.x += self.velocity.x;
        }
        let mut body = self.body();
        if blocked {
            body.velocity.x = 0.0;
        }
        body = resolve_horizontal(body, &level.collision_blocks);
        body = resolve_horizontal(body, &level.boxes);
        self.position = body.position;

        self.velocity.y += self.gravity;
        self.position.y += self.velocity.y;

        let (body, on_blocks) = resolve_vertical(self.body(), &level.collision_blocks);
        let (body, on_boxes) = resolve_vertical(body, &level.boxes);
        let (body, on_platform) = resolve_one_way(body, &level.platform_blocks);
        self.position = body.position;
        self.velocity.y = body.velocity.y;

        self.grounded = [on_blocks, on_boxes, on_platform].contains(&VerticalContact::Floor);
        if self.grounded {
            self.jump.double_available = true;
        }
        self.previous_hitbox = self.hitbox();
    }

    /// Arm fall outcomes by speed; fire them once vertical velocity is back to zero.
    fn check_fall_outcome(&mut self, world: &mut LevelState) {
        let vy = self.velocity.y;
        if vy > self.physics.death_threshold {
            self.flags.is_dead = true;
        } else if vy > self.physics.fall_threshold {
            self.flags.is_falling = true;
        }

        if vy != 0.0 {
            return;
        }
        if self.flags.is_dead {
            self.die(world);
        } else if self.flags.is_falling {
            self.flags.is_falling = false;
            self.events.push(GameEvent::PlaySound(SoundCue::Fall));
            self.particle(ParticleKind::Fall, self.position);
        }
    }

    fn die(&mut self, world: &mut LevelState) {
        self.flags = PlayerFlags::default();
        self.velocity.x = 0.0;
        self.events.push(GameEvent::StopSound(SoundCue::Run));
        self.events.push(GameEvent::PlaySound(SoundCue::Kill));
        let remaining = world.lose_life();
        self.events.push(GameEvent::LifeLost { remaining });
        if remaining == 0 {
            self.events.push(GameEvent::LivesExhausted);
        }
        tracing::info!(remaining, "Player died");
        self.play(AnimationKind::Dead);
        self.respawn_in = Some(self.timing.respawn_delay_ticks.max(1));
    }

    /// Replace the actor with a fresh one at the level's spawn point.
    /// Lives and diamonds live in the level state and carry over.
    pub fn respawn(&mut self, world: &mut LevelState) {
        self.particle(ParticleKind::Disappearing, self.position);
        let events = std::mem::take(&mut self.events);
        let config = GameConfig {
            physics: self.physics.clone(),
            timing: self.timing.clone(),
            ..GameConfig::default()
        };
        *self = Self::spawn(world.level.initial_position, &config);
        self.events = events;

        if let Some(door) = world.level.door_mut(DoorKind::Prev) {
            door.open();
        }
        self.events.push(GameEvent::DoorOpened(DoorKind::Prev));
        self.events.push(GameEvent::Respawned {
            position: self.position,
        });
        tracing::debug!(x = self.position.x, y = self.position.y, "Player respawned");
    }

    /// Condition-driven poses: airborne vs grounded, idle with speed becomes run.
    fn update_pose(&mut self) {
        let kind = self.animation.kind;
        if self.grounded && kind.is_airborne() {
            self.play(if self.flags.is_running {
                AnimationKind::Run
            } else {
                AnimationKind::Idle
            });
        } else if !self.grounded
            && self.velocity.y > 0.0
            && matches!(
                kind,
                AnimationKind::Idle | AnimationKind::Run | AnimationKind::Jump | AnimationKind::DoubleJump
            )
        {
            self.play(AnimationKind::Fall);
        }

        if self.animation.kind == AnimationKind::Idle && self.velocity.x != 0.0 {
            self.play(AnimationKind::Run);
        }
    }

    fn advance_animation(&mut self, world: &mut LevelState) {
        match self.animation.advance(self.timing.transition_linger_ticks) {
            Some(AnimationSignal::Completed(Effect::SettleEntry)) => {
                self.events.push(GameEvent::PlaySound(SoundCue::DoorOut));
                if let Some(door) = world.level.door_mut(DoorKind::Prev) {
                    door.idle();
                }
                self.events.push(GameEvent::DoorIdled(DoorKind::Prev));
            },
            Some(AnimationSignal::Completed(Effect::ExitLevel)) => {
                self.events.push(GameEvent::LevelComplete);
            },
            Some(AnimationSignal::Advance(next)) => self.play(next),
            Some(AnimationSignal::Completed(Effect::None)) | None => {},
        }
    }

    /// At most one bubble is up. The door prompt outranks the idle hint, and
    /// an event goes out only when the bubble changes.
    fn check_dialogs(&mut self, world: &LevelState) {
        if self.velocity.x == 0.0 && self.velocity.y == 0.0 {
            self.inactivity_ticks = self.inactivity_ticks.saturating_add(1);
        } else {
            self.inactivity_ticks = 0;
        }

        let wanted = if self.animation.kind == AnimationKind::Idle
            && self.overlapping_door(world, DoorKind::Next)
        {
            Some(DialogKind::Exclamation)
        } else if self.inactivity_ticks >= self.timing.idle_hint_ticks {
            Some(DialogKind::Hello)
        } else {
            None
        };
        if wanted == self.dialog {
            return;
        }
        self.dialog = wanted;
        self.events.push(match wanted {
            Some(kind) => GameEvent::ShowDialog(kind),
            None => GameEvent::ClearDialog,
        });
    }

    /// Collect every diamond the hitbox touches this tick.
    fn check_pickups(&mut self, world: &mut LevelState) {
        let hb = self.hitbox();
        let mut i = 0;
        while i < world.level.items.len() {
            if !world.level.items[i].hitbox.overlaps(&hb) {
                i += 1;
                continue;
            }
            let Some(item) = world.take_item(i) else {
                break;
            };
            let total = world.add_diamond();
            self.events.push(GameEvent::PlaySound(SoundCue::Diamond));
            self.events.push(GameEvent::DiamondCollected {
                position: item.hitbox.position,
                total,
            });
            self.particle(ParticleKind::Diamond, item.hitbox.position);
        }
    }
}
