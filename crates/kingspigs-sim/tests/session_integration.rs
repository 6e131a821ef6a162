use std::path::PathBuf;
use std::time::Duration;

use kingspigs_core::{Action, Block, DoorKind, GameEvent, InputEvent, Point};
use kingspigs_sim::animation::AnimationKind;
use kingspigs_sim::error::{GeometryError, LevelError, LoadError};
use kingspigs_sim::level::{DoorPhase, LevelLoader};
use kingspigs_sim::{GameConfig, LevelSession, SessionSnapshot};

fn fixtures(dir: &str) -> GameConfig {
    let mut config = GameConfig::default();
    config.level.assets_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(dir);
    config
}

fn run(session: &mut LevelSession, ticks: u32) -> Vec<GameEvent> {
    (0..ticks).flat_map(|_| session.tick()).collect()
}

async fn loaded_session() -> LevelSession {
    let mut session = LevelSession::new(fixtures(""));
    session.begin_load();
    assert_eq!(session.wait_for_level().await.unwrap(), 1);
    session
}

#[tokio::test]
async fn level_loads_and_player_settles_at_prev_door() {
    let mut session = loaded_session().await;
    assert!(session.is_ready());
    let texture = session.state().texture.as_ref().unwrap();
    assert_eq!(texture.index, 1);
    assert!(texture.bytes.starts_with(b"\x89PNG"));

    let level = &session.state().level;
    assert_eq!(level.initial_position, Point::new(16.0, 96.0));
    assert_eq!(level.collision_blocks.len(), 19);
    assert_eq!(level.platform_blocks, vec![Block::new(128.0, 80.0, 48.0, 10.0)]);
    assert_eq!(level.boxes, vec![Block::new(272.0, 128.0, 16.0, 16.0)]);
    assert_eq!(level.items.len(), 1);
    assert_eq!(level.decorations.candles.len(), 2);
    assert_eq!(
        level.door(DoorKind::Next).unwrap().hitbox,
        Block::new(224.0, 128.0, 16.0, 16.0)
    );

    let events = run(&mut session, 80);
    assert!(events.contains(&GameEvent::DoorOpened(DoorKind::Prev)));
    assert!(events.contains(&GameEvent::DoorIdled(DoorKind::Prev)));
    assert_eq!(session.player().position, Point::new(16.0, 100.0));
    assert_eq!(session.player().action(), AnimationKind::Idle);
    assert_eq!(session.state().player.position, Point::new(16.0, 100.0));
}

#[tokio::test]
async fn run_collect_and_exit_advances_to_next_level() {
    let mut session = loaded_session().await;
    run(&mut session, 80);

    session.handle_input(InputEvent::Start(Action::Right));
    let events = run(&mut session, 36);
    session.handle_input(InputEvent::End(Action::Right));
    assert!(events.contains(&GameEvent::DiamondCollected {
        position: Point::new(96.0, 128.0),
        total: 1,
    }));
    assert!(session.state().level.items.is_empty());
    assert_eq!(session.player().position.x, 196.0);

    session.handle_input(InputEvent::Start(Action::Up));
    assert_eq!(session.player().action(), AnimationKind::DoorOut);
    assert_eq!(
        session.state().level.door(DoorKind::Next).unwrap().phase,
        DoorPhase::Opening
    );

    let events = run(&mut session, 100);
    assert_eq!(
        events
            .iter()
            .filter(|e| **e == GameEvent::LevelComplete)
            .count(),
        1
    );
    assert!(!session.is_ready());
    assert_eq!(session.state().index(), 2);
    assert!(session.state().level.collision_blocks.is_empty());

    assert!(session.state().texture.is_none());

    assert_eq!(session.wait_for_level().await.unwrap(), 2);
    assert_eq!(session.state().level.items.len(), 2);
    assert!(session.state().texture.is_none(), "level 2 ships no texture");
    let stats = session.stats();
    assert_eq!(stats.diamonds, 1);
    assert_eq!(stats.lives, 3);
    assert_eq!(session.player().action(), AnimationKind::DoorIn);
}

#[tokio::test]
async fn superseded_load_is_never_installed() {
    let mut session = LevelSession::new(fixtures(""));
    let first = session.begin_load();
    let second = session.begin_load();
    assert!(second.generation > first.generation);

    assert_eq!(session.wait_for_level().await.unwrap(), 1);
    assert_eq!(session.state().texture.as_ref().map(|t| t.index), Some(1));
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(session.poll_loads(), Ok(None));
    assert_eq!(session.wait_for_level().await, Ok(1));
}

#[tokio::test]
async fn empty_prev_door_blocks_level_entry() {
    let mut session = LevelSession::new(fixtures("broken"));
    session.begin_load();
    let err = session.wait_for_level().await.unwrap_err();
    assert_eq!(err, LevelError::Geometry(GeometryError::MissingDoor(DoorKind::Prev)));
    assert!(!session.is_ready());
    assert!(run(&mut session, 5).is_empty());
}

#[tokio::test]
async fn missing_level_is_an_io_error() {
    let mut session = LevelSession::new(fixtures("does-not-exist"));
    session.begin_load();
    let err = session.wait_for_level().await.unwrap_err();
    assert!(matches!(err, LevelError::Load(LoadError::Io { .. })));
}

#[tokio::test]
async fn texture_bytes_are_passed_through() {
    let loader = LevelLoader::new(fixtures("").level);
    let texture = loader.load_texture(1).await.unwrap();
    assert_eq!(texture.index, 1);
    assert!(texture.bytes.starts_with(b"\x89PNG"));

    let err = loader.load_texture(9).await.unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[tokio::test]
async fn snapshot_reflects_loaded_level() {
    let mut session = loaded_session().await;
    run(&mut session, 3);

    let snapshot: SessionSnapshot = rmp_serde::from_slice(&session.serialize_state()).unwrap();
    assert_eq!(snapshot.index, 1);
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(snapshot.doors.len(), 2);
    assert_eq!(snapshot.player.position, session.player().position);
    assert_eq!(snapshot.action, AnimationKind::DoorIn);
}

#[tokio::test(start_paused = true)]
async fn level_timer_counts_seconds() {
    let session = LevelSession::new(GameConfig::default());
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(session.stats().timer, 2);
}
