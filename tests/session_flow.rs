//! Full session runs against real stores

use std::sync::Arc;
use std::time::Duration;

use limbo_runner::sim::GamePhase;
use limbo_runner::{FrameInput, LeaderboardStore, Session, Settings, StoreBackend};

const SETTLE: Duration = Duration::from_secs(5);

fn press(f: impl FnOnce(&mut FrameInput)) -> FrameInput {
    let mut input = FrameInput::default();
    f(&mut input);
    input
}

/// Idle until an obstacle runs into the player
fn play_until_crash(session: &mut Session) -> u64 {
    let start = session.snapshot().player;
    for _ in 0..50_000 {
        match session.update(&FrameInput::default()) {
            GamePhase::Playing => assert_eq!(session.snapshot().player, start),
            GamePhase::NameEntry => return session.snapshot().score,
            other => panic!("unexpected phase {other:?}"),
        }
    }
    panic!("no obstacle ever reached the player");
}

#[test]
fn end_to_end_bob_then_reset() {
    let store = Arc::new(LeaderboardStore::open_in_memory(Duration::from_secs(30)).unwrap());
    let mut session = Session::new(&Settings::default(), Arc::clone(&store), 2024).unwrap();
    assert_eq!(session.phase(), GamePhase::Title);

    assert_eq!(session.update(&press(|i| i.start = true)), GamePhase::Playing);
    let snap = session.snapshot();
    assert_eq!(snap.score, 0);
    assert!(snap.obstacles.is_empty());
    assert_eq!(session.state().field.speed(), 4.0);

    let score = play_until_crash(&mut session);
    assert!(score > 0, "an obstacle needs ~180 ticks to arrive");
    assert_eq!(session.snapshot().score, score);

    session.update(&FrameInput::typed("BOB"));
    assert_eq!(session.update(&press(|i| i.submit = true)), GamePhase::Leaderboard);
    assert!(session.settle(SETTLE));
    let snap = session.snapshot();
    assert_eq!(snap.store_error, None);
    assert!(
        snap.leaders
            .iter()
            .any(|w| w.name == "BOB" && w.score == score)
    );

    session.update(&press(|i| i.reset = true));
    assert_eq!(session.phase(), GamePhase::Leaderboard);
    assert!(session.settle(SETTLE));
    assert!(session.snapshot().leaders.is_empty());
    assert!(store.top_winners(10).unwrap().is_empty());

    assert_eq!(session.update(&press(|i| i.back = true)), GamePhase::Title);
}

#[test]
fn scores_rank_across_runs() {
    let store = Arc::new(LeaderboardStore::open_in_memory(Duration::from_secs(30)).unwrap());
    store.save_winner("Alice", 1).unwrap();
    let mut session = Session::new(&Settings::default(), Arc::clone(&store), 7).unwrap();

    for name in ["one", "two", "three"] {
        session.update(&press(|i| i.start = true));
        play_until_crash(&mut session);
        session.update(&FrameInput::typed(name));
        session.update(&press(|i| i.submit = true));
        assert!(session.settle(SETTLE));
        session.update(&press(|i| i.back = true));
    }

    let leaders = store.top_winners(10).unwrap();
    assert_eq!(leaders.len(), 4);
    assert!(leaders.windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(leaders.last().map(|w| w.name.as_str()), Some("Alice"));
}

#[test]
fn json_backend_session() {
    let path = std::env::temp_dir().join(format!(
        "limbo_runner_session_{}.json",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    let settings = Settings {
        store_backend: StoreBackend::Json,
        db_path: path.to_string_lossy().into_owned(),
        ..Default::default()
    };

    let store = Arc::new(LeaderboardStore::open(&settings).unwrap());
    let mut session = Session::new(&settings, Arc::clone(&store), 11).unwrap();
    session.update(&press(|i| i.start = true));
    let score = play_until_crash(&mut session);
    session.update(&FrameInput::typed("  JSONNY  "));
    session.update(&press(|i| i.submit = true));
    assert!(session.settle(SETTLE));
    assert_eq!(session.snapshot().last_winner.map(|w| w.score), Some(score));
    store.close().unwrap();

    // A fresh store over the same file sees the run
    let reopened = LeaderboardStore::open(&settings).unwrap();
    let leaders = reopened.top_winners(10).unwrap();
    assert_eq!(leaders.len(), 1);
    assert_eq!(leaders[0].name, "JSONNY");
    assert_eq!(leaders[0].score, score);
    let _ = std::fs::remove_file(&path);
}
