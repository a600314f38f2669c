// Host-side scenarios for the session controller, driven by the simulated clock.

use monster_catch::{EventLog, Game, GameConfig, GameEvent, MonsterId, Phase, SimulatedScheduler};
use proptest::prelude::*;
use rstest::rstest;

type TestGame = Game<SimulatedScheduler, EventLog>;

fn new_game(config: GameConfig, seed: u64) -> TestGame {
    Game::new(config, SimulatedScheduler::new(), EventLog::new(), seed).expect("valid config")
}

/// Advance in 50 ms steps until a monster is on screen, then click it.
fn capture_next(game: &mut TestGame) {
    for _ in 0..200 {
        let next = game.session().monsters().next().map(|m| m.id);
        if let Some(id) = next {
            assert!(game.capture(id));
            return;
        }
        game.advance(50);
    }
    panic!("no monster spawned within 10 s");
}

#[test]
fn ten_captures_reach_level_two_and_speed_up_spawns() {
    let mut game = new_game(GameConfig::default(), 1);
    game.start();
    for _ in 0..10 {
        capture_next(&mut game);
    }
    let s = game.session();
    assert_eq!(s.score(), 100);
    assert_eq!(s.level(), 2);
    assert_eq!(s.lives(), 3);
    assert_eq!(game.current_spawn_interval_ms(), 1_900);
    assert_eq!(game.observer().count(|e| *e == GameEvent::LevelUp(2)), 1);
}

#[test]
fn spawns_after_level_up_use_the_shorter_interval() {
    let mut game = new_game(GameConfig::default(), 2);
    game.start();
    for _ in 0..10 {
        capture_next(&mut game);
    }
    // wait for the spawn already queued at the old rate, then measure the next gap
    game.observer_mut().clear();
    while game.observer().spawned() == 0 {
        game.advance(10);
    }
    let first = game.session().monsters().next().map(|m| m.spawned_at_ms).unwrap();
    let id = game.session().monsters().next().map(|m| m.id).unwrap();
    game.capture(id);
    while game.observer().spawned() < 2 {
        game.advance(10);
    }
    let second = game.session().monsters().next().map(|m| m.spawned_at_ms).unwrap();
    assert_eq!(second - first, 1_900);
}

#[test]
fn three_escapes_end_the_game() {
    let mut game = new_game(GameConfig::default(), 3);
    game.start();
    // spawns at 2000/4000/6000 escape at 5000/7000/9000
    game.advance(8_999);
    assert_eq!(game.session().lives(), 1);
    game.advance(1);

    let s = game.session();
    assert_eq!(s.phase(), Phase::GameOver);
    assert!(!s.running());
    assert_eq!(s.active_count(), 0);
    assert_eq!(s.lives(), 0);
    assert_eq!(game.scheduler().pending(), 0);
    let over = game
        .observer()
        .count(|e| matches!(e, GameEvent::GameOver { score: 0, seconds: 8 }));
    assert_eq!(over, 1);

    // nothing moves after game over
    game.advance(60_000);
    assert_eq!(game.session().elapsed_seconds(), 8);
}

#[test]
fn pause_right_after_start_freezes_clock_and_spawns() {
    let mut game = new_game(GameConfig::default(), 4);
    game.start();
    game.pause();
    game.advance(30_000);
    assert_eq!(game.observer().ticks(), 0);
    assert_eq!(game.observer().spawned(), 0);
    assert_eq!(game.scheduler().pending(), 0);

    game.resume();
    game.advance(2_000);
    assert_eq!(game.session().elapsed_seconds(), 2);
    assert_eq!(game.observer().spawned(), 1);
}

#[test]
fn restart_mid_game_resets_everything() {
    let mut game = new_game(GameConfig::default(), 5);
    game.start();
    capture_next(&mut game);
    game.advance(6_000);
    assert!(game.session().active_count() > 0);

    game.restart();
    let s = game.session();
    assert_eq!(s.phase(), Phase::Idle);
    assert_eq!(s.score(), 0);
    assert_eq!(s.lives(), 3);
    assert_eq!(s.level(), 1);
    assert_eq!(s.elapsed_seconds(), 0);
    assert_eq!(s.active_count(), 0);
    assert_eq!(game.scheduler().pending(), 0);
    assert!(game.observer().events.contains(&GameEvent::Reset));
}

#[test]
fn unknown_monster_capture_is_a_no_op() {
    let mut game = new_game(GameConfig::default(), 6);
    game.start();
    assert!(!game.capture(MonsterId(12_345)));
    capture_next(&mut game);
    assert_eq!(game.session().score(), 10);
    assert!(!game.capture(MonsterId(12_345)));
    assert_eq!(game.session().score(), 10);
}

#[test]
fn idle_and_game_over_ignore_play_actions() {
    let mut game = new_game(GameConfig { initial_lives: 1, ..GameConfig::default() }, 7);
    game.pause();
    game.resume();
    game.advance(10_000);
    assert_eq!(game.session().phase(), Phase::Idle);
    assert_eq!(game.observer().spawned(), 0);

    game.start();
    game.advance(5_000);
    assert_eq!(game.session().phase(), Phase::GameOver);
    game.pause();
    game.resume();
    game.start();
    assert_eq!(game.session().phase(), Phase::GameOver);
}

#[test]
fn play_area_never_exceeds_max_monsters() {
    let config = GameConfig {
        initial_spawn_interval_ms: 500,
        min_spawn_interval_ms: 500,
        monster_lifetime_ms: 60_000,
        max_monsters: 3,
        initial_lives: 9,
        ..GameConfig::default()
    };
    let mut game = new_game(config, 8);
    game.start();
    for _ in 0..100 {
        game.advance(250);
        assert!(game.session().active_count() <= 3);
    }
    assert_eq!(game.session().active_count(), 3);
    assert_eq!(game.observer().spawned(), 3);
}

#[rstest]
#[case(1, 2_000)]
#[case(2, 1_900)]
#[case(10, 1_100)]
#[case(16, 500)]
#[case(40, 500)]
fn spawn_interval_by_level(#[case] level: u32, #[case] expected: u64) {
    assert_eq!(GameConfig::default().spawn_interval_ms(level), expected);
}

#[derive(Clone, Debug)]
enum Action {
    Advance(u64),
    Capture(usize),
    CaptureUnknown,
    TogglePause,
    Restart,
    Start,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => (1u64..4_000).prop_map(Action::Advance),
        4 => (0usize..8).prop_map(Action::Capture),
        1 => Just(Action::CaptureUnknown),
        1 => Just(Action::TogglePause),
        1 => Just(Action::Restart),
        1 => Just(Action::Start),
    ]
}

proptest! {
    #[test]
    fn invariants_hold_for_any_action_sequence(
        seed in any::<u64>(),
        actions in prop::collection::vec(action(), 1..120),
    ) {
        let config = GameConfig::default();
        let mut game = new_game(config.clone(), seed);
        game.start();
        let mut last_level = 1;
        for a in actions {
            let score_before = game.session().score();
            match a {
                Action::Advance(ms) => game.advance(ms),
                Action::Capture(i) => {
                    let target = game.session().monsters().nth(i).map(|m| m.id);
                    if let Some(id) = target {
                        game.capture(id);
                    }
                }
                Action::CaptureUnknown => {
                    game.capture(MonsterId(u64::MAX));
                    prop_assert_eq!(game.session().score(), score_before);
                }
                Action::TogglePause => game.toggle_pause(),
                Action::Restart => {
                    game.restart();
                    last_level = 1;
                }
                Action::Start => game.start(),
            }
            let s = game.session();
            prop_assert!(s.active_count() <= config.max_monsters);
            prop_assert_eq!(s.level(), s.score() / config.level_up_score + 1);
            prop_assert!(s.level() >= last_level);
            prop_assert!(s.lives() <= config.initial_lives);
            if s.phase() == Phase::GameOver {
                prop_assert_eq!(s.active_count(), 0);
                prop_assert_eq!(s.lives(), 0);
            }
            last_level = s.level();
        }
    }

    #[test]
    fn spawn_interval_is_clamped(
        initial in 1u64..10_000,
        decrease in 0u64..5_000,
        min_frac in 0.0f64..=1.0,
        level in 1u32..10_000,
    ) {
        let min = ((initial as f64 * min_frac) as u64).max(1).min(initial);
        let config = GameConfig {
            initial_spawn_interval_ms: initial,
            spawn_interval_decrease_ms: decrease,
            min_spawn_interval_ms: min,
            ..GameConfig::default()
        };
        prop_assert!(config.validate().is_ok());
        let expected = (initial as i128 - (level as i128 - 1) * decrease as i128).max(min as i128);
        prop_assert_eq!(config.spawn_interval_ms(level) as i128, expected);
    }
}
