//! Fixed timestep simulation tick
//!
//! Advances a Playing run by one step. Other phases are driven by the
//! session and are left untouched here.

use glam::Vec2;

use super::collision::first_hit;
use super::obstacles::{FieldStep, Obstacle};
use super::state::{GamePhase, GameState};
use crate::input::MoveIntent;

/// Result of one tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Not playing; nothing moved
    Frozen,
    /// The run continues
    Advanced(FieldStep),
    /// The player hit an obstacle; the run is over
    Collided { obstacle: Obstacle },
}

/// Player displacement for one tick
pub fn player_step(player_center: Vec2, intent: &MoveIntent, speed: f32) -> Vec2 {
    match *intent {
        MoveIntent::Idle => Vec2::ZERO,
        MoveIntent::Delta(dir) => dir.clamp_length_max(1.0) * speed,
        MoveIntent::Toward(target) => {
            let to_target = target - player_center;
            let dist = to_target.length();
            if dist > 1.0 {
                to_target / dist * speed
            } else {
                Vec2::ZERO
            }
        }
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, intent: &MoveIntent) -> TickOutcome {
    if state.phase != GamePhase::Playing {
        return TickOutcome::Frozen;
    }

    // Player movement, kept inside the field
    let delta = player_step(state.player.center(), intent, state.player_speed);
    state.player.translate(delta);
    let (width, height) = (state.field.config().width, state.field.config().height);
    state.player.clamp_within(width, height);

    // Spawn, advance, prune (pruning happens before the collision search)
    let step = state.field.step();

    let hit = first_hit(&state.player, state.field.obstacles())
        .and_then(|index| state.field.remove(index));
    if let Some(obstacle) = hit {
        log::info!(
            "Collision with obstacle {} at tick {} (score {})",
            obstacle.id,
            state.time_ticks,
            state.score
        );
        state.end_run();
        return TickOutcome::Collided { obstacle };
    }

    state.time_ticks += 1;
    if state.time_ticks % u64::from(state.score_rule.every_ticks) == 0 {
        state.score = state.score.saturating_add(state.score_rule.increment);
    }
    state.field.ramp_for_tick(state.time_ticks);

    TickOutcome::Advanced(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::Rect;

    fn playing(seed: u64) -> GameState {
        let mut state = GameState::new(&Settings::default(), seed);
        state.start_run();
        state
    }

    #[test]
    fn test_title_is_frozen() {
        let mut state = GameState::new(&Settings::default(), 1);
        assert_eq!(tick(&mut state, &MoveIntent::Idle), TickOutcome::Frozen);
        assert_eq!(state.time_ticks, 0);
        assert!(state.field.obstacles().is_empty());
    }

    #[test]
    fn test_score_every_ten_ticks() {
        let mut state = playing(1);
        // The first obstacle needs ~180 ticks to reach the player
        for _ in 0..9 {
            tick(&mut state, &MoveIntent::Idle);
        }
        assert_eq!(state.score, 0);
        tick(&mut state, &MoveIntent::Idle);
        assert_eq!(state.score, 1);
        assert_eq!(state.time_ticks, 10);
    }

    #[test]
    fn test_delta_moves_and_clamps() {
        let mut state = playing(1);
        tick(&mut state, &MoveIntent::Delta(Vec2::new(0.0, -1.0)));
        assert_eq!(state.player.y, 281.0);

        for _ in 0..200 {
            tick(&mut state, &MoveIntent::Delta(Vec2::new(-1.0, -1.0)));
            if state.phase != GamePhase::Playing {
                break;
            }
        }
        if state.phase == GamePhase::Playing {
            assert_eq!((state.player.x, state.player.y), (0.0, 0.0));
        }
    }

    #[test]
    fn test_toward_target_normalizes_speed() {
        let step = player_step(Vec2::ZERO, &MoveIntent::Toward(Vec2::new(30.0, 40.0)), 4.0);
        assert!((step.length() - 4.0).abs() < 1e-5);
        assert!((step.x - 2.4).abs() < 1e-5);

        let still = player_step(Vec2::ZERO, &MoveIntent::Toward(Vec2::new(0.5, 0.5)), 4.0);
        assert_eq!(still, Vec2::ZERO);
    }

    #[test]
    fn test_collision_ends_run() {
        let mut state = playing(1);
        let player = state.player;
        let id = state
            .field
            .insert(Rect::new(player.right() + 2.0, player.y, 20.0, 40.0));
        let mut outcome = TickOutcome::Frozen;
        for _ in 0..5 {
            outcome = tick(&mut state, &MoveIntent::Idle);
            if matches!(outcome, TickOutcome::Collided { .. }) {
                break;
            }
        }
        match outcome {
            TickOutcome::Collided { obstacle } => assert_eq!(obstacle.id, id),
            other => panic!("expected collision, got {other:?}"),
        }
        assert_eq!(state.phase, GamePhase::NameEntry);
        assert!(state.field.obstacles().iter().all(|o| o.id != id));

        // Frozen afterwards
        let ticks = state.time_ticks;
        assert_eq!(tick(&mut state, &MoveIntent::Idle), TickOutcome::Frozen);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_difficulty_after_three_intervals() {
        let settings = Settings {
            accel_interval_ticks: 50,
            ..Default::default()
        };
        let mut state = GameState::new(&settings, 3);
        state.start_run();
        while state.time_ticks < 150 {
            tick(&mut state, &MoveIntent::Idle);
            // Ignore collisions, only the ramp matters here
            if state.phase == GamePhase::NameEntry {
                state.phase = GamePhase::Playing;
            }
        }
        assert_eq!(state.field.spawn_interval(), 60 - 3 * 4);
        assert!((state.field.speed() - (4.0 + 3.0 * 0.4)).abs() < 1e-5);
    }

    #[test]
    fn test_determinism() {
        let mut a = playing(99999);
        let mut b = playing(99999);
        let inputs = [
            MoveIntent::Delta(Vec2::new(0.0, 1.0)),
            MoveIntent::Idle,
            MoveIntent::Toward(Vec2::new(100.0, 100.0)),
        ];
        for i in 0..600 {
            let input = &inputs[i % inputs.len()];
            tick(&mut a, input);
            tick(&mut b, input);
        }
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.player, b.player);
        assert_eq!(a.field.obstacles(), b.field.obstacles());
    }
}
