//! Input boundary
//!
//! Device adapters (keyboard, pointer drag, touch, gamepad) live outside the
//! core. They reduce whatever they poll into one `FrameInput` per tick.
//! Adapters must never block.

use std::collections::VecDeque;

use glam::Vec2;

use crate::sim::GameState;

/// Movement request for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MoveIntent {
    #[default]
    Idle,
    /// Direction with components in [-1, 1]; longer vectors are clamped
    /// to unit length.
    Delta(Vec2),
    /// Absolute target (drag/touch); the core steers toward it.
    Toward(Vec2),
}

/// Everything the core reads from the outside world in one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    pub movement: MoveIntent,
    /// Title: begin a run
    pub start: bool,
    /// NameEntry: commit the typed name
    pub submit: bool,
    /// NameEntry: delete the last character
    pub backspace: bool,
    /// NameEntry: characters typed since the last tick
    pub text: String,
    /// Leaderboard: wipe all scores
    pub reset: bool,
    /// Leaderboard: go back to the title
    pub back: bool,
}

impl FrameInput {
    pub fn moving(movement: MoveIntent) -> Self {
        Self {
            movement,
            ..Default::default()
        }
    }

    pub fn typed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// A polled input device (or a replay of one)
pub trait InputSource {
    fn poll(&mut self, state: &GameState) -> FrameInput;
}

/// Merge digital directions and an analog stick into one intent.
///
/// Stick axes inside `deadzone` are ignored. Screen Y grows downward, so
/// "up" is negative Y unless `invert_y` is set.
pub fn axis_intent(
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    stick: Vec2,
    deadzone: f32,
    invert_y: bool,
) -> MoveIntent {
    let mut dir = Vec2::ZERO;
    if up {
        dir.y -= 1.0;
    }
    if down {
        dir.y += 1.0;
    }
    if left {
        dir.x -= 1.0;
    }
    if right {
        dir.x += 1.0;
    }

    let stick_x = if stick.x.abs() > deadzone { stick.x } else { 0.0 };
    let stick_y = if stick.y.abs() > deadzone { stick.y } else { 0.0 };
    dir += Vec2::new(stick_x, stick_y);

    if invert_y {
        dir.y = -dir.y;
    }

    if dir == Vec2::ZERO {
        MoveIntent::Idle
    } else {
        MoveIntent::Delta(dir.clamp_length_max(1.0))
    }
}

/// Replays a queue of frames, then idles
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<FrameInput>,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = FrameInput>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, _state: &GameState) -> FrameInput {
        self.frames.pop_front().unwrap_or_default()
    }
}

/// Simple pilot for demos: steers vertically away from the nearest
/// obstacle sharing the player's lane.
#[derive(Debug, Clone, Copy)]
pub struct Autopilot {
    /// How far ahead (in units) obstacles are considered
    pub lookahead: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self { lookahead: 160.0 }
    }
}

impl Autopilot {
    pub fn intent(&self, state: &GameState) -> MoveIntent {
        let player = state.player;
        let threat = state
            .field
            .obstacles()
            .iter()
            .filter(|o| o.rect.right() > player.x && o.rect.x - player.right() < self.lookahead)
            .filter(|o| o.rect.y < player.bottom() + 8.0 && o.rect.bottom() > player.y - 8.0)
            .min_by(|a, b| {
                a.rect
                    .x
                    .partial_cmp(&b.rect.x)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        let Some(threat) = threat else {
            // Drift back toward the middle lane
            let mid = Vec2::new(player.center().x, state.field.config().height * 0.5);
            return if (player.center().y - mid.y).abs() > 4.0 {
                MoveIntent::Toward(mid)
            } else {
                MoveIntent::Idle
            };
        };

        let room_above = threat.rect.y;
        let room_below = state.field.config().height - threat.rect.bottom();
        if room_above > room_below {
            MoveIntent::Delta(Vec2::new(0.0, -1.0))
        } else {
            MoveIntent::Delta(Vec2::new(0.0, 1.0))
        }
    }
}

impl InputSource for Autopilot {
    fn poll(&mut self, state: &GameState) -> FrameInput {
        FrameInput::moving(self.intent(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_intent_keys() {
        assert_eq!(
            axis_intent(false, false, false, false, Vec2::ZERO, 0.2, false),
            MoveIntent::Idle
        );
        assert_eq!(
            axis_intent(true, false, false, false, Vec2::ZERO, 0.2, false),
            MoveIntent::Delta(Vec2::new(0.0, -1.0))
        );
        // Opposing keys cancel
        assert_eq!(
            axis_intent(true, true, false, false, Vec2::ZERO, 0.2, false),
            MoveIntent::Idle
        );
    }

    #[test]
    fn test_axis_intent_diagonal_is_unit_length() {
        let MoveIntent::Delta(dir) = axis_intent(false, true, false, true, Vec2::ZERO, 0.2, false)
        else {
            panic!("expected a delta");
        };
        assert!((dir.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_axis_intent_deadzone_and_invert() {
        assert_eq!(
            axis_intent(false, false, false, false, Vec2::new(0.1, -0.15), 0.2, false),
            MoveIntent::Idle
        );
        assert_eq!(
            axis_intent(false, false, false, false, Vec2::new(0.0, 0.5), 0.2, true),
            MoveIntent::Delta(Vec2::new(0.0, -0.5))
        );
    }

    #[test]
    fn test_scripted_input_drains_then_idles() {
        let state = GameState::new(&crate::Settings::default(), 1);
        let mut script = ScriptedInput::new([
            FrameInput {
                start: true,
                ..Default::default()
            },
            FrameInput::typed("A"),
        ]);
        assert!(script.poll(&state).start);
        assert_eq!(script.poll(&state).text, "A");
        assert!(script.is_empty());
        assert_eq!(script.poll(&state), FrameInput::default());
    }

    #[test]
    fn test_autopilot_dodges_incoming_obstacle() {
        let mut state = GameState::new(&crate::Settings::default(), 1);
        let player = state.player;
        // Obstacle in the player's lane, hugging the top of the field
        state
            .field
            .insert(crate::sim::Rect::new(player.right() + 50.0, 0.0, 20.0, player.bottom()));
        let pilot = Autopilot::default();
        assert_eq!(pilot.intent(&state), MoveIntent::Delta(Vec2::new(0.0, 1.0)));
    }
}
