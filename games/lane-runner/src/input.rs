use lane_engine::{keys, InputEvent, InputQueue};

use crate::sim::Steer;

/// Custom event kinds sent by the on-screen buttons.
pub mod buttons {
    pub const STEER_LEFT: u32 = 1;
    pub const STEER_RIGHT: u32 = 2;
    /// `a` = 1.0 while pressed, 0.0 on release.
    pub const BRAKE: u32 = 3;
    pub const TOGGLE_PAUSE: u32 = 4;
    pub const RESTART: u32 = 5;
}

/// A discrete request collected from this frame's input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Steer(Steer),
    TogglePause,
    Restart,
    /// Touch/click on the play surface at world x.
    Tap { x: f32 },
}

/// Input as seen by one frame of simulation.
///
/// The brake is a held level that survives between frames; everything else
/// is an edge collected from the queue and replaced every frame.
#[derive(Debug, Default)]
pub struct InputState {
    braking: bool,
    actions: Vec<Action>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold this frame's queued events into the state.
    pub fn collect(&mut self, queue: &InputQueue) {
        self.actions.clear();

        for event in queue.iter() {
            match *event {
                InputEvent::KeyDown { key_code } => match key_code {
                    keys::ARROW_LEFT => self.actions.push(Action::Steer(Steer::Left)),
                    keys::ARROW_RIGHT => self.actions.push(Action::Steer(Steer::Right)),
                    keys::SPACE => self.braking = true,
                    keys::P => self.actions.push(Action::TogglePause),
                    _ => {}
                },
                InputEvent::KeyUp { key_code } if key_code == keys::SPACE => {
                    self.braking = false;
                }
                InputEvent::PointerDown { x, .. } => self.actions.push(Action::Tap { x }),
                InputEvent::Custom { kind, a, .. } => match kind {
                    buttons::STEER_LEFT => self.actions.push(Action::Steer(Steer::Left)),
                    buttons::STEER_RIGHT => self.actions.push(Action::Steer(Steer::Right)),
                    buttons::BRAKE => self.braking = a != 0.0,
                    buttons::TOGGLE_PAUSE => self.actions.push(Action::TogglePause),
                    buttons::RESTART => self.actions.push(Action::Restart),
                    other => log::debug!("ignoring custom event kind {}", other),
                },
                _ => {}
            }
        }
    }

    /// Whether the brake is currently held.
    pub fn braking(&self) -> bool {
        self.braking
    }

    /// This frame's actions in arrival order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}
