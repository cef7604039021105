use lane_engine::{EngineContext, Game, GameConfig, GameEvent, InputQueue, RenderContext};

use crate::input::{Action, InputState};
use crate::render;
use crate::sim::{GameSession, Steer};
use crate::tuning::Tuning;

/// Score after this frame. Sent every frame.
pub const EVENT_SCORE: f32 = 1.0;
/// The run just ended, with the final score. Sent once per crash.
pub const EVENT_CRASHED: f32 = 2.0;
/// Pause changed (a = 1.0 paused, 0.0 resumed).
pub const EVENT_PAUSED: f32 = 3.0;

const DEFAULT_SEED: u64 = 0x1a2e_5eed;

/// f32 holds integers exactly up to 2^24.
const SCORE_SPLIT: u64 = 1 << 24;

/// A score event split across `a` (low part) and `b` (high part). The page
/// reads `b * 16777216 + a`.
fn score_event(kind: f32, score: u64) -> GameEvent {
    GameEvent {
        kind,
        a: (score % SCORE_SPLIT) as f32,
        b: (score / SCORE_SPLIT) as f32,
        c: 0.0,
    }
}

pub struct LaneRunner {
    tuning: Tuning,
    seed: u64,
    session: GameSession,
    input: InputState,
}

impl LaneRunner {
    pub fn new() -> Self {
        Self::with_tuning(Tuning::default())
    }

    pub fn with_tuning(tuning: Tuning) -> Self {
        let tuning = tuning.normalized();
        Self {
            session: GameSession::new(tuning.clone(), DEFAULT_SEED),
            tuning,
            seed: DEFAULT_SEED,
            input: InputState::new(),
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    fn apply(session: &mut GameSession, ctx: &mut EngineContext, action: Action) {
        match action {
            Action::Steer(direction) => {
                if session.state().running {
                    session.steer(direction);
                }
            }
            Action::TogglePause => Self::toggle_pause(session, ctx),
            Action::Restart => Self::restart(session),
            Action::Tap { x } => {
                if session.is_crashed() {
                    Self::restart(session);
                } else if session.is_paused() {
                    Self::toggle_pause(session, ctx);
                } else if x < session.tuning().world_width / 2.0 {
                    session.steer(Steer::Left);
                } else {
                    session.steer(Steer::Right);
                }
            }
        }
    }

    fn toggle_pause(session: &mut GameSession, ctx: &mut EngineContext) {
        if let Some(paused) = session.toggle_pause() {
            log::debug!("lane-runner: {}", if paused { "paused" } else { "resumed" });
            ctx.emit_event(GameEvent::new(EVENT_PAUSED, if paused { 1.0 } else { 0.0 }));
        }
    }

    fn restart(session: &mut GameSession) {
        log::info!("lane-runner: restart after score {}", session.state().score);
        session.restart();
    }
}

impl Default for LaneRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for LaneRunner {
    fn config(&self) -> GameConfig {
        GameConfig {
            world_width: self.tuning.world_width,
            world_height: self.tuning.world_height,
            max_frame_ms: self.tuning.max_frame_ms,
            max_vector_vertices: 8192,
            max_events: 16,
            seed: DEFAULT_SEED,
        }
    }

    fn load_settings(&mut self, json: &str) -> Result<(), serde_json::Error> {
        self.tuning = Tuning::from_json(json)?;
        self.session = GameSession::new(self.tuning.clone(), self.seed);
        log::info!("lane-runner: loaded tuning ({} lanes)", self.tuning.lanes);
        Ok(())
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        self.seed = ctx.seed();
        self.session = GameSession::new(self.tuning.clone(), self.seed);
        self.input = InputState::new();
        log::info!(
            "lane-runner: {} lanes on {}x{}",
            self.tuning.lanes,
            self.tuning.world_width,
            self.tuning.world_height
        );
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue, dt_ms: f32) {
        self.input.collect(input);
        for &action in self.input.actions() {
            Self::apply(&mut self.session, ctx, action);
        }

        if self.session.state().running {
            self.session.set_braking(self.input.braking());
            if self.session.advance(dt_ms) {
                let score = self.session.state().score;
                log::info!("lane-runner: crashed with score {}", score);
                ctx.emit_event(score_event(EVENT_CRASHED, score));
            }
        }

        ctx.emit_event(score_event(EVENT_SCORE, self.session.state().score));
    }

    fn render(&self, ctx: &mut RenderContext) {
        render::draw_scene(&self.session, ctx.vectors);
    }
}
