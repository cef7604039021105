use crate::api::types::GameEvent;
use crate::input::queue::InputQueue;
use crate::systems::vector::VectorState;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// World width in game units (the fixed logical canvas width).
    pub world_width: f32,
    /// World height in game units (the fixed logical canvas height).
    pub world_height: f32,
    /// Upper bound on a single frame delta in milliseconds (default: 50).
    /// Keeps the simulation from jumping after a tab resumes.
    pub max_frame_ms: f32,
    /// Maximum number of vector vertices per frame (default: 16384).
    pub max_vector_vertices: usize,
    /// Maximum number of game events per frame (default: 32).
    pub max_events: usize,
    /// Seed for the engine-provided random generator.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_width: 800.0,
            world_height: 600.0,
            max_frame_ms: 50.0,
            max_vector_vertices: 16384,
            max_events: 32,
            seed: 42,
        }
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Apply a JSON settings document supplied by the host page.
    /// Games without runtime settings ignore it.
    fn load_settings(&mut self, _json: &str) -> Result<(), serde_json::Error> {
        Ok(())
    }

    /// Setup initial state.
    fn init(&mut self, ctx: &mut EngineContext);

    /// The game loop tick. `dt_ms` is the already-bounded frame delta.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue, dt_ms: f32);

    /// Read-only render pass producing this frame's draw calls.
    fn render(&self, _ctx: &mut RenderContext) {}
}

/// Mutable access to engine state, passed to Game::init and Game::update.
pub struct EngineContext {
    pub events: Vec<GameEvent>,
    seed: u64,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::with_seed(GameConfig::default().seed)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            events: Vec::new(),
            seed,
        }
    }

    /// The seed the game should use for its random generator.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Emit a game event to be forwarded to the UI layer.
    pub fn emit_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Clear per-frame transient data.
    pub fn clear_frame_data(&mut self) {
        self.events.clear();
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Render context handed to `Game::render`.
pub struct RenderContext<'a> {
    pub vectors: &'a mut VectorState,
}
