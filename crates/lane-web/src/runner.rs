use lane_engine::bridge::protocol::HEADER_FLOATS;
use lane_engine::{
    EngineContext, FrameClock, Game, GameConfig, InputEvent, InputQueue, ProtocolLayout,
    RenderContext, VectorState,
};

/// Generic game runner that wires up the frame loop.
///
/// Each concrete game creates a `thread_local!` GameRunner and exports free
/// functions via `#[wasm_bindgen]` (see `export_game!`), because wasm-bindgen
/// cannot export generic structs directly.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    vectors: VectorState,
    clock: FrameClock,
    config: GameConfig,
    layout: ProtocolLayout,
    initialized: bool,
    frame: u32,
    header: [f32; HEADER_FLOATS],
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        let layout = ProtocolLayout::from_config(&config);

        Self {
            game,
            ctx: EngineContext::with_seed(config.seed),
            input: InputQueue::new(),
            vectors: VectorState::with_capacity(config.max_vector_vertices),
            clock: FrameClock::new(config.max_frame_ms),
            header: layout.header(&config, 0, 0, 0),
            layout,
            config,
            initialized: false,
            frame: 0,
        }
    }

    /// Initialize the game. Call once after construction (and after
    /// `load_settings`, if the page supplies settings).
    pub fn init(&mut self) {
        self.config = self.game.config();
        self.layout = ProtocolLayout::from_config(&self.config);
        self.clock = FrameClock::new(self.config.max_frame_ms);
        self.ctx = EngineContext::with_seed(self.config.seed);
        self.game.init(&mut self.ctx);
        self.initialized = true;
    }

    /// Forward a JSON settings document to the game. Only allowed before
    /// `init`, which fixes the config the header and clock are built from.
    pub fn load_settings(&mut self, json: &str) -> Result<(), String> {
        if self.initialized {
            return Err("settings must be loaded before init".to_string());
        }
        self.game.load_settings(json).map_err(|e| e.to_string())
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one frame: bound the delta, update the game, rebuild draw calls.
    /// `now_ms` is the display callback's high-resolution timestamp.
    pub fn tick(&mut self, now_ms: f64) {
        if !self.initialized {
            return;
        }

        self.ctx.clear_frame_data();

        let dt = self.clock.tick(now_ms);
        self.game.update(&mut self.ctx, &self.input, dt);

        let overflowed = self.input.clear();
        if overflowed > 0 {
            log::warn!("input queue overflowed, {} events dropped", overflowed);
        }

        self.vectors.clear();
        {
            let mut render_ctx = RenderContext {
                vectors: &mut self.vectors,
            };
            self.game.render(&mut render_ctx);
        }

        if self.vectors.vertex_count() > self.layout.max_vector_vertices {
            log::warn!(
                "frame {}: {} vector vertices exceed capacity {}, truncating",
                self.frame,
                self.vectors.vertex_count(),
                self.layout.max_vector_vertices
            );
        }

        self.frame = self.frame.wrapping_add(1);
        self.header = self.layout.header(
            &self.config,
            self.frame,
            self.vectors.vertex_count(),
            self.ctx.events.len(),
        );
    }

    /// Forget the previous frame timestamp (page hidden / resumed).
    pub fn reset_clock(&mut self) {
        self.clock.reset();
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    // ---- Pointer accessors for shared-buffer reads ----

    pub fn header_ptr(&self) -> *const f32 {
        self.header.as_ptr()
    }

    pub fn vector_vertices_ptr(&self) -> *const f32 {
        self.vectors.buffer_ptr()
    }

    pub fn game_events_ptr(&self) -> *const f32 {
        bytemuck::cast_slice::<_, f32>(&self.ctx.events).as_ptr()
    }

    /// This frame's header, also readable through `header_ptr`.
    pub fn header(&self) -> &[f32; HEADER_FLOATS] {
        &self.header
    }

    pub fn layout(&self) -> &ProtocolLayout {
        &self.layout
    }
}
