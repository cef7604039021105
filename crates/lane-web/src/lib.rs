pub mod runner;

pub use runner::GameRunner;

/// Generate all `#[wasm_bindgen]` exports for a game.
///
/// Expands to a `thread_local!` runner plus free `#[wasm_bindgen]`
/// functions for the page: lifecycle (`game_create`, `game_load_settings`,
/// `game_init`, `game_tick`, `game_reset_clock`), input forwarding, and
/// pointers into the shared frame buffer.
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
/// use lane_engine::*;
///
/// mod game;
/// use game::MyGame;
///
/// lane_web::export_game!(MyGame, "my-game");
/// ```
///
/// The calling crate must depend on `wasm-bindgen`, `log`, `console_log` and
/// `console_error_panic_hook`, and have `InputEvent` in scope.
///
/// # Arguments
///
/// - `$game_type`: The game struct type that implements `lane_engine::Game`
/// - `$game_name`: A string literal used in log messages
#[macro_export]
macro_rules! export_game {
    ($game_type:ty, $game_name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::GameRunner<$game_type>>> = RefCell::new(None);
        }

        fn with_runner<R>(f: impl FnOnce(&mut $crate::GameRunner<$game_type>) -> R) -> R {
            RUNNER.with(|cell| {
                let mut borrow = cell.borrow_mut();
                let runner = borrow.as_mut().expect("Game not initialized. Call game_create() first.");
                f(runner)
            })
        }

        /// Create the runner. Settings may be loaded before `game_init`.
        #[wasm_bindgen]
        pub fn game_create() {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            let game = <$game_type>::new();
            let runner = $crate::GameRunner::new(game);

            RUNNER.with(|cell| {
                *cell.borrow_mut() = Some(runner);
            });
        }

        #[wasm_bindgen]
        pub fn game_load_settings(json: &str) -> Result<(), JsValue> {
            with_runner(|r| r.load_settings(json)).map_err(|e| {
                log::error!("{}: rejected settings: {}", $game_name, e);
                JsValue::from_str(&e)
            })
        }

        #[wasm_bindgen]
        pub fn game_init() {
            let created = RUNNER.with(|cell| cell.borrow().is_some());
            if !created {
                game_create();
            }
            with_runner(|r| r.init());
            log::info!("{}: initialized", $game_name);
        }

        #[wasm_bindgen]
        pub fn game_tick(now_ms: f64) {
            with_runner(|r| r.tick(now_ms));
        }

        #[wasm_bindgen]
        pub fn game_reset_clock() {
            with_runner(|r| r.reset_clock());
        }

        #[wasm_bindgen]
        pub fn game_pointer_down(x: f32, y: f32) {
            with_runner(|r| r.push_input(InputEvent::PointerDown { x, y }));
        }

        #[wasm_bindgen]
        pub fn game_pointer_up(x: f32, y: f32) {
            with_runner(|r| r.push_input(InputEvent::PointerUp { x, y }));
        }

        #[wasm_bindgen]
        pub fn game_key_down(key_code: u32) {
            with_runner(|r| r.push_input(InputEvent::KeyDown { key_code }));
        }

        #[wasm_bindgen]
        pub fn game_key_up(key_code: u32) {
            with_runner(|r| r.push_input(InputEvent::KeyUp { key_code }));
        }

        #[wasm_bindgen]
        pub fn game_custom_event(kind: u32, a: f32, b: f32, c: f32) {
            with_runner(|r| r.push_input(InputEvent::Custom { kind, a, b, c }));
        }

        // ---- Shared buffer ----
        // Header layout: lane_engine::bridge::protocol. Counts and
        // capacities are read from the header, not from separate calls.

        #[wasm_bindgen]
        pub fn get_header_ptr() -> *const f32 {
            with_runner(|r| r.header_ptr())
        }

        #[wasm_bindgen]
        pub fn get_vector_vertices_ptr() -> *const f32 {
            with_runner(|r| r.vector_vertices_ptr())
        }

        #[wasm_bindgen]
        pub fn get_game_events_ptr() -> *const f32 {
            with_runner(|r| r.game_events_ptr())
        }
    };
}
