pub mod api;
pub mod core;
pub mod systems;
pub mod bridge;
pub mod input;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext, RenderContext};
pub use api::types::GameEvent;
pub use core::rng::Rng;
pub use core::time::FrameClock;
pub use input::queue::{keys, InputEvent, InputQueue};
pub use bridge::protocol::ProtocolLayout;
pub use systems::vector::{VectorState, VectorVertex, VectorColor};
