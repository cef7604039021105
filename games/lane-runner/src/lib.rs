use wasm_bindgen::prelude::*;
use lane_engine::*;

pub mod game;
pub mod input;
pub mod render;
pub mod sim;
pub mod tuning;

pub use game::LaneRunner;

lane_web::export_game!(LaneRunner, "lane-runner");
