//! Offline-first caching for the game's app shell.
//!
//! The worker policy is written against three small traits (`CacheStore`,
//! `Network`, `WorkerHost`) so it runs unchanged on browser Cache Storage
//! and on the in-memory store used by tests.

pub mod error;
pub mod http;
pub mod manifest;
pub mod memory;
pub mod store;
pub mod worker;

#[cfg(test)]
mod testing;

pub use error::{CacheError, Result};
pub use http::{Request, Response, ResponseKind};
pub use manifest::ShellManifest;
pub use memory::MemoryStore;
pub use store::{CacheStore, Network, WorkerHost};
pub use worker::{FetchDecision, OfflineWorker, Served, Source, WorkerState};
