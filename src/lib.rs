//! Chase replay: turns a logged two-agent pursuit on a weighted graph into
//! a terminal animation, or into a self-contained artifact that can be
//! played back later.

pub mod canvas;
pub mod config;
pub mod engine;
pub mod error;
pub mod menubar;
pub mod player;
pub mod renderer;
pub mod scene;
pub mod types;
pub mod viewer;

pub use config::ReplayConfig;
pub use engine::Replay;
pub use error::{ReplayError, ReplayResult};
