//! Policy configuration and mutation classification.
//!
//! Submodules:
//! - `config`: policy struct and presets
//! - `sensitive`: the classifier deciding whether the token gate is entered
//! - `types`: small enums shared by both

pub mod config;
pub mod sensitive;
pub mod types;

pub use config::Policy;
pub use sensitive::classify;
pub use types::{LockingPolicy, Sensitivity};
