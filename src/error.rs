//! Centralized error type for the polysampler umbrella crate.
//!
//! Wraps the core error so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] polysampler_core::Error),

    /// The control → render queue is full; the render side is not draining.
    #[error("Command queue full")]
    CommandQueueFull,
}

pub type Result<T> = std::result::Result<T, Error>;
