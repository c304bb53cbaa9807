//! Faultline Core
//!
//! This crate provides the shared building blocks of the service:
//! - Runtime-adjustable fault parameters (error rate, extra latency)
//! - An injectable randomness seam for failure rolls
//! - The library error type

pub mod error;
pub mod faults;
pub mod random;

pub use error::{Error, Result};
pub use faults::{FaultConfig, FaultController};
pub use random::{RandomSource, ThreadRngSource};
