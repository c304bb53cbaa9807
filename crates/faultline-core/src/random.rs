//! Randomness seam for failure injection
//!
//! The failure roll is the one place where randomness drives control flow,
//! so it sits behind a trait and gets injected into the simulator. Tests
//! supply scripted sources; production uses the thread-local generator.

use rand::Rng;

/// Source of uniform random values in [0, 1).
pub trait RandomSource: Send + Sync {
    /// Draw one uniform value in [0, 1).
    fn roll(&self) -> f64;
}

/// Production source backed by the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn roll(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}
