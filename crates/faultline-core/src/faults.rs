//! Runtime-adjustable fault parameters
//!
//! The controller owns the pair of fault knobs that the admin surface mutates
//! and the work simulator reads on every request:
//! - `error_rate`: probability in [0, 1] added on top of the simulator's
//!   fixed baseline
//! - `extra_latency`: artificial delay injected before the failure roll
//!
//! Both fields live behind one `RwLock` so a reader always sees a coherent
//! snapshot of the pair. Setters clamp out-of-range input instead of
//! rejecting it; every mutation is logged at warn level with the value that
//! was actually stored.

use std::sync::RwLock;
use std::time::Duration;

use tracing::warn;

/// The pair of fault parameters, shared process-wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaultConfig {
    /// Additional failure probability, always in [0, 1].
    pub error_rate: f64,
    /// Artificial delay per simulated-work call, never negative.
    pub extra_latency: Duration,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            error_rate: 0.0,
            extra_latency: Duration::ZERO,
        }
    }
}

/// Concurrency-safe owner of the fault parameters.
///
/// Created once at startup and shared as `Arc<FaultController>` between the
/// admin handlers (writers) and the work simulator (readers). Setters have no
/// failure modes: invalid input is clamped, absent input is treated as zero.
#[derive(Debug, Default)]
pub struct FaultController {
    inner: RwLock<FaultConfig>,
}

impl FaultController {
    /// Create a controller with both parameters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a controller seeded from startup configuration.
    ///
    /// Inputs pass through the same clamping as runtime mutations.
    pub fn with_initial(error_rate: f64, extra_latency_ms: i64) -> Self {
        let controller = Self::new();
        controller.set_error_rate(Some(error_rate));
        controller.set_extra_latency_ms(Some(extra_latency_ms));
        controller
    }

    /// Current error rate, in [0, 1].
    pub fn error_rate(&self) -> f64 {
        self.snapshot().error_rate
    }

    /// Current extra latency.
    pub fn extra_latency(&self) -> Duration {
        self.snapshot().extra_latency
    }

    /// Coherent copy of both parameters under one read guard.
    pub fn snapshot(&self) -> FaultConfig {
        *self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Set the error rate, clamping to [0, 1]. `None` and NaN store 0.0.
    ///
    /// Returns the value that was stored. Always succeeds.
    pub fn set_error_rate(&self, rate: Option<f64>) -> f64 {
        let rate = match rate {
            Some(r) if r.is_nan() => 0.0,
            Some(r) => r.clamp(0.0, 1.0),
            None => 0.0,
        };
        self.write().error_rate = rate;
        warn!(error_rate = rate, "fault error rate set");
        rate
    }

    /// Set the extra latency from milliseconds, clamping to >= 0.
    /// `None` stores 0.
    ///
    /// Returns the stored value in whole milliseconds. Always succeeds.
    pub fn set_extra_latency_ms(&self, ms: Option<i64>) -> u64 {
        let ms = ms.unwrap_or(0).max(0) as u64;
        self.write().extra_latency = Duration::from_millis(ms);
        warn!(extra_latency_ms = ms, "fault extra latency set");
        ms
    }

    /// Set both parameters back to zero under one write guard.
    ///
    /// Returns the resulting `(error_rate, extra_latency_ms)` pair.
    pub fn reset(&self) -> (f64, u64) {
        *self.write() = FaultConfig::default();
        warn!("faults reset");
        (0.0, 0)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, FaultConfig> {
        // A poisoned lock only means a writer panicked mid-assignment of a
        // Copy value; the data is still a valid FaultConfig.
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn defaults_are_zero() {
        let controller = FaultController::new();
        assert_eq!(controller.error_rate(), 0.0);
        assert_eq!(controller.extra_latency(), Duration::ZERO);
    }

    #[test]
    fn error_rate_is_clamped() {
        let controller = FaultController::new();
        assert_eq!(controller.set_error_rate(Some(0.3)), 0.3);
        assert_eq!(controller.error_rate(), 0.3);
        assert_eq!(controller.set_error_rate(Some(1.7)), 1.0);
        assert_eq!(controller.error_rate(), 1.0);
        assert_eq!(controller.set_error_rate(Some(-0.5)), 0.0);
        assert_eq!(controller.error_rate(), 0.0);
    }

    #[test]
    fn absent_error_rate_is_zero() {
        let controller = FaultController::new();
        controller.set_error_rate(Some(0.9));
        assert_eq!(controller.set_error_rate(None), 0.0);
        assert_eq!(controller.error_rate(), 0.0);
    }

    #[test]
    fn nan_error_rate_is_zero() {
        let controller = FaultController::new();
        assert_eq!(controller.set_error_rate(Some(f64::NAN)), 0.0);
        assert_eq!(controller.error_rate(), 0.0);
    }

    #[test]
    fn extra_latency_is_clamped() {
        let controller = FaultController::new();
        assert_eq!(controller.set_extra_latency_ms(Some(250)), 250);
        assert_eq!(controller.extra_latency(), Duration::from_millis(250));
        assert_eq!(controller.set_extra_latency_ms(Some(-40)), 0);
        assert_eq!(controller.extra_latency(), Duration::ZERO);
        assert_eq!(controller.set_extra_latency_ms(None), 0);
    }

    #[test]
    fn reset_zeroes_both() {
        let controller = FaultController::new();
        controller.set_error_rate(Some(0.8));
        controller.set_extra_latency_ms(Some(100));
        assert_eq!(controller.reset(), (0.0, 0));
        assert_eq!(controller.error_rate(), 0.0);
        assert_eq!(controller.extra_latency(), Duration::ZERO);
    }

    #[test]
    fn with_initial_clamps_like_setters() {
        let controller = FaultController::with_initial(2.0, -10);
        assert_eq!(controller.error_rate(), 1.0);
        assert_eq!(controller.extra_latency(), Duration::ZERO);
    }

    #[test]
    fn concurrent_mutation_never_tears() {
        // Writers alternate between two known configurations; readers must
        // only ever observe values that were explicitly set.
        let controller = Arc::new(FaultController::new());
        let mut handles = Vec::new();

        for _ in 0..4 {
            let c = controller.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..500 {
                    if i % 2 == 0 {
                        c.set_error_rate(Some(0.25));
                        c.set_extra_latency_ms(Some(10));
                    } else {
                        c.set_error_rate(Some(0.75));
                        c.set_extra_latency_ms(Some(20));
                    }
                }
            }));
        }

        for _ in 0..4 {
            let c = controller.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..2000 {
                    let snapshot = c.snapshot();
                    assert!(
                        snapshot.error_rate == 0.0
                            || snapshot.error_rate == 0.25
                            || snapshot.error_rate == 0.75
                    );
                    let ms = snapshot.extra_latency.as_millis();
                    assert!(ms == 0 || ms == 10 || ms == 20);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
