//! Faultline Work Simulator
//!
//! Produces one unit of simulated work per call, governed by the fault
//! controller: sleeps the configured extra latency, rolls a failure
//! probability, and reports the outcome to the metrics sink, the log, and a
//! trace span.

use std::sync::Arc;
use std::time::{Duration, Instant};

use faultline_core::{FaultController, RandomSource};
use faultline_observability::{start_span, Metrics};
use tracing::{error, info};

/// Route label under which all simulated work is reported.
pub const WORK_ROUTE: &str = "/work";

/// Exception-kind label for simulated failures.
const ERROR_KIND: &str = "boom";

/// Failure probability applied even with the error-rate knob at zero.
const BASE_ERROR_RATE: f64 = 0.05;

/// Result of one simulated-work invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkOutcome {
    /// The work "succeeded"; carries the elapsed wall time including any
    /// injected latency.
    Completed { latency: Duration },
    /// The failure roll came up; no latency is reported for failed work.
    Failed,
}

/// The request-handling core: reads fault parameters, sleeps, rolls, and
/// drives the telemetry sink and trace span.
pub struct WorkSimulator {
    faults: Arc<FaultController>,
    metrics: Arc<Metrics>,
    rng: Arc<dyn RandomSource>,
}

impl WorkSimulator {
    pub fn new(
        faults: Arc<FaultController>,
        metrics: Arc<Metrics>,
        rng: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            faults,
            metrics,
            rng,
        }
    }

    /// Run one unit of simulated work.
    ///
    /// The sleep suspends only the calling task; concurrent requests and
    /// admin mutations proceed. The span guard closes the span on every exit
    /// path, including cancellation mid-sleep, and each metric is touched at
    /// most once per invocation.
    pub async fn simulate(&self) -> WorkOutcome {
        let mut span = start_span("do_work");
        let started = Instant::now();

        let extra_latency = self.faults.extra_latency();
        if !extra_latency.is_zero() {
            tokio::time::sleep(extra_latency).await;
        }

        // The error rate is re-read after the sleep, so a mutation that lands
        // while this request is suspended affects its failure roll.
        // The sum is deliberately unclamped: anything >= 1.0 always fails.
        let effective_rate = BASE_ERROR_RATE + self.faults.error_rate();
        if self.rng.roll() < effective_rate {
            self.metrics.inc_errors(WORK_ROUTE, ERROR_KIND);
            error!("processing failed");
            self.metrics.inc_requests(WORK_ROUTE, "500");
            // Failed work records no latency observation.
            span.record_error("processing failed");
            return WorkOutcome::Failed;
        }

        let latency = started.elapsed();
        info!("processing ok");
        self.metrics.inc_requests(WORK_ROUTE, "200");
        self.metrics.observe_latency(WORK_ROUTE, latency.as_secs_f64());
        span.record_ok();
        WorkOutcome::Completed { latency }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Source that always returns the same roll.
    struct FixedSource(f64);

    impl RandomSource for FixedSource {
        fn roll(&self) -> f64 {
            self.0
        }
    }

    /// Source that replays a scripted sequence, repeating the last value.
    struct ScriptedSource {
        values: Mutex<Vec<f64>>,
    }

    impl ScriptedSource {
        fn new(mut values: Vec<f64>) -> Self {
            values.reverse();
            Self {
                values: Mutex::new(values),
            }
        }
    }

    impl RandomSource for ScriptedSource {
        fn roll(&self) -> f64 {
            let mut values = self.values.lock().unwrap();
            if values.len() > 1 {
                values.pop().unwrap()
            } else {
                values[0]
            }
        }
    }

    fn simulator(rate: f64, latency_ms: i64, rng: Arc<dyn RandomSource>) -> WorkSimulator {
        let faults = Arc::new(FaultController::with_initial(rate, latency_ms));
        let metrics = Arc::new(Metrics::new().unwrap());
        WorkSimulator::new(faults, metrics, rng)
    }

    fn request_count(sim: &WorkSimulator, status: &str) -> f64 {
        sim.metrics
            .requests_total
            .get_metric_with_label_values(&[WORK_ROUTE, status])
            .unwrap()
            .get()
    }

    fn error_count(sim: &WorkSimulator) -> f64 {
        sim.metrics
            .errors_total
            .get_metric_with_label_values(&[WORK_ROUTE, "boom"])
            .unwrap()
            .get()
    }

    fn latency_samples(sim: &WorkSimulator) -> u64 {
        sim.metrics
            .request_seconds
            .get_metric_with_label_values(&[WORK_ROUTE])
            .unwrap()
            .get_sample_count()
    }

    #[tokio::test]
    async fn rate_one_always_fails() {
        // 0.05 + 1.0 exceeds every possible roll in [0, 1)
        let sim = simulator(1.0, 0, Arc::new(FixedSource(0.999_999)));
        for _ in 0..20 {
            assert_eq!(sim.simulate().await, WorkOutcome::Failed);
        }
        assert_eq!(error_count(&sim), 20.0);
        assert_eq!(request_count(&sim, "500"), 20.0);
        assert_eq!(latency_samples(&sim), 0);
    }

    #[tokio::test]
    async fn rate_zero_with_high_rolls_always_succeeds() {
        let sim = simulator(0.0, 0, Arc::new(FixedSource(0.5)));
        for _ in 0..20 {
            assert!(matches!(sim.simulate().await, WorkOutcome::Completed { .. }));
        }
        assert_eq!(request_count(&sim, "200"), 20.0);
        assert_eq!(latency_samples(&sim), 20);
        assert_eq!(error_count(&sim), 0.0);
    }

    #[tokio::test]
    async fn baseline_fails_even_at_rate_zero() {
        // A roll below the 0.05 baseline fails regardless of the knob
        let sim = simulator(0.0, 0, Arc::new(FixedSource(0.01)));
        assert_eq!(sim.simulate().await, WorkOutcome::Failed);
    }

    #[tokio::test]
    async fn success_latency_includes_injected_delay() {
        let sim = simulator(0.0, 30, Arc::new(FixedSource(0.9)));
        match sim.simulate().await {
            WorkOutcome::Completed { latency } => {
                assert!(latency >= Duration::from_millis(30));
            }
            WorkOutcome::Failed => panic!("roll of 0.9 at rate 0.0 must succeed"),
        }
    }

    #[tokio::test]
    async fn failure_is_counted_exactly_once() {
        let sim = simulator(0.0, 0, Arc::new(FixedSource(0.0)));
        sim.simulate().await;
        assert_eq!(error_count(&sim), 1.0);
        assert_eq!(request_count(&sim, "500"), 1.0);
        assert_eq!(latency_samples(&sim), 0);
    }

    #[tokio::test]
    async fn success_is_counted_exactly_once() {
        let sim = simulator(0.0, 0, Arc::new(FixedSource(0.5)));
        sim.simulate().await;
        assert_eq!(request_count(&sim, "200"), 1.0);
        assert_eq!(latency_samples(&sim), 1);
        assert_eq!(error_count(&sim), 0.0);
    }

    #[tokio::test]
    async fn mixed_sequence_accounts_each_outcome_once() {
        // fail, succeed, fail, succeed
        let rng = Arc::new(ScriptedSource::new(vec![0.0, 0.9, 0.02, 0.8]));
        let sim = simulator(0.0, 0, rng);
        for _ in 0..4 {
            sim.simulate().await;
        }
        assert_eq!(request_count(&sim, "200"), 2.0);
        assert_eq!(request_count(&sim, "500"), 2.0);
        assert_eq!(error_count(&sim), 2.0);
        assert_eq!(latency_samples(&sim), 2);
    }

    #[tokio::test]
    async fn admin_mutation_during_sleep_affects_the_roll() {
        let faults = Arc::new(FaultController::with_initial(0.0, 50));
        let metrics = Arc::new(Metrics::new().unwrap());
        let sim = WorkSimulator::new(faults.clone(), metrics, Arc::new(FixedSource(0.5)));

        let work = tokio::spawn(async move { sim.simulate().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        faults.set_error_rate(Some(1.0));

        assert_eq!(work.await.unwrap(), WorkOutcome::Failed);
    }
}
