//! End-to-end integration tests for Faultline
//!
//! The tests live in `tests/` and drive the fully assembled router:
//! admin surface → fault controller → work simulator → telemetry sink.
