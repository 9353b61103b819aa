pub mod error_envelope;
pub mod metrics;
pub mod tracing;
