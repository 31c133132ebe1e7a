//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! every request (accepted or rejected)
//!     → logging.rs  (structured log events via tracing)
//!     → metrics.rs  (counters + histograms, Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The observability layer sits outermost so rejected requests are
//!   counted and traced too
//! - Metric updates are cheap atomic operations; tracing spans carry the
//!   request id

pub mod logging;
pub mod metrics;
