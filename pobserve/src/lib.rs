//! Production-friendly observability hooks for provider calls and chat turns.
//!
//! ```rust
//! use pobserve::{MetricsObservabilityHooks, TracingObservabilityHooks};
//!
//! let _tracing = TracingObservabilityHooks;
//! let _metrics = MetricsObservabilityHooks;
//! ```

mod metrics_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{MetricsObservabilityHooks, TracingObservabilityHooks};
}
