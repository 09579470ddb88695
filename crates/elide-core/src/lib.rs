#![forbid(unsafe_code)]

//! Core: logging facade and resize-stream throttling shared by the elide crates.

pub mod logging;
pub mod throttle;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, error, info, info_span, trace, trace_span, warn};

pub use throttle::{CoalesceMode, DEFAULT_WINDOW, Throttle, ThrottleConfig};
