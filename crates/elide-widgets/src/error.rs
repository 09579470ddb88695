#![forbid(unsafe_code)]

//! Error types for ellipsis configuration and the synchronous driver.
//!
//! Measurement itself never fails: a missing or zero height just means the
//! probe has not laid out yet. Errors only come from building invalid options
//! and from [`EllipsisEngine::resolve_with`](crate::engine::EllipsisEngine::resolve_with)
//! when a probe never converges.

use crate::measure::MeasurementPhase;

/// Invalid ellipsis option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A row limit of zero was requested. Use no limit instead.
    ZeroRows,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroRows => write!(f, "row limit must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failure of the synchronous measurement driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// More render passes were needed than the search can legitimately take.
    PassLimitExceeded {
        /// Passes run before giving up.
        passes: usize,
        /// Phase the engine was left in.
        phase: MeasurementPhase,
    },
    /// The probe kept reporting no usable height.
    ProbeStalled {
        /// Consecutive passes without progress.
        attempts: usize,
        /// Phase the engine was stuck in.
        phase: MeasurementPhase,
    },
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PassLimitExceeded { passes, phase } => {
                write!(f, "measurement did not resolve after {passes} passes (phase {phase:?})")
            }
            Self::ProbeStalled { attempts, phase } => {
                write!(
                    f,
                    "probe reported no height for {attempts} consecutive passes (phase {phase:?})"
                )
            }
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(ConfigError::ZeroRows.to_string(), "row limit must be at least 1");
        let err = EngineError::ProbeStalled {
            attempts: 3,
            phase: MeasurementPhase::ProbingBaseline,
        };
        assert_eq!(
            err.to_string(),
            "probe reported no height for 3 consecutive passes (phase ProbingBaseline)"
        );
        let err = EngineError::PassLimitExceeded {
            passes: 12,
            phase: MeasurementPhase::Searching,
        };
        assert!(err.to_string().contains("12 passes"));
    }

    #[test]
    fn errors_are_std_errors() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<ConfigError>();
        assert_error::<EngineError>();
    }
}
