#![forbid(unsafe_code)]

//! Elide public facade crate.
//!
//! Re-exports the content model, the ellipsis engine and the typography
//! controller from the internal crates, with a single error type and a
//! prelude for day-to-day use.
//!
//! ```
//! use elide::prelude::*;
//!
//! fn truncate(text: &str, width: u32, rows: u32) -> elide::Result<String> {
//!     let options = EllipsisOptions::default().rows(Rows::new(rows)?).css_only(false);
//!     let mut engine = EllipsisEngine::new(EllipsisConfig::new(options))
//!         .with_content(vec![Node::from(text)]);
//!     engine.set_width(width);
//!     engine.resolve_with(&mut CellProbe::new())?;
//!     Ok(engine.presentation().plain_text())
//! }
//!
//! assert_eq!(truncate("fits", 10, 1).unwrap(), "fits");
//! assert!(truncate("does not fit on one short line", 10, 1).unwrap().ends_with('…'));
//! assert!(truncate("anything", 10, 0).is_err());
//! ```

use std::fmt;

// --- Content re-exports ----------------------------------------------------

pub use elide_text::{
    ContentSequence, ContentUnit, Element, Node, Piece, UnitKind, WrapMode, WrapOptions, tokenize,
};

// --- Engine re-exports -----------------------------------------------------

pub use elide_widgets::{
    Action, ActionKind, Affordances, CellProbe, Decorations, Disclosure, DriverLimits,
    EllipsisConfig, EllipsisEngine, EllipsisHooks, EllipsisOptions, ExpandLabels, LayoutReport,
    MeasurementPhase, MeasurementProbe, Presentation, Probe, Render, Resolution, Rows,
    ShowFullText, ToggleSource,
};

// --- Typography re-exports -------------------------------------------------

pub use elide_widgets::{
    Activation, HeadingLevel, TextType, Typography, TypographyHooks, TypographyKind,
    TypographyProps, TypographyView,
};

// --- Core re-exports -------------------------------------------------------

pub use elide_core::{CoalesceMode, Throttle, ThrottleConfig};

#[cfg(feature = "tracing-json")]
pub use elide_core::logging::init_json_logging;

// --- Errors ---------------------------------------------------------------

/// Top-level error type for elide.
#[derive(Debug)]
pub enum Error {
    /// Invalid ellipsis option.
    Config(elide_widgets::ConfigError),
    /// The synchronous measurement driver gave up.
    Engine(elide_widgets::EngineError),
    /// A log subscriber could not be installed.
    #[cfg(feature = "tracing-json")]
    Logging(elide_core::logging::LoggingInitError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Engine(err) => write!(f, "{err}"),
            #[cfg(feature = "tracing-json")]
            Self::Logging(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Engine(err) => Some(err),
            #[cfg(feature = "tracing-json")]
            Self::Logging(err) => Some(err),
        }
    }
}

impl From<elide_widgets::ConfigError> for Error {
    fn from(err: elide_widgets::ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<elide_widgets::EngineError> for Error {
    fn from(err: elide_widgets::EngineError) -> Self {
        Self::Engine(err)
    }
}

#[cfg(feature = "tracing-json")]
impl From<elide_core::logging::LoggingInitError> for Error {
    fn from(err: elide_core::logging::LoggingInitError) -> Self {
        Self::Logging(err)
    }
}

/// Standard result type for elide APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Affordances, CellProbe, EllipsisConfig, EllipsisEngine, EllipsisHooks, EllipsisOptions,
        Error, LayoutReport, MeasurementProbe, Node, Render, Result, Rows, ShowFullText,
        ToggleSource, Typography, TypographyProps,
    };

    pub use crate::{core, text, widgets};
}

pub use elide_core as core;
pub use elide_text as text;
pub use elide_widgets as widgets;
