//! Export of positioned diagrams.
//!
//! # Pipeline Position
//!
//! ```text
//! PositionedGraph (from the layout driver)
//!     ↓ export (this module)
//! Output File
//! ```
//!
//! # Available Backends
//!
//! - [`svg`] - SVG output via [`svg::SvgExporter`]
//!
//! Export operations return [`Error`], which converts into
//! [`DrilldownError::Export`] at the crate boundary.
//!
//! [`DrilldownError::Export`]: crate::DrilldownError::Export

/// SVG export backend.
pub mod svg;

use crate::layout::PositionedGraph;

/// Abstraction for export backends.
pub trait Exporter {
    /// Exports one laid-out diagram.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the graph cannot be converted, or
    /// [`Error::Io`] if writing the output fails.
    fn export_graph(&mut self, graph: &PositionedGraph) -> Result<(), Error>;
}

/// Errors that can occur during export.
#[derive(Debug)]
pub enum Error {
    /// A rendering failure described by `message`.
    Render(String),
    /// An I/O error encountered while writing output.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}

impl From<Error> for crate::DrilldownError {
    fn from(error: Error) -> Self {
        Self::Export(Box::new(error))
    }
}
