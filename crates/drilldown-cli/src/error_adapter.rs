//! Error adapter for converting DrilldownError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Catalog syntax
//! errors are rendered with a snippet of the offending catalog text.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use drilldown::{DrilldownError, catalog::CatalogError};

/// Adapter for a catalog parse error with its source text.
pub struct CatalogDiagnosticAdapter<'a> {
    err: &'a CatalogError,
    src: &'a str,
}

impl<'a> CatalogDiagnosticAdapter<'a> {
    /// Create a new catalog diagnostic adapter.
    pub fn new(err: &'a CatalogError, src: &'a str) -> Self {
        Self { err, src }
    }
}

impl fmt::Debug for CatalogDiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogDiagnosticAdapter")
            .field("err", &self.err)
            .finish()
    }
}

impl fmt::Display for CatalogDiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.err)
    }
}

impl std::error::Error for CatalogDiagnosticAdapter<'_> {}

impl MietteDiagnostic for CatalogDiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("drilldown::catalog::syntax"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(
            "catalogs declare `[[diagram]]` and `[[tree]]` tables; every node needs `data.label`",
        ))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let range = self.err.span()?;
        let span = SourceSpan::new(range.start.into(), range.len());
        Some(Box::new(std::iter::once(
            LabeledSpan::new_primary_with_span(Some("here".to_string()), span),
        )))
    }
}

/// Adapter for [`DrilldownError`] variants without source locations.
pub struct ErrorAdapter<'a>(pub &'a DrilldownError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            DrilldownError::Io(_) => "drilldown::io",
            DrilldownError::Catalog(_) => "drilldown::catalog",
            DrilldownError::Config(_) => "drilldown::config",
            DrilldownError::Export(_) => "drilldown::export",
            DrilldownError::Runtime(_) => "drilldown::runtime",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            DrilldownError::Catalog(CatalogError::Registry { .. }) => Some(Box::new(
                "check the node ids and edge endpoints of the named diagram",
            )),
            _ => None,
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A catalog syntax error with source location information.
    Diagnostic(CatalogDiagnosticAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`DrilldownError`] into a reportable error.
///
/// A catalog syntax error becomes a diagnostic pointing into the catalog
/// text; every other variant is reported as is.
pub fn to_reportable(err: &DrilldownError) -> Reportable<'_> {
    match err {
        DrilldownError::Catalog(catalog_err @ CatalogError::Parse { src, .. }) => {
            Reportable::Diagnostic(CatalogDiagnosticAdapter::new(catalog_err, src))
        }
        _ => Reportable::Error(ErrorAdapter(err)),
    }
}
