//! Failure reporting seam between the engine and the test framework.
//!
//! The recorder never decides how a failure surfaces; it hands the message
//! and the blamed source location to a [`FailureReporter`]. The default
//! reporter panics, which is what a plain `#[test]` wants. Harnesses that
//! collect failures instead install their own reporter.

use std::fmt;
use std::panic::Location;

/// A file/line pair blamed for a failure. Captured at the expectation or
/// verification call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
}

impl SourceLocation {
    /// Location of the caller of the surrounding `#[track_caller]` chain.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        SourceLocation {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Sink for engine failures. Implementations decide whether to panic,
/// record, or forward to a harness; the engine itself always returns
/// control to the caller after reporting.
pub trait FailureReporter: Send + Sync {
    fn fail(&self, message: &str, location: SourceLocation);
}

/// Default reporter: fails the surrounding test by panicking.
#[derive(Debug, Default)]
pub struct PanicReporter;

impl FailureReporter for PanicReporter {
    fn fail(&self, message: &str, location: SourceLocation) {
        panic!("{} ({})", message, location);
    }
}
