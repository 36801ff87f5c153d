//! Call recording and verification engine.
//!
//! This is the library half of the crate: generated mocks (and
//! hand-written ones) record [`Stub`]s on a [`Recorder`], member
//! implementations dispatch invocations through it, and tests verify
//! that nothing expected is left. Everything is FIFO: calls must arrive
//! in the order they were expected.

pub mod failure;
pub mod matchers;
pub mod mock;
pub mod recorder;

pub use failure::{FailureReporter, PanicReporter, SourceLocation};
pub use matchers::{ArgMatcher, Matcher};
pub use mock::{ArgValue, Expectation, Invocation, Mock, MockMethod, PerformAction, Stub};
pub use recorder::Recorder;
