//! Core mock vocabulary: methods, expectations, stubs, invocations.
//!
//! A mocked member is identified by a [`MockMethod`] whose `describe`
//! closure renders both sides of a comparison: expectations interpolate
//! matcher descriptions, invocations interpolate the recorded argument
//! displays. The perform action travels type-erased and is downcast by
//! the generated (or hand-written) member implementation.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::runtime::failure::SourceLocation;
use crate::runtime::matchers::ArgMatcher;
use crate::runtime::recorder::Recorder;

/// Erased closure (or value) a matched stub hands back to the member
/// implementation.
pub type PerformAction = Box<dyn Any + Send>;

type DescribeFn = Arc<dyn Fn(&[ArgValue]) -> String + Send + Sync>;

/// One recorded argument: the erased value plus the display string
/// captured at the call site.
pub struct ArgValue {
    value: Box<dyn Any + Send>,
    display: String,
}

impl ArgValue {
    pub fn new<T: Any + Send + fmt::Debug>(value: T) -> Self {
        let display = format!("{:?}", value);
        ArgValue {
            value: Box::new(value),
            display,
        }
    }

    /// For values without a useful `Debug` (closures, boxed collaborators).
    pub fn with_display<T: Any + Send>(value: T, display: impl Into<String>) -> Self {
        ArgValue {
            value: Box::new(value),
            display: display.into(),
        }
    }

    /// Display-only placeholder; used when an expectation renders its
    /// matcher descriptions through the shared describe closure.
    pub fn displaying(display: impl Into<String>) -> Self {
        ArgValue {
            value: Box::new(()),
            display: display.into(),
        }
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn as_any(&self) -> &dyn Any {
        self.value.as_ref()
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl fmt::Debug for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// Identity and description of one mockable member.
#[derive(Clone)]
pub struct MockMethod {
    id: String,
    describe: DescribeFn,
}

impl MockMethod {
    pub fn new(
        id: impl Into<String>,
        describe: impl Fn(&[ArgValue]) -> String + Send + Sync + 'static,
    ) -> Self {
        MockMethod {
            id: id.into(),
            describe: Arc::new(describe),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn describe(&self, values: &[ArgValue]) -> String {
        (self.describe)(values)
    }
}

impl fmt::Debug for MockMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockMethod")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// A call as received by a mock member.
pub struct Invocation {
    method: MockMethod,
    values: Vec<ArgValue>,
}

impl Invocation {
    pub fn new(method: MockMethod, values: Vec<ArgValue>) -> Self {
        Invocation { method, values }
    }

    pub fn method_id(&self) -> &str {
        self.method.id()
    }

    pub fn values(&self) -> &[ArgValue] {
        &self.values
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.method.describe(&self.values))
    }
}

/// What a test declared it expects: a member plus one matcher per
/// positional argument. The description is rendered eagerly so failure
/// messages survive matcher consumption.
pub struct Expectation {
    id: String,
    description: String,
    matchers: Vec<ArgMatcher>,
}

impl Expectation {
    pub fn new(method: &MockMethod, matchers: Vec<ArgMatcher>) -> Self {
        let placeholders: Vec<ArgValue> = matchers
            .iter()
            .map(|matcher| ArgValue::displaying(matcher.description()))
            .collect();
        Expectation {
            id: method.id().to_string(),
            description: method.describe(&placeholders),
            matchers,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Same member and every positional matcher accepts its value.
    pub fn matches(&self, invocation: &Invocation) -> bool {
        self.id == invocation.method_id()
            && self
                .matchers
                .iter()
                .zip(invocation.values())
                .all(|(matcher, value)| matcher.accepts(value.as_any()))
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// A recorded expectation waiting in the FIFO queue.
pub struct Stub {
    expectation: Expectation,
    perform: PerformAction,
    location: SourceLocation,
}

impl Stub {
    pub fn new(expectation: Expectation, perform: PerformAction, location: SourceLocation) -> Self {
        Stub {
            expectation,
            perform,
            location,
        }
    }

    pub fn expectation(&self) -> &Expectation {
        &self.expectation
    }

    pub fn location(&self) -> SourceLocation {
        self.location
    }

    pub fn matches(&self, invocation: &Invocation) -> bool {
        self.expectation.matches(invocation)
    }

    pub fn into_perform(self) -> PerformAction {
        self.perform
    }
}

/// Conformance surface of every generated mock. Only `recorder` is
/// required; verification and reset are forwarded.
pub trait Mock {
    fn recorder(&self) -> &Recorder;

    /// Mocks that auto-forward to a real implementation report `false`
    /// while forwarding; setting expectations is rejected in that state.
    fn is_enabled(&self) -> bool {
        true
    }

    #[track_caller]
    fn verify(&self) {
        self.recorder().verify(SourceLocation::caller());
    }

    #[track_caller]
    fn verify_sync(&self, timeout: Duration) {
        self.recorder().verify_sync(timeout, SourceLocation::caller());
    }

    /// Suspending verification: resolves as soon as the queue drains,
    /// reports like [`Mock::verify`] on timeout.
    #[track_caller]
    fn verify_async(&self, timeout: Duration) -> impl Future<Output = ()> + '_
    where
        Self: Sized,
    {
        let location = SourceLocation::caller();
        let recorder = self.recorder();
        async move { recorder.verify_async(timeout, location).await }
    }

    fn reset_expectations(&self) {
        self.recorder().reset_expectations();
    }
}
