//! FIFO expectation queue and verification.
//!
//! All state sits behind one `parking_lot::Mutex`; arming a drain waiter
//! is atomic with the emptiness check, and the wait itself happens with
//! the lock released. Failures leave the engine in a defined state and
//! return control to the caller; what a failure does to the test is the
//! reporter's business.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::runtime::failure::{FailureReporter, PanicReporter, SourceLocation};
use crate::runtime::mock::{Invocation, PerformAction, Stub};

const ALREADY_WAITING: &str = "Verification is already waiting on this recorder";

/// The engine behind every mock: records stubs, dispatches invocations,
/// verifies what is left.
pub struct Recorder {
    state: Mutex<RecorderState>,
    reporter: Arc<dyn FailureReporter>,
}

#[derive(Default)]
struct RecorderState {
    stubs: VecDeque<Stub>,
    drain: Option<DrainSignal>,
}

impl RecorderState {
    fn fire_drain_if_empty(&mut self) {
        if self.stubs.is_empty() {
            if let Some(signal) = self.drain.take() {
                signal.fire();
            }
        }
    }
}

/// One-shot wakeup armed by a timed verification; fires when a pop
/// leaves the queue empty.
enum DrainSignal {
    Thread(mpsc::SyncSender<()>),
    Task(oneshot::Sender<()>),
}

impl DrainSignal {
    fn fire(self) {
        match self {
            // Buffer of one, so the send never blocks under the lock.
            DrainSignal::Thread(sender) => {
                let _ = sender.try_send(());
            }
            DrainSignal::Task(sender) => {
                let _ = sender.send(());
            }
        }
    }
}

impl Recorder {
    pub fn new() -> Self {
        Recorder::with_reporter(Arc::new(PanicReporter))
    }

    pub fn with_reporter(reporter: Arc<dyn FailureReporter>) -> Self {
        Recorder {
            state: Mutex::new(RecorderState::default()),
            reporter,
        }
    }

    pub fn record(&self, stub: Stub) {
        self.state.lock().stubs.push_back(stub);
    }

    /// Pops the head stub, if any. Callers doing their own matching use
    /// this; [`Recorder::consume`] is the checked path.
    pub fn next(&self) -> Option<Stub> {
        let mut state = self.state.lock();
        let stub = state.stubs.pop_front();
        if stub.is_some() {
            state.fire_drain_if_empty();
        }
        stub
    }

    /// Single dispatch point for mock members: matches the invocation
    /// against the head stub only. An empty queue or a non-matching head
    /// is an unexpected call; it is reported and `None` comes back, with
    /// a non-matching head left in place for verification to list.
    pub fn consume(
        &self,
        invocation: &Invocation,
        location: SourceLocation,
    ) -> Option<PerformAction> {
        let mut state = self.state.lock();
        let stub = match state.stubs.pop_front() {
            Some(stub) => stub,
            None => {
                drop(state);
                self.reporter.fail(
                    &format!("Expected no calls but received `{}`", invocation),
                    location,
                );
                return None;
            }
        };
        if !stub.matches(invocation) {
            let message = format!(
                "Unexpected call: expected `{}`, but received `{}`",
                stub.expectation(),
                invocation
            );
            let blamed = stub.location();
            state.stubs.push_front(stub);
            drop(state);
            self.reporter.fail(&message, blamed);
            return None;
        }
        state.fire_drain_if_empty();
        drop(state);
        Some(stub.into_perform())
    }

    pub fn len(&self) -> usize {
        self.state.lock().stubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().stubs.is_empty()
    }

    /// Reports every stub still queued, in FIFO order, then clears.
    /// Clearing happens regardless of outcome so one failed verification
    /// does not cascade into every later one.
    pub fn verify(&self, location: SourceLocation) {
        let remaining: Vec<String> = {
            let mut state = self.state.lock();
            state.drain = None;
            state
                .stubs
                .drain(..)
                .map(|stub| stub.expectation().description().to_string())
                .collect()
        };
        if remaining.is_empty() {
            return;
        }
        let mut message = String::from("Missing expected calls:");
        for description in &remaining {
            message.push_str("\n  ");
            message.push_str(description);
        }
        self.reporter.fail(&message, location);
    }

    pub fn reset_expectations(&self) {
        let mut state = self.state.lock();
        state.stubs.clear();
        state.fire_drain_if_empty();
    }

    /// Blocks until the queue drains or the timeout elapses, then
    /// verifies. Satisfied expectations make this return early; anything
    /// still queued after the timeout is reported like [`Recorder::verify`].
    pub fn verify_sync(&self, timeout: Duration, location: SourceLocation) {
        let receiver = {
            let mut state = self.state.lock();
            if state.stubs.is_empty() {
                return;
            }
            if state.drain.is_some() {
                drop(state);
                self.reporter.fail(ALREADY_WAITING, location);
                return;
            }
            let (sender, receiver) = mpsc::sync_channel(1);
            state.drain = Some(DrainSignal::Thread(sender));
            receiver
        };
        let _ = receiver.recv_timeout(timeout);
        self.state.lock().drain = None;
        self.verify(location);
    }

    /// Suspending form of [`Recorder::verify_sync`] for async tests.
    pub async fn verify_async(&self, timeout: Duration, location: SourceLocation) {
        let receiver = {
            let mut state = self.state.lock();
            if state.stubs.is_empty() {
                return;
            }
            if state.drain.is_some() {
                drop(state);
                self.reporter.fail(ALREADY_WAITING, location);
                return;
            }
            let (sender, receiver) = oneshot::channel();
            state.drain = Some(DrainSignal::Task(sender));
            receiver
        };
        let _ = tokio::time::timeout(timeout, receiver).await;
        self.state.lock().drain = None;
        self.verify(location);
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Recorder::new()
    }
}
