//! Failure reporting into the surrounding test.
//!
//! The fixture tree never decides whether a test passed. It hands every
//! creation or cleanup failure to a [`Reporter`] and keeps going; the test
//! then looks at what was reported (or at the `Result` returned by
//! `RootFixture::create`).

use std::sync::{Arc, Mutex};

use crate::error::FixtureError;

/// Receives failures recorded while a fixture tree is created or removed.
pub trait Reporter: Send + Sync {
    fn report(&self, failure: &FixtureError);
}

/// Logs each failure through `tracing` at `error` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, failure: &FixtureError) {
        tracing::error!("{}", failure);
    }
}

/// Keeps the rendered message of each failure so a test can assert on them.
///
/// Clones share the same list: hand one clone to the root fixture and keep
/// the other.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    failures: Arc<Mutex<Vec<String>>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> Vec<String> {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_empty()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, failure: &FixtureError) {
        tracing::error!("{}", failure);
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(failure.to_string());
    }
}
