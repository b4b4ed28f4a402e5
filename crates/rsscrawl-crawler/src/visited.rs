use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locators seen during a run. Only ever grows.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `locator` as seen, returns `false` when it already was.
    ///
    /// Check and insertion happen under one lock, so out of several concurrent
    /// calls for the same locator exactly one gets `true`.
    pub fn insert(&self, locator: &str) -> bool {
        let mut seen = self.seen();
        if seen.contains(locator) {
            false
        } else {
            seen.insert(locator.to_string())
        }
    }

    pub fn contains(&self, locator: &str) -> bool {
        self.seen().contains(locator)
    }

    pub fn len(&self) -> usize {
        self.seen().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen().is_empty()
    }

    fn seen(&self) -> MutexGuard<'_, HashSet<String>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
