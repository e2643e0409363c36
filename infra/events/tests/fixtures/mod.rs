#![allow(dead_code)]

use courier_event_bus::Listener;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestEvent(pub i64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtherEvent(pub i64);

/// Shared log of `(listener name, payload)` pairs in invocation order.
#[derive(Clone, Debug, Default)]
pub struct Journal(Arc<Mutex<Vec<(&'static str, i64)>>>);

impl Journal {
    pub fn listener(&self, name: &'static str) -> Listener<TestEvent> {
        let entries = Arc::clone(&self.0);
        Listener::new(move |event: &TestEvent| entries.lock().push((name, event.0)))
    }

    pub fn entries(&self) -> Vec<(&'static str, i64)> {
        self.0.lock().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.lock().iter().map(|(name, _)| *name).collect()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}
