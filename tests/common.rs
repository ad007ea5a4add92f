use std::cell::RefCell;
use std::sync::{Arc, Mutex};

/// Recorded lifecycle events from scenario modules, in observation order.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events().iter().filter(|seen| *seen == event).count()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events().iter().position(|seen| seen == event)
    }

    pub fn assert_order(&self, earlier: &str, later: &str) {
        let events = self.events();
        let first = events.iter().position(|seen| seen == earlier);
        let second = events.iter().position(|seen| seen == later);
        match (first, second) {
            (Some(a), Some(b)) => {
                assert!(a < b, "expected {earlier:?} before {later:?} in {events:?}")
            }
            _ => panic!("expected both {earlier:?} and {later:?} in {events:?}"),
        }
    }

    pub fn assert_events(&self, expected: &[&str]) {
        assert_eq!(self.events(), expected);
    }
}

thread_local! {
    static ACTIVE: RefCell<EventLog> = RefCell::new(EventLog::default());
}

/// Install a fresh log for the current test and return it.
///
/// Scenario modules report through [`record`], which lands in the log of the
/// thread the lifecycle method runs on. Tests therefore drive the
/// orchestrator on current-thread runtimes, where module lifecycle methods
/// execute on the test thread itself.
pub fn fresh_log() -> EventLog {
    let log = EventLog::default();
    ACTIVE.with(|active| *active.borrow_mut() = log.clone());
    log
}

/// Append an event to the current thread's log.
pub fn record(event: impl Into<String>) {
    ACTIVE.with(|active| active.borrow().record(event));
}
