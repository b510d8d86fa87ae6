#![forbid(unsafe_code)]

//! Outbound component notifications.
//!
//! Components report what happened (playback started, an item was
//! selected) through a [`NotificationSink`]. Any `FnMut(E)` closure is a
//! sink; [`RecordingSink`] keeps events around for assertions.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Receiver of component notifications.
pub trait NotificationSink<E> {
    /// Deliver one event.
    fn notify(&mut self, event: E);
}

impl<E, F> NotificationSink<E> for F
where
    F: FnMut(E),
{
    fn notify(&mut self, event: E) {
        self(event);
    }
}

/// A sink that records every event it receives.
///
/// Clones share the same buffer, so a test can hand one clone to a
/// component and inspect the other.
///
/// ```
/// use glitch_core::notify::{NotificationSink, RecordingSink};
///
/// let sink = RecordingSink::new();
/// let mut handle = sink.clone();
/// handle.notify("opened");
/// assert_eq!(sink.events(), vec!["opened"]);
/// ```
pub struct RecordingSink<E> {
    events: Rc<RefCell<Vec<E>>>,
}

impl<E> RecordingSink<E> {
    /// Create an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Number of events recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Remove and return all recorded events.
    pub fn take(&self) -> Vec<E> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl<E: Clone> RecordingSink<E> {
    /// Snapshot of all recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<E> {
        self.events.borrow().clone()
    }

    /// The most recent event, if any.
    #[must_use]
    pub fn last(&self) -> Option<E> {
        self.events.borrow().last().cloned()
    }
}

impl<E> Clone for RecordingSink<E> {
    fn clone(&self) -> Self {
        Self {
            events: Rc::clone(&self.events),
        }
    }
}

impl<E> Default for RecordingSink<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: fmt::Debug> fmt::Debug for RecordingSink<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingSink")
            .field("events", &self.events.borrow())
            .finish()
    }
}

impl<E> NotificationSink<E> for RecordingSink<E> {
    fn notify(&mut self, event: E) {
        self.events.borrow_mut().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_is_a_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |e: u32| seen.push(e);
            sink.notify(1);
            sink.notify(2);
        }
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn recording_sink_clones_share_buffer() {
        let sink = RecordingSink::new();
        let mut a = sink.clone();
        let mut b = sink.clone();
        a.notify("a");
        b.notify("b");
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.last(), Some("b"));
    }

    #[test]
    fn take_drains() {
        let sink = RecordingSink::new();
        sink.clone().notify(7u8);
        assert_eq!(sink.take(), vec![7]);
        assert!(sink.is_empty());
    }
}
