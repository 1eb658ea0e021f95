//! Trailing-edge debouncing over an injected clock.
//!
//! Bursts of triggers (continuous window resizing, rapid roster edits)
//! coalesce into a single firing once the burst has been quiet for the
//! window. Time is always passed in, never sampled, so tests drive it.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub const DEFAULT_WINDOW: Duration = Duration::from_millis(100);

    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Arms the debouncer, or pushes the pending deadline out if already
    /// armed.
    pub fn notify(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once per quiescent window: when armed and the window
    /// has elapsed since the last notify.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_of_notifies_fires_exactly_once_after_quiescence() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(100));

        // Five triggers inside 50ms.
        for ms in [0u64, 10, 20, 35, 50] {
            d.notify(t0 + Duration::from_millis(ms));
            assert!(!d.fire_due(t0 + Duration::from_millis(ms)));
        }

        assert!(!d.fire_due(t0 + Duration::from_millis(149)));
        assert!(d.fire_due(t0 + Duration::from_millis(150)));
        assert!(!d.fire_due(t0 + Duration::from_millis(300)));
    }

    #[test]
    fn each_notify_extends_the_deadline() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(100));
        d.notify(t0);
        d.notify(t0 + Duration::from_millis(90));
        assert!(!d.fire_due(t0 + Duration::from_millis(100)));
        assert!(d.fire_due(t0 + Duration::from_millis(190)));
    }

    #[test]
    fn cancel_disarms_without_firing() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(100));
        d.notify(t0);
        d.cancel();
        assert!(!d.fire_due(t0 + Duration::from_secs(1)));
    }
}
