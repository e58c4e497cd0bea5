use std::time::{Duration, Instant};

/// Cancelable quiescence timer polled from the UI loop.
///
/// Scheduling replaces the pending value and restarts the window, so only
/// the latest value is ever released.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.window));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Takes the pending value once its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Takes the pending value regardless of its deadline.
    pub fn take_now(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_is_released_after_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        debouncer.schedule("a", start);

        assert_eq!(debouncer.take_due(start + Duration::from_millis(99)), None);
        assert_eq!(debouncer.take_due(start + Duration::from_millis(100)), Some("a"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_rescheduling_restarts_window_and_keeps_latest() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        debouncer.schedule("a", start);
        debouncer.schedule("b", start + Duration::from_millis(80));

        assert_eq!(debouncer.take_due(start + Duration::from_millis(150)), None);
        assert_eq!(debouncer.take_due(start + Duration::from_millis(180)), Some("b"));
        assert_eq!(debouncer.take_due(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_cancel_and_zero_window() {
        let now = Instant::now();
        let mut debouncer = Debouncer::new(Duration::ZERO);
        debouncer.schedule(1, now);
        debouncer.cancel();
        assert_eq!(debouncer.take_due(now), None);

        debouncer.schedule(2, now);
        assert_eq!(debouncer.take_due(now), Some(2));
    }
}
