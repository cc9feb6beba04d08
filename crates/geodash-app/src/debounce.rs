// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

/// Cancelable one-shot timer carrying the latest value. Scheduling replaces
/// any pending value, so at most one timer is outstanding.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some(Pending {
            value,
            deadline: now + self.delay,
        });
    }

    /// Returns true when a pending value was dropped.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    /// Emits the settled value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(pending) if now >= pending.deadline => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::Debouncer;
    use std::time::{Duration, Instant};

    #[test]
    fn emits_only_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.schedule("s", start);
        assert_eq!(debouncer.poll(start + Duration::from_millis(299)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(300)), Some("s"));
        assert_eq!(debouncer.poll(start + Duration::from_millis(900)), None);
    }

    #[test]
    fn new_input_restarts_the_timer_and_keeps_latest_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.schedule("s", start);
        debouncer.schedule("so", start + Duration::from_millis(200));
        debouncer.schedule("sol", start + Duration::from_millis(400));

        assert_eq!(debouncer.poll(start + Duration::from_millis(650)), None);
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(700))
        );
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(700)),
            Some("sol")
        );
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn cancel_drops_pending_value() {
        let now = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        assert!(!debouncer.cancel());
        debouncer.schedule("x", now);
        assert!(debouncer.cancel());
        assert_eq!(debouncer.poll(now + Duration::from_secs(1)), None);
    }
}
