// Idle detection: a single-shot, cancellable deadline driven by an injectable clock.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default inactivity window before the timeout overlay is shown.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Used by tests and the smoke renderer.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Single-shot timer. At most one deadline is pending; scheduling again replaces it.
#[derive(Debug, Clone)]
pub struct IdleTimer {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl IdleTimer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.timeout);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Cancel whatever is pending and arm a fresh deadline.
    pub fn reschedule(&mut self, now: Instant) {
        self.cancel();
        self.schedule(now);
    }

    /// Returns true exactly once when the deadline has passed; the timer is then disarmed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Time left before firing, if armed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_timeout() {
        let clock = ManualClock::new();
        let mut timer = IdleTimer::new(Duration::from_secs(60));
        timer.schedule(clock.now());

        clock.advance(Duration::from_secs(59));
        assert!(!timer.poll(clock.now()));

        clock.advance(Duration::from_secs(1));
        assert!(timer.poll(clock.now()));
        assert!(!timer.poll(clock.now()), "single-shot timer fired twice");
        assert!(!timer.is_pending());
    }

    #[test]
    fn reschedule_pushes_the_deadline_out() {
        let clock = ManualClock::new();
        let mut timer = IdleTimer::new(Duration::from_secs(60));
        timer.schedule(clock.now());

        clock.advance(Duration::from_secs(45));
        timer.reschedule(clock.now());

        clock.advance(Duration::from_secs(45));
        assert!(!timer.poll(clock.now()));
        assert_eq!(timer.remaining(clock.now()), Some(Duration::from_secs(15)));

        clock.advance(Duration::from_secs(15));
        assert!(timer.poll(clock.now()));
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let clock = ManualClock::new();
        let mut timer = IdleTimer::new(Duration::from_secs(1));
        timer.schedule(clock.now());
        timer.cancel();
        clock.advance(Duration::from_secs(10));
        assert!(!timer.poll(clock.now()));
    }

    #[test]
    fn default_window_is_fifteen_minutes() {
        assert_eq!(DEFAULT_IDLE_TIMEOUT, Duration::from_secs(900));
    }
}
