//! Session timer - whole-second elapsed stopwatch
//!
//! Not persisted: timer state is lost if the process dies before the
//! workout completes.

use std::time::{Duration, Instant};

/// Elapsed-time stopwatch with start/pause/reset.
#[derive(Debug, Default)]
pub struct SessionTimer {
    accumulated: Duration,
    started_at: Option<Instant>,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume counting from the current elapsed value. No-op while running.
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    /// Freeze the elapsed value. No-op while already paused.
    pub fn pause(&mut self) {
        if let Some(started) = self.started_at.take() {
            self.accumulated += started.elapsed();
        }
    }

    /// Zero the elapsed value and stop counting.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.started_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Elapsed time in whole seconds.
    pub fn elapsed_secs(&self) -> u64 {
        let running = self
            .started_at
            .map(|started| started.elapsed())
            .unwrap_or(Duration::ZERO);
        (self.accumulated + running).as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_timer_is_zeroed() {
        let timer = SessionTimer::new();
        assert_eq!(timer.elapsed_secs(), 0);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_start_and_pause() {
        let mut timer = SessionTimer::new();
        timer.start();
        assert!(timer.is_running());
        timer.pause();
        assert!(!timer.is_running());
    }

    #[test]
    fn test_pause_is_idempotent() {
        let mut timer = SessionTimer::new();
        timer.start();
        timer.pause();
        let after_first = timer.elapsed_secs();
        timer.pause();
        assert_eq!(timer.elapsed_secs(), after_first);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let mut timer = SessionTimer::new();
        timer.start();
        timer.start();
        assert!(timer.is_running());
        timer.pause();
        // A second start must not have discarded accumulated time
        let frozen = timer.elapsed_secs();
        assert_eq!(timer.elapsed_secs(), frozen);
    }

    #[test]
    fn test_reset_zeroes_and_stops() {
        let mut timer = SessionTimer::new();
        timer.start();
        timer.reset();
        assert_eq!(timer.elapsed_secs(), 0);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_counts_whole_seconds_while_running() {
        let mut timer = SessionTimer::new();
        timer.start();
        std::thread::sleep(Duration::from_millis(1100));
        timer.pause();
        assert!(timer.elapsed_secs() >= 1);
    }
}
