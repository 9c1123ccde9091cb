//! # Fibonacci Backoff
//!
//! Per-resource retry delays for hard reconciliation errors.
//!
//! The sequence in minutes is 1, 1, 2, 3, 5, 8, ... scaled by `min_minutes` and
//! capped at `max_minutes`.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    min_minutes: u64,
    max_minutes: u64,
    previous: u64,
    current: u64,
}

impl FibonacciBackoff {
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        let min_minutes = min_minutes.max(1);
        Self {
            min_minutes,
            max_minutes: max_minutes.max(min_minutes),
            previous: 0,
            current: 1,
        }
    }

    /// Next delay in seconds, advancing the sequence
    pub fn next_backoff_seconds(&mut self) -> u64 {
        let minutes = (self.current * self.min_minutes).min(self.max_minutes);
        if minutes < self.max_minutes {
            let next = self.previous + self.current;
            self.previous = self.current;
            self.current = next;
        }
        minutes * 60
    }

    pub fn reset(&mut self) {
        self.previous = 0;
        self.current = 1;
    }

    /// Delay for the `error_count`-th consecutive error (0-indexed)
    pub fn calculate_for_error_count(
        error_count: u32,
        min_minutes: u64,
        max_minutes: u64,
    ) -> Duration {
        let mut backoff = Self::new(min_minutes, max_minutes);
        let mut seconds = backoff.next_backoff_seconds();
        for _ in 0..error_count {
            seconds = backoff.next_backoff_seconds();
        }
        Duration::from_secs(seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_fibonacci_in_minutes() {
        let mut backoff = FibonacciBackoff::new(1, 60);
        let minutes: Vec<u64> = (0..7).map(|_| backoff.next_backoff_seconds() / 60).collect();
        assert_eq!(minutes, vec![1, 1, 2, 3, 5, 8, 13]);
    }

    #[test]
    fn test_sequence_caps_at_max() {
        let mut backoff = FibonacciBackoff::new(1, 10);
        let minutes: Vec<u64> = (0..9).map(|_| backoff.next_backoff_seconds() / 60).collect();
        assert_eq!(minutes, vec![1, 1, 2, 3, 5, 8, 10, 10, 10]);
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut backoff = FibonacciBackoff::new(1, 10);
        backoff.next_backoff_seconds();
        backoff.next_backoff_seconds();
        backoff.next_backoff_seconds();
        backoff.reset();
        assert_eq!(backoff.next_backoff_seconds(), 60);
    }

    #[test]
    fn test_calculate_for_error_count() {
        assert_eq!(
            FibonacciBackoff::calculate_for_error_count(0, 1, 10),
            Duration::from_secs(60)
        );
        assert_eq!(
            FibonacciBackoff::calculate_for_error_count(4, 1, 10),
            Duration::from_secs(300)
        );
        assert_eq!(
            FibonacciBackoff::calculate_for_error_count(20, 1, 10),
            Duration::from_secs(600)
        );
    }
}
