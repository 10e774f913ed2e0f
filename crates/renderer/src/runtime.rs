use std::time::Instant;

/// Monotonic host clock in milliseconds, the desktop stand-in for a
/// page's `performance.now()`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose zero is the current instant.
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds elapsed since the clock was created.
    pub fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_monotonic_from_zero() {
        let clock = SystemClock::new();
        let first = clock.now_ms();
        let second = clock.now_ms();
        assert!(first >= 0.0);
        assert!(second >= first);
    }
}
