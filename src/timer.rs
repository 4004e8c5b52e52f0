// MIT License

// Copyright (c) 2022 AnonmousDapper

/// Countdown throttling simulation steps independently of the frame rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timer {
    remaining: f32,
    interval: f32,
}

impl Timer {
    pub fn new(interval: f32) -> Self {
        Self {
            remaining: interval,
            interval,
        }
    }

    /// Counts down by `elapsed` and reports whether a step is due.
    ///
    /// A due timer is reset to the full interval; any overshoot is dropped.
    /// `elapsed` is not validated: a negative delta pushes the next step
    /// further out and NaN always fires.
    pub fn advance(&mut self, elapsed: f32) -> bool {
        self.remaining -= elapsed;

        if self.remaining > 0.0 {
            return false;
        }

        self.remaining = self.interval;
        true
    }

    #[inline]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::Timer;

    #[test]
    fn zero_interval_fires_every_advance() {
        let mut timer = Timer::new(0.0);

        assert!(timer.advance(0.016));
        assert!(timer.advance(0.0));
        assert_eq!(timer.remaining(), 0.0);
    }

    #[test]
    fn holds_while_positive() {
        let mut timer = Timer::new(1.0);

        assert!(!timer.advance(0.5));
        assert!(!timer.advance(0.25));
        assert!((timer.remaining() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn resets_to_interval_without_carry() {
        let mut timer = Timer::new(1.0);

        assert!(!timer.advance(0.5));
        assert!(timer.advance(0.6));
        assert_eq!(timer.remaining(), 1.0);

        assert!(timer.advance(5.0));
        assert_eq!(timer.remaining(), 1.0);
    }

    #[test]
    fn negative_elapsed_delays_next_step() {
        let mut timer = Timer::new(1.0);

        assert!(!timer.advance(-0.5));
        assert!((timer.remaining() - 1.5).abs() < 1e-6);
        assert!(!timer.advance(1.0));
        assert!(timer.advance(0.5));
    }

    #[test]
    fn nan_elapsed_fires() {
        let mut timer = Timer::new(1.0);

        assert!(timer.advance(f32::NAN));
        assert_eq!(timer.remaining(), 1.0);
    }
}
