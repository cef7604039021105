/// Variable-step frame clock.
/// Turns the host's display-synchronized timestamps into bounded frame deltas.
pub struct FrameClock {
    /// Largest delta ever reported, in milliseconds.
    max_dt: f32,
    /// Timestamp of the previous frame, if any.
    last: Option<f64>,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            max_dt: max_dt.max(0.0),
            last: None,
        }
    }

    /// Record a frame timestamp (ms) and return the delta since the previous one.
    /// The first frame reports zero; negative or oversized gaps are clamped
    /// into `[0, max_dt]`.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last {
            Some(last) => (now_ms - last) as f32,
            None => 0.0,
        };
        self.last = Some(now_ms);
        dt.clamp(0.0, self.max_dt)
    }

    /// Forget the previous timestamp, e.g. after the page was hidden.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// The delta cap in milliseconds.
    pub fn max_dt(&self) -> f32 {
        self.max_dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_is_zero() {
        let mut clock = FrameClock::new(50.0);
        assert_eq!(clock.tick(1234.0), 0.0);
    }

    #[test]
    fn reports_elapsed_time() {
        let mut clock = FrameClock::new(50.0);
        clock.tick(1000.0);
        assert_eq!(clock.tick(1016.0), 16.0);
    }

    #[test]
    fn caps_large_gaps() {
        let mut clock = FrameClock::new(50.0);
        clock.tick(0.0);
        // Tab was in the background for five seconds
        assert_eq!(clock.tick(5000.0), 50.0);
    }

    #[test]
    fn clock_going_backwards_is_zero() {
        let mut clock = FrameClock::new(50.0);
        clock.tick(100.0);
        assert_eq!(clock.tick(90.0), 0.0);
    }

    #[test]
    fn reset_restarts_from_zero() {
        let mut clock = FrameClock::new(50.0);
        clock.tick(0.0);
        clock.reset();
        assert_eq!(clock.tick(30.0), 0.0);
        assert_eq!(clock.tick(40.0), 10.0);
    }
}
