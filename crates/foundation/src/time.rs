/// Session clock reading in seconds.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64);

impl Time {
    pub fn from_millis(ms: f64) -> Self {
        Time(ms / 1000.0)
    }

    /// Seconds elapsed since `earlier` (never negative).
    pub fn since(self, earlier: Time) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }

    pub fn after_millis(self, ms: u64) -> Self {
        Time(self.0 + ms as f64 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Time;

    #[test]
    fn since_clamps_backwards_clock() {
        assert_eq!(Time(2.0).since(Time(0.5)), 1.5);
        assert_eq!(Time(0.5).since(Time(2.0)), 0.0);
        assert_eq!(Time::from_millis(300.0), Time(0.3));
        assert_eq!(Time(1.0).after_millis(250), Time(1.25));
    }
}
