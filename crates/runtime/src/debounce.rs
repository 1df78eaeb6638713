use foundation::time::Time;

/// Coalesces bursts of notifications into one firing after a quiet period.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Debouncer {
    quiet_period_s: f64,
    last_event: Option<Time>,
}

impl Debouncer {
    pub fn new(quiet_period_s: f64) -> Self {
        Self {
            quiet_period_s: quiet_period_s.max(0.0),
            last_event: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(ms as f64 / 1000.0)
    }

    pub fn notify(&mut self, now: Time) {
        self.last_event = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.last_event.is_some()
    }

    /// Returns `true` exactly once per burst, when the quiet period has elapsed.
    pub fn poll(&mut self, now: Time) -> bool {
        match self.last_event {
            Some(t) if now.since(t) >= self.quiet_period_s => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Debouncer;
    use foundation::time::Time;

    #[test]
    fn burst_fires_once_after_quiet_period() {
        let mut d = Debouncer::from_millis(300);
        d.notify(Time(0.0));
        d.notify(Time(0.1));
        d.notify(Time(0.2));
        assert!(!d.poll(Time(0.4)));
        assert!(d.poll(Time(0.5)));
        assert!(!d.poll(Time(0.9)));
        assert!(!d.is_pending());
    }

    #[test]
    fn idle_never_fires() {
        let mut d = Debouncer::new(0.3);
        assert!(!d.poll(Time(10.0)));
    }
}
