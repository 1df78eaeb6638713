//! Cancellable, time-based transitions.
//!
//! A `TransitionDriver` owns the value that is currently on screen. Starting
//! a new transition always departs from that rendered value, so a command
//! issued mid-animation retargets smoothly instead of jumping back.

use foundation::time::Time;

pub trait Interpolate: Copy {
    fn interpolate(self, to: Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(self, to: Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    CubicInOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicInOut => {
                let t2 = t * 2.0;
                if t2 <= 1.0 {
                    t2 * t2 * t2 / 2.0
                } else {
                    let u = t2 - 2.0;
                    (u * u * u + 2.0) / 2.0
                }
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transition<T> {
    pub from: T,
    pub to: T,
    pub start: Time,
    pub duration_s: f64,
    pub easing: Easing,
}

impl<T: Interpolate> Transition<T> {
    /// Linear progress in [0, 1].
    pub fn progress(&self, now: Time) -> f64 {
        if self.duration_s <= 0.0 {
            return 1.0;
        }
        (now.since(self.start) / self.duration_s).min(1.0)
    }

    pub fn is_finished(&self, now: Time) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn sample(&self, now: Time) -> T {
        let p = self.progress(now);
        if p >= 1.0 {
            return self.to;
        }
        self.from.interpolate(self.to, self.easing.apply(p))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionDriver<T> {
    rendered: T,
    active: Option<Transition<T>>,
}

impl<T: Interpolate> TransitionDriver<T> {
    pub fn new(initial: T) -> Self {
        Self {
            rendered: initial,
            active: None,
        }
    }

    /// Value produced by the most recent tick.
    pub fn rendered(&self) -> T {
        self.rendered
    }

    /// Where the driver is heading (the rendered value when idle).
    pub fn target(&self) -> T {
        self.active.map(|t| t.to).unwrap_or(self.rendered)
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    /// Animates from the rendered value to `target`, superseding any
    /// in-flight transition.
    pub fn start(&mut self, target: T, now: Time, duration_s: f64, easing: Easing) {
        if duration_s <= 0.0 {
            self.jump(target);
            return;
        }
        self.active = Some(Transition {
            from: self.rendered,
            to: target,
            start: now,
            duration_s,
            easing,
        });
    }

    /// Sets the rendered value immediately and cancels any transition.
    pub fn jump(&mut self, value: T) {
        self.active = None;
        self.rendered = value;
    }

    pub fn tick(&mut self, now: Time) -> T {
        if let Some(tr) = self.active {
            self.rendered = tr.sample(now);
            if tr.is_finished(now) {
                self.active = None;
            }
        }
        self.rendered
    }
}

#[cfg(test)]
mod tests {
    use super::{Easing, TransitionDriver};
    use foundation::time::Time;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "expected {a} ~= {b}");
    }

    #[test]
    fn cubic_in_out_is_symmetric() {
        let e = Easing::CubicInOut;
        assert_eq!(e.apply(0.0), 0.0);
        assert_eq!(e.apply(1.0), 1.0);
        assert_close(e.apply(0.5), 0.5);
        assert_close(e.apply(0.25) + e.apply(0.75), 1.0);
    }

    #[test]
    fn reaches_target_at_end_and_goes_idle() {
        let mut d = TransitionDriver::new(0.0f64);
        d.start(10.0, Time(0.0), 0.4, Easing::Linear);
        assert!(d.is_animating());
        assert_close(d.tick(Time(0.2)), 5.0);
        assert_eq!(d.tick(Time(0.4)), 10.0);
        assert!(!d.is_animating());
        assert_eq!(d.tick(Time(5.0)), 10.0);
    }

    #[test]
    fn new_command_departs_from_rendered_frame() {
        let mut d = TransitionDriver::new(0.0f64);
        d.start(10.0, Time(0.0), 1.0, Easing::Linear);
        d.tick(Time(0.5));
        d.start(-10.0, Time(0.5), 1.0, Easing::Linear);
        assert_eq!(d.target(), -10.0);
        // Still at the intermediate frame, not the superseded target.
        assert_close(d.tick(Time(0.5)), 5.0);
        assert_close(d.tick(Time(1.0)), -2.5);
        assert_eq!(d.tick(Time(1.5)), -10.0);
    }

    #[test]
    fn zero_duration_jumps() {
        let mut d = TransitionDriver::new(1.0f64);
        d.start(3.0, Time(0.0), 0.0, Easing::CubicInOut);
        assert!(!d.is_animating());
        assert_eq!(d.rendered(), 3.0);
    }
}
