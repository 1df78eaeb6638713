//! Value-to-visual scales shared by the dashboard views.
//!
//! Domains are always finite: a missing or zero maximum collapses to 1 so
//! radius and color mappings never see NaN or infinity.

use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ScaleDomain {
    pub lo: f64,
    pub hi: f64,
}

impl ScaleDomain {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// `[lo, max]`, with a missing, zero or non-finite `max` replaced by 1.
    pub fn up_to(lo: f64, max: Option<f64>) -> Self {
        Self::new(lo, upper_or_one(max))
    }

    pub fn span(&self) -> f64 {
        self.hi - self.lo
    }
}

pub fn upper_or_one(max: Option<f64>) -> f64 {
    match max {
        Some(v) if v.is_finite() && v != 0.0 => v,
        _ => 1.0,
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LinearScale {
    pub domain: ScaleDomain,
    pub range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: ScaleDomain, range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, v: f64) -> f64 {
        let span = self.domain.span();
        let t = if span == 0.0 {
            0.5
        } else {
            (v - self.domain.lo) / span
        };
        self.range[0] + t * (self.range[1] - self.range[0])
    }

    /// Extends the domain outward to round tick steps (about ten ticks).
    pub fn nice(mut self) -> Self {
        let (mut lo, mut hi) = (self.domain.lo, self.domain.hi);
        let mut prev_step: Option<f64> = None;
        for _ in 0..10 {
            let step = tick_step(lo, hi, 10.0);
            if !step.is_finite() || step <= 0.0 || prev_step == Some(step) {
                break;
            }
            lo = (lo / step).floor() * step;
            hi = (hi / step).ceil() * step;
            prev_step = Some(step);
        }
        self.domain = ScaleDomain::new(lo, hi);
        self
    }
}

fn tick_step(lo: f64, hi: f64, count: f64) -> f64 {
    let raw = (hi - lo) / count;
    if raw <= 0.0 || !raw.is_finite() {
        return f64::NAN;
    }
    let power = raw.log10().floor();
    let base = 10f64.powf(power);
    let error = raw / base;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * base
}

/// Square-root scale: equal areas for equal value ratios.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct SqrtScale {
    pub domain: ScaleDomain,
    pub range: [f64; 2],
}

impl SqrtScale {
    pub fn new(domain: ScaleDomain, range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, v: f64) -> f64 {
        let lo = signed_sqrt(self.domain.lo);
        let hi = signed_sqrt(self.domain.hi);
        let t = if hi == lo {
            0.5
        } else {
            (signed_sqrt(v) - lo) / (hi - lo)
        };
        self.range[0] + t * (self.range[1] - self.range[0])
    }
}

fn signed_sqrt(v: f64) -> f64 {
    v.signum() * v.abs().sqrt()
}

/// Sequential log scale producing a color-ramp position in [0, 1].
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LogScale {
    pub domain: ScaleDomain,
}

impl LogScale {
    pub fn new(domain: ScaleDomain) -> Self {
        Self { domain }
    }

    /// Ramp position for `v`; `None` for values the log cannot place.
    pub fn ramp(&self, v: f64) -> Option<f64> {
        if v <= 0.0 || !v.is_finite() {
            return None;
        }
        let lo = self.domain.lo.ln();
        let hi = self.domain.hi.ln();
        if hi == lo {
            return Some(0.5);
        }
        Some(((v.ln() - lo) / (hi - lo)).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::{LinearScale, LogScale, ScaleDomain, SqrtScale, upper_or_one};

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "expected {a} ~= {b}");
    }

    #[test]
    fn degenerate_max_defaults_to_one() {
        assert_eq!(upper_or_one(None), 1.0);
        assert_eq!(upper_or_one(Some(0.0)), 1.0);
        assert_eq!(upper_or_one(Some(f64::NAN)), 1.0);
        assert_eq!(upper_or_one(Some(42.0)), 42.0);
        assert_eq!(ScaleDomain::up_to(0.0, Some(0.0)), ScaleDomain::new(0.0, 1.0));
    }

    #[test]
    fn linear_maps_endpoints() {
        let s = LinearScale::new(ScaleDomain::new(0.0, 10.0), [0.0, 200.0]);
        assert_close(s.map(0.0), 0.0);
        assert_close(s.map(5.0), 100.0);
        assert_close(s.map(10.0), 200.0);
    }

    #[test]
    fn nice_rounds_outward() {
        let s = LinearScale::new(ScaleDomain::new(0.0, 873_000.0), [100.0, 0.0]).nice();
        assert_eq!(s.domain, ScaleDomain::new(0.0, 900_000.0));
    }

    #[test]
    fn sqrt_scale_from_zero() {
        let s = SqrtScale::new(ScaleDomain::new(0.0, 4.0), [1.5, 6.0]);
        assert_close(s.map(0.0), 1.5);
        assert_close(s.map(1.0), 1.5 + 4.5 / 2.0);
        assert_close(s.map(4.0), 6.0);
    }

    #[test]
    fn log_ramp_is_clamped_and_handles_degenerate_domain() {
        let s = LogScale::new(ScaleDomain::new(1.0, 100.0));
        assert_close(s.ramp(10.0).unwrap(), 0.5);
        assert_eq!(s.ramp(1000.0), Some(1.0));
        assert_eq!(s.ramp(0.0), None);

        let flat = LogScale::new(ScaleDomain::new(1.0, 1.0));
        assert_eq!(flat.ramp(1.0), Some(0.5));
    }
}
