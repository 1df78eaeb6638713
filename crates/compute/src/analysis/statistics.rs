/// Reductions over measure columns. Non-finite values (missing measures)
/// are skipped, and an empty input has no mean or extent.
pub struct Statistics;

impl Statistics {
    pub fn sum(values: impl IntoIterator<Item = f64>) -> f64 {
        values.into_iter().filter(|v| v.is_finite()).sum()
    }

    pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
        let mut sum = 0.0;
        let mut n = 0usize;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            sum += v;
            n += 1;
        }
        if n == 0 {
            return None;
        }
        Some(sum / n as f64)
    }

    pub fn min_max(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
        let mut finite = values.into_iter().filter(|v| v.is_finite());
        let first = finite.next()?;
        let mut min = first;
        let mut max = first;
        for v in finite {
            min = min.min(v);
            max = max.max(v);
        }
        Some((min, max))
    }

    pub fn max(values: impl IntoIterator<Item = f64>) -> Option<f64> {
        Self::min_max(values).map(|(_, max)| max)
    }
}
