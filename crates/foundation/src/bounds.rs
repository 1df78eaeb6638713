use crate::math::Vec2;

/// Axis-aligned bounding box in a 2D pixel or map plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Smallest box containing every finite point; `None` when there is none.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut out: Option<Aabb2> = None;
        for p in points {
            if !p.x.is_finite() || !p.y.is_finite() {
                continue;
            }
            match out.as_mut() {
                Some(b) => b.extend(p),
                None => out = Some(Aabb2::new([p.x, p.y], [p.x, p.y])),
            }
        }
        out
    }

    pub fn extend(&mut self, p: Vec2) {
        self.min[0] = self.min[0].min(p.x);
        self.min[1] = self.min[1].min(p.y);
        self.max[0] = self.max[0].max(p.x);
        self.max[1] = self.max[1].max(p.y);
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb2;
    use crate::math::Vec2;

    #[test]
    fn from_points_skips_non_finite() {
        let b = Aabb2::from_points([
            Vec2::new(1.0, 5.0),
            Vec2::new(f64::NAN, 0.0),
            Vec2::new(-3.0, 2.0),
        ])
        .unwrap();
        assert_eq!(b.min, [-3.0, 2.0]);
        assert_eq!(b.max, [1.0, 5.0]);
        assert_eq!(b.center(), Vec2::new(-1.0, 3.5));
        assert_eq!(b.width(), 4.0);
        assert_eq!(b.height(), 3.0);
    }

    #[test]
    fn from_points_empty_is_none() {
        assert!(Aabb2::from_points(std::iter::empty()).is_none());
    }
}
