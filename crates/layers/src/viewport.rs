//! Map viewport state machine.
//!
//! The map layer is drawn in projected pixel space ("map space") and shown
//! through a `ViewTransform`: `screen = k * map + t`. Every operation is a
//! pure transition returning the next `ViewportTransform`; animation of the
//! rendered transform is the caller's concern.
//!
//! Focus points are stored in map space. Zooming about a focus keeps the
//! map point under it at the same screen pixel, which is what the
//! `t' = t - (k' - k) * focus` update guarantees.

use foundation::bounds::Aabb2;
use foundation::math::{MercatorProjection, Vec2};
use runtime::transition::Interpolate;
use serde::Serialize;

use crate::boundary::BoundaryFeature;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ViewTransform {
    pub k: f64,
    pub tx: f64,
    pub ty: f64,
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        k: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn new(k: f64, tx: f64, ty: f64) -> Self {
        Self { k, tx, ty }
    }

    pub fn apply(&self, map: Vec2) -> Vec2 {
        Vec2::new(self.k * map.x + self.tx, self.k * map.y + self.ty)
    }

    pub fn invert(&self, screen: Vec2) -> Vec2 {
        Vec2::new((screen.x - self.tx) / self.k, (screen.y - self.ty) / self.k)
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Interpolate for ViewTransform {
    fn interpolate(self, to: Self, t: f64) -> Self {
        Self {
            k: self.k.interpolate(to.k, t),
            tx: self.tx.interpolate(to.tx, t),
            ty: self.ty.interpolate(to.ty, t),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
}

impl ZoomLimits {
    pub fn clamp(&self, k: f64) -> f64 {
        k.clamp(self.min, self.max)
    }
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 16.0,
        }
    }
}

/// How a feature's bounding box is fitted into the viewport.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct FitOptions {
    /// Fraction of the viewport the box may fill.
    pub padding: f64,
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            padding: 0.9,
            min_scale: 1.0,
            max_scale: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ViewportMode {
    Global,
    Focused { feature: String },
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct DragAnchor {
    cursor: Vec2,
    baseline: ViewTransform,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportTransform {
    transform: ViewTransform,
    focus: Option<Vec2>,
    mode: ViewportMode,
    size: ViewportSize,
    limits: ZoomLimits,
    fit: FitOptions,
    drag: Option<DragAnchor>,
}

impl ViewportTransform {
    pub fn new(size: ViewportSize, limits: ZoomLimits, fit: FitOptions) -> Self {
        Self {
            transform: ViewTransform::IDENTITY,
            focus: None,
            mode: ViewportMode::Global,
            size,
            limits,
            fit,
            drag: None,
        }
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    /// Remembered focus point in map space.
    pub fn focus(&self) -> Option<Vec2> {
        self.focus
    }

    pub fn mode(&self) -> &ViewportMode {
        &self.mode
    }

    pub fn is_focused(&self) -> bool {
        matches!(self.mode, ViewportMode::Focused { .. })
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn with_size(&self, size: ViewportSize) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }

    /// Fits `feature` into the viewport. `None` when the feature has no
    /// projectable geometry.
    pub fn focus_on(
        &self,
        feature: &BoundaryFeature,
        projection: &MercatorProjection,
    ) -> Option<Self> {
        let bounds = feature.projected_bounds(projection)?;
        Some(self.focus_on_bounds(&feature.name, bounds))
    }

    pub fn focus_on_bounds(&self, feature: &str, bounds: Aabb2) -> Self {
        let dx = bounds.width();
        let dy = bounds.height();
        let center = bounds.center();
        let fill = (dx / self.size.width).max(dy / self.size.height);
        let k = (self.fit.padding / fill).clamp(self.fit.min_scale, self.fit.max_scale);
        let k = self.limits.clamp(k);
        Self {
            transform: ViewTransform::new(
                k,
                self.size.width / 2.0 - k * center.x,
                self.size.height / 2.0 - k * center.y,
            ),
            focus: Some(center),
            mode: ViewportMode::Focused {
                feature: feature.to_string(),
            },
            drag: None,
            ..self.clone()
        }
    }

    pub fn reset(&self) -> Self {
        Self {
            transform: ViewTransform::IDENTITY,
            focus: None,
            mode: ViewportMode::Global,
            drag: None,
            ..self.clone()
        }
    }

    /// Zooms about the remembered focus, or the map point under the
    /// viewport center when nothing is remembered.
    pub fn zoom_by(&self, factor: f64) -> Self {
        let focus = self
            .focus
            .unwrap_or_else(|| self.transform.invert(self.size.center()));
        Self {
            transform: self.scaled_about(factor, focus),
            ..self.clone()
        }
    }

    /// Zooms about the map point under screen pixel `point`. The point
    /// becomes the remembered focus only while a feature is focused.
    pub fn zoom_at(&self, factor: f64, point: Vec2) -> Self {
        let focus = self.transform.invert(point);
        Self {
            transform: self.scaled_about(factor, focus),
            focus: if self.is_focused() { Some(focus) } else { self.focus },
            ..self.clone()
        }
    }

    /// Pointer wheel: negative `delta_y` zooms in by `step`, positive zooms
    /// out. A focused feature keeps the zoom centered on itself.
    pub fn wheel(&self, delta_y: f64, cursor: Vec2, step: f64) -> Self {
        let factor = if -delta_y > 0.0 { step } else { 1.0 / step };
        match (self.is_focused(), self.focus) {
            (true, Some(_)) => self.zoom_by(factor),
            _ => self.zoom_at(factor, cursor),
        }
    }

    /// Moves the view opposite to the requested direction, matching drag
    /// semantics.
    pub fn pan_by(&self, dx: f64, dy: f64) -> Self {
        Self {
            transform: ViewTransform::new(
                self.transform.k,
                self.transform.tx - dx,
                self.transform.ty - dy,
            ),
            ..self.clone()
        }
    }

    pub fn drag_start(&self, cursor: Vec2) -> Self {
        Self {
            drag: Some(DragAnchor {
                cursor,
                baseline: self.transform,
            }),
            ..self.clone()
        }
    }

    pub fn drag_move(&self, cursor: Vec2) -> Self {
        let Some(anchor) = self.drag else {
            return self.clone();
        };
        let delta = cursor - anchor.cursor;
        Self {
            transform: ViewTransform::new(
                anchor.baseline.k,
                anchor.baseline.tx + delta.x,
                anchor.baseline.ty + delta.y,
            ),
            ..self.clone()
        }
    }

    pub fn drag_end(&self) -> Self {
        Self {
            drag: None,
            ..self.clone()
        }
    }

    fn scaled_about(&self, factor: f64, focus: Vec2) -> ViewTransform {
        let k = self.transform.k;
        let new_k = self.limits.clamp(k * factor);
        ViewTransform::new(
            new_k,
            self.transform.tx - (new_k - k) * focus.x,
            self.transform.ty - (new_k - k) * focus.y,
        )
    }
}
