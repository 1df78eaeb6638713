//! Narrow contracts for the UI glue around the session.
//!
//! The session only pulls from and pushes to these; it never owns widgets.

use foundation::math::Vec2;
use layers::ViewportSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListId {
    Countries,
    Types,
}

pub trait CheckboxList {
    /// Checked labels; order carries no meaning.
    fn selected(&self, list: ListId) -> Vec<String>;
    fn set_selected(&mut self, list: ListId, labels: &[String]);
}

/// Year range slider. Change notifications are wired by the host, which
/// then calls [`crate::DashboardSession::set_year_range`].
pub trait RangeSlider {
    fn range(&self) -> (i32, i32);
}

pub trait ViewportSizeSource {
    fn size(&self, container: &str) -> ViewportSize;
}

/// Tooltip surface. Placement is the implementor's concern.
pub trait Tooltip {
    fn show(&mut self, anchor: Vec2, html: &str);
    fn hide(&mut self);
}
