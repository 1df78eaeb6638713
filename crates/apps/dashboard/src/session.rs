//! The dashboard controller.
//!
//! `DashboardSession` is the single owner of the loaded data, the filter
//! selection and the viewport. Interaction handlers call into it; it never
//! calls back into the UI except through the highlight bus.

use compute::{
    AggregationPipeline, Choropleth, Cluster, ClusterKey, ClusterSet, ImpactAxis, ScatterPoint,
    SpatialClusterer, ViewSet, dot_radius,
};
use dataset::{Catalog, DisplayNames, EventRecord, FilterState};
use foundation::math::{MercatorProjection, Vec2};
use foundation::time::Time;
use layers::{BoundarySet, ViewTransform, ViewportMode, ViewportSize, ViewportTransform};
use runtime::{
    Debouncer, Easing, Emphasis, Frame, HighlightBus, HighlightEvent, SubscriptionId,
    TransitionDriver,
};
use tracing::{debug, warn};

use crate::collaborators::{CheckboxList, ListId, RangeSlider, Tooltip, ViewportSizeSource};
use crate::config::DashboardConfig;
use crate::format::format_usd_headline;
use crate::loader::LoadedSources;
use crate::tooltip::{cluster_html, country_html, impact_title};
use crate::view::{
    DashboardFrame, FeatureStyle, FrameBody, GLOBAL_VIEW_LABEL, KpiView, MapView, StatusLine,
};

/// Container id the map size is read from.
pub const MAP_CONTAINER: &str = "chart-map";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug)]
pub struct DashboardSession {
    config: DashboardConfig,
    names: DisplayNames,
    records: Vec<EventRecord>,
    boundaries: BoundarySet,
    filters: FilterState,
    pipeline: AggregationPipeline,
    projection: MercatorProjection,
    viewport: ViewportTransform,
    rendered: TransitionDriver<ViewTransform>,
    highlight: HighlightBus,
    resize: Debouncer,
    pending_width: Option<f64>,
}

impl DashboardSession {
    /// Builds the session with every country and type selected and the
    /// full configured year range.
    pub fn new(config: DashboardConfig, sources: LoadedSources, map_width: f64) -> Self {
        let records = sources.records.records;
        let catalog = Catalog::from_records(&records);
        let size = config.map_size(map_width);
        debug!(
            records = records.len(),
            countries = catalog.country_count(),
            types = catalog.type_count(),
            "starting dashboard session"
        );
        Self {
            names: config.display_names.clone(),
            filters: FilterState::new(catalog, config.year_range()),
            pipeline: AggregationPipeline::new(config.top_n, config.scatter_limit),
            projection: MercatorProjection::for_viewport(size.width, size.height),
            viewport: ViewportTransform::new(size, config.zoom_limits(), config.fit_options()),
            rendered: TransitionDriver::new(ViewTransform::IDENTITY),
            highlight: HighlightBus::new(),
            resize: Debouncer::from_millis(config.resize_debounce_ms),
            pending_width: None,
            boundaries: sources.boundaries,
            records,
            config,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn boundaries(&self) -> &BoundarySet {
        &self.boundaries
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    pub fn projection(&self) -> &MercatorProjection {
        &self.projection
    }

    /// Transform drawn on the last tick.
    pub fn rendered_transform(&self) -> ViewTransform {
        self.rendered.rendered()
    }

    pub fn is_animating(&self) -> bool {
        self.rendered.is_animating()
    }

    // -- filters ---------------------------------------------------------

    pub fn set_countries<S: AsRef<str>>(&mut self, labels: impl IntoIterator<Item = S>, now: Time) {
        self.filters.set_countries(labels);
        debug!(selected = self.filters.selected_country_count(), "country selection changed");
        self.refocus(now);
    }

    pub fn set_types<S: AsRef<str>>(&mut self, labels: impl IntoIterator<Item = S>, now: Time) {
        self.filters.set_types(labels);
        debug!(global = self.filters.is_type_global(), "type selection changed");
        self.refocus(now);
    }

    pub fn set_year_range(&mut self, lo: i32, hi: i32, now: Time) {
        self.filters.set_year_range(lo, hi);
        debug!(lo, hi, "year range changed");
        self.refocus(now);
    }

    /// Selects exactly the country behind a clicked map feature.
    pub fn select_country_from_map(&mut self, feature_name: &str, now: Time) {
        let label = self.names.label_for(feature_name).to_string();
        debug!(feature = feature_name, label = %label, "country picked on map");
        self.filters.select_only_country(&label);
        self.refocus(now);
    }

    /// Back button: all countries selected, world view restored.
    pub fn reset_zoom_and_selection(&mut self, now: Time) {
        self.filters.select_all_countries();
        self.apply_viewport(self.viewport.reset(), now, self.config.reset_ms);
    }

    /// Clears every filter and restores the configured year range.
    pub fn reset_all(&mut self, now: Time) {
        let years = self.config.year_range();
        self.filters.select_all_countries();
        self.filters.select_all_types();
        self.filters.set_year_range(years.lo(), years.hi());
        self.apply_viewport(self.viewport.reset(), now, self.config.reset_ms);
    }

    /// Pulls the current selection from the filter widgets.
    pub fn sync_from_controls(&mut self, lists: &dyn CheckboxList, slider: &dyn RangeSlider, now: Time) {
        let (lo, hi) = slider.range();
        self.filters.set_countries(lists.selected(ListId::Countries));
        self.filters.set_types(lists.selected(ListId::Types));
        self.filters.set_year_range(lo, hi);
        self.refocus(now);
    }

    /// Writes the selection back to the filter widgets, e.g. after a reset.
    pub fn push_to_controls(&self, lists: &mut dyn CheckboxList) {
        let selection = self.filters.selection();
        let countries: Vec<String> = selection.countries.iter().cloned().collect();
        let types: Vec<String> = selection.types.iter().cloned().collect();
        lists.set_selected(ListId::Countries, &countries);
        lists.set_selected(ListId::Types, &types);
    }

    /// Focuses the single selected country, or returns to the world view.
    fn refocus(&mut self, now: Time) {
        let Some(label) = self.filters.single_country().map(str::to_string) else {
            self.apply_viewport(self.viewport.reset(), now, self.config.global_ms);
            return;
        };
        let name = self.names.display_name(&label).to_string();
        let focused = self
            .boundaries
            .find(&name)
            .and_then(|feature| self.viewport.focus_on(feature, &self.projection));
        match focused {
            Some(next) => {
                debug!(feature = %name, k = next.transform().k, "focusing country");
                self.apply_viewport(next, now, self.config.transform_ms);
            }
            None => {
                warn!(country = %label, feature = %name, "no boundary to focus for country");
                self.apply_viewport(self.viewport.reset(), now, self.config.global_ms);
            }
        }
    }

    // -- viewport --------------------------------------------------------

    pub fn zoom_in(&mut self, now: Time) {
        let next = self.viewport.zoom_by(self.config.zoom_step);
        self.apply_viewport(next, now, self.config.transform_ms);
    }

    pub fn zoom_out(&mut self, now: Time) {
        let next = self.viewport.zoom_by(1.0 / self.config.zoom_step);
        self.apply_viewport(next, now, self.config.transform_ms);
    }

    pub fn wheel(&mut self, delta_y: f64, cursor: Vec2, now: Time) {
        let next = self.viewport.wheel(delta_y, cursor, self.config.wheel_step);
        self.apply_viewport(next, now, self.config.transform_ms);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let next = self.viewport.pan_by(dx, dy);
        self.jump_viewport(next);
    }

    pub fn pan(&mut self, direction: PanDirection) {
        let [sx, sy] = self.config.pan_step;
        let (dx, dy) = match direction {
            PanDirection::Left => (-sx, 0.0),
            PanDirection::Right => (sx, 0.0),
            PanDirection::Up => (0.0, -sy),
            PanDirection::Down => (0.0, sy),
        };
        self.pan_by(dx, dy);
    }

    pub fn drag_start(&mut self, cursor: Vec2) {
        self.viewport = self.viewport.drag_start(cursor);
    }

    pub fn drag_move(&mut self, cursor: Vec2) {
        let next = self.viewport.drag_move(cursor);
        self.jump_viewport(next);
    }

    pub fn drag_end(&mut self) {
        self.viewport = self.viewport.drag_end();
    }

    /// Advances the transform animation; returns the transform to draw.
    pub fn tick(&mut self, frame: Frame) -> ViewTransform {
        self.rendered.tick(frame.time)
    }

    fn apply_viewport(&mut self, next: ViewportTransform, now: Time, duration_ms: u64) {
        self.rendered.start(
            next.transform(),
            now,
            duration_ms as f64 / 1000.0,
            Easing::CubicInOut,
        );
        self.viewport = next;
    }

    fn jump_viewport(&mut self, next: ViewportTransform) {
        self.rendered.jump(next.transform());
        self.viewport = next;
    }

    // -- resize ----------------------------------------------------------

    pub fn notify_resize(&mut self, map_width: f64, now: Time) {
        self.pending_width = Some(map_width);
        self.resize.notify(now);
    }

    pub fn resize_from(&mut self, sizes: &dyn ViewportSizeSource, now: Time) {
        let size = sizes.size(MAP_CONTAINER);
        self.notify_resize(size.width, now);
    }

    /// Applies a pending resize once the quiet period has elapsed. Returns
    /// whether the layout changed.
    pub fn poll_resize(&mut self, now: Time) -> bool {
        if !self.resize.poll(now) {
            return false;
        }
        let Some(width) = self.pending_width.take() else {
            return false;
        };
        let size: ViewportSize = self.config.map_size(width);
        debug!(width = size.width, height = size.height, "applying debounced resize");
        self.projection = MercatorProjection::for_viewport(size.width, size.height);
        self.viewport = self.viewport.with_size(size);
        self.refocus(now);
        true
    }

    // -- linked highlighting ---------------------------------------------

    pub fn subscribe_highlight(&mut self, subscriber: impl FnMut(&HighlightEvent) + 'static) -> SubscriptionId {
        self.highlight.subscribe(subscriber)
    }

    pub fn unsubscribe_highlight(&mut self, id: SubscriptionId) -> bool {
        self.highlight.unsubscribe(id)
    }

    pub fn hover_key(&mut self, raw_key: &str) {
        self.highlight.broadcast(raw_key);
    }

    pub fn clear_hover(&mut self) {
        self.highlight.clear();
    }

    pub fn emphasis_for(&self, element_key: &str) -> Emphasis {
        self.highlight.emphasis_for(element_key)
    }

    /// Picks the scatter marker under `pointer` in a plot area of
    /// `plot_size`, highlighting its bar key, or clears the highlight.
    pub fn hover_scatter(&mut self, plot_size: ViewportSize, pointer: Vec2) -> Option<ScatterPoint> {
        let filtered = self.pipeline.filter(&self.records, &self.filters.predicate());
        let scatter = self.pipeline.scatter(&filtered);
        let picked = scatter
            .pick(plot_size.width, plot_size.height, pointer)
            .cloned();
        match &picked {
            Some(point) => {
                let key = match ImpactAxis::for_state(&self.filters) {
                    ImpactAxis::Country => &point.country,
                    ImpactAxis::Type => &point.disaster_type,
                };
                self.highlight.broadcast(key);
            }
            None => self.highlight.clear(),
        }
        picked
    }

    // -- tooltips --------------------------------------------------------

    /// Shows the event count of a hovered country outline.
    pub fn hover_country(&self, feature_name: &str, anchor: Vec2, tooltip: &mut dyn Tooltip) {
        let filtered = self.pipeline.filter(&self.records, &self.filters.predicate());
        let events = self
            .pipeline
            .choropleth(&filtered)
            .count_for(feature_name)
            .unwrap_or(0);
        tooltip.show(anchor, &country_html(feature_name, events));
    }

    /// Shows the summary of a hovered cluster marker. Returns the cluster,
    /// or hides the tooltip when no focused cluster carries `key`.
    pub fn hover_cluster(
        &self,
        key: ClusterKey,
        anchor: Vec2,
        tooltip: &mut dyn Tooltip,
    ) -> Option<Cluster> {
        let cluster = self.focused_clusters().and_then(|set| set.get(key).cloned());
        match &cluster {
            Some(c) => tooltip.show(anchor, &cluster_html(c)),
            None => tooltip.hide(),
        }
        cluster
    }

    pub fn leave(&self, tooltip: &mut dyn Tooltip) {
        tooltip.hide();
    }

    fn focused_clusters(&self) -> Option<ClusterSet> {
        let ViewportMode::Focused { feature } = self.viewport.mode() else {
            return None;
        };
        let boundary = self.boundaries.find(feature)?;
        let filtered = self.pipeline.filter(&self.records, &self.filters.predicate());
        Some(SpatialClusterer::cluster(&filtered, Some(boundary)))
    }

    // -- rendering -------------------------------------------------------

    /// Full recompute of every view from the current state.
    pub fn render(&self) -> DashboardFrame {
        let filtered = self.pipeline.filter(&self.records, &self.filters.predicate());
        let kpis = self.pipeline.kpis(&filtered);
        let axis = ImpactAxis::for_state(&self.filters);

        let body = match self.pipeline.aggregate(&filtered, axis) {
            ViewSet::NoData => FrameBody::NoData,
            ViewSet::Ready(aggregates) => {
                let map = self.map_view(&filtered, &aggregates.choropleth);
                FrameBody::Ready { aggregates, map }
            }
        };

        DashboardFrame {
            status: self.status_line(axis),
            kpis: KpiView {
                kpis,
                events: kpis.event_count.to_string(),
                loss: format_usd_headline(kpis.total_loss),
            },
            body,
        }
    }

    fn status_line(&self, axis: ImpactAxis) -> StatusLine {
        let selected = self.filters.selected_country_count();
        let showing_global = self.filters.is_country_global();
        let years = self.filters.selection().years;
        StatusLine {
            scope: if showing_global {
                GLOBAL_VIEW_LABEL.to_string()
            } else {
                format!("{selected} Selected")
            },
            filtered: !showing_global,
            impact_title: impact_title(axis, self.filters.single_country(), self.config.top_n),
            year_label: format!("{}-{}", years.lo(), years.hi()),
        }
    }

    fn map_view(&self, filtered: &[&EventRecord], choropleth: &Choropleth) -> MapView {
        let selection = self.filters.selection();
        let single = self
            .filters
            .single_country()
            .map(|label| self.names.display_name(label));

        let features = self
            .boundaries
            .iter()
            .map(|f| FeatureStyle {
                name: f.name.clone(),
                events: choropleth.count_for(&f.name),
                ramp: choropleth.ramp_for(&f.name),
                highlighted: single == Some(f.name.as_str()),
                outlined: selection.countries.contains(self.names.label_for(&f.name)),
            })
            .collect();

        let clusters = match self.viewport.mode() {
            ViewportMode::Focused { feature } => self
                .boundaries
                .find(feature)
                .map(|boundary| SpatialClusterer::cluster(filtered, Some(boundary))),
            ViewportMode::Global => None,
        };

        let selected = self.filters.selected_country_count();
        MapView {
            rendered: self.rendered.rendered(),
            target: self.viewport.transform(),
            mode: self.viewport.mode().clone(),
            features,
            back_visible: selected > 0 && selected < self.filters.catalog().country_count(),
            clusters,
            dot_radius: dot_radius(self.viewport.transform().k),
        }
    }
}
