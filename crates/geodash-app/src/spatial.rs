// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;
use std::time::{Duration, Instant};

use crate::{
    DashboardCommand, GeoPoint, Record, RecordId, RecordStatus, SelectionAuthority, VisibleSubset,
    format_count,
};

pub const MARKER_LIMIT: usize = 1000;
pub const CENTROID_SAMPLE: usize = 100;
pub const DEFAULT_CENTER: GeoPoint = GeoPoint::new(20.0, 0.0);
pub const DEFAULT_ZOOM: f64 = 2.0;
pub const SELECTED_ZOOM: f64 = 10.0;
pub const FLY_DURATION: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialConfig {
    pub marker_limit: usize,
    pub centroid_sample: usize,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            marker_limit: MARKER_LIMIT,
            centroid_sample: CENTROID_SAMPLE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn from_hex(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xff) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: (value & 0xff) as u8,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

pub const SELECTED_STROKE: Rgb = Rgb::from_hex(0x1e3a8a);
pub const UNKNOWN_STATUS_COLOR: Rgb = Rgb::from_hex(0x9ca3af);

pub const fn status_color(status: Option<RecordStatus>) -> Rgb {
    match status {
        Some(RecordStatus::Active) => Rgb::from_hex(0x22c55e),
        Some(RecordStatus::Pending) => Rgb::from_hex(0xf59e0b),
        Some(RecordStatus::Completed) => Rgb::from_hex(0x3b82f6),
        Some(RecordStatus::OnHold) => Rgb::from_hex(0xef4444),
        None => UNKNOWN_STATUS_COLOR,
    }
}

/// Legend entries in display order.
pub fn legend() -> [(&'static str, Rgb); 4] {
    RecordStatus::ALL.map(|status| (status.label(), status_color(Some(status))))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    Normal,
    Selected,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub radius: u8,
    pub fill: Rgb,
    pub fill_opacity: f32,
    pub stroke: Rgb,
    pub weight: u8,
}

impl MarkerStyle {
    pub const fn new(state: MarkerState, status: Option<RecordStatus>) -> Self {
        let fill = status_color(status);
        match state {
            MarkerState::Selected => Self {
                radius: 12,
                fill,
                fill_opacity: 1.0,
                stroke: SELECTED_STROKE,
                weight: 3,
            },
            MarkerState::Normal => Self {
                radius: 6,
                fill,
                fill_opacity: 0.7,
                stroke: fill,
                weight: 1,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDescriptor {
    pub record_id: RecordId,
    pub point: GeoPoint,
    pub state: MarkerState,
    pub style: MarkerStyle,
}

impl MarkerDescriptor {
    pub fn new(record: &Record, selected: bool) -> Self {
        let state = if selected {
            MarkerState::Selected
        } else {
            MarkerState::Normal
        };
        Self {
            record_id: record.id.clone(),
            point: record.point(),
            state,
            style: MarkerStyle::new(state, record.status),
        }
    }

    pub fn is_selected(&self) -> bool {
        self.state == MarkerState::Selected
    }

    pub fn click_command(&self) -> DashboardCommand {
        DashboardCommand::ClickMarker(self.record_id.clone())
    }
}

/// Subset positions that get a marker. Everything is shown while a record is
/// selected or the subset fits under `limit`; otherwise every
/// `ceil(len / limit)`-th position is kept. This is an index sample, so dense
/// regions stay dense.
pub fn sample_positions(len: usize, has_selection: bool, limit: usize) -> Vec<usize> {
    if has_selection || len <= limit {
        return (0..len).collect();
    }
    let stride = len.div_ceil(limit.max(1));
    (0..len).step_by(stride).collect()
}

/// Where the map should look when nothing is flying. A selection wins;
/// otherwise the mean of the first `sample` visible records with finite
/// coordinates; otherwise [`DEFAULT_CENTER`].
pub fn view_center(
    records: &[Record],
    subset: &VisibleSubset,
    selected: Option<&Record>,
    sample: usize,
) -> GeoPoint {
    if let Some(point) = selected.map(Record::point).filter(|point| point.is_finite()) {
        return point;
    }

    let (count, lat_sum, lng_sum) = subset
        .records(records)
        .take(sample)
        .map(Record::point)
        .filter(|point| point.is_finite())
        .fold((0usize, 0.0f64, 0.0f64), |(count, lat, lng), point| {
            (count + 1, lat + point.lat, lng + point.lng)
        });
    if count == 0 {
        return DEFAULT_CENTER;
    }
    GeoPoint::new(lat_sum / count as f64, lng_sum / count as f64)
}

/// Fire-and-forget camera transition handed to the map surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMove {
    pub target: GeoPoint,
    pub zoom: f64,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Flight {
    from: GeoPoint,
    from_zoom: f64,
    to: GeoPoint,
    to_zoom: f64,
    started: Instant,
    duration: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapCamera {
    center: GeoPoint,
    zoom: f64,
    fly_duration: Duration,
    flight: Option<Flight>,
}

impl Default for MapCamera {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER)
    }
}

impl MapCamera {
    pub fn new(center: GeoPoint) -> Self {
        Self {
            center,
            zoom: DEFAULT_ZOOM,
            fly_duration: FLY_DURATION,
            flight: None,
        }
    }

    pub fn with_fly_duration(mut self, duration: Duration) -> Self {
        self.fly_duration = duration;
        self
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    /// Instant reposition at the overview zoom.
    pub fn jump_to(&mut self, center: GeoPoint) {
        self.flight = None;
        self.center = center;
        self.zoom = DEFAULT_ZOOM;
    }

    pub fn fly_to(&mut self, target: GeoPoint, now: Instant) -> Option<CameraMove> {
        if !target.is_finite() {
            return None;
        }
        if self.fly_duration.is_zero() {
            self.center = target;
            self.zoom = SELECTED_ZOOM;
        } else {
            self.flight = Some(Flight {
                from: self.center,
                from_zoom: self.zoom,
                to: target,
                to_zoom: SELECTED_ZOOM,
                started: now,
                duration: self.fly_duration,
            });
        }
        Some(CameraMove {
            target,
            zoom: SELECTED_ZOOM,
            duration: self.fly_duration,
        })
    }

    /// Advances a running flight. Returns true while one is in flight.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(flight) = self.flight else {
            return false;
        };
        let elapsed = now.saturating_duration_since(flight.started);
        if elapsed >= flight.duration {
            self.center = flight.to;
            self.zoom = flight.to_zoom;
            self.flight = None;
            return false;
        }
        let t = elapsed.as_secs_f64() / flight.duration.as_secs_f64();
        let eased = if t < 0.5 {
            4.0 * t * t * t
        } else {
            1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
        };
        self.center = GeoPoint::new(
            lerp(flight.from.lat, flight.to.lat, eased),
            lerp(flight.from.lng, flight.to.lng, eased),
        );
        self.zoom = lerp(flight.from_zoom, flight.to_zoom, eased);
        true
    }
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Everything the map surface draws for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFrame {
    pub center: GeoPoint,
    pub zoom: f64,
    pub markers: Vec<MarkerDescriptor>,
    pub visible_total: usize,
    pub note: Option<String>,
}

impl MapFrame {
    pub fn build(
        records: &[Record],
        subset: &VisibleSubset,
        selection: &SelectionAuthority,
        camera: &MapCamera,
        config: SpatialConfig,
    ) -> Self {
        let has_selection = selection.current().is_some();
        let positions = sample_positions(subset.len(), has_selection, config.marker_limit);
        let markers = positions
            .iter()
            .filter_map(|position| subset.record(records, *position))
            .filter(|record| record.point().is_finite())
            .map(|record| MarkerDescriptor::new(record, selection.is_selected(&record.id)))
            .collect::<Vec<_>>();

        let note = (!has_selection && subset.len() > config.marker_limit).then(|| {
            format!(
                "Showing {} of {} markers",
                format_count(markers.len()),
                format_count(subset.len())
            )
        });

        Self {
            center: camera.center(),
            zoom: camera.zoom(),
            markers,
            visible_total: subset.len(),
            note,
        }
    }

    pub fn selected_marker(&self) -> Option<&MarkerDescriptor> {
        self.markers.iter().find(|marker| marker.is_selected())
    }
}

/// Marker closest to `point` within `max_distance` degrees, for surfaces
/// that hit-test clicks themselves. Selected markers win ties since they
/// draw on top.
pub fn nearest_marker<'a>(
    markers: &'a [MarkerDescriptor],
    point: GeoPoint,
    max_distance: f64,
) -> Option<&'a MarkerDescriptor> {
    let limit = max_distance * max_distance;
    markers
        .iter()
        .map(|marker| {
            let dlat = marker.point.lat - point.lat;
            let dlng = marker.point.lng - point.lng;
            (marker, dlat * dlat + dlng * dlng)
        })
        .filter(|(_, distance)| *distance <= limit)
        .min_by(|(left, left_distance), (right, right_distance)| {
            left_distance
                .total_cmp(right_distance)
                .then_with(|| right.is_selected().cmp(&left.is_selected()))
        })
        .map(|(marker, _)| marker)
}
