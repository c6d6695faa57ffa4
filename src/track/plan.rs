//! Track planning
//!
//! Turns an unordered list of GPS fixes into everything the map needs:
//! chronological order, polyline, start/end/waypoint markers and bounds.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Serialize, Serializer};

use crate::format::{format_local_time, format_speed};
use crate::model::TripPoint;

/// Zoom used when the map is centered on the first fix
pub const INITIAL_ZOOM: u8 = 13;

/// Zoom used when the track has a single fix and nothing to fit
pub const SINGLE_POINT_ZOOM: u8 = 15;

/// Padding in pixels applied when fitting the viewport to the track
pub const FIT_PADDING_PX: u32 = 30;

/// Latitude/longitude pair, serialized as `[lat, lng]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl Serialize for LatLng {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.lat, self.lng].serialize(serializer)
    }
}

/// Bounding box, serialized as `[[south, west], [north, east]]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    fn around(points: &[LatLng]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Bounds {
            south_west: *first,
            north_east: *first,
        };
        for p in &points[1..] {
            bounds.south_west.lat = bounds.south_west.lat.min(p.lat);
            bounds.south_west.lng = bounds.south_west.lng.min(p.lng);
            bounds.north_east.lat = bounds.north_east.lat.max(p.lat);
            bounds.north_east.lng = bounds.north_east.lng.max(p.lng);
        }
        Some(bounds)
    }
}

impl Serialize for Bounds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.south_west, self.north_east].serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Start,
    End,
    Waypoint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: LatLng,
    pub time: DateTime<Utc>,
    pub speed: f64,
    /// Popup HTML, only set on waypoints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popup: Option<String>,
}

/// A usable fix after parsing and sorting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedPoint {
    pub position: LatLng,
    pub time: DateTime<Utc>,
    pub speed: f64,
}

/// Everything needed to draw a trip on a map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackPlan {
    /// Usable fixes in ascending time order
    pub points: Vec<PlannedPoint>,
    pub center: Option<LatLng>,
    pub zoom: u8,
    /// Route through every point; empty unless there are at least two points
    pub polyline: Vec<LatLng>,
    pub markers: Vec<Marker>,
    /// Viewport to fit; only set together with the polyline
    pub bounds: Option<Bounds>,
    pub padding: u32,
    /// Highest whole-number speed across the usable fixes
    pub max_speed: i64,
    /// Fixes dropped for an unreadable timestamp or invalid coordinates
    pub skipped: usize,
}

impl TrackPlan {
    /// Plan a track, formatting popup times in the local timezone
    pub fn from_points(points: &[TripPoint]) -> Self {
        Self::from_points_in(points, &Local)
    }

    /// Plan a track, formatting popup times in `tz`
    pub fn from_points_in<Tz: TimeZone>(points: &[TripPoint], tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut skipped = 0;
        let mut usable: Vec<PlannedPoint> = Vec::with_capacity(points.len());

        for point in points {
            let position = LatLng::new(point.latitude, point.longitude);
            match point.fix_time() {
                Some(time) if position.is_valid() => usable.push(PlannedPoint {
                    position,
                    time,
                    speed: point.speed,
                }),
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::warn!(skipped, total = points.len(), "Dropped unusable trip points");
        }

        // Stable: fixes with identical timestamps keep their input order.
        usable.sort_by_key(|p| p.time);

        let max_speed = usable
            .iter()
            .map(|p| p.speed.trunc() as i64)
            .max()
            .unwrap_or(0);

        let markers = build_markers(&usable, tz);
        let route: Vec<LatLng> = usable.iter().map(|p| p.position).collect();

        let (polyline, bounds, zoom) = if route.len() >= 2 {
            let bounds = Bounds::around(&route);
            (route, bounds, INITIAL_ZOOM)
        } else {
            (Vec::new(), None, SINGLE_POINT_ZOOM)
        };

        TrackPlan {
            center: usable.first().map(|p| p.position),
            points: usable,
            zoom,
            polyline,
            markers,
            bounds,
            padding: FIT_PADDING_PX,
            max_speed,
            skipped,
        }
    }

    /// True when no fix survived planning
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> Option<&PlannedPoint> {
        self.points.first()
    }

    pub fn end(&self) -> Option<&PlannedPoint> {
        self.points.last()
    }
}

fn build_markers<Tz: TimeZone>(points: &[PlannedPoint], tz: &Tz) -> Vec<Marker>
where
    Tz::Offset: std::fmt::Display,
{
    let last = points.len().saturating_sub(1);

    points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let kind = if index == 0 {
                MarkerKind::Start
            } else if index == last {
                MarkerKind::End
            } else {
                MarkerKind::Waypoint
            };

            let popup = (kind == MarkerKind::Waypoint).then(|| {
                format!(
                    "Time: {}<br>Speed: {} mph",
                    format_local_time(&point.time.with_timezone(tz)),
                    format_speed(point.speed)
                )
            });

            Marker {
                kind,
                position: point.position,
                time: point.time,
                speed: point.speed,
                popup,
            }
        })
        .collect()
}
