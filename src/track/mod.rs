//! Track Renderer
//!
//! Draws a trip's GPS fixes as a route on an interactive map.
//!
//! ## Pipeline
//!
//! 1. [`TrackPlan::from_points`] parses timestamps, drops unusable fixes and
//!    stable-sorts the rest chronologically
//! 2. The plan fixes the map center, polyline, start/end/waypoint markers and
//!    the bounds to fit (30 px padding)
//! 3. [`render_map`] turns the plan into a Leaflet fragment;
//!    [`track_geojson`] exports it as GeoJSON
//!
//! A trip with no usable fix renders no map. A trip with one fix renders a
//! single start marker and no route.

mod plan;
mod render;

pub use plan::{
    Bounds, LatLng, Marker, MarkerKind, PlannedPoint, TrackPlan, FIT_PADDING_PX, INITIAL_ZOOM,
    SINGLE_POINT_ZOOM,
};
pub use render::{inline_json, render_document, render_map, track_geojson, RenderError, MAP_STYLE};
