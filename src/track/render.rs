//! Track rendering
//!
//! Emits an HTML fragment that loads Leaflet in the browser and draws a
//! [`TrackPlan`], plus a GeoJSON export of the same plan.

use serde_json::{json, Value};
use thiserror::Error;

use super::plan::{MarkerKind, TrackPlan};

const LEAFLET_CSS: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.3/leaflet.css";
const LEAFLET_JS: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.3/leaflet.js";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Trip has no usable GPS points")]
    NoPoints,

    #[error("Failed to encode track: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Serialize a value as JSON that is safe to inline in a `<script>` element
pub fn inline_json<T: serde::Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    Ok(json
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}

/// Render the route map fragment.
///
/// The browser side loads Leaflet once; if the script fails to load or the map
/// cannot be initialized the loading indicator is replaced with
/// `Error loading map: ...` and nothing else is drawn.
pub fn render_map(plan: &TrackPlan) -> Result<String, RenderError> {
    if plan.is_empty() {
        return Err(RenderError::NoPoints);
    }

    let plan_json = inline_json(plan)?;

    Ok(format!(
        r#"<div class="route-map">
  <h4>Route Map</h4>
  <p class="muted">Max speed: {max_speed} mph</p>
  <div id="map-error" class="map-error" hidden></div>
  <div id="map-loading" class="map-loading">Loading map...</div>
  <div id="map" class="map-canvas"></div>
  <script id="track-plan" type="application/json">{plan_json}</script>
  <script>{script}</script>
</div>"#,
        max_speed = plan.max_speed,
        plan_json = plan_json,
        script = map_script(),
    ))
}

/// Standalone HTML document with just the route map
pub fn render_document(title: &str, plan: &TrackPlan) -> Result<String, RenderError> {
    let map = render_map(plan)?;
    Ok(format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{title}</title>
  <style>{style}</style>
</head>
<body>
{map}
</body>
</html>
"#,
        title = crate::harness::layout::escape(title),
        style = MAP_STYLE,
        map = map,
    ))
}

/// GeoJSON FeatureCollection of the plan: one LineString for the route (when
/// there is one) and one Point per marker. Coordinates are `[lng, lat]`.
pub fn track_geojson(plan: &TrackPlan) -> Value {
    let mut features = Vec::with_capacity(plan.markers.len() + 1);

    if !plan.polyline.is_empty() {
        let coordinates: Vec<[f64; 2]> = plan.polyline.iter().map(|p| [p.lng, p.lat]).collect();
        features.push(json!({
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": coordinates },
            "properties": { "kind": "route" }
        }));
    }

    for marker in &plan.markers {
        let kind = match marker.kind {
            MarkerKind::Start => "start",
            MarkerKind::End => "end",
            MarkerKind::Waypoint => "waypoint",
        };
        features.push(json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [marker.position.lng, marker.position.lat]
            },
            "properties": {
                "kind": kind,
                "timeOfFix": marker.time.to_rfc3339(),
                "speed": marker.speed
            }
        }));
    }

    json!({
        "type": "FeatureCollection",
        "features": features,
        "properties": { "skipped": plan.skipped, "maxSpeed": plan.max_speed }
    })
}

/// Styles the map fragment relies on
pub const MAP_STYLE: &str = r#"
.route-map h4 { margin: 0 0 .25rem; font-size: 1.1rem; }
.map-canvas { height: 90vh; width: 100%; border-radius: .5rem; }
.map-loading { display: flex; justify-content: center; align-items: center; height: 16rem; color: #6b7280; }
.map-error { padding: 1rem; color: #dc2626; border-bottom: 1px solid #e5e7eb; }
.custom-marker { background: transparent; border: none; }
"#;

fn map_script() -> String {
    format!(
        r#"
(function () {{
  var plan = JSON.parse(document.getElementById('track-plan').textContent);
  var loading = document.getElementById('map-loading');
  var errorBox = document.getElementById('map-error');
  var failed = false;

  function showError(message) {{
    if (failed) return;
    failed = true;
    if (loading) loading.remove();
    errorBox.textContent = 'Error loading map: ' + message;
    errorBox.hidden = false;
  }}

  function dot(color) {{
    return window.L.divIcon({{
      html: '<div style="background-color: ' + color + '; width: 12px; height: 12px; border-radius: 50%; border: 2px solid white;"></div>',
      className: 'custom-marker'
    }});
  }}

  function draw() {{
    try {{
      if (!window.L) throw new Error('Leaflet library not loaded');
      var map = window.L.map('map').setView(plan.center, plan.zoom);
      window.L.tileLayer('https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
        attribution: '&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors'
      }}).addTo(map);

      plan.markers.forEach(function (m) {{
        if (m.kind === 'start') {{
          window.L.marker(m.position, {{ icon: dot('green') }}).addTo(map);
        }} else if (m.kind === 'end') {{
          window.L.marker(m.position, {{ icon: dot('red') }}).addTo(map);
        }} else {{
          window.L.circleMarker(m.position, {{
            radius: 3, fillColor: '#3388ff', color: '#fff', weight: 1, opacity: 1, fillOpacity: 0.8
          }}).addTo(map).bindPopup(m.popup);
        }}
      }});

      if (plan.polyline.length > 1) {{
        window.L.polyline(plan.polyline, {{ color: 'blue', weight: 4, opacity: 0.7 }}).addTo(map);
        map.fitBounds(plan.bounds, {{ padding: [plan.padding, plan.padding] }});
      }}

      if (loading) loading.remove();
    }} catch (e) {{
      console.error('Error loading map:', e);
      showError(e && e.message ? e.message : String(e));
    }}
  }}

  var link = document.createElement('link');
  link.rel = 'stylesheet';
  link.href = '{css}';
  document.head.appendChild(link);

  var script = document.createElement('script');
  script.src = '{js}';
  script.onload = draw;
  script.onerror = function () {{ showError('Failed to load Leaflet library'); }};
  document.body.appendChild(script);

  window.addEventListener('pagehide', function () {{
    try {{ link.remove(); script.remove(); }} catch (_) {{}}
  }});
}})();
"#,
        css = LEAFLET_CSS,
        js = LEAFLET_JS,
    )
}
