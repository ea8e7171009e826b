//! Standalone Leaflet HTML map of the track and its POIs

use serde::Serialize;
use std::fs;
use std::path::Path;

use alongtrack_core::error::{AlongTrackError, Result};
use alongtrack_core::models::{ResolvedPoi, TrackPoint};
use alongtrack_core::ports::{ColorScheme, MapRenderer};

const LEAFLET_VERSION: &str = "1.9.4";

/// Renders a self-contained HTML page using Leaflet from a CDN
#[derive(Debug, Clone, Copy, Default)]
pub struct LeafletMapRenderer;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MapData<'a> {
    track: Vec<[f64; 2]>,
    track_color: &'a str,
    pois: Vec<MarkerData<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkerData<'a> {
    lat: f64,
    lon: f64,
    name: &'a str,
    km_from_start: f64,
    distance_km: f64,
    matching_filter: &'a str,
    website: &'a str,
    phone: &'a str,
    opening_hours: &'a str,
    color: &'a str,
}

impl MapRenderer for LeafletMapRenderer {
    fn render(
        &self,
        track: &[TrackPoint],
        rows: &[ResolvedPoi],
        colors: &ColorScheme,
        title: &str,
        path: &Path,
    ) -> Result<()> {
        let render_error = |reason: String| AlongTrackError::RenderFailure {
            path: path.display().to_string(),
            reason,
        };

        let data = MapData {
            track: track.iter().map(|p| [p.lat, p.lon]).collect(),
            track_color: &colors.track_color,
            pois: rows
                .iter()
                .map(|row| MarkerData {
                    lat: row.lat,
                    lon: row.lon,
                    name: &row.name,
                    km_from_start: row.km_from_start,
                    distance_km: row.distance_from_track_km,
                    matching_filter: &row.matching_filter,
                    website: &row.website,
                    phone: &row.phone,
                    opening_hours: &row.opening_hours,
                    color: colors.marker_color(&row.matching_filter),
                })
                .collect(),
        };

        let json = serde_json::to_string(&data).map_err(|e| render_error(e.to_string()))?;
        let html = render_page(title, &json);
        fs::write(path, html).map_err(|e| render_error(e.to_string()))?;

        tracing::debug!(path = %path.display(), markers = rows.len(), "Rendered map");
        Ok(())
    }

    fn extension(&self) -> &str {
        "html"
    }
}

fn render_page(title: &str, data_json: &str) -> String {
    PAGE_TEMPLATE
        .replace("{{LEAFLET_VERSION}}", LEAFLET_VERSION)
        .replace("{{TITLE}}", &escape_html(title))
        // Keep the embedded JSON from closing the script element
        .replace("{{DATA}}", &data_json.replace("</", "<\\/"))
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{TITLE}}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{{LEAFLET_VERSION}}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{{LEAFLET_VERSION}}/dist/leaflet.js"></script>
<style>
  html, body, #map { height: 100%; margin: 0; }
  .poi-popup b { display: inline-block; min-width: 9em; }
</style>
</head>
<body>
<div id="map"></div>
<script>
(function () {
  var data = {{DATA}};

  var osm = L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
    attribution: '&copy; OpenStreetMap contributors'
  });
  var topo = L.tileLayer('https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png', {
    attribution: '&copy; OpenStreetMap contributors, SRTM | Map style: &copy; OpenTopoMap'
  });
  var cyclosm = L.tileLayer('https://{s}.tile-cyclosm.openstreetmap.fr/cyclosm/{z}/{x}/{y}.png', {
    attribution: '&copy; OpenStreetMap contributors | CyclOSM'
  });

  var map = L.map('map', { layers: [osm] });
  L.control.scale({ position: 'bottomleft', imperial: false }).addTo(map);

  var trackLayer = L.layerGroup();
  var poiLayer = L.layerGroup();

  if (data.track.length > 0) {
    L.polyline(data.track, { color: data.trackColor, weight: 3, opacity: 0.8 }).addTo(trackLayer);
    L.circleMarker(data.track[0], { radius: 7, color: 'green', fillOpacity: 0.9 })
      .bindTooltip('Start').addTo(trackLayer);
    L.circleMarker(data.track[data.track.length - 1], { radius: 7, color: 'red', fillOpacity: 0.9 })
      .bindTooltip('End').addTo(trackLayer);
  }

  function line(container, label, value) {
    var row = document.createElement('div');
    var key = document.createElement('b');
    key.textContent = label;
    row.appendChild(key);
    if (value instanceof Node) {
      row.appendChild(value);
    } else {
      row.appendChild(document.createTextNode(String(value)));
    }
    container.appendChild(row);
  }

  data.pois.forEach(function (poi) {
    var popup = document.createElement('div');
    popup.className = 'poi-popup';
    var title = document.createElement('strong');
    title.textContent = poi.name;
    popup.appendChild(title);
    line(popup, 'Kilometers from start:', poi.kmFromStart);
    line(popup, 'Distance from track:', poi.distanceKm + ' km');
    line(popup, 'Filter:', poi.matchingFilter || 'N/A');
    if (/^https?:\/\//i.test(poi.website)) {
      var link = document.createElement('a');
      link.href = poi.website;
      link.target = '_blank';
      link.rel = 'noopener';
      link.textContent = poi.website;
      line(popup, 'Website:', link);
    } else {
      line(popup, 'Website:', poi.website);
    }
    line(popup, 'Phone:', poi.phone);
    line(popup, 'Opening hours:', poi.openingHours);

    L.circleMarker([poi.lat, poi.lon], {
      radius: 8,
      color: poi.color,
      fillColor: poi.color,
      fillOpacity: 0.8
    }).bindPopup(popup, { maxWidth: 300 }).addTo(poiLayer);
  });

  trackLayer.addTo(map);
  poiLayer.addTo(map);

  L.control.layers(
    { 'OpenStreetMap': osm, 'OpenTopoMap': topo, 'CyclOSM': cyclosm },
    { 'Track': trackLayer, 'Points of Interest': poiLayer },
    { collapsed: false }
  ).addTo(map);

  var bounds = data.track.concat(data.pois.map(function (p) { return [p.lat, p.lon]; }));
  if (bounds.length > 0) {
    map.fitBounds(bounds, { padding: [24, 24] });
  } else {
    map.setView([0, 0], 2);
  }
})();
</script>
</body>
</html>
"#;
