//! Dashboard page served at `/`.
//!
//! Kept as a `&'static str` so the binary needs no asset directory. The script
//! fetches `/api/map`, draws its layers with Leaflet and posts marker clicks to
//! `/select`, tagging each request with a per-tab session id.

pub const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Case Atlas</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
  <style>
    body { margin: 0; font-family: system-ui, sans-serif; }
    #layout { display: flex; height: 100vh; }
    #map { width: 70%; height: 80vh; }
    #side { width: 30%; display: flex; flex-direction: column; }
    #info-box { height: 50%; padding: 20px; font-size: 18px; border-bottom: 1px solid #ccc; overflow: auto; }
    #extra-info { height: 50%; padding: 20px; font-size: 16px; overflow: auto; }
    .region-label { font-size: 12px; color: black; white-space: nowrap; background: none; border: none; }
    .detail dt { font-weight: 600; }
    .detail dd { margin: 0 0 6px 0; }
    .firm-table { border-collapse: collapse; width: 100%; }
    .firm-table th, .firm-table td { border: 1px solid #ddd; padding: 4px 8px; text-align: left; }
    .placeholder { color: #666; }
  </style>
</head>
<body>
  <div id="layout">
    <div id="map"></div>
    <div id="side">
      <div id="info-box"></div>
      <div id="extra-info"></div>
    </div>
  </div>
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <script>
    function sessionId() {
      let id = sessionStorage.getItem('case-atlas-session');
      if (!id) {
        id = (window.crypto && crypto.randomUUID) ? crypto.randomUUID()
          : String(Date.now()) + Math.random().toString(16).slice(2);
        sessionStorage.setItem('case-atlas-session', id);
      }
      return id;
    }

    function showPanels(data) {
      document.getElementById('info-box').innerHTML = data.detail_html;
      document.getElementById('extra-info').innerHTML = data.table_html;
    }

    function select(marker) {
      fetch('/select', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json', 'x-session-id': sessionId() },
        body: JSON.stringify({
          case: marker.case, lat: marker.lat, lon: marker.lon,
          district: marker.district, firm: marker.firm, url: marker.url,
        }),
      }).then(r => r.json()).then(showPanels);
    }

    fetch('/api/selection', { headers: { 'x-session-id': sessionId() } })
      .then(r => r.json()).then(showPanels);

    fetch('/api/map').then(r => r.json()).then(view => {
      const map = L.map('map').setView([view.center.lat, view.center.lon], view.zoom);
      L.tileLayer(view.basemap.tile_url, { attribution: view.basemap.attribution }).addTo(map);

      for (const layer of view.layers) {
        if (layer.kind === 'region_fill') {
          L.geoJSON(layer.geojson, {
            interactive: false,
            style: () => ({
              fillColor: '#636efa', fillOpacity: layer.fill_opacity,
              color: layer.line_color, weight: layer.line_width,
            }),
          }).addTo(map);
        } else if (layer.kind === 'region_labels') {
          for (const label of layer.labels) {
            L.marker([label.lat, label.lon], {
              interactive: false,
              icon: L.divIcon({
                className: 'region-label',
                html: '<span style="font-size:' + layer.font_size + 'px;color:' + layer.color + '"></span>',
              }),
            }).addTo(map).getElement().firstChild.textContent = label.text;
          }
        } else if (layer.kind === 'case_markers') {
          for (const marker of layer.markers) {
            L.circleMarker([marker.lat, marker.lon], {
              radius: layer.size / 2, color: layer.color, fillColor: layer.color, fillOpacity: 1,
            })
              .bindTooltip(marker.hover)
              .on('click', () => select(marker))
              .addTo(map);
          }
        }
      }
    });
  </script>
</body>
</html>
"#;

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
