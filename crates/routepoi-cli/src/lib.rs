//! Argument parsing helpers for the `routepoi` command-line tool.

use anyhow::{bail, Context, Result};
use routepoi_core::{LatLng, MapBounds};

/// Parse `"lat,lng;lat,lng;..."` into coordinates.
pub fn parse_coords(text: &str) -> Result<Vec<LatLng>> {
    text.split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (lat, lng) = pair
                .split_once(',')
                .with_context(|| format!("expected 'lat,lng', got '{}'", pair))?;
            let lat: f64 = lat
                .trim()
                .parse()
                .with_context(|| format!("invalid latitude in '{}'", pair))?;
            let lng: f64 = lng
                .trim()
                .parse()
                .with_context(|| format!("invalid longitude in '{}'", pair))?;
            Ok(LatLng::new(lat, lng))
        })
        .collect()
}

/// Parse an Overpass-ordered `"S,W,N,E"` bounding box.
pub fn parse_bbox(text: &str) -> Result<MapBounds> {
    let values = text
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("invalid bounding box '{}'", text))?;
    let [south, west, north, east] = values[..] else {
        bail!("bounding box needs four values S,W,N,E, got {}", values.len());
    };
    let bounds = MapBounds {
        north,
        south,
        east,
        west,
    };
    bounds.validate()?;
    Ok(bounds)
}

/// One `lat,lng` line per coordinate, 6 decimals.
pub fn format_coords(coords: &[LatLng]) -> String {
    coords
        .iter()
        .map(|c| format!("{:.6},{:.6}", c.lat, c.lng))
        .collect::<Vec<_>>()
        .join("\n")
}
