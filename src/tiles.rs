use std::f64::consts::PI;

use anyhow::Result;
use serde::Serialize;

/// Largest zoom whose tile indices still fit in a `u32`.
///
/// A probe range is bounded further: the zoom offset must keep the number of
/// tiles under one base tile within a `u64`, so an offset of 32 is rejected
/// by [`covering_range`].
pub const MAX_ZOOM: u8 = 32;

const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Inclusive rectangle of tiles at a single zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileRange {
    pub zoom: u8,
    pub min: TileCoord,
    pub max: TileCoord,
}

impl TileRange {
    pub fn width(&self) -> u64 {
        u64::from(self.max.x - self.min.x) + 1
    }

    pub fn height(&self) -> u64 {
        u64::from(self.max.y - self.min.y) + 1
    }

    /// Saturates instead of wrapping; ranges from [`covering_range`] never saturate.
    pub fn tile_count(&self) -> u64 {
        self.checked_tile_count().unwrap_or(u64::MAX)
    }

    pub fn checked_tile_count(&self) -> Option<u64> {
        self.width().checked_mul(self.height())
    }

    /// Every coordinate in the range, x outer and y inner.
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + Send + 'static {
        let (min, max) = (self.min, self.max);
        (min.x..=max.x).flat_map(move |x| (min.y..=max.y).map(move |y| TileCoord { x, y }))
    }
}

pub fn target_zoom(base_zoom: u8, offset: u8) -> Result<u8> {
    match base_zoom.checked_add(offset) {
        Some(zoom) if zoom <= MAX_ZOOM => Ok(zoom),
        _ => anyhow::bail!(
            "zoom {base_zoom} + offset {offset} exceeds the maximum zoom {MAX_ZOOM}"
        ),
    }
}

fn tiles_per_side(zoom: u8) -> u64 {
    1u64 << zoom
}

/// Web-mercator tile containing `(lon, lat)` at `zoom`.
pub fn tile_at(lon: f64, lat: f64, zoom: u8) -> TileCoord {
    let n = tiles_per_side(zoom) as f64;
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let fx = (lon + 180.0) / 360.0 * n;
    let fy = (1.0 - lat.tan().asinh() / PI) / 2.0 * n;
    TileCoord {
        x: clamp_index(fx, zoom),
        y: clamp_index(fy, zoom),
    }
}

fn clamp_index(value: f64, zoom: u8) -> u32 {
    let last = (tiles_per_side(zoom) - 1) as f64;
    value.floor().clamp(0.0, last) as u32
}

/// Descendants of `tile` (at `base_zoom`) at `target_zoom`.
///
/// When `target_zoom` equals `base_zoom` the range holds the tile itself.
pub fn covering_range(tile: TileCoord, base_zoom: u8, target_zoom: u8) -> Result<TileRange> {
    if target_zoom < base_zoom {
        anyhow::bail!("target zoom {target_zoom} is below base zoom {base_zoom}");
    }
    if target_zoom > MAX_ZOOM {
        anyhow::bail!("target zoom {target_zoom} exceeds the maximum zoom {MAX_ZOOM}");
    }
    let shift = target_zoom - base_zoom;
    let min_x = u64::from(tile.x) << shift;
    let min_y = u64::from(tile.y) << shift;
    let span = tiles_per_side(shift) - 1;
    let range = TileRange {
        zoom: target_zoom,
        min: TileCoord::new(min_x as u32, min_y as u32),
        max: TileCoord::new((min_x + span) as u32, (min_y + span) as u32),
    };
    if range.checked_tile_count().is_none() {
        anyhow::bail!(
            "zoom offset {shift} covers {}x{} tiles, more than a u64 can count",
            range.width(),
            range.height()
        );
    }
    Ok(range)
}

/// Tile range probed for a center point, base zoom and zoom offset.
pub fn probe_range(lon: f64, lat: f64, base_zoom: u8, offset: u8) -> Result<TileRange> {
    let zoom = target_zoom(base_zoom, offset)?;
    let center = tile_at(lon, lat, base_zoom);
    covering_range(center, base_zoom, zoom)
}

pub fn expand_url(template: &str, zoom: u8, coord: TileCoord) -> String {
    template
        .replace("{z}", &zoom.to_string())
        .replace("{x}", &coord.x.to_string())
        .replace("{y}", &coord.y.to_string())
}

pub fn missing_placeholders(template: &str) -> Vec<&'static str> {
    ["{z}", "{x}", "{y}"]
        .into_iter()
        .filter(|placeholder| !template.contains(placeholder))
        .collect()
}
