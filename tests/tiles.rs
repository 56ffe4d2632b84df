use vt_probe::tiles::{
    TileCoord, TileRange, covering_range, expand_url, missing_placeholders, probe_range,
    target_zoom, tile_at,
};

#[test]
fn tile_at_matches_known_tiles() {
    assert_eq!(tile_at(0.0, 0.0, 0), TileCoord::new(0, 0));
    assert_eq!(tile_at(0.0, 0.0, 1), TileCoord::new(1, 1));
    assert_eq!(tile_at(139.7, 35.68, 10), TileCoord::new(909, 403));
    assert_eq!(tile_at(120.0, 31.0, 6), TileCoord::new(53, 26));
}

#[test]
fn tile_at_clamps_edges() {
    assert_eq!(tile_at(180.0, -90.0, 2), TileCoord::new(3, 3));
    assert_eq!(tile_at(-180.0, 90.0, 2), TileCoord::new(0, 0));
}

#[test]
fn covering_range_lists_descendants() {
    let range = covering_range(TileCoord::new(53, 26), 6, 8).expect("range");
    assert_eq!(range.zoom, 8);
    assert_eq!(range.min, TileCoord::new(212, 104));
    assert_eq!(range.max, TileCoord::new(215, 107));
    assert_eq!(range.tile_count(), 16);
}

#[test]
fn covering_range_without_offset_is_the_tile_itself() {
    let range = covering_range(TileCoord::new(5, 9), 4, 4).expect("range");
    assert_eq!(range.min, range.max);
    assert_eq!(range.tile_count(), 1);
    assert_eq!(range.coords().collect::<Vec<_>>(), vec![TileCoord::new(5, 9)]);
}

#[test]
fn covering_range_rejects_lower_target_zoom() {
    let err = covering_range(TileCoord::new(0, 0), 5, 4).expect_err("lower zoom");
    assert!(err.to_string().contains("below base zoom"));
}

#[test]
fn target_zoom_rejects_unrepresentable_zoom() {
    assert_eq!(target_zoom(6, 2).expect("zoom"), 8);
    assert_eq!(target_zoom(30, 2).expect("zoom"), 32);
    assert!(target_zoom(30, 3).is_err());
    assert!(target_zoom(200, 100).is_err());
}

#[test]
fn coords_walk_every_tile_once() {
    let range = TileRange {
        zoom: 3,
        min: TileCoord::new(2, 4),
        max: TileCoord::new(4, 5),
    };
    let coords: Vec<_> = range.coords().collect();
    assert_eq!(coords.len() as u64, range.tile_count());
    assert_eq!(coords.first(), Some(&TileCoord::new(2, 4)));
    assert_eq!(coords[1], TileCoord::new(2, 5));
    assert_eq!(coords.last(), Some(&TileCoord::new(4, 5)));
    let mut unique = coords.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), coords.len());
}

#[test]
fn probe_range_uses_base_tile_and_offset() {
    let range = probe_range(120.0, 31.0, 6, 2).expect("range");
    assert_eq!(range.zoom, 8);
    assert_eq!(range.min, TileCoord::new(212, 104));
    assert_eq!(range.tile_count(), 16);
}

#[test]
fn expand_url_replaces_every_placeholder() {
    let url = expand_url(
        "https://tiles.test/{z}/{x}/{y}.pbf?z={z}",
        12,
        TileCoord::new(3639, 1612),
    );
    assert_eq!(url, "https://tiles.test/12/3639/1612.pbf?z=12");
}

#[test]
fn missing_placeholders_reports_absent_ones() {
    assert!(missing_placeholders("https://t/{z}/{x}/{y}").is_empty());
    assert_eq!(missing_placeholders("https://t/{z}/{x}"), vec!["{y}"]);
}

#[test]
fn probe_range_rejects_offset_whose_tile_count_overflows() {
    let err = probe_range(0.0, 0.0, 0, 32).expect_err("2^64 tiles cannot be counted");
    assert!(err.to_string().contains("more than a u64 can count"), "{err}");

    let widest = probe_range(0.0, 0.0, 0, 31).expect("range");
    assert_eq!(widest.tile_count(), 1u64 << 62);
}

#[test]
fn tile_count_saturates_instead_of_wrapping() {
    let range = TileRange {
        zoom: 32,
        min: TileCoord::new(0, 0),
        max: TileCoord::new(u32::MAX, u32::MAX),
    };
    assert_eq!(range.checked_tile_count(), None);
    assert_eq!(range.tile_count(), u64::MAX);
}
