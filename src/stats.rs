use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::FailurePolicy;
use crate::fetch::TileResult;
use crate::tiles::{TileCoord, TileRange};

/// A running minimum or maximum and the tile it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Extremum {
    pub value: u64,
    pub at: TileCoord,
}

/// Running min/max/total over a stream of per-tile values.
///
/// Comparisons are strict, so on ties the first value observed is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueAccum {
    pub count: u64,
    pub total: u64,
    pub min: Option<Extremum>,
    pub max: Option<Extremum>,
}

impl ValueAccum {
    pub fn add(&mut self, value: u64, at: TileCoord) {
        self.count += 1;
        self.total += value;
        if self.min.is_none_or(|min| value < min.value) {
            self.min = Some(Extremum { value, at });
        }
        if self.max.is_none_or(|max| value > max.value) {
            self.max = Some(Extremum { value, at });
        }
    }

    pub fn into_stats(self) -> ValueStats {
        let avg = if self.count == 0 {
            0.0
        } else {
            self.total as f64 / self.count as f64
        };
        ValueStats {
            count: self.count,
            total: self.total,
            min: self.min,
            max: self.max,
            avg,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueStats {
    pub count: u64,
    pub total: u64,
    pub min: Option<Extremum>,
    pub max: Option<Extremum>,
    pub avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerStats {
    pub name: String,
    /// Number of tiles the layer appeared in.
    pub cover: u64,
    pub features: ValueStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedTile {
    pub coord: TileCoord,
    pub url: String,
    pub error: String,
}

/// Finalized statistics for one probe run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    pub zoom: u8,
    pub range: TileRange,
    pub expected_tiles: u64,
    pub tile_count: u64,
    pub size: ValueStats,
    pub features: ValueStats,
    pub layers: Vec<LayerStats>,
    pub failure_policy: FailurePolicy,
    pub failed_tiles: Vec<FailedTile>,
}

/// Single-owner fold of per-tile results into aggregate statistics.
#[derive(Debug)]
pub struct StatsReducer {
    range: TileRange,
    expected: u64,
    size: ValueAccum,
    features: ValueAccum,
    layers: BTreeMap<String, ValueAccum>,
    failed: Vec<FailedTile>,
}

impl StatsReducer {
    pub fn new(range: TileRange) -> Self {
        Self {
            range,
            expected: range.tile_count(),
            size: ValueAccum::default(),
            features: ValueAccum::default(),
            layers: BTreeMap::new(),
            failed: Vec::new(),
        }
    }

    pub fn expected(&self) -> u64 {
        self.expected
    }

    pub fn tile_count(&self) -> u64 {
        self.size.count
    }

    /// Outcomes consumed so far, successful or failed.
    pub fn processed(&self) -> u64 {
        self.size.count + self.failed.len() as u64
    }

    pub fn is_complete(&self) -> bool {
        self.processed() >= self.expected
    }

    pub fn apply(&mut self, result: TileResult) {
        let at = result.coord;
        self.size.add(result.byte_size, at);
        self.features.add(result.total_features, at);
        // A layer counts once per tile even if the payload repeats its name.
        let mut per_tile: BTreeMap<String, u64> = BTreeMap::new();
        for layer in result.layers {
            *per_tile.entry(layer.name).or_insert(0) += layer.feature_count;
        }
        for (name, count) in per_tile {
            self.layers.entry(name).or_default().add(count, at);
        }
    }

    pub fn record_failure(&mut self, failure: FailedTile) {
        self.failed.push(failure);
    }

    pub fn finish(self, failure_policy: FailurePolicy) -> ProbeReport {
        // BTreeMap iteration already yields layers in byte order of their names.
        let layers = self
            .layers
            .into_iter()
            .map(|(name, accum)| LayerStats {
                name,
                cover: accum.count,
                features: accum.into_stats(),
            })
            .collect();
        ProbeReport {
            zoom: self.range.zoom,
            range: self.range,
            expected_tiles: self.expected,
            tile_count: self.size.count,
            size: self.size.into_stats(),
            features: self.features.into_stats(),
            layers,
            failure_policy,
            failed_tiles: self.failed,
        }
    }
}
