use anyhow::Result;
use serde_json::json;

use crate::stats::{Extremum, ProbeReport, ValueStats};

const COLUMN_PADDING: usize = 2;
const INDENT: &str = "  ";

/// Pads every cell but the last of each row to its column's widest cell.
pub fn align_columns(rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = Vec::new();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(idx) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }
    rows.iter()
        .map(|row| {
            let mut line = String::from(INDENT);
            for (idx, cell) in row.iter().enumerate() {
                if idx + 1 == row.len() {
                    line.push_str(cell);
                } else {
                    let width = widths[idx] + COLUMN_PADDING;
                    line.push_str(&format!("{cell:<width$}"));
                }
            }
            line
        })
        .collect()
}

fn value_cell(extremum: Option<Extremum>) -> String {
    extremum.map_or_else(|| "-".to_string(), |e| e.value.to_string())
}

fn at_cell(extremum: Option<Extremum>) -> String {
    extremum.map_or_else(|| "-".to_string(), |e| e.at.to_string())
}

fn stats_row(stats: &ValueStats) -> Vec<String> {
    vec![
        value_cell(stats.min),
        at_cell(stats.min),
        value_cell(stats.max),
        at_cell(stats.max),
        format!("{:.2}", stats.avg),
    ]
}

fn header(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|cell| cell.to_string()).collect()
}

pub fn format_tile_section(report: &ProbeReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Tile(zoom={}, count={}):",
        report.zoom, report.tile_count
    )];
    let rows = vec![
        header(&["MinSize", "MinSizeAt", "MaxSize", "MaxSizeAt", "AvgSize"]),
        stats_row(&report.size),
        header(&[
            "MinFeatures",
            "MinFeaturesAt",
            "MaxFeatures",
            "MaxFeaturesAt",
            "AvgFeatures",
        ]),
        stats_row(&report.features),
    ];
    lines.extend(align_columns(&rows));
    lines
}

pub fn format_layer_section(report: &ProbeReport) -> Vec<String> {
    let mut lines = vec![format!("Layers(count={}):", report.layers.len())];
    let mut rows = vec![header(&[
        "Layer",
        "Cover",
        "MinCount",
        "MinCountAt",
        "MaxCount",
        "MaxCountAt",
        "AvgCount",
    ])];
    for layer in report.layers.iter() {
        let mut row = vec![layer.name.clone(), layer.cover.to_string()];
        row.extend(stats_row(&layer.features));
        rows.push(row);
    }
    lines.extend(align_columns(&rows));
    lines
}

pub fn format_failed_section(report: &ProbeReport) -> Vec<String> {
    if report.failed_tiles.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!(
        "Failed(count={}, expected={}):",
        report.failed_tiles.len(),
        report.expected_tiles
    )];
    for failed in report.failed_tiles.iter() {
        lines.push(format!("{INDENT}{} {}", failed.coord, failed.error));
    }
    lines
}

pub fn format_report_text(report: &ProbeReport) -> Vec<String> {
    let mut lines = format_tile_section(report);
    lines.extend(format_layer_section(report));
    lines.extend(format_failed_section(report));
    lines
}

pub fn ndjson_lines(report: &ProbeReport) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    lines.push(serde_json::to_string(&json!({
        "type": "summary",
        "zoom": report.zoom,
        "range": report.range,
        "expected_tiles": report.expected_tiles,
        "tile_count": report.tile_count,
        "size": report.size,
        "features": report.features,
        "failure_policy": report.failure_policy,
    }))?);

    for layer in report.layers.iter() {
        lines.push(serde_json::to_string(&json!({
            "type": "layer",
            "layer": layer,
        }))?);
    }

    for failed in report.failed_tiles.iter() {
        lines.push(serde_json::to_string(&json!({
            "type": "failed_tile",
            "tile": failed,
        }))?);
    }

    Ok(lines)
}
