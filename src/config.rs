use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the run on the first failed tile.
    #[default]
    FailFast,
    /// Record failed tiles in the report and keep going.
    SkipFailed,
}

/// Everything a probe run needs; passed explicitly into [`crate::probe::run_probe`].
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// URL with `{z}`, `{x}` and `{y}` placeholders.
    pub url_template: String,
    pub lon: f64,
    pub lat: f64,
    pub base_zoom: u8,
    pub zoom_offset: u8,
    /// Send `Accept-Encoding: gzip` and decompress gzip responses.
    pub gzip: bool,
    /// Maximum concurrent fetches. `0` starts one worker per tile.
    pub concurrency: usize,
    pub timeout: Option<Duration>,
    pub failure_policy: FailurePolicy,
    pub no_progress: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url_template: String::new(),
            lon: 120.0,
            lat: 31.0,
            base_zoom: 6,
            zoom_offset: 2,
            gzip: true,
            concurrency: 32,
            timeout: Some(Duration::from_secs(30)),
            failure_policy: FailurePolicy::FailFast,
            no_progress: false,
        }
    }
}

impl ProbeConfig {
    pub fn worker_count(&self, tile_count: u64) -> usize {
        let tiles = usize::try_from(tile_count).unwrap_or(usize::MAX);
        match self.concurrency {
            0 => tiles,
            limit => limit.min(tiles),
        }
    }
}
