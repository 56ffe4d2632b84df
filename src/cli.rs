use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use crate::config::{FailurePolicy, ProbeConfig};
use crate::tiles::{missing_placeholders, probe_range};

#[derive(Debug, Parser)]
#[command(
    name = "vt-probe",
    version,
    about = "Fetch the vector tiles under a point and report size/feature statistics"
)]
pub struct Cli {
    /// Tile URL template with {z}, {x} and {y} placeholders
    #[arg(long)]
    pub url: String,

    /// Longitude in degrees
    #[arg(long, default_value_t = 120.0, allow_negative_numbers = true)]
    pub lon: f64,

    /// Latitude in degrees
    #[arg(long, default_value_t = 31.0, allow_negative_numbers = true)]
    pub lat: f64,

    /// Base zoom the point is projected at
    #[arg(long, default_value_t = 6)]
    pub zoom: u8,

    /// Levels below the base zoom to probe
    #[arg(long, default_value_t = 2)]
    pub offset: u8,

    /// Do not send 'Accept-Encoding: gzip'
    #[arg(long, default_value_t = false)]
    pub no_gzip: bool,

    /// Maximum concurrent requests (0 = one per tile)
    #[arg(long, default_value_t = 32)]
    pub concurrency: usize,

    /// Per-request timeout in seconds (0 = none)
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Report failed tiles instead of aborting on the first failure
    #[arg(long, default_value_t = false)]
    pub keep_going: bool,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub output: ReportFormat,

    #[arg(long, default_value_t = false)]
    pub no_progress: bool,

    /// Log level (error|warn|info|debug|trace)
    #[arg(long, default_value = "info")]
    pub log: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
    Ndjson,
}

impl Cli {
    pub fn to_config(&self) -> Result<ProbeConfig> {
        if self.url.trim().is_empty() {
            anyhow::bail!("--url must not be empty");
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            anyhow::bail!("--lon must be within [-180, 180], got {}", self.lon);
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            anyhow::bail!("--lat must be within [-90, 90], got {}", self.lat);
        }
        probe_range(self.lon, self.lat, self.zoom, self.offset)?;

        let missing = missing_placeholders(&self.url);
        if !missing.is_empty() {
            tracing::warn!(
                missing = %missing.join(","),
                "url template lacks placeholders; tiles will share URLs"
            );
        }

        Ok(ProbeConfig {
            url_template: self.url.clone(),
            lon: self.lon,
            lat: self.lat,
            base_zoom: self.zoom,
            zoom_offset: self.offset,
            gzip: !self.no_gzip,
            concurrency: self.concurrency,
            timeout: (self.timeout > 0).then(|| Duration::from_secs(self.timeout)),
            failure_policy: if self.keep_going {
                FailurePolicy::SkipFailed
            } else {
                FailurePolicy::FailFast
            },
            no_progress: self.no_progress,
        })
    }
}
