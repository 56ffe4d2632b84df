use std::time::Duration;

use clap::{CommandFactory, Parser};

use vt_probe::cli::{Cli, ReportFormat};
use vt_probe::config::FailurePolicy;

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn parse_minimal_uses_defaults() {
    let cli = Cli::parse_from(["vt-probe", "--url", "https://t/{z}/{x}/{y}.pbf"]);
    assert_eq!(cli.lon, 120.0);
    assert_eq!(cli.lat, 31.0);
    assert_eq!(cli.zoom, 6);
    assert_eq!(cli.offset, 2);
    assert!(!cli.no_gzip);
    assert_eq!(cli.concurrency, 32);
    assert_eq!(cli.timeout, 30);
    assert!(!cli.keep_going);
    assert_eq!(cli.output, ReportFormat::Text);
    assert_eq!(cli.log, "info");

    let config = cli.to_config().expect("config");
    assert!(config.gzip);
    assert_eq!(config.base_zoom, 6);
    assert_eq!(config.zoom_offset, 2);
    assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    assert_eq!(config.failure_policy, FailurePolicy::FailFast);
}

#[test]
fn parse_all_options() {
    let cli = Cli::parse_from([
        "vt-probe",
        "--url",
        "https://t/{z}/{x}/{y}.pbf",
        "--lon",
        "-73.98",
        "--lat",
        "-40.5",
        "--zoom",
        "10",
        "--offset",
        "3",
        "--no-gzip",
        "--concurrency",
        "0",
        "--timeout",
        "0",
        "--keep-going",
        "--output",
        "ndjson",
        "--no-progress",
        "--log",
        "debug",
    ]);
    assert_eq!(cli.output, ReportFormat::Ndjson);
    let config = cli.to_config().expect("config");
    assert_eq!(config.lon, -73.98);
    assert_eq!(config.lat, -40.5);
    assert!(!config.gzip);
    assert_eq!(config.concurrency, 0);
    assert_eq!(config.timeout, None);
    assert_eq!(config.failure_policy, FailurePolicy::SkipFailed);
    assert!(config.no_progress);
    assert_eq!(config.worker_count(64), 64);
}

#[test]
fn url_is_required() {
    assert!(Cli::try_parse_from(["vt-probe"]).is_err());
}

#[test]
fn to_config_rejects_out_of_range_values() {
    let cli = Cli::parse_from(["vt-probe", "--url", "u/{z}/{x}/{y}", "--lat", "91"]);
    assert!(cli.to_config().is_err());
    let cli = Cli::parse_from(["vt-probe", "--url", "u/{z}/{x}/{y}", "--lon", "-181"]);
    assert!(cli.to_config().is_err());
    let cli = Cli::parse_from(["vt-probe", "--url", " "]);
    assert!(cli.to_config().is_err());
    let cli = Cli::parse_from(["vt-probe", "--url", "u/{z}/{x}/{y}", "--zoom", "30", "--offset", "4"]);
    let err = cli.to_config().expect_err("zoom overflow");
    assert!(err.to_string().contains("maximum zoom"));
}

#[test]
fn worker_count_never_exceeds_tile_count() {
    let cli = Cli::parse_from(["vt-probe", "--url", "u/{z}/{x}/{y}", "--concurrency", "8"]);
    let config = cli.to_config().expect("config");
    assert_eq!(config.worker_count(3), 3);
    assert_eq!(config.worker_count(100), 8);
}

#[test]
fn to_config_rejects_uncountable_tile_range() {
    let cli = Cli::parse_from(["vt-probe", "--url", "u/{z}/{x}/{y}", "--zoom", "0", "--offset", "32"]);
    let err = cli.to_config().expect_err("tile count overflow");
    assert!(err.to_string().contains("more than a u64 can count"), "{err}");
}
