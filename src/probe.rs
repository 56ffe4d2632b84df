use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info, warn};

use crate::config::{FailurePolicy, ProbeConfig};
use crate::error::FetchError;
use crate::fetch::{HttpClient, ReqwestClient, TileResult, fetch_tile};
use crate::progress::{ProgressTracker, progress_for_run};
use crate::stats::{FailedTile, ProbeReport, StatsReducer};
use crate::tiles::{TileCoord, TileRange, probe_range};

const MAX_QUEUED_COORDS: usize = 4096;

struct TileOutcome {
    coord: TileCoord,
    result: Result<TileResult, FetchError>,
}

/// Probe the tile service described by `config` over HTTP.
pub fn probe(config: &ProbeConfig) -> Result<ProbeReport> {
    let client = ReqwestClient::new(config.timeout)?;
    run_probe(config, &client)
}

/// Fetch every tile of the probe range through `client` and reduce the results.
///
/// Workers only ever hand results to the reducer over a channel; the
/// aggregate state lives on the calling thread. Under
/// [`FailurePolicy::FailFast`] the first failure cancels the run and no
/// report is produced.
pub fn run_probe(config: &ProbeConfig, client: &dyn HttpClient) -> Result<ProbeReport> {
    let range = probe_range(config.lon, config.lat, config.base_zoom, config.zoom_offset)?;
    let tile_count = range.tile_count();
    let workers = config.worker_count(tile_count);
    info!(
        zoom = range.zoom,
        min = %range.min,
        max = %range.max,
        tiles = tile_count,
        workers,
        gzip = config.gzip,
        "probing tiles"
    );

    let cancel = AtomicBool::new(false);
    let queue = workers.saturating_mul(2).min(MAX_QUEUED_COORDS);
    let (job_tx, job_rx) = crossbeam_channel::bounded::<TileCoord>(queue);
    let (result_tx, result_rx) = crossbeam_channel::unbounded::<TileOutcome>();
    let mut reducer = StatsReducer::new(range);
    let mut progress = progress_for_run("fetching tiles", tile_count, config.no_progress);

    let outcome = thread::scope(|scope| -> Result<()> {
        let cancel = &cancel;
        scope.spawn(move || feed_coords(range, job_tx, cancel));

        for index in 0..workers {
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("fetch-{index}"))
                .spawn_scoped(scope, move || {
                    fetch_worker(client, config, range.zoom, jobs, results, cancel)
                });
            if let Err(err) = spawned {
                cancel.store(true, Ordering::Relaxed);
                return Err(err).context(format!("failed to start fetch worker {index}"));
            }
        }
        drop(job_rx);
        drop(result_tx);

        let reduced = reduce(&mut reducer, result_rx, config.failure_policy, range, &mut progress);
        if reduced.is_err() {
            cancel.store(true, Ordering::Relaxed);
        }
        reduced
    });
    progress.finish();
    outcome?;

    let report = reducer.finish(config.failure_policy);
    info!(
        tiles = report.tile_count,
        failed = report.failed_tiles.len(),
        layers = report.layers.len(),
        total_bytes = report.size.total,
        "probe finished"
    );
    Ok(report)
}

fn feed_coords(range: TileRange, jobs: Sender<TileCoord>, cancel: &AtomicBool) {
    for coord in range.coords() {
        if cancel.load(Ordering::Relaxed) {
            debug!("coordinate feed cancelled");
            break;
        }
        if jobs.send(coord).is_err() {
            break;
        }
    }
}

fn fetch_worker(
    client: &dyn HttpClient,
    config: &ProbeConfig,
    zoom: u8,
    jobs: Receiver<TileCoord>,
    results: Sender<TileOutcome>,
    cancel: &AtomicBool,
) {
    for coord in jobs.iter() {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        let result = fetch_tile(client, &config.url_template, zoom, coord, config.gzip);
        if results.send(TileOutcome { coord, result }).is_err() {
            break;
        }
    }
}

fn reduce(
    reducer: &mut StatsReducer,
    results: Receiver<TileOutcome>,
    policy: FailurePolicy,
    range: TileRange,
    progress: &mut ProgressTracker,
) -> Result<()> {
    while !reducer.is_complete() {
        let Ok(outcome) = results.recv() else {
            anyhow::bail!(
                "result stream closed after {} of {} tiles",
                reducer.processed(),
                reducer.expected()
            );
        };
        let TileOutcome { coord, result } = outcome;
        match result {
            Ok(tile) => {
                reducer.apply(tile);
                progress.tile_done();
            }
            Err(err) => match policy {
                FailurePolicy::FailFast => {
                    return Err(err).with_context(|| {
                        format!("failed to fetch tile {}/{}/{}", range.zoom, coord.x, coord.y)
                    });
                }
                FailurePolicy::SkipFailed => {
                    warn!(x = coord.x, y = coord.y, error = %err, "skipping failed tile");
                    reducer.record_failure(FailedTile {
                        coord,
                        url: err.url().to_string(),
                        error: err.to_string(),
                    });
                    progress.tile_failed();
                }
            },
        }
    }
    Ok(())
}
