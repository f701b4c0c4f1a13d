//! Snapshot polling.
//!
//! One background task drives the whole refresh pipeline: fetch `/api/data`,
//! decode it, and hand the result to the UI thread over a channel. The first
//! fetch fires immediately at startup, then ticks repeat on the fixed poll
//! interval.
//!
//! Ticks are serialized on purpose: the task awaits each fetch before waiting
//! for the next tick, so at most one request is ever in flight and snapshots
//! arrive in issue order. Ticks that pile up behind a slow fetch are skipped,
//! not replayed. (The behavior this replaces was a fire-and-forget timer with
//! last-to-complete-wins races under slow networks.)
//!
//! A failed tick is logged and skipped whole; the UI keeps its previous
//! render and the next periodic tick is the only retry.

use std::sync::mpsc;

use tokio::runtime::Runtime;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use tracing::warn;

use crate::consts::FETCH_TIMEOUT;
use crate::consts::POLL_INTERVAL;
use crate::error::ConsoleError;
use crate::snapshot::Snapshot;

/// What the UI drains out of the poll channel each frame.
#[derive(Default)]
pub struct DrainOutcome {
    /// Newest snapshot waiting in the channel, if any. Older queued
    /// snapshots are superseded and dropped.
    pub snapshot: Option<Snapshot>,
    /// Failed ticks seen during this drain.
    pub failures: usize,
}

/// Spawn the poll task. Results come back on the returned channel; the task
/// exits once the receiver is dropped.
pub fn start_poll_task(
    runtime: &Runtime,
    base_url: &str,
    ctx: egui::Context,
) -> mpsc::Receiver<Result<Snapshot, ConsoleError>> {
    let (tx, rx) = mpsc::channel();
    let url = format!("{base_url}/api/data");
    runtime.spawn(poll_loop(url, tx, ctx));
    rx
}

async fn poll_loop(
    url: String,
    tx: mpsc::Sender<Result<Snapshot, ConsoleError>>,
    ctx: egui::Context,
) {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .expect("failed to build snapshot http client");

    let mut interval = tokio::time::interval(POLL_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        // First tick completes immediately, giving the startup fetch.
        interval.tick().await;

        let result = fetch_snapshot(&client, &url).await;
        match &result {
            Ok(snapshot) => {
                debug!("fetched snapshot with {} locations", snapshot.locations.len());
            }
            Err(e) => warn!("skipping refresh tick: {e}"),
        }

        if tx.send(result).is_err() {
            // UI is gone.
            break;
        }
        ctx.request_repaint();
    }
}

async fn fetch_snapshot(client: &reqwest::Client, url: &str) -> Result<Snapshot, ConsoleError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(ConsoleError::UnexpectedStatus(response.status()));
    }

    // Decode failures are classified separately from transport failures, so
    // pull the body first instead of using the json() shortcut.
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Drain every pending poll result without blocking. Failed ticks never
/// reach a renderer; several queued successes collapse to the newest one.
pub fn drain_poll_results(
    rx: &mpsc::Receiver<Result<Snapshot, ConsoleError>>,
) -> DrainOutcome {
    let mut outcome = DrainOutcome::default();
    while let Ok(result) = rx.try_recv() {
        match result {
            Ok(snapshot) => outcome.snapshot = Some(snapshot),
            Err(_) => outcome.failures += 1,
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::VehicleDistribution;

    fn snapshot(total: u64) -> Snapshot {
        Snapshot {
            total_vehicles: total,
            distribution: VehicleDistribution::default(),
            locations: Vec::new(),
        }
    }

    fn decode_error() -> ConsoleError {
        ConsoleError::Decode(serde_json::from_str::<Snapshot>("not json").unwrap_err())
    }

    #[test]
    fn drain_returns_newest_pending_snapshot() {
        let (tx, rx) = mpsc::channel();
        tx.send(Ok(snapshot(1))).unwrap();
        tx.send(Ok(snapshot(2))).unwrap();
        tx.send(Ok(snapshot(3))).unwrap();

        let outcome = drain_poll_results(&rx);
        assert_eq!(outcome.snapshot.unwrap().total_vehicles, 3);
        assert_eq!(outcome.failures, 0);
    }

    #[test]
    fn failed_ticks_are_counted_but_never_rendered() {
        let (tx, rx) = mpsc::channel();
        tx.send(Ok(snapshot(1))).unwrap();
        tx.send(Err(decode_error())).unwrap();

        let outcome = drain_poll_results(&rx);
        // The failure does not erase the earlier good snapshot...
        assert_eq!(outcome.snapshot.unwrap().total_vehicles, 1);
        assert_eq!(outcome.failures, 1);

        // ...and a failure alone produces nothing to render.
        tx.send(Err(decode_error())).unwrap();
        let outcome = drain_poll_results(&rx);
        assert!(outcome.snapshot.is_none());
        assert_eq!(outcome.failures, 1);
    }

    #[test]
    fn empty_channel_drains_to_nothing() {
        let (_tx, rx) = mpsc::channel::<Result<Snapshot, ConsoleError>>();
        let outcome = drain_poll_results(&rx);
        assert!(outcome.snapshot.is_none());
        assert_eq!(outcome.failures, 0);
    }
}
