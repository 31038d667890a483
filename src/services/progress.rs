//! Simulated upload progress.
//!
//! The contents API accepts the whole file in one request and reports no
//! transfer progress, so the value shown while uploading is cosmetic: it
//! creeps up by a random step on a fixed tick, stays below a cap while the
//! request is in flight, and only jumps to 100 once the request has actually
//! completed.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::models::upload::UploadStatus;

/// Tick interval of the simulated progress, in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 200;
/// Largest increment applied on one tick, in percent.
pub const MAX_STEP: f64 = 15.0;
/// Ceiling while the upload request is still in flight, in percent.
pub const PROGRESS_CAP: f64 = 85.0;

/// Observer for upload state changes and progress values.
///
/// Implemented by the presentation layer; both methods default to no-ops.
pub trait UploadReporter: Send + Sync {
    fn status(&self, _status: &UploadStatus) {}
    fn progress(&self, _percent: f64) {}
}

/// Reporter that ignores everything.
pub struct NoopReporter;

impl UploadReporter for NoopReporter {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressPolicy {
    pub tick_ms: u64,
    pub max_step: f64,
    pub cap: f64,
}

impl Default for ProgressPolicy {
    fn default() -> Self {
        Self {
            tick_ms: TICK_INTERVAL_MS,
            max_step: MAX_STEP,
            cap: PROGRESS_CAP,
        }
    }
}

/// How the simulated progress ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEnd {
    /// Request finished: snap to 100.
    Complete,
    /// Request failed: back to 0.
    Reset,
}

/// Advance `current` by a non-negative `step`, never past `cap`.
pub fn advance(current: f64, step: f64, cap: f64) -> f64 {
    (current + step.max(0.0)).min(cap).max(current)
}

/// Background ticker driving an [`UploadReporter`].
pub struct SimulatedProgress {
    stop: oneshot::Sender<ProgressEnd>,
    handle: JoinHandle<()>,
}

impl SimulatedProgress {
    /// Report 0 and start ticking on the current tokio runtime.
    pub fn start(policy: ProgressPolicy, reporter: Arc<dyn UploadReporter>) -> Self {
        let (stop, mut stop_rx) = oneshot::channel::<ProgressEnd>();
        let handle = tokio::spawn(async move {
            let mut current = 0.0;
            reporter.progress(current);

            let mut ticker = tokio::time::interval(Duration::from_millis(policy.tick_ms.max(1)));
            // The first tick of an interval completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    end = &mut stop_rx => {
                        let last = match end {
                            Ok(ProgressEnd::Complete) => 100.0,
                            Ok(ProgressEnd::Reset) | Err(_) => 0.0,
                        };
                        reporter.progress(last);
                        break;
                    }
                    _ = ticker.tick() => {
                        let step = if policy.max_step > 0.0 {
                            rand::thread_rng().gen_range(0.0..policy.max_step)
                        } else {
                            0.0
                        };
                        current = advance(current, step, policy.cap);
                        reporter.progress(current);
                    }
                }
            }
        });
        Self { stop, handle }
    }

    /// Stop ticking and report the final value. Returns once the final
    /// value has been delivered, so no tick can follow it.
    pub async fn finish(self, end: ProgressEnd) {
        let _ = self.stop.send(end);
        if let Err(e) = self.handle.await {
            log::warn!("Progress ticker ended abnormally: {}", e);
        }
    }
}
