//! Frame gap monitor.
//!
//! Runs on the host render context: for every frame signal it does gap
//! arithmetic and at most one non-blocking channel send. Nothing here may
//! block, allocate per frame, or panic into the host.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::log::NotifierCommand;

/// Nominal frame interval at 60 Hz, in milliseconds. The skipped-frame
/// estimate divides the observed gap by this literal regardless of the
/// host's actual refresh rate.
pub const FRAME_INTERVAL_MS: f64 = 16.6;

/// Per-frame stall detector.
///
/// The host delivers one monotonically non-decreasing timestamp per drawn
/// frame via [`FrameMonitor::on_frame_signal`] and re-subscribes for the
/// next frame while it returns `true` — a self-perpetuating one-shot
/// subscription, cancelled by the exit flag rather than by unregistering.
#[derive(Debug)]
pub struct FrameMonitor {
    min_skip_frame_count: u32,
    started: AtomicBool,
    last_frame_nanos: AtomicU64,
    /// Session-wide stop flag, shared with the notifier and executor loops.
    exit: Arc<AtomicBool>,
    notifier_tx: Sender<NotifierCommand>,
}

impl FrameMonitor {
    pub(crate) fn new(
        min_skip_frame_count: u32,
        notifier_tx: Sender<NotifierCommand>,
        exit: Arc<AtomicBool>,
    ) -> Self {
        Self {
            min_skip_frame_count,
            started: AtomicBool::new(false),
            last_frame_nanos: AtomicU64::new(0),
            exit,
            notifier_tx,
        }
    }

    /// Handle one frame signal with a monotonic nanosecond timestamp.
    ///
    /// The first signal records the baseline and arms periodic collection;
    /// no stall evaluation happens for it. Every later signal estimates the
    /// number of skipped frames from the gap to the previous signal and
    /// fires a flush-and-restart when the estimate exceeds the configured
    /// threshold. The trigger is fire-and-forget: this never waits for the
    /// flush to complete.
    ///
    /// Returns `true` while the host should keep delivering signals.
    pub fn on_frame_signal(&self, frame_time_nanos: u64) -> bool {
        if self.exit.load(Ordering::Acquire) {
            return false;
        }

        if !self.started.swap(true, Ordering::AcqRel) {
            self.last_frame_nanos
                .store(frame_time_nanos, Ordering::Release);
            let _ = self.notifier_tx.send(NotifierCommand::StartCollection);
        } else {
            let last = self
                .last_frame_nanos
                .swap(frame_time_nanos, Ordering::AcqRel);
            let delta_ms = frame_time_nanos.saturating_sub(last) / 1_000_000;
            let skipped = (delta_ms as f64 / FRAME_INTERVAL_MS) as u64;
            if skipped > u64::from(self.min_skip_frame_count) {
                let _ = self.notifier_tx.send(NotifierCommand::FlushAndRestart);
            }
        }

        !self.exit.load(Ordering::Acquire)
    }

    /// Flip the session-wide stop flag. Signals already in flight are
    /// ignored on arrival, and the notifier and executor loops skip any
    /// commands still queued for them.
    pub(crate) fn request_exit(&self) {
        self.exit.store(true, Ordering::Release);
    }
}
