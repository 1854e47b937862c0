//! Watcher facade.
//!
//! [`JankWatcher`] owns the validated configuration and the lifecycle of
//! the monitor, notifier and executor. At most one session watches at a
//! time; `start` and `stop` are both idempotent.

use std::sync::atomic::AtomicBool;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::config::{ConfigError, WatchConfig};
use crate::log::{Command, LogExecutor, LogNotifier, NotifierCommand};
use crate::monitor::FrameMonitor;
use crate::sampler::StackSampler;
use crate::sink::{LogSink, TracingSink};

/// Running pipeline state, dropped as a unit on `stop`.
struct Session {
    monitor: Arc<FrameMonitor>,
    notifier_tx: Sender<NotifierCommand>,
    notifier_handle: JoinHandle<()>,
    executor_tx: Sender<Command>,
    executor_handle: JoinHandle<()>,
}

/// Jank detection coordinator.
///
/// Wires the host's frame signals and stack sampler to the logging
/// pipeline. The session lifecycle is `idle -> watching -> idle`; the
/// caller owns the watcher's lifetime, and dropping it stops the session.
pub struct JankWatcher {
    config: WatchConfig,
    sampler: Arc<dyn StackSampler>,
    sink: Arc<dyn LogSink>,
    session: Option<Session>,
}

impl JankWatcher {
    /// Create an idle watcher with the default [`TracingSink`].
    ///
    /// The sampler captures the UI-owning thread's stack; it is invoked on
    /// the notifier thread every sampling tick.
    pub fn new(config: WatchConfig, sampler: impl StackSampler) -> Self {
        Self {
            config,
            sampler: Arc::new(sampler),
            sink: Arc::new(TracingSink),
            session: None,
        }
    }

    /// Replace the outbound log sink.
    pub fn with_sink(mut self, sink: impl LogSink) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Start watching.
    ///
    /// Validates the configuration first; on failure nothing is spawned and
    /// the watcher stays idle. A no-op when already watching.
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` for an invalid configuration.
    pub fn start(&mut self) -> Result<(), ConfigError> {
        if self.session.is_some() {
            return Ok(());
        }
        self.config.validate()?;

        // One stop flag per session: flipping it cancels queued pipeline
        // work in both loops as well as frame resubscription.
        let exit = Arc::new(AtomicBool::new(false));
        let (executor_handle, executor_tx) =
            LogExecutor::spawn(&self.config, Arc::clone(&self.sink), Arc::clone(&exit));
        let (notifier_handle, notifier_tx) =
            LogNotifier::spawn(Arc::clone(&self.sampler), executor_tx.clone(), Arc::clone(&exit));
        let monitor = Arc::new(FrameMonitor::new(
            self.config.min_skip_frame_count,
            notifier_tx.clone(),
            exit,
        ));

        self.session = Some(Session {
            monitor,
            notifier_tx,
            notifier_handle,
            executor_tx,
            executor_handle,
        });

        tracing::info!(
            min_skip_frame_count = self.config.min_skip_frame_count,
            cache_data_size = self.config.cache_data_size,
            persist_to_file = self.config.persist_to_file,
            "Watching started"
        );
        Ok(())
    }

    /// Stop watching and join the pipeline threads.
    ///
    /// Queued work is discarded; an in-flight flush runs to completion.
    /// Safe to call when idle.
    pub fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        // Flips the shared stop flag first, so commands already queued in
        // either loop are skipped rather than processed.
        session.monitor.request_exit();

        let _ = session.notifier_tx.send(NotifierCommand::Shutdown);
        if session.notifier_handle.join().is_err() {
            tracing::warn!("Notifier thread panicked during shutdown");
        }

        let _ = session.executor_tx.send(Command::Shutdown);
        if session.executor_handle.join().is_err() {
            tracing::warn!("Executor thread panicked during shutdown");
        }

        tracing::info!("Watching stopped");
    }

    /// Whether a session is currently watching.
    pub fn is_watching(&self) -> bool {
        self.session.is_some()
    }

    /// The active frame monitor, for hosts that register the handle with
    /// their render loop directly. `None` when idle.
    pub fn monitor(&self) -> Option<Arc<FrameMonitor>> {
        self.session.as_ref().map(|s| Arc::clone(&s.monitor))
    }

    /// Deliver one frame signal to the active session.
    ///
    /// Returns `true` while watching and the host should re-subscribe;
    /// `false` when idle or stopping.
    pub fn on_frame_signal(&self, frame_time_nanos: u64) -> bool {
        match &self.session {
            Some(session) => session.monitor.on_frame_signal(frame_time_nanos),
            None => false,
        }
    }

    /// The configuration this watcher was built with.
    pub fn config(&self) -> &WatchConfig {
        &self.config
    }
}

impl Drop for JankWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
