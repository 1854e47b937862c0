//! Log notifier actor.
//!
//! Periodic producer loop: once armed, captures one stack snapshot
//! immediately and then every [`SAMPLE_INTERVAL`], forwarding each to the
//! executor as a collect command. A flush-and-restart cancels the pending
//! sample, enqueues one flush, and rearms immediately — the executor's FIFO
//! channel guarantees the flush lands before the next collect.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::log::executor::Command;
use crate::sampler::StackSampler;

/// Delay between stack captures while collection is armed.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(16);

/// Commands sent to the notifier actor.
#[derive(Debug)]
pub enum NotifierCommand {
    /// Arm periodic collection; the first capture fires immediately.
    StartCollection,
    /// Send one flush downstream, then rearm collection immediately.
    FlushAndRestart,
    /// Exit the loop, discarding pending work.
    Shutdown,
}

/// Periodic sampling actor.
///
/// Owns scheduling state only; snapshots are handed to the executor as soon
/// as they are captured. All downstream sends are fire-and-forget.
pub struct LogNotifier {
    rx: Receiver<NotifierCommand>,
    executor_tx: Sender<Command>,
    sampler: Arc<dyn StackSampler>,
    /// Deadline of the next capture; `None` until collection is armed.
    next_sample: Option<Instant>,
    cancel: Arc<AtomicBool>,
}

impl LogNotifier {
    /// Spawn the notifier thread.
    ///
    /// Collection stays idle until a [`NotifierCommand::StartCollection`]
    /// arrives (the frame monitor sends one on the first frame signal).
    /// Setting `cancel` makes the loop exit on its next wakeup, skipping
    /// commands still queued and the pending sample deadline.
    pub fn spawn(
        sampler: Arc<dyn StackSampler>,
        executor_tx: Sender<Command>,
        cancel: Arc<AtomicBool>,
    ) -> (JoinHandle<()>, Sender<NotifierCommand>) {
        let (tx, rx) = mpsc::channel();

        let mut actor = LogNotifier {
            rx,
            executor_tx,
            sampler,
            next_sample: None,
            cancel,
        };
        let handle = thread::spawn(move || actor.run());

        (handle, tx)
    }

    fn run(&mut self) {
        tracing::debug!("LogNotifier started");

        loop {
            let cmd = match self.next_sample {
                Some(at) => {
                    let timeout = at.saturating_duration_since(Instant::now());
                    match self.rx.recv_timeout(timeout) {
                        Ok(cmd) => Some(cmd),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                // Nothing scheduled: block until a command arrives.
                None => match self.rx.recv() {
                    Ok(cmd) => Some(cmd),
                    Err(_) => break,
                },
            };

            // Stop requested: skip queued commands and the pending sample.
            if self.cancel.load(Ordering::Acquire) {
                break;
            }

            match cmd {
                Some(NotifierCommand::StartCollection) => {
                    self.next_sample = Some(Instant::now());
                }
                Some(NotifierCommand::FlushAndRestart) => {
                    // Flush first, then rearm: the restart capture below is
                    // enqueued after the flush and cannot overtake it.
                    let _ = self.executor_tx.send(Command::Flush);
                    self.next_sample = Some(Instant::now());
                }
                Some(NotifierCommand::Shutdown) => break,
                None => {}
            }

            if let Some(at) = self.next_sample {
                if Instant::now() >= at {
                    let snapshot = self.sampler.capture();
                    let _ = self.executor_tx.send(Command::Collect(snapshot));
                    self.next_sample = Some(Instant::now() + SAMPLE_INTERVAL);
                }
            }
        }

        tracing::debug!("LogNotifier stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::StackSnapshot;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Sampler producing distinct numbered snapshots.
    fn counting_sampler() -> Arc<dyn StackSampler> {
        let counter = AtomicUsize::new(0);
        Arc::new(move || {
            let n = counter.fetch_add(1, Ordering::Relaxed);
            StackSnapshot::from_frames(vec![format!("frame-{n}")])
        })
    }

    fn drain_commands(rx: &Receiver<Command>) -> Vec<Command> {
        let mut commands = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            commands.push(cmd);
        }
        commands
    }

    fn no_cancel() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn test_idle_until_collection_starts() {
        let (executor_tx, executor_rx) = mpsc::channel();
        let (handle, tx) = LogNotifier::spawn(counting_sampler(), executor_tx, no_cancel());

        thread::sleep(Duration::from_millis(60));
        assert!(drain_commands(&executor_rx).is_empty());

        tx.send(NotifierCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_periodic_collection_after_start() {
        let (executor_tx, executor_rx) = mpsc::channel();
        let (handle, tx) = LogNotifier::spawn(counting_sampler(), executor_tx, no_cancel());

        tx.send(NotifierCommand::StartCollection).unwrap();
        thread::sleep(Duration::from_millis(100));
        tx.send(NotifierCommand::Shutdown).unwrap();
        handle.join().unwrap();

        let commands = drain_commands(&executor_rx);
        // Immediate capture plus ~one per 16ms; allow generous slack.
        assert!(commands.len() >= 2, "got {} commands", commands.len());
        assert!(commands
            .iter()
            .all(|cmd| matches!(cmd, Command::Collect(_))));
    }

    #[test]
    fn test_flush_precedes_restarted_collection() {
        let (executor_tx, executor_rx) = mpsc::channel();
        let (handle, tx) = LogNotifier::spawn(counting_sampler(), executor_tx, no_cancel());

        tx.send(NotifierCommand::StartCollection).unwrap();
        thread::sleep(Duration::from_millis(50));
        tx.send(NotifierCommand::FlushAndRestart).unwrap();
        thread::sleep(Duration::from_millis(50));
        tx.send(NotifierCommand::Shutdown).unwrap();
        handle.join().unwrap();

        let commands = drain_commands(&executor_rx);
        let flush_pos = commands
            .iter()
            .position(|cmd| matches!(cmd, Command::Flush))
            .expect("flush command not forwarded");
        assert!(flush_pos > 0, "expected collects before the flush");
        assert!(
            flush_pos < commands.len() - 1,
            "expected collection to resume after the flush"
        );
        assert!(commands
            .iter()
            .skip(flush_pos + 1)
            .all(|cmd| matches!(cmd, Command::Collect(_))));
    }

    #[test]
    fn test_flush_without_prior_collection_arms_sampling() {
        let (executor_tx, executor_rx) = mpsc::channel();
        let (handle, tx) = LogNotifier::spawn(counting_sampler(), executor_tx, no_cancel());

        tx.send(NotifierCommand::FlushAndRestart).unwrap();
        thread::sleep(Duration::from_millis(50));
        tx.send(NotifierCommand::Shutdown).unwrap();
        handle.join().unwrap();

        let commands = drain_commands(&executor_rx);
        assert!(matches!(commands.first(), Some(Command::Flush)));
        assert!(commands.len() >= 2);
    }

    #[test]
    fn test_shutdown_stops_sampling() {
        let (executor_tx, executor_rx) = mpsc::channel();
        let (handle, tx) = LogNotifier::spawn(counting_sampler(), executor_tx, no_cancel());

        tx.send(NotifierCommand::StartCollection).unwrap();
        thread::sleep(Duration::from_millis(40));
        tx.send(NotifierCommand::Shutdown).unwrap();
        handle.join().unwrap();

        drain_commands(&executor_rx);
        thread::sleep(Duration::from_millis(40));
        assert!(drain_commands(&executor_rx).is_empty());
    }

    #[test]
    fn test_cancel_skips_queued_flush() {
        let (executor_tx, executor_rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let (handle, tx) =
            LogNotifier::spawn(counting_sampler(), executor_tx, Arc::clone(&cancel));

        tx.send(NotifierCommand::StartCollection).unwrap();
        thread::sleep(Duration::from_millis(40));

        // A flush request arriving after the stop flag flips must not be
        // forwarded downstream.
        cancel.store(true, Ordering::Release);
        tx.send(NotifierCommand::FlushAndRestart).unwrap();
        tx.send(NotifierCommand::Shutdown).unwrap();
        handle.join().unwrap();

        let commands = drain_commands(&executor_rx);
        assert!(
            commands.iter().all(|cmd| matches!(cmd, Command::Collect(_))),
            "flush forwarded after stop was requested"
        );
    }
}
