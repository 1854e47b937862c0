//! Log executor actor.
//!
//! Single-consumer pattern: one thread owns the ring buffer and all sink /
//! file I/O, processes commands via an unbounded mpsc channel strictly in
//! arrival order. Senders never block; emission and persistence happen
//! synchronously inside a flush, so a slow disk write delays later collects
//! but nothing upstream. Once the session's stop flag is set, dequeued
//! commands are skipped instead of processed; a flush already underway
//! finishes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::config::WatchConfig;
use crate::log::file::FileStore;
use crate::log::ring::RingLog;
use crate::sampler::StackSnapshot;
use crate::sink::{emit_chunked, LogSink};

// =============================================================================
// Constants
// =============================================================================

/// Line separating individual snapshots inside a flush block.
pub(crate) const ENTRY_DELIMITER: &str = "---------------------------------------------------";

/// Banner opening a flush block in emitted and persisted text.
pub(crate) const FLUSH_START_BANNER: &str = "~~~~~~~~~~~~~~~~~~~start~~~~~~~~~~~~~~~~~~~~~~";

/// Banner closing a flush block.
pub(crate) const FLUSH_END_BANNER: &str = "~~~~~~~~~~~~~~~~~~~end~~~~~~~~~~~~~~~~~~~~~~";

// =============================================================================
// Commands
// =============================================================================

/// Commands sent to the executor actor.
#[derive(Debug)]
pub enum Command {
    /// Filter, format and buffer one snapshot.
    Collect(StackSnapshot),
    /// Emit and optionally persist everything buffered, then clear.
    Flush,
    /// Exit the loop, discarding queued commands.
    Shutdown,
}

// =============================================================================
// Actor
// =============================================================================

/// Snapshot log executor.
///
/// Exclusively owns the [`RingLog`] and the persistence target; serializing
/// all mutation on one thread removes any need for locks around them.
pub struct LogExecutor {
    rx: Receiver<Command>,
    ring: RingLog,
    tag: String,
    keywords: Vec<String>,
    sink: Arc<dyn LogSink>,
    file_store: Option<FileStore>,
    cancel: Arc<AtomicBool>,
}

impl LogExecutor {
    /// Spawn the executor thread.
    ///
    /// Returns the thread handle and the command sender. Once the thread
    /// has exited, sends fail and are silently dropped by callers. Setting
    /// `cancel` makes the loop exit on the next dequeue, skipping whatever
    /// was still queued.
    pub fn spawn(
        config: &WatchConfig,
        sink: Arc<dyn LogSink>,
        cancel: Arc<AtomicBool>,
    ) -> (JoinHandle<()>, Sender<Command>) {
        let (tx, rx) = mpsc::channel();

        let file_store = config.persist_to_file.then(|| {
            FileStore::new(
                config.storage_root.clone(),
                config.cache_directory.clone(),
                config.cache_file_name.clone(),
            )
        });

        let mut actor = LogExecutor {
            rx,
            ring: RingLog::new(config.cache_data_size),
            tag: config.tag.clone(),
            keywords: config.keywords.clone(),
            sink,
            file_store,
            cancel,
        };
        let handle = thread::spawn(move || actor.run());

        (handle, tx)
    }

    fn run(&mut self) {
        tracing::debug!("LogExecutor started");

        while let Ok(cmd) = self.rx.recv() {
            // Stop requested: queued commands are discarded, not processed.
            if self.cancel.load(Ordering::Acquire) {
                break;
            }
            match cmd {
                Command::Collect(snapshot) => self.collect(snapshot),
                Command::Flush => self.flush(),
                Command::Shutdown => break,
            }
        }

        tracing::debug!("LogExecutor stopped");
    }

    /// Buffer one snapshot. Empty snapshots and snapshots whose every frame
    /// is rejected by the keyword filter are dropped without trace; an entry
    /// equal to the previous one is discarded by the ring.
    fn collect(&mut self, snapshot: StackSnapshot) {
        if snapshot.is_empty() {
            return;
        }
        if let Some(entry) = format_entry(&snapshot, &self.keywords) {
            self.ring.push(entry);
        }
    }

    /// Emit and optionally persist the buffered entries, then clear.
    /// No-op when nothing is buffered.
    fn flush(&mut self) {
        if self.ring.is_empty() {
            return;
        }

        let mut text = String::new();
        text.push_str(" \n \n");
        text.push_str(FLUSH_START_BANNER);
        text.push_str(" \n \n");
        for entry in self.ring.drain() {
            text.push_str(&entry);
            text.push('\n');
        }
        text.push_str(FLUSH_END_BANNER);
        text.push_str("\n \n");

        emit_chunked(&self.sink, &self.tag, &text);

        // Persistence failures lose this flush on disk only; the emission
        // above already happened. No retry.
        if let Some(store) = &self.file_store {
            if let Err(e) = store.append(&text) {
                tracing::warn!(error = %e, "Failed to persist flushed log");
            }
        }
    }
}

/// Render a snapshot to a delimited text block, keeping a frame iff the
/// keyword set is empty or the frame contains at least one keyword as a
/// substring. Returns `None` when no frame survives.
fn format_entry(snapshot: &StackSnapshot, keywords: &[String]) -> Option<String> {
    let mut entry = String::new();
    entry.push_str(ENTRY_DELIMITER);
    entry.push('\n');

    let mut has_useful_frame = false;
    for frame in snapshot.frames() {
        if frame_matches(frame, keywords) {
            entry.push_str(frame);
            entry.push('\n');
            has_useful_frame = true;
        }
    }

    entry.push_str(ENTRY_DELIMITER);
    entry.push('\n');

    has_useful_frame.then_some(entry)
}

fn frame_matches(frame: &str, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    if frame.is_empty() {
        return false;
    }
    keywords.iter().any(|keyword| frame.contains(keyword))
}
