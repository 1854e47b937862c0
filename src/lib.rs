//! Jankwatch - Frame-Gap Jank Detection
//!
//! This crate watches an interactive application's render loop for stalls
//! ("jank") and records what the UI-owning thread was doing when a stall
//! happened. The host feeds per-frame timestamps into a [`FrameMonitor`];
//! while watching, a background sampler captures call-stack snapshots every
//! 16 ms into a bounded, deduplicating ring buffer. When the gap between two
//! frames exceeds the configured threshold, the buffered snapshots are
//! flushed: emitted through a [`LogSink`] in bounded chunks and, optionally,
//! appended to a per-day log file for offline diagnosis.
//!
//! # Architecture
//!
//! - **[`FrameMonitor`]**: per-frame gap arithmetic on the host render
//!   context; only ever does math and a non-blocking channel send
//! - **[`LogNotifier`]**: periodic sampling loop on its own thread
//! - **[`LogExecutor`]**: single-consumer command loop owning the ring
//!   buffer, sink emission and file persistence
//! - **[`JankWatcher`]**: lifecycle facade wiring the three together
//!
//! # Example
//!
//! ```rust,no_run
//! use jankwatch::{JankWatcher, StackSnapshot, WatchConfig};
//!
//! fn main() -> Result<(), jankwatch::ConfigError> {
//!     let config = WatchConfig::new()
//!         .with_min_skip_frame_count(2)
//!         .with_keywords(vec!["com.app".into()]);
//!
//!     // The sampler captures the UI-owning thread's stack; any closure
//!     // returning a StackSnapshot will do.
//!     let mut watcher = JankWatcher::new(config, || {
//!         StackSnapshot::from_frames(vec!["com.app.Main.render:42".into()])
//!     });
//!     watcher.start()?;
//!
//!     // Host render loop: deliver one timestamp per drawn frame and
//!     // re-subscribe while `on_frame_signal` returns true.
//!     // watcher.on_frame_signal(frame_time_nanos);
//!
//!     watcher.stop();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod log;
pub mod monitor;
pub mod sampler;
pub mod sink;
pub mod watcher;

pub use config::{ConfigError, WatchConfig};
pub use log::{LogExecutor, LogNotifier, RingLog};
pub use monitor::FrameMonitor;
pub use sampler::{StackSampler, StackSnapshot};
pub use sink::{LogSink, TracingSink};
pub use watcher::JankWatcher;
