//! Snapshot logging pipeline.
//!
//! Two single-consumer loops connected by unbounded channels:
//!
//! - [`LogNotifier`]: periodic sampling loop; captures one snapshot every
//!   16 ms and forwards it downstream as a *collect* command
//! - [`LogExecutor`]: command loop owning the [`RingLog`] and all sink /
//!   file I/O; processes *collect* and *flush* strictly in arrival order
//!
//! Channel senders never block, so neither the host render context nor the
//! notifier ever waits on the executor. A slow flush delays subsequent
//! collects (back-pressure bounded by disk latency) but nothing upstream.

mod executor;
mod file;
mod notifier;
mod ring;

pub use executor::{Command, LogExecutor};
pub use notifier::{LogNotifier, NotifierCommand, SAMPLE_INTERVAL};
pub use ring::RingLog;
