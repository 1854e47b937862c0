//! Jankwatch demo binary.
//!
//! Simulates a 60 Hz render loop with periodic injected stalls and feeds
//! the frame signals into the watcher. Stands in for the host application:
//! the sampler produces synthetic frames, and flushed stall reports land on
//! stderr via `tracing` (and in the per-day log file unless disabled).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use clap::Parser;
use jankwatch::{JankWatcher, StackSnapshot, WatchConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Jankwatch - frame-gap jank detection demo
#[derive(Parser, Debug)]
#[command(name = "jankwatch", version, about, long_about = None)]
struct Cli {
    /// Skipped-frame threshold before a stall is reported
    #[arg(long, default_value_t = 1, env = "JANKWATCH_MIN_SKIP_FRAMES")]
    min_skip_frames: u32,

    /// Snapshots buffered between flushes
    #[arg(long, default_value_t = 10)]
    cache_size: usize,

    /// Storage root for persisted stall reports
    #[arg(long, env = "JANKWATCH_STORAGE_ROOT")]
    storage_root: Option<String>,

    /// Disable file persistence (reports go to stderr only)
    #[arg(long)]
    no_persist: bool,

    /// Keep only stack frames containing one of these substrings
    #[arg(long)]
    keyword: Vec<String>,

    /// Number of simulated frames to render
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Inject a stall every N frames
    #[arg(long, default_value_t = 120)]
    stall_every: u64,

    /// Injected stall length in milliseconds
    #[arg(long, default_value_t = 80)]
    stall_ms: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,jankwatch=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = WatchConfig::new()
        .with_min_skip_frame_count(cli.min_skip_frames)
        .with_cache_data_size(cli.cache_size)
        .with_persist_to_file(!cli.no_persist)
        .with_keywords(cli.keyword);
    if let Some(root) = cli.storage_root {
        config = config.with_storage_root(root);
    }

    tracing::info!(
        frames = cli.frames,
        stall_every = cli.stall_every,
        stall_ms = cli.stall_ms,
        "Simulating render loop"
    );

    let mut watcher = JankWatcher::new(config, demo_sampler());
    watcher.start()?;

    let epoch = Instant::now();
    let frame_interval = Duration::from_micros(16_600);

    for frame in 0..cli.frames {
        if cli.stall_every > 0 && frame > 0 && frame % cli.stall_every == 0 {
            // The "UI thread" is busy: no frame is produced for a while.
            std::thread::sleep(Duration::from_millis(cli.stall_ms));
        } else {
            std::thread::sleep(frame_interval);
        }

        let frame_time_nanos = epoch.elapsed().as_nanos() as u64;
        if !watcher.on_frame_signal(frame_time_nanos) {
            break;
        }
    }

    // Give an in-flight flush a moment before tearing the pipeline down.
    std::thread::sleep(Duration::from_millis(50));
    watcher.stop();

    tracing::info!("Done");
    Ok(())
}

/// Synthetic sampler: rotates through a few plausible UI-thread stacks so
/// consecutive captures are not all identical.
fn demo_sampler() -> impl Fn() -> StackSnapshot + Send + Sync + 'static {
    let tick = AtomicUsize::new(0);
    move || {
        let n = tick.fetch_add(1, Ordering::Relaxed);
        let busy_frame = match n % 3 {
            0 => "com.demo.ListView.bindRow(ListView.rs:88)",
            1 => "com.demo.ImageCache.decode(ImageCache.rs:131)",
            _ => "com.demo.Layout.measure(Layout.rs:210)",
        };
        StackSnapshot::from_frames(vec![
            busy_frame.to_string(),
            "com.demo.Renderer.drawFrame(Renderer.rs:57)".to_string(),
            "com.demo.EventLoop.dispatch(EventLoop.rs:19)".to_string(),
        ])
    }
}
