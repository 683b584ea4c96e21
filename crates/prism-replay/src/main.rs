//! Prism replay binary.
//!
//! # Usage
//!
//! ```bash
//! # Replay a captured timeline and print the final display sequence
//! prism-replay demos/timeline.json
//!
//! # Newest-first layout, fail on the first desync, JSON output
//! prism-replay demos/timeline.json --newest-first --strict --json
//! ```

use std::{io::Write, path::PathBuf};

use clap::Parser;
use prism_replay::{ReplayError, ReplayOptions, Script, replay};
use prism_roomlist::RoomListConfig;
use prism_timeline::{DisplayOrder, TimelineConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Prism diff script replayer
#[derive(Parser, Debug)]
#[command(name = "prism-replay")]
#[command(about = "Replay recorded engine diffs through the projection layer")]
#[command(version)]
struct Args {
    /// Path to the JSON script
    script: PathBuf,

    /// Show the timeline newest-first
    #[arg(long)]
    newest_first: bool,

    /// UTC offset for day separators, in minutes
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    utc_offset_minutes: i32,

    /// Events installed per step when posting initial items
    #[arg(long, default_value = "50")]
    initial_chunk_size: usize,

    /// Rooms per room list page
    #[arg(long, default_value = "30")]
    page_size: usize,

    /// Stop at the first desync
    #[arg(long)]
    strict: bool,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), ReplayError> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let options = ReplayOptions {
        timeline: TimelineConfig {
            display_order: if args.newest_first {
                DisplayOrder::NewestFirst
            } else {
                DisplayOrder::OldestFirst
            },
            utc_offset_minutes: args.utc_offset_minutes,
            initial_chunk_size: args.initial_chunk_size,
            ..TimelineConfig::default()
        },
        room_list: RoomListConfig { page_size: args.page_size },
        strict: args.strict,
    };

    let script = Script::load(&args.script)?;
    tracing::info!(script = %args.script.display(), steps = script.len(), "replaying");

    let outcome = replay(&script, &options)?;
    tracing::info!(
        applied = outcome.applied,
        desyncs = outcome.desyncs.len(),
        version = outcome.version,
        "replay finished"
    );

    let mut out = std::io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &outcome.items)?;
        writeln!(out)?;
    } else {
        for line in &outcome.lines {
            writeln!(out, "{line}")?;
        }
    }
    for desync in &outcome.desyncs {
        tracing::warn!(step = desync.step, "{}", desync.desync);
    }

    Ok(())
}
