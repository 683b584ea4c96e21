//! Fuzz target for timeline display synthesis
//!
//! Drives a timeline projection with diffs, read marker moves, typing
//! changes and pagination completions, then checks the display sequence.
//!
//! # Strategy
//!
//! - Timestamps spread over a few days so day separators appear and vanish
//! - Small UTC offsets in both directions
//! - Both display orders
//!
//! # Invariants
//!
//! - Display holds exactly the authoritative events, in order
//! - Exactly one history edge marker, matching pagination state

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use prism_harness::{DiffOperation, InvariantRegistry, SystemSnapshot};
use prism_timeline::{
    DisplayOrder, EventItem, EventKey, PaginationOutcome, TimelineConfig, TimelineProjection,
};

const HOUR: u64 = 3_600_000;

#[derive(Debug, Arbitrary)]
enum TimelineOp {
    Diff(DiffOperation),
    LastRead(Option<u8>),
    Typing(Vec<u8>),
    Paginated { hit_start: bool },
}

#[derive(Debug, Arbitrary)]
struct Input {
    newest_first: bool,
    utc_offset_hours: i8,
    ops: Vec<TimelineOp>,
}

fn event(seed: u8) -> EventItem {
    let timestamp_ms = u64::from(seed) * HOUR;
    EventItem::new(EventKey::Remote(format!("${seed}")), "@fuzz", timestamp_ms, String::new())
}

fuzz_target!(|input: Input| {
    let config = TimelineConfig {
        display_order: if input.newest_first {
            DisplayOrder::NewestFirst
        } else {
            DisplayOrder::OldestFirst
        },
        utc_offset_minutes: i32::from(input.utc_offset_hours.clamp(-14, 14)) * 60,
        ..TimelineConfig::default()
    };
    let mut projection = TimelineProjection::new("!fuzz", config);
    let invariants = InvariantRegistry::standard();

    for op in input.ops {
        match op {
            TimelineOp::Diff(op) => {
                let _ = projection.apply(op.to_diff().map(event));
            },
            TimelineOp::LastRead(seed) => {
                projection.set_last_read(seed.map(|s| EventKey::Remote(format!("${s}"))));
            },
            TimelineOp::Typing(users) => {
                projection.set_typing(users.iter().map(|u| format!("@u{u}")).collect());
            },
            TimelineOp::Paginated { hit_start } => {
                if projection.begin_back_pagination().is_ok() {
                    projection.finish_back_pagination(&Ok(PaginationOutcome { hit_start }));
                }
            },
        }

        let state = SystemSnapshot::empty().with_timeline(&projection);
        if let Err(violation) = invariants.check_all(&state) {
            panic!("{violation}");
        }
    }
});
