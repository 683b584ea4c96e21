//! Fuzz target for room list filtering and paging
//!
//! # Invariants
//!
//! - Visible rooms are the filter applied to the authoritative rooms
//! - Clearing the filter restores the authoritative rooms exactly
//! - At least one page is always loaded

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use prism_harness::{DiffOperation, InvariantRegistry, SystemSnapshot};
use prism_roomlist::{RoomListConfig, RoomListFilter, RoomListProjection, RoomSummary};

#[derive(Debug, Arbitrary)]
enum RoomListOp {
    Diff(DiffOperation),
    Filter(String),
    Active(bool),
    LoadMore,
    LoadFailed(u8),
    Reset,
}

fn room(seed: u8) -> RoomSummary {
    let name = match seed % 3 {
        0 => None,
        1 => Some(format!("Rust  Room {seed}")),
        _ => Some(format!("garden {seed}")),
    };
    RoomSummary { name, ..RoomSummary::placeholder(format!("!r{seed}")) }
}

fuzz_target!(|ops: Vec<RoomListOp>| {
    let mut list = RoomListProjection::new(RoomListConfig { page_size: 4 });
    let invariants = InvariantRegistry::standard();

    for op in ops {
        match op {
            RoomListOp::Diff(op) => {
                let _ = list.apply(op.to_diff().map(room));
            },
            RoomListOp::Filter(query) => {
                let _ = list.update_filter(RoomListFilter::from_query(&query));
            },
            RoomListOp::Active(active) => {
                let _ = list.set_is_active(active);
            },
            RoomListOp::LoadMore => {
                let _ = list.load_more();
            },
            RoomListOp::LoadFailed(page) => list.load_more_failed(usize::from(page)),
            RoomListOp::Reset => {
                let _ = list.reset();
                assert!(list.filter().is_all());
                assert_eq!(list.snapshot().items(), list.rooms());
            },
        }

        let state = SystemSnapshot::empty().with_room_list(&list);
        if let Err(violation) = invariants.check_all(&state) {
            panic!("{violation}");
        }
    }
});
