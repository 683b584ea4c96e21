//! Rendering tests for the display sequence.
//!
//! Renders every item of a snapshot to one line so layout regressions show up
//! as a readable diff.

use prism_core::{DiffOp, Snapshot};
use prism_timeline::{
    DisplayOrder, EventItem, EventKey, TimelineConfig, TimelineItem, TimelineProjection,
    VirtualItem,
};

const DAY: u64 = 86_400_000;
const HOUR: u64 = 3_600_000;

fn render(snapshot: &Snapshot<TimelineItem>) -> String {
    snapshot
        .iter()
        .map(|item| match item {
            TimelineItem::Event(event) => {
                format!("{} <{}> {}", event.key, event.sender, event.body)
            },
            TimelineItem::Virtual(VirtualItem::DaySeparator { day, .. }) => {
                format!("-- day {day} --")
            },
            TimelineItem::Virtual(VirtualItem::ReadMarker) => "-- read --".to_string(),
            TimelineItem::Virtual(VirtualItem::RoomBeginning) => "[room beginning]".to_string(),
            TimelineItem::Virtual(VirtualItem::LoadingIndicator) => "[loading]".to_string(),
            TimelineItem::Virtual(VirtualItem::TypingIndicator { users }) => {
                format!("[typing: {}]", users.join(", "))
            },
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn conversation() -> Vec<EventItem> {
    vec![
        EventItem::new(EventKey::Remote("$1".into()), "@alice", 20 * DAY + 9 * HOUR, "morning"),
        EventItem::new(EventKey::Remote("$2".into()), "@bob", 20 * DAY + 10 * HOUR, "hi"),
        EventItem::new(EventKey::Remote("$3".into()), "@alice", 21 * DAY + 8 * HOUR, "next day"),
        EventItem::new(EventKey::Local("txn1".into()), "@me", 21 * DAY + 9 * HOUR, "sending"),
    ]
}

#[test]
fn full_conversation() {
    let mut projection = TimelineProjection::new("!room", TimelineConfig::default());
    projection.apply(DiffOp::Append { items: conversation() }).unwrap();
    projection.set_last_read(Some(EventKey::Remote("$2".into())));
    projection.set_typing(vec!["@bob".into(), "@carol".into()]);

    insta::assert_snapshot!(render(&projection.snapshot()), @r"
[loading]
-- day 20 --
$1 <@alice> morning
$2 <@bob> hi
-- read --
-- day 21 --
$3 <@alice> next day
local:txn1 <@me> sending
[typing: @bob, @carol]
");
}

#[test]
fn newest_first_with_room_beginning() {
    let config =
        TimelineConfig { display_order: DisplayOrder::NewestFirst, ..TimelineConfig::default() };
    let mut projection = TimelineProjection::new("!room", config);
    projection.apply(DiffOp::Replace { items: conversation() }).unwrap();
    projection.begin_back_pagination().unwrap();
    projection.finish_back_pagination(&Ok(prism_timeline::PaginationOutcome { hit_start: true }));

    insta::assert_snapshot!(render(&projection.snapshot()), @r"
local:txn1 <@me> sending
$3 <@alice> next day
-- day 21 --
$2 <@bob> hi
$1 <@alice> morning
-- day 20 --
[room beginning]
");
}

#[test]
fn timezone_shifts_day_boundaries() {
    // 23:00 UTC and 01:00 UTC the next day fall on the same day at UTC-2.
    let config = TimelineConfig { utc_offset_minutes: -120, ..TimelineConfig::default() };
    let mut projection = TimelineProjection::new("!room", config);
    projection
        .apply(DiffOp::Append {
            items: vec![
                EventItem::new(EventKey::Remote("$a".into()), "@alice", 5 * DAY - HOUR, "late"),
                EventItem::new(EventKey::Remote("$b".into()), "@bob", 5 * DAY + HOUR, "later"),
            ],
        })
        .unwrap();

    insta::assert_snapshot!(render(&projection.snapshot()), @r"
[loading]
-- day 4 --
$a <@alice> late
$b <@bob> later
");
}
