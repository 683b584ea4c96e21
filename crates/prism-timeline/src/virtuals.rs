//! Virtual item synthesis.
//!
//! Virtual items are rebuilt from scratch on every change to the event
//! sequence or to one of the flags below; they never enter diff application.
//!
//! Layout, oldest-first:
//!
//! 1. room beginning marker once the start of history was reached,
//!    otherwise a loading indicator
//! 2. a day separator before the first event of every calendar day
//! 3. the read marker right after the last read event, unless that event is
//!    the newest one
//! 4. a typing indicator when anyone is typing

use crate::{DisplayOrder, EventItem, EventKey, TimelineItem, VirtualItem};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Inputs that drive virtual item synthesis besides the events themselves.
#[derive(Debug, Clone, Copy)]
pub struct VirtualInputs<'a> {
    /// Last event the user has read.
    pub last_read: Option<&'a EventKey>,
    /// Users currently typing.
    pub typing: &'a [String],
    /// Whether older history can still be loaded.
    pub has_more_backwards: bool,
    /// Offset from UTC used for day boundaries, in minutes.
    pub utc_offset_minutes: i32,
    /// Orientation of the output.
    pub order: DisplayOrder,
}

/// Day number of `timestamp_ms` since the Unix epoch, shifted by the offset.
pub fn day_of(timestamp_ms: u64, utc_offset_minutes: i32) -> i64 {
    let offset_ms = i64::from(utc_offset_minutes) * 60_000;
    let timestamp_ms = i64::try_from(timestamp_ms).unwrap_or(i64::MAX);
    timestamp_ms.saturating_add(offset_ms).div_euclid(MILLIS_PER_DAY)
}

/// Interleave virtual items with `events` (oldest-first).
pub fn interleave(events: &[EventItem], inputs: &VirtualInputs<'_>) -> Vec<TimelineItem> {
    let mut items = Vec::with_capacity(events.len() * 2 + 2);

    if inputs.has_more_backwards {
        items.push(TimelineItem::Virtual(VirtualItem::LoadingIndicator));
    } else {
        items.push(TimelineItem::Virtual(VirtualItem::RoomBeginning));
    }

    let newest = events.len().checked_sub(1);
    let mut previous_day = None;
    for (index, event) in events.iter().enumerate() {
        let day = day_of(event.timestamp_ms, inputs.utc_offset_minutes);
        if previous_day != Some(day) {
            items.push(TimelineItem::Virtual(VirtualItem::DaySeparator {
                day,
                timestamp_ms: event.timestamp_ms,
            }));
            previous_day = Some(day);
        }

        items.push(TimelineItem::Event(event.clone()));

        if inputs.last_read == Some(&event.key) && Some(index) != newest {
            items.push(TimelineItem::Virtual(VirtualItem::ReadMarker));
        }
    }

    if !inputs.typing.is_empty() {
        items.push(TimelineItem::Virtual(VirtualItem::TypingIndicator {
            users: inputs.typing.to_vec(),
        }));
    }

    if inputs.order == DisplayOrder::NewestFirst {
        items.reverse();
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 86_400_000;

    fn event(id: &str, timestamp_ms: u64) -> EventItem {
        EventItem::new(EventKey::Remote(id.to_string()), "@alice:example.org", timestamp_ms, id)
    }

    fn inputs<'a>(last_read: Option<&'a EventKey>, typing: &'a [String]) -> VirtualInputs<'a> {
        VirtualInputs {
            last_read,
            typing,
            has_more_backwards: true,
            utc_offset_minutes: 0,
            order: DisplayOrder::OldestFirst,
        }
    }

    fn ids(items: &[TimelineItem]) -> Vec<String> {
        items.iter().map(TimelineItem::unique_id).collect()
    }

    #[test]
    fn day_boundaries() {
        assert_eq!(day_of(0, 0), 0);
        assert_eq!(day_of(DAY - 1, 0), 0);
        assert_eq!(day_of(DAY, 0), 1);
        // One hour east of UTC moves 23:30 UTC into the next day.
        assert_eq!(day_of(DAY - 30 * 60_000, 60), 1);
        // West of UTC before the epoch.
        assert_eq!(day_of(0, -60), -1);
    }

    #[test]
    fn separators_between_days() {
        let events = [event("$1", 10), event("$2", 20), event("$3", DAY + 5)];
        let items = interleave(&events, &inputs(None, &[]));

        assert_eq!(ids(&items), [
            "virtual:loading",
            "virtual:day:0",
            "$1",
            "$2",
            "virtual:day:1",
            "$3",
        ]);
    }

    #[test]
    fn read_marker_after_last_read_unless_newest() {
        let events = [event("$1", 10), event("$2", 20)];

        let first = EventKey::Remote("$1".into());
        let items = interleave(&events, &inputs(Some(&first), &[]));
        assert_eq!(
            ids(&items),
            ["virtual:loading", "virtual:day:0", "$1", "virtual:read_marker", "$2"]
        );

        let newest = EventKey::Remote("$2".into());
        let items = interleave(&events, &inputs(Some(&newest), &[]));
        assert!(!items.iter().any(|i| matches!(i, TimelineItem::Virtual(VirtualItem::ReadMarker))));
    }

    #[test]
    fn room_beginning_replaces_loading_indicator() {
        let typing = vec!["@bob:example.org".to_string()];
        let mut inputs = inputs(None, &typing);
        inputs.has_more_backwards = false;

        let items = interleave(&[], &inputs);
        assert_eq!(ids(&items), ["virtual:room_beginning", "virtual:typing"]);
    }

    #[test]
    fn newest_first_reverses_everything() {
        let events = [event("$1", 10), event("$2", DAY)];
        let mut inputs = inputs(None, &[]);
        inputs.order = DisplayOrder::NewestFirst;

        let items = interleave(&events, &inputs);
        assert_eq!(ids(&items), ["$2", "virtual:day:1", "$1", "virtual:day:0", "virtual:loading"]);
    }
}
