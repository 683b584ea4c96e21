//! Standard invariant checks.

use prism_timeline::{DisplayOrder, EventItem, TimelineItem, VirtualItem};

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// The active session must be registered.
///
/// A reader must never see an active id whose graph was released.
pub struct ActiveSessionRegistered;

impl Invariant for ActiveSessionRegistered {
    fn name(&self) -> &'static str {
        "active_session_registered"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        match &state.active {
            Some(active) if !state.sessions.contains(active) => Err(Violation {
                invariant: self.name(),
                message: format!("active session {active} not in {:?}", state.sessions),
            }),
            _ => Ok(()),
        }
    }
}

/// The display sequence holds exactly the authoritative events, in order.
///
/// Virtual items sit between events but never replace, drop or reorder one.
pub struct DisplayMatchesEvents;

impl Invariant for DisplayMatchesEvents {
    fn name(&self) -> &'static str {
        "display_matches_events"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for timeline in &state.timelines {
            let mut shown: Vec<&EventItem> =
                timeline.display.iter().filter_map(TimelineItem::as_event).collect();
            if timeline.order == DisplayOrder::NewestFirst {
                shown.reverse();
            }
            let expected: Vec<&EventItem> = timeline.events.iter().collect();
            if shown != expected {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "room {}: display shows {} events, projection holds {}",
                        timeline.room_id,
                        shown.len(),
                        expected.len()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Exactly one history edge marker, matching the pagination state.
///
/// The loading indicator while older history may exist, the room beginning
/// once the start was reached.
pub struct HistoryEdgeMatchesStatus;

impl Invariant for HistoryEdgeMatchesStatus {
    fn name(&self) -> &'static str {
        "history_edge_matches_status"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for timeline in &state.timelines {
            let loading = timeline
                .display
                .iter()
                .filter(|i| matches!(i, TimelineItem::Virtual(VirtualItem::LoadingIndicator)))
                .count();
            let beginning = timeline
                .display
                .iter()
                .filter(|i| matches!(i, TimelineItem::Virtual(VirtualItem::RoomBeginning)))
                .count();

            let expected = if timeline.status.has_more_to_load { (1, 0) } else { (0, 1) };
            if (loading, beginning) != expected {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "room {}: {loading} loading / {beginning} beginning markers, has_more_to_load={}",
                        timeline.room_id, timeline.status.has_more_to_load
                    ),
                });
            }
        }
        Ok(())
    }
}

/// The filtered room list is the filter applied to the authoritative rooms,
/// order preserved.
pub struct FilterPreservesOrder;

impl Invariant for FilterPreservesOrder {
    fn name(&self) -> &'static str {
        "filter_preserves_order"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for list in &state.room_lists {
            let expected = list.filter.select(&list.rooms);
            if list.visible != expected {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "filter {:?}: {} visible rooms, expected {}",
                        list.filter,
                        list.visible.len(),
                        expected.len()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// At least one page is always considered loaded.
pub struct PagesNeverBelowOne;

impl Invariant for PagesNeverBelowOne {
    fn name(&self) -> &'static str {
        "pages_never_below_one"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        match state.room_lists.iter().find(|list| list.loaded_pages == 0) {
            Some(_) => {
                Err(Violation { invariant: self.name(), message: "loaded_pages is 0".to_string() })
            },
            None => Ok(()),
        }
    }
}

/// Published versions strictly increase per collection.
///
/// A repeated or decreasing version means a snapshot was published without
/// an applied change, or out of order.
pub struct VersionMonotonicity;

impl Invariant for VersionMonotonicity {
    fn name(&self) -> &'static str {
        "version_monotonicity"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (collection, versions) in &state.version_history {
            if let Some(window) = versions.windows(2).find(|w| w[1] <= w[0]) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "{collection}: version {} followed by {}",
                        window[0], window[1]
                    ),
                });
            }
        }
        Ok(())
    }
}
