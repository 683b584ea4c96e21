//! Room list state machine.
//!
//! [`RoomListProjection`] holds the authoritative room sequence, the paging
//! cursor and the filter. Paging and filter changes return
//! [`RoomListAction`]s for the runtime to forward to the engine; the
//! projection itself never performs I/O.
//!
//! Loading a page never inserts rooms. New rooms only arrive as engine diffs,
//! so repeated [`load_more`](RoomListProjection::load_more) calls cannot
//! duplicate entries.

use prism_core::{ApplyDiff, DesyncError, DiffOp, DiffProjector, Observable, Snapshot, Subscriber};

use crate::{RoomListConfig, RoomListFilter, RoomSummary};

/// Requests produced by the room list for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomListAction {
    /// Fetch one more page.
    LoadMore {
        /// Page count once this load completes, 1-based.
        page: usize,
    },

    /// Return the engine's list to its first page.
    Reset,

    /// Forward a new filter to the engine.
    UpdateFilter {
        /// Filter to install.
        filter: RoomListFilter,
    },
}

/// Authoritative rooms plus the filtered view published to the UI.
#[derive(Debug)]
pub struct RoomListProjection {
    config: RoomListConfig,
    rooms: DiffProjector<RoomSummary>,
    loaded_pages: usize,
    filter: RoomListFilter,
    is_active: bool,
    /// Count of filtered republications.
    version: u64,
    filtered: Observable<Snapshot<RoomSummary>>,
}

impl RoomListProjection {
    /// Create an inactive, unfiltered list with one page loaded.
    pub fn new(config: RoomListConfig) -> Self {
        Self::with_filter(config, RoomListFilter::All)
    }

    /// Create an inactive list starting with `filter`.
    pub fn with_filter(config: RoomListConfig, filter: RoomListFilter) -> Self {
        Self {
            config,
            rooms: DiffProjector::new(),
            loaded_pages: 1,
            filter,
            is_active: false,
            version: 0,
            filtered: Observable::new(Snapshot::empty()),
        }
    }

    /// Apply one engine diff and republish the filtered view.
    ///
    /// # Errors
    ///
    /// Returns [`DesyncError`] if the diff does not fit the current sequence.
    pub fn apply(&mut self, op: DiffOp<RoomSummary>) -> Result<(), DesyncError> {
        self.rooms.apply(op)?;
        self.republish();
        Ok(())
    }

    /// Request one more page.
    pub fn load_more(&mut self) -> Vec<RoomListAction> {
        self.loaded_pages += 1;
        vec![RoomListAction::LoadMore { page: self.loaded_pages }]
    }

    /// Roll back the page counter after the engine failed to serve `page`.
    ///
    /// Ignored if the counter moved on since (e.g. a reset happened).
    pub fn load_more_failed(&mut self, page: usize) {
        if self.loaded_pages == page && page > 1 {
            self.loaded_pages -= 1;
        }
    }

    /// Return to the unfiltered single-page state.
    ///
    /// Downloaded rooms are kept; only an engine `Clear`/`Replace` evicts them.
    pub fn reset(&mut self) -> Vec<RoomListAction> {
        self.loaded_pages = 1;
        let mut actions = vec![RoomListAction::Reset];
        if !self.filter.is_all() {
            self.filter = RoomListFilter::All;
            self.republish();
            actions.push(RoomListAction::UpdateFilter { filter: RoomListFilter::All });
        }
        actions
    }

    /// Swap the filter and recompute the view from the unchanged rooms.
    pub fn update_filter(&mut self, filter: RoomListFilter) -> Vec<RoomListAction> {
        if self.filter == filter {
            return Vec::new();
        }
        self.filter = filter.clone();
        self.republish();
        vec![RoomListAction::UpdateFilter { filter }]
    }

    /// Toggle visibility.
    ///
    /// Becoming active loads more rooms; becoming inactive resets the list so
    /// a hidden list stops consuming pages.
    pub fn set_is_active(&mut self, active: bool) -> Vec<RoomListAction> {
        if self.is_active == active {
            return Vec::new();
        }
        self.is_active = active;
        if active { self.load_more() } else { self.reset() }
    }

    /// Whether the list is currently visible.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Pages requested so far, at least one.
    pub fn loaded_pages(&self) -> usize {
        self.loaded_pages
    }

    /// Rooms per page.
    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    /// Current filter.
    pub fn filter(&self) -> &RoomListFilter {
        &self.filter
    }

    /// Authoritative rooms, unfiltered.
    pub fn rooms(&self) -> &[RoomSummary] {
        self.rooms.items()
    }

    /// Latest filtered snapshot.
    pub fn snapshot(&self) -> Snapshot<RoomSummary> {
        self.filtered.get().clone()
    }

    /// Subscribe to filtered snapshots, starting with the current one.
    pub fn subscribe(&mut self) -> Subscriber<Snapshot<RoomSummary>> {
        self.filtered.subscribe()
    }

    /// Subscribe to the unfiltered sequence.
    pub fn subscribe_unfiltered(&mut self) -> Subscriber<Snapshot<RoomSummary>> {
        self.rooms.subscribe()
    }

    fn republish(&mut self) {
        self.version += 1;
        let selected = self.filter.select(self.rooms.items());
        self.filtered.publish(Snapshot::new(self.version, selected));
    }
}

impl ApplyDiff for RoomListProjection {
    type Item = RoomSummary;

    fn apply(&mut self, op: DiffOp<RoomSummary>) -> Result<(), DesyncError> {
        RoomListProjection::apply(self, op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str, name: &str) -> RoomSummary {
        RoomSummary::placeholder(id).with_name(name)
    }

    fn projection() -> RoomListProjection {
        RoomListProjection::new(RoomListConfig { page_size: 30 })
    }

    #[test]
    fn activity_toggle_loads_and_resets() {
        let mut list = projection();
        assert_eq!(list.loaded_pages(), 1);

        let actions = list.set_is_active(true);
        assert_eq!(actions, [RoomListAction::LoadMore { page: 2 }]);
        list.load_more();
        assert_eq!(list.loaded_pages(), 3);

        let actions = list.set_is_active(false);
        assert_eq!(actions, [RoomListAction::Reset]);
        assert_eq!(list.loaded_pages(), 1);
        assert_eq!(list.page_size(), 30);
    }

    #[test]
    fn repeated_toggle_is_idempotent() {
        let mut list = projection();
        list.set_is_active(true);
        assert!(list.set_is_active(true).is_empty());
        assert_eq!(list.loaded_pages(), 2);
    }

    #[test]
    fn load_more_does_not_touch_rooms() {
        let mut list = projection();
        list.apply(DiffOp::Append { items: vec![room("!a", "A"), room("!b", "B")] }).unwrap();
        list.load_more();
        list.load_more();
        assert_eq!(list.rooms().len(), 2);
        assert_eq!(list.snapshot().version(), 1);
    }

    #[test]
    fn failed_load_rolls_back_only_latest_page() {
        let mut list = projection();
        list.load_more();
        list.load_more_failed(2);
        assert_eq!(list.loaded_pages(), 1);

        list.load_more();
        list.load_more();
        list.load_more_failed(2);
        assert_eq!(list.loaded_pages(), 3);

        list.load_more_failed(1);
        list.reset();
        list.load_more_failed(1);
        assert_eq!(list.loaded_pages(), 1);
    }

    #[test]
    fn filter_recomputes_and_restores() {
        let mut list = projection();
        list.apply(DiffOp::Append {
            items: vec![room("!a", "Rust"), room("!b", "Go"), room("!c", "rustaceans")],
        })
        .unwrap();
        let before = list.snapshot();

        let actions = list.update_filter(RoomListFilter::from_query("rust"));
        assert_eq!(actions.len(), 1);
        let ids: Vec<_> = list.snapshot().iter().map(|r| r.room_id.clone()).collect();
        assert_eq!(ids, ["!a", "!c"]);

        list.update_filter(RoomListFilter::from_query(""));
        assert_eq!(list.snapshot().items(), before.items());
        assert_eq!(list.rooms().len(), 3);
    }

    #[test]
    fn reset_clears_filter() {
        let mut list = projection();
        list.update_filter(RoomListFilter::from_query("x"));
        let actions = list.reset();
        assert_eq!(actions, [
            RoomListAction::Reset,
            RoomListAction::UpdateFilter { filter: RoomListFilter::All },
        ]);
        assert!(list.filter().is_all());
    }

    #[test]
    fn same_filter_is_noop() {
        let mut list = projection();
        assert!(list.update_filter(RoomListFilter::All).is_empty());
        assert_eq!(list.snapshot().version(), 0);
    }

    #[test]
    fn diffs_flow_through_filter() {
        let mut list = projection();
        list.update_filter(RoomListFilter::from_query("team"));
        let mut sub = list.subscribe();

        list.apply(DiffOp::Push { item: room("!a", "Team chat") }).unwrap();
        list.apply(DiffOp::Push { item: room("!b", "Random") }).unwrap();
        list.apply(DiffOp::UpdateAt { index: 1, item: room("!b", "Team random") }).unwrap();

        let lens: Vec<usize> = sub.drain().iter().map(|s| s.len()).collect();
        assert_eq!(lens, [0, 1, 1, 2]);
    }
}
