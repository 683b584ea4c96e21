//! Pure timeline state for one room.
//!
//! [`TimelineProjection`] owns the authoritative event sequence (oldest-first,
//! exactly as the engine feed orders it) and derives the display sequence by
//! interleaving virtual items. It performs no I/O: back-pagination is split
//! into [`begin_back_pagination`](TimelineProjection::begin_back_pagination)
//! and [`finish_back_pagination`](TimelineProjection::finish_back_pagination)
//! so the async [`Timeline`](crate::Timeline) handle can await the engine in
//! between without holding the projection.

use prism_core::{
    ApplyDiff, DesyncError, DiffOp, DiffProjector, Observable, PaginationError, RoomId, Snapshot,
    Subscriber,
};

use crate::{
    EventItem, EventKey, PaginationOutcome, PaginationStatus, TimelineConfig, TimelineItem,
    virtuals::{self, VirtualInputs},
};

/// Event sequence plus derived display sequence of one room.
#[derive(Debug)]
pub struct TimelineProjection {
    room_id: RoomId,
    config: TimelineConfig,
    /// Authoritative events, oldest-first.
    events: DiffProjector<EventItem>,
    last_read: Option<EventKey>,
    typing: Vec<String>,
    status: Observable<PaginationStatus>,
    /// Count of display republications.
    version: u64,
    display: Observable<Snapshot<TimelineItem>>,
}

impl TimelineProjection {
    /// Create an empty timeline for `room_id`.
    pub fn new(room_id: impl Into<RoomId>, config: TimelineConfig) -> Self {
        let mut projection = Self {
            room_id: room_id.into(),
            config,
            events: DiffProjector::new(),
            last_read: None,
            typing: Vec::new(),
            status: Observable::new(PaginationStatus::default()),
            version: 0,
            display: Observable::new(Snapshot::empty()),
        };
        // Version 0 already carries the loading indicator.
        let initial = Snapshot::new(0, projection.render());
        projection.display = Observable::new(initial);
        projection
    }

    /// Room this timeline belongs to.
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Active configuration.
    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Apply one engine diff and republish the display sequence.
    ///
    /// # Errors
    ///
    /// Returns [`DesyncError`] if the diff does not fit the current event
    /// sequence. Nothing is republished in that case.
    pub fn apply(&mut self, op: DiffOp<EventItem>) -> Result<(), DesyncError> {
        self.events.apply(op)?;
        self.republish();
        Ok(())
    }

    /// Install cached events, newest chunk first.
    ///
    /// `items` is oldest-first. The newest `initial_chunk_size` events are
    /// published first, then the sequence grows backwards one chunk at a time.
    pub fn post_initial_items(&mut self, items: &[EventItem]) -> Result<(), DesyncError> {
        if items.is_empty() {
            return self.apply(DiffOp::Clear);
        }

        let chunk = self.config.initial_chunk_size.max(1);
        let mut start = items.len();
        while start > 0 {
            start = start.saturating_sub(chunk);
            self.apply(DiffOp::Replace { items: items[start..].to_vec() })?;
        }
        Ok(())
    }

    /// Move the read marker. Republishes only when the pointer changed.
    pub fn set_last_read(&mut self, key: Option<EventKey>) {
        if self.last_read != key {
            self.last_read = key;
            self.republish();
        }
    }

    /// Replace the set of typing users. Republishes only on change.
    pub fn set_typing(&mut self, users: Vec<String>) {
        if self.typing != users {
            self.typing = users;
            self.republish();
        }
    }

    /// Mark a backward pagination as started.
    ///
    /// # Errors
    ///
    /// [`PaginationError::CannotPaginate`] while another pagination runs or
    /// once the start of the room was reached.
    pub fn begin_back_pagination(&mut self) -> Result<(), PaginationError> {
        let status = *self.status.get();
        if status.is_paginating {
            return Err(PaginationError::CannotPaginate { reason: "already paginating" });
        }
        if !status.has_more_to_load {
            return Err(PaginationError::CannotPaginate { reason: "start of timeline reached" });
        }
        self.status.publish(PaginationStatus { is_paginating: true, ..status });
        Ok(())
    }

    /// Record the end of a backward pagination started with
    /// [`begin_back_pagination`](Self::begin_back_pagination).
    pub fn finish_back_pagination(&mut self, result: &Result<PaginationOutcome, PaginationError>) {
        let previous = *self.status.get();
        let has_more_to_load = match result {
            Ok(outcome) => previous.has_more_to_load && !outcome.hit_start,
            Err(_) => previous.has_more_to_load,
        };
        self.status.publish(PaginationStatus { is_paginating: false, has_more_to_load });

        // The loading indicator turns into the room beginning marker.
        if has_more_to_load != previous.has_more_to_load {
            self.republish();
        }
    }

    /// Current back-pagination state.
    pub fn pagination_status(&self) -> PaginationStatus {
        *self.status.get()
    }

    /// Subscribe to back-pagination state changes.
    pub fn subscribe_pagination(&mut self) -> Subscriber<PaginationStatus> {
        self.status.subscribe()
    }

    /// Authoritative events, oldest-first. Never contains virtual items.
    pub fn events(&self) -> &[EventItem] {
        self.events.items()
    }

    /// Subscribe to the raw event sequence without virtual items.
    pub fn subscribe_events(&mut self) -> Subscriber<Snapshot<EventItem>> {
        self.events.subscribe()
    }

    /// Latest display snapshot.
    pub fn snapshot(&self) -> Snapshot<TimelineItem> {
        self.display.get().clone()
    }

    /// Subscribe to display snapshots, starting with the current one.
    pub fn subscribe(&mut self) -> Subscriber<Snapshot<TimelineItem>> {
        self.display.subscribe()
    }

    fn render(&self) -> Vec<TimelineItem> {
        let inputs = VirtualInputs {
            last_read: self.last_read.as_ref(),
            typing: &self.typing,
            has_more_backwards: self.status.get().has_more_to_load,
            utc_offset_minutes: self.config.utc_offset_minutes,
            order: self.config.display_order,
        };
        virtuals::interleave(self.events.items(), &inputs)
    }

    fn republish(&mut self) {
        self.version += 1;
        let snapshot = Snapshot::new(self.version, self.render());
        self.display.publish(snapshot);
    }
}

impl ApplyDiff for TimelineProjection {
    type Item = EventItem;

    fn apply(&mut self, op: DiffOp<EventItem>) -> Result<(), DesyncError> {
        TimelineProjection::apply(self, op)
    }
}
