//! Projection graph of one session.

use std::{collections::HashMap, sync::Arc};

use prism_core::{CancellationToken, DesyncReport, RoomId};
use prism_roomlist::RoomList;
use prism_timeline::Timeline;
use tokio::sync::{Mutex, mpsc};

use crate::{Session, SessionConfig, SessionError, SessionId};

/// Everything the presentation layer observes for one session: the room list
/// and the timelines opened so far.
///
/// All projections hang off the graph's cancellation token, so closing the
/// graph stops every feed and aborts every in-flight request at once.
pub struct SessionGraph {
    session: Session,
    config: SessionConfig,
    cancel: CancellationToken,
    reports: Option<mpsc::UnboundedSender<DesyncReport>>,
    room_list: RoomList,
    timelines: Mutex<HashMap<RoomId, Arc<Timeline>>>,
}

impl std::fmt::Debug for SessionGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGraph")
            .field("session", &self.session)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl SessionGraph {
    /// Build the graph and start its room list.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        session: Session,
        config: SessionConfig,
        parent: &CancellationToken,
        reports: Option<mpsc::UnboundedSender<DesyncReport>>,
    ) -> Self {
        let cancel = parent.child_token();
        let feed =
            session.engine().create_room_list(config.room_list.page_size, &config.initial_filter);
        let room_list = RoomList::spawn(
            config.room_list.clone(),
            config.initial_filter.clone(),
            feed.source,
            feed.batches,
            reports.clone(),
            &cancel,
        );

        Self { session, config, cancel, reports, room_list, timelines: Mutex::new(HashMap::new()) }
    }

    /// Session this graph belongs to.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Session identifier.
    pub fn id(&self) -> &SessionId {
        self.session.id()
    }

    /// Room list of the session.
    pub fn room_list(&self) -> &RoomList {
        &self.room_list
    }

    /// Timeline of `room_id`, opening it on first use.
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] once the graph was closed, or whatever the
    /// engine reports for the room.
    pub async fn timeline(&self, room_id: &str) -> Result<Arc<Timeline>, SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }
        if let Some(timeline) = self.timelines.lock().await.get(room_id) {
            return Ok(Arc::clone(timeline));
        }

        // The engine is awaited without the map lock; a concurrent open of the
        // same room wins and this feed is dropped.
        let feed = self.session.engine().open_timeline(room_id).await?;
        let mut timelines = self.timelines.lock().await;
        if self.is_closed() {
            return Err(SessionError::Closed);
        }
        let timeline = timelines.entry(room_id.to_string()).or_insert_with(|| {
            Arc::new(Timeline::spawn(
                room_id,
                self.config.timeline.clone(),
                feed.source,
                feed.batches,
                self.reports.clone(),
                &self.cancel,
            ))
        });
        Ok(Arc::clone(timeline))
    }

    /// Close the timeline of `room_id`. Returns whether it was open.
    pub async fn close_timeline(&self, room_id: &str) -> bool {
        match self.timelines.lock().await.remove(room_id) {
            Some(timeline) => {
                timeline.close();
                true
            },
            None => false,
        }
    }

    /// Rooms with an open timeline.
    pub async fn open_rooms(&self) -> Vec<RoomId> {
        let mut rooms: Vec<RoomId> = self.timelines.lock().await.keys().cloned().collect();
        rooms.sort();
        rooms
    }

    /// Stop every projection of this graph.
    pub fn close(&self) {
        if !self.cancel.is_cancelled() {
            tracing::debug!(session_id = %self.id(), "session graph closed");
        }
        self.cancel.cancel();
    }

    /// Whether the graph was closed, directly or through its registry.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for SessionGraph {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
