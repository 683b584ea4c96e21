//! Script replay against pure projections.
//!
//! No engine is involved: paging requests produced by the room list are
//! logged and dropped, and recorded pagination completions are fed straight
//! into the timeline's pagination state.

use prism_core::{ApplyDiff, BatchDesync};
use prism_roomlist::{RoomListConfig, RoomListFilter, RoomListProjection};
use prism_timeline::{PaginationOutcome, TimelineConfig, TimelineProjection};

use crate::{ReplayError, RoomListStep, Script, TimelineStep, render};

/// Replay settings.
#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    /// Timeline settings.
    pub timeline: TimelineConfig,
    /// Room list settings.
    pub room_list: RoomListConfig,
    /// Stop at the first desync instead of skipping the rest of the batch.
    pub strict: bool,
}

/// Desync observed at one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDesync {
    /// Zero-based step index.
    pub step: usize,
    /// What went wrong.
    pub desync: BatchDesync,
}

/// Result of a replay.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    /// Steps replayed.
    pub steps: usize,
    /// Diff operations applied.
    pub applied: usize,
    /// Desyncs skipped over.
    pub desyncs: Vec<StepDesync>,
    /// Final snapshot version.
    pub version: u64,
    /// Final snapshot, one line per item.
    pub lines: Vec<String>,
    /// Final snapshot as JSON.
    pub items: serde_json::Value,
}

struct Tally {
    strict: bool,
    applied: usize,
    desyncs: Vec<StepDesync>,
}

impl Tally {
    fn record(
        &mut self,
        step: usize,
        result: Result<usize, BatchDesync>,
    ) -> Result<(), ReplayError> {
        match result {
            Ok(applied) => {
                self.applied += applied;
                Ok(())
            },
            Err(desync) => {
                self.applied += desync.applied;
                tracing::warn!(
                    step,
                    op = desync.source.op(),
                    skipped = desync.skipped,
                    error = %desync.source,
                    "desync"
                );
                if self.strict {
                    return Err(ReplayError::Desync { step, source: desync });
                }
                self.desyncs.push(StepDesync { step, desync });
                Ok(())
            },
        }
    }
}

/// Replay `script` from an empty projection.
///
/// # Errors
///
/// [`ReplayError::Desync`] in strict mode, [`ReplayError::Json`] if the
/// final snapshot cannot be encoded.
pub fn replay(script: &Script, options: &ReplayOptions) -> Result<ReplayOutcome, ReplayError> {
    let mut tally = Tally { strict: options.strict, applied: 0, desyncs: Vec::new() };

    let (version, lines, items) = match script {
        Script::Timeline { room_id, steps } => {
            let mut projection = TimelineProjection::new(room_id.clone(), options.timeline.clone());
            for (index, step) in steps.iter().enumerate() {
                replay_timeline_step(&mut projection, index, step, &mut tally)?;
            }
            let snapshot = projection.snapshot();
            let items = serde_json::to_value(snapshot.items())?;
            (snapshot.version(), render::timeline_lines(&snapshot), items)
        },
        Script::RoomList { steps } => {
            let mut projection = RoomListProjection::new(options.room_list.clone());
            for (index, step) in steps.iter().enumerate() {
                replay_room_list_step(&mut projection, index, step, &mut tally)?;
            }
            tracing::info!(
                pages = projection.loaded_pages(),
                filter = ?projection.filter(),
                "room list replayed"
            );
            let snapshot = projection.snapshot();
            let items = serde_json::to_value(snapshot.items())?;
            (snapshot.version(), render::room_lines(&snapshot), items)
        },
    };

    Ok(ReplayOutcome {
        steps: script.len(),
        applied: tally.applied,
        desyncs: tally.desyncs,
        version,
        lines,
        items,
    })
}

fn replay_timeline_step(
    projection: &mut TimelineProjection,
    index: usize,
    step: &TimelineStep,
    tally: &mut Tally,
) -> Result<(), ReplayError> {
    match step {
        TimelineStep::Batch { ops } => tally.record(index, projection.apply_batch(ops.clone()))?,
        TimelineStep::Initial { items } => {
            let chunks = items.len().div_ceil(projection.config().initial_chunk_size.max(1)).max(1);
            let result = projection
                .post_initial_items(items)
                .map(|()| chunks)
                .map_err(|source| BatchDesync { applied: 0, skipped: 0, source });
            tally.record(index, result)?;
        },
        TimelineStep::LastRead { key } => projection.set_last_read(key.clone()),
        TimelineStep::Typing { users } => projection.set_typing(users.clone()),
        TimelineStep::Paginated { hit_start } => match projection.begin_back_pagination() {
            Ok(()) => {
                projection.finish_back_pagination(&Ok(PaginationOutcome { hit_start: *hit_start }));
            },
            Err(error) => tracing::debug!(step = index, %error, "pagination step ignored"),
        },
    }
    Ok(())
}

fn replay_room_list_step(
    projection: &mut RoomListProjection,
    index: usize,
    step: &RoomListStep,
    tally: &mut Tally,
) -> Result<(), ReplayError> {
    let actions = match step {
        RoomListStep::Batch { ops } => {
            tally.record(index, projection.apply_batch(ops.clone()))?;
            Vec::new()
        },
        RoomListStep::Filter { query } => {
            projection.update_filter(RoomListFilter::from_query(query))
        },
        RoomListStep::Active { active } => projection.set_is_active(*active),
        RoomListStep::LoadMore => projection.load_more(),
        RoomListStep::Reset => projection.reset(),
    };
    for action in actions {
        tracing::debug!(step = index, ?action, "engine request (not sent)");
    }
    Ok(())
}
