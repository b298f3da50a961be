//! Per-session activity log.
//!
//! An [`ActivityLog`] is written by the coordinator running a research
//! session and read concurrently by status pollers and stream subscribers.
//! Every field lives behind one `parking_lot::Mutex`, held only for the
//! field access itself, so a snapshot always reflects a whole set of
//! completed writes.

use super::event::{ActivityEvent, EventData, EventKind, EventValue};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use utoipa::ToSchema;

/// Number of most recent events retained and exposed in snapshots.
pub const EVENT_WINDOW: usize = 200;

/// Free-form attributes tracked for one subagent.
pub type SubagentState = BTreeMap<String, EventValue>;

/// Phase of a research session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResearchStatus {
    Starting,
    Planning,
    Executing,
    Synthesizing,
    Complete,
    Error,
}

impl ResearchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchStatus::Starting => "starting",
            ResearchStatus::Planning => "planning",
            ResearchStatus::Executing => "executing",
            ResearchStatus::Synthesizing => "synthesizing",
            ResearchStatus::Complete => "complete",
            ResearchStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ResearchStatus::Complete | ResearchStatus::Error)
    }
}

impl fmt::Display for ResearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable point-in-time copy of an [`ActivityLog`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivitySnapshot {
    pub active: bool,
    pub query: Option<String>,
    pub status: ResearchStatus,
    pub total_sources: u64,
    #[schema(value_type = Object)]
    pub subagents: BTreeMap<u32, SubagentState>,
    /// At most [`EVENT_WINDOW`] most recent events, oldest first
    pub events: Vec<ActivityEvent>,
    /// Events logged since the last reset, including ones outside the window
    pub total_events: u64,
    pub total_subagents: usize,
    pub completed_subagents: usize,
    pub duration_seconds: f64,
}

#[derive(Debug)]
struct LogState {
    active: bool,
    query: Option<String>,
    status: ResearchStatus,
    events: VecDeque<ActivityEvent>,
    total_events: u64,
    next_seq: u64,
    total_sources: u64,
    subagents: BTreeMap<u32, SubagentState>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl LogState {
    fn push(&mut self, kind: EventKind, message: String, data: EventData) {
        self.next_seq += 1;
        self.total_events += 1;
        if self.events.len() == EVENT_WINDOW {
            self.events.pop_front();
        }
        self.events.push_back(ActivityEvent {
            seq: self.next_seq,
            timestamp: Utc::now(),
            kind,
            message,
            data,
        });
    }

    fn is_terminal(&self) -> bool {
        !self.active && self.status.is_terminal()
    }
}

/// Thread-safe activity record of one research session.
#[derive(Debug)]
pub struct ActivityLog {
    state: Mutex<LogState>,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityLog {
    /// Create an empty, inactive log.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LogState {
                active: false,
                query: None,
                status: ResearchStatus::Starting,
                events: VecDeque::with_capacity(EVENT_WINDOW),
                total_events: 0,
                next_seq: 0,
                total_sources: 0,
                subagents: BTreeMap::new(),
                started_at: None,
                finished_at: None,
            }),
        }
    }

    /// Reinitialize every field for a new run and mark the log active.
    ///
    /// Sequence numbers keep counting across resets so stream consumers
    /// never see a number twice.
    pub fn reset(&self, query: Option<String>) {
        let mut state = self.state.lock();
        state.active = true;
        state.query = query;
        state.status = ResearchStatus::Starting;
        state.events.clear();
        state.total_events = 0;
        state.total_sources = 0;
        state.subagents.clear();
        state.started_at = Some(Utc::now());
        state.finished_at = None;
    }

    /// Append one event stamped with the current time.
    ///
    /// Dropped once the run is terminal; only a fresh `reset` reopens it.
    pub fn log(&self, message: impl Into<String>, kind: EventKind, data: EventData) {
        let mut state = self.state.lock();
        if state.is_terminal() {
            return;
        }
        state.push(kind, message.into(), data);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(message, EventKind::Info, EventData::new());
    }

    /// Overwrite the status. Ignored once the run reached a terminal state.
    pub fn set_status(&self, status: ResearchStatus) {
        let mut state = self.state.lock();
        if state.is_terminal() {
            return;
        }
        state.status = status;
    }

    /// Merge `fields` into the subagent entry, creating it when absent.
    /// Ignored once terminal.
    pub fn update_subagent<I, K>(&self, subtask_id: u32, fields: I)
    where
        I: IntoIterator<Item = (K, EventValue)>,
        K: Into<String>,
    {
        let mut state = self.state.lock();
        if state.is_terminal() {
            return;
        }
        let entry = state.subagents.entry(subtask_id).or_default();
        for (key, value) in fields {
            entry.insert(key.into(), value);
        }
    }

    /// Add to the source counter. Negative counts are clamped to zero.
    /// Ignored once terminal.
    pub fn add_sources(&self, count: i64) {
        let added = u64::try_from(count.max(0)).unwrap_or(0);
        let mut state = self.state.lock();
        if state.is_terminal() {
            return;
        }
        state.total_sources = state.total_sources.saturating_add(added);
    }

    /// Mark the run finished successfully.
    pub fn complete(&self) {
        let mut state = self.state.lock();
        state.active = false;
        state.status = ResearchStatus::Complete;
        state.finished_at.get_or_insert_with(Utc::now);
    }

    /// Record a terminal failure with an explanatory error event.
    ///
    /// Has no effect on a run that already completed.
    pub fn fail(&self, message: impl Into<String>) {
        let mut state = self.state.lock();
        if state.is_terminal() && state.status == ResearchStatus::Complete {
            return;
        }
        state.push(EventKind::Error, message.into(), EventData::new());
        state.active = false;
        state.status = ResearchStatus::Error;
        state.finished_at.get_or_insert_with(Utc::now);
    }

    pub fn status(&self) -> ResearchStatus {
        self.state.lock().status
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().active
    }

    /// True once the run completed or failed and no new run was started.
    pub fn is_terminal(&self) -> bool {
        self.state.lock().is_terminal()
    }

    pub fn total_sources(&self) -> u64 {
        self.state.lock().total_sources
    }

    /// Retained events with a sequence number greater than `seq`, oldest first.
    pub fn events_since(&self, seq: u64) -> Vec<ActivityEvent> {
        self.state
            .lock()
            .events
            .iter()
            .filter(|event| event.seq > seq)
            .cloned()
            .collect()
    }

    /// Take an independent copy of the current state.
    pub fn snapshot(&self) -> ActivitySnapshot {
        let state = self.state.lock();

        let completed_subagents = state
            .subagents
            .values()
            .filter(|entry| {
                entry.get("status").and_then(EventValue::as_str) == Some("completed")
            })
            .count();

        let duration_seconds = state
            .started_at
            .map(|start| {
                let end = state.finished_at.unwrap_or_else(Utc::now);
                (end - start).num_milliseconds().max(0) as f64 / 1000.0
            })
            .unwrap_or(0.0);

        ActivitySnapshot {
            active: state.active,
            query: state.query.clone(),
            status: state.status,
            total_sources: state.total_sources,
            subagents: state.subagents.clone(),
            events: state.events.iter().cloned().collect(),
            total_events: state.total_events,
            total_subagents: state.subagents.len(),
            completed_subagents,
            duration_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_data;
    use std::sync::Arc;

    #[test]
    fn test_new_log_is_inactive_and_empty() {
        let log = ActivityLog::new();
        let snap = log.snapshot();

        assert!(!snap.active);
        assert_eq!(snap.status, ResearchStatus::Starting);
        assert!(snap.query.is_none());
        assert!(snap.events.is_empty());
        assert_eq!(snap.total_sources, 0);
        assert_eq!(snap.duration_seconds, 0.0);
    }

    #[test]
    fn test_negative_sources_are_clamped() {
        let log = ActivityLog::new();
        log.reset(None);

        log.add_sources(-5);
        assert_eq!(log.total_sources(), 0);

        log.add_sources(3);
        assert_eq!(log.snapshot().total_sources, 3);
    }

    #[test]
    fn test_snapshot_keeps_most_recent_window() {
        let log = ActivityLog::new();
        log.reset(Some("q".to_string()));

        for i in 0..EVENT_WINDOW {
            log.info(format!("event {}", i));
        }
        let snap = log.snapshot();
        assert_eq!(snap.events.len(), EVENT_WINDOW);
        assert_eq!(snap.events[0].message, "event 0");

        log.info(format!("event {}", EVENT_WINDOW));
        let snap = log.snapshot();
        assert_eq!(snap.events.len(), EVENT_WINDOW);
        assert_eq!(snap.events[0].message, "event 1");
        assert_eq!(
            snap.events.last().unwrap().message,
            format!("event {}", EVENT_WINDOW)
        );
        assert_eq!(snap.total_events, EVENT_WINDOW as u64 + 1);
    }

    #[test]
    fn test_short_history_is_returned_whole() {
        let log = ActivityLog::new();
        log.reset(None);
        for i in 0..7 {
            log.info(format!("event {}", i));
        }
        assert_eq!(log.snapshot().events.len(), 7);
    }

    #[test]
    fn test_update_subagent_merges_fields() {
        let log = ActivityLog::new();
        log.reset(None);

        log.update_subagent(1, event_data! { "status" => "started" });
        log.update_subagent(1, event_data! { "sources" => 4u32 });

        let snap = log.snapshot();
        assert_eq!(snap.subagents.len(), 1);
        let entry = &snap.subagents[&1];
        assert_eq!(entry.len(), 2);
        assert_eq!(entry["status"], EventValue::from("started"));
        assert_eq!(entry["sources"], EventValue::Int(4));
    }

    #[test]
    fn test_update_subagent_overwrites_existing_key() {
        let log = ActivityLog::new();
        log.reset(None);

        log.update_subagent(2, event_data! { "status" => "started", "search_focus" => "rust" });
        log.update_subagent(2, event_data! { "status" => "completed" });

        let snap = log.snapshot();
        assert_eq!(snap.subagents[&2]["status"], EventValue::from("completed"));
        assert_eq!(snap.subagents[&2]["search_focus"], EventValue::from("rust"));
        assert_eq!(snap.completed_subagents, 1);
        assert_eq!(snap.total_subagents, 1);
    }

    #[test]
    fn test_reset_after_complete_reactivates() {
        let log = ActivityLog::new();
        log.reset(Some("first".to_string()));
        log.info("something happened");
        log.add_sources(2);
        log.complete();

        let snap = log.snapshot();
        assert!(!snap.active);
        assert_eq!(snap.status, ResearchStatus::Complete);

        log.reset(Some("second".to_string()));
        let snap = log.snapshot();
        assert!(snap.active);
        assert_eq!(snap.status, ResearchStatus::Starting);
        assert!(snap.events.is_empty());
        assert_eq!(snap.total_sources, 0);
        assert_eq!(snap.query.as_deref(), Some("second"));
    }

    #[test]
    fn test_complete_is_idempotent_and_terminal() {
        let log = ActivityLog::new();
        log.reset(None);
        log.complete();
        log.complete();
        log.set_status(ResearchStatus::Executing);

        assert!(log.is_terminal());
        assert_eq!(log.status(), ResearchStatus::Complete);
        assert!(!log.is_active());
    }

    #[test]
    fn test_fail_records_error_event() {
        let log = ActivityLog::new();
        log.reset(Some("q".to_string()));
        log.set_status(ResearchStatus::Executing);
        log.fail("Research failed: search provider unavailable");

        let snap = log.snapshot();
        assert!(!snap.active);
        assert_eq!(snap.status, ResearchStatus::Error);
        let last = snap.events.last().unwrap();
        assert_eq!(last.kind, EventKind::Error);
        assert!(last.message.contains("search provider unavailable"));
    }

    #[test]
    fn test_fail_does_not_override_completion() {
        let log = ActivityLog::new();
        log.reset(None);
        log.complete();
        log.fail("late failure");

        assert_eq!(log.status(), ResearchStatus::Complete);
        assert!(log.snapshot().events.is_empty());
    }

    #[test]
    fn test_terminal_log_rejects_late_writes() {
        let log = ActivityLog::new();
        log.reset(Some("q".to_string()));
        log.add_sources(1);
        log.fail("Research failed: boom");
        let before = log.snapshot();

        log.info("Subagent 2 found 1 sources");
        log.add_sources(4);
        log.update_subagent(2, [("status", EventValue::from("completed"))]);

        let after = log.snapshot();
        assert_eq!(after.total_sources, 1);
        assert_eq!(after.total_events, before.total_events);
        assert!(after.subagents.is_empty());
        assert_eq!(after.events.last().map(|e| e.kind), Some(EventKind::Error));
        assert!(log.events_since(before.events.last().map_or(0, |e| e.seq)).is_empty());
    }

    #[test]
    fn test_sequence_numbers_survive_reset() {
        let log = ActivityLog::new();
        log.reset(None);
        log.info("a");
        log.info("b");
        log.reset(None);
        log.info("c");

        let events = log.events_since(0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].seq, 3);
        assert!(log.events_since(3).is_empty());
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let log = ActivityLog::new();
        log.reset(None);
        log.info("before");

        let snap = log.snapshot();
        log.info("after");
        log.update_subagent(1, event_data! { "status" => "started" });

        assert_eq!(snap.events.len(), 1);
        assert!(snap.subagents.is_empty());
    }

    #[test]
    fn test_concurrent_snapshots_see_ordered_prefixes() {
        let log = Arc::new(ActivityLog::new());
        log.reset(None);

        let writer = {
            let log = Arc::clone(&log);
            std::thread::spawn(move || {
                for i in 0..150 {
                    log.info(format!("{}", i));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let snap = log.snapshot();
                        for (expected, event) in snap.events.iter().enumerate() {
                            assert_eq!(event.message, expected.to_string());
                            assert_eq!(event.seq, expected as u64 + 1);
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(log.snapshot().events.len(), 150);
    }
}
