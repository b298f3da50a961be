//! Session-scoped activity tracking
//!
//! Research runs report their progress here so that observers can follow a
//! session while it executes.
//!
//! # Architecture
//!
//! - [`ActivityLog`] - Thread-safe record of one session: status, events,
//!   per-subagent state and the running source count
//! - [`ActivitySessionRegistry`] - Maps opaque session ids to logs
//! - [`stream::event_stream`] - Incremental event delivery for SSE clients
//!
//! # Usage
//!
//! ```ignore
//! use multiscout::activity::{ActivitySessionRegistry, ResearchStatus};
//!
//! let registry = ActivitySessionRegistry::new();
//! let session_id = registry.create_session("What is RISC-V?");
//!
//! let log = registry.get(Some(&session_id));
//! log.set_status(ResearchStatus::Planning);
//! log.info("Planning research strategy");
//!
//! let snapshot = registry.snapshot(Some(&session_id));
//! assert_eq!(snapshot.status, ResearchStatus::Planning);
//! ```

/// Event records and payload values.
pub mod event;
/// The per-session log and its snapshots.
pub mod log;
/// Session id to log mapping.
pub mod registry;
/// Polling-based incremental event streams.
pub mod stream;

pub use event::{ActivityEvent, EventData, EventKind, EventValue};
pub use log::{ActivityLog, ActivitySnapshot, EVENT_WINDOW, ResearchStatus, SubagentState};
pub use registry::ActivitySessionRegistry;
pub use stream::{StreamSettings, event_stream};
