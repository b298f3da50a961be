use super::log::{ActivityLog, ActivitySnapshot};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use uuid::Uuid;

/// Maps session identifiers to independent activity logs.
///
/// Sessions are created on demand and kept for the lifetime of the
/// registry; nothing is evicted.
#[derive(Debug, Default)]
pub struct ActivitySessionRegistry {
    sessions: RwLock<HashMap<String, Arc<ActivityLog>>>,
    /// Shared log for callers that do not pass a session id
    fallback: Arc<ActivityLog>,
}

impl ActivitySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh, reset log under a new random session id.
    pub fn create_session(&self, query: &str) -> String {
        let mut sessions = self.sessions.write();
        loop {
            let session_id = Uuid::new_v4().simple().to_string();
            if let Entry::Vacant(slot) = sessions.entry(session_id.clone()) {
                let log = ActivityLog::new();
                log.reset(Some(query.to_string()));
                slot.insert(Arc::new(log));
                tracing::debug!(session = %session_id, "Created activity session");
                return session_id;
            }
        }
    }

    /// Look up the log for `session_id`, creating an empty one on first reference.
    ///
    /// `None` and the empty string resolve to the shared fallback log.
    pub fn get(&self, session_id: Option<&str>) -> Arc<ActivityLog> {
        let session_id = match session_id {
            Some(id) if !id.is_empty() => id,
            _ => return Arc::clone(&self.fallback),
        };

        if let Some(log) = self.sessions.read().get(session_id) {
            return Arc::clone(log);
        }

        Arc::clone(
            self.sessions
                .write()
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(ActivityLog::new())),
        )
    }

    pub fn snapshot(&self, session_id: Option<&str>) -> ActivitySnapshot {
        self.get(session_id).snapshot()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().contains_key(session_id)
    }

    /// Number of sessions, not counting the fallback log.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ResearchStatus;
    use std::collections::HashSet;

    #[test]
    fn test_create_session_resets_log() {
        let registry = ActivitySessionRegistry::new();
        let id = registry.create_session("quantum computing");

        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));

        let snap = registry.snapshot(Some(&id));
        assert!(snap.active);
        assert_eq!(snap.status, ResearchStatus::Starting);
        assert_eq!(snap.query.as_deref(), Some("quantum computing"));
    }

    #[test]
    fn test_session_ids_are_unique() {
        let registry = ActivitySessionRegistry::new();
        let ids: HashSet<String> = (0..100).map(|_| registry.create_session("q")).collect();

        assert_eq!(ids.len(), 100);
        assert_eq!(registry.len(), 100);
    }

    #[test]
    fn test_get_unknown_session_creates_empty_log() {
        let registry = ActivitySessionRegistry::new();
        assert!(!registry.contains("not-yet-created"));

        let snap = registry.snapshot(Some("not-yet-created"));
        assert!(!snap.active);
        assert!(snap.events.is_empty());
        assert!(registry.contains("not-yet-created"));

        let first = registry.get(Some("not-yet-created"));
        let second = registry.get(Some("not-yet-created"));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_session_id_uses_fallback_log() {
        let registry = ActivitySessionRegistry::new();

        let a = registry.get(None);
        let b = registry.get(Some(""));
        assert!(Arc::ptr_eq(&a, &b));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_sessions_are_isolated() {
        let registry = ActivitySessionRegistry::new();
        let first = registry.create_session("first");
        let second = registry.create_session("second");

        registry.get(Some(&first)).info("only in first");
        registry.get(Some(&first)).add_sources(4);

        assert_eq!(registry.snapshot(Some(&first)).events.len(), 1);
        assert_eq!(registry.snapshot(Some(&first)).total_sources, 4);
        assert!(registry.snapshot(Some(&second)).events.is_empty());
        assert_eq!(registry.snapshot(Some(&second)).total_sources, 0);
    }
}
