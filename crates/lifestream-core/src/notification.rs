//! Notification records and the bounded, newest-first notification center.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::{CalendarEvent, EventStore};

/// What produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Reminder,
    System,
    Info,
    Success,
    Warning,
    Error,
}

/// A single notification-center entry.
///
/// `related_event_id` is a weak back-reference: if the event is deleted
/// later, lookups return `None` and nothing dangles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_event_id: Option<Uuid>,
    #[serde(default)]
    pub is_read: bool,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            message: message.into(),
            kind,
            related_event_id: None,
            is_read: false,
            timestamp,
        }
    }

    pub fn with_related_event(mut self, event_id: Uuid) -> Self {
        self.related_event_id = Some(event_id);
        self
    }

    /// Resolve the weak event reference. A deleted event is simply "not
    /// found", never an error.
    pub fn related_event<'a>(&self, events: &'a EventStore) -> Option<&'a CalendarEvent> {
        self.related_event_id.and_then(|id| events.get(id))
    }
}

/// Ordered (newest-first) notification log with bounded retention.
///
/// Every append trims the log back to `max_history` entries by recency --
/// `timestamp` descending, not insertion order -- so the invariant holds
/// even when entries arrive with out-of-order timestamps. A cap of zero
/// disables trimming.
#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    items: Vec<Notification>,
    max_history: usize,
}

impl NotificationCenter {
    pub fn new(max_history: usize) -> Self {
        Self {
            items: Vec::new(),
            max_history,
        }
    }

    /// Wrap an already-loaded log (e.g. from persistence), enforcing the
    /// cap immediately.
    pub fn from_items(items: Vec<Notification>, max_history: usize) -> Self {
        let mut center = Self { items, max_history };
        center.trim();
        center
    }

    /// Append at the head, then enforce retention.
    pub fn push(&mut self, notification: Notification) {
        self.items.insert(0, notification);
        self.trim();
    }

    fn trim(&mut self) {
        if self.max_history == 0 || self.items.len() <= self.max_history {
            return;
        }
        // Stable sort: equal timestamps keep their head-insertion order.
        self.items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.items.truncate(self.max_history);
    }

    /// Change the retention cap, trimming immediately if it shrank.
    pub fn set_max_history(&mut self, max_history: usize) {
        self.max_history = max_history;
        self.trim();
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.is_read).count()
    }

    /// Mark one entry read. Idempotent; unknown ids are a no-op.
    pub fn mark_read(&mut self, id: Uuid) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.is_read = true;
                true
            }
            None => false,
        }
    }

    /// Mark everything read. Idempotent.
    pub fn mark_all_read(&mut self) {
        for n in &mut self.items {
            n.is_read = true;
        }
    }

    /// Delete one entry. Idempotent; returns whether anything was removed.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// Delete everything. Idempotent.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn note(title: &str, at: DateTime<Utc>) -> Notification {
        Notification::new(NotificationKind::Info, title, "", at)
    }

    #[test]
    fn push_inserts_at_head() {
        let mut center = NotificationCenter::new(0);
        center.push(note("first", t(0)));
        center.push(note("second", t(10)));
        assert_eq!(center.items()[0].title, "second");
        assert_eq!(center.items()[1].title, "first");
    }

    #[test]
    fn retention_keeps_exactly_cap_entries() {
        let mut center = NotificationCenter::new(3);
        for i in 0..10 {
            center.push(note(&format!("n{i}"), t(i)));
        }
        assert_eq!(center.len(), 3);
        // The three most recent by timestamp, newest first.
        let titles: Vec<_> = center.items().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["n9", "n8", "n7"]);
    }

    #[test]
    fn retention_trims_by_timestamp_not_insertion_order() {
        let mut center = NotificationCenter::new(2);
        center.push(note("old-but-late", t(0)));
        center.push(note("newest", t(100)));
        center.push(note("middle", t(50)));
        let titles: Vec<_> = center.items().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["newest", "middle"]);
    }

    #[test]
    fn zero_cap_disables_trimming() {
        let mut center = NotificationCenter::new(0);
        for i in 0..100 {
            center.push(note(&format!("n{i}"), t(i)));
        }
        assert_eq!(center.len(), 100);
    }

    #[test]
    fn shrinking_cap_trims_immediately() {
        let mut center = NotificationCenter::new(0);
        for i in 0..10 {
            center.push(note(&format!("n{i}"), t(i)));
        }
        center.set_max_history(4);
        assert_eq!(center.len(), 4);
        assert_eq!(center.items()[0].title, "n9");
    }

    #[test]
    fn mark_read_is_idempotent() {
        let mut center = NotificationCenter::new(0);
        let n = note("n", t(0));
        let id = n.id;
        center.push(n);

        assert_eq!(center.unread_count(), 1);
        assert!(center.mark_read(id));
        assert!(center.mark_read(id));
        assert_eq!(center.unread_count(), 0);
        assert!(!center.mark_read(Uuid::new_v4()));
    }

    #[test]
    fn mark_all_and_clear_are_idempotent() {
        let mut center = NotificationCenter::new(0);
        center.push(note("a", t(0)));
        center.push(note("b", t(1)));
        center.mark_all_read();
        center.mark_all_read();
        assert_eq!(center.unread_count(), 0);
        center.clear();
        center.clear();
        assert!(center.is_empty());
    }

    #[test]
    fn delete_is_idempotent() {
        let mut center = NotificationCenter::new(0);
        let n = note("n", t(0));
        let id = n.id;
        center.push(n);
        assert!(center.delete(id));
        assert!(!center.delete(id));
    }

    #[test]
    fn related_event_lookup_survives_deletion() {
        let mut events = EventStore::new();
        let event = CalendarEvent::new("Dentist", t(0), t(3600)).unwrap();
        let event_id = events.insert(event).unwrap();

        let n = Notification::new(NotificationKind::Reminder, "Dentist", "soon", t(0))
            .with_related_event(event_id);
        assert!(n.related_event(&events).is_some());

        events.delete(event_id);
        assert!(n.related_event(&events).is_none());
    }
}
