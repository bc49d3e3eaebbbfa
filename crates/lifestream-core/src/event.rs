//! Calendar event model and the in-memory event store.
//!
//! Events are single-occurrence: no recurrence expansion happens anywhere
//! in this crate. The `notified` flag is the single source of truth for
//! at-most-one reminder firing per occurrence; only the evaluator sets it
//! to `true`, while the store's reminder mutations reset it to `false` to
//! explicitly re-arm an edited event.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Event category. Unrecognized external input coerces to `Other`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Work,
    Personal,
    Urgent,
    #[default]
    Other,
}

impl EventType {
    /// Coerce a loose external string (e.g. language-model output) into the
    /// closed set. Unknown values map to `Other`.
    pub fn from_loose(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "WORK" => Self::Work,
            "PERSONAL" => Self::Personal,
            "URGENT" => Self::Urgent,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Work => "WORK",
            Self::Personal => "PERSONAL",
            Self::Urgent => "URGENT",
            Self::Other => "OTHER",
        }
    }
}

/// Event priority. Unrecognized external input coerces to `Medium`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Coerce a loose external string into the closed set. Unknown values
    /// map to `Medium`.
    pub fn from_loose(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Self::Low,
            "HIGH" => Self::High,
            _ => Self::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

/// A single-occurrence calendar event.
///
/// Serialized with the camelCase field names the persisted blobs use; the
/// serde defaults migrate older blobs that predate the reminder fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(rename = "type", default)]
    pub event_type: EventType,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default = "default_true")]
    pub reminder_enabled: bool,
    #[serde(default = "default_reminder_minutes")]
    pub reminder_minutes: u32,
    #[serde(default)]
    pub notified: bool,
}

fn default_true() -> bool {
    true
}

fn default_reminder_minutes() -> u32 {
    15
}

impl CalendarEvent {
    /// Create an event with defaults (`Other`/`Medium`, reminder on at 15
    /// minutes). The caller supplies `end`; this crate never infers a
    /// duration.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank title or `end < start`.
    pub fn new(
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if end < start {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            title,
            description: None,
            start,
            end,
            event_type: EventType::default(),
            priority: Priority::default(),
            is_completed: false,
            reminder_enabled: true,
            reminder_minutes: default_reminder_minutes(),
            notified: false,
        })
    }

    /// The instant the reminder should fire: `start - reminder_minutes`.
    pub fn reminder_instant(&self) -> DateTime<Utc> {
        self.start - Duration::milliseconds(i64::from(self.reminder_minutes) * 60_000)
    }

    /// Whether the event satisfies the store invariants. Deserialized blobs
    /// can violate them; the evaluator skips such events instead of
    /// trusting construction-time validation alone.
    pub fn is_well_formed(&self) -> bool {
        !self.title.trim().is_empty() && self.end >= self.start
    }
}

/// In-memory collection of calendar events.
///
/// All mutation goes through methods so the re-arm rule (reminder edits
/// reset `notified`) cannot be bypassed. Mutations are idempotent where
/// repeating them has a meaningful no-op (delete of a missing id).
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<CalendarEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already-loaded event list (e.g. from persistence).
    pub fn from_events(events: Vec<CalendarEvent>) -> Self {
        Self { events }
    }

    /// Insert a validated event, returning its id.
    ///
    /// # Errors
    ///
    /// Re-checks the construction invariants; deserialized events can
    /// arrive malformed.
    pub fn insert(&mut self, event: CalendarEvent) -> Result<Uuid, ValidationError> {
        if event.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if event.end < event.start {
            return Err(ValidationError::InvalidTimeRange {
                start: event.start,
                end: event.end,
            });
        }
        let id = event.id;
        self.events.push(event);
        Ok(id)
    }

    pub fn get(&self, id: Uuid) -> Option<&CalendarEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    /// Mutable access for the evaluator pass.
    pub fn events_mut(&mut self) -> &mut [CalendarEvent] {
        &mut self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove an event. Returns whether anything was removed.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.events.len();
        self.events.retain(|e| e.id != id);
        self.events.len() != before
    }

    /// Flip completion state. Independent of reminder state.
    pub fn toggle_completed(&mut self, id: Uuid) -> Option<bool> {
        let event = self.events.iter_mut().find(|e| e.id == id)?;
        event.is_completed = !event.is_completed;
        Some(event.is_completed)
    }

    /// Flip reminder enablement, re-arming the event for one future firing.
    pub fn toggle_reminder(&mut self, id: Uuid) -> Option<bool> {
        let event = self.events.iter_mut().find(|e| e.id == id)?;
        event.reminder_enabled = !event.reminder_enabled;
        event.notified = false;
        Some(event.reminder_enabled)
    }

    /// Set reminder enablement explicitly, re-arming the event.
    pub fn set_reminder_enabled(&mut self, id: Uuid, enabled: bool) -> Option<bool> {
        let event = self.events.iter_mut().find(|e| e.id == id)?;
        event.reminder_enabled = enabled;
        event.notified = false;
        Some(enabled)
    }

    /// Change the lead time. Re-enables the reminder and re-arms it.
    pub fn set_reminder_minutes(&mut self, id: Uuid, minutes: u32) -> Option<u32> {
        let event = self.events.iter_mut().find(|e| e.id == id)?;
        event.reminder_minutes = minutes;
        event.reminder_enabled = true;
        event.notified = false;
        Some(minutes)
    }

    /// Move an event in time. `notified` is left for the evaluator's
    /// window-correction rules to sort out on the next pass.
    ///
    /// # Errors
    ///
    /// Rejects `end < start`. Returns `Ok(false)` when the id is unknown.
    pub fn reschedule(
        &mut self,
        id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, ValidationError> {
        if end < start {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }
        match self.events.iter_mut().find(|e| e.id == id) {
            Some(event) => {
                event.start = start;
                event.end = end;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn loose_type_coercion_defaults_to_other() {
        assert_eq!(EventType::from_loose("work"), EventType::Work);
        assert_eq!(EventType::from_loose(" URGENT "), EventType::Urgent);
        assert_eq!(EventType::from_loose("banquet"), EventType::Other);
        assert_eq!(EventType::from_loose(""), EventType::Other);
    }

    #[test]
    fn loose_priority_coercion_defaults_to_medium() {
        assert_eq!(Priority::from_loose("high"), Priority::High);
        assert_eq!(Priority::from_loose("LOW"), Priority::Low);
        assert_eq!(Priority::from_loose("whenever"), Priority::Medium);
    }

    #[test]
    fn new_rejects_blank_title() {
        let err = CalendarEvent::new("   ", t(0), t(3600)).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyTitle));
    }

    #[test]
    fn new_rejects_end_before_start() {
        let err = CalendarEvent::new("Standup", t(3600), t(0)).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTimeRange { .. }));
    }

    #[test]
    fn reminder_instant_subtracts_lead_time() {
        let mut event = CalendarEvent::new("Standup", t(3600), t(7200)).unwrap();
        event.reminder_minutes = 15;
        assert_eq!(event.reminder_instant(), t(3600 - 15 * 60));
        event.reminder_minutes = 0;
        assert_eq!(event.reminder_instant(), event.start);
    }

    #[test]
    fn toggle_reminder_resets_notified() {
        let mut store = EventStore::new();
        let mut event = CalendarEvent::new("Dentist", t(0), t(3600)).unwrap();
        event.notified = true;
        let id = store.insert(event).unwrap();

        assert_eq!(store.toggle_reminder(id), Some(false));
        assert!(!store.get(id).unwrap().notified);
    }

    #[test]
    fn set_reminder_minutes_reenables_and_rearms() {
        let mut store = EventStore::new();
        let mut event = CalendarEvent::new("Dentist", t(0), t(3600)).unwrap();
        event.reminder_enabled = false;
        event.notified = true;
        let id = store.insert(event).unwrap();

        store.set_reminder_minutes(id, 30);
        let event = store.get(id).unwrap();
        assert!(event.reminder_enabled);
        assert!(!event.notified);
        assert_eq!(event.reminder_minutes, 30);
    }

    #[test]
    fn toggle_completed_leaves_reminder_state_alone() {
        let mut store = EventStore::new();
        let mut event = CalendarEvent::new("Gym", t(0), t(3600)).unwrap();
        event.notified = true;
        let id = store.insert(event).unwrap();

        assert_eq!(store.toggle_completed(id), Some(true));
        assert!(store.get(id).unwrap().notified);
        assert_eq!(store.toggle_completed(id), Some(false));
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = EventStore::new();
        let id = store
            .insert(CalendarEvent::new("Gym", t(0), t(3600)).unwrap())
            .unwrap();
        assert!(store.delete(id));
        assert!(!store.delete(id));
        assert!(store.is_empty());
    }

    #[test]
    fn serde_defaults_migrate_legacy_blobs() {
        // Blob written before the reminder fields existed.
        let json = format!(
            r#"{{"id":"{}","title":"Old","start":"2024-01-01T10:00:00Z","end":"2024-01-01T11:00:00Z","type":"WORK","priority":"HIGH"}}"#,
            Uuid::new_v4()
        );
        let event: CalendarEvent = serde_json::from_str(&json).unwrap();
        assert!(event.reminder_enabled);
        assert_eq!(event.reminder_minutes, 15);
        assert!(!event.notified);
        assert!(!event.is_completed);
    }
}
