//! Composition root for the reminder flow.
//!
//! `ReminderService` owns the stores and policy, runs the evaluator pass,
//! hands due events to the dispatcher, commits the resulting notifications
//! to the log (retention trims on every append), and persists mutated
//! state best-effort. Everything happens on the caller's thread: one
//! `tick` is a single synchronous scan-decide-mutate sequence, atomic with
//! respect to any other event-store mutation the caller performs between
//! ticks. The caller drives the cadence -- a tokio interval, a test loop,
//! whatever -- and stops ticking at teardown.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::dispatcher::{DispatchReport, Dispatcher};
use super::evaluator::Evaluator;
use crate::event::{CalendarEvent, EventStore};
use crate::notification::{Notification, NotificationCenter, NotificationKind};
use crate::settings::{ReminderSettings, SettingsPatch};
use crate::storage::Store;

pub struct ReminderService {
    events: EventStore,
    notifications: NotificationCenter,
    settings: ReminderSettings,
    evaluator: Evaluator,
    dispatcher: Dispatcher,
    store: Option<Store>,
}

impl ReminderService {
    /// A service over empty in-memory state, no persistence.
    pub fn new(settings: ReminderSettings, dispatcher: Dispatcher) -> Self {
        let cap = settings.max_history_items;
        Self {
            events: EventStore::new(),
            notifications: NotificationCenter::new(cap),
            settings,
            evaluator: Evaluator::default(),
            dispatcher,
            store: None,
        }
    }

    /// Load events, notifications and settings from `store`; subsequent
    /// mutations persist back to it.
    pub fn with_store(store: Store, dispatcher: Dispatcher) -> Self {
        let settings = store.load_settings();
        let events = EventStore::from_events(store.load_events());
        let notifications =
            NotificationCenter::from_items(store.load_notifications(), settings.max_history_items);
        Self {
            events,
            notifications,
            settings,
            evaluator: Evaluator::default(),
            dispatcher,
            store: Some(store),
        }
    }

    /// Match the evaluator's window tolerance to the caller's actual tick
    /// cadence.
    pub fn set_tick(&mut self, tick: Duration) {
        self.evaluator = Evaluator::new(tick);
    }

    /// Startup sequence: request desktop permission, announce readiness,
    /// and run the immediate first pass.
    pub fn startup(&mut self, now: DateTime<Utc>) -> Vec<DispatchReport> {
        self.dispatcher.request_permission();
        self.notifications.push(Notification::new(
            NotificationKind::System,
            "LifeStream calendar ready",
            "Your calendar is loaded and reminders are active.",
            now,
        ));
        self.persist_notifications();
        self.tick(now)
    }

    /// One evaluator tick: scan, decide, dispatch, commit, persist.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<DispatchReport> {
        let due = self.evaluator.pass(self.events.events_mut(), now);
        let mut reports = Vec::with_capacity(due.len());
        for event in &due {
            let report = self.dispatcher.dispatch(event, &self.settings, now);
            for notification in &report.notifications {
                self.notifications.push(notification.clone());
            }
            reports.push(report);
        }
        if !due.is_empty() {
            self.persist_events();
            self.persist_notifications();
        }
        reports
    }

    // ── Events ───────────────────────────────────────────────────────

    pub fn events(&self) -> &EventStore {
        &self.events
    }

    /// Insert an event. Callers creating events from user input should set
    /// `reminder_minutes` from [`ReminderSettings::default_reminder_minutes`]
    /// before inserting; the service does not rewrite it.
    pub fn add_event(&mut self, event: CalendarEvent) -> crate::Result<Uuid> {
        let id = self.events.insert(event)?;
        self.persist_events();
        Ok(id)
    }

    pub fn delete_event(&mut self, id: Uuid) -> bool {
        let removed = self.events.delete(id);
        if removed {
            self.persist_events();
        }
        removed
    }

    pub fn toggle_completed(&mut self, id: Uuid) -> Option<bool> {
        let result = self.events.toggle_completed(id);
        if result.is_some() {
            self.persist_events();
        }
        result
    }

    pub fn set_reminder_enabled(&mut self, id: Uuid, enabled: bool) -> Option<bool> {
        let result = self.events.set_reminder_enabled(id, enabled);
        if result.is_some() {
            self.persist_events();
        }
        result
    }

    pub fn set_reminder_minutes(&mut self, id: Uuid, minutes: u32) -> Option<u32> {
        let result = self.events.set_reminder_minutes(id, minutes);
        if result.is_some() {
            self.persist_events();
        }
        result
    }

    pub fn reschedule(
        &mut self,
        id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> crate::Result<bool> {
        let moved = self.events.reschedule(id, start, end)?;
        if moved {
            self.persist_events();
        }
        Ok(moved)
    }

    // ── Notifications ────────────────────────────────────────────────

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn mark_notification_read(&mut self, id: Uuid) -> bool {
        let changed = self.notifications.mark_read(id);
        if changed {
            self.persist_notifications();
        }
        changed
    }

    pub fn mark_all_notifications_read(&mut self) {
        self.notifications.mark_all_read();
        self.persist_notifications();
    }

    pub fn delete_notification(&mut self, id: Uuid) -> bool {
        let removed = self.notifications.delete(id);
        if removed {
            self.persist_notifications();
        }
        removed
    }

    pub fn clear_notifications(&mut self) {
        self.notifications.clear();
        self.persist_notifications();
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn settings(&self) -> &ReminderSettings {
        &self.settings
    }

    /// Apply a partial settings patch, persist, and record the change in
    /// the notification center.
    pub fn update_settings(&mut self, patch: SettingsPatch, now: DateTime<Utc>) {
        if patch.is_empty() {
            return;
        }
        let changed = patch.changed_fields().join(", ");
        self.settings.apply(patch);
        self.notifications
            .set_max_history(self.settings.max_history_items);
        self.notifications.push(Notification::new(
            NotificationKind::System,
            "Reminder settings updated",
            format!("Updated: {changed}"),
            now,
        ));
        self.persist_settings();
        self.persist_notifications();
    }

    // ── Persistence (best-effort) ────────────────────────────────────

    fn persist_events(&self) {
        if let Some(store) = &self.store {
            store.save_events(self.events.events());
        }
    }

    fn persist_notifications(&self) {
        if let Some(store) = &self.store {
            store.save_notifications(self.notifications.items());
        }
    }

    fn persist_settings(&self) {
        if let Some(store) = &self.store {
            store.save_settings(&self.settings);
        }
    }
}
