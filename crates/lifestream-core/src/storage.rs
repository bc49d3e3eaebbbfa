//! Blob persistence for events, notifications and settings.
//!
//! The storage medium is deliberately dumb: JSON blobs for the event list
//! and the notification log, TOML for settings, all under the app config
//! directory. Loads fall back to defaults; saves are fire-and-forget --
//! failures are logged and swallowed, because the in-memory state stays
//! authoritative for the session and a retry storm helps nobody.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::StorageError;
use crate::event::CalendarEvent;
use crate::notification::Notification;
use crate::settings::ReminderSettings;

/// Returns `~/.config/lifestream[-dev]/` based on LIFESTREAM_ENV.
///
/// Set LIFESTREAM_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("LIFESTREAM_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("lifestream-dev")
    } else {
        base_dir.join("lifestream")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StorageError::SaveFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

/// Best-effort key-value blob store over a directory.
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Open the default data directory.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open() -> Result<Self, StorageError> {
        Ok(Self { dir: data_dir()? })
    }

    /// Open over an explicit directory (tests, portable installs).
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn events_path(&self) -> PathBuf {
        self.dir.join("events.json")
    }

    fn notifications_path(&self) -> PathBuf {
        self.dir.join("notifications.json")
    }

    fn settings_path(&self) -> PathBuf {
        self.dir.join("config.toml")
    }

    /// Last-saved events, or empty when nothing was saved yet or the blob
    /// is unreadable.
    pub fn load_events(&self) -> Vec<CalendarEvent> {
        load_json(&self.events_path())
    }

    /// Persist events, best-effort.
    pub fn save_events(&self, events: &[CalendarEvent]) {
        save_json(&self.events_path(), events);
    }

    /// Last-saved notification log, or empty.
    pub fn load_notifications(&self) -> Vec<Notification> {
        load_json(&self.notifications_path())
    }

    /// Persist the notification log, best-effort.
    pub fn save_notifications(&self, notifications: &[Notification]) {
        save_json(&self.notifications_path(), notifications);
    }

    /// Last-saved settings, or the documented defaults.
    pub fn load_settings(&self) -> ReminderSettings {
        let path = self.settings_path();
        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "unparsable settings, using defaults");
                    ReminderSettings::default()
                }
            },
            Err(_) => ReminderSettings::default(),
        }
    }

    /// Persist settings, best-effort.
    pub fn save_settings(&self, settings: &ReminderSettings) {
        let path = self.settings_path();
        let content = match toml::to_string_pretty(settings) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to serialize settings");
                return;
            }
        };
        if let Err(e) = std::fs::write(&path, content) {
            warn!(path = %path.display(), error = %e, "failed to save settings");
        }
    }
}

fn load_json<T: serde::de::DeserializeOwned + Default>(path: &Path) -> T {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unparsable blob, using default");
                T::default()
            }
        },
        Err(_) => T::default(),
    }
}

fn save_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) {
    let content = match serde_json::to_string_pretty(value) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to serialize blob");
            return;
        }
    };
    if let Err(e) = std::fs::write(path, content) {
        warn!(path = %path.display(), error = %e, "failed to save blob");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn missing_files_load_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::with_dir(dir.path());

        assert!(store.load_events().is_empty());
        assert!(store.load_notifications().is_empty());
        assert_eq!(store.load_settings(), ReminderSettings::default());
    }

    #[test]
    fn events_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::with_dir(dir.path());

        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let event =
            CalendarEvent::new("Dentist", start, start + chrono::Duration::hours(1)).unwrap();
        store.save_events(std::slice::from_ref(&event));

        let loaded = store.load_events();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, event.id);
        assert_eq!(loaded[0].title, "Dentist");
        assert_eq!(loaded[0].start, event.start);
    }

    #[test]
    fn settings_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::with_dir(dir.path());

        let mut settings = ReminderSettings::default();
        settings.default_reminder_minutes = 30;
        settings.max_history_items = 10;
        store.save_settings(&settings);

        assert_eq!(store.load_settings(), settings);
    }

    #[test]
    fn corrupt_blob_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::with_dir(dir.path());

        std::fs::write(dir.path().join("events.json"), "{not json").unwrap();
        std::fs::write(dir.path().join("config.toml"), "= broken").unwrap();

        assert!(store.load_events().is_empty());
        assert_eq!(store.load_settings(), ReminderSettings::default());
    }

    #[test]
    fn save_into_missing_directory_does_not_panic() {
        let store = Store::with_dir("/nonexistent/lifestream-test");
        store.save_events(&[]);
        store.save_settings(&ReminderSettings::default());
    }
}
