//! Reminder settings: channel enablement, default lead time, retention cap.
//!
//! Settings are plain explicit state handed to the evaluator and dispatcher
//! at construction or call time -- never ambient globals -- with a
//! load-at-startup / mutate-on-user-action / persist-on-every-mutation
//! lifecycle driven by the caller. Stored as TOML via the storage module.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The delivery channels this build knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChannelKind {
    Desktop,
    InApp,
    Sound,
    Email,
}

impl ChannelKind {
    /// Key under `[channels]` in the settings file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::InApp => "in_app",
            Self::Sound => "sound",
            Self::Email => "email",
        }
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-channel configuration: enablement plus channel-specific extras.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Cue file for the sound channel. `None` means the default cue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
}

impl ChannelConfig {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            sound: None,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            sound: None,
        }
    }
}

/// User-configurable reminder policy.
///
/// Serialized to/from TOML at `~/.config/lifestream/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSettings {
    /// Lead time applied to newly created events. Consulted at creation
    /// time only; changing it never rewrites existing events.
    #[serde(default = "default_reminder_minutes")]
    pub default_reminder_minutes: u32,
    /// Notification-log retention cap. Zero disables trimming.
    #[serde(default = "default_max_history")]
    pub max_history_items: usize,
    /// Channel name -> config. The channel set is driven by this map, not
    /// hardcoded at call sites.
    #[serde(default = "default_channels")]
    pub channels: BTreeMap<String, ChannelConfig>,
}

fn default_reminder_minutes() -> u32 {
    15
}

fn default_max_history() -> usize {
    50
}

fn default_channels() -> BTreeMap<String, ChannelConfig> {
    BTreeMap::from([
        (ChannelKind::Desktop.as_str().to_string(), ChannelConfig::enabled()),
        (ChannelKind::InApp.as_str().to_string(), ChannelConfig::enabled()),
        (ChannelKind::Sound.as_str().to_string(), ChannelConfig::enabled()),
        (ChannelKind::Email.as_str().to_string(), ChannelConfig::disabled()),
    ])
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            default_reminder_minutes: default_reminder_minutes(),
            max_history_items: default_max_history(),
            channels: default_channels(),
        }
    }
}

impl ReminderSettings {
    /// Whether a channel should be attempted. Channels absent from the map
    /// are disabled.
    pub fn channel_enabled(&self, kind: ChannelKind) -> bool {
        self.channels
            .get(kind.as_str())
            .map(|c| c.enabled)
            .unwrap_or(false)
    }

    pub fn set_channel_enabled(&mut self, kind: ChannelKind, enabled: bool) {
        self.channels
            .entry(kind.as_str().to_string())
            .or_default()
            .enabled = enabled;
    }

    /// Configured sound cue, if any.
    pub fn sound_cue(&self) -> Option<&str> {
        self.channels
            .get(ChannelKind::Sound.as_str())
            .and_then(|c| c.sound.as_deref())
    }

    /// Apply a partial patch atomically. Channel entries merge per key;
    /// scalar fields replace when present.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(channels) = patch.channels {
            for (name, config) in channels {
                self.channels.insert(name, config);
            }
        }
        if let Some(minutes) = patch.default_reminder_minutes {
            self.default_reminder_minutes = minutes;
        }
        if let Some(cap) = patch.max_history_items {
            self.max_history_items = cap;
        }
    }

    /// Get a settings value as a string by dot-separated key, e.g.
    /// `channels.desktop.enabled` or `default_reminder_minutes`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a settings value by dot-separated key. Persisting the mutation
    /// is the caller's responsibility.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown key or an unparsable value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ValidationError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ValidationError::InvalidValue {
            field: key.to_string(),
            message: e.to_string(),
        })?;
        set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ValidationError::InvalidValue {
            field: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

fn get_json_value_by_path<'a>(
    root: &'a serde_json::Value,
    key: &str,
) -> Option<&'a serde_json::Value> {
    if key.is_empty() {
        return None;
    }
    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn set_json_value_by_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), ValidationError> {
    let invalid = |message: String| ValidationError::InvalidValue {
        field: key.to_string(),
        message,
    };

    let mut parts = key.split('.').peekable();
    if parts.peek().is_none() {
        return Err(invalid("settings key is empty".to_string()));
    }

    let mut current = root;
    while let Some(part) = parts.next() {
        let is_leaf = parts.peek().is_none();
        if is_leaf {
            let obj = current
                .as_object_mut()
                .ok_or_else(|| invalid("unknown settings key".to_string()))?;
            let existing = obj
                .get(part)
                .ok_or_else(|| invalid("unknown settings key".to_string()))?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    let n = value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                    serde_json::Value::Number(n.into())
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.to_string()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        current = current
            .get_mut(part)
            .ok_or_else(|| invalid("unknown settings key".to_string()))?;
    }

    Err(invalid("unknown settings key".to_string()))
}

/// Partial settings update. Absent fields are untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    pub channels: Option<BTreeMap<String, ChannelConfig>>,
    pub default_reminder_minutes: Option<u32>,
    pub max_history_items: Option<usize>,
}

impl SettingsPatch {
    /// Names of the fields this patch touches, for the settings-change
    /// notification.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.channels.is_some() {
            fields.push("channels");
        }
        if self.default_reminder_minutes.is_some() {
            fields.push("default_reminder_minutes");
        }
        if self.max_history_items.is_some() {
            fields.push("max_history_items");
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }
}
