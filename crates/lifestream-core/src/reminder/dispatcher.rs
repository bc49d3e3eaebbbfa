//! Fan-out delivery of a due reminder across the configured channels.
//!
//! Channels are attempted independently and never short-circuit: the
//! aggregate is best-effort-all, not all-or-nothing. Individual failures
//! are caught into the report; they never prevent the evaluator's
//! `notified` commit, which happened before dispatch was even called.
//!
//! Platform integration points (desktop alerts, audio playback, email)
//! are traits so the library stays headless. Implementations must return
//! promptly -- real I/O is expected to hand off and report back rather
//! than block the single control thread.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use super::retry::Retry;
use crate::event::CalendarEvent;
use crate::notification::{Notification, NotificationKind};
use crate::settings::{ChannelKind, ReminderSettings};

/// Desktop notification permission as reported by the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Permission {
    /// Never asked: the desktop channel is skipped silently.
    #[default]
    Default,
    Granted,
    /// Refused: surfaced to the user once, then skipped.
    Denied,
}

/// A channel delivery failure.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ChannelError(pub String);

/// Desktop alert backend.
pub trait DesktopPort {
    fn permission(&self) -> Permission;

    /// Ask the platform for permission. Implementations may no-op.
    fn request_permission(&mut self) -> Permission {
        self.permission()
    }

    fn notify(&mut self, title: &str, body: &str) -> Result<(), ChannelError>;
}

/// Audio cue backend.
pub trait AudioPort {
    /// Play the configured cue, or the default when `cue` is `None`.
    fn play(&mut self, cue: Option<&str>) -> Result<(), ChannelError>;
}

/// Email backend. The library itself never sends mail.
pub trait Mailer {
    fn send(&mut self, event: &CalendarEvent, message: &str) -> Result<(), ChannelError>;
}

/// The stock email placeholder: accepts and drops every message. Real
/// sending is an injected [`Mailer`] implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMailer;

impl Mailer for NoopMailer {
    fn send(&mut self, _event: &CalendarEvent, _message: &str) -> Result<(), ChannelError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    Delivered,
    /// Not attempted (disabled upstream, or permission not granted).
    Skipped,
    Failed,
}

/// Result of one channel attempt.
#[derive(Debug)]
pub struct ChannelOutcome {
    pub channel: ChannelKind,
    pub status: ChannelStatus,
    pub error: Option<ChannelError>,
}

impl ChannelOutcome {
    fn delivered(channel: ChannelKind) -> Self {
        Self {
            channel,
            status: ChannelStatus::Delivered,
            error: None,
        }
    }

    fn skipped(channel: ChannelKind) -> Self {
        Self {
            channel,
            status: ChannelStatus::Skipped,
            error: None,
        }
    }

    fn failed(channel: ChannelKind, error: ChannelError) -> Self {
        Self {
            channel,
            status: ChannelStatus::Failed,
            error: Some(error),
        }
    }
}

/// Aggregate result of dispatching one due event.
///
/// `notifications` carries the entries the caller must append to the
/// notification log; the dispatcher itself never touches the log so that
/// appends happen in the single control thread's natural order.
#[derive(Debug)]
pub struct DispatchReport {
    pub event_id: Uuid,
    pub outcomes: Vec<ChannelOutcome>,
    pub notifications: Vec<Notification>,
}

impl DispatchReport {
    pub fn status(&self, channel: ChannelKind) -> Option<ChannelStatus> {
        self.outcomes
            .iter()
            .find(|o| o.channel == channel)
            .map(|o| o.status)
    }
}

/// Best-effort fan-out over the enabled channels.
pub struct Dispatcher {
    desktop: Box<dyn DesktopPort>,
    audio: Box<dyn AudioPort>,
    mailer: Box<dyn Mailer>,
    desktop_retry: Retry,
    permission_notice_sent: bool,
}

impl Dispatcher {
    pub fn new(
        desktop: Box<dyn DesktopPort>,
        audio: Box<dyn AudioPort>,
        mailer: Box<dyn Mailer>,
    ) -> Self {
        Self {
            desktop,
            audio,
            mailer,
            desktop_retry: Retry::new(3, std::time::Duration::from_secs(1)),
            permission_notice_sent: false,
        }
    }

    /// Override the desktop delivery retry policy.
    pub fn with_desktop_retry(mut self, retry: Retry) -> Self {
        self.desktop_retry = retry;
        self
    }

    /// Ask the desktop backend for permission (startup courtesy; channels
    /// tolerate every answer).
    pub fn request_permission(&mut self) -> Permission {
        self.desktop.request_permission()
    }

    /// Attempt every enabled channel for one due event. Failures are
    /// captured per channel; no attempt blocks or cancels another.
    pub fn dispatch(
        &mut self,
        event: &CalendarEvent,
        settings: &ReminderSettings,
        now: DateTime<Utc>,
    ) -> DispatchReport {
        let message = reminder_message(event, now);
        let mut outcomes = Vec::new();
        let mut notifications = Vec::new();

        if settings.channel_enabled(ChannelKind::Desktop) {
            outcomes.push(self.deliver_desktop(event, &message, now, &mut notifications));
        }
        if settings.channel_enabled(ChannelKind::InApp) {
            notifications.push(
                Notification::new(NotificationKind::Reminder, &event.title, &message, now)
                    .with_related_event(event.id),
            );
            outcomes.push(ChannelOutcome::delivered(ChannelKind::InApp));
        }
        if settings.channel_enabled(ChannelKind::Sound) {
            outcomes.push(self.deliver_sound(settings));
        }
        if settings.channel_enabled(ChannelKind::Email) {
            outcomes.push(self.deliver_email(event, &message));
        }

        DispatchReport {
            event_id: event.id,
            outcomes,
            notifications,
        }
    }

    fn deliver_desktop(
        &mut self,
        event: &CalendarEvent,
        message: &str,
        now: DateTime<Utc>,
        notifications: &mut Vec<Notification>,
    ) -> ChannelOutcome {
        match self.desktop.permission() {
            Permission::Default => ChannelOutcome::skipped(ChannelKind::Desktop),
            Permission::Denied => {
                if !self.permission_notice_sent {
                    self.permission_notice_sent = true;
                    notifications.push(Notification::new(
                        NotificationKind::System,
                        "Desktop notifications blocked",
                        "Desktop alerts are disabled by the system. \
                         Reminders will still appear in the notification center.",
                        now,
                    ));
                }
                ChannelOutcome::skipped(ChannelKind::Desktop)
            }
            Permission::Granted => {
                let title = format!("Reminder: {}", event.title);
                let retry = self.desktop_retry;
                match retry.run(|| self.desktop.notify(&title, message)) {
                    Ok(()) => ChannelOutcome::delivered(ChannelKind::Desktop),
                    Err(err) => {
                        warn!(
                            event_id = %event.id,
                            attempts = err.attempts,
                            error = %err.last,
                            "desktop delivery failed"
                        );
                        notifications.push(
                            Notification::new(
                                NotificationKind::Error,
                                "Reminder delivery failed",
                                format!(
                                    "Could not deliver a desktop alert for \"{}\"",
                                    event.title
                                ),
                                now,
                            )
                            .with_related_event(event.id),
                        );
                        ChannelOutcome::failed(ChannelKind::Desktop, err.last)
                    }
                }
            }
        }
    }

    fn deliver_sound(&mut self, settings: &ReminderSettings) -> ChannelOutcome {
        match self.audio.play(settings.sound_cue()) {
            Ok(()) => ChannelOutcome::delivered(ChannelKind::Sound),
            Err(err) => {
                // Best-effort playback: logged, recorded, never surfaced.
                debug!(error = %err, "sound cue failed");
                ChannelOutcome::failed(ChannelKind::Sound, err)
            }
        }
    }

    fn deliver_email(&mut self, event: &CalendarEvent, message: &str) -> ChannelOutcome {
        match self.mailer.send(event, message) {
            Ok(()) => ChannelOutcome::delivered(ChannelKind::Email),
            Err(err) => {
                warn!(event_id = %event.id, error = %err, "email delivery failed");
                ChannelOutcome::failed(ChannelKind::Email, err)
            }
        }
    }
}

/// The in-app/desktop message body: the event's description, or a
/// "starts in N minutes" line with N rounded and floored at zero.
pub(crate) fn reminder_message(event: &CalendarEvent, now: DateTime<Utc>) -> String {
    if let Some(desc) = event.description.as_deref() {
        if !desc.trim().is_empty() {
            return desc.to_string();
        }
    }
    let millis = (event.start - now).num_milliseconds();
    let minutes = ((millis as f64 / 60_000.0).round()).max(0.0) as i64;
    if minutes == 1 {
        "Starts in 1 minute.".to_string()
    } else {
        format!("Starts in {minutes} minutes.")
    }
}
