//! # LifeStream Core Library
//!
//! Core business logic for the LifeStream personal calendar: the reminder
//! scheduling and notification-delivery engine, the event and notification
//! stores, user settings, and the language-model extraction boundary. The
//! CLI binary (and any GUI shell) is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Reminder Evaluator**: a wall-clock pass over the event set that
//!   decides, at most once per occurrence, when a reminder fires. The
//!   caller drives it by invoking `tick()` periodically -- no internal
//!   threads or timers, `now` is always injected.
//! - **Delivery Dispatcher**: best-effort fan-out over the enabled
//!   channels (desktop, in-app, sound, email) with independent failure
//!   modes; platform backends are injected trait objects.
//! - **Stores**: in-memory event store and a bounded newest-first
//!   notification center, persisted as JSON blobs; TOML settings.
//!
//! ## Key Components
//!
//! - [`ReminderService`]: ties everything into the tick-by-tick flow
//! - [`Evaluator`]: the pure scan-and-decide pass
//! - [`Dispatcher`]: channel fan-out
//! - [`AssistantClient`]: language-model event extraction

pub mod assistant;
pub mod calendar;
pub mod error;
pub mod event;
pub mod notification;
pub mod reminder;
pub mod settings;
pub mod storage;

pub use assistant::{AssistantClient, ChatMessage, ChatRole, ExtractionResponse, ProposedEvent};
pub use calendar::ViewMode;
pub use error::{AssistantError, CoreError, Result, StorageError, ValidationError};
pub use event::{CalendarEvent, EventStore, EventType, Priority};
pub use notification::{Notification, NotificationCenter, NotificationKind};
pub use reminder::{
    AudioPort, DesktopPort, DispatchReport, Dispatcher, Evaluator, Mailer, NoopMailer, Permission,
    ReminderService, Retry,
};
pub use settings::{ChannelConfig, ChannelKind, ReminderSettings, SettingsPatch};
pub use storage::Store;
