//! Reminder scheduling and notification delivery.
//!
//! The evaluator decides *when* a reminder fires (at most once per
//! occurrence); the dispatcher decides *where* it goes (best-effort across
//! every enabled channel); the service wires both to the stores and drives
//! the tick-by-tick flow.

pub mod dispatcher;
pub mod evaluator;
pub mod retry;
pub mod service;

pub use dispatcher::{
    AudioPort, ChannelError, ChannelOutcome, ChannelStatus, DesktopPort, DispatchReport,
    Dispatcher, Mailer, NoopMailer, Permission,
};
pub use evaluator::{Evaluator, DEFAULT_TICK_MS};
pub use retry::{Retry, RetryError};
pub use service::ReminderService;
