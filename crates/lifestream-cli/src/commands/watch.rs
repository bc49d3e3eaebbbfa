//! Foreground reminder loop.
//!
//! Runs the evaluator on a tokio interval until ctrl-c. Dropping out of
//! the loop stops the timer before the service is torn down; there is no
//! other cancellation to worry about.

use std::io::Write;

use chrono::Utc;
use lifestream_core::reminder::dispatcher::ChannelError;
use lifestream_core::{
    AudioPort, DesktopPort, Dispatcher, NoopMailer, Permission, ReminderService, Store,
};

/// Desktop alerts for a terminal session: printed lines. Permission is
/// always granted -- there is no prompt to deny.
struct TerminalDesktop;

impl DesktopPort for TerminalDesktop {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn notify(&mut self, title: &str, body: &str) -> Result<(), ChannelError> {
        println!("{title} -- {body}");
        Ok(())
    }
}

/// The terminal bell stands in for a sound cue.
struct TerminalBell;

impl AudioPort for TerminalBell {
    fn play(&mut self, _cue: Option<&str>) -> Result<(), ChannelError> {
        print!("\x07");
        std::io::stdout()
            .flush()
            .map_err(|e| ChannelError(e.to_string()))
    }
}

pub fn run(interval_secs: u64) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;
    let dispatcher = Dispatcher::new(
        Box::new(TerminalDesktop),
        Box::new(TerminalBell),
        Box::new(NoopMailer),
    );

    let interval_secs = interval_secs.max(1);
    let mut service = ReminderService::with_store(store, dispatcher);
    service.set_tick(chrono::Duration::seconds(interval_secs as i64));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        service.startup(Utc::now());
        eprintln!("watching {} events, ticking every {interval_secs}s (ctrl-c to stop)",
            service.events().len());

        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    service.tick(Utc::now());
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }
    });

    Ok(())
}
