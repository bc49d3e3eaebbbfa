use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::Subcommand;
use lifestream_core::{calendar, CalendarEvent, EventStore, EventType, Priority, Store};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum EventAction {
    /// Create an event
    Add {
        title: String,
        /// Start instant, RFC 3339 (e.g. 2026-03-01T15:00:00+08:00)
        #[arg(long)]
        at: String,
        /// End instant, RFC 3339. Defaults to one hour after start
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// WORK, PERSONAL, URGENT or OTHER (unknown values become OTHER)
        #[arg(long, default_value = "OTHER")]
        r#type: String,
        /// LOW, MEDIUM or HIGH (unknown values become MEDIUM)
        #[arg(long, default_value = "MEDIUM")]
        priority: String,
        /// Lead time in minutes. Defaults to the configured default
        #[arg(long)]
        remind: Option<u32>,
    },
    /// List events as JSON, optionally for a single day
    List {
        /// Day filter, YYYY-MM-DD
        #[arg(long)]
        day: Option<NaiveDate>,
    },
    /// Toggle completion
    Complete { id: Uuid },
    /// Change the reminder: --minutes sets the lead time, --off disables
    Remind {
        id: Uuid,
        #[arg(long, conflicts_with = "off")]
        minutes: Option<u32>,
        #[arg(long)]
        off: bool,
    },
    /// Move an event in time
    Move {
        id: Uuid,
        /// New start instant, RFC 3339
        #[arg(long)]
        at: String,
        /// New end instant, RFC 3339. Defaults to one hour after start
        #[arg(long)]
        end: Option<String>,
    },
    /// Delete an event
    Delete { id: Uuid },
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .map_err(|e| format!("invalid instant '{s}': {e}"))?
        .with_timezone(&Utc))
}

pub fn run(action: EventAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;
    let settings = store.load_settings();
    let mut events = EventStore::from_events(store.load_events());

    match action {
        EventAction::Add {
            title,
            at,
            end,
            description,
            r#type,
            priority,
            remind,
        } => {
            let start = parse_instant(&at)?;
            let end = match end {
                Some(e) => parse_instant(&e)?,
                None => start + Duration::hours(1),
            };
            let mut event = CalendarEvent::new(title, start, end)?;
            event.description = description;
            event.event_type = EventType::from_loose(&r#type);
            event.priority = Priority::from_loose(&priority);
            event.reminder_minutes = remind.unwrap_or(settings.default_reminder_minutes);
            let id = events.insert(event)?;
            store.save_events(events.events());
            println!("{id}");
        }
        EventAction::List { day } => {
            match day {
                Some(day) => {
                    let on_day = calendar::events_on_day(events.events(), day);
                    println!("{}", serde_json::to_string_pretty(&on_day)?);
                }
                None => println!("{}", serde_json::to_string_pretty(events.events())?),
            };
        }
        EventAction::Complete { id } => {
            let done = events
                .toggle_completed(id)
                .ok_or_else(|| format!("no event {id}"))?;
            store.save_events(events.events());
            println!("{}", if done { "completed" } else { "reopened" });
        }
        EventAction::Remind { id, minutes, off } => {
            let result = if off {
                events.set_reminder_enabled(id, false).map(|_| ())
            } else if let Some(minutes) = minutes {
                events.set_reminder_minutes(id, minutes).map(|_| ())
            } else {
                return Err("pass --minutes N or --off".into());
            };
            result.ok_or_else(|| format!("no event {id}"))?;
            store.save_events(events.events());
        }
        EventAction::Move { id, at, end } => {
            let start = parse_instant(&at)?;
            let end = match end {
                Some(e) => parse_instant(&e)?,
                None => start + Duration::hours(1),
            };
            if !events.reschedule(id, start, end)? {
                return Err(format!("no event {id}").into());
            }
            store.save_events(events.events());
        }
        EventAction::Delete { id } => {
            events.delete(id);
            store.save_events(events.events());
        }
    }

    Ok(())
}
