use chrono::Utc;
use clap::Subcommand;
use lifestream_core::{Notification, NotificationCenter, NotificationKind, Store};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the full settings as TOML
    Show,
    /// Get one value by dot-separated key (e.g. channels.desktop.enabled)
    Get { key: String },
    /// Set one value by dot-separated key
    Set { key: String, value: String },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;
    let mut settings = store.load_settings();

    match action {
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(&settings)?);
        }
        ConfigAction::Get { key } => {
            let value = settings
                .get(&key)
                .ok_or_else(|| format!("unknown settings key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            settings.set(&key, &value)?;
            store.save_settings(&settings);

            // Settings changes show up in the notification center, like
            // every other mutation a user makes.
            let mut center = NotificationCenter::from_items(
                store.load_notifications(),
                settings.max_history_items,
            );
            center.push(Notification::new(
                NotificationKind::System,
                "Reminder settings updated",
                format!("Updated: {key}"),
                Utc::now(),
            ));
            store.save_notifications(center.items());
        }
    }

    Ok(())
}
