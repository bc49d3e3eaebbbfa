use clap::Subcommand;
use lifestream_core::{NotificationCenter, Store};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum NotifyAction {
    /// List notifications as JSON, newest first
    List {
        /// Only unread entries
        #[arg(long)]
        unread: bool,
    },
    /// Mark one notification read
    Read { id: Uuid },
    /// Mark everything read
    ReadAll,
    /// Delete one notification
    Delete { id: Uuid },
    /// Delete everything
    Clear,
}

pub fn run(action: NotifyAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;
    let settings = store.load_settings();
    let mut center =
        NotificationCenter::from_items(store.load_notifications(), settings.max_history_items);

    match action {
        NotifyAction::List { unread } => {
            if unread {
                let items: Vec<_> = center.items().iter().filter(|n| !n.is_read).collect();
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                println!("{}", serde_json::to_string_pretty(center.items())?);
            }
            eprintln!("{} total, {} unread", center.len(), center.unread_count());
            return Ok(());
        }
        NotifyAction::Read { id } => {
            if !center.mark_read(id) {
                return Err(format!("no notification {id}").into());
            }
        }
        NotifyAction::ReadAll => center.mark_all_read(),
        NotifyAction::Delete { id } => {
            center.delete(id);
        }
        NotifyAction::Clear => center.clear(),
    }

    store.save_notifications(center.items());
    Ok(())
}
