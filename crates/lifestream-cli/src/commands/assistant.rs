use chrono::Utc;
use clap::Subcommand;
use lifestream_core::{assistant, AssistantClient, EventStore, Store};

#[derive(Subcommand)]
pub enum AssistantAction {
    /// Turn free text into calendar events via the language model
    Ask { text: String },
}

pub fn run(action: AssistantAction) -> Result<(), Box<dyn std::error::Error>> {
    let AssistantAction::Ask { text } = action;

    let api_key = std::env::var("LIFESTREAM_API_KEY")
        .map_err(|_| "LIFESTREAM_API_KEY is not set")?;
    let mut client = AssistantClient::new(api_key);
    if let Ok(url) = std::env::var("LIFESTREAM_API_URL") {
        client = client.with_endpoint(url);
    }
    if let Ok(model) = std::env::var("LIFESTREAM_MODEL") {
        client = client.with_model(model);
    }

    let store = Store::open()?;
    let settings = store.load_settings();
    let mut events = EventStore::from_events(store.load_events());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let now = Utc::now();
    let response =
        runtime.block_on(client.extract_events(&text, events.events(), now, now))?;

    for event in assistant::materialize_all(&response, &settings) {
        let title = event.title.clone();
        let id = events.insert(event)?;
        println!("added {id}  {title}");
    }
    store.save_events(events.events());

    println!("{}", response.confirmation_message);
    Ok(())
}
