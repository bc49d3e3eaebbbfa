//! Language-model event extraction boundary.
//!
//! The model is an external collaborator: given free text, the current
//! event list and the date the user is looking at, it proposes zero or
//! more events plus a confirmation message in the input's language. This
//! module owns the wire contract and the defensive coercion of whatever
//! comes back -- unknown enum strings, missing end times, unparsable
//! instants -- so that nothing invalid ever reaches the event store.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::error::{AssistantError, ValidationError};
use crate::event::{CalendarEvent, EventType, Priority};
use crate::settings::ReminderSettings;

pub const DEFAULT_API_URL: &str = "https://api.deepseek.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// One event as proposed by the model. Times are ISO-8601 strings with an
/// explicit or implied offset; everything else is loose text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedEvent {
    pub title: String,
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

/// The model's full answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResponse {
    #[serde(default)]
    pub events_to_add: Vec<ProposedEvent>,
    #[serde(default)]
    pub confirmation_message: String,
}

/// Chat transcript roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry in the conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp,
        }
    }
}

/// Coerce one proposal into a store-ready event.
///
/// - `start` must parse as RFC 3339; otherwise the proposal is rejected.
/// - `end` missing or unparsable defaults to `start + 1 hour`; an end
///   before the start is treated the same way.
/// - `type`/`priority` coerce to `Other`/`Medium`.
/// - The lead time comes from settings at creation time.
///
/// # Errors
///
/// Returns an error for an unparsable `start` or a blank title.
pub fn materialize(
    proposal: &ProposedEvent,
    settings: &ReminderSettings,
) -> Result<CalendarEvent, ValidationError> {
    let start = parse_instant(&proposal.start).ok_or_else(|| ValidationError::InvalidValue {
        field: "start".to_string(),
        message: format!("unparsable instant '{}'", proposal.start),
    })?;
    let end = proposal
        .end
        .as_deref()
        .and_then(parse_instant)
        .filter(|end| *end >= start)
        .unwrap_or_else(|| start + Duration::hours(1));

    let mut event = CalendarEvent::new(proposal.title.clone(), start, end)?;
    event.description = proposal
        .description
        .clone()
        .filter(|d| !d.trim().is_empty());
    event.event_type = proposal
        .event_type
        .as_deref()
        .map(EventType::from_loose)
        .unwrap_or_default();
    event.priority = proposal
        .priority
        .as_deref()
        .map(Priority::from_loose)
        .unwrap_or_default();
    event.reminder_minutes = settings.default_reminder_minutes;
    Ok(event)
}

/// Coerce every proposal, skipping rejects with a warning.
pub fn materialize_all(
    response: &ExtractionResponse,
    settings: &ReminderSettings,
) -> Vec<CalendarEvent> {
    response
        .events_to_add
        .iter()
        .filter_map(|proposal| match materialize(proposal, settings) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(title = %proposal.title, error = %e, "skipping unusable proposal");
                None
            }
        })
        .collect()
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct AssistantClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl AssistantClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Ask the model to turn `transcript` into calendar events.
    ///
    /// `view_date` is the calendar cursor (what "next Tuesday" is relative
    /// to when the user is browsing another month); `now` anchors relative
    /// dates like "tomorrow".
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the response does not
    /// follow the JSON contract.
    pub async fn extract_events(
        &self,
        transcript: &str,
        current_events: &[CalendarEvent],
        view_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<ExtractionResponse, AssistantError> {
        let prompt = build_prompt(transcript, current_events, view_date, now);
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.7,
            "response_format": { "type": "json_object" },
        });

        let response: serde_json::Value = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(AssistantError::MissingContent)?;
        parse_extraction(content)
    }
}

/// Parse the model's message content, tolerating a markdown code fence.
pub(crate) fn parse_extraction(content: &str) -> Result<ExtractionResponse, AssistantError> {
    let trimmed = strip_code_fence(content);
    serde_json::from_str(trimmed).map_err(|e| AssistantError::MalformedResponse(e.to_string()))
}

fn strip_code_fence(s: &str) -> &str {
    let t = s.trim();
    let t = t
        .strip_prefix("```json")
        .or_else(|| t.strip_prefix("```"))
        .unwrap_or(t);
    let t = t.strip_suffix("```").unwrap_or(t);
    t.trim()
}

fn build_prompt(
    transcript: &str,
    current_events: &[CalendarEvent],
    view_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> String {
    let mut existing = String::new();
    for event in current_events {
        existing.push_str(&format!(
            "- {} ({} .. {})\n",
            event.title,
            event.start.to_rfc3339(),
            event.end.to_rfc3339()
        ));
    }
    if existing.is_empty() {
        existing.push_str("(none)\n");
    }

    format!(
        "You are an intelligent calendar assistant.\n\
         \n\
         CRITICAL CONTEXT:\n\
         - Current time (right now): {now}\n\
         - The user is currently viewing the calendar around: {view}\n\
         - Existing events:\n{existing}\
         \n\
         Parse the user's natural language request and extract calendar events.\n\
         \n\
         Rules for time calculation:\n\
         1. Base relative dates (\"tomorrow\", \"this afternoon\") on the current time above.\n\
         2. Output 'start' and 'end' as ISO 8601 strings with an explicit offset.\n\
         3. If no duration is specified, assume 1 hour.\n\
         \n\
         Categorization rules:\n\
         1. Categorize events into WORK, PERSONAL, URGENT, or OTHER.\n\
         2. Determine priority: HIGH (crucial/urgent), MEDIUM (standard), or LOW \
         (optional/flexible). Default to MEDIUM.\n\
         \n\
         Language rules: the 'confirmationMessage' MUST be in the same language as \
         the user's input.\n\
         \n\
         Return an empty array for 'eventsToAdd' if the user is just chatting.\n\
         \n\
         User request: {transcript}\n\
         \n\
         Output only valid JSON in this format:\n\
         {{\"eventsToAdd\": [{{\"title\": \"Event Title\", \"start\": \
         \"2024-10-27T14:30:00+08:00\", \"end\": \"2024-10-27T15:30:00+08:00\", \
         \"description\": \"Event Description\", \"type\": \"WORK\", \"priority\": \
         \"MEDIUM\"}}], \"confirmationMessage\": \"Confirmation in the user's language\"}}",
        now = now.to_rfc3339(),
        view = view_date.to_rfc3339(),
        existing = existing,
        transcript = transcript,
    )
}
