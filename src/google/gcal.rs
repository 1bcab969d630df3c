//! Google Calendar event insertion with a Meet conference attached.

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use super::GoogleError;
use crate::meetings::EventRequest;

/// Event payload. `id` and `request_id` are derived from the meeting
/// and slot so a retried insert lands on the same event and the same
/// conference instead of creating a second link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMeetEvent {
    pub id: String,
    pub request_id: String,
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendees: Vec<String>,
}

/// Google event ids only allow base32hex characters (a-v, 0-9).
fn event_id(meeting_id: &str, start: DateTime<Utc>) -> String {
    let meeting: String = meeting_id
        .to_ascii_lowercase()
        .chars()
        .filter(|c| matches!(c, '0'..='9' | 'a'..='v'))
        .collect();
    format!("ms{}{}", meeting, start.timestamp())
}

impl NewMeetEvent {
    pub fn from_request(request: &EventRequest) -> Self {
        let mut attendees: Vec<String> = std::iter::once(&request.organizer)
            .chain(request.attendees.iter())
            .map(|p| p.email.clone())
            .collect();
        attendees.sort();
        attendees.dedup();

        Self {
            id: event_id(&request.meeting_id, request.start),
            request_id: format!("{}-{}", request.meeting_id, request.start.timestamp()),
            summary: request.title.clone(),
            description: request.description.clone(),
            start: request.start,
            end: request.end,
            attendees,
        }
    }

    fn body(&self) -> Value {
        json!({
            "id": self.id,
            "summary": self.summary,
            "description": self.description,
            "start": { "dateTime": self.start.to_rfc3339() },
            "end": { "dateTime": self.end.to_rfc3339() },
            "attendees": self
                .attendees
                .iter()
                .map(|email| json!({ "email": email }))
                .collect::<Vec<_>>(),
            "conferenceData": {
                "createRequest": {
                    "requestId": self.request_id,
                    "conferenceSolutionKey": { "type": "hangoutsMeet" }
                }
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct EntryPoint {
    #[serde(rename = "entryPointType")]
    entry_point_type: String,
    uri: String,
}

#[derive(Debug, Deserialize)]
struct ConferenceData {
    #[serde(rename = "entryPoints", default)]
    entry_points: Vec<EntryPoint>,
}

#[derive(Debug, Deserialize)]
struct EventResource {
    id: String,
    #[serde(rename = "hangoutLink")]
    hangout_link: Option<String>,
    #[serde(rename = "conferenceData")]
    conference_data: Option<ConferenceData>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEvent {
    pub id: String,
    pub join_link: String,
}

impl TryFrom<EventResource> for CreatedEvent {
    type Error = GoogleError;

    fn try_from(event: EventResource) -> Result<Self, Self::Error> {
        let video_entry = event.conference_data.and_then(|data| {
            data.entry_points
                .into_iter()
                .find(|e| e.entry_point_type == "video")
                .map(|e| e.uri)
        });
        let join_link = event
            .hangout_link
            .or(video_entry)
            .ok_or(GoogleError::MissingField("hangoutLink"))?;
        Ok(CreatedEvent {
            id: event.id,
            join_link,
        })
    }
}

fn events_url(api_base_url: &str, calendar_id: &str) -> String {
    format!(
        "{}/calendar/v3/calendars/{}/events",
        api_base_url,
        urlencoding::encode(calendar_id)
    )
}

/// Insert the event, or fetch it when a previous attempt already
/// created it.
pub async fn insert_meet_event(
    client: &Client,
    api_base_url: &str,
    access_token: &str,
    calendar_id: &str,
    event: &NewMeetEvent,
) -> Result<CreatedEvent, GoogleError> {
    let url = format!(
        "{}?conferenceDataVersion=1&sendUpdates=all",
        events_url(api_base_url, calendar_id)
    );
    let res = client
        .post(&url)
        .bearer_auth(access_token)
        .json(&event.body())
        .send()
        .await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();

    if status == StatusCode::CONFLICT {
        tracing::info!("Calendar event {} already exists, reusing it", event.id);
        return get_event(client, api_base_url, access_token, calendar_id, &event.id).await;
    }
    if !status.is_success() {
        return Err(GoogleError::from_status(status, text));
    }

    let resource: EventResource = serde_json::from_str(&text)?;
    resource.try_into()
}

pub async fn get_event(
    client: &Client,
    api_base_url: &str,
    access_token: &str,
    calendar_id: &str,
    event_id: &str,
) -> Result<CreatedEvent, GoogleError> {
    let url = format!(
        "{}/{}",
        events_url(api_base_url, calendar_id),
        urlencoding::encode(event_id)
    );
    let res = client.get(&url).bearer_auth(access_token).send().await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(GoogleError::from_status(status, text));
    }
    let resource: EventResource = serde_json::from_str(&text)?;
    resource.try_into()
}
