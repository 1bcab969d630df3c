//! Event provisioning: turning a finalized slot into a calendar event
//! with a joinable link.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_rusqlite::Connection;

use super::models::Participant;
use crate::core::AppConfig;
use crate::google::{self, GoogleError, gcal, oauth};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    #[error("Calendar authorization required, visit {auth_url}")]
    ReauthorizationRequired { auth_url: String },

    #[error("Calendar integration is not configured")]
    NotConfigured,

    #[error("Calendar provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("Calendar provider temporarily unavailable: {0}")]
    Transient(String),

    #[error("Calendar provider failed: {0}")]
    Failed(String),
}

impl ProvisionError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProvisionError::Timeout(_) | ProvisionError::Transient(_))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventRequest {
    pub meeting_id: String,
    pub title: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub organizer: Participant,
    pub attendees: Vec<Participant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedEvent {
    pub event_id: String,
    pub join_link: String,
}

#[async_trait]
pub trait EventProvisioner: Send + Sync {
    async fn create_event(&self, request: &EventRequest) -> Result<ProvisionedEvent, ProvisionError>;
}

pub type BoxedProvisioner = Arc<dyn EventProvisioner>;

/// Creates Google Calendar events with a Meet conference on the
/// organizer's calendar using their stored refresh token.
pub struct GoogleMeetProvisioner {
    db: Connection,
    config: AppConfig,
    client: reqwest::Client,
}

impl GoogleMeetProvisioner {
    pub fn new(db: Connection, config: AppConfig) -> Self {
        Self {
            db,
            config,
            client: reqwest::Client::new(),
        }
    }

    fn consent_url(&self, login_hint: &str) -> String {
        oauth::authorization_url(
            &self.config.google_auth_url,
            &self.config.google_client_id,
            &self.config.google_redirect_uri,
            oauth::CALENDAR_SCOPE,
            Some(login_hint),
        )
    }

    fn classify(&self, err: GoogleError, login_hint: &str) -> ProvisionError {
        match err {
            GoogleError::InvalidGrant | GoogleError::Unauthorized(_) => {
                ProvisionError::ReauthorizationRequired {
                    auth_url: self.consent_url(login_hint),
                }
            }
            err if err.is_transient() => ProvisionError::Transient(err.to_string()),
            err => ProvisionError::Failed(err.to_string()),
        }
    }
}

#[async_trait]
impl EventProvisioner for GoogleMeetProvisioner {
    async fn create_event(&self, request: &EventRequest) -> Result<ProvisionedEvent, ProvisionError> {
        if !self.config.google_configured() {
            return Err(ProvisionError::NotConfigured);
        }
        let organizer_email = request.organizer.email.clone();

        let refresh_token = google::find_refresh_token(&self.db, &organizer_email)
            .await
            .map_err(|e| ProvisionError::Failed(e.to_string()))?;
        let Some(refresh_token) = refresh_token else {
            tracing::warn!("No calendar authorization stored for {}", organizer_email);
            return Err(ProvisionError::ReauthorizationRequired {
                auth_url: self.consent_url(&organizer_email),
            });
        };

        let token = oauth::refresh_access_token(
            &self.client,
            &self.config.google_oauth_url,
            &self.config.google_client_id,
            &self.config.google_client_secret,
            &refresh_token,
        )
        .await
        .map_err(|e| self.classify(e, &organizer_email))?;

        let event = gcal::NewMeetEvent::from_request(request);
        let created = gcal::insert_meet_event(
            &self.client,
            &self.config.google_api_url,
            &token.access_token,
            &self.config.calendar_id,
            &event,
        )
        .await
        .map_err(|e| self.classify(e, &organizer_email))?;

        Ok(ProvisionedEvent {
            event_id: created.id,
            join_link: created.join_link,
        })
    }
}
