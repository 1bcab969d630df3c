//! Google OAuth and Calendar clients used to provision meeting links.

pub mod gcal;
pub mod oauth;

use anyhow::Result;
use reqwest::StatusCode;
use rusqlite::OptionalExtension;
use thiserror::Error;
use tokio_rusqlite::Connection;

const AUTH_SERVICE: &str = "google_calendar";

#[derive(Error, Debug)]
pub enum GoogleError {
    #[error("Refresh token was revoked or expired")]
    InvalidGrant,

    #[error("Google rejected the credentials: {0}")]
    Unauthorized(String),

    #[error("Google API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Google response missing {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

impl GoogleError {
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let scope_problem = body.contains("insufficientPermissions")
            || body.contains("ACCESS_TOKEN_SCOPE_INSUFFICIENT");
        match status {
            StatusCode::UNAUTHORIZED => GoogleError::Unauthorized(body),
            StatusCode::FORBIDDEN if scope_problem => GoogleError::Unauthorized(body),
            _ => GoogleError::Api {
                status: status.as_u16(),
                body,
            },
        }
    }

    /// Failures worth retrying later without user involvement.
    pub fn is_transient(&self) -> bool {
        match self {
            GoogleError::Api { status, body } => {
                *status == 429 || *status >= 500 || body.contains("rateLimitExceeded")
            }
            GoogleError::Http(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }
}

/// Look up the stored refresh token for an organizer's email.
pub async fn find_refresh_token(db: &Connection, email: &str) -> Result<Option<String>> {
    let email = email.to_string();
    let token = db
        .call(move |conn| {
            let token = conn
                .query_row(
                    "SELECT refresh_token FROM auth WHERE id = ?1 AND service = ?2",
                    (&email, AUTH_SERVICE),
                    |row| row.get(0),
                )
                .optional()?;
            Ok(token)
        })
        .await?;
    Ok(token)
}

pub async fn store_refresh_token(db: &Connection, email: &str, refresh_token: &str) -> Result<()> {
    let email = email.to_string();
    let refresh_token = refresh_token.to_string();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO auth (id, service, refresh_token) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET service = excluded.service, refresh_token = excluded.refresh_token",
            (&email, AUTH_SERVICE, &refresh_token),
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}
