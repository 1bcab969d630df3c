//! OAuth 2.0 helpers for Google's installed-app flow.

use reqwest::Client;
use serde::Deserialize;

use super::GoogleError;

pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.events";

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
}

/// Consent screen URL. `prompt=consent` makes Google return a fresh
/// refresh token even for users that authorized before.
pub fn authorization_url(
    auth_base_url: &str,
    client_id: &str,
    redirect_uri: &str,
    scope: &str,
    login_hint: Option<&str>,
) -> String {
    let mut url = format!(
        "{}/o/oauth2/v2/auth?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
        auth_base_url,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(scope)
    );
    if let Some(hint) = login_hint {
        url.push_str("&login_hint=");
        url.push_str(&urlencoding::encode(hint));
    }
    url
}

async fn token_request(
    client: &Client,
    oauth_base_url: &str,
    form: &[(&str, &str)],
) -> Result<OAuthToken, GoogleError> {
    let res = client
        .post(format!("{}/token", oauth_base_url))
        .form(form)
        .send()
        .await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        if text.contains("invalid_grant") {
            return Err(GoogleError::InvalidGrant);
        }
        return Err(GoogleError::from_status(status, text));
    }
    Ok(serde_json::from_str(&text)?)
}

pub async fn exchange_code_for_token(
    client: &Client,
    oauth_base_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<OAuthToken, GoogleError> {
    token_request(
        client,
        oauth_base_url,
        &[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ],
    )
    .await
}

pub async fn refresh_access_token(
    client: &Client,
    oauth_base_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<OAuthToken, GoogleError> {
    token_request(
        client,
        oauth_base_url,
        &[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ],
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_builds_the_consent_url() {
        let url = authorization_url(
            "https://accounts.google.com",
            "client id",
            "urn:ietf:wg:oauth:2.0:oob",
            CALENDAR_SCOPE,
            Some("host@example.com"),
        );
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?client_id=client%20id"));
        assert!(url.contains("access_type=offline"));
        assert!(url.ends_with("login_hint=host%40example.com"));
    }

    #[tokio::test]
    async fn it_refreshes_an_access_token() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .match_body(mockito::Matcher::UrlEncoded(
                "grant_type".to_string(),
                "refresh_token".to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "ya29.token", "expires_in": 3599, "token_type": "Bearer"}"#)
            .create_async()
            .await;

        let token = refresh_access_token(&Client::new(), &server.url(), "id", "secret", "refresh")
            .await
            .unwrap();
        assert_eq!(token.access_token, "ya29.token");
        assert_eq!(token.refresh_token, None);
    }

    #[tokio::test]
    async fn it_reports_revoked_refresh_tokens() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "invalid_grant", "error_description": "Token has been expired or revoked."}"#)
            .create_async()
            .await;

        let result = refresh_access_token(&Client::new(), &server.url(), "id", "secret", "refresh").await;
        assert!(matches!(result, Err(GoogleError::InvalidGrant)));
    }
}
