use anyhow::{Result, anyhow};
use std::io::{self, Write};

use crate::core::AppConfig;
use crate::core::db::async_db;
use crate::google::oauth::{CALENDAR_SCOPE, authorization_url, exchange_code_for_token};
use crate::google::store_refresh_token;

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_owned())
}

/// Authorize calendar access for an organizer and store the refresh
/// token so finalize can create events on their behalf.
pub async fn run(email: Option<String>, config: &AppConfig) -> Result<()> {
    if !config.google_configured() {
        return Err(anyhow!(
            "Set MEETSYNC_GOOGLE_CLIENT_ID and MEETSYNC_GOOGLE_CLIENT_SECRET in your environment"
        ));
    }

    let user_email = match email {
        Some(email) => email,
        None => prompt("Enter the email address you are authenticating: ")?,
    };

    let auth_url = authorization_url(
        &config.google_auth_url,
        &config.google_client_id,
        &config.google_redirect_uri,
        CALENDAR_SCOPE,
        Some(&user_email),
    );
    println!(
        "\nPlease open the following URL in your browser and authorize access:\n\n{}\n",
        auth_url
    );
    let code = prompt("Paste the authorization code shown by Google here: ")?;

    let token = exchange_code_for_token(
        &reqwest::Client::new(),
        &config.google_oauth_url,
        &config.google_client_id,
        &config.google_client_secret,
        &code,
        &config.google_redirect_uri,
    )
    .await?;
    let refresh_token = token
        .refresh_token
        .ok_or(anyhow!("No refresh token in response"))?;

    // Store the refresh token in the DB and use that to fetch an access token from now on.
    let db = async_db(&config.db_path).await?;
    store_refresh_token(&db, &user_email, &refresh_token).await?;
    println!("Refresh token for {} saved to DB.", user_email);

    Ok(())
}
