use anyhow::{Result, anyhow};
use chrono::Utc;

use crate::core::AppConfig;
use crate::core::db::async_db;
use crate::meetings::db::get_meeting;

/// Print the ranked suggestions for a stored meeting.
pub async fn run(meeting_id: &str, config: &AppConfig) -> Result<()> {
    let db = async_db(&config.db_path).await?;
    let meeting = get_meeting(&db, meeting_id)
        .await?
        .ok_or_else(|| anyhow!("Meeting not found: {}", meeting_id))?;

    println!(
        "{} ({} min, {}) {}/{} invitees responded",
        meeting.title,
        meeting.duration_minutes,
        meeting.effective_status(Utc::now()),
        meeting.submitted_count(),
        meeting.invitees.len()
    );

    let slots = meeting.suggestions(config.slot_options());
    if slots.is_empty() {
        println!("No slot works for the host and at least one invitee yet");
        return Ok(());
    }
    for (idx, slot) in slots.iter().enumerate() {
        let names: Vec<&str> = slot.participants.iter().map(|p| p.as_str()).collect();
        println!(
            "{}. {} - {} [{}]",
            idx + 1,
            slot.start.to_rfc3339(),
            slot.end.to_rfc3339(),
            names.join(", ")
        );
    }

    Ok(())
}
