use chrono::{DateTime, Utc};
use tokio_rusqlite::Connection;

use super::db;
use super::error::SchedulingError;
use crate::scheduling::{CandidateSlot, ParticipantId, SlotOptions};

/// Ranked candidate slots for the host, recomputed from the stored
/// responses on every call.
pub async fn request_suggestions(
    db: &Connection,
    meeting_id: &str,
    actor: &ParticipantId,
    options: SlotOptions,
    now: DateTime<Utc>,
) -> Result<Vec<CandidateSlot>, SchedulingError> {
    let meeting = db::get_meeting(db, meeting_id)
        .await?
        .ok_or_else(|| SchedulingError::MeetingNotFound(meeting_id.to_string()))?;
    if !meeting.is_participant(actor) {
        return Err(SchedulingError::NotInvited(actor.clone()));
    }
    if !meeting.is_host(actor) {
        return Err(SchedulingError::NonHostSuggestions);
    }
    let status = meeting.effective_status(now);
    if status.is_terminal() {
        return Err(SchedulingError::MeetingClosed(status));
    }

    let slots = meeting.suggestions(options);
    tracing::debug!(
        "Computed {} suggestion(s) for meeting {} from {}/{} responses",
        slots.len(),
        meeting_id,
        meeting.submitted_count(),
        meeting.invitees.len()
    );
    Ok(slots)
}
