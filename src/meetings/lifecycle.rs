//! Meeting creation and read access.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::db;
use super::error::SchedulingError;
use super::models::{
    InviteeResponse, MAX_DURATION_MINUTES, Meeting, MeetingStatus, NewMeeting, Participant,
};
use crate::scheduling::ParticipantId;

const DEFAULT_TITLE: &str = "Meeting";

/// Validate `new` and build the meeting record without storing it.
pub fn build_meeting(
    new: NewMeeting,
    response_window_days: i64,
    now: DateTime<Utc>,
) -> Result<Meeting, SchedulingError> {
    if new.duration_minutes <= 0 {
        return Err(SchedulingError::InvalidMeeting(
            "duration_minutes must be positive".to_string(),
        ));
    }
    if new.duration_minutes > MAX_DURATION_MINUTES {
        return Err(SchedulingError::InvalidMeeting(format!(
            "duration_minutes must be at most {}",
            MAX_DURATION_MINUTES
        )));
    }
    if new.host.id.as_str().trim().is_empty() {
        return Err(SchedulingError::InvalidMeeting("host id is empty".to_string()));
    }

    let mut seen = BTreeSet::from([new.host.id.clone()]);
    let invitees: Vec<Participant> = new
        .invitees
        .into_iter()
        .filter(|p| !p.id.as_str().trim().is_empty() && seen.insert(p.id.clone()))
        .collect();
    if invitees.is_empty() {
        return Err(SchedulingError::InvalidMeeting(
            "at least one invitee other than the host is required".to_string(),
        ));
    }

    let response_deadline = match new.response_deadline {
        Some(deadline) => deadline,
        None => Duration::try_days(response_window_days)
            .and_then(|window| now.checked_add_signed(window))
            .ok_or_else(|| {
                SchedulingError::InvalidMeeting("response window is out of range".to_string())
            })?,
    };
    if response_deadline <= now {
        return Err(SchedulingError::InvalidMeeting(
            "response_deadline must be in the future".to_string(),
        ));
    }

    let title = new
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    Ok(Meeting {
        id: Uuid::new_v4().to_string(),
        title,
        description: new.description.unwrap_or_default().trim().to_string(),
        host: new.host,
        invitees,
        duration_minutes: new.duration_minutes,
        response_deadline,
        status: MeetingStatus::Pending,
        responses: vec![],
        finalized_slot: None,
        meeting_link: None,
        created_at: now,
    })
}

pub async fn create_meeting(
    db: &Connection,
    new: NewMeeting,
    response_window_days: i64,
    now: DateTime<Utc>,
) -> Result<Meeting, SchedulingError> {
    let meeting = build_meeting(new, response_window_days, now)?;
    db::insert_meeting(db, meeting.clone()).await?;
    tracing::info!(
        "Created meeting {} hosted by {} with {} invitee(s)",
        meeting.id,
        meeting.host.id,
        meeting.invitees.len()
    );
    Ok(meeting)
}

/// Load a meeting and check that `viewer` is part of it. The returned
/// status reflects the deadline as of `now`.
pub async fn get_meeting_for(
    db: &Connection,
    meeting_id: &str,
    viewer: &ParticipantId,
    now: DateTime<Utc>,
) -> Result<Meeting, SchedulingError> {
    let mut meeting = db::get_meeting(db, meeting_id)
        .await?
        .ok_or_else(|| SchedulingError::MeetingNotFound(meeting_id.to_string()))?;
    if !meeting.is_participant(viewer) {
        return Err(SchedulingError::NotInvited(viewer.clone()));
    }
    meeting.status = meeting.effective_status(now);
    Ok(meeting)
}

pub async fn list_meetings_for(
    db: &Connection,
    participant: &ParticipantId,
    now: DateTime<Utc>,
) -> Result<Vec<Meeting>, SchedulingError> {
    let mut meetings = db::list_meetings_for(db, participant).await?;
    for meeting in meetings.iter_mut() {
        meeting.status = meeting.effective_status(now);
    }
    Ok(meetings)
}

pub async fn pending_invite_count(
    db: &Connection,
    participant: &ParticipantId,
    now: DateTime<Utc>,
) -> Result<usize, SchedulingError> {
    db::pending_invite_count(db, participant, now).await
}

pub async fn list_responses(
    db: &Connection,
    meeting_id: &str,
    viewer: &ParticipantId,
    now: DateTime<Utc>,
) -> Result<Vec<InviteeResponse>, SchedulingError> {
    Ok(get_meeting_for(db, meeting_id, viewer, now).await?.responses)
}
