//! Finalization: pick a slot, provision the event, commit.
//!
//! Nothing is written until the provisioner has returned a link, so an
//! attempt that fails or is dropped midway leaves the meeting as it was.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio_rusqlite::Connection;

use super::db;
use super::error::SchedulingError;
use super::locks::MeetingLocks;
use super::models::{FinalizedSlot, Meeting, MeetingStatus, Participant};
use super::provision::{BoxedProvisioner, EventRequest, ProvisionError};
use crate::scheduling::{ParticipantId, covers_span};

/// The slot a host picked, usually one of the suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChosenSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub participants: Vec<ParticipantId>,
}

#[derive(Clone)]
pub struct Finalizer {
    db: Connection,
    provisioner: BoxedProvisioner,
    locks: MeetingLocks,
    timeout: Duration,
}

impl Finalizer {
    pub fn new(
        db: Connection,
        provisioner: BoxedProvisioner,
        locks: MeetingLocks,
        timeout: Duration,
    ) -> Self {
        Self {
            db,
            provisioner,
            locks,
            timeout,
        }
    }

    pub async fn finalize(
        &self,
        meeting_id: &str,
        actor: &ParticipantId,
        slot: ChosenSlot,
        now: DateTime<Utc>,
    ) -> Result<Meeting, SchedulingError> {
        let _guard = self.locks.lock(meeting_id).await;

        let mut meeting = db::get_meeting(&self.db, meeting_id)
            .await?
            .ok_or_else(|| SchedulingError::MeetingNotFound(meeting_id.to_string()))?;
        if !meeting.is_participant(actor) {
            return Err(SchedulingError::NotInvited(actor.clone()));
        }
        if !meeting.is_host(actor) {
            return Err(SchedulingError::NonHostFinalize);
        }

        if let Some(existing) = &meeting.finalized_slot {
            if existing.start == slot.start && existing.end == slot.end {
                tracing::info!("Meeting {} already finalized with this slot", meeting_id);
                return Ok(meeting);
            }
        }
        let status = meeting.effective_status(now);
        if status.is_terminal() {
            tracing::warn!("Rejected finalize of meeting {}: {}", meeting_id, status);
            return Err(SchedulingError::MeetingClosed(status));
        }

        if slot.end <= slot.start {
            return Err(SchedulingError::InvalidWindow);
        }
        let actual = (slot.end - slot.start).num_minutes();
        if slot.end - slot.start != meeting.duration() {
            return Err(SchedulingError::DurationMismatch {
                required: meeting.duration_minutes,
                actual,
            });
        }

        let confirmed = confirm_participants(&meeting, &slot);
        if confirmed.len() < 2 {
            return Err(SchedulingError::TooFewParticipants(confirmed.len()));
        }

        let request = EventRequest {
            meeting_id: meeting.id.clone(),
            title: meeting.title.clone(),
            description: meeting.description.clone(),
            start: slot.start,
            end: slot.end,
            organizer: meeting.host.clone(),
            attendees: confirmed
                .iter()
                .filter_map(|id| meeting.participant(id))
                .cloned()
                .collect::<Vec<Participant>>(),
        };

        let provisioned =
            match tokio::time::timeout(self.timeout, self.provisioner.create_event(&request)).await {
                Ok(Ok(event)) => event,
                Ok(Err(err)) => {
                    tracing::error!("Provisioning failed for meeting {}: {}", meeting_id, err);
                    return Err(err.into());
                }
                Err(_) => {
                    tracing::error!(
                        "Provisioning timed out for meeting {} after {:?}",
                        meeting_id,
                        self.timeout
                    );
                    return Err(ProvisionError::Timeout(self.timeout).into());
                }
            };

        let finalized = FinalizedSlot {
            start: slot.start,
            end: slot.end,
            confirmed_participants: confirmed,
        };
        db::set_finalized(
            &self.db,
            meeting_id,
            finalized.clone(),
            provisioned.join_link.clone(),
        )
        .await?;

        tracing::info!(
            "Finalized meeting {} at {} with {} participant(s), event {}",
            meeting_id,
            finalized.start,
            finalized.confirmed_participants.len(),
            provisioned.event_id
        );

        meeting.status = MeetingStatus::Finalized;
        meeting.finalized_slot = Some(finalized);
        meeting.meeting_link = Some(provisioned.join_link);
        Ok(meeting)
    }
}

/// Named participants that belong to the meeting and whose current
/// availability covers the whole slot. Unknown ids are dropped.
fn confirm_participants(meeting: &Meeting, slot: &ChosenSlot) -> BTreeSet<ParticipantId> {
    let availability = meeting.availability();
    slot.participants
        .iter()
        .filter(|id| meeting.is_participant(id))
        .filter(|id| covers_span(&meeting.host.id, &availability, id, slot.start, slot.end))
        .cloned()
        .collect()
}
