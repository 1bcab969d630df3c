//! Public types for the meetings API
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::meetings::{ChosenSlot, Meeting};
use crate::scheduling::{AvailabilityWindow, ParticipantId};

pub use crate::meetings::{NewMeeting as CreateMeetingRequest, SubmissionReceipt};
pub use crate::scheduling::CandidateSlot;

#[derive(Deserialize)]
pub struct ParticipantQuery {
    pub participant_id: ParticipantId,
}

#[derive(Serialize, Deserialize)]
pub struct MeetingResponse {
    #[serde(flatten)]
    pub meeting: Meeting,
    pub submitted_count: usize,
}

impl From<Meeting> for MeetingResponse {
    fn from(meeting: Meeting) -> Self {
        let submitted_count = meeting.submitted_count();
        Self {
            meeting,
            submitted_count,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct PendingCountResponse {
    pub count: usize,
}

#[derive(Deserialize)]
pub struct SubmitWindowRequest {
    pub participant_id: ParticipantId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct SubmitWindowsRequest {
    pub participant_id: ParticipantId,
    pub windows: Vec<AvailabilityWindow>,
}

#[derive(Deserialize)]
pub struct FinalizeRequest {
    pub actor_id: ParticipantId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub participants: Vec<ParticipantId>,
}

impl FinalizeRequest {
    pub fn into_parts(self) -> (ParticipantId, ChosenSlot) {
        (
            self.actor_id,
            ChosenSlot {
                start: self.start,
                end: self.end,
                participants: self.participants,
            },
        )
    }
}
