use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::scheduling::{
    self, AvailabilityWindow, CandidateSlot, OverlapInterval, ParticipantAvailability,
    ParticipantId, SlotOptions,
};

/// Longest meeting that can be scheduled, one week.
pub const MAX_DURATION_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    Pending,
    AwaitingSelection,
    Finalized,
    Expired,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Pending => "pending",
            MeetingStatus::AwaitingSelection => "awaiting_selection",
            MeetingStatus::Finalized => "finalized",
            MeetingStatus::Expired => "expired",
        }
    }

    /// Finalized and expired meetings accept no further mutation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MeetingStatus::Finalized | MeetingStatus::Expired)
    }
}

impl fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeetingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MeetingStatus::Pending),
            "awaiting_selection" => Ok(MeetingStatus::AwaitingSelection),
            "finalized" => Ok(MeetingStatus::Finalized),
            "expired" => Ok(MeetingStatus::Expired),
            other => Err(format!("Unknown meeting status: {}", other)),
        }
    }
}

impl ToSql for MeetingStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for MeetingStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Host,
    Invitee,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::Host => "host",
            ParticipantRole::Invitee => "invitee",
        }
    }
}

/// Reference to a user owned by the identity provider. Name and email
/// are carried along for display and calendar invitations only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteeResponse {
    pub participant: ParticipantId,
    pub windows: Vec<AvailabilityWindow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub confirmed_participants: BTreeSet<ParticipantId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub title: String,
    pub description: String,
    pub host: Participant,
    pub invitees: Vec<Participant>,
    pub duration_minutes: i64,
    pub response_deadline: DateTime<Utc>,
    pub status: MeetingStatus,
    /// One entry per participant that has submitted at least once, in
    /// submission order of their first window.
    pub responses: Vec<InviteeResponse>,
    pub finalized_slot: Option<FinalizedSlot>,
    pub meeting_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Meeting {
    /// Required slot length, saturating for out of range values.
    pub fn duration(&self) -> Duration {
        Duration::try_minutes(self.duration_minutes).unwrap_or(Duration::MAX)
    }

    pub fn is_host(&self, id: &ParticipantId) -> bool {
        &self.host.id == id
    }

    pub fn is_invitee(&self, id: &ParticipantId) -> bool {
        self.invitees.iter().any(|p| &p.id == id)
    }

    pub fn is_participant(&self, id: &ParticipantId) -> bool {
        self.is_host(id) || self.is_invitee(id)
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        std::iter::once(&self.host)
            .chain(self.invitees.iter())
            .find(|p| &p.id == id)
    }

    pub fn windows_for(&self, id: &ParticipantId) -> &[AvailabilityWindow] {
        self.responses
            .iter()
            .find(|r| &r.participant == id)
            .map(|r| r.windows.as_slice())
            .unwrap_or(&[])
    }

    /// Number of distinct invitees with at least one window. Always
    /// derived from the responses, never stored.
    pub fn submitted_count(&self) -> usize {
        self.invitees
            .iter()
            .filter(|p| !self.windows_for(&p.id).is_empty())
            .count()
    }

    /// Status as of `now`: an open meeting past its deadline reads as
    /// expired even before the store has been updated.
    pub fn effective_status(&self, now: DateTime<Utc>) -> MeetingStatus {
        if !self.status.is_terminal() && self.response_deadline <= now {
            MeetingStatus::Expired
        } else {
            self.status
        }
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        !self.effective_status(now).is_terminal()
    }

    /// Engine input built from responses of the host and invitees.
    pub fn availability(&self) -> Vec<ParticipantAvailability> {
        self.responses
            .iter()
            .filter(|r| self.is_participant(&r.participant))
            .map(|r| ParticipantAvailability {
                participant: r.participant.clone(),
                windows: r.windows.clone(),
            })
            .collect()
    }

    pub fn overlap_intervals(&self) -> Vec<OverlapInterval> {
        scheduling::compute_overlap_intervals(&self.host.id, &self.availability(), self.duration())
    }

    pub fn suggestions(&self, options: SlotOptions) -> Vec<CandidateSlot> {
        scheduling::suggest_slots(&self.host.id, &self.availability(), self.duration(), options)
    }
}

/// Input for creating a meeting.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMeeting {
    pub title: Option<String>,
    pub description: Option<String>,
    pub host: Participant,
    pub invitees: Vec<Participant>,
    pub duration_minutes: i64,
    pub response_deadline: Option<DateTime<Utc>>,
}
