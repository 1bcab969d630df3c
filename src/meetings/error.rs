//! Error types for meeting operations.

use serde::Serialize;
use thiserror::Error;

use super::models::MeetingStatus;
use super::provision::ProvisionError;
use crate::scheduling::ParticipantId;

/// Coarse classification callers use to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Authorization,
    NotFound,
    Conflict,
    Collaborator,
    Internal,
}

#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Meeting not found: {0}")]
    MeetingNotFound(String),

    #[error("Participant {0} is not part of this meeting")]
    NotInvited(ParticipantId),

    /// A participant other than the host picked the slot. Classed as a
    /// validation failure of the finalize request.
    #[error("Only the host can finalize a meeting")]
    NonHostFinalize,

    /// A participant other than the host asked for suggestions, which
    /// are private to the host.
    #[error("Only the host may view suggestions")]
    NonHostSuggestions,

    #[error("Invalid meeting: {0}")]
    InvalidMeeting(String),

    #[error("Invalid window: end must be after start")]
    InvalidWindow,

    #[error("No windows submitted")]
    NoWindows,

    #[error("Window is {actual} minutes but the meeting needs at least {required}")]
    WindowTooShort { required: i64, actual: i64 },

    #[error("Slot is {actual} minutes but the meeting lasts exactly {required}")]
    DurationMismatch { required: i64, actual: i64 },

    #[error("A slot needs at least 2 available participants, found {0}")]
    TooFewParticipants(usize),

    #[error("Meeting is closed ({0})")]
    MeetingClosed(MeetingStatus),

    #[error("Conflicting update: {0}")]
    Conflict(String),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("Storage error: {0}")]
    Storage(#[from] tokio_rusqlite::Error),
}

impl SchedulingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchedulingError::MeetingNotFound(_) => ErrorKind::NotFound,
            SchedulingError::NotInvited(_) | SchedulingError::NonHostSuggestions => {
                ErrorKind::Authorization
            }
            SchedulingError::NonHostFinalize
            | SchedulingError::InvalidMeeting(_)
            | SchedulingError::InvalidWindow
            | SchedulingError::NoWindows
            | SchedulingError::WindowTooShort { .. }
            | SchedulingError::DurationMismatch { .. }
            | SchedulingError::TooFewParticipants(_) => ErrorKind::Validation,
            SchedulingError::MeetingClosed(_) | SchedulingError::Conflict(_) => ErrorKind::Conflict,
            SchedulingError::Provision(_) => ErrorKind::Collaborator,
            SchedulingError::Storage(_) => ErrorKind::Internal,
        }
    }
}

impl From<rusqlite::Error> for SchedulingError {
    fn from(err: rusqlite::Error) -> Self {
        SchedulingError::Storage(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_classifies_the_taxonomy() {
        assert_eq!(SchedulingError::InvalidWindow.kind(), ErrorKind::Validation);
        assert_eq!(
            SchedulingError::NotInvited(ParticipantId::from("x")).kind(),
            ErrorKind::Authorization
        );
        assert_eq!(
            SchedulingError::MeetingClosed(MeetingStatus::Finalized).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            SchedulingError::from(ProvisionError::Transient("503".to_string())).kind(),
            ErrorKind::Collaborator
        );
    }
}
