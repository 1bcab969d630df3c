//! Meeting lifecycle on top of the availability engine.
//!
//! A meeting starts `pending`, moves to `awaiting_selection` once every
//! invitee has submitted, and ends either `finalized` by the host or
//! `expired` when the response deadline passes.

pub mod collector;
pub mod db;
pub mod error;
pub mod finalize;
pub mod lifecycle;
pub mod locks;
pub mod models;
pub mod provision;
pub mod suggest;

pub use collector::{ResponsePolicy, submit_window, submit_windows};
pub use db::SubmissionReceipt;
pub use error::{ErrorKind, SchedulingError};
pub use finalize::{ChosenSlot, Finalizer};
pub use lifecycle::{
    create_meeting, get_meeting_for, list_meetings_for, list_responses, pending_invite_count,
};
pub use locks::MeetingLocks;
pub use models::{
    FinalizedSlot, InviteeResponse, Meeting, MeetingStatus, NewMeeting, Participant,
    ParticipantRole,
};
pub use provision::{
    BoxedProvisioner, EventProvisioner, EventRequest, GoogleMeetProvisioner, ProvisionError,
    ProvisionedEvent,
};
pub use suggest::request_suggestions;
