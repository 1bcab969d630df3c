//! Pure availability computation.
//!
//! Nothing in here touches storage: callers hand in the current
//! responses and get back overlap intervals or ranked candidate slots.
//! Every call recomputes from its inputs, so there is no cached
//! suggestion state to invalidate.
//!
//! - [`sweep`] turns per-participant windows into maximal intervals
//!   where the host and at least one invitee are free together
//! - [`slots`] slices those intervals into duration-exact candidates
//!   and ranks them

pub mod models;
pub mod slots;
pub mod sweep;

pub use models::{
    AvailabilityWindow, CandidateSlot, OverlapInterval, ParticipantAvailability, ParticipantId,
};
pub use slots::{SlotOptions, generate_candidates, rank_order};
pub use sweep::{compute_overlap_intervals, covers_span, merge_windows};

use chrono::Duration;

/// Run the sweep and the ranker in one go.
pub fn suggest_slots(
    host: &ParticipantId,
    availability: &[ParticipantAvailability],
    duration: Duration,
    options: SlotOptions,
) -> Vec<CandidateSlot> {
    let intervals = compute_overlap_intervals(host, availability, duration);
    generate_candidates(&intervals, duration, options)
}
