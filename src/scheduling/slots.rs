//! Candidate slot generation and ranking.

use std::cmp::Ordering;

use chrono::Duration;
use itertools::Itertools;

use super::models::{CandidateSlot, OverlapInterval};

pub const DEFAULT_STEP_MINUTES: i64 = 5;
pub const DEFAULT_SUGGESTION_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotOptions {
    /// Distance between consecutive candidate starts within an interval
    pub step: Duration,
    /// Maximum number of candidates returned
    pub limit: usize,
}

impl Default for SlotOptions {
    fn default() -> Self {
        Self {
            step: Duration::minutes(DEFAULT_STEP_MINUTES),
            limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

/// Total order used for ranking: larger participant sets first, then
/// earlier starts. The participant set itself breaks any remaining tie
/// so the output never depends on input order.
pub fn rank_order(a: &CandidateSlot, b: &CandidateSlot) -> Ordering {
    b.participants
        .len()
        .cmp(&a.participants.len())
        .then(a.start.cmp(&b.start))
        .then_with(|| a.participants.cmp(&b.participants))
}

/// Cut `interval` into at most `max` `duration`-long slots starting
/// every `step` from the interval start. Slots never run past the
/// interval end.
///
/// Slices of one interval share a participant set and only differ by
/// start, so anything past the first `max` can never make the top `max`.
fn slice_interval(
    interval: &OverlapInterval,
    duration: Duration,
    step: Duration,
    max: usize,
) -> Vec<CandidateSlot> {
    let mut slots = Vec::new();
    let mut start = interval.start;
    while slots.len() < max {
        let Some(end) = start.checked_add_signed(duration) else {
            break;
        };
        if end > interval.end {
            break;
        }
        slots.push(CandidateSlot {
            start,
            end,
            participants: interval.participants.clone(),
        });
        match start.checked_add_signed(step) {
            Some(next) => start = next,
            None => break,
        }
    }
    slots
}

/// Slice every interval and keep the best `options.limit` candidates.
///
/// Taking the head of the ranked list is the tier backfill: the largest
/// participant-count tier is exhausted first, then the next lower one,
/// until the limit is reached or candidates run out.
pub fn generate_candidates(
    intervals: &[OverlapInterval],
    duration: Duration,
    options: SlotOptions,
) -> Vec<CandidateSlot> {
    if duration <= Duration::zero() || options.step <= Duration::zero() {
        return vec![];
    }

    intervals
        .iter()
        .filter(|interval| interval.participants.len() >= 2)
        .flat_map(|interval| slice_interval(interval, duration, options.step, options.limit))
        .sorted_by(rank_order)
        .take(options.limit)
        .collect()
}
