//! Sweep-line overlap computation.
//!
//! Each participant's windows are first unioned so that the active
//! set only ever tracks identities. Edges are then swept in time
//! order with ends processed before starts at the same instant, which
//! keeps `[9:00, 10:00)` and `[10:00, 11:00)` from counting as
//! concurrent.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};

use super::models::{AvailabilityWindow, OverlapInterval, ParticipantAvailability, ParticipantId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EdgeKind {
    // Declared first so it sorts before `Start`
    End,
    Start,
}

#[derive(Debug)]
struct Edge<'a> {
    at: DateTime<Utc>,
    kind: EdgeKind,
    participant: &'a ParticipantId,
}

/// Union a participant's windows, joining spans that overlap or touch.
/// Malformed windows are ignored.
pub fn merge_windows(windows: &[AvailabilityWindow]) -> Vec<AvailabilityWindow> {
    let mut sorted: Vec<AvailabilityWindow> = windows
        .iter()
        .copied()
        .filter(AvailabilityWindow::is_well_formed)
        .collect();
    sorted.sort();

    let mut merged: Vec<AvailabilityWindow> = Vec::with_capacity(sorted.len());
    for window in sorted {
        match merged.last_mut() {
            Some(last) if window.start <= last.end => {
                if window.end > last.end {
                    last.end = window.end;
                }
            }
            _ => merged.push(window),
        }
    }
    merged
}

/// True when the host has submitted at least one window. Otherwise the
/// host is treated as free for the whole timeline.
fn host_has_explicit_windows(host: &ParticipantId, availability: &[ParticipantAvailability]) -> bool {
    availability
        .iter()
        .any(|a| &a.participant == host && !a.windows.is_empty())
}

fn is_eligible(host: &ParticipantId, active: &BTreeSet<ParticipantId>) -> bool {
    active.contains(host) && active.len() >= 2
}

/// Compute the maximal intervals, in time order, where the host and at
/// least one invitee are free together for at least `duration`.
pub fn compute_overlap_intervals(
    host: &ParticipantId,
    availability: &[ParticipantAvailability],
    duration: Duration,
) -> Vec<OverlapInterval> {
    let mut edges: Vec<Edge> = Vec::new();
    for entry in availability {
        for window in merge_windows(&entry.windows) {
            edges.push(Edge {
                at: window.start,
                kind: EdgeKind::Start,
                participant: &entry.participant,
            });
            edges.push(Edge {
                at: window.end,
                kind: EdgeKind::End,
                participant: &entry.participant,
            });
        }
    }
    edges.sort_by(|a, b| (a.at, a.kind, a.participant).cmp(&(b.at, b.kind, b.participant)));

    let mut active: BTreeSet<ParticipantId> = BTreeSet::new();
    if !host_has_explicit_windows(host, availability) {
        active.insert(host.clone());
    }

    let mut intervals = Vec::new();
    let mut idx = 0;
    while idx < edges.len() {
        let at = edges[idx].at;
        while let Some(edge) = edges.get(idx).filter(|e| e.at == at) {
            match edge.kind {
                EdgeKind::End => {
                    active.remove(edge.participant);
                }
                EdgeKind::Start => {
                    active.insert(edge.participant.clone());
                }
            }
            idx += 1;
        }

        let Some(next) = edges.get(idx) else {
            break;
        };
        if is_eligible(host, &active) && next.at - at >= duration {
            intervals.push(OverlapInterval {
                start: at,
                end: next.at,
                participants: active.clone(),
            });
        }
    }

    intervals
}

/// Whether `participant` is free for all of `[start, end)` given the
/// submitted windows, applying the implicit always-free host rule.
pub fn covers_span(
    host: &ParticipantId,
    availability: &[ParticipantAvailability],
    participant: &ParticipantId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> bool {
    if participant == host && !host_has_explicit_windows(host, availability) {
        return true;
    }
    let windows: Vec<AvailabilityWindow> = availability
        .iter()
        .filter(|a| &a.participant == participant)
        .flat_map(|a| a.windows.iter().copied())
        .collect();
    merge_windows(&windows)
        .iter()
        .any(|w| w.covers(start, end))
}
