//! Availability collection.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::Connection;

use super::db::{self, SubmissionReceipt};
use super::error::SchedulingError;
use crate::scheduling::{AvailabilityWindow, ParticipantId};

/// How a new submission treats the participant's earlier windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsePolicy {
    /// Windows accumulate; nothing is ever removed.
    #[default]
    AppendOnly,
    /// Each submission clears the participant's windows first.
    ReplaceOnSubmit,
}

impl fmt::Display for ResponsePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponsePolicy::AppendOnly => f.write_str("append_only"),
            ResponsePolicy::ReplaceOnSubmit => f.write_str("replace_on_submit"),
        }
    }
}

impl FromStr for ResponsePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "append_only" => Ok(ResponsePolicy::AppendOnly),
            "replace_on_submit" => Ok(ResponsePolicy::ReplaceOnSubmit),
            other => Err(format!("Unknown response policy: {}", other)),
        }
    }
}

fn minutes(window: &AvailabilityWindow) -> i64 {
    window.length().num_minutes()
}

/// Submit one window. See [`submit_windows`].
pub async fn submit_window(
    db: &Connection,
    policy: ResponsePolicy,
    meeting_id: &str,
    participant: &ParticipantId,
    window: AvailabilityWindow,
    now: DateTime<Utc>,
) -> Result<SubmissionReceipt, SchedulingError> {
    submit_windows(db, policy, meeting_id, participant, vec![window], now).await
}

/// Store a batch of windows for `participant`. Either every window is
/// stored or none are.
pub async fn submit_windows(
    db: &Connection,
    policy: ResponsePolicy,
    meeting_id: &str,
    participant: &ParticipantId,
    windows: Vec<AvailabilityWindow>,
    now: DateTime<Utc>,
) -> Result<SubmissionReceipt, SchedulingError> {
    if windows.is_empty() {
        return Err(SchedulingError::NoWindows);
    }
    if !windows.iter().all(AvailabilityWindow::is_well_formed) {
        return Err(SchedulingError::InvalidWindow);
    }

    let shortest = windows.iter().min_by_key(|w| w.length()).copied();
    let check = move |header: &db::MeetingHeader| {
        let required = chrono::Duration::try_minutes(header.duration_minutes);
        match shortest {
            Some(window) if required.is_none_or(|required| window.length() < required) => {
                Err(SchedulingError::WindowTooShort {
                    required: header.duration_minutes,
                    actual: minutes(&window),
                })
            }
            _ => Ok(()),
        }
    };

    let replace = policy == ResponsePolicy::ReplaceOnSubmit;
    let result = db::append_windows(db, meeting_id, participant, windows, replace, now, check).await;

    match &result {
        Ok(receipt) => tracing::info!(
            "Stored {} window(s) for {} on meeting {} ({}/{} invitees, {})",
            receipt.stored,
            participant,
            meeting_id,
            receipt.submitted_count,
            receipt.invitee_count,
            receipt.status
        ),
        Err(err) => tracing::warn!(
            "Rejected availability from {} on meeting {}: {}",
            participant,
            meeting_id,
            err
        ),
    }
    result
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::core::db::memory_db;
    use crate::meetings::models::{FinalizedSlot, Meeting, MeetingStatus, Participant};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
    }

    fn person(id: &str) -> Participant {
        Participant {
            id: ParticipantId::from(id),
            name: id.to_string(),
            email: format!("{}@example.com", id),
        }
    }

    async fn seeded_db() -> Connection {
        seeded_db_with_duration(30).await
    }

    async fn seeded_db_with_duration(duration_minutes: i64) -> Connection {
        let db = memory_db().await.unwrap();
        db::insert_meeting(
            &db,
            Meeting {
                id: "m1".to_string(),
                title: "Planning".to_string(),
                description: String::new(),
                host: person("host"),
                invitees: vec![person("a"), person("b")],
                duration_minutes,
                response_deadline: at(8, 0) + Duration::days(1),
                status: MeetingStatus::Pending,
                responses: vec![],
                finalized_slot: None,
                meeting_link: None,
                created_at: at(8, 0),
            },
        )
        .await
        .unwrap();
        db
    }

    fn window(start: (u32, u32), end: (u32, u32)) -> AvailabilityWindow {
        AvailabilityWindow::new(at(start.0, start.1), at(end.0, end.1))
    }

    #[test]
    fn it_parses_policies() {
        assert_eq!(
            "replace_on_submit".parse::<ResponsePolicy>().unwrap(),
            ResponsePolicy::ReplaceOnSubmit
        );
        assert_eq!(ResponsePolicy::default(), ResponsePolicy::AppendOnly);
        assert!("sometimes".parse::<ResponsePolicy>().is_err());
    }

    #[tokio::test]
    async fn it_rejects_a_window_shorter_than_the_meeting() {
        let db = seeded_db().await;
        let a = ParticipantId::from("a");

        let result = submit_window(
            &db,
            ResponsePolicy::AppendOnly,
            "m1",
            &a,
            window((9, 0), (9, 15)),
            at(8, 0),
        )
        .await;

        assert!(matches!(
            result,
            Err(SchedulingError::WindowTooShort {
                required: 30,
                actual: 15
            })
        ));
        let meeting = db::get_meeting(&db, "m1").await.unwrap().unwrap();
        assert!(meeting.responses.is_empty());
    }

    #[tokio::test]
    async fn it_survives_an_unrepresentable_stored_duration() {
        let db = seeded_db_with_duration(i64::MAX).await;
        let a = ParticipantId::from("a");

        let result = submit_window(
            &db,
            ResponsePolicy::AppendOnly,
            "m1",
            &a,
            window((9, 0), (10, 0)),
            at(8, 0),
        )
        .await;
        assert!(matches!(result, Err(SchedulingError::WindowTooShort { .. })));

        // The connection is still usable afterwards
        let meeting = db::get_meeting(&db, "m1").await.unwrap().unwrap();
        assert!(meeting.responses.is_empty());
        assert!(meeting.suggestions(crate::scheduling::SlotOptions::default()).is_empty());
    }

    #[tokio::test]
    async fn it_rejects_malformed_and_empty_batches() {
        let db = seeded_db().await;
        let a = ParticipantId::from("a");

        let result = submit_windows(
            &db,
            ResponsePolicy::AppendOnly,
            "m1",
            &a,
            vec![window((9, 0), (10, 0)), window((11, 0), (10, 0))],
            at(8, 0),
        )
        .await;
        assert!(matches!(result, Err(SchedulingError::InvalidWindow)));

        let result = submit_windows(&db, ResponsePolicy::AppendOnly, "m1", &a, vec![], at(8, 0)).await;
        assert!(matches!(result, Err(SchedulingError::NoWindows)));

        let meeting = db::get_meeting(&db, "m1").await.unwrap().unwrap();
        assert!(meeting.responses.is_empty());
    }

    #[tokio::test]
    async fn it_rejects_participants_outside_the_meeting() {
        let db = seeded_db().await;
        let result = submit_window(
            &db,
            ResponsePolicy::AppendOnly,
            "m1",
            &ParticipantId::from("mallory"),
            window((9, 0), (10, 0)),
            at(8, 0),
        )
        .await;
        assert!(matches!(result, Err(SchedulingError::NotInvited(_))));

        let result = submit_window(
            &db,
            ResponsePolicy::AppendOnly,
            "missing",
            &ParticipantId::from("a"),
            window((9, 0), (10, 0)),
            at(8, 0),
        )
        .await;
        assert!(matches!(result, Err(SchedulingError::MeetingNotFound(_))));
    }

    #[tokio::test]
    async fn it_moves_to_awaiting_selection_when_everyone_responded() {
        let db = seeded_db().await;

        let receipt = submit_window(
            &db,
            ResponsePolicy::AppendOnly,
            "m1",
            &ParticipantId::from("a"),
            window((9, 0), (10, 0)),
            at(8, 0),
        )
        .await
        .unwrap();
        assert_eq!(receipt.status, MeetingStatus::Pending);

        let receipt = submit_window(
            &db,
            ResponsePolicy::AppendOnly,
            "m1",
            &ParticipantId::from("b"),
            window((9, 30), (10, 30)),
            at(8, 0),
        )
        .await
        .unwrap();
        assert_eq!(receipt.submitted_count, 2);
        assert_eq!(receipt.invitee_count, 2);
        assert_eq!(receipt.status, MeetingStatus::AwaitingSelection);

        // Still open for more windows
        submit_window(
            &db,
            ResponsePolicy::AppendOnly,
            "m1",
            &ParticipantId::from("b"),
            window((14, 0), (15, 0)),
            at(8, 0),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn it_replaces_windows_under_replace_policy() {
        let db = seeded_db().await;
        let a = ParticipantId::from("a");

        submit_windows(
            &db,
            ResponsePolicy::ReplaceOnSubmit,
            "m1",
            &a,
            vec![window((9, 0), (10, 0)), window((11, 0), (12, 0))],
            at(8, 0),
        )
        .await
        .unwrap();
        submit_window(
            &db,
            ResponsePolicy::ReplaceOnSubmit,
            "m1",
            &a,
            window((14, 0), (15, 0)),
            at(8, 0),
        )
        .await
        .unwrap();

        let meeting = db::get_meeting(&db, "m1").await.unwrap().unwrap();
        assert_eq!(meeting.windows_for(&a), &[window((14, 0), (15, 0))]);
    }

    #[tokio::test]
    async fn it_rejects_submissions_after_finalize() {
        let db = seeded_db().await;
        db::set_finalized(
            &db,
            "m1",
            FinalizedSlot {
                start: at(9, 30),
                end: at(10, 0),
                confirmed_participants: [ParticipantId::from("host"), ParticipantId::from("a")]
                    .into_iter()
                    .collect(),
            },
            "https://meet.google.com/abc-defg-hij".to_string(),
        )
        .await
        .unwrap();

        let result = submit_window(
            &db,
            ResponsePolicy::AppendOnly,
            "m1",
            &ParticipantId::from("b"),
            window((9, 0), (10, 0)),
            at(8, 0),
        )
        .await;
        assert!(matches!(
            result,
            Err(SchedulingError::MeetingClosed(MeetingStatus::Finalized))
        ));
    }
}
