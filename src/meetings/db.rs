//! Meeting record store.
//!
//! Every mutation runs as one `IMMEDIATE` transaction inside a single
//! `Connection::call`, so checks and writes cannot interleave with a
//! concurrent request for the same meeting. Windows are appended as
//! new rows; nothing reads, edits, and writes back a response list.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Transaction, TransactionBehavior};
use tokio_rusqlite::{Connection, params};

use super::error::SchedulingError;
use super::models::{
    FinalizedSlot, InviteeResponse, Meeting, MeetingStatus, Participant, ParticipantRole,
};
use crate::scheduling::{AvailabilityWindow, ParticipantId};

/// The parts of a meeting needed to validate a mutation.
#[derive(Debug, Clone)]
pub struct MeetingHeader {
    pub host: ParticipantId,
    pub invitees: BTreeSet<ParticipantId>,
    pub duration_minutes: i64,
    pub response_deadline: DateTime<Utc>,
    pub status: MeetingStatus,
}

impl MeetingHeader {
    pub fn is_participant(&self, id: &ParticipantId) -> bool {
        &self.host == id || self.invitees.contains(id)
    }
}

/// Result of a successful availability submission.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SubmissionReceipt {
    pub stored: usize,
    pub submitted_count: usize,
    pub invitee_count: usize,
    pub status: MeetingStatus,
}

fn load_header(tx: &Transaction, meeting_id: &str) -> rusqlite::Result<Option<MeetingHeader>> {
    let row = tx
        .query_row(
            "SELECT host_id, duration_minutes, response_deadline, status FROM meeting WHERE id = ?1",
            [meeting_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, DateTime<Utc>>(2)?,
                    row.get::<_, MeetingStatus>(3)?,
                ))
            },
        )
        .optional()?;
    let Some((host, duration_minutes, response_deadline, status)) = row else {
        return Ok(None);
    };

    let mut stmt = tx.prepare(
        "SELECT participant_id FROM meeting_participant WHERE meeting_id = ?1 AND role = 'invitee'",
    )?;
    let invitees = stmt
        .query_map([meeting_id], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?
        .into_iter()
        .map(ParticipantId::from)
        .collect();

    Ok(Some(MeetingHeader {
        host: ParticipantId::from(host),
        invitees,
        duration_minutes,
        response_deadline,
        status,
    }))
}

/// Fail with `MeetingClosed` for terminal meetings, expiring the meeting
/// first when its deadline has passed. Returns whether an expiry was
/// written, in which case the caller must commit before failing.
fn check_open(
    tx: &Transaction,
    meeting_id: &str,
    header: &MeetingHeader,
    now: DateTime<Utc>,
) -> rusqlite::Result<Result<(), MeetingStatus>> {
    if header.status.is_terminal() {
        return Ok(Err(header.status));
    }
    if header.response_deadline <= now {
        tx.execute(
            "UPDATE meeting SET status = ?1 WHERE id = ?2",
            params![MeetingStatus::Expired, meeting_id],
        )?;
        return Ok(Err(MeetingStatus::Expired));
    }
    Ok(Ok(()))
}

fn submitted_invitee_count(tx: &Transaction, meeting_id: &str) -> rusqlite::Result<usize> {
    let count: i64 = tx.query_row(
        r#"
        SELECT COUNT(DISTINCT w.participant_id)
        FROM response_window w
        JOIN meeting_participant p
          ON p.meeting_id = w.meeting_id AND p.participant_id = w.participant_id
        WHERE w.meeting_id = ?1 AND p.role = 'invitee'
        "#,
        [meeting_id],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

fn load_meeting(conn: &rusqlite::Connection, meeting_id: &str) -> rusqlite::Result<Option<Meeting>> {
    let row = conn
        .query_row(
            r#"
            SELECT id, title, description, host_id, duration_minutes, response_deadline,
                   status, finalized_start, finalized_end, meeting_link, created_at
            FROM meeting WHERE id = ?1
            "#,
            [meeting_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, DateTime<Utc>>(5)?,
                    row.get::<_, MeetingStatus>(6)?,
                    row.get::<_, Option<DateTime<Utc>>>(7)?,
                    row.get::<_, Option<DateTime<Utc>>>(8)?,
                    row.get::<_, Option<String>>(9)?,
                    row.get::<_, DateTime<Utc>>(10)?,
                ))
            },
        )
        .optional()?;
    let Some((
        id,
        title,
        description,
        host_id,
        duration_minutes,
        response_deadline,
        status,
        finalized_start,
        finalized_end,
        meeting_link,
        created_at,
    )) = row
    else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        r#"
        SELECT participant_id, name, email, role
        FROM meeting_participant
        WHERE meeting_id = ?1
        ORDER BY rowid
        "#,
    )?;
    let participants = stmt
        .query_map([meeting_id], |row| {
            Ok((
                Participant {
                    id: ParticipantId::from(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    email: row.get(2)?,
                },
                row.get::<_, String>(3)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut host = None;
    let mut invitees = Vec::new();
    for (participant, role) in participants {
        if role == ParticipantRole::Host.as_str() {
            host = Some(participant);
        } else {
            invitees.push(participant);
        }
    }
    let host = host.unwrap_or_else(|| Participant {
        id: ParticipantId::from(host_id),
        name: String::new(),
        email: String::new(),
    });

    let mut stmt = conn.prepare(
        "SELECT participant_id, starts_at, ends_at FROM response_window WHERE meeting_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map([meeting_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                AvailabilityWindow::new(row.get(1)?, row.get(2)?),
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    let mut responses: Vec<InviteeResponse> = Vec::new();
    for (participant, window) in rows {
        let participant = ParticipantId::from(participant);
        match responses.iter_mut().find(|r| r.participant == participant) {
            Some(response) => response.windows.push(window),
            None => responses.push(InviteeResponse {
                participant,
                windows: vec![window],
            }),
        }
    }

    let finalized_slot = match (finalized_start, finalized_end) {
        (Some(start), Some(end)) => {
            let mut stmt = conn.prepare(
                "SELECT participant_id FROM confirmed_participant WHERE meeting_id = ?1",
            )?;
            let confirmed_participants = stmt
                .query_map([meeting_id], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?
                .into_iter()
                .map(ParticipantId::from)
                .collect();
            Some(FinalizedSlot {
                start,
                end,
                confirmed_participants,
            })
        }
        _ => None,
    };

    Ok(Some(Meeting {
        id,
        title,
        description,
        host,
        invitees,
        duration_minutes,
        response_deadline,
        status,
        responses,
        finalized_slot,
        meeting_link,
        created_at,
    }))
}

pub async fn insert_meeting(db: &Connection, meeting: Meeting) -> Result<(), SchedulingError> {
    db.call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO meeting (id, title, description, host_id, duration_minutes,
                                 response_deadline, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                meeting.id,
                meeting.title,
                meeting.description,
                meeting.host.id.as_str(),
                meeting.duration_minutes,
                meeting.response_deadline,
                meeting.status,
                meeting.created_at,
            ],
        )?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO meeting_participant (meeting_id, participant_id, name, email, role)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;
            let roles = std::iter::once((&meeting.host, ParticipantRole::Host)).chain(
                meeting
                    .invitees
                    .iter()
                    .map(|p| (p, ParticipantRole::Invitee)),
            );
            for (participant, role) in roles {
                stmt.execute(params![
                    meeting.id,
                    participant.id.as_str(),
                    participant.name,
                    participant.email,
                    role.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    })
    .await?;
    Ok(())
}

pub async fn get_meeting(db: &Connection, meeting_id: &str) -> Result<Option<Meeting>, SchedulingError> {
    let meeting_id = meeting_id.to_string();
    let meeting = db
        .call(move |conn| Ok(load_meeting(conn, &meeting_id)?))
        .await?;
    Ok(meeting)
}

/// Every meeting the participant hosts or is invited to, newest first.
pub async fn list_meetings_for(
    db: &Connection,
    participant: &ParticipantId,
) -> Result<Vec<Meeting>, SchedulingError> {
    let participant = participant.clone();
    let meetings = db
        .call(move |conn| {
            let ids = {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT m.id
                    FROM meeting m
                    JOIN meeting_participant p ON p.meeting_id = m.id
                    WHERE p.participant_id = ?1
                    ORDER BY m.created_at DESC, m.id
                    "#,
                )?;
                stmt.query_map([participant.as_str()], |row| row.get::<_, String>(0))?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            };
            let mut meetings = Vec::with_capacity(ids.len());
            for id in ids {
                if let Some(meeting) = load_meeting(conn, &id)? {
                    meetings.push(meeting);
                }
            }
            Ok(meetings)
        })
        .await?;
    Ok(meetings)
}

/// Open meetings where `participant` is an invitee and has not
/// submitted anything yet.
pub async fn pending_invite_count(
    db: &Connection,
    participant: &ParticipantId,
    now: DateTime<Utc>,
) -> Result<usize, SchedulingError> {
    let participant = participant.clone();
    let count = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT m.response_deadline
                FROM meeting m
                JOIN meeting_participant p ON p.meeting_id = m.id
                WHERE p.participant_id = ?1
                  AND p.role = 'invitee'
                  AND m.status IN ('pending', 'awaiting_selection')
                  AND NOT EXISTS (
                      SELECT 1 FROM response_window w
                      WHERE w.meeting_id = m.id AND w.participant_id = p.participant_id
                  )
                "#,
            )?;
            let deadlines = stmt
                .query_map([participant.as_str()], |row| row.get::<_, DateTime<Utc>>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(deadlines.into_iter().filter(|d| *d > now).count())
        })
        .await?;
    Ok(count)
}

/// Atomically store `windows` for `participant`.
///
/// Checks run in order: existence, membership, open status (expiring
/// the meeting when its deadline passed), then `validate`. With
/// `replace` the participant's earlier windows are removed in the same
/// transaction. A pending meeting moves to `awaiting_selection` once
/// every invitee has submitted.
pub async fn append_windows<F>(
    db: &Connection,
    meeting_id: &str,
    participant: &ParticipantId,
    windows: Vec<AvailabilityWindow>,
    replace: bool,
    now: DateTime<Utc>,
    validate: F,
) -> Result<SubmissionReceipt, SchedulingError>
where
    F: FnOnce(&MeetingHeader) -> Result<(), SchedulingError> + Send + 'static,
{
    let meeting_id = meeting_id.to_string();
    let participant = participant.clone();
    db.call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let Some(header) = load_header(&tx, &meeting_id)? else {
            return Ok(Err(SchedulingError::MeetingNotFound(meeting_id)));
        };
        if !header.is_participant(&participant) {
            return Ok(Err(SchedulingError::NotInvited(participant)));
        }
        if let Err(status) = check_open(&tx, &meeting_id, &header, now)? {
            tx.commit()?;
            return Ok(Err(SchedulingError::MeetingClosed(status)));
        }
        if let Err(err) = validate(&header) {
            return Ok(Err(err));
        }

        if replace {
            tx.execute(
                "DELETE FROM response_window WHERE meeting_id = ?1 AND participant_id = ?2",
                params![meeting_id, participant.as_str()],
            )?;
        }
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO response_window (meeting_id, participant_id, starts_at, ends_at, submitted_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;
            for window in &windows {
                stmt.execute(params![
                    meeting_id,
                    participant.as_str(),
                    window.start,
                    window.end,
                    now
                ])?;
            }
        }

        let submitted_count = submitted_invitee_count(&tx, &meeting_id)?;
        let invitee_count = header.invitees.len();
        let mut status = header.status;
        if status == MeetingStatus::Pending && submitted_count == invitee_count {
            tx.execute(
                "UPDATE meeting SET status = ?1 WHERE id = ?2 AND status = ?3",
                params![
                    MeetingStatus::AwaitingSelection,
                    meeting_id,
                    MeetingStatus::Pending
                ],
            )?;
            status = MeetingStatus::AwaitingSelection;
        }
        tx.commit()?;

        Ok(Ok(SubmissionReceipt {
            stored: windows.len(),
            submitted_count,
            invitee_count,
            status,
        }))
    })
    .await?
}

/// Commit a finalization. Fails with `MeetingClosed` when another
/// finalize already won or the meeting expired, leaving it untouched.
pub async fn set_finalized(
    db: &Connection,
    meeting_id: &str,
    slot: FinalizedSlot,
    meeting_link: String,
) -> Result<(), SchedulingError> {
    let meeting_id = meeting_id.to_string();
    db.call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let updated = tx.execute(
            r#"
            UPDATE meeting
            SET status = ?1, finalized_start = ?2, finalized_end = ?3, meeting_link = ?4
            WHERE id = ?5 AND status IN ('pending', 'awaiting_selection')
            "#,
            params![
                MeetingStatus::Finalized,
                slot.start,
                slot.end,
                meeting_link,
                meeting_id
            ],
        )?;
        if updated == 0 {
            let status: Option<MeetingStatus> = tx
                .query_row(
                    "SELECT status FROM meeting WHERE id = ?1",
                    [&meeting_id],
                    |row| row.get(0),
                )
                .optional()?;
            return Ok(Err(match status {
                Some(status) => SchedulingError::MeetingClosed(status),
                None => SchedulingError::MeetingNotFound(meeting_id),
            }));
        }
        {
            let mut stmt = tx.prepare(
                "INSERT INTO confirmed_participant (meeting_id, participant_id) VALUES (?1, ?2)",
            )?;
            for participant in &slot.confirmed_participants {
                stmt.execute(params![meeting_id, participant.as_str()])?;
            }
        }
        tx.commit()?;
        Ok(Ok(()))
    })
    .await?
}

/// Mark every open meeting whose deadline passed as expired. Returns
/// the ids that were expired.
pub async fn expire_overdue(db: &Connection, now: DateTime<Utc>) -> Result<Vec<String>, SchedulingError> {
    let expired = db
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let overdue = {
                let mut stmt = tx.prepare(
                    "SELECT id, response_deadline FROM meeting WHERE status IN ('pending', 'awaiting_selection')",
                )?;
                stmt.query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, DateTime<Utc>>(1)?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?
                .into_iter()
                .filter(|(_, deadline)| *deadline <= now)
                .map(|(id, _)| id)
                .collect::<Vec<_>>()
            };
            for id in &overdue {
                tx.execute(
                    "UPDATE meeting SET status = ?1 WHERE id = ?2 AND status IN ('pending', 'awaiting_selection')",
                    params![MeetingStatus::Expired, id],
                )?;
            }
            tx.commit()?;
            Ok(overdue)
        })
        .await?;
    Ok(expired)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::core::db::memory_db;

    fn person(id: &str) -> Participant {
        Participant {
            id: ParticipantId::from(id),
            name: id.to_uppercase(),
            email: format!("{}@example.com", id),
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
    }

    fn meeting(id: &str, deadline: DateTime<Utc>) -> Meeting {
        Meeting {
            id: id.to_string(),
            title: "Planning".to_string(),
            description: String::new(),
            host: person("host"),
            invitees: vec![person("a"), person("b")],
            duration_minutes: 30,
            response_deadline: deadline,
            status: MeetingStatus::Pending,
            responses: vec![],
            finalized_slot: None,
            meeting_link: None,
            created_at: at(8, 0),
        }
    }

    fn no_check(_: &MeetingHeader) -> Result<(), SchedulingError> {
        Ok(())
    }

    async fn append(
        db: &Connection,
        participant: &str,
        window: AvailabilityWindow,
        now: DateTime<Utc>,
    ) -> Result<SubmissionReceipt, SchedulingError> {
        append_windows(
            db,
            "m1",
            &ParticipantId::from(participant),
            vec![window],
            false,
            now,
            no_check,
        )
        .await
    }

    #[tokio::test]
    async fn it_round_trips_a_meeting() {
        let db = memory_db().await.unwrap();
        let original = meeting("m1", at(23, 0));
        insert_meeting(&db, original.clone()).await.unwrap();

        let loaded = get_meeting(&db, "m1").await.unwrap().unwrap();
        assert_eq!(loaded, original);
        assert!(get_meeting(&db, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn it_appends_windows_and_tracks_submissions() {
        let db = memory_db().await.unwrap();
        insert_meeting(&db, meeting("m1", at(23, 0))).await.unwrap();
        let window = AvailabilityWindow::new(at(9, 0), at(10, 0));

        let receipt = append(&db, "a", window, at(8, 0)).await.unwrap();
        assert_eq!(receipt.submitted_count, 1);
        assert_eq!(receipt.status, MeetingStatus::Pending);

        // Same window twice is stored twice
        append(&db, "a", window, at(8, 0)).await.unwrap();
        let loaded = get_meeting(&db, "m1").await.unwrap().unwrap();
        assert_eq!(loaded.windows_for(&ParticipantId::from("a")).len(), 2);
        assert_eq!(loaded.submitted_count(), 1);

        let receipt = append(&db, "b", window, at(8, 0)).await.unwrap();
        assert_eq!(receipt.submitted_count, 2);
        assert_eq!(receipt.status, MeetingStatus::AwaitingSelection);
    }

    #[tokio::test]
    async fn it_does_not_count_host_windows_as_submissions() {
        let db = memory_db().await.unwrap();
        insert_meeting(&db, meeting("m1", at(23, 0))).await.unwrap();

        let receipt = append(&db, "host", AvailabilityWindow::new(at(9, 0), at(10, 0)), at(8, 0))
            .await
            .unwrap();
        assert_eq!(receipt.submitted_count, 0);
    }

    #[tokio::test]
    async fn it_keeps_concurrent_appends() {
        let db = memory_db().await.unwrap();
        insert_meeting(&db, meeting("m1", at(23, 0))).await.unwrap();

        let (first, second) = tokio::join!(
            append(&db, "a", AvailabilityWindow::new(at(9, 0), at(10, 0)), at(8, 0)),
            append(&db, "b", AvailabilityWindow::new(at(9, 30), at(10, 30)), at(8, 0)),
        );
        first.unwrap();
        second.unwrap();

        let loaded = get_meeting(&db, "m1").await.unwrap().unwrap();
        assert_eq!(loaded.submitted_count(), 2);
        assert_eq!(loaded.responses.len(), 2);
    }

    #[tokio::test]
    async fn it_replaces_windows_when_asked() {
        let db = memory_db().await.unwrap();
        insert_meeting(&db, meeting("m1", at(23, 0))).await.unwrap();
        let a = ParticipantId::from("a");

        append(&db, "a", AvailabilityWindow::new(at(9, 0), at(10, 0)), at(8, 0))
            .await
            .unwrap();
        append_windows(
            &db,
            "m1",
            &a,
            vec![AvailabilityWindow::new(at(14, 0), at(15, 0))],
            true,
            at(8, 0),
            no_check,
        )
        .await
        .unwrap();

        let loaded = get_meeting(&db, "m1").await.unwrap().unwrap();
        assert_eq!(
            loaded.windows_for(&a),
            &[AvailabilityWindow::new(at(14, 0), at(15, 0))]
        );
    }

    #[tokio::test]
    async fn it_rejects_outsiders_and_runs_validation() {
        let db = memory_db().await.unwrap();
        insert_meeting(&db, meeting("m1", at(23, 0))).await.unwrap();
        let window = AvailabilityWindow::new(at(9, 0), at(10, 0));

        let result = append(&db, "stranger", window, at(8, 0)).await;
        assert!(matches!(result, Err(SchedulingError::NotInvited(_))));

        let result = append_windows(
            &db,
            "m1",
            &ParticipantId::from("a"),
            vec![window],
            false,
            at(8, 0),
            |_| Err(SchedulingError::InvalidWindow),
        )
        .await;
        assert!(matches!(result, Err(SchedulingError::InvalidWindow)));

        let loaded = get_meeting(&db, "m1").await.unwrap().unwrap();
        assert!(loaded.responses.is_empty());
    }

    #[tokio::test]
    async fn it_expires_on_a_late_submission() {
        let db = memory_db().await.unwrap();
        insert_meeting(&db, meeting("m1", at(9, 0))).await.unwrap();

        let result = append(&db, "a", AvailabilityWindow::new(at(10, 0), at(11, 0)), at(9, 0)).await;
        assert!(matches!(
            result,
            Err(SchedulingError::MeetingClosed(MeetingStatus::Expired))
        ));
        let loaded = get_meeting(&db, "m1").await.unwrap().unwrap();
        assert_eq!(loaded.status, MeetingStatus::Expired);
        assert!(loaded.responses.is_empty());
    }

    #[tokio::test]
    async fn it_finalizes_only_once() {
        let db = memory_db().await.unwrap();
        insert_meeting(&db, meeting("m1", at(23, 0))).await.unwrap();
        let slot = FinalizedSlot {
            start: at(9, 30),
            end: at(10, 0),
            confirmed_participants: [ParticipantId::from("host"), ParticipantId::from("a")]
                .into_iter()
                .collect(),
        };

        set_finalized(&db, "m1", slot.clone(), "https://meet.example/1".to_string())
            .await
            .unwrap();
        let second = set_finalized(&db, "m1", slot.clone(), "https://meet.example/2".to_string()).await;
        assert!(matches!(
            second,
            Err(SchedulingError::MeetingClosed(MeetingStatus::Finalized))
        ));

        let loaded = get_meeting(&db, "m1").await.unwrap().unwrap();
        assert_eq!(loaded.status, MeetingStatus::Finalized);
        assert_eq!(loaded.finalized_slot, Some(slot));
        assert_eq!(loaded.meeting_link.as_deref(), Some("https://meet.example/1"));

        let late = append(&db, "a", AvailabilityWindow::new(at(9, 0), at(10, 0)), at(8, 0)).await;
        assert!(matches!(
            late,
            Err(SchedulingError::MeetingClosed(MeetingStatus::Finalized))
        ));
    }

    #[tokio::test]
    async fn it_lists_and_counts_for_a_participant() {
        let db = memory_db().await.unwrap();
        insert_meeting(&db, meeting("m1", at(23, 0))).await.unwrap();
        let mut other = meeting("m2", at(23, 0));
        other.created_at = at(8, 30);
        other.invitees = vec![person("a")];
        insert_meeting(&db, other).await.unwrap();

        let a = ParticipantId::from("a");
        let listed = list_meetings_for(&db, &a).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m2", "m1"]);
        assert_eq!(list_meetings_for(&db, &ParticipantId::from("b")).await.unwrap().len(), 1);

        assert_eq!(pending_invite_count(&db, &a, at(8, 0)).await.unwrap(), 2);
        append(&db, "a", AvailabilityWindow::new(at(9, 0), at(10, 0)), at(8, 0))
            .await
            .unwrap();
        assert_eq!(pending_invite_count(&db, &a, at(8, 0)).await.unwrap(), 1);
        // The host never has pending invites
        assert_eq!(
            pending_invite_count(&db, &ParticipantId::from("host"), at(8, 0)).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn it_expires_overdue_meetings() {
        let db = memory_db().await.unwrap();
        insert_meeting(&db, meeting("m1", at(9, 0))).await.unwrap();
        insert_meeting(&db, meeting("m2", at(9, 0) + Duration::days(1))).await.unwrap();

        let expired = expire_overdue(&db, at(12, 0)).await.unwrap();
        assert_eq!(expired, vec!["m1".to_string()]);
        assert_eq!(
            get_meeting(&db, "m2").await.unwrap().unwrap().status,
            MeetingStatus::Pending
        );
    }
}
