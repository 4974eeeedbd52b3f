//! User-targeted notification fan-out.
//!
//! [`FanOutEngine`] turns one broadcast (or one calendar-event change)
//! into per-recipient inbox entries. The recipient directory is walked
//! with a keyset cursor so the engine never issues one unbounded query,
//! and all staged entries for a fan-out commit in a single atomic
//! statement: readers observe the full recipient set or nothing.
//!
//! Within one `broadcast` call the ordering is fixed: the canonical
//! broadcast row is created (and has its id) before any entry is staged,
//! and the batch commits before the call returns. No ordering holds
//! between the final `recipient_ids` bookkeeping update and entry
//! visibility; readers may see entries while `recipient_ids` is still
//! empty.

use eventease_core::notification::{EventAction, NotificationPayload};
use eventease_core::types::DbId;
use eventease_db::models::calendar_event::CalendarEvent;
use eventease_db::models::inbox::InboxLink;
use eventease_db::models::user::User;
use eventease_db::repositories::{BroadcastRepo, InboxRepo, UserRepo};
use eventease_db::DbPool;

/// Directory page size for recipient enumeration.
const RECIPIENT_PAGE_SIZE: i64 = 500;

/// Result of one broadcast fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// Inbox entries staged and committed.
    pub delivered: u64,
    /// Recipients skipped because they explicitly opted out.
    pub failed: u64,
    /// Id of the canonical broadcast row; `None` when the directory was
    /// empty and no row was created.
    pub broadcast_id: Option<DbId>,
}

/// Materializes inbox entries for broadcasts and calendar-event changes.
pub struct FanOutEngine {
    pool: DbPool,
}

impl FanOutEngine {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Fan a broadcast out to every eligible user.
    ///
    /// Recipients whose opt-in flag is explicitly `false` are skipped and
    /// counted in [`BroadcastOutcome::failed`]; an unset flag counts as
    /// opted in. An empty directory is "nothing to do": no broadcast row
    /// is created and both counts are zero.
    ///
    /// A failure while committing the entry batch propagates to the
    /// caller; the batch is a single statement, so a failed call leaves
    /// zero entries behind (the orphaned broadcast row, with its empty
    /// recipient set, records the attempt). Re-invoking creates a second,
    /// independent broadcast whose entries upsert against the
    /// per-(user, broadcast) uniqueness of the new row.
    pub async fn broadcast(
        &self,
        title: &str,
        body: &str,
        payload: &NotificationPayload,
    ) -> Result<BroadcastOutcome, sqlx::Error> {
        let recipients = self.enumerate_recipients().await?;
        if recipients.is_empty() {
            tracing::info!(kind = payload.kind(), "No recipients, skipping broadcast");
            return Ok(BroadcastOutcome {
                delivered: 0,
                failed: 0,
                broadcast_id: None,
            });
        }

        let payload_value = payload.to_value();

        // Canonical record first: entries need a broadcast id to reference.
        let broadcast_id = BroadcastRepo::create(&self.pool, title, body, &payload_value).await?;

        let staged_ids: Vec<DbId> = recipients
            .iter()
            .filter(|u| u.wants_notifications())
            .map(|u| u.id)
            .collect();
        let failed = (recipients.len() - staged_ids.len()) as u64;

        if staged_ids.is_empty() {
            tracing::info!(broadcast_id, skipped = failed, "All recipients opted out");
            return Ok(BroadcastOutcome {
                delivered: 0,
                failed,
                broadcast_id: Some(broadcast_id),
            });
        }

        let inserted = InboxRepo::insert_batch(
            &self.pool,
            &staged_ids,
            InboxLink::Broadcast(broadcast_id),
            title,
            body,
            &payload_value,
        )
        .await?;

        // Best-effort bookkeeping: a failure here means the canonical row
        // under-reports its recipients, which is accepted rather than
        // silently corrected. The committed entries are the source of truth.
        if let Err(e) = BroadcastRepo::set_recipients(&self.pool, broadcast_id, &staged_ids).await {
            tracing::warn!(
                broadcast_id,
                error = %e,
                "Failed to record recipient set on broadcast"
            );
        }

        tracing::info!(
            broadcast_id,
            kind = payload.kind(),
            staged = staged_ids.len(),
            inserted,
            skipped = failed,
            "Broadcast fanned out"
        );

        Ok(BroadcastOutcome {
            delivered: staged_ids.len() as u64,
            failed,
            broadcast_id: Some(broadcast_id),
        })
    }

    /// Fan a calendar-event change out to every eligible user.
    ///
    /// The calendar lane skips the canonical broadcast record: entries
    /// reference the event id directly and synthesize their content from
    /// the event and the action. The same single-statement atomicity
    /// applies; there is just no aggregate record of who was notified.
    ///
    /// Returns the number of entries created.
    pub async fn notify_event(
        &self,
        event: &CalendarEvent,
        action: EventAction,
    ) -> Result<u64, sqlx::Error> {
        let recipients = self.enumerate_recipients().await?;

        let staged_ids: Vec<DbId> = recipients
            .iter()
            .filter(|u| u.wants_notifications())
            .map(|u| u.id)
            .collect();
        if staged_ids.is_empty() {
            return Ok(0);
        }

        let (title, body) = event_message(event, action);
        let payload = NotificationPayload::Event {
            event_id: event.id,
            date: event.event_date,
            start_time: event.start_time,
            end_time: event.end_time,
            action,
        };

        let inserted = InboxRepo::insert_batch(
            &self.pool,
            &staged_ids,
            InboxLink::Event(event.id),
            &title,
            &body,
            &payload.to_value(),
        )
        .await?;

        tracing::info!(
            event_id = event.id,
            action = %action,
            inserted,
            "Calendar change fanned out"
        );
        Ok(inserted)
    }

    /// Walk the whole recipient directory, one keyset page at a time.
    ///
    /// Eligibility is NOT decided here; every active user is returned and
    /// the opt-out check happens per recipient in the caller.
    async fn enumerate_recipients(&self) -> Result<Vec<User>, sqlx::Error> {
        let mut recipients = Vec::new();
        let mut after_id: DbId = 0;

        loop {
            let page = UserRepo::list_page(&self.pool, after_id, RECIPIENT_PAGE_SIZE).await?;
            let full_page = page.len() as i64 == RECIPIENT_PAGE_SIZE;
            match page.last() {
                Some(last) => after_id = last.id,
                None => break,
            }
            recipients.extend(page);
            if !full_page {
                break;
            }
        }

        Ok(recipients)
    }
}

/// Synthesize the notification title and body for a calendar change.
fn event_message(event: &CalendarEvent, action: EventAction) -> (String, String) {
    let date = event.event_date.format("%Y-%m-%d");
    let start = event.start_time.format("%H:%M");
    let end = event.end_time.format("%H:%M");

    match action {
        EventAction::Created => (
            format!("New event: {}", event.title),
            format!(
                "{} is scheduled for {date} from {start} to {end}.",
                event.title
            ),
        ),
        EventAction::Updated => (
            format!("Event updated: {}", event.title),
            format!("{} is now on {date} from {start} to {end}.", event.title),
        ),
        EventAction::Deleted => (
            format!("Event cancelled: {}", event.title),
            format!(
                "{} on {date} has been removed from the calendar.",
                event.title
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn sample_event() -> CalendarEvent {
        CalendarEvent {
            id: 9,
            title: "Tech Fest".to_string(),
            description: "Annual tech festival".to_string(),
            event_date: NaiveDate::from_ymd_opt(2026, 10, 3).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            created_by: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn created_message_mentions_schedule() {
        let (title, body) = event_message(&sample_event(), EventAction::Created);
        assert_eq!(title, "New event: Tech Fest");
        assert!(body.contains("2026-10-03"));
        assert!(body.contains("10:00"));
        assert!(body.contains("17:00"));
    }

    #[test]
    fn updated_message_mentions_new_time() {
        let (title, body) = event_message(&sample_event(), EventAction::Updated);
        assert_eq!(title, "Event updated: Tech Fest");
        assert!(body.contains("is now on 2026-10-03"));
    }

    #[test]
    fn deleted_message_mentions_removal() {
        let (title, body) = event_message(&sample_event(), EventAction::Deleted);
        assert_eq!(title, "Event cancelled: Tech Fest");
        assert!(body.contains("removed from the calendar"));
    }
}
