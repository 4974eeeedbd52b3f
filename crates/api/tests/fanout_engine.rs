//! Engine-level tests for notification fan-out, exercised directly
//! against the database (no HTTP layer).

mod common;

use sqlx::PgPool;

use eventease_api::fanout::FanOutEngine;
use eventease_core::notification::{EventAction, NotificationPayload};
use eventease_core::roles::ROLE_STUDENT_HEAD;
use eventease_db::models::calendar_event::CreateCalendarEvent;
use eventease_db::repositories::{BroadcastRepo, CalendarEventRepo, InboxRepo, UserRepo};

async fn broadcast_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM broadcasts")
        .fetch_one(pool)
        .await
        .unwrap()
}

/// An empty directory is "nothing to do": no broadcast row, zero counts.
#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_directory_is_a_noop(pool: PgPool) {
    let engine = FanOutEngine::new(pool.clone());

    let outcome = engine
        .broadcast("t", "b", &NotificationPayload::default())
        .await
        .unwrap();

    assert_eq!(outcome.delivered, 0);
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.broadcast_id, None);
    assert_eq!(broadcast_count(&pool).await, 0);
}

/// Opted-out users are excluded and counted; the canonical record lists
/// exactly the staged recipients.
#[sqlx::test(migrations = "../../db/migrations")]
async fn opted_out_users_are_skipped(pool: PgPool) {
    let a = common::create_user_with_role(&pool, "amara", "student").await;
    let b = common::create_user_with_role(&pool, "bilal", "student").await;
    let c = common::create_user_with_role(&pool, "chiara", "student").await;
    UserRepo::set_notifications_enabled(&pool, a.id, true).await.unwrap();
    UserRepo::set_notifications_enabled(&pool, b.id, false).await.unwrap();

    let engine = FanOutEngine::new(pool.clone());
    let outcome = engine
        .broadcast(
            "Exam Update",
            "New schedule posted",
            &NotificationPayload::default(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.delivered, 2, "A and C (unset flag) are eligible");
    assert_eq!(outcome.failed, 1, "B opted out");
    let broadcast_id = outcome.broadcast_id.unwrap();

    assert_eq!(
        InboxRepo::count_for_broadcast(&pool, broadcast_id)
            .await
            .unwrap(),
        2
    );
    assert!(InboxRepo::list_for_user(&pool, b.id).await.unwrap().is_empty());

    let broadcast = BroadcastRepo::find_by_id(&pool, broadcast_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(broadcast.recipient_ids, vec![a.id, c.id]);
    assert!(broadcast.read_by_ids.is_empty());
}

/// When every recipient has opted out, the canonical record still exists
/// but no entries do.
#[sqlx::test(migrations = "../../db/migrations")]
async fn fully_opted_out_directory_creates_no_entries(pool: PgPool) {
    let a = common::create_user_with_role(&pool, "amara", "student").await;
    UserRepo::set_notifications_enabled(&pool, a.id, false).await.unwrap();

    let engine = FanOutEngine::new(pool.clone());
    let outcome = engine
        .broadcast("t", "b", &NotificationPayload::default())
        .await
        .unwrap();

    assert_eq!(outcome.delivered, 0);
    assert_eq!(outcome.failed, 1);
    let broadcast_id = outcome.broadcast_id.unwrap();
    assert_eq!(
        InboxRepo::count_for_broadcast(&pool, broadcast_id)
            .await
            .unwrap(),
        0
    );
}

/// Two invocations create two independent broadcasts with their own
/// entry sets.
#[sqlx::test(migrations = "../../db/migrations")]
async fn repeated_broadcasts_are_independent(pool: PgPool) {
    let a = common::create_user_with_role(&pool, "amara", "student").await;

    let engine = FanOutEngine::new(pool.clone());
    let first = engine
        .broadcast("t", "b", &NotificationPayload::default())
        .await
        .unwrap();
    let second = engine
        .broadcast("t", "b", &NotificationPayload::default())
        .await
        .unwrap();

    assert_ne!(first.broadcast_id, second.broadcast_id);
    assert_eq!(broadcast_count(&pool).await, 2);
    assert_eq!(InboxRepo::list_for_user(&pool, a.id).await.unwrap().len(), 2);
}

/// The calendar lane materializes entries linked to the event, with no
/// canonical broadcast row.
#[sqlx::test(migrations = "../../db/migrations")]
async fn event_lane_skips_canonical_record(pool: PgPool) {
    let head = common::create_user_with_role(&pool, "leader", ROLE_STUDENT_HEAD).await;
    let a = common::create_user_with_role(&pool, "amara", "student").await;
    let b = common::create_user_with_role(&pool, "bilal", "student").await;
    UserRepo::set_notifications_enabled(&pool, b.id, false).await.unwrap();

    let event = CalendarEventRepo::create(
        &pool,
        head.id,
        &CreateCalendarEvent {
            title: "Tech Fest".to_string(),
            description: "Annual tech festival".to_string(),
            event_date: chrono::NaiveDate::from_ymd_opt(2026, 10, 3).unwrap(),
            start_time: chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: chrono::NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        },
    )
    .await
    .unwrap();

    let engine = FanOutEngine::new(pool.clone());
    let inserted = engine.notify_event(&event, EventAction::Created).await.unwrap();

    // head + A; B opted out.
    assert_eq!(inserted, 2);
    assert_eq!(broadcast_count(&pool).await, 0, "no canonical record");

    let entries = InboxRepo::list_for_user(&pool, a.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].event_id, Some(event.id));
    assert_eq!(entries[0].broadcast_id, None);
    assert_eq!(entries[0].title, "New event: Tech Fest");
    assert_eq!(entries[0].payload["kind"], "event");
    assert_eq!(entries[0].payload["action"], "created");
    assert!(InboxRepo::list_for_user(&pool, b.id).await.unwrap().is_empty());
}
