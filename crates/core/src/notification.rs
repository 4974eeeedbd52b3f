//! Typed notification payloads.
//!
//! Every broadcast carries a payload describing what kind of notification
//! it is. The payload is a tagged enum rather than an open map so the
//! schema of each kind is checked at the API boundary; unknown or
//! malformed payloads are rejected before anything is written.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// What happened to a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    Created,
    Updated,
    Deleted,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EventAction::Created => "created",
            EventAction::Updated => "updated",
            EventAction::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// Auxiliary data attached to a broadcast, discriminated by `kind`.
///
/// Serialized as a flat JSON object with a `kind` tag, e.g.
///
/// ```json
/// { "kind": "exam_schedule", "file_url": "https://...", "semester": "Fall 2026" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationPayload {
    /// An exam schedule was published.
    ExamSchedule {
        file_url: String,
        semester: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exam_type: Option<String>,
    },
    /// A semester timetable was published.
    SemesterTimetable { file_url: String, semester: String },
    /// A calendar event was created, updated, or deleted.
    Event {
        event_id: DbId,
        date: chrono::NaiveDate,
        start_time: chrono::NaiveTime,
        end_time: chrono::NaiveTime,
        action: EventAction,
    },
    /// A free-form announcement with no fixed schema.
    Generic {
        #[serde(default, flatten)]
        extra: serde_json::Map<String, serde_json::Value>,
    },
}

impl NotificationPayload {
    /// The `kind` tag of this payload.
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationPayload::ExamSchedule { .. } => "exam_schedule",
            NotificationPayload::SemesterTimetable { .. } => "semester_timetable",
            NotificationPayload::Event { .. } => "event",
            NotificationPayload::Generic { .. } => "generic",
        }
    }

    /// Serialize to the JSON value stored in the `payload` JSONB column.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("payload serialization cannot fail")
    }
}

impl Default for NotificationPayload {
    /// An empty generic payload.
    fn default() -> Self {
        NotificationPayload::Generic {
            extra: serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exam_schedule_round_trips() {
        let payload = NotificationPayload::ExamSchedule {
            file_url: "https://cdn.example.com/exams.pdf".to_string(),
            semester: "Fall 2026".to_string(),
            exam_type: Some("midterm".to_string()),
        };

        let json = payload.to_value();
        assert_eq!(json["kind"], "exam_schedule");
        assert_eq!(json["semester"], "Fall 2026");

        let back: NotificationPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn event_payload_round_trips() {
        let payload = NotificationPayload::Event {
            event_id: 17,
            date: chrono::NaiveDate::from_ymd_opt(2026, 9, 12).unwrap(),
            start_time: chrono::NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            end_time: chrono::NaiveTime::from_hms_opt(16, 30, 0).unwrap(),
            action: EventAction::Updated,
        };

        let json = payload.to_value();
        assert_eq!(json["kind"], "event");
        assert_eq!(json["action"], "updated");

        let back: NotificationPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn generic_payload_keeps_extra_fields() {
        let json = serde_json::json!({
            "kind": "generic",
            "category": "maintenance",
            "url": "https://status.example.com",
        });

        let payload: NotificationPayload = serde_json::from_value(json).unwrap();
        match &payload {
            NotificationPayload::Generic { extra } => {
                assert_eq!(extra["category"], "maintenance");
                assert_eq!(extra["url"], "https://status.example.com");
            }
            other => panic!("expected generic payload, got {other:?}"),
        }

        assert_eq!(payload.to_value()["category"], "maintenance");
    }

    #[test]
    fn missing_kind_is_rejected() {
        let json = serde_json::json!({ "file_url": "https://x", "semester": "Fall" });
        let result: Result<NotificationPayload, _> = serde_json::from_value(json);
        assert!(result.is_err(), "payload without a kind tag must not parse");
    }

    #[test]
    fn default_is_empty_generic() {
        let payload = NotificationPayload::default();
        assert_eq!(payload.kind(), "generic");
        assert_eq!(payload.to_value(), serde_json::json!({ "kind": "generic" }));
    }
}
