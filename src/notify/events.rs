//! Domain events published after a state change has been committed.
//!
//! Serialized form is what live connections receive:
//! `{"type": "clockRecorded", "payload": {...}}`. Recipient lists are
//! routing data and never leave the process.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::model::{
    attendance::{AttendanceEntry, ClockKind},
    payroll::PayrollRecord,
};

pub type UserId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTag {
    ClockRecorded,
    TaskAssigned,
    MeetingScheduled,
    LeaveApplied,
    LeaveDecided,
    PayrollDisbursed,
}

impl EventTag {
    pub const ALL: [EventTag; 6] = [
        EventTag::ClockRecorded,
        EventTag::TaskAssigned,
        EventTag::MeetingScheduled,
        EventTag::LeaveApplied,
        EventTag::LeaveDecided,
        EventTag::PayrollDisbursed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventTag::ClockRecorded => "clockRecorded",
            EventTag::TaskAssigned => "taskAssigned",
            EventTag::MeetingScheduled => "meetingCreated",
            EventTag::LeaveApplied => "leaveApplied",
            EventTag::LeaveDecided => "leaveDecision",
            EventTag::PayrollDisbursed => "payrollDisbursed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveDecision {
    Approved,
    Declined,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum DomainEvent {
    #[serde(rename_all = "camelCase")]
    ClockRecorded {
        kind: ClockKind,
        entry: AttendanceEntry,
        #[serde(skip)]
        recipient: UserId,
    },
    #[serde(rename_all = "camelCase")]
    TaskAssigned {
        task_id: u64,
        title: String,
        due_date: Option<NaiveDate>,
        #[serde(skip)]
        assignee: UserId,
    },
    #[serde(rename = "meetingCreated", rename_all = "camelCase")]
    MeetingScheduled {
        meeting_id: u64,
        title: String,
        starts_at: NaiveDateTime,
        #[serde(skip)]
        participants: Vec<UserId>,
    },
    #[serde(rename_all = "camelCase")]
    LeaveApplied {
        leave_id: u64,
        employee_id: u64,
        employee_name: Option<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: String,
        #[serde(skip)]
        admins: Vec<UserId>,
    },
    #[serde(rename = "leaveDecision", rename_all = "camelCase")]
    LeaveDecided {
        leave_id: u64,
        status: LeaveDecision,
        decided_by: UserId,
        decided_by_name: Option<String>,
        #[serde(skip)]
        recipient: UserId,
    },
    #[serde(rename_all = "camelCase")]
    PayrollDisbursed {
        record: PayrollRecord,
        #[serde(skip)]
        recipient: UserId,
    },
}

impl DomainEvent {
    pub fn tag(&self) -> EventTag {
        match self {
            DomainEvent::ClockRecorded { .. } => EventTag::ClockRecorded,
            DomainEvent::TaskAssigned { .. } => EventTag::TaskAssigned,
            DomainEvent::MeetingScheduled { .. } => EventTag::MeetingScheduled,
            DomainEvent::LeaveApplied { .. } => EventTag::LeaveApplied,
            DomainEvent::LeaveDecided { .. } => EventTag::LeaveDecided,
            DomainEvent::PayrollDisbursed { .. } => EventTag::PayrollDisbursed,
        }
    }

    /// Users this event is addressed to, deduplicated.
    pub fn recipients(&self) -> Vec<UserId> {
        let mut users = match self {
            DomainEvent::ClockRecorded { recipient, .. }
            | DomainEvent::LeaveDecided { recipient, .. }
            | DomainEvent::PayrollDisbursed { recipient, .. } => vec![*recipient],
            DomainEvent::TaskAssigned { assignee, .. } => vec![*assignee],
            DomainEvent::MeetingScheduled { participants, .. } => participants.clone(),
            DomainEvent::LeaveApplied { admins, .. } => admins.clone(),
        };
        users.sort_unstable();
        users.dedup();
        users
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_shape_hides_recipients() {
        let event = DomainEvent::TaskAssigned {
            task_id: 9,
            title: "Quarterly report".into(),
            due_date: NaiveDate::from_ymd_opt(2026, 2, 1),
            assignee: 42,
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "taskAssigned",
                "payload": { "taskId": 9, "title": "Quarterly report", "dueDate": "2026-02-01" }
            })
        );
        assert_eq!(value["type"], event.tag().as_str());
    }

    #[test]
    fn meeting_recipients_are_deduplicated() {
        let event = DomainEvent::MeetingScheduled {
            meeting_id: 1,
            title: "Standup".into(),
            starts_at: NaiveDate::from_ymd_opt(2026, 1, 5)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            participants: vec![3, 1, 3, 2],
        };
        assert_eq!(event.recipients(), [1, 2, 3]);
        assert_eq!(serde_json::to_value(&event).unwrap()["type"], "meetingCreated");
    }

    #[test]
    fn leave_decision_keeps_socket_event_name() {
        let event = DomainEvent::LeaveDecided {
            leave_id: 4,
            status: LeaveDecision::Approved,
            decided_by: 1,
            decided_by_name: Some("Admin".into()),
            recipient: 7,
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "leaveDecision");
        assert_eq!(value["type"], event.tag().as_str());
        assert_eq!(value["payload"]["status"], "approved");
    }

    #[test]
    fn every_tag_has_a_distinct_name() {
        let mut names: Vec<_> = EventTag::ALL.iter().map(EventTag::as_str).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), EventTag::ALL.len());
    }
}
