use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::time_utils::parse_minutes;

/// A staff member as referenced outside any particular event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffRef {
    pub id: u32,
    pub name: String,
}

/// A staff member assigned to one event. The role belongs to the
/// assignment, not the person: the same staff member may hold different
/// roles in different events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffAssignment {
    pub id: u32,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentRequirement {
    pub category: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentAssignment {
    pub category: String,
    pub assigned: u32,
}

/// A time-boxed event for a single calendar day. Start and end times are
/// same-day "HH:MM" wall-clock values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: u32,
    pub name: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub company: String,
    pub event_type: String,
    pub required_staff: HashMap<String, u32>, // role -> required headcount
    pub assigned_staff: Vec<StaffAssignment>,
    pub required_equipment: Vec<EquipmentRequirement>,
    pub assigned_equipment: Vec<EquipmentAssignment>,
}

impl Event {
    pub fn start_minutes(&self) -> u32 {
        parse_minutes(&self.start_time)
    }

    pub fn end_minutes(&self) -> u32 {
        parse_minutes(&self.end_time)
    }

    /// Number of assigned staff currently holding the given role.
    pub fn assigned_count_for(&self, role: &str) -> usize {
        self.assigned_staff.iter().filter(|s| s.role == role).count()
    }

    pub fn has_staff(&self, staff_id: u32) -> bool {
        self.assigned_staff.iter().any(|s| s.id == staff_id)
    }

    pub fn summary(&self) -> EventSummary {
        EventSummary {
            id: self.id,
            name: self.name.clone(),
            date: self.date,
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            company: self.company.clone(),
        }
    }
}

/// Compact event reference carried in conflict and availability payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: u32,
    pub name: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub company: String,
}

/// Derived staffing state of an event. Never stored on the event itself;
/// recomputed from the current collection on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Complete,
    Incomplete,
    Conflict,
}

/// Availability of one candidate relative to a single target event and a
/// single snapshot of the collection.
#[derive(Debug, Clone, Serialize)]
pub struct StaffProfile {
    pub id: u32,
    pub name: String,
    pub available: bool,
    pub conflicting_events: Vec<EventSummary>,
}
