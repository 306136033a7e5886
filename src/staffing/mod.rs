pub mod availability;
pub mod board;
pub mod cluster;
pub mod conflict;
pub mod status;
pub mod time_utils;
pub mod types;

pub use board::{BoardError, EventBoard};
pub use cluster::cluster_day;
pub use conflict::{conflict_details, events_conflict};
pub use status::event_status;
pub use types::{Event, EventStatus, StaffAssignment, StaffRef};

#[cfg(test)]
pub mod test_fixtures {
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use super::types::{Event, StaffAssignment, StaffRef};

    pub fn test_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 15).unwrap()
    }

    pub fn staff(id: u32, name: &str) -> StaffRef {
        StaffRef {
            id,
            name: name.to_string(),
        }
    }

    /// Event with the given staff all assigned as "Host" and no
    /// requirements of its own.
    pub fn event_with_staff(id: u32, start: &str, end: &str, assigned: &[StaffRef]) -> Event {
        Event {
            id,
            name: format!("Event {}", id),
            date: test_date(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            company: "Tech Corp".to_string(),
            event_type: "Conference".to_string(),
            required_staff: HashMap::new(),
            assigned_staff: assigned
                .iter()
                .map(|s| StaffAssignment {
                    id: s.id,
                    name: s.name.clone(),
                    role: "Host".to_string(),
                })
                .collect(),
            required_equipment: Vec::new(),
            assigned_equipment: Vec::new(),
        }
    }

    /// Event with explicit role requirements, staff assigned as "Host".
    pub fn staffed_event(
        id: u32,
        start: &str,
        end: &str,
        required: &[(&str, u32)],
        assigned: &[StaffRef],
    ) -> Event {
        let mut event = event_with_staff(id, start, end, assigned);
        event.required_staff = required
            .iter()
            .map(|(role, count)| (role.to_string(), *count))
            .collect();
        event
    }
}
