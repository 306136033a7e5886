use super::conflict::events_conflict;
use super::types::{Event, EventStatus};

/// Derives the staffing status of one event against the full collection.
///
/// A conflict wins over incompleteness: a double-booked event reports
/// `Conflict` even when it is also understaffed. Roles and equipment
/// entries with a required count of 0 never block completeness.
pub fn event_status(event: &Event, events: &[Event]) -> EventStatus {
    let has_conflict = events.iter().any(|other| events_conflict(event, other));
    if has_conflict {
        return EventStatus::Conflict;
    }

    let staff_complete = event
        .required_staff
        .iter()
        .filter(|(_, &required)| required > 0)
        .all(|(role, &required)| event.assigned_count_for(role) as u32 >= required);

    let equipment_complete = event
        .required_equipment
        .iter()
        .filter(|req| req.quantity > 0)
        .all(|req| {
            event
                .assigned_equipment
                .iter()
                .find(|a| a.category == req.category)
                .map(|a| a.assigned >= req.quantity)
                .unwrap_or(false)
        });

    if staff_complete && equipment_complete {
        EventStatus::Complete
    } else {
        EventStatus::Incomplete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staffing::test_fixtures::{event_with_staff, staff, staffed_event};
    use crate::staffing::types::{EquipmentAssignment, EquipmentRequirement};

    #[test]
    fn fully_staffed_event_is_complete() {
        let event = staffed_event(1, "09:00", "11:00", &[("Host", 1)], &[staff(1, "Alice")]);
        assert_eq!(event_status(&event, &[event.clone()]), EventStatus::Complete);
    }

    #[test]
    fn missing_staff_makes_event_incomplete() {
        let event = staffed_event(1, "09:00", "11:00", &[("Host", 2)], &[staff(1, "Alice")]);
        assert_eq!(
            event_status(&event, &[event.clone()]),
            EventStatus::Incomplete
        );
    }

    #[test]
    fn conflict_dominates_incompleteness() {
        // Understaffed AND double-booked: the conflict must win.
        let a = staffed_event(1, "09:00", "11:00", &[("Host", 3)], &[staff(1, "Alice")]);
        let b = event_with_staff(2, "10:00", "12:00", &[staff(1, "Alice")]);
        let events = vec![a.clone(), b];
        assert_eq!(event_status(&a, &events), EventStatus::Conflict);
    }

    #[test]
    fn zero_required_roles_do_not_block_completeness() {
        let event = staffed_event(
            1,
            "09:00",
            "11:00",
            &[("Host", 1), ("Technician", 0)],
            &[staff(1, "Alice")],
        );
        assert_eq!(event_status(&event, &[event.clone()]), EventStatus::Complete);
    }

    #[test]
    fn missing_equipment_makes_event_incomplete() {
        let mut event = staffed_event(1, "09:00", "11:00", &[("Host", 1)], &[staff(1, "Alice")]);
        event.required_equipment = vec![EquipmentRequirement {
            category: "Camera".to_string(),
            quantity: 2,
        }];
        event.assigned_equipment = vec![EquipmentAssignment {
            category: "Camera".to_string(),
            assigned: 1,
        }];
        assert_eq!(
            event_status(&event, &[event.clone()]),
            EventStatus::Incomplete
        );

        event.assigned_equipment[0].assigned = 2;
        assert_eq!(event_status(&event, &[event.clone()]), EventStatus::Complete);
    }

    #[test]
    fn zero_quantity_equipment_is_ignored() {
        let mut event = staffed_event(1, "09:00", "11:00", &[("Host", 1)], &[staff(1, "Alice")]);
        event.required_equipment = vec![EquipmentRequirement {
            category: "Projector".to_string(),
            quantity: 0,
        }];
        assert_eq!(event_status(&event, &[event.clone()]), EventStatus::Complete);
    }
}
