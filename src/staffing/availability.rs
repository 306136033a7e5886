use super::time_utils::overlaps;
use super::types::{Event, EventSummary, StaffProfile, StaffRef};

/// Computes availability for every candidate against one target event.
///
/// A candidate is busy if any other same-day event overlapping the
/// target's window already has them assigned; the matching events are
/// carried along for display ("Busy: Event X, Event Y"). The result is
/// only valid for the snapshot it was computed from, so callers rerun
/// this after every mutation instead of caching it.
pub fn available_staff(
    target: &Event,
    candidates: &[StaffRef],
    events: &[Event],
) -> Vec<StaffProfile> {
    let target_start = target.start_minutes();
    let target_end = target.end_minutes();

    let same_day: Vec<&Event> = events
        .iter()
        .filter(|e| e.id != target.id && e.date == target.date)
        .collect();

    candidates
        .iter()
        .map(|candidate| {
            let conflicting_events: Vec<EventSummary> = same_day
                .iter()
                .filter(|other| {
                    other.has_staff(candidate.id)
                        && overlaps(
                            target_start,
                            target_end,
                            other.start_minutes(),
                            other.end_minutes(),
                        )
                })
                .map(|other| other.summary())
                .collect();

            StaffProfile {
                id: candidate.id,
                name: candidate.name.clone(),
                available: conflicting_events.is_empty(),
                conflicting_events,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staffing::test_fixtures::{event_with_staff, staff};

    #[test]
    fn staff_on_overlapping_event_is_busy() {
        let target = event_with_staff(1, "09:00", "11:00", &[]);
        let other = event_with_staff(2, "10:00", "12:00", &[staff(1, "Alice")]);
        let events = vec![target.clone(), other];

        let profiles = available_staff(&target, &[staff(1, "Alice"), staff(2, "Bob")], &events);
        assert!(!profiles[0].available);
        assert_eq!(profiles[0].conflicting_events[0].id, 2);
        assert!(profiles[1].available);
        assert!(profiles[1].conflicting_events.is_empty());
    }

    #[test]
    fn touching_event_leaves_staff_free() {
        let target = event_with_staff(1, "09:00", "11:00", &[]);
        let other = event_with_staff(2, "11:00", "13:00", &[staff(1, "Alice")]);
        let events = vec![target.clone(), other];

        let profiles = available_staff(&target, &[staff(1, "Alice")], &events);
        assert!(profiles[0].available);
    }

    #[test]
    fn other_days_do_not_count() {
        let target = event_with_staff(1, "09:00", "11:00", &[]);
        let mut other = event_with_staff(2, "10:00", "12:00", &[staff(1, "Alice")]);
        other.date = other.date.succ_opt().unwrap();
        let events = vec![target.clone(), other];

        let profiles = available_staff(&target, &[staff(1, "Alice")], &events);
        assert!(profiles[0].available);
    }

    #[test]
    fn target_event_itself_is_excluded() {
        let target = event_with_staff(1, "09:00", "11:00", &[staff(1, "Alice")]);
        let events = vec![target.clone()];

        let profiles = available_staff(&target, &[staff(1, "Alice")], &events);
        assert!(profiles[0].available);
    }
}
