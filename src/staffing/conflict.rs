use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::time_utils::overlaps;
use super::types::{Event, EventSummary, StaffRef};

/// Result of a pairwise conflict check, carrying the staff shared by both
/// events so callers presenting the conflict do not intersect again.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictDetails {
    pub conflict: bool,
    pub shared_staff: Vec<StaffRef>,
}

/// One other event conflicting with a given event.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictSource {
    pub event: EventSummary,
    pub shared_staff: Vec<StaffRef>,
}

/// Decides whether two events double-book at least one staff member.
///
/// Conflicts are same-day only, time windows must strictly overlap, and
/// the assigned-staff id sets must intersect. An event never conflicts
/// with itself.
pub fn events_conflict(a: &Event, b: &Event) -> bool {
    if a.id == b.id {
        return false;
    }
    if a.date != b.date {
        return false;
    }
    if !overlaps(
        a.start_minutes(),
        a.end_minutes(),
        b.start_minutes(),
        b.end_minutes(),
    ) {
        return false;
    }

    let staff_ids_a: HashSet<u32> = a.assigned_staff.iter().map(|s| s.id).collect();
    if staff_ids_a.is_empty() {
        return false;
    }
    b.assigned_staff.iter().any(|s| staff_ids_a.contains(&s.id))
}

/// Pairwise check that also reports which staff members are shared.
pub fn conflict_details(a: &Event, b: &Event) -> ConflictDetails {
    let no_conflict = ConflictDetails {
        conflict: false,
        shared_staff: Vec::new(),
    };

    if a.id == b.id || a.date != b.date {
        return no_conflict;
    }
    if !overlaps(
        a.start_minutes(),
        a.end_minutes(),
        b.start_minutes(),
        b.end_minutes(),
    ) {
        return no_conflict;
    }

    let staff_ids_b: HashSet<u32> = b.assigned_staff.iter().map(|s| s.id).collect();
    let mut seen = HashSet::new();
    let mut shared = Vec::new();
    for staff in &a.assigned_staff {
        if staff_ids_b.contains(&staff.id) && seen.insert(staff.id) {
            shared.push(StaffRef {
                id: staff.id,
                name: staff.name.clone(),
            });
        }
    }

    ConflictDetails {
        conflict: !shared.is_empty(),
        shared_staff: shared,
    }
}

/// All other same-day events that conflict with `event`, each with the
/// staff shared between the pair.
pub fn event_conflicts(event: &Event, events: &[Event]) -> Vec<ConflictSource> {
    events
        .iter()
        .filter(|other| other.id != event.id && other.date == event.date)
        .filter_map(|other| {
            let details = conflict_details(event, other);
            if details.conflict {
                Some(ConflictSource {
                    event: other.summary(),
                    shared_staff: details.shared_staff,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Builds the undirected conflict adjacency over a set of events.
///
/// Every unordered pair is checked once, so this is O(n^2) in the number
/// of events; callers keep n small by pre-filtering to one day. Adjacency
/// lists hold neighbors in discovery order from the pairwise scan.
pub fn build_conflict_graph(events: &[Event]) -> HashMap<u32, Vec<u32>> {
    let mut graph: HashMap<u32, Vec<u32>> = HashMap::new();
    for event in events {
        graph.entry(event.id).or_default();
    }

    for i in 0..events.len() {
        for j in (i + 1)..events.len() {
            if events_conflict(&events[i], &events[j]) {
                graph.entry(events[i].id).or_default().push(events[j].id);
                graph.entry(events[j].id).or_default().push(events[i].id);
            }
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staffing::test_fixtures::{event_with_staff, staff};

    #[test]
    fn conflict_is_symmetric() {
        let a = event_with_staff(1, "09:00", "11:00", &[staff(1, "Alice")]);
        let b = event_with_staff(2, "10:00", "12:00", &[staff(1, "Alice")]);
        assert!(events_conflict(&a, &b));
        assert!(events_conflict(&b, &a));
    }

    #[test]
    fn event_never_conflicts_with_itself() {
        let a = event_with_staff(1, "09:00", "11:00", &[staff(1, "Alice")]);
        assert!(!events_conflict(&a, &a));
    }

    #[test]
    fn touching_events_do_not_conflict() {
        let a = event_with_staff(1, "09:00", "11:00", &[staff(1, "Alice")]);
        let b = event_with_staff(2, "11:00", "13:00", &[staff(1, "Alice")]);
        assert!(!events_conflict(&a, &b));
    }

    #[test]
    fn overlapping_events_without_shared_staff_do_not_conflict() {
        let a = event_with_staff(1, "09:00", "11:00", &[staff(1, "Alice")]);
        let b = event_with_staff(2, "10:00", "12:00", &[staff(2, "Bob")]);
        assert!(!events_conflict(&a, &b));
    }

    #[test]
    fn different_days_do_not_conflict() {
        let a = event_with_staff(1, "09:00", "11:00", &[staff(1, "Alice")]);
        let mut b = event_with_staff(2, "10:00", "12:00", &[staff(1, "Alice")]);
        b.date = b.date.succ_opt().unwrap();
        assert!(!events_conflict(&a, &b));
    }

    #[test]
    fn details_report_shared_staff_once() {
        let shared = [staff(1, "Alice"), staff(2, "Bob")];
        let a = event_with_staff(1, "09:00", "11:00", &shared);
        let b = event_with_staff(2, "10:00", "12:00", &shared);
        let details = conflict_details(&a, &b);
        assert!(details.conflict);
        let ids: Vec<u32> = details.shared_staff.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn graph_edges_are_bidirectional() {
        let a = event_with_staff(1, "09:00", "11:00", &[staff(1, "Alice")]);
        let b = event_with_staff(2, "10:00", "12:00", &[staff(1, "Alice")]);
        let c = event_with_staff(3, "14:00", "15:00", &[staff(1, "Alice")]);
        let graph = build_conflict_graph(&[a, b, c]);
        assert_eq!(graph[&1], vec![2]);
        assert_eq!(graph[&2], vec![1]);
        assert!(graph[&3].is_empty());
    }
}
