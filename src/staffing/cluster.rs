use std::collections::HashSet;

use serde::Serialize;

use super::conflict::build_conflict_graph;
use super::types::Event;

/// One day's events partitioned into conflict clusters and the
/// conflict-free remainder.
#[derive(Debug, Clone, Serialize)]
pub struct DayClusters {
    pub clustered: Vec<Vec<Event>>,
    pub non_conflicting: Vec<Event>,
}

/// Partitions a day's events into clusters of mutually-or-transitively
/// conflicting events plus the conflict-free remainder.
///
/// Every input event lands in exactly one of the two outputs. Cluster
/// members and the remainder are both sorted by start time ascending;
/// events with equal start times keep their input order.
pub fn cluster_day(events: &[Event]) -> DayClusters {
    let graph = build_conflict_graph(events);
    let mut visited: HashSet<u32> = HashSet::new();
    let mut clustered: Vec<Vec<Event>> = Vec::new();

    for event in events {
        if visited.contains(&event.id) {
            continue;
        }

        // Depth-first walk over conflict edges with an explicit stack;
        // traversal depth must not depend on cluster shape.
        let mut component: HashSet<u32> = HashSet::new();
        let mut stack = vec![event.id];
        visited.insert(event.id);
        while let Some(id) = stack.pop() {
            component.insert(id);
            if let Some(neighbors) = graph.get(&id) {
                for &neighbor in neighbors {
                    if visited.insert(neighbor) {
                        stack.push(neighbor);
                    }
                }
            }
        }

        // A singleton only counts as a cluster if its adjacency list is
        // non-empty (a malformed graph can lose the reverse edge).
        let has_conflict = component.len() > 1
            || (component.len() == 1
                && graph
                    .get(&event.id)
                    .map(|adj| !adj.is_empty())
                    .unwrap_or(false));

        if has_conflict {
            let mut members: Vec<Event> = events
                .iter()
                .filter(|e| component.contains(&e.id))
                .cloned()
                .collect();
            sort_by_start(&mut members);
            clustered.push(members);
        }
    }

    let in_cluster: HashSet<u32> = clustered
        .iter()
        .flat_map(|cluster| cluster.iter().map(|e| e.id))
        .collect();
    let mut non_conflicting: Vec<Event> = events
        .iter()
        .filter(|e| !in_cluster.contains(&e.id))
        .cloned()
        .collect();
    sort_by_start(&mut non_conflicting);

    DayClusters {
        clustered,
        non_conflicting,
    }
}

fn sort_by_start(events: &mut [Event]) {
    // Stable sort, so ties keep input order.
    events.sort_by_key(|e| e.start_minutes());
}
