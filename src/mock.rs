use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::staffing::types::{
    EquipmentAssignment, EquipmentRequirement, Event, StaffAssignment,
};

const COMPANIES: [&str; 5] = [
    "Tech Corp",
    "Media Inc",
    "Finance Ltd",
    "Retail Co",
    "Healthcare Plus",
];

const EVENT_TYPES: [&str; 5] = [
    "Conference",
    "Workshop",
    "Seminar",
    "Product Launch",
    "Team Building",
];

/// The demo staff roster: (id, name, default role).
const STAFF_ROSTER: [(u32, &str, &str); 10] = [
    (1, "John Smith", "Host"),
    (2, "Sarah Johnson", "Host"),
    (3, "Mike Chen", "Host"),
    (4, "Emily Davis", "Cameraman"),
    (5, "David Wilson", "Cameraman"),
    (6, "Lisa Brown", "Admin"),
    (7, "Tom Anderson", "Admin"),
    (8, "Anna Lee", "Admin"),
    (9, "Chris Martinez", "Technician"),
    (10, "Jessica Taylor", "Technician"),
];

/// Generates a demo event collection spread over the month around
/// `base_date`: 20 of the surrounding 30 days get events, 150 events in
/// total, with roughly 80% of them fully staffed. The same seed always
/// produces the same collection.
pub fn generate_mock_events(base_date: NaiveDate, seed: u64) -> Vec<Event> {
    let mut rng = StdRng::seed_from_u64(seed);

    // Pick which days get events. A Vec keeps the draw order stable for
    // a given seed, unlike a hash set.
    let mut day_offsets: Vec<i64> = Vec::new();
    while day_offsets.len() < 20 {
        let offset = rng.gen_range(-15..15);
        if !day_offsets.contains(&offset) {
            day_offsets.push(offset);
        }
    }

    let mut events = Vec::new();
    for i in 0..150u32 {
        let offset = day_offsets[rng.gen_range(0..day_offsets.len())];
        let date = base_date + Duration::days(offset);

        let start_hour = 8 + rng.gen_range(0..8);
        let duration = 2 + rng.gen_range(0..4);
        let start_time = format!("{:02}:00", start_hour);
        let end_time = format!("{:02}:00", start_hour + duration);

        // Role requirements drawn in a fixed order so the seed fully
        // determines the output.
        let role_requirements: [(&str, u32); 4] = [
            ("Host", rng.gen_range(0..2) + 1),
            ("Cameraman", rng.gen_range(0..2) + 1),
            ("Admin", rng.gen_range(0..3) + 1),
            ("Technician", rng.gen_range(0..2)),
        ];

        let mut assigned_staff = Vec::new();
        let assignment_rate: f64 = rng.gen();
        for (role, count) in &role_requirements {
            let available: Vec<&(u32, &str, &str)> = STAFF_ROSTER
                .iter()
                .filter(|(_, _, default_role)| default_role == role)
                .collect();
            let assign_count = if assignment_rate > 0.2 {
                *count
            } else {
                (*count as f64 * rng.gen::<f64>()) as u32
            };
            for member in available.iter().take(assign_count as usize) {
                assigned_staff.push(StaffAssignment {
                    id: member.0,
                    name: member.1.to_string(),
                    role: role.to_string(),
                });
            }
        }

        let required_staff: HashMap<String, u32> = role_requirements
            .iter()
            .map(|(role, count)| (role.to_string(), *count))
            .collect();

        let required_equipment = vec![
            EquipmentRequirement {
                category: "Camera".to_string(),
                quantity: rng.gen_range(0..3) + 1,
            },
            EquipmentRequirement {
                category: "Microphone".to_string(),
                quantity: rng.gen_range(0..4) + 2,
            },
            EquipmentRequirement {
                category: "Projector".to_string(),
                quantity: rng.gen_range(0..2) + 1,
            },
            EquipmentRequirement {
                category: "Laptop".to_string(),
                quantity: rng.gen_range(0..5) + 1,
            },
        ];
        let assigned_equipment = required_equipment
            .iter()
            .map(|req| EquipmentAssignment {
                category: req.category.clone(),
                assigned: req.quantity,
            })
            .collect();

        let event_type = EVENT_TYPES[rng.gen_range(0..EVENT_TYPES.len())];
        events.push(Event {
            id: i + 1,
            name: format!("{} {}", event_type, i + 1),
            date,
            start_time,
            end_time,
            company: COMPANIES[rng.gen_range(0..COMPANIES.len())].to_string(),
            event_type: EVENT_TYPES[rng.gen_range(0..EVENT_TYPES.len())].to_string(),
            required_staff,
            assigned_staff,
            required_equipment,
            assigned_equipment,
        });
    }

    events.sort_by_key(|e| e.date);
    events
}
