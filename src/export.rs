use std::path::Path;

use csv::WriterBuilder;

use crate::staffing::types::Event;

/// Encodes a role -> headcount map as "Role:2; Other Role:1", roles
/// sorted by name so the output is stable.
fn encode_role_counts(event: &Event) -> String {
    let mut roles: Vec<(&String, &u32)> = event.required_staff.iter().collect();
    roles.sort_by(|a, b| a.0.cmp(b.0));
    roles
        .iter()
        .map(|(role, count)| format!("{}:{}", role, count))
        .collect::<Vec<String>>()
        .join("; ")
}

fn encode_staff_list(event: &Event) -> String {
    event
        .assigned_staff
        .iter()
        .map(|s| format!("{}:{}:{}", s.id, s.name, s.role))
        .collect::<Vec<String>>()
        .join("; ")
}

fn encode_required_equipment(event: &Event) -> String {
    event
        .required_equipment
        .iter()
        .map(|eq| format!("{}:{}", eq.category, eq.quantity))
        .collect::<Vec<String>>()
        .join("; ")
}

fn encode_assigned_equipment(event: &Event) -> String {
    event
        .assigned_equipment
        .iter()
        .map(|eq| format!("{}:{}", eq.category, eq.assigned))
        .collect::<Vec<String>>()
        .join("; ")
}

/// Writes the event collection to a CSV file in the format `load_events`
/// reads back.
pub fn export_events_to_csv(
    events: &[Event],
    csv_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = WriterBuilder::new().from_path(csv_path)?;

    wtr.write_record([
        "id",
        "name",
        "date",
        "start_time",
        "end_time",
        "company",
        "event_type",
        "required_staff",
        "assigned_staff",
        "required_equipment",
        "assigned_equipment",
    ])?;

    for event in events {
        wtr.write_record([
            event.id.to_string(),
            event.name.clone(),
            event.date.format("%Y-%m-%d").to_string(),
            event.start_time.clone(),
            event.end_time.clone(),
            event.company.clone(),
            event.event_type.clone(),
            encode_role_counts(event),
            encode_staff_list(event),
            encode_required_equipment(event),
            encode_assigned_equipment(event),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
