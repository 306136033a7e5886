use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use csv::Reader;

use crate::staffing::types::{
    EquipmentAssignment, EquipmentRequirement, Event, StaffAssignment,
};

/// Parses a "Role:2; Other Role:1" list into a role -> headcount map.
fn parse_role_counts(value: &str) -> HashMap<String, u32> {
    let mut roles = HashMap::new();
    for part in value.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some((role, count)) = part.rsplit_once(':') {
            let role = role.trim();
            if role.is_empty() {
                continue;
            }
            roles.insert(role.to_string(), parse_number(count));
        }
    }
    roles
}

/// Parses a "1:John Smith:Host; 4:Emily Davis:Cameraman" assignment list.
fn parse_staff_list(value: &str) -> Vec<StaffAssignment> {
    let mut staff = Vec::new();
    for part in value.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let fields: Vec<&str> = part.split(':').collect();
        if fields.len() != 3 {
            continue;
        }
        let id: u32 = match fields[0].trim().parse() {
            Ok(id) => id,
            Err(_) => continue,
        };
        staff.push(StaffAssignment {
            id,
            name: fields[1].trim().to_string(),
            role: fields[2].trim().to_string(),
        });
    }
    staff
}

/// Parses a "Camera:2; Microphone:3" list into (category, count) pairs.
fn parse_equipment_counts(value: &str) -> Vec<(String, u32)> {
    let mut items = Vec::new();
    for part in value.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some((category, count)) = part.rsplit_once(':') {
            let category = category.trim();
            if category.is_empty() {
                continue;
            }
            items.push((category.to_string(), parse_number(count)));
        }
    }
    items
}

/// Parses a number, returning 0 if empty or invalid.
fn parse_number(value: &str) -> u32 {
    value.trim().parse().unwrap_or(0)
}

/// Loads the event collection from a CSV file.
///
/// Expected columns: id, name, date (YYYY-MM-DD), start_time, end_time,
/// company, event_type, required_staff, assigned_staff,
/// required_equipment, assigned_equipment. Columns are located by header
/// name so extra columns and reordering are tolerated. Records missing an
/// id, name, or date are skipped; a repeated id replaces the earlier
/// record (last submission wins).
pub fn load_events<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Event>, Box<dyn std::error::Error>> {
    let mut reader = Reader::from_path(csv_path)?;

    let headers = reader.headers()?.clone();
    let find_col = |name: &str, fallback: usize| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .unwrap_or(fallback)
    };

    let id_col = find_col("id", 0);
    let name_col = find_col("name", 1);
    let date_col = find_col("date", 2);
    let start_col = find_col("start_time", 3);
    let end_col = find_col("end_time", 4);
    let company_col = find_col("company", 5);
    let type_col = find_col("event_type", 6);
    let required_staff_col = find_col("required_staff", 7);
    let assigned_staff_col = find_col("assigned_staff", 8);
    let required_equipment_col = find_col("required_equipment", 9);
    let assigned_equipment_col = find_col("assigned_equipment", 10);

    // Track entries by id so a re-submitted event replaces the original.
    let mut entries_map: HashMap<u32, Event> = HashMap::new();
    let mut order: Vec<u32> = Vec::new();

    for result in reader.records() {
        let record = result?;

        let id: u32 = match record.get(id_col).unwrap_or("").trim().parse() {
            Ok(id) => id,
            Err(_) => continue,
        };
        let name = record.get(name_col).unwrap_or("").trim().to_string();
        let date_str = record.get(date_col).unwrap_or("").trim();
        if name.is_empty() || date_str.is_empty() {
            continue;
        }
        let date = match NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                log::warn!("skipping event {}: bad date {:?}", id, date_str);
                continue;
            }
        };

        let required_equipment: Vec<EquipmentRequirement> =
            parse_equipment_counts(record.get(required_equipment_col).unwrap_or(""))
                .into_iter()
                .map(|(category, quantity)| EquipmentRequirement { category, quantity })
                .collect();
        let assigned_equipment: Vec<EquipmentAssignment> =
            parse_equipment_counts(record.get(assigned_equipment_col).unwrap_or(""))
                .into_iter()
                .map(|(category, assigned)| EquipmentAssignment { category, assigned })
                .collect();

        let event = Event {
            id,
            name,
            date,
            start_time: record.get(start_col).unwrap_or("").trim().to_string(),
            end_time: record.get(end_col).unwrap_or("").trim().to_string(),
            company: record.get(company_col).unwrap_or("").trim().to_string(),
            event_type: record.get(type_col).unwrap_or("").trim().to_string(),
            required_staff: parse_role_counts(record.get(required_staff_col).unwrap_or("")),
            assigned_staff: parse_staff_list(record.get(assigned_staff_col).unwrap_or("")),
            required_equipment,
            assigned_equipment,
        };

        if entries_map.insert(id, event).is_none() {
            order.push(id);
        }
    }

    // Keep first-seen file order rather than hash order.
    let mut events = Vec::with_capacity(order.len());
    for id in order {
        if let Some(event) = entries_map.remove(&id) {
            events.push(event);
        }
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(name: &str, contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("event-staffing-{}-{}.csv", name, std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_events_with_nested_fields() {
        let csv = "\
id,name,date,start_time,end_time,company,event_type,required_staff,assigned_staff,required_equipment,assigned_equipment
1,Conference 1,2025-11-15,09:00,11:00,Tech Corp,Conference,Host:2; Admin:1,1:John Smith:Host; 6:Lisa Brown:Admin,Camera:2,Camera:2
2,Workshop 2,2025-11-15,10:00,12:00,Media Inc,Workshop,Host:1,,,
";
        let path = write_temp_csv("nested", csv);
        let events = load_events(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, 1);
        assert_eq!(events[0].required_staff["Host"], 2);
        assert_eq!(events[0].required_staff["Admin"], 1);
        assert_eq!(events[0].assigned_staff.len(), 2);
        assert_eq!(events[0].assigned_staff[0].name, "John Smith");
        assert_eq!(events[0].assigned_staff[0].role, "Host");
        assert_eq!(events[0].required_equipment[0].category, "Camera");
        assert_eq!(events[0].required_equipment[0].quantity, 2);
        assert!(events[1].assigned_staff.is_empty());
    }

    #[test]
    fn repeated_id_replaces_earlier_record() {
        let csv = "\
id,name,date,start_time,end_time,company,event_type,required_staff,assigned_staff,required_equipment,assigned_equipment
1,First,2025-11-15,09:00,11:00,Tech Corp,Conference,Host:1,,,
1,Second,2025-11-16,10:00,12:00,Media Inc,Workshop,Host:2,,,
";
        let path = write_temp_csv("repeat", csv);
        let events = load_events(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Second");
        assert_eq!(events[0].required_staff["Host"], 2);
    }

    #[test]
    fn bad_rows_are_skipped() {
        let csv = "\
id,name,date,start_time,end_time,company,event_type,required_staff,assigned_staff,required_equipment,assigned_equipment
abc,Bad Id,2025-11-15,09:00,11:00,Tech Corp,Conference,,,,
2,Bad Date,15/11/2025,09:00,11:00,Tech Corp,Conference,,,,
3,Good,2025-11-15,09:00,11:00,Tech Corp,Conference,,,,
";
        let path = write_temp_csv("badrows", csv);
        let events = load_events(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, 3);
    }
}
