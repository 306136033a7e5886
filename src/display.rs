use std::fs::File;
use std::io::Write;

use chrono::NaiveDate;

use crate::staffing::cluster::cluster_day;
use crate::staffing::conflict::conflict_details;
use crate::staffing::status::event_status;
use crate::staffing::types::{Event, EventStatus};

/// Formats a staff name with its role tag, e.g. "[Host] John Smith".
pub fn format_staff_tag(role: &str, name: &str) -> String {
    if role.is_empty() {
        name.to_string()
    } else {
        format!("[{}] {}", role, name)
    }
}

fn status_label(status: EventStatus) -> &'static str {
    match status {
        EventStatus::Complete => "complete",
        EventStatus::Incomplete => "incomplete",
        EventStatus::Conflict => "CONFLICT",
    }
}

fn format_event_line(event: &Event) -> String {
    format!(
        "{}-{} {} ({})",
        event.start_time, event.end_time, event.name, event.company
    )
}

/// Prints the day report: conflict clusters first with the staff shared
/// inside each cluster, then the remaining events with their status.
pub fn print_day_report(date: NaiveDate, events: &[Event]) {
    let day_events: Vec<Event> = events.iter().filter(|e| e.date == date).cloned().collect();
    println!("\n=== Staffing report for {} ===", date.format("%Y-%m-%d"));
    println!("Events on this day: {}", day_events.len());

    let result = cluster_day(&day_events);

    if !result.clustered.is_empty() {
        println!(
            "\n⚠️  Conflict clusters ({}):",
            result.clustered.len()
        );
        for (i, cluster) in result.clustered.iter().enumerate() {
            println!("  Cluster {}:", i + 1);
            for event in cluster {
                println!("    {}", format_event_line(event));
                for other in cluster {
                    let details = conflict_details(event, other);
                    if details.conflict && event.id < other.id {
                        let names: Vec<String> = details
                            .shared_staff
                            .iter()
                            .map(|s| s.name.clone())
                            .collect();
                        println!(
                            "      shares {} with {}",
                            names.join(", "),
                            other.name
                        );
                    }
                }
            }
        }
    }

    println!("\nSchedule (no conflicts):");
    for event in &result.non_conflicting {
        let status = event_status(event, events);
        println!(
            "  {} -> {}",
            format_event_line(event),
            status_label(status)
        );
        for staff in &event.assigned_staff {
            println!("    {}", format_staff_tag(&staff.role, &staff.name));
        }
    }
}

/// Writes the same day report to a text file.
pub fn write_day_report(
    date: NaiveDate,
    events: &[Event],
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let day_events: Vec<Event> = events.iter().filter(|e| e.date == date).cloned().collect();
    let result = cluster_day(&day_events);

    let mut file = File::create(filename)?;
    writeln!(file, "** Staffing report for {} **", date.format("%Y-%m-%d"))?;

    for (i, cluster) in result.clustered.iter().enumerate() {
        writeln!(file, "Conflict cluster {}:", i + 1)?;
        for event in cluster {
            writeln!(file, "  {}", format_event_line(event))?;
        }
    }

    for event in &result.non_conflicting {
        let status = event_status(event, events);
        writeln!(
            file,
            "{} [{}]",
            format_event_line(event),
            status_label(status)
        )?;
    }

    Ok(())
}
