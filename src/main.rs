use std::path::Path;

use chrono::NaiveDate;

use event_staffing::staffing::types::Event;
use event_staffing::{display, export, mock, parser, web};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "web" {
        let port = args
            .get(2)
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);
        let password = std::env::var("ADMIN_PASSWORD")
            .unwrap_or_else(|_| "admin123".to_string()); // Default password, change this!

        let events = bootstrap_events()?;
        println!("Starting web server on port {}...", port);
        println!("Access the board at http://localhost:{}", port);

        web::start_server(port, password, events).await?;
        return Ok(());
    }

    // CLI mode: print the staffing report for one day and write it out
    let events = bootstrap_events()?;
    let date = args
        .get(1)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    display::print_day_report(date, &events);

    println!("\n=== Writing report and export ===");
    display::write_day_report(date, &events, "day_report.txt")?;
    export::export_events_to_csv(&events, Path::new("events_export.csv"))?;
    println!("Report saved to day_report.txt");
    println!("Collection exported to events_export.csv");

    Ok(())
}

fn bootstrap_events() -> Result<Vec<Event>, Box<dyn std::error::Error>> {
    let csv_path = "data/events.csv";
    if Path::new(csv_path).exists() {
        println!("Loading events from {}...", csv_path);
        let events = parser::load_events(csv_path)?;
        println!("Loaded {} events", events.len());
        Ok(events)
    } else {
        println!("No {} found, generating mock events", csv_path);
        Ok(mock::generate_mock_events(
            chrono::Local::now().date_naive(),
            rand::random(),
        ))
    }
}
