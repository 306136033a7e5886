/// Parses a time string (HH:MM, 24-hour) to minutes since midnight.
///
/// Malformed input (empty, missing colon, out-of-range hours or minutes)
/// counts as midnight instead of failing; the parse is total and the
/// degraded value is logged.
pub fn parse_minutes(time_str: &str) -> u32 {
    match try_parse_minutes(time_str) {
        Some(minutes) => minutes,
        None => {
            log::warn!("malformed time string {:?}, treating as 00:00", time_str);
            0
        }
    }
}

fn try_parse_minutes(time_str: &str) -> Option<u32> {
    let parts: Vec<&str> = time_str.split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let hours: u32 = parts[0].trim().parse().ok()?;
    let minutes: u32 = parts[1].trim().parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Strict interval overlap on minutes since midnight. Intervals that only
/// touch (one ends exactly when the other starts) do not overlap; every
/// downstream conflict decision depends on this rule staying strict.
pub fn overlaps(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> bool {
    a_start < b_end && b_start < a_end
}

/// Formats minutes since midnight as a time string (HH:MM).
pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    format!("{:02}:{:02}", hours % 24, mins)
}
