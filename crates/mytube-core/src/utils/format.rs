use chrono::{DateTime, NaiveDateTime, Utc};

/// Compact a count for display: 950, 1.2K, 3.4M, 1.0B
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.1}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

pub fn format_view_count(n: u64) -> String {
    if n == 1 {
        "1 view".to_string()
    } else {
        format!("{} views", format_number(n))
    }
}

pub fn format_subscriber_count(n: u64) -> String {
    if n == 1 {
        "1 subscriber".to_string()
    } else {
        format!("{} subscribers", format_number(n))
    }
}

/// Format a duration in seconds as `m:ss` or `h:mm:ss`
pub fn format_duration(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Format a byte count using binary units, e.g. `1.5 MB`
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

fn parse_timestamp(date: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.with_timezone(&Utc));
    }
    // Server LocalDateTime values carry no offset
    date.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc())
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

/// Describe how long ago `date` was relative to `now`, e.g. "3 hours ago"
pub fn format_time_ago_from(date: &str, now: DateTime<Utc>) -> String {
    let Some(then) = parse_timestamp(date) else {
        return date.to_string();
    };
    let diff_secs = (now - then).num_seconds().abs();
    // Round up like the web client: 30 seconds reads as "1 minute ago"
    let ceil_div = |secs: i64, unit: i64| (secs + unit - 1) / unit;

    let minutes = ceil_div(diff_secs, 60).max(1);
    if minutes < 60 {
        return plural(minutes, "minute");
    }
    let hours = ceil_div(diff_secs, 3600);
    if hours < 24 {
        return plural(hours, "hour");
    }
    let days = ceil_div(diff_secs, 86_400);
    if days == 1 {
        return "yesterday".to_string();
    }
    if days < 7 {
        return plural(days, "day");
    }
    let weeks = ceil_div(days, 7);
    if weeks < 4 {
        return plural(weeks, "week");
    }
    let months = ceil_div(days, 30);
    if months < 12 {
        return plural(months, "month");
    }
    plural(ceil_div(days, 365), "year")
}

pub fn format_time_ago(date: &str) -> String {
    format_time_ago_from(date, Utc::now())
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    if let Some(dt) = parse_timestamp(date) {
        dt.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 {
        // Try to parse YYYY-MM-DD format
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Two-letter avatar placeholder from first and last name
pub fn initials(first_name: &str, last_name: &str) -> String {
    first_name
        .chars()
        .take(1)
        .chain(last_name.chars().take(1))
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(950), "950");
        assert_eq!(format_number(1_000), "1.0K");
        assert_eq!(format_number(15_300), "15.3K");
        assert_eq!(format_number(2_500_000), "2.5M");
        assert_eq!(format_number(1_000_000_000), "1.0B");
    }

    #[test]
    fn test_format_counts() {
        assert_eq!(format_view_count(1), "1 view");
        assert_eq!(format_view_count(3), "3 views");
        assert_eq!(format_subscriber_count(1200), "1.2K subscribers");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(754), "12:34");
        assert_eq!(format_duration(3_725), "1:02:05");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512.0 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(100 * 1024 * 1024), "100.0 MB");
    }

    #[test]
    fn test_format_time_ago() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        assert_eq!(format_time_ago_from("2024-06-10T11:59:30", now), "1 minute ago");
        assert_eq!(format_time_ago_from("2024-06-10T09:00:00Z", now), "3 hours ago");
        assert_eq!(format_time_ago_from("2024-06-09T12:00:00", now), "yesterday");
        assert_eq!(format_time_ago_from("2024-06-05T12:00:00", now), "5 days ago");
        assert_eq!(format_time_ago_from("2024-05-27T12:00:00", now), "2 weeks ago");
        assert_eq!(format_time_ago_from("2023-01-10T12:00:00", now), "2 years ago");
        assert_eq!(format_time_ago_from("garbage", now), "garbage");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-05-02T10:00:00"), "May 02, 2024");
        assert_eq!(format_date("2024-05-02"), "2024-05-02");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("anna", "petrova"), "AP");
        assert_eq!(initials("", "x"), "X");
    }
}
