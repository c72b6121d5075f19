use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rand::{Rng, distributions::Alphanumeric, thread_rng};
use serde::{Deserialize, Serialize};

const ID_LEN: usize = 8;

pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";
pub const UNCATEGORIZED_COLOR: &str = "#9ca3af";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn parse(input: &str) -> Result<Self, String> {
        match input.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority: {other} (expected low, medium or high)")),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub category_id: String,
    pub priority: Priority,
    pub completed: bool,
    pub due_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub duration: u32,
}

impl Task {
    pub fn start_sort_key(&self) -> &str {
        self.start_time.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub category_id: String,
    pub priority: Priority,
    pub due_date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBlock {
    pub id: String,
    pub category_id: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub days_of_week: Vec<u8>,
}

impl TimeBlock {
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.days_of_week.is_empty() || self.days_of_week.contains(&weekday_index(date))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub category_id: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

pub fn generate_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}

pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

pub fn weekday_name(day: u8) -> &'static str {
    const NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
    NAMES.get(day as usize).copied().unwrap_or("?")
}

pub fn optional_text(input: &str) -> Option<String> {
    let value = input.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub fn parse_clock_time(input: &str) -> Result<u32, String> {
    let bytes = input.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(format!("invalid time '{input}', expected HH:MM"));
    }
    if !bytes[0].is_ascii_digit()
        || !bytes[1].is_ascii_digit()
        || !bytes[3].is_ascii_digit()
        || !bytes[4].is_ascii_digit()
    {
        return Err(format!("invalid time '{input}', expected HH:MM"));
    }

    let hours = (bytes[0] - b'0') as u32 * 10 + (bytes[1] - b'0') as u32;
    let minutes = (bytes[3] - b'0') as u32 * 10 + (bytes[4] - b'0') as u32;
    if hours > 23 || minutes > 59 {
        return Err(format!("invalid time '{input}', expected 00:00..23:59"));
    }

    Ok(hours * 60 + minutes)
}

pub fn minutes_since_midnight(input: &str) -> Option<u32> {
    parse_clock_time(input).ok()
}

pub fn validate_clock_range(start: &str, end: &str) -> Result<(), String> {
    let start_minutes = parse_clock_time(start)?;
    let end_minutes = parse_clock_time(end)?;
    if end_minutes <= start_minutes {
        return Err(format!("end time {end} must be after start time {start}"));
    }
    Ok(())
}

pub fn validate_hex_color(input: &str) -> Result<(), String> {
    let bytes = input.as_bytes();
    if bytes.len() == 7 && bytes[0] == b'#' && bytes[1..].iter().all(u8::is_ascii_hexdigit) {
        Ok(())
    } else {
        Err(format!("invalid color '{input}', expected #RRGGBB"))
    }
}

pub fn format_minutes(total: u32) -> String {
    let hours = total / 60;
    let minutes = total % 60;
    if hours == 0 {
        format!("{minutes}m")
    } else {
        format!("{hours}h {minutes:02}m")
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{
        TimeBlock, format_minutes, generate_id, optional_text, parse_clock_time,
        validate_clock_range, validate_hex_color, weekday_index, weekday_name,
    };

    #[test]
    fn parses_valid_clock_times() {
        assert_eq!(parse_clock_time("00:00"), Ok(0));
        assert_eq!(parse_clock_time("09:30"), Ok(570));
        assert_eq!(parse_clock_time("23:59"), Ok(1439));
    }

    #[test]
    fn rejects_malformed_clock_times() {
        for input in ["24:00", "12:60", "9:30", "09-30", "09:3", "", "ab:cd"] {
            assert!(parse_clock_time(input).is_err(), "accepted '{input}'");
        }
    }

    #[test]
    fn clock_range_requires_end_after_start() {
        assert!(validate_clock_range("09:00", "17:00").is_ok());
        assert!(validate_clock_range("17:00", "09:00").is_err());
        assert!(validate_clock_range("09:00", "09:00").is_err());
    }

    #[test]
    fn validates_hex_colors() {
        assert!(validate_hex_color("#3b82f6").is_ok());
        assert!(validate_hex_color("#ABCDEF").is_ok());
        assert!(validate_hex_color("3b82f6").is_err());
        assert!(validate_hex_color("#3b82f").is_err());
        assert!(validate_hex_color("#3b82fg").is_err());
    }

    #[test]
    fn weekday_index_counts_from_sunday() {
        let sunday = NaiveDate::from_ymd_opt(2026, 3, 1).expect("date should be valid");
        assert_eq!(weekday_index(sunday), 0);
        assert_eq!(weekday_index(sunday.succ_opt().expect("next day should exist")), 1);
        let saturday = NaiveDate::from_ymd_opt(2026, 3, 7).expect("date should be valid");
        assert_eq!(weekday_index(saturday), 6);
    }

    #[test]
    fn time_block_without_days_applies_every_day() {
        let block = TimeBlock {
            id: "tb".to_string(),
            category_id: "c1".to_string(),
            start_time: "09:00".to_string(),
            end_time: "17:00".to_string(),
            days_of_week: Vec::new(),
        };
        let wednesday = NaiveDate::from_ymd_opt(2026, 3, 4).expect("date should be valid");
        let saturday = NaiveDate::from_ymd_opt(2026, 3, 7).expect("date should be valid");
        assert!(block.applies_on(wednesday));
        assert!(block.applies_on(saturday));
    }

    #[test]
    fn weekday_restricted_block_skips_other_days() {
        let block = TimeBlock {
            id: "tb".to_string(),
            category_id: "c1".to_string(),
            start_time: "09:00".to_string(),
            end_time: "17:00".to_string(),
            days_of_week: vec![1, 2, 3, 4, 5],
        };
        let wednesday = NaiveDate::from_ymd_opt(2026, 3, 4).expect("date should be valid");
        let saturday = NaiveDate::from_ymd_opt(2026, 3, 7).expect("date should be valid");
        assert!(block.applies_on(wednesday));
        assert!(!block.applies_on(saturday));
    }

    #[test]
    fn weekday_names_tolerate_out_of_range_values() {
        assert_eq!(weekday_name(0), "Sun");
        assert_eq!(weekday_name(3), "Wed");
        assert_eq!(weekday_name(6), "Sat");
        assert_eq!(weekday_name(7), "?");
        assert_eq!(weekday_name(255), "?");
    }

    #[test]
    fn optional_text_maps_blank_input_to_none() {
        assert_eq!(optional_text(""), None);
        assert_eq!(optional_text("   "), None);
        assert_eq!(optional_text(" 09:00 "), Some("09:00".to_string()));
    }

    #[test]
    fn generated_ids_have_fixed_length() {
        let id = generate_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|value| value.is_ascii_alphanumeric()));
    }

    #[test]
    fn formats_minute_totals() {
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(60), "1h 00m");
        assert_eq!(format_minutes(135), "2h 15m");
    }
}
