//! Date navigation: turning user input into an entry date

use crate::domain::entry::EntryDate;
use crate::error::{Result, TdiaryError};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// A day the user can navigate to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeReference {
    Today,
    Yesterday,
    Tomorrow,
    /// Today if it is that weekday, otherwise the most recent one
    Weekday(Weekday),
    /// Strictly before today
    LastWeekday(Weekday),
    /// Strictly after today
    NextWeekday(Weekday),
    Date(EntryDate),
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

impl TimeReference {
    pub fn parse(input: &str) -> Result<Self> {
        let normalized = input.trim().to_lowercase();
        let invalid = || TdiaryError::InvalidTimeReference(input.to_string());

        match normalized.as_str() {
            "today" | "now" => return Ok(TimeReference::Today),
            "yesterday" => return Ok(TimeReference::Yesterday),
            "tomorrow" => return Ok(TimeReference::Tomorrow),
            _ => {}
        }

        if let Some(day) = weekday_from_name(&normalized) {
            return Ok(TimeReference::Weekday(day));
        }
        if let Some(rest) = normalized.strip_prefix("last ") {
            return weekday_from_name(rest.trim())
                .map(TimeReference::LastWeekday)
                .ok_or_else(invalid);
        }
        if let Some(rest) = normalized.strip_prefix("next ") {
            return weekday_from_name(rest.trim())
                .map(TimeReference::NextWeekday)
                .ok_or_else(invalid);
        }

        normalized
            .parse::<EntryDate>()
            .map(TimeReference::Date)
            .map_err(|_| invalid())
    }

    pub fn resolve(&self, today: NaiveDate) -> EntryDate {
        let date = match self {
            TimeReference::Today => today,
            TimeReference::Yesterday => today - Duration::days(1),
            TimeReference::Tomorrow => today + Duration::days(1),
            TimeReference::Weekday(day) => today - Duration::days(days_back(today, *day, 0)),
            TimeReference::LastWeekday(day) => today - Duration::days(days_back(today, *day, 7)),
            TimeReference::NextWeekday(day) => {
                let ahead = (day.num_days_from_monday() as i64 + 7
                    - today.weekday().num_days_from_monday() as i64)
                    % 7;
                today + Duration::days(if ahead == 0 { 7 } else { ahead })
            }
            TimeReference::Date(date) => return *date,
        };
        EntryDate::new(date)
    }
}

/// Days back to the most recent `target`; `same_day` is used when today is `target`.
fn days_back(today: NaiveDate, target: Weekday, same_day: i64) -> i64 {
    let back = (today.weekday().num_days_from_monday() as i64 + 7
        - target.num_days_from_monday() as i64)
        % 7;
    if back == 0 {
        same_day
    } else {
        back
    }
}

/// Parse and resolve an optional reference, defaulting to today.
pub fn resolve_date(input: Option<&str>, today: NaiveDate) -> Result<EntryDate> {
    match input {
        Some(raw) => Ok(TimeReference::parse(raw)?.resolve(today)),
        None => Ok(EntryDate::new(today)),
    }
}
