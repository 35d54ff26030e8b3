//! Deterministic natural-language slot parsing.
//!
//! Three passes over the lowercased message, each adding slots not seen yet:
//! 1. `monday and tuesday at 9am`
//! 2. `monday at 9am`
//! 3. `[next] monday ... 2:30pm` (loose; the time must carry am/pm)

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::Regex;

use crate::errors::AppError;
use crate::schedule::TimeSlot;

const DAY: &str = r"monday|tuesday|wednesday|thursday|friday|saturday|sunday|tues|thurs|thur|mon|tue|wed|thu|fri|sat|sun";
const TIME: &str = r"\d{1,2}(?::\d{2})?(?:\s*(?:am|pm))?";
const TIME_WITH_PERIOD: &str = r"\d{1,2}(?::\d{2})?\s*(?:am|pm)";

static DAY_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b({DAY})\b(?:\s+and\s+({DAY})\b)?\s+at\s+({TIME})\b"
    ))
    .unwrap()
});
static DAY_AT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\b({DAY})\s+at\s+({TIME})\b")).unwrap());
static LOOSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:next\s+)?({DAY})\b.*?({TIME_WITH_PERIOD})\b"
    ))
    .unwrap()
});
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})(?::(\d{2}))?\s*(am|pm)?$").unwrap());

pub const NO_SLOTS_MESSAGE: &str = "I couldn't understand the scheduling request. \
    Please specify dates and times clearly (e.g., 'Monday and Tuesday at 9am').";

pub fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// `9am → 09:00`, `2:30pm → 14:30`, `12am → 00:00`, `12pm → 12:00`, `10 → 10:00`.
/// Out-of-range hours or minutes yield `None`.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let normalized = input.trim().to_lowercase();
    let caps = TIME_RE.captures(&normalized)?;

    let mut hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    match caps.get(3).map(|p| p.as_str()) {
        Some("pm") if hour != 12 => hour += 12,
        Some("am") if hour == 12 => hour = 0,
        _ => {}
    }

    if hour > 23 || minute > 59 {
        return None;
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// The next `target` strictly after `today` (a same-weekday request means next week).
pub fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let current = today.weekday().num_days_from_monday() as i64;
    let wanted = target.num_days_from_monday() as i64;
    let mut days_ahead = wanted - current;
    if days_ahead <= 0 {
        days_ahead += 7;
    }
    today + Duration::days(days_ahead)
}

/// Accepts `YYYY-MM-DD`, a naive `YYYY-MM-DDTHH:MM:SS[.f]`, or RFC 3339 with an offset.
pub fn parse_current_date(input: &str) -> Result<NaiveDate, AppError> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        AppError::Validation(format!(
            "Invalid current_date '{input}': expected an ISO-8601 date"
        ))
    })
}

/// Extracts slots in discovery order, without duplicates.
pub fn parse_schedule(message: &str, today: NaiveDate) -> Vec<TimeSlot> {
    let message = message.to_lowercase();
    let mut slots: Vec<TimeSlot> = Vec::new();

    let mut push = |day: &str, time: &str| {
        if let (Some(weekday), Some(time)) = (weekday_from_name(day), parse_time(time)) {
            let slot = TimeSlot::new(next_weekday(today, weekday), time);
            if !slots.contains(&slot) {
                slots.push(slot);
            }
        }
    };

    for caps in DAY_PAIR_RE.captures_iter(&message) {
        let time = &caps[3];
        push(&caps[1], time);
        if let Some(second) = caps.get(2) {
            push(second.as_str(), time);
        }
    }
    for caps in DAY_AT_RE.captures_iter(&message) {
        push(&caps[1], &caps[2]);
    }
    for caps in LOOSE_RE.captures_iter(&message) {
        push(&caps[1], &caps[2]);
    }

    slots
}

/// Confirmation text, e.g. "… for Monday, March 10 at 09:00 and Tuesday, March 11 at 09:00. …".
pub fn describe_slots(slots: &[TimeSlot]) -> String {
    if slots.is_empty() {
        return NO_SLOTS_MESSAGE.to_string();
    }

    let descriptions: Vec<String> = slots
        .iter()
        .map(|slot| match NaiveDate::parse_from_str(&slot.date, "%Y-%m-%d") {
            Ok(date) => format!("{} at {}", date.format("%A, %B %d"), slot.time),
            Err(_) => format!("{} at {}", slot.date, slot.time),
        })
        .collect();

    format!(
        "I've scheduled interview slots for {}. An email has been sent to the candidate with these options.",
        descriptions.join(" and ")
    )
}
