//! Interview and coffee-chat scheduling: natural-language slot parsing and
//! proposed-slots → confirmed-slot proposals.

pub mod handlers;
pub mod parser;
pub mod proposals;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// A meeting slot: `date` is `YYYY-MM-DD`, `time` is 24-hour `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub date: String,
    pub time: String,
}

impl TimeSlot {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            time: time.format("%H:%M").to_string(),
        }
    }

    pub fn parse(&self) -> Result<(NaiveDate, NaiveTime), AppError> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|_| {
            AppError::Validation(format!("Invalid slot date '{}': expected YYYY-MM-DD", self.date))
        })?;
        let time = NaiveTime::parse_from_str(&self.time, "%H:%M").map_err(|_| {
            AppError::Validation(format!("Invalid slot time '{}': expected HH:MM", self.time))
        })?;
        Ok((date, time))
    }
}
