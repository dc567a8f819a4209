//! Work log domain model

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Most hours a single entry can record
pub const MAX_HOURS_PER_ENTRY: u32 = 24;

/// One recorded quantity of hours; its day index is its position in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkLogEntry {
    pub hours: Decimal,
    pub logged_at: DateTime<Utc>,
}

impl WorkLogEntry {
    /// Create an entry; hours must lie in `0..=MAX_HOURS_PER_ENTRY`
    pub fn new(hours: Decimal) -> Result<Self> {
        if hours.is_sign_negative() && !hours.is_zero() {
            return Err(Error::validation(format!(
                "hours cannot be negative (got {})",
                hours
            )));
        }
        if hours > Decimal::from(MAX_HOURS_PER_ENTRY) {
            return Err(Error::validation(format!(
                "at most {} hours per entry (got {})",
                MAX_HOURS_PER_ENTRY, hours
            )));
        }
        Ok(Self {
            hours,
            logged_at: Utc::now(),
        })
    }

    /// Parse user input into an hours value
    pub fn parse_hours(input: &str) -> Result<Decimal> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("hours cannot be empty"));
        }
        Decimal::from_str(trimmed)
            .map_err(|_| Error::validation(format!("hours must be a number (got '{}')", trimmed)))
    }
}
