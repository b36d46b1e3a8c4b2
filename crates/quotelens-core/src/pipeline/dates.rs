//! Quote-date parsing and decomposition.

use chrono::{Datelike, NaiveDate};

use quotelens_types::{QuoteLensError, Result, Value};

/// Calendar parts of a quote date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    pub year: i32,
    /// 1--4.
    pub quarter: u32,
    /// 1--12.
    pub month: u32,
    pub day: u32,
    /// Monday = 0 .. Sunday = 6.
    pub day_of_week: u32,
}

impl DateParts {
    /// Values in [`super::schema::DATE_COLUMNS`] order.
    pub fn as_features(&self) -> [f64; 5] {
        [
            f64::from(self.year),
            f64::from(self.quarter),
            f64::from(self.month),
            f64::from(self.day),
            f64::from(self.day_of_week),
        ]
    }
}

impl From<NaiveDate> for DateParts {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: (date.month() - 1) / 3 + 1,
            month: date.month(),
            day: date.day(),
            day_of_week: date.weekday().num_days_from_monday(),
        }
    }
}

/// Parse a date cell strictly; anything but matching text is a validation error.
pub fn parse_date(field: &str, value: &Value, format: &str) -> Result<NaiveDate> {
    let text = value.as_text().ok_or_else(|| {
        QuoteLensError::validation(field, format!("expected a date ({format}), got {value}"))
    })?;
    NaiveDate::parse_from_str(text, format).map_err(|e| {
        QuoteLensError::validation(field, format!("expected a date ({format}), got {text:?}: {e}"))
    })
}
