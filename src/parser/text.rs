//! Tolerant number and timestamp parsing shared by the readers.

use crate::utils::config::{PRIMARY_DATE_FORMAT, SECONDARY_DATE_FORMAT};
use crate::utils::error::ParseError;
use chrono::NaiveDateTime;
use log::debug;

/// Parse a decimal number
///
/// **Public** - shared by all readers
///
/// Surrounding whitespace is ignored. Thousands separators are not.
pub fn parse_double(text: &str) -> Result<f64, ParseError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| ParseError::NumberFormat {
            text: text.to_string(),
        })
}

/// Parse a decimal number that may use a comma as decimal mark ("1,279")
pub fn parse_decimal_comma(text: &str) -> Result<f64, ParseError> {
    parse_double(&text.replace(',', ".")).map_err(|_| ParseError::NumberFormat {
        text: text.to_string(),
    })
}

/// Parse an integer
///
/// **Public** - byte counts and ids
pub fn parse_long(text: &str) -> Result<i64, ParseError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| ParseError::NumberFormat {
            text: text.to_string(),
        })
}

/// Timestamp layouts seen in IBM J9 logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// "Thu Aug 30 14:23:10 2007"
    WithWeekday,
    /// "Aug 30 14:23:10 2007"
    WithoutWeekday,
}

impl DateFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::WithWeekday => PRIMARY_DATE_FORMAT,
            Self::WithoutWeekday => SECONDARY_DATE_FORMAT,
        }
    }
}

/// Timestamp parser with a sticky fallback
///
/// The first failure with the primary format switches to the secondary
/// format for the rest of the session. The primary is never retried.
#[derive(Debug, Clone)]
pub struct TimestampParser {
    active: DateFormat,
}

impl TimestampParser {
    pub fn new() -> Self {
        Self {
            active: DateFormat::WithWeekday,
        }
    }

    /// Format the next timestamp will be parsed with
    pub fn active(&self) -> DateFormat {
        self.active
    }

    /// Parse `text`, falling back to the secondary format once
    ///
    /// # Errors
    /// * `ParseError::DateParse` - neither format applies
    pub fn parse(&mut self, text: &str) -> Result<NaiveDateTime, ParseError> {
        let text = text.trim();
        match NaiveDateTime::parse_from_str(text, self.active.pattern()) {
            Ok(time) => Ok(time),
            Err(_) if self.active == DateFormat::WithWeekday => {
                debug!("Switching to date format '{}'", SECONDARY_DATE_FORMAT);
                self.active = DateFormat::WithoutWeekday;
                self.parse(text)
            }
            Err(_) => Err(ParseError::DateParse {
                text: text.to_string(),
            }),
        }
    }
}

impl Default for TimestampParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Elapsed time relative to the first timestamp of a session
#[derive(Debug, Clone, Default)]
pub struct ElapsedClock {
    begin: Option<NaiveDateTime>,
}

impl ElapsedClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whole seconds since the first time passed in
    ///
    /// The first call fixes the session start and returns 0. Sub-second
    /// precision is dropped (truncation toward zero).
    pub fn elapsed_seconds(&mut self, time: NaiveDateTime) -> i64 {
        match self.begin {
            None => {
                self.begin = Some(time);
                0
            }
            Some(begin) => (time - begin).num_milliseconds() / 1000,
        }
    }

    pub fn begin(&self) -> Option<NaiveDateTime> {
        self.begin
    }
}
