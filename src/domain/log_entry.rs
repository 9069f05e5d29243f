//! Operator activity log lines.
//!
//! Every line in the activity file has the shape
//!
//! ```text
//! <timestamp> - <LEVEL> - <user> - <action>
//! ```
//!
//! The first three ` - ` separators delimit the fields, so the action text
//! may itself contain ` - `. Older files written with a Python-style
//! `asctime` (`2024-05-01 10:15:00,123`) are accepted as well.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

const SEPARATOR: &str = " - ";

/// Severity of an activity log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Diagnostic detail.
    Debug,
    /// Normal operator activity.
    Info,
    /// Suspicious or rejected activity (failed login, empty observation).
    Warning,
    /// Failed operation.
    Error,
    /// Failure requiring immediate attention.
    Critical,
}

impl LogLevel {
    /// Returns the upper-case name stored in the file and the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a log line cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogParseError {
    /// Fewer than four ` - ` separated fields.
    #[error("expected 4 fields, found {0}")]
    MissingFields(usize),
    /// Timestamp in neither RFC 3339 nor `YYYY-MM-DD HH:MM:SS[.fff]` form.
    #[error("unrecognised timestamp: {0}")]
    BadTimestamp(String),
    /// Unknown severity name.
    #[error("unknown log level: {0}")]
    BadLevel(String),
}

impl FromStr for LogLevel {
    type Err = LogParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" => Ok(Self::Critical),
            other => Err(LogParseError::BadLevel(other.to_string())),
        }
    }
}

/// One operator action, as written to the activity file and the
/// `activity_logs` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the action happened.
    pub logged_at: DateTime<Utc>,
    /// Severity.
    pub level: LogLevel,
    /// Who performed the action (operator username or device name).
    pub user: String,
    /// What was done.
    pub action: String,
}

impl LogEntry {
    /// Creates an entry stamped with the current time.
    ///
    /// Line breaks in `user` and `action` are replaced by spaces so the
    /// entry always occupies exactly one line, and a separator inside `user`
    /// is collapsed so it cannot shift the action field.
    #[must_use]
    pub fn now(level: LogLevel, user: &str, action: &str) -> Self {
        Self {
            logged_at: Utc::now(),
            level,
            user: single_line(user).replace(SEPARATOR, "-"),
            action: single_line(action),
        }
    }

    /// Formats the entry as an activity file line (without the newline).
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}",
            self.logged_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.level,
            self.user,
            self.action
        )
    }

    /// Parses one activity file line.
    ///
    /// # Errors
    ///
    /// Returns a [`LogParseError`] if the line has fewer than four fields,
    /// or if the timestamp or level is not recognised.
    pub fn parse_line(line: &str) -> Result<Self, LogParseError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut parts = line.splitn(4, SEPARATOR);
        let (Some(timestamp), Some(level), Some(user), Some(action)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            let found = line.split(SEPARATOR).count();
            return Err(LogParseError::MissingFields(found));
        };

        Ok(Self {
            logged_at: parse_timestamp(timestamp)?,
            level: level.parse()?,
            user: user.trim().to_string(),
            action: action.trim().to_string(),
        })
    }
}

/// Parses an activity timestamp. A `,` fraction separator is treated as `.`.
///
/// # Errors
///
/// Returns [`LogParseError::BadTimestamp`] if no accepted format matches.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, LogParseError> {
    let normalized = raw.trim().replace(',', ".");
    if let Ok(ts) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| LogParseError::BadTimestamp(raw.trim().to_string()))
}

fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}
