use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ReviewError;

/// Review state of a submission as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub const ALL: [HomeworkStatus; 3] = [Self::Approved, Self::Reviewing, Self::Rejected];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    /// Sentence sent to the chat for this status.
    pub fn verdict(self) -> &'static str {
        match self {
            Self::Approved => "Work reviewed: the reviewer liked everything. Hooray!",
            Self::Reviewing => "Work has been taken up for review by the reviewer.",
            Self::Rejected => "Work reviewed: the reviewer has comments.",
        }
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HomeworkStatus {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ReviewError::field(format!("unknown status: {s}")))
    }
}

/// One entry of the `homeworks` sequence. Other fields are ignored.
///
/// `status` stays raw JSON so a non-string value is reported as an unknown
/// status rather than a malformed record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HomeworkRecord {
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub homework_name: Option<String>,
}

impl HomeworkRecord {
    pub fn from_value(value: &Value) -> Result<Self, ReviewError> {
        if !value.is_object() {
            return Err(ReviewError::field("homework record is not an object"));
        }
        Self::deserialize(value).map_err(|e| ReviewError::field(format!("malformed homework record: {e}")))
    }
}

/// Builds the chat message for a homework record.
pub fn format_status(record: &HomeworkRecord) -> Result<String, ReviewError> {
    let status = record
        .status
        .as_ref()
        .ok_or_else(|| ReviewError::field("missing status"))?;
    let name = record
        .homework_name
        .as_deref()
        .ok_or_else(|| ReviewError::field("missing homework name"))?;
    let status: HomeworkStatus = match status {
        Value::String(s) => s.parse()?,
        other => return Err(ReviewError::field(format!("unknown status: {other}"))),
    };

    Ok(format!("Changed review status of \"{name}\". {}", status.verdict()))
}
