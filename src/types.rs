//! Core domain types: the fetch cursor, homework records and review statuses

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Lower bound (epoch seconds) of the next fetch window
///
/// Passed to the API as `from_date`. Only the poll loop advances it, and only
/// after a cycle completes with a truthy `current_date`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor(pub i64);

impl Cursor {
    /// Create a new Cursor
    pub fn new(timestamp: i64) -> Self {
        Self(timestamp)
    }

    /// Get the inner epoch-seconds value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for Cursor {
    fn from(timestamp: i64) -> Self {
        Self(timestamp)
    }
}

impl From<Cursor> for i64 {
    fn from(cursor: Cursor) -> Self {
        cursor.0
    }
}

impl PartialEq<i64> for Cursor {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review status reported by the homework API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HomeworkStatus {
    /// Reviewer accepted the work
    Approved,
    /// Work is currently being reviewed
    Reviewing,
    /// Reviewer sent the work back with remarks
    Rejected,
}

impl HomeworkStatus {
    /// Every status the API documents
    pub const ALL: [HomeworkStatus; 3] = [
        HomeworkStatus::Approved,
        HomeworkStatus::Reviewing,
        HomeworkStatus::Rejected,
    ];

    /// Fixed notification sentence for this status
    pub const fn verdict(self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "The reviewer checked the work and liked everything. Hooray!",
            HomeworkStatus::Reviewing => "The work has been taken for review.",
            HomeworkStatus::Rejected => "The reviewer checked the work and left some remarks.",
        }
    }

    /// Wire representation of the status
    pub const fn as_str(self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for HomeworkStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(HomeworkStatus::Approved),
            "reviewing" => Ok(HomeworkStatus::Reviewing),
            "rejected" => Ok(HomeworkStatus::Rejected),
            other => Err(format!("unknown homework status: {other}")),
        }
    }
}

impl std::fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the `homeworks` array
///
/// Everything is optional at this level. A missing `homework_name` is reported
/// when the notification is formatted, an unknown `status` falls back to a
/// generic sentence. `homework_name` and `status` must be strings when present;
/// the informational fields are dropped to `None` if they have another type.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Homework {
    /// Identifier of the submission (usually `<login>__<repo>.zip`)
    #[serde(default)]
    pub homework_name: Option<String>,

    /// Raw review status code
    #[serde(default)]
    pub status: Option<String>,

    /// Numeric homework id
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i64>,

    /// Lesson the homework belongs to
    #[serde(default, deserialize_with = "lenient")]
    pub lesson_name: Option<String>,

    /// Free-form comment left by the reviewer
    #[serde(default, deserialize_with = "lenient")]
    pub reviewer_comment: Option<String>,

    /// When the status last changed (ISO 8601, as sent by the API)
    #[serde(default, deserialize_with = "lenient")]
    pub date_updated: Option<String>,
}

// Wrong-typed informational fields become `None` instead of failing the entry
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Validated payload of one `homework_statuses` call
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApiResponse {
    /// Homeworks whose status changed since the requested cursor, in API order
    pub homeworks: Vec<Homework>,

    /// Server time of the response; `None` when the API sent `null`
    pub current_date: Option<i64>,
}

impl ApiResponse {
    /// Cursor to use for the next fetch, if the response carries a truthy `current_date`
    pub fn next_cursor(&self) -> Option<Cursor> {
        self.current_date.filter(|&date| date != 0).map(Cursor)
    }
}
