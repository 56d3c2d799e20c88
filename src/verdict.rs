//! Translation of raw review statuses into notification text

use crate::error::{Result, ValidationError};
use crate::types::{Homework, HomeworkStatus};
use std::fmt;
use tracing::error;

/// Sentence sent when the API reports no homework changes
pub const NO_HOMEWORKS_MESSAGE: &str = "The homework list is empty: no status changes.";

/// Outcome of looking up a status code
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// A documented status with its fixed sentence
    Known(HomeworkStatus),
    /// A status the API does not document (or no status at all)
    Unknown(Option<String>),
}

impl Verdict {
    /// The sentence to put in the notification
    pub fn sentence(&self) -> String {
        match self {
            Verdict::Known(status) => status.verdict().to_string(),
            Verdict::Unknown(Some(code)) => {
                format!("The work has an unrecognized review status \"{code}\".")
            }
            Verdict::Unknown(None) => "The work has no review status.".to_string(),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sentence())
    }
}

/// Look up the verdict for a raw status code
///
/// Unknown codes are logged and mapped to [`Verdict::Unknown`] so the caller
/// still has something to send.
pub fn translate(status: Option<&str>) -> Verdict {
    match status.map(str::parse::<HomeworkStatus>) {
        Some(Ok(known)) => Verdict::Known(known),
        Some(Err(_)) => {
            let code = status.map(str::to_string);
            error!(status = ?code, "Received undocumented homework status");
            Verdict::Unknown(code)
        }
        None => {
            error!("Homework entry has no status");
            Verdict::Unknown(None)
        }
    }
}

/// Build the notification text for a single homework
///
/// # Errors
///
/// Returns [`ValidationError::MissingField`] if the entry has no `homework_name`.
pub fn parse_status(homework: &Homework) -> Result<String> {
    let Some(name) = homework.homework_name.as_deref() else {
        error!("API response entry has no `homework_name`");
        return Err(ValidationError::missing("homework_name").into());
    };

    let verdict = translate(homework.status.as_deref());
    Ok(format!(
        "Review status of homework \"{name}\" changed. {verdict}"
    ))
}
