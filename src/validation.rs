//! Shape validation of `homework_statuses` payloads
//!
//! The API is expected to answer with:
//!
//! ```json
//! {
//!   "homeworks": [{"homework_name": "hw1", "status": "approved"}],
//!   "current_date": 1581604970
//! }
//! ```
//!
//! Anything else is a contract violation. These are reported as
//! [`ValidationError`]s and abort the current cycle; they are not transient.

use crate::error::{Result, ValidationError};
use crate::types::{ApiResponse, Homework};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

/// Key holding the list of changed homeworks
pub const HOMEWORKS_KEY: &str = "homeworks";
/// Key holding the server timestamp for the next cursor
pub const CURRENT_DATE_KEY: &str = "current_date";

/// Check a decoded payload and return its typed view
///
/// Checks, in order: the top level is an object, `homeworks` and
/// `current_date` are present, `homeworks` is an array of objects and
/// `current_date` is an integer or null. The returned [`ApiResponse`] holds
/// the payload's data unchanged.
///
/// # Errors
///
/// Returns [`ValidationError::Shape`] or [`ValidationError::MissingField`]
/// (wrapped in [`crate::Error::Validation`]). The failure is logged before it
/// is returned.
pub fn check_response(payload: &Value) -> Result<ApiResponse> {
    let response = validate(payload).inspect_err(|e| {
        error!(error = %e, "API response does not match the documented format");
    })?;

    debug!(
        homeworks = response.homeworks.len(),
        current_date = ?response.current_date,
        "API response matches the documented format"
    );
    Ok(response)
}

fn validate(payload: &Value) -> std::result::Result<ApiResponse, ValidationError> {
    let object = payload
        .as_object()
        .ok_or_else(|| ValidationError::shape("$", "an object"))?;

    let homeworks = object
        .get(HOMEWORKS_KEY)
        .ok_or_else(|| ValidationError::missing(HOMEWORKS_KEY))?;
    let current_date = object
        .get(CURRENT_DATE_KEY)
        .ok_or_else(|| ValidationError::missing(CURRENT_DATE_KEY))?;

    let entries = homeworks
        .as_array()
        .ok_or_else(|| ValidationError::shape(HOMEWORKS_KEY, "an array"))?;

    let homeworks = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_homework(index, entry))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let current_date = match current_date {
        Value::Null => None,
        other => Some(
            other
                .as_i64()
                .ok_or_else(|| ValidationError::shape(CURRENT_DATE_KEY, "an integer"))?,
        ),
    };

    Ok(ApiResponse {
        homeworks,
        current_date,
    })
}

fn parse_homework(index: usize, entry: &Value) -> std::result::Result<Homework, ValidationError> {
    let field = format!("{HOMEWORKS_KEY}[{index}]");
    if !entry.is_object() {
        return Err(ValidationError::shape(field, "an object"));
    }

    Homework::deserialize(entry).map_err(|e| {
        debug!(field = %field, error = %e, "Homework entry has unexpected field types");
        ValidationError::shape(field, "an object with string `homework_name` and `status`")
    })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    fn validation_error(payload: Value) -> ValidationError {
        match check_response(&payload).unwrap_err() {
            Error::Validation(e) => e,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_payload() {
        let payload = json!({
            "homeworks": [
                {"homework_name": "hw1", "status": "approved"},
                {"homework_name": "hw2", "status": "reviewing", "id": 7}
            ],
            "current_date": 2000
        });

        let response = check_response(&payload).unwrap();
        assert_eq!(response.homeworks.len(), 2);
        assert_eq!(response.homeworks[0].homework_name.as_deref(), Some("hw1"));
        assert_eq!(response.homeworks[1].status.as_deref(), Some("reviewing"));
        assert_eq!(response.homeworks[1].id, Some(7));
        assert_eq!(response.current_date, Some(2000));
    }

    #[test]
    fn test_empty_homeworks_is_valid() {
        let response = check_response(&json!({"homeworks": [], "current_date": 5})).unwrap();
        assert!(response.homeworks.is_empty());
    }

    #[test]
    fn test_null_current_date_is_valid() {
        let response = check_response(&json!({"homeworks": [], "current_date": null})).unwrap();
        assert_eq!(response.current_date, None);
    }

    #[test]
    fn test_top_level_must_be_object() {
        for payload in [json!([]), json!("homeworks"), json!(42), json!(null)] {
            assert_eq!(
                validation_error(payload),
                ValidationError::shape("$", "an object")
            );
        }
    }

    #[test]
    fn test_missing_homeworks() {
        assert_eq!(
            validation_error(json!({"current_date": 1})),
            ValidationError::missing("homeworks")
        );
    }

    #[test]
    fn test_missing_current_date() {
        assert_eq!(
            validation_error(json!({"homeworks": []})),
            ValidationError::missing("current_date")
        );
    }

    #[test]
    fn test_homeworks_must_be_array() {
        for homeworks in [json!({"hw1": "approved"}), json!("hw1"), json!(null)] {
            assert_eq!(
                validation_error(json!({"homeworks": homeworks, "current_date": 1})),
                ValidationError::shape("homeworks", "an array")
            );
        }
    }

    #[test]
    fn test_homework_entries_must_be_objects() {
        let err = validation_error(json!({
            "homeworks": [{"homework_name": "hw1"}, "hw2"],
            "current_date": 1
        }));
        assert_eq!(err, ValidationError::shape("homeworks[1]", "an object"));
    }

    #[test]
    fn test_homework_field_types_are_checked() {
        let err = validation_error(json!({
            "homeworks": [{"homework_name": 12, "status": "approved"}],
            "current_date": 1
        }));
        assert!(matches!(err, ValidationError::Shape { ref field, .. } if field == "homeworks[0]"));
    }

    #[test]
    fn test_informational_fields_do_not_fail_validation() {
        let response = check_response(&json!({
            "homeworks": [
                {"homework_name": "hw1", "status": "approved", "id": "124"},
                {"homework_name": "hw2", "status": "rejected", "reviewer_comment": {"text": "ok"}},
                {"homework_name": "hw3", "status": "reviewing", "id": 1.5, "lesson_name": 7}
            ],
            "current_date": 2000
        }))
        .unwrap();

        assert_eq!(response.homeworks.len(), 3);
        assert_eq!(response.homeworks[0].id, None);
        assert_eq!(response.homeworks[1].status.as_deref(), Some("rejected"));
        assert_eq!(response.homeworks[1].reviewer_comment, None);
        assert_eq!(response.homeworks[2].lesson_name, None);
        assert_eq!(response.next_cursor(), Some(crate::types::Cursor(2000)));
    }

    #[test]
    fn test_status_must_be_string() {
        let err = validation_error(json!({
            "homeworks": [{"homework_name": "hw1", "status": ["approved"]}],
            "current_date": 1
        }));
        assert!(matches!(err, ValidationError::Shape { ref field, .. } if field == "homeworks[0]"));
    }

    #[test]
    fn test_current_date_must_be_integer() {
        assert_eq!(
            validation_error(json!({"homeworks": [], "current_date": "yesterday"})),
            ValidationError::shape("current_date", "an integer")
        );
    }
}
