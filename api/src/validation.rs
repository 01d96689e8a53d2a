//! Field and record level checks applied before anything is persisted.

use chrono::NaiveDate;

use crate::Error;

/// Progress is a percentage. Applied once against the submitted field and
/// again as a record-level check right before the write; both must pass.
pub fn validate_progress(value: i32) -> Result<(), Error> {
    if (0..=100).contains(&value) {
        Ok(())
    } else {
        Err(Error::Validation {
            field: "progress",
            message: format!("progress must be between 0 and 100, got {value}"),
        })
    }
}

pub fn validate_project_dates(start_date: NaiveDate, due_date: NaiveDate) -> Result<(), Error> {
    if start_date <= due_date {
        Ok(())
    } else {
        Err(Error::Validation {
            field: "due_date",
            message: format!("due date {due_date} is before start date {start_date}"),
        })
    }
}
