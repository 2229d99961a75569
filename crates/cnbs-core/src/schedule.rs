//! Next-assessment scheduling.
//!
//! The scale is re-administered as the child reaches the next ladder rung.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::error::Result;
use crate::ladder::{self, AGE_GROUPS};

/// A recommended follow-up assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextAssessment {
    /// Projected calendar date of the follow-up.
    pub date: NaiveDate,
    /// Ladder rung (months) the child will be assessed against.
    pub age_months: u32,
}

/// First ladder rung above the child's current age and the projected date
/// to test it, whole months rounded up.
///
/// Returns `None` once the child has aged past the top of the ladder.
/// Fails with `InvalidDateRange` when `today` precedes the birth date.
pub fn next_assessment(birth_date: NaiveDate, today: NaiveDate) -> Result<Option<NextAssessment>> {
    let age = ladder::chronological_age_months(birth_date, today)?;
    let Some(&age_months) = AGE_GROUPS.iter().find(|&&rung| (rung as f64) > age) else {
        return Ok(None);
    };
    let months_ahead = (age_months as f64 - age).ceil() as u32;
    Ok(today
        .checked_add_months(Months::new(months_ahead))
        .map(|date| NextAssessment { date, age_months }))
}
