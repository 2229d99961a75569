//! The fixed age ladder and age arithmetic.
//!
//! Every test item belongs to one rung of a fixed ascending ladder of
//! age-groups (in months). The ladder is monthly through the first year,
//! then quarterly through the third, then half-yearly up to 84 months.

use chrono::NaiveDate;

use crate::domain::error::{Result, ScaleError};

/// The age-groups (months) defined by the scale, strictly ascending.
pub const AGE_GROUPS: [u32; 28] = [
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 15, 18, 21, 24, 27, 30, 33, 36, 42, 48, 54, 60, 66, 72,
    78, 84,
];

/// Average days per month used to convert a day count into months.
pub const DAYS_PER_MONTH: f64 = 30.4375;

/// Position of an age-group in the ladder, if it is a defined rung.
pub fn ladder_index(age_months: u32) -> Option<usize> {
    AGE_GROUPS.iter().position(|&a| a == age_months)
}

/// Chronological age in months, rounded to one decimal.
///
/// Computed from the whole-day difference between the two dates divided by
/// [`DAYS_PER_MONTH`]. Fails with [`ScaleError::InvalidDateRange`] when the
/// assessment date precedes the birth date.
pub fn chronological_age_months(birth: NaiveDate, assessment: NaiveDate) -> Result<f64> {
    if assessment < birth {
        return Err(ScaleError::InvalidDateRange { birth, assessment });
    }
    let days = (assessment - birth).num_days() as f64;
    Ok(round_tenth(days / DAYS_PER_MONTH))
}

/// Index of the ladder rung closest to the chronological age.
///
/// On an exact midpoint between two rungs the lower rung wins.
pub fn resolve_anchor_index(chrono_age_months: f64) -> usize {
    let mut best = 0;
    let mut best_diff = (chrono_age_months - AGE_GROUPS[0] as f64).abs();
    for (idx, &age) in AGE_GROUPS.iter().enumerate().skip(1) {
        let diff = (chrono_age_months - age as f64).abs();
        // Strict comparison keeps the lower rung on ties.
        if diff < best_diff {
            best = idx;
            best_diff = diff;
        }
    }
    best
}

/// Total credit available for one age-group within one domain.
///
/// 1.0 point through 12 months, 3.0 through 36 months, 6.0 beyond.
pub fn point_value(age_months: u32) -> f64 {
    if age_months <= 12 {
        1.0
    } else if age_months <= 36 {
        3.0
    } else {
        6.0
    }
}

/// Round to one decimal place.
pub(crate) fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
