//! Derived assessment results.
//!
//! Everything here is recomputable at any time from a [`SessionState`] and
//! the catalog; none of it is mutable state.
//!
//! [`SessionState`]: crate::domain::session::SessionState

use serde::{Deserialize, Serialize};

use crate::domain::item::Domain;

/// Classification band for a development quotient.
///
/// Bands are checked in descending order; the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// DQ ≥ 130.
    Excellent,
    /// DQ ≥ 110.
    Good,
    /// DQ ≥ 80.
    Normal,
    /// DQ ≥ 70.
    Borderline,
    /// DQ < 70.
    Delayed,
}

impl Classification {
    /// Classify a development quotient.
    pub fn from_quotient(quotient: i32) -> Self {
        if quotient >= 130 {
            Classification::Excellent
        } else if quotient >= 110 {
            Classification::Good
        } else if quotient >= 80 {
            Classification::Normal
        } else if quotient >= 70 {
            Classification::Borderline
        } else {
            Classification::Delayed
        }
    }

    /// Short human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Excellent => "excellent",
            Classification::Good => "good",
            Classification::Normal => "normal",
            Classification::Borderline => "borderline",
            Classification::Delayed => "delayed",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Scored summary of one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainAnalysis {
    /// Which domain this summarizes.
    pub domain: Domain,
    /// Age-equivalent score in months, one decimal.
    pub mental_age: f64,
    /// Per-domain quotient: `round(mental_age / chronological age * 100)`.
    pub quotient: i32,
    /// Classification of the per-domain quotient.
    pub classification: Classification,
    /// Absolute gap in months between mental age and chronological age.
    pub gap_months: f64,
}

/// Final (or interim) result of an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    /// Chronological age the quotient is computed against.
    pub chronological_age_months: f64,
    /// Per-domain scoring, in administration order.
    pub domains: Vec<DomainAnalysis>,
    /// Mean of the five domain mental ages, one decimal.
    pub total_mental_age: f64,
    /// `round(total_mental_age / chronological age * 100)`; 0 when the
    /// chronological age is zero.
    pub development_quotient: i32,
    /// Classification of the overall quotient.
    pub classification: Classification,
}

impl AssessmentResult {
    /// Mental age for one domain, if present.
    pub fn mental_age(&self, domain: Domain) -> Option<f64> {
        self.domains
            .iter()
            .find(|a| a.domain == domain)
            .map(|a| a.mental_age)
    }
}
