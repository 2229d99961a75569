//! Developmental domains and per-item outcomes.

use serde::{Deserialize, Serialize};

/// The five developmental domains measured by the scale.
///
/// The variant order is the fixed administration order and is fixed for the
/// life of the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    GrossMotor,
    FineMotor,
    Adaptive,
    Language,
    Social,
}

impl Domain {
    /// All domains in administration order.
    pub const ALL: [Domain; 5] = [
        Domain::GrossMotor,
        Domain::FineMotor,
        Domain::Adaptive,
        Domain::Language,
        Domain::Social,
    ];

    /// Short human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Domain::GrossMotor => "gross motor",
            Domain::FineMotor => "fine motor",
            Domain::Adaptive => "adaptive",
            Domain::Language => "language",
            Domain::Social => "social",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Recorded result for a single test item.
///
/// Every item starts `Untested`; recording overwrites the prior value with
/// no history kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail,
    Untested,
}
