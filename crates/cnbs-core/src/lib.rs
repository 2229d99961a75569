//! # CNBS Core
//!
//! Adaptive administration and scoring engine for the 0–84 month
//! child-development screening scale (WS/T 580): 261 scored behavioral
//! items across five domains, bucketed into a fixed ladder of age-groups.
//!
//! The engine answers two questions:
//!
//! - **What to test next.** [`selection`] walks each domain's slice of the
//!   ladder adaptively: down from the anchor age-group until two consecutive
//!   fully-passed groups confirm the basal, then up until two consecutive
//!   fully-failed groups confirm the ceiling.
//! - **What the outcomes mean.** [`scoring`] converts the outcome log into
//!   per-domain mental ages, an overall mental age, a development quotient,
//!   and a classification band.
//!
//! The caller owns presentation and persistence: [`SessionState`]
//! serializes with `serde` and can be stored and restored between calls.
//!
//! ```
//! use chrono::NaiveDate;
//! use cnbs_core::{compute_result, initial_items, next_items, ItemCatalog, Outcome, SessionState};
//!
//! # fn main() -> cnbs_core::Result<()> {
//! let catalog = ItemCatalog::builtin();
//! let birth = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
//! let visit = NaiveDate::from_ymd_opt(2024, 7, 2).expect("valid date");
//! let mut session = SessionState::new(birth, visit)?;
//!
//! // Present the anchor age-group first.
//! for item in initial_items(catalog, &session) {
//!     session.record_outcome(catalog, item.id, Outcome::Pass)?;
//! }
//! // Then follow the engine until it has nothing left to present.
//! loop {
//!     let ids: Vec<u32> = next_items(catalog, &mut session).iter().map(|i| i.id).collect();
//!     if ids.is_empty() {
//!         break;
//!     }
//!     for id in ids {
//!         session.record_outcome(catalog, id, Outcome::Fail)?;
//!     }
//! }
//! let result = compute_result(catalog, &session);
//! assert_eq!(result.chronological_age_months, 6.0);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod domain;
pub mod ladder;
pub mod schedule;
pub mod scoring;
pub mod selection;

pub use catalog::{ItemCatalog, TestItem};
pub use domain::{
    AssessmentProgress, AssessmentResult, Classification, Domain, DomainAnalysis, DomainState,
    GroupStatus, Outcome, Result, ScaleError, SearchPhase, SessionState,
};
pub use schedule::{next_assessment, NextAssessment};
pub use scoring::{compute_result, domain_mental_age};
pub use selection::{initial_items, next_items, pending_items};
