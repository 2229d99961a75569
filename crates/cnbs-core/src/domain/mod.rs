//! Domain models for the assessment engine.
//!
//! Canonical definitions for the core entities:
//! - `Domain` / `Outcome`: the five developmental areas and per-item results
//! - `SessionState`: the mutable record of one assessment run
//! - `AssessmentResult`: the derived scores and classification

pub mod error;
pub mod item;
pub mod result;
pub mod session;

// Re-export main types and errors
pub use error::{Result, ScaleError};
pub use item::{Domain, Outcome};
pub use result::{AssessmentResult, Classification, DomainAnalysis};
pub use session::{AssessmentProgress, DomainState, GroupStatus, SearchPhase, SessionState};
