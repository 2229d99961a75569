//! Session state for one assessment run.
//!
//! A [`SessionState`] is created once from a birth date and an assessment
//! date and is exclusively owned by that run. It is mutated only by
//! [`SessionState::record_outcome`] and by the item-selection engine
//! advancing the per-domain search bookkeeping; the caller owns persistence
//! across sessions (the whole struct serializes with `serde`).

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::ItemCatalog;
use crate::domain::error::{Result, ScaleError};
use crate::domain::item::{Domain, Outcome};
use crate::ladder::{self, AGE_GROUPS};

/// Search phase of one domain's adaptive administration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    /// Descending from the anchor looking for two consecutive fully-passed
    /// age-groups.
    SeekingBasal,
    /// Ascending above the anchor looking for two consecutive fully-failed
    /// age-groups.
    SeekingCeiling,
    /// No further items will be presented for this domain.
    Complete,
}

/// On-demand status of one `(domain, age-group)` cell.
///
/// Always recomputed from the outcome log, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStatus {
    /// Every item in the cell passed. Vacuously true for empty cells.
    AllPass,
    /// Every item in the cell failed.
    AllFail,
    /// At least one pass and one fail.
    Mixed,
    /// At least one item untested, or the cell was never targeted.
    NotFullyTested,
}

/// Per-domain search bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainState {
    /// Current phase of the search state machine.
    pub phase: SearchPhase,
    /// Ladder index targeted most recently.
    pub last_targeted: usize,
    /// Every ladder index targeted for this domain so far.
    pub targeted: BTreeSet<usize>,
}

impl DomainState {
    fn anchored_at(anchor: usize) -> Self {
        Self {
            phase: SearchPhase::SeekingBasal,
            last_targeted: anchor,
            targeted: BTreeSet::from([anchor]),
        }
    }

    /// Lowest ladder index targeted so far.
    pub fn lowest_targeted(&self) -> usize {
        *self.targeted.iter().next().expect("anchor always targeted")
    }

    /// Highest ladder index targeted so far.
    pub fn highest_targeted(&self) -> usize {
        *self
            .targeted
            .iter()
            .next_back()
            .expect("anchor always targeted")
    }
}

/// Coarse progress snapshot for one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentProgress {
    /// Domains whose search reached [`SearchPhase::Complete`].
    pub completed_domains: usize,
    /// Total number of domains (always five).
    pub total_domains: usize,
    /// Items with a recorded pass/fail outcome.
    pub recorded_outcomes: usize,
}

impl AssessmentProgress {
    /// Completed fraction in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        self.completed_domains as f64 / self.total_domains as f64
    }
}

/// The mutable record of one assessment in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Persistence key for the caller's store.
    pub session_id: Uuid,
    /// Child's date of birth.
    pub birth_date: NaiveDate,
    /// Date the assessment is administered.
    pub assessment_date: NaiveDate,
    /// Derived age in months, one decimal.
    pub chronological_age_months: f64,
    /// Ladder index of the anchor age-group the search starts from.
    pub anchor_index: usize,
    /// When this session was created.
    pub created_at: DateTime<Utc>,
    /// Search bookkeeping per domain.
    pub domains: BTreeMap<Domain, DomainState>,
    /// Outcome log: item id to recorded outcome. Absent means untested.
    pub outcomes: BTreeMap<u32, Outcome>,
}

impl SessionState {
    /// Initialize a session from the child's birth date and the assessment
    /// date.
    ///
    /// Every domain starts in [`SearchPhase::SeekingBasal`] with the anchor
    /// age-group already targeted. Fails with
    /// [`ScaleError::InvalidDateRange`] when the assessment date precedes
    /// the birth date.
    pub fn new(birth_date: NaiveDate, assessment_date: NaiveDate) -> Result<Self> {
        let chronological_age_months =
            ladder::chronological_age_months(birth_date, assessment_date)?;
        let anchor_index = ladder::resolve_anchor_index(chronological_age_months);

        let domains = Domain::ALL
            .into_iter()
            .map(|domain| (domain, DomainState::anchored_at(anchor_index)))
            .collect();

        let session = Self {
            session_id: Uuid::new_v4(),
            birth_date,
            assessment_date,
            chronological_age_months,
            anchor_index,
            created_at: Utc::now(),
            domains,
            outcomes: BTreeMap::new(),
        };

        info!(
            event = "session.created",
            session_id = %session.session_id,
            chronological_age_months = session.chronological_age_months,
            anchor_age_months = session.anchor_age_months(),
        );

        Ok(session)
    }

    /// The anchor age-group in months.
    pub fn anchor_age_months(&self) -> u32 {
        AGE_GROUPS[self.anchor_index]
    }

    /// Record (or re-record) the outcome for one item.
    ///
    /// Re-recording simply replaces the prior value; recording
    /// [`Outcome::Untested`] clears it. An id absent from the catalog
    /// leaves the log untouched and surfaces [`ScaleError::UnknownItemId`]
    /// as a warning signal; the session remains usable.
    pub fn record_outcome(
        &mut self,
        catalog: &ItemCatalog,
        item_id: u32,
        outcome: Outcome,
    ) -> Result<()> {
        if !catalog.contains(item_id) {
            warn!(
                event = "session.unknown_item",
                session_id = %self.session_id,
                item_id,
                "outcome ignored: item id not in catalog"
            );
            return Err(ScaleError::UnknownItemId(item_id));
        }
        match outcome {
            Outcome::Untested => {
                self.outcomes.remove(&item_id);
            }
            _ => {
                self.outcomes.insert(item_id, outcome);
            }
        }
        Ok(())
    }

    /// Recorded outcome for an item, `Untested` when absent.
    pub fn outcome(&self, item_id: u32) -> Outcome {
        self.outcomes
            .get(&item_id)
            .copied()
            .unwrap_or(Outcome::Untested)
    }

    /// Status of one `(domain, ladder rung)` cell, recomputed on demand.
    ///
    /// Empty cells are vacuously [`GroupStatus::AllPass`]; non-empty cells
    /// that were never targeted for the domain are
    /// [`GroupStatus::NotFullyTested`] regardless of any recorded outcomes.
    pub fn group_status(&self, catalog: &ItemCatalog, domain: Domain, rung: usize) -> GroupStatus {
        let items = catalog.cell_items(domain, rung);
        if items.is_empty() {
            return GroupStatus::AllPass;
        }
        if !self.domains[&domain].targeted.contains(&rung) {
            return GroupStatus::NotFullyTested;
        }

        let mut passes = 0usize;
        let mut fails = 0usize;
        for item in &items {
            match self.outcome(item.id) {
                Outcome::Pass => passes += 1,
                Outcome::Fail => fails += 1,
                Outcome::Untested => return GroupStatus::NotFullyTested,
            }
        }
        if fails == 0 {
            GroupStatus::AllPass
        } else if passes == 0 {
            GroupStatus::AllFail
        } else {
            GroupStatus::Mixed
        }
    }

    /// Whether every domain's search is complete.
    pub fn is_finished(&self) -> bool {
        self.domains
            .values()
            .all(|d| d.phase == SearchPhase::Complete)
    }

    /// Coarse progress snapshot.
    pub fn progress(&self) -> AssessmentProgress {
        AssessmentProgress {
            completed_domains: self
                .domains
                .values()
                .filter(|d| d.phase == SearchPhase::Complete)
                .count(),
            total_domains: Domain::ALL.len(),
            recorded_outcomes: self.outcomes.len(),
        }
    }
}
