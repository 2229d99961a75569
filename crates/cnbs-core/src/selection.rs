//! Item-selection engine.
//!
//! Drives the per-domain adaptive search: starting from the anchor
//! age-group, each domain first descends the ladder until two consecutive
//! fully-passed age-groups confirm the basal, then ascends from just above
//! the anchor until two consecutive fully-failed age-groups confirm the
//! ceiling. Ladder ends substitute for the missing second group.
//!
//! Phase is always re-derived from the outcome log before advancing, so
//! re-recorded outcomes are picked up immediately and nothing can go stale.
//!
//! Cells with no items are targeted like any other rung but are transparent
//! to the consecutive-pair checks: they neither block nor advance basal or
//! ceiling confirmation.

use tracing::{debug, info};

use crate::catalog::{ItemCatalog, TestItem};
use crate::domain::item::{Domain, Outcome};
use crate::domain::session::{GroupStatus, SearchPhase, SessionState};
use crate::ladder::AGE_GROUPS;

/// Items for the anchor age-group across all domains.
///
/// This is the first batch the caller presents; the anchor rung is already
/// targeted for every domain at session creation.
pub fn initial_items<'a>(catalog: &'a ItemCatalog, state: &SessionState) -> Vec<&'a TestItem> {
    Domain::ALL
        .into_iter()
        .flat_map(|domain| catalog.cell_items(domain, state.anchor_index))
        .collect()
}

/// Still-untested items across every rung targeted so far.
pub fn pending_items<'a>(catalog: &'a ItemCatalog, state: &SessionState) -> Vec<&'a TestItem> {
    let mut items = Vec::new();
    for domain in Domain::ALL {
        for &rung in &state.domains[&domain].targeted {
            items.extend(
                catalog
                    .cell_items(domain, rung)
                    .into_iter()
                    .filter(|item| state.outcome(item.id) == Outcome::Untested),
            );
        }
    }
    items
}

/// Advance the search and return the next batch of items to present.
///
/// Every domain not yet complete first has its phase re-derived from the
/// outcome log, then targets the single next untargeted rung its phase
/// dictates. Rounds repeat until the batch holds at least one item or every
/// domain is complete, so a non-empty return is guaranteed while any domain
/// is unfinished. An empty return means the assessment is finished and is
/// idempotent from then on. Each domain completes within ladder-length
/// targeting steps per phase.
pub fn next_items<'a>(catalog: &'a ItemCatalog, state: &mut SessionState) -> Vec<&'a TestItem> {
    loop {
        let mut batch: Vec<&TestItem> = Vec::new();
        let mut any_incomplete = false;

        for domain in Domain::ALL {
            refresh_phase(catalog, state, domain);

            let next = match state.domains[&domain].phase {
                SearchPhase::Complete => continue,
                SearchPhase::SeekingBasal => state.domains[&domain].lowest_targeted() - 1,
                SearchPhase::SeekingCeiling => state.domains[&domain].highest_targeted() + 1,
            };
            any_incomplete = true;

            let ds = state
                .domains
                .get_mut(&domain)
                .expect("every domain is initialized at session creation");
            ds.targeted.insert(next);
            ds.last_targeted = next;
            debug!(
                event = "selection.targeted",
                domain = %domain,
                age_months = AGE_GROUPS[next],
                phase = ?state.domains[&domain].phase,
            );

            batch.extend(
                catalog
                    .cell_items(domain, next)
                    .into_iter()
                    .filter(|item| state.outcome(item.id) == Outcome::Untested),
            );
        }

        if !batch.is_empty() || !any_incomplete {
            return batch;
        }
    }
}

/// Re-derive a domain's phase from the outcome log.
///
/// Transitions run forward only: a confirmed basal switches to
/// ceiling-seeking, a confirmed ceiling (or running off either end of the
/// ladder) completes the domain.
fn refresh_phase(catalog: &ItemCatalog, state: &mut SessionState, domain: Domain) {
    if state.domains[&domain].phase == SearchPhase::SeekingBasal {
        let at_bottom = state.domains[&domain].lowest_targeted() == 0;
        if basal_confirmed(catalog, state, domain) || at_bottom {
            info!(
                event = "selection.basal_confirmed",
                domain = %domain,
                at_bottom,
            );
            state
                .domains
                .get_mut(&domain)
                .expect("every domain is initialized at session creation")
                .phase = SearchPhase::SeekingCeiling;
        }
    }

    if state.domains[&domain].phase == SearchPhase::SeekingCeiling {
        let at_top = state.domains[&domain].highest_targeted() == AGE_GROUPS.len() - 1;
        if ceiling_confirmed(catalog, state, domain) || at_top {
            info!(
                event = "selection.domain_complete",
                domain = %domain,
                at_top,
            );
            state
                .domains
                .get_mut(&domain)
                .expect("every domain is initialized at session creation")
                .phase = SearchPhase::Complete;
        }
    }
}

/// Two ladder-adjacent targeted age-groups (empty cells transparent) are
/// both fully passed within the backward range.
fn basal_confirmed(catalog: &ItemCatalog, state: &SessionState, domain: Domain) -> bool {
    let low = state.domains[&domain].lowest_targeted();
    consecutive_pair(catalog, state, domain, low, state.anchor_index, GroupStatus::AllPass)
}

/// Two ladder-adjacent targeted age-groups (empty cells transparent) are
/// both fully failed within the forward range, which starts just above the
/// anchor and never re-examines groups the backward phase covered.
fn ceiling_confirmed(catalog: &ItemCatalog, state: &SessionState, domain: Domain) -> bool {
    let high = state.domains[&domain].highest_targeted();
    let first_forward = state.anchor_index + 1;
    if high < first_forward {
        return false;
    }
    consecutive_pair(catalog, state, domain, first_forward, high, GroupStatus::AllFail)
}

/// Whether two consecutive non-empty rungs in `from..=to` both have the
/// wanted status. Empty cells are skipped, so "consecutive" means adjacent
/// among rungs that actually hold items.
fn consecutive_pair(
    catalog: &ItemCatalog,
    state: &SessionState,
    domain: Domain,
    from: usize,
    to: usize,
    wanted: GroupStatus,
) -> bool {
    let mut prev_matched = false;
    for rung in from..=to {
        if catalog.cell_is_empty(domain, rung) {
            continue;
        }
        let matched = state.group_status(catalog, domain, rung) == wanted;
        if matched && prev_matched {
            return true;
        }
        prev_matched = matched;
    }
    false
}
