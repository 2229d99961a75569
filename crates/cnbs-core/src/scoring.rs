//! Scoring engine.
//!
//! Converts the (complete or frozen) outcome log into per-domain mental
//! ages, an overall mental age, a development quotient, and a
//! classification band. Scoring is pure: it reads the session and catalog,
//! caches nothing, and may be called redundantly at any time, including
//! mid-assessment.

use tracing::debug;

use crate::catalog::ItemCatalog;
use crate::domain::item::{Domain, Outcome};
use crate::domain::result::{AssessmentResult, Classification, DomainAnalysis};
use crate::domain::session::{GroupStatus, SessionState};
use crate::ladder::{point_value, round_tenth, AGE_GROUPS};

/// Compute the assessment result from the current outcome log.
pub fn compute_result(catalog: &ItemCatalog, state: &SessionState) -> AssessmentResult {
    let chrono = state.chronological_age_months;
    let mut domains = Vec::with_capacity(Domain::ALL.len());
    let mut sum = 0.0;

    for domain in Domain::ALL {
        let mental_age = domain_mental_age(catalog, state, domain);
        let quotient = quotient(mental_age, chrono);
        sum += mental_age;
        domains.push(DomainAnalysis {
            domain,
            mental_age,
            quotient,
            classification: Classification::from_quotient(quotient),
            gap_months: round_tenth((mental_age - chrono).abs()),
        });
    }

    let total_mental_age = round_tenth(sum / Domain::ALL.len() as f64);
    let development_quotient = quotient(total_mental_age, chrono);
    debug!(
        event = "scoring.computed",
        session_id = %state.session_id,
        total_mental_age,
        development_quotient,
    );

    AssessmentResult {
        chronological_age_months: chrono,
        domains,
        total_mental_age,
        development_quotient,
        classification: Classification::from_quotient(development_quotient),
    }
}

/// Age-equivalent score for one domain, in months, one decimal.
///
/// Every rung at or below the basal index contributes its full point value,
/// tested or not (the scale's compensatory rule). Above the basal, each
/// targeted rung contributes `point value / item count` per individually
/// passed item, up to the ceiling; nothing above the ceiling counts.
pub fn domain_mental_age(catalog: &ItemCatalog, state: &SessionState, domain: Domain) -> f64 {
    let basal = basal_index(catalog, state, domain);

    let mut score = 0.0;
    for rung in 0..AGE_GROUPS.len() {
        if (rung as isize) > basal {
            break;
        }
        score += point_value(AGE_GROUPS[rung]);
    }

    let mut prev_all_fail = false;
    for rung in 0..AGE_GROUPS.len() {
        if (rung as isize) <= basal {
            continue;
        }
        let items = catalog.cell_items(domain, rung);
        if items.is_empty() {
            continue;
        }
        let status = state.group_status(catalog, domain, rung);
        if status == GroupStatus::AllFail {
            if prev_all_fail {
                // Second of two consecutive fully-failed rungs: the
                // ceiling. Nothing above it is credited.
                break;
            }
            prev_all_fail = true;
        } else {
            prev_all_fail = false;
        }

        if state.domains[&domain].targeted.contains(&rung) {
            let per_item = point_value(AGE_GROUPS[rung]) / items.len() as f64;
            let passed = items
                .iter()
                .filter(|item| state.outcome(item.id) == Outcome::Pass)
                .count();
            score += per_item * passed as f64;
        }
    }

    round_tenth(score)
}

/// The highest rung credited as fully passed, or -1 when none is.
///
/// Ascending scan: the first targeted rung that is fully failed or mixed
/// marks the boundary and the basal sits one below it. Without such a
/// boundary the basal is the highest targeted fully-passed rung that
/// actually holds items.
fn basal_index(catalog: &ItemCatalog, state: &SessionState, domain: Domain) -> isize {
    for rung in 0..AGE_GROUPS.len() {
        match state.group_status(catalog, domain, rung) {
            GroupStatus::AllFail | GroupStatus::Mixed => return rung as isize - 1,
            _ => {}
        }
    }

    state.domains[&domain]
        .targeted
        .iter()
        .rev()
        .find(|&&rung| {
            !catalog.cell_is_empty(domain, rung)
                && state.group_status(catalog, domain, rung) == GroupStatus::AllPass
        })
        .map(|&rung| rung as isize)
        .unwrap_or(-1)
}

fn quotient(mental_age: f64, chrono_age: f64) -> i32 {
    if chrono_age > 0.0 {
        (mental_age / chrono_age * 100.0).round() as i32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TestItem;
    use crate::selection::{initial_items, next_items};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn item(id: u32, age: u32, domain: Domain) -> TestItem {
        TestItem {
            id,
            age_months: age,
            domain,
            description: format!("item {id}"),
            method: String::new(),
            pass_criteria: String::new(),
        }
    }

    /// Gross-motor items on rungs 5..=10 months, two per rung, ids `XY`
    /// with `X` the age and `Y` in {1, 2}.
    fn segment_catalog() -> ItemCatalog {
        let mut items = Vec::new();
        for age in 5..=10u32 {
            items.push(item(age * 10 + 1, age, Domain::GrossMotor));
            items.push(item(age * 10 + 2, age, Domain::GrossMotor));
        }
        ItemCatalog::new(items).expect("valid catalog")
    }

    /// 213 days -> 7.0 months, anchor rung 7 months (index 6).
    fn seven_month_session() -> SessionState {
        SessionState::new(date(2024, 1, 1), date(2024, 8, 1)).expect("valid session")
    }

    /// Drive the engine to completion with pass/fail decided per item.
    fn administer(
        catalog: &ItemCatalog,
        state: &mut SessionState,
        decide: impl Fn(&TestItem) -> Outcome,
    ) {
        let first: Vec<u32> = initial_items(catalog, state).iter().map(|i| i.id).collect();
        for id in first {
            let outcome = decide(catalog.item(id).expect("known id"));
            state.record_outcome(catalog, id, outcome).expect("known id");
        }
        loop {
            let ids: Vec<u32> = next_items(catalog, state).iter().map(|i| i.id).collect();
            if ids.is_empty() {
                break;
            }
            for id in ids {
                let outcome = decide(catalog.item(id).expect("known id"));
                state.record_outcome(catalog, id, outcome).expect("known id");
            }
        }
    }

    #[test]
    fn test_segment_example_basal_partial_and_ceiling() {
        // Fully passes 5 and 6 months, mixed at 7, fails 8 and 9: basal at
        // 6 months, ceiling at 8/9, half credit for the one pass at 7.
        let catalog = segment_catalog();
        let mut state = seven_month_session();
        administer(&catalog, &mut state, |item| match item.age_months {
            ..=6 => Outcome::Pass,
            7 if item.id == 71 => Outcome::Pass,
            _ => Outcome::Fail,
        });

        // Rungs 1..=6 months credit 1.0 each (1-4 months by the
        // compensatory rule, having never been tested), plus 0.5 at 7.
        let age = domain_mental_age(&catalog, &state, Domain::GrossMotor);
        assert_eq!(age, 6.5);
    }

    #[test]
    fn test_all_pass_below_anchor_all_fail_above() {
        let catalog = segment_catalog();
        let mut state = seven_month_session();
        administer(&catalog, &mut state, |item| {
            if item.age_months <= 7 {
                Outcome::Pass
            } else {
                Outcome::Fail
            }
        });

        // Mental age equals the summed point values of every rung at or
        // below the anchor, and nothing above contributes.
        let age = domain_mental_age(&catalog, &state, Domain::GrossMotor);
        assert_eq!(age, 7.0);
    }

    #[test]
    fn test_rerecording_changes_result_immediately() {
        let catalog = segment_catalog();
        let mut state = seven_month_session();
        administer(&catalog, &mut state, |item| match item.age_months {
            ..=6 => Outcome::Pass,
            7 if item.id == 71 => Outcome::Pass,
            _ => Outcome::Fail,
        });
        assert_eq!(domain_mental_age(&catalog, &state, Domain::GrossMotor), 6.5);

        // Correcting the failed anchor item lifts the basal to 7 months.
        state
            .record_outcome(&catalog, 72, Outcome::Pass)
            .expect("known id");
        assert_eq!(domain_mental_age(&catalog, &state, Domain::GrossMotor), 7.0);

        // And correcting it back restores the previous score.
        state
            .record_outcome(&catalog, 72, Outcome::Fail)
            .expect("known id");
        assert_eq!(domain_mental_age(&catalog, &state, Domain::GrossMotor), 6.5);
    }

    #[test]
    fn test_no_credit_above_ceiling() {
        let catalog = segment_catalog();
        let mut state = seven_month_session();
        administer(&catalog, &mut state, |item| match item.age_months {
            ..=7 => Outcome::Pass,
            _ => Outcome::Fail,
        });

        // Force a pass above the confirmed 8/9 ceiling: the 10-month rung
        // was completed out-of-band, but nothing above the ceiling counts.
        let rung_10 = crate::ladder::ladder_index(10).expect("rung");
        state
            .domains
            .get_mut(&Domain::GrossMotor)
            .expect("domain present")
            .targeted
            .insert(rung_10);
        state
            .record_outcome(&catalog, 101, Outcome::Pass)
            .expect("known id");
        state
            .record_outcome(&catalog, 102, Outcome::Pass)
            .expect("known id");

        assert_eq!(domain_mental_age(&catalog, &state, Domain::GrossMotor), 7.0);
    }

    #[test]
    fn test_untargeted_passes_earn_no_partial_credit() {
        let catalog = segment_catalog();
        let mut state = seven_month_session();

        // Pass the 8-month items without that rung ever being targeted.
        state
            .record_outcome(&catalog, 81, Outcome::Pass)
            .expect("known id");
        state
            .record_outcome(&catalog, 82, Outcome::Pass)
            .expect("known id");
        assert_eq!(domain_mental_age(&catalog, &state, Domain::GrossMotor), 0.0);
    }

    #[test]
    fn test_basal_fallback_is_highest_targeted_all_pass() {
        let catalog = segment_catalog();
        let mut state = seven_month_session();
        // Anchor fully passed, nothing else recorded: no fail/mixed
        // boundary exists, so the anchor itself is the basal.
        state
            .record_outcome(&catalog, 71, Outcome::Pass)
            .expect("known id");
        state
            .record_outcome(&catalog, 72, Outcome::Pass)
            .expect("known id");

        // Rungs 1..=7 months, 1.0 each.
        assert_eq!(domain_mental_age(&catalog, &state, Domain::GrossMotor), 7.0);
    }

    #[test]
    fn test_domain_without_items_scores_zero() {
        let catalog = segment_catalog();
        let state = seven_month_session();
        assert_eq!(domain_mental_age(&catalog, &state, Domain::Language), 0.0);
    }

    #[test]
    fn test_zero_chronological_age_has_zero_quotient() {
        let catalog = segment_catalog();
        let state =
            SessionState::new(date(2024, 1, 1), date(2024, 1, 1)).expect("valid session");
        let result = compute_result(&catalog, &state);
        assert_eq!(result.development_quotient, 0);
        assert_eq!(result.classification, Classification::Delayed);
    }

    #[test]
    fn test_result_aggregates_domains() {
        let catalog = segment_catalog();
        let mut state = seven_month_session();
        administer(&catalog, &mut state, |item| {
            if item.age_months <= 7 {
                Outcome::Pass
            } else {
                Outcome::Fail
            }
        });

        let result = compute_result(&catalog, &state);
        assert_eq!(result.domains.len(), 5);
        assert_eq!(result.mental_age(Domain::GrossMotor), Some(7.0));
        // The other four domains hold no items and score zero.
        assert_eq!(result.total_mental_age, 1.4);
        assert_eq!(result.development_quotient, 20);
        assert_eq!(result.classification, Classification::Delayed);

        let gross = &result.domains[0];
        assert_eq!(gross.domain, Domain::GrossMotor);
        assert_eq!(gross.quotient, 100);
        assert_eq!(gross.classification, Classification::Normal);
        assert_eq!(gross.gap_months, 0.0);
    }
}
