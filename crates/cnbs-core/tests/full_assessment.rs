//! End-to-end assessments against the full builtin catalog.

use chrono::NaiveDate;
use cnbs_core::{
    compute_result, initial_items, next_items, Classification, ItemCatalog, Outcome, ScaleError,
    SessionState, TestItem,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Run a whole assessment, deciding each item as it is presented.
/// Returns the number of `next_items` calls that produced a batch.
fn administer(
    catalog: &ItemCatalog,
    session: &mut SessionState,
    mut decide: impl FnMut(&TestItem) -> Outcome,
) -> usize {
    let first: Vec<u32> = initial_items(catalog, session)
        .iter()
        .map(|i| i.id)
        .collect();
    for id in first {
        let outcome = decide(catalog.item(id).expect("catalog id"));
        session
            .record_outcome(catalog, id, outcome)
            .expect("catalog id");
    }

    let mut calls = 0;
    loop {
        let ids: Vec<u32> = next_items(catalog, session).iter().map(|i| i.id).collect();
        if ids.is_empty() {
            break;
        }
        calls += 1;
        assert!(calls <= 10 * 28, "selection engine did not terminate");
        for id in ids {
            let outcome = decide(catalog.item(id).expect("catalog id"));
            session
                .record_outcome(catalog, id, outcome)
                .expect("catalog id");
        }
    }
    calls
}

#[test]
fn six_month_child_on_level_scores_dq_100() {
    let catalog = ItemCatalog::builtin();
    // 183 days -> exactly 6.0 months, anchored on the 6-month rung.
    let mut session = SessionState::new(date(2024, 1, 1), date(2024, 7, 2)).expect("valid dates");
    assert_eq!(session.chronological_age_months, 6.0);
    assert_eq!(session.anchor_age_months(), 6);

    administer(catalog, &mut session, |item| {
        if item.age_months <= 6 {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    });
    assert!(session.is_finished());

    let result = compute_result(catalog, &session);
    // Each domain earns the full point value of every rung at or below the
    // anchor (six 1-point rungs) and nothing above it.
    for analysis in &result.domains {
        assert_eq!(analysis.mental_age, 6.0, "{:?}", analysis.domain);
        assert_eq!(analysis.quotient, 100);
    }
    assert_eq!(result.total_mental_age, 6.0);
    assert_eq!(result.development_quotient, 100);
    assert_eq!(result.classification, Classification::Normal);
}

#[test]
fn advanced_child_scores_above_age() {
    let catalog = ItemCatalog::builtin();
    // 100 days -> 3.3 months, anchored on the 3-month rung.
    let mut session = SessionState::new(date(2024, 1, 1), date(2024, 4, 10)).expect("valid dates");
    assert_eq!(session.anchor_age_months(), 3);

    administer(catalog, &mut session, |item| {
        if item.age_months <= 9 {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    });

    let result = compute_result(catalog, &session);
    // Basal rises to the 9-month rung in every domain: nine 1-point rungs.
    assert_eq!(result.total_mental_age, 9.0);
    assert_eq!(result.development_quotient, 273);
    assert_eq!(result.classification, Classification::Excellent);
}

#[test]
fn child_failing_everything_scores_zero() {
    let catalog = ItemCatalog::builtin();
    let mut session = SessionState::new(date(2024, 1, 1), date(2024, 7, 2)).expect("valid dates");

    administer(catalog, &mut session, |_| Outcome::Fail);

    let result = compute_result(catalog, &session);
    assert_eq!(result.total_mental_age, 0.0);
    assert_eq!(result.development_quotient, 0);
    assert_eq!(result.classification, Classification::Delayed);
}

#[test]
fn selection_stays_within_ladder_bound_per_domain() {
    let catalog = ItemCatalog::builtin();
    let mut session = SessionState::new(date(2023, 1, 1), date(2024, 7, 2)).expect("valid dates");

    // Alternating outcomes produce mixed groups everywhere, forcing the
    // longest search: all the way down, then all the way up.
    let mut flip = false;
    let calls = administer(catalog, &mut session, |_| {
        flip = !flip;
        if flip {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    });
    assert!(session.is_finished());
    // Each call advances every unfinished domain by at least one rung, so
    // the whole assessment fits inside two ladder traversals.
    assert!(calls <= 2 * 28, "took {calls} calls");

    // Finished means finished: further calls return nothing.
    assert!(next_items(catalog, &mut session).is_empty());
    assert!(next_items(catalog, &mut session).is_empty());
}

#[test]
fn unknown_item_id_does_not_corrupt_the_session() {
    let catalog = ItemCatalog::builtin();
    let mut session = SessionState::new(date(2024, 1, 1), date(2024, 7, 2)).expect("valid dates");

    let err = session
        .record_outcome(catalog, 99_999, Outcome::Pass)
        .unwrap_err();
    assert!(matches!(err, ScaleError::UnknownItemId(99_999)));
    assert!(session.outcomes.is_empty());

    // The warning is recoverable: administration continues normally.
    administer(catalog, &mut session, |item| {
        if item.age_months <= 6 {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    });
    let result = compute_result(catalog, &session);
    assert_eq!(result.total_mental_age, 6.0);
}

#[test]
fn session_survives_serialization_mid_assessment() {
    let catalog = ItemCatalog::builtin();
    let mut session = SessionState::new(date(2024, 1, 1), date(2024, 7, 2)).expect("valid dates");

    // Record the anchor batch, then snapshot the session as its caller
    // would between visits.
    let first: Vec<u32> = initial_items(catalog, &session)
        .iter()
        .map(|i| i.id)
        .collect();
    for id in first {
        session
            .record_outcome(catalog, id, Outcome::Pass)
            .expect("catalog id");
    }
    let snapshot = serde_json::to_string(&session).expect("serialize");

    let mut restored: SessionState = serde_json::from_str(&snapshot).expect("deserialize");
    assert_eq!(restored, session);

    // The restored session picks up exactly where the original left off.
    administer(catalog, &mut restored, |item| {
        if item.age_months <= 6 {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    });
    let result = compute_result(catalog, &restored);
    assert_eq!(result.development_quotient, 100);
}

#[test]
fn interim_scoring_is_available_mid_assessment() {
    let catalog = ItemCatalog::builtin();
    let mut session = SessionState::new(date(2024, 1, 1), date(2024, 7, 2)).expect("valid dates");

    // Scoring a fresh session is total: nothing recorded, everything zero.
    let result = compute_result(catalog, &session);
    assert_eq!(result.total_mental_age, 0.0);

    // Pass the anchor batch only; the interim score already reflects it.
    let first: Vec<u32> = initial_items(catalog, &session)
        .iter()
        .map(|i| i.id)
        .collect();
    for id in first {
        session
            .record_outcome(catalog, id, Outcome::Pass)
            .expect("catalog id");
    }
    let result = compute_result(catalog, &session);
    assert!(result.total_mental_age > 0.0);
    assert!(!session.is_finished());
}
