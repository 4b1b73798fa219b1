// Unit tests for TA Assign

use std::collections::HashMap;

use ta_assign::core::{
    preference::{rank_to_score, preference_rank, preference_score},
    scoring::calculate_pair_score,
};
use ta_assign::models::{TeachingAssistant, Professor, WeightConfig, AssignmentResult};
use ta_assign::services::{plan_links, TaCourseLink};

fn weights(ta_pref: f64, prof_pref: f64, workload_balance: f64) -> WeightConfig {
    WeightConfig {
        ta_pref,
        prof_pref,
        course_pref: 0.0,
        workload_balance,
    }
}

#[test]
fn test_rank_to_score_is_normalized() {
    for max_rank in 0..10 {
        for rank in 0..=max_rank {
            let score = rank_to_score(rank, max_rank);
            assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
        }
    }
}

#[test]
fn test_rank_to_score_empty_list() {
    assert_eq!(rank_to_score(0, 0), 0.0);
}

#[test]
fn test_preference_lookup() {
    let prefs = vec!["Turing".to_string(), "Hopper".to_string()];

    assert_eq!(preference_rank(&prefs, "Hopper"), 1);
    assert_eq!(preference_score(&prefs, "Turing"), 1.0);
    assert_eq!(preference_score(&prefs, "Hopper"), 0.5);
    assert_eq!(preference_score(&prefs, "Lovelace"), 0.0);
}

#[test]
fn test_pair_score_combines_components() {
    let ta = TeachingAssistant::new(1, "A", 2).prefers(["X", "Y"]);
    let prof = Professor::new(1, "Y", 2).prefers(["B", "C", "A", "D"]);

    let score = calculate_pair_score(&ta, &prof, 1, 1.0, &weights(0.2, 0.4, 0.4));

    assert_eq!(score.ta_score, 0.5);
    assert_eq!(score.prof_score, 0.5);
    assert_eq!(score.workload_score, 1.0);
    assert!((score.total - (0.2 * 0.5 + 0.4 * 0.5 + 0.4 * 1.0)).abs() < 1e-12);
}

#[test]
fn test_pair_score_never_negative() {
    let ta = TeachingAssistant::new(1, "A", 1);
    let prof = Professor::new(1, "X", 1);

    let score = calculate_pair_score(&ta, &prof, 50, 0.5, &weights(1.0, 1.0, 1.0));

    assert_eq!(score.workload_score, 0.0);
    assert_eq!(score.total, 0.0);
}

#[test]
fn test_workload_term_prefers_ta_near_average() {
    // Neither side has a preference; only the workload term differs
    let a = TeachingAssistant::new(1, "A", 1);
    let b = TeachingAssistant::new(2, "B", 1);
    let prof = Professor::new(1, "X", 1);
    let w = weights(0.0, 0.0, 1.0);
    let avg_workload = 0.5;

    let a_score = calculate_pair_score(&a, &prof, 2, avg_workload, &w);
    let b_score = calculate_pair_score(&b, &prof, 0, avg_workload, &w);

    assert!(b_score.total > a_score.total);
}

#[test]
fn test_plan_links_fans_out_courses() {
    let tas = vec![TeachingAssistant::new(7, "A", 2)];
    let professors = vec![Professor::new(3, "X", 2)];
    let courses = HashMap::from([(3, vec![30, 31])]);

    let mut result = AssignmentResult::default();
    result.assignments.insert("X".to_string(), vec!["A".to_string()]);
    result.workloads.insert("A".to_string(), 1);

    let plan = plan_links(&result, &tas, &professors, &courses);

    assert_eq!(
        plan.links,
        vec![
            TaCourseLink { ta_id: 7, course_id: 30 },
            TaCourseLink { ta_id: 7, course_id: 31 },
        ]
    );
}
