use crate::models::{TeachingAssistant, Professor, WeightConfig};
use crate::core::preference::preference_score;

/// Per-component breakdown of a pair score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairScore {
    pub ta_score: f64,
    pub prof_score: f64,
    pub workload_score: f64,
    pub total: f64,
}

/// Calculate the weighted score of assigning `ta` to `prof`
///
/// Scoring formula:
/// total = (
///     ta_score * ta_pref +                   # prof's position in the TA's list
///     prof_score * prof_pref +               # TA's position in the prof's list
///     workload_score * workload_balance      # TA's load close to the average
/// )
///
/// `course_pref` is not part of the formula. Pure function of its inputs.
pub fn calculate_pair_score(
    ta: &TeachingAssistant,
    prof: &Professor,
    current_workload: u32,
    avg_workload: f64,
    weights: &WeightConfig,
) -> PairScore {
    let ta_score = preference_score(&ta.preferred_professors, &prof.name);
    let prof_score = preference_score(&prof.preferred_tas, &ta.name);
    let workload_score = calculate_workload_score(current_workload, avg_workload, ta.max_hours);

    let total = weights.ta_pref * ta_score
        + weights.prof_pref * prof_score
        + weights.workload_balance * workload_score;

    PairScore {
        ta_score,
        prof_score,
        workload_score,
        total,
    }
}

/// Calculate workload balance score (0-1)
/// TAs whose load sits near the global average score higher, clipped at zero
#[inline]
fn calculate_workload_score(current_workload: u32, avg_workload: f64, max_hours: u32) -> f64 {
    let deviation = (current_workload as f64 - avg_workload).abs();
    let max_hours = max_hours.max(1) as f64;

    (1.0 - deviation / max_hours).max(0.0)
}
