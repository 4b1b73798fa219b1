use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::models::{TeachingAssistant, Professor, WeightConfig, AssignmentResult};
use crate::core::scoring::calculate_pair_score;

/// Errors that abort an assignment run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("Cannot compute average workload: {professors} professor(s) but no teaching assistants")]
    NoTeachingAssistants { professors: usize },
}

/// Scored TA-professor candidate, indices into the deduplicated snapshot
#[derive(Debug, Clone, Copy)]
struct CandidatePair {
    ta: usize,
    prof: usize,
    score: f64,
}

/// Greedy capacitated matcher
///
/// # Pipeline Stages
/// 1. Enumerate every TA-professor pair
/// 2. Score each pair against a single workload snapshot
/// 3. Rank pairs by score, descending
/// 4. Walk the ranking once, assigning while both sides have capacity
///
/// This is a single greedy pass, not an optimal assignment. The average
/// workload used for balancing is computed once per run and is not updated as
/// assignments accumulate.
///
/// Equal scores are ordered by professor name, then TA name (both ascending),
/// so runs over the same snapshot always produce the same result.
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: WeightConfig,
}

impl Matcher {
    pub fn new(weights: WeightConfig) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: WeightConfig::default(),
        }
    }

    pub fn weights(&self) -> &WeightConfig {
        &self.weights
    }

    /// Assign TAs to professors starting from zero workload
    pub fn assign(
        &self,
        tas: &[TeachingAssistant],
        professors: &[Professor],
    ) -> Result<AssignmentResult, MatchError> {
        self.assign_with_workloads(tas, professors, &HashMap::new())
    }

    /// Assign TAs to professors starting from already-consumed workload units
    ///
    /// # Arguments
    /// * `tas` - TA snapshot; duplicate names after the first are dropped
    /// * `professors` - Professor snapshot; duplicate names after the first are dropped
    /// * `current` - Units already consumed per TA name. They are the workload
    ///   snapshot used for scoring and count toward `max_hours`. Unknown names
    ///   are ignored.
    ///
    /// # Returns
    /// Every professor mapped to its assigned TAs (possibly none) and every TA
    /// mapped to its workload. Both maps are empty when there are no
    /// professors.
    ///
    /// # Errors
    /// [`MatchError::NoTeachingAssistants`] when professors exist but TAs do
    /// not, since the average workload is undefined.
    pub fn assign_with_workloads(
        &self,
        tas: &[TeachingAssistant],
        professors: &[Professor],
        current: &HashMap<String, u32>,
    ) -> Result<AssignmentResult, MatchError> {
        let tas = dedupe_by_name(tas, |ta| ta.name.as_str(), "teaching assistant");
        let professors = dedupe_by_name(professors, |prof| prof.name.as_str(), "professor");

        if professors.is_empty() {
            tracing::debug!("No professors in snapshot, nothing to assign");
            return Ok(AssignmentResult::default());
        }

        if tas.is_empty() {
            return Err(MatchError::NoTeachingAssistants {
                professors: professors.len(),
            });
        }

        let total_slots: u64 = professors.iter().map(|prof| u64::from(prof.capacity)).sum();
        let avg_workload = total_slots as f64 / tas.len() as f64;

        for name in current.keys() {
            if !tas.iter().any(|ta| &ta.name == name) {
                tracing::debug!("Ignoring workload for unknown teaching assistant: {}", name);
            }
        }

        let mut workloads: Vec<u32> = tas
            .iter()
            .map(|ta| current.get(&ta.name).copied().unwrap_or(0))
            .collect();

        // Stage 1 & 2: enumerate and score against the pre-assignment snapshot
        let mut pairs: Vec<CandidatePair> = Vec::with_capacity(tas.len() * professors.len());
        for (ta_idx, ta) in tas.iter().enumerate() {
            for (prof_idx, prof) in professors.iter().enumerate() {
                let score = calculate_pair_score(
                    ta,
                    prof,
                    workloads[ta_idx],
                    avg_workload,
                    &self.weights,
                );

                pairs.push(CandidatePair {
                    ta: ta_idx,
                    prof: prof_idx,
                    score: score.total,
                });
            }
        }

        // Stage 3: rank by score (descending), then professor and TA name
        pairs.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| professors[a.prof].name.cmp(&professors[b.prof].name))
                .then_with(|| tas[a.ta].name.cmp(&tas[b.ta].name))
        });

        // Stage 4: single greedy pass
        let mut slots: Vec<Vec<usize>> = vec![Vec::new(); professors.len()];
        for pair in &pairs {
            let prof = professors[pair.prof];
            let ta = tas[pair.ta];

            if slots[pair.prof].len() < prof.capacity as usize
                && workloads[pair.ta] < ta.max_hours
            {
                slots[pair.prof].push(pair.ta);
                workloads[pair.ta] += 1;
            }
        }

        let result = AssignmentResult {
            assignments: professors
                .iter()
                .zip(&slots)
                .map(|(prof, assigned)| {
                    let names = assigned.iter().map(|&idx| tas[idx].name.clone()).collect();
                    (prof.name.clone(), names)
                })
                .collect(),
            workloads: tas
                .iter()
                .zip(&workloads)
                .map(|(ta, &units)| (ta.name.clone(), units))
                .collect(),
        };

        tracing::debug!(
            "Scored {} pairs (avg workload {:.3}), made {} assignments",
            pairs.len(),
            avg_workload,
            result.total_assigned()
        );

        Ok(result)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Keep the first entity for each name, preserving input order
fn dedupe_by_name<'a, T>(
    items: &'a [T],
    name_of: impl Fn(&T) -> &str,
    kind: &str,
) -> Vec<&'a T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .iter()
        .filter(|item| {
            let name = name_of(*item);
            let first = seen.insert(name.to_string());
            if !first {
                tracing::warn!("Dropping duplicate {} name: {}", kind, name);
            }
            first
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preference_weights() -> WeightConfig {
        WeightConfig {
            ta_pref: 0.5,
            prof_pref: 0.5,
            course_pref: 0.0,
            workload_balance: 0.0,
        }
    }

    #[test]
    fn test_mutual_top_preferences_matched() {
        let matcher = Matcher::new(preference_weights());
        let tas = vec![
            TeachingAssistant::new(1, "A", 1).prefers(["X"]),
            TeachingAssistant::new(2, "B", 1).prefers(["Y"]),
        ];
        let professors = vec![
            Professor::new(1, "X", 1).prefers(["A"]),
            Professor::new(2, "Y", 1).prefers(["B"]),
        ];

        let result = matcher.assign(&tas, &professors).unwrap();

        assert_eq!(result.assignments["X"], vec!["A"]);
        assert_eq!(result.assignments["Y"], vec!["B"]);
        assert_eq!(result.workloads["A"], 1);
        assert_eq!(result.workloads["B"], 1);
    }

    #[test]
    fn test_no_professors_yields_empty_result() {
        let matcher = Matcher::with_default_weights();
        let tas = vec![TeachingAssistant::new(1, "A", 2)];

        let result = matcher.assign(&tas, &[]).unwrap();

        assert!(result.is_empty());
    }

    #[test]
    fn test_both_empty_is_noop() {
        let matcher = Matcher::with_default_weights();

        let result = matcher.assign(&[], &[]).unwrap();

        assert!(result.is_empty());
    }

    #[test]
    fn test_no_tas_is_fatal() {
        let matcher = Matcher::with_default_weights();
        let professors = vec![Professor::new(1, "X", 2)];

        let err = matcher.assign(&[], &professors).unwrap_err();

        assert_eq!(err, MatchError::NoTeachingAssistants { professors: 1 });
    }

    #[test]
    fn test_ties_broken_by_professor_then_ta_name() {
        // Nobody prefers anybody: every pair scores the same
        let matcher = Matcher::new(preference_weights());
        let tas = vec![
            TeachingAssistant::new(1, "Zed", 1),
            TeachingAssistant::new(2, "Amy", 1),
        ];
        let professors = vec![
            Professor::new(1, "Young", 1),
            Professor::new(2, "Adams", 1),
        ];

        let result = matcher.assign(&tas, &professors).unwrap();

        assert_eq!(result.assignments["Adams"], vec!["Amy"]);
        assert_eq!(result.assignments["Young"], vec!["Zed"]);
    }

    #[test]
    fn test_unassigned_entities_still_reported() {
        let matcher = Matcher::new(preference_weights());
        let tas = vec![
            TeachingAssistant::new(1, "A", 1).prefers(["X"]),
            TeachingAssistant::new(2, "B", 1).prefers(["X"]),
        ];
        let professors = vec![
            Professor::new(1, "X", 1).prefers(["A"]),
            Professor::new(2, "Y", 0),
        ];

        let result = matcher.assign(&tas, &professors).unwrap();

        assert_eq!(result.assignments["X"], vec!["A"]);
        assert!(result.assignments["Y"].is_empty());
        assert_eq!(result.workloads["B"], 0);
    }

    #[test]
    fn test_seeded_workload_counts_toward_max_hours() {
        let matcher = Matcher::new(preference_weights());
        let tas = vec![
            TeachingAssistant::new(1, "A", 1).prefers(["X"]),
            TeachingAssistant::new(2, "B", 1),
        ];
        let professors = vec![Professor::new(1, "X", 1).prefers(["A"])];
        let current = HashMap::from([("A".to_string(), 1)]);

        let result = matcher.assign_with_workloads(&tas, &professors, &current).unwrap();

        assert_eq!(result.assignments["X"], vec!["B"]);
        assert_eq!(result.workloads["A"], 1);
        assert_eq!(result.workloads["B"], 1);
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let matcher = Matcher::new(preference_weights());
        let tas = vec![
            TeachingAssistant::new(1, "A", 1),
            TeachingAssistant::new(2, "A", 5),
        ];
        let professors = vec![Professor::new(1, "X", 3)];

        let result = matcher.assign(&tas, &professors).unwrap();

        // Only the first "A" (max_hours = 1) is considered
        assert_eq!(result.assignments["X"], vec!["A"]);
        assert_eq!(result.workloads.len(), 1);
    }

    #[test]
    fn test_infinite_weight_still_ranks_deterministically() {
        // inf * 0 makes some totals NaN; the ranking must stay a total order
        let matcher = Matcher::new(WeightConfig {
            ta_pref: f64::INFINITY,
            ..WeightConfig::default()
        });
        let tas = vec![
            TeachingAssistant::new(1, "A", 1).prefers(["X"]),
            TeachingAssistant::new(2, "B", 1),
            TeachingAssistant::new(3, "C", 1).prefers(["Y", "X"]),
        ];
        let professors = vec![
            Professor::new(1, "X", 1).prefers(["B"]),
            Professor::new(2, "Y", 1),
        ];

        let forward = matcher.assign(&tas, &professors).unwrap();

        let mut reversed_tas = tas.clone();
        reversed_tas.reverse();
        let mut reversed_profs = professors.clone();
        reversed_profs.reverse();
        let backward = matcher.assign(&reversed_tas, &reversed_profs).unwrap();

        assert_eq!(forward, backward);
        assert_eq!(forward.total_assigned(), 2);
        assert_eq!(forward.assignments["X"].len(), 1);
        assert_eq!(forward.assignments["Y"].len(), 1);
    }
}
