use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Teaching assistant as seen by one assignment run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeachingAssistant {
    pub id: i32,
    pub name: String,
    /// Professor names, most preferred first
    #[serde(rename = "preferredProfessors", default)]
    pub preferred_professors: Vec<String>,
    #[serde(rename = "maxHours")]
    pub max_hours: u32,
}

impl TeachingAssistant {
    pub fn new(id: i32, name: impl Into<String>, max_hours: u32) -> Self {
        Self {
            id,
            name: name.into(),
            preferred_professors: Vec::new(),
            max_hours,
        }
    }

    /// Builder-style helper to set the ordered professor preferences
    pub fn prefers<I, S>(mut self, professors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_professors = professors.into_iter().map(Into::into).collect();
        self
    }
}

/// Professor offering a fixed number of TA slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Professor {
    pub id: i32,
    pub name: String,
    /// TA names, most preferred first
    #[serde(rename = "preferredTas", default)]
    pub preferred_tas: Vec<String>,
    pub capacity: u32,
}

impl Professor {
    pub fn new(id: i32, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            preferred_tas: Vec::new(),
            capacity,
        }
    }

    /// Builder-style helper to set the ordered TA preferences
    pub fn prefers<I, S>(mut self, tas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_tas = tas.into_iter().map(Into::into).collect();
        self
    }
}

/// Weight coefficients for pair scoring
///
/// `course_pref` is stored and round-tripped but not consumed by the scoring
/// formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    pub ta_pref: f64,
    pub prof_pref: f64,
    pub course_pref: f64,
    pub workload_balance: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            ta_pref: 0.4,
            prof_pref: 0.4,
            course_pref: 0.0,
            workload_balance: 0.2,
        }
    }
}

impl WeightConfig {
    /// True when every coefficient is finite and non-negative
    pub fn is_usable(&self) -> bool {
        [self.ta_pref, self.prof_pref, self.course_pref, self.workload_balance]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0)
    }
}

/// Output of one matching run
///
/// `assignments` maps professor name to the TA names assigned to them, in the
/// order they were assigned. `workloads` maps TA name to consumed units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentResult {
    pub assignments: BTreeMap<String, Vec<String>>,
    pub workloads: BTreeMap<String, u32>,
}

impl AssignmentResult {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty() && self.workloads.is_empty()
    }

    /// Total number of TA-professor assignments made
    pub fn total_assigned(&self) -> usize {
        self.assignments.values().map(Vec::len).sum()
    }
}

/// Immutable input of one assignment run, loaded once from storage
#[derive(Debug, Clone, Default)]
pub struct RunSnapshot {
    pub tas: Vec<TeachingAssistant>,
    pub professors: Vec<Professor>,
    pub weights: WeightConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_are_usable() {
        assert!(WeightConfig::default().is_usable());
    }

    #[test]
    fn test_non_finite_or_negative_weights_are_not_usable() {
        let nan = WeightConfig { prof_pref: f64::NAN, ..WeightConfig::default() };
        let inf = WeightConfig { ta_pref: f64::INFINITY, ..WeightConfig::default() };
        let negative = WeightConfig { workload_balance: -0.1, ..WeightConfig::default() };

        assert!(!nan.is_usable());
        assert!(!inf.is_usable());
        assert!(!negative.is_usable());
    }
}
