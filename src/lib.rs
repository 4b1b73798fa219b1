//! TA Assign - preference-weighted teaching-assistant assignment service
//!
//! This library provides the assignment engine: every TA-professor pair is
//! scored from both sides' ranked preferences plus a workload-balance term,
//! then a single greedy pass fills capacity-bounded slots on both sides.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Matcher, MatchError, rank_to_score, calculate_pair_score};
pub use crate::models::{TeachingAssistant, Professor, WeightConfig, AssignmentResult, RunSnapshot};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        assert_eq!(rank_to_score(0, 2), 1.0);
        assert!(Matcher::default().assign(&[], &[]).unwrap().is_empty());
    }
}
