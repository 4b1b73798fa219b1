// Core algorithm exports
pub mod matcher;
pub mod preference;
pub mod scoring;

pub use matcher::{Matcher, MatchError};
pub use preference::{rank_to_score, preference_rank, preference_score};
pub use scoring::{calculate_pair_score, PairScore};
