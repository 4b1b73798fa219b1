/// Normalize a zero-based preference rank into a score in [0, 1]
///
/// `score = (max_rank - rank) / max_rank`, so the first entry of a list of
/// length `max_rank` scores 1.0 and a rank equal to `max_rank` (the "absent"
/// position) scores 0.0. An empty list (`max_rank == 0`) scores 0.0 instead of
/// dividing by zero.
#[inline]
pub fn rank_to_score(rank: usize, max_rank: usize) -> f64 {
    if max_rank == 0 {
        return 0.0;
    }

    let rank = rank.min(max_rank);
    (max_rank - rank) as f64 / max_rank as f64
}

/// Zero-based position of `candidate` in an ordered preference list
///
/// Absent candidates rank at `preferences.len()`, i.e. least preferred.
#[inline]
pub fn preference_rank<S: AsRef<str>>(preferences: &[S], candidate: &str) -> usize {
    preferences
        .iter()
        .position(|name| name.as_ref() == candidate)
        .unwrap_or(preferences.len())
}

/// Score `candidate` against an ordered preference list
#[inline]
pub fn preference_score<S: AsRef<str>>(preferences: &[S], candidate: &str) -> f64 {
    rank_to_score(preference_rank(preferences, candidate), preferences.len())
}
