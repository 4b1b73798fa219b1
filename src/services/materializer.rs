use std::collections::{BTreeSet, HashMap};

use crate::models::{AssignmentResult, Professor, TeachingAssistant};

/// One persisted TA-course link
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaCourseLink {
    pub ta_id: i32,
    pub course_id: i32,
}

/// Links to write for one run, plus what had to be skipped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterializationPlan {
    pub links: Vec<TaCourseLink>,
    pub skipped_professors: Vec<String>,
    pub skipped_tas: Vec<String>,
}

/// Fan professor-scoped assignments out into TA-course links
///
/// Names resolve to ids through the same snapshot the matcher ran on. Each TA
/// assigned to a professor gets one link per course that professor teaches.
/// Unknown professors, professors teaching nothing and unknown TAs are skipped
/// and reported; none of them fail the plan.
pub fn plan_links(
    result: &AssignmentResult,
    tas: &[TeachingAssistant],
    professors: &[Professor],
    courses_by_professor: &HashMap<i32, Vec<i32>>,
) -> MaterializationPlan {
    let ta_ids: HashMap<&str, i32> = tas.iter().map(|ta| (ta.name.as_str(), ta.id)).collect();
    let prof_ids: HashMap<&str, i32> = professors
        .iter()
        .map(|prof| (prof.name.as_str(), prof.id))
        .collect();

    let mut links = BTreeSet::new();
    let mut plan = MaterializationPlan::default();

    for (prof_name, ta_names) in &result.assignments {
        if ta_names.is_empty() {
            continue;
        }

        let Some(prof_id) = prof_ids.get(prof_name.as_str()) else {
            tracing::warn!("Professor '{}' not found in snapshot, skipping", prof_name);
            plan.skipped_professors.push(prof_name.clone());
            continue;
        };

        let courses = match courses_by_professor.get(prof_id) {
            Some(courses) if !courses.is_empty() => courses,
            _ => {
                tracing::warn!("Professor '{}' has no courses, skipping", prof_name);
                plan.skipped_professors.push(prof_name.clone());
                continue;
            }
        };

        for ta_name in ta_names {
            let Some(&ta_id) = ta_ids.get(ta_name.as_str()) else {
                tracing::warn!("TA '{}' not found in snapshot, skipping", ta_name);
                plan.skipped_tas.push(ta_name.clone());
                continue;
            };

            for &course_id in courses {
                links.insert(TaCourseLink { ta_id, course_id });
            }
        }
    }

    plan.links = links.into_iter().collect();
    plan
}
