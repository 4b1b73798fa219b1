use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::WeightConfig;

/// Request to replace the stored weight coefficients
///
/// JSON has no representation for non-finite numbers, so a lower bound is the
/// only check needed here.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateWeightsRequest {
    #[validate(range(min = 0.0))]
    #[serde(alias = "taPref")]
    pub ta_pref: f64,
    #[validate(range(min = 0.0))]
    #[serde(alias = "profPref")]
    pub prof_pref: f64,
    #[validate(range(min = 0.0))]
    #[serde(alias = "coursePref", default)]
    pub course_pref: f64,
    #[validate(range(min = 0.0))]
    #[serde(alias = "workloadBalance")]
    pub workload_balance: f64,
}

impl From<UpdateWeightsRequest> for WeightConfig {
    fn from(req: UpdateWeightsRequest) -> Self {
        Self {
            ta_pref: req.ta_pref,
            prof_pref: req.prof_pref,
            course_pref: req.course_pref,
            workload_balance: req.workload_balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_camel_case_aliases() {
        let req: UpdateWeightsRequest = serde_json::from_str(
            r#"{"taPref": 0.5, "profPref": 0.3, "workloadBalance": 0.2}"#,
        )
        .unwrap();

        assert!(req.validate().is_ok());
        assert_eq!(req.course_pref, 0.0);
    }

    #[test]
    fn test_rejects_negative_weight() {
        let req = UpdateWeightsRequest {
            ta_pref: 0.5,
            prof_pref: -0.1,
            course_pref: 0.0,
            workload_balance: 0.2,
        };

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("prof_pref"));
    }
}
