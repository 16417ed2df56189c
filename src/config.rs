use serde::{Deserialize, Serialize};

use crate::utils::DEFAULT_DATE_FORMAT;

/// Matching configuration.
///
/// Every key is optional when deserialized, e.g. `{ "submission_requirements": "reject" }`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// How definitions carrying `submission_requirements` are decided.
    pub submission_requirements: SubmissionRequirementsMode,
    /// `chrono` layout used by `"format": "date"` field filters.
    pub date_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            submission_requirements: SubmissionRequirementsMode::default(),
            date_format: DEFAULT_DATE_FORMAT.to_owned(),
        }
    }
}

impl Config {
    pub fn set_submission_requirements(mut self, mode: SubmissionRequirementsMode) -> Self {
        self.submission_requirements = mode;
        self
    }

    pub fn set_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionRequirementsMode {
    /// Decide group selection with the `all`/`pick` rules.
    #[default]
    Evaluate,
    /// Never match a definition that carries submission requirements.
    Reject,
}
