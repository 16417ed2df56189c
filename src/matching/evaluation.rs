use core::fmt;
use std::collections::HashMap;

use serde_json::Value;

use crate::core::{
    claim::ClaimId,
    input_descriptor::{ConstraintsField, InputDescriptorId, JsonPath},
};

/// Per claim results: claim id, then input descriptor id.
pub type ClaimsEvaluation = HashMap<ClaimId, HashMap<InputDescriptorId, InputDescriptorEvaluation>>;

/// Per descriptor results: input descriptor id, then claim id.
pub type InputDescriptorEvaluationPerClaim =
    HashMap<InputDescriptorId, HashMap<ClaimId, InputDescriptorEvaluation>>;

/// Outcome of matching one constraint field against one claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateField {
    /// No path yielded an acceptable value and the field is required.
    RequiredFieldNotFound,
    /// No path yielded an acceptable value but the field is optional.
    OptionalFieldNotFound,
    /// `path` yielded `value`, which passed the filter.
    Found { path: JsonPath, value: Value },
    /// The field asks for the predicate result instead of the value. `result` is false when
    /// `path` yielded string values but none passed the filter.
    PredicateEvaluated { path: JsonPath, result: bool },
}

impl CandidateField {
    pub fn is_required_field_not_found(&self) -> bool {
        matches!(self, Self::RequiredFieldNotFound)
    }

    pub fn is_failed_predicate(&self) -> bool {
        matches!(self, Self::PredicateEvaluated { result: false, .. })
    }

    /// Return the path that satisfied the field, if any.
    pub fn path(&self) -> Option<&JsonPath> {
        match self {
            Self::Found { path, .. } | Self::PredicateEvaluated { path, .. } => Some(path),
            Self::RequiredFieldNotFound | Self::OptionalFieldNotFound => None,
        }
    }
}

impl fmt::Display for CandidateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequiredFieldNotFound => f.write_str("required not present"),
            Self::OptionalFieldNotFound => f.write_str("not present but was optional"),
            Self::Found { path, value } => write!(f, "in path {path} with content {value}"),
            Self::PredicateEvaluated { path, result } => {
                write!(f, "in path {path} predicated evaluated to {result}")
            }
        }
    }
}

/// Outcome of evaluating one input descriptor against one claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputDescriptorEvaluation {
    /// Every required field was found. `matches` holds the outcome of every field,
    /// including optional fields that were not found.
    CandidateClaim {
        matches: HashMap<ConstraintsField, CandidateField>,
    },
    /// Reserved for a coarser "claim is irrelevant" classification; never produced by
    /// the matcher.
    NotMatchingClaim,
    /// At least one required field was not found.
    NotMatchedFieldConstraints,
    /// The claim format is not accepted by the descriptor or the definition.
    UnsupportedFormat,
}

impl InputDescriptorEvaluation {
    pub fn is_candidate(&self) -> bool {
        matches!(self, Self::CandidateClaim { .. })
    }
}

impl fmt::Display for InputDescriptorEvaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CandidateClaim { matches } => {
                f.write_str("Matched")?;
                for (i, candidate) in matches.values().enumerate() {
                    write!(f, "\nField no:{i} was matched {candidate}")?;
                }
                Ok(())
            }
            Self::NotMatchingClaim => f.write_str("Not matched"),
            Self::NotMatchedFieldConstraints => f.write_str("Not matched field constraints"),
            Self::UnsupportedFormat => f.write_str("Unsupported format"),
        }
    }
}

/// Final decision of a matching call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match {
    /// The claims satisfy the definition. `matches` lists, per input descriptor, the
    /// claims that are candidates for it.
    Matched {
        matches: InputDescriptorEvaluationPerClaim,
    },
    /// The claims do not satisfy the definition. `details` lists, per input descriptor,
    /// the claims that failed its field constraints.
    NotMatched {
        details: InputDescriptorEvaluationPerClaim,
    },
}

impl Match {
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    /// Return the candidates per descriptor, if matched.
    pub fn matches(&self) -> Option<&InputDescriptorEvaluationPerClaim> {
        match self {
            Self::Matched { matches } => Some(matches),
            Self::NotMatched { .. } => None,
        }
    }

    /// Return the failures per descriptor, if not matched.
    pub fn details(&self) -> Option<&InputDescriptorEvaluationPerClaim> {
        match self {
            Self::Matched { .. } => None,
            Self::NotMatched { details } => Some(details),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn candidate_field_display() {
        assert_eq!(
            CandidateField::RequiredFieldNotFound.to_string(),
            "required not present"
        );
        assert_eq!(
            CandidateField::OptionalFieldNotFound.to_string(),
            "not present but was optional"
        );
        assert_eq!(
            CandidateField::Found {
                path: "$.a".into(),
                value: json!("x")
            }
            .to_string(),
            r#"in path $.a with content "x""#
        );
        assert_eq!(
            CandidateField::PredicateEvaluated {
                path: "$.b".into(),
                result: true
            }
            .to_string(),
            "in path $.b predicated evaluated to true"
        );
    }

    #[test]
    fn evaluation_display() {
        assert_eq!(
            InputDescriptorEvaluation::NotMatchedFieldConstraints.to_string(),
            "Not matched field constraints"
        );
        assert_eq!(
            InputDescriptorEvaluation::UnsupportedFormat.to_string(),
            "Unsupported format"
        );
        assert_eq!(InputDescriptorEvaluation::NotMatchingClaim.to_string(), "Not matched");

        let matches = HashMap::from([(
            ConstraintsField::new("$.a"),
            CandidateField::OptionalFieldNotFound,
        )]);
        assert_eq!(
            InputDescriptorEvaluation::CandidateClaim { matches }.to_string(),
            "Matched\nField no:0 was matched not present but was optional"
        );
    }
}
