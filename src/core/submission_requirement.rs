use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{
    input_descriptor::{GroupId, InputDescriptor},
    presentation_definition::PresentationError,
    presentation_submission::SubmissionValidationError,
};

/// Selection rule of a [SubmissionRequirement].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Rule {
    /// Every input descriptor of the group (or every nested requirement) must be submitted.
    All,
    /// A number of them, bounded by `count`, or `min` and `max`, must be submitted.
    Pick,
}

/// What a [SubmissionRequirement] selects from: the input descriptors of a group, or
/// a list of nested submission requirements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequirementSource {
    From(GroupId),
    FromNested(Vec<SubmissionRequirement>),
}

/// Submission Requirements are objects that define what combinations of inputs a
/// [Holder](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:holder) must submit.
///
/// A requirement carries exactly one of `from` and `from_nested`; a document carrying both,
/// or neither, is rejected with [PresentationError::ConflictingData].
///
/// See: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#submission-requirement-feature](https://identity.foundation/presentation-exchange/spec/v2.0.0/#submission-requirement-feature)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawSubmissionRequirement", into = "RawSubmissionRequirement")]
pub struct SubmissionRequirement {
    rule: Rule,
    count: Option<usize>,
    min: Option<usize>,
    max: Option<usize>,
    source: RequirementSource,
    name: Option<String>,
    purpose: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct RawSubmissionRequirement {
    rule: Rule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from: Option<GroupId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from_nested: Option<Vec<SubmissionRequirement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    purpose: Option<String>,
}

impl TryFrom<RawSubmissionRequirement> for SubmissionRequirement {
    type Error = PresentationError;

    fn try_from(raw: RawSubmissionRequirement) -> Result<Self, Self::Error> {
        let requirement = Self::new(raw.rule, raw.from, raw.from_nested)?;

        Ok(Self {
            count: raw.count,
            min: raw.min,
            max: raw.max,
            name: raw.name,
            purpose: raw.purpose,
            ..requirement
        })
    }
}

impl From<SubmissionRequirement> for RawSubmissionRequirement {
    fn from(requirement: SubmissionRequirement) -> Self {
        let (from, from_nested) = match requirement.source {
            RequirementSource::From(group) => (Some(group), None),
            RequirementSource::FromNested(nested) => (None, Some(nested)),
        };

        Self {
            rule: requirement.rule,
            count: requirement.count,
            min: requirement.min,
            max: requirement.max,
            from,
            from_nested,
            name: requirement.name,
            purpose: requirement.purpose,
        }
    }
}

impl SubmissionRequirement {
    /// Create a new submission requirement.
    ///
    /// Exactly one of `from` and `from_nested` must be provided.
    pub fn new(
        rule: Rule,
        from: Option<GroupId>,
        from_nested: Option<Vec<SubmissionRequirement>>,
    ) -> Result<Self, PresentationError> {
        let source = match (from, from_nested) {
            (Some(group), None) => RequirementSource::From(group),
            (None, Some(nested)) => RequirementSource::FromNested(nested),
            _ => return Err(PresentationError::ConflictingData),
        };

        Ok(Self {
            rule,
            count: None,
            min: None,
            max: None,
            source,
            name: None,
            purpose: None,
        })
    }

    /// Shorthand for a requirement selecting from a group of input descriptors.
    pub fn from_group(rule: Rule, group: impl Into<GroupId>) -> Self {
        Self {
            rule,
            count: None,
            min: None,
            max: None,
            source: RequirementSource::From(group.into()),
            name: None,
            purpose: None,
        }
    }

    /// Shorthand for a requirement selecting from nested requirements.
    pub fn from_nested(rule: Rule, nested: Vec<SubmissionRequirement>) -> Self {
        Self {
            rule,
            count: None,
            min: None,
            max: None,
            source: RequirementSource::FromNested(nested),
            name: None,
            purpose: None,
        }
    }

    pub fn set_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn set_min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    pub fn set_max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    pub fn set_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }

    pub fn count(&self) -> Option<usize> {
        self.count
    }

    pub fn min(&self) -> Option<usize> {
        self.min
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }

    pub fn source(&self) -> &RequirementSource {
        &self.source
    }

    pub fn name(&self) -> Option<&String> {
        self.name.as_ref()
    }

    pub fn purpose(&self) -> Option<&String> {
        self.purpose.as_ref()
    }

    /// Return every group referenced by this requirement, including nested requirements.
    pub fn all_groups(&self) -> HashSet<&GroupId> {
        match &self.source {
            RequirementSource::From(group) => HashSet::from([group]),
            RequirementSource::FromNested(nested) => {
                nested.iter().flat_map(|r| r.all_groups()).collect()
            }
        }
    }

    /// Return whether a selection satisfying this requirement can be built from the
    /// input descriptors listed in `satisfied`.
    ///
    /// With `from`, the units are the descriptors of the group; with `from_nested`,
    /// the units are the nested requirements, each decided by its own rule.
    pub fn is_satisfied_by(
        &self,
        descriptors: &[InputDescriptor],
        satisfied: &HashSet<&str>,
    ) -> bool {
        let (available, total) = match &self.source {
            RequirementSource::From(group) => {
                let members = group_members(descriptors, group);
                if members.is_empty() {
                    tracing::warn!("submission requirement group `{group}` selects no input descriptor");
                }
                let available = members
                    .iter()
                    .filter(|d| satisfied.contains(d.id().as_str()))
                    .count();
                (available, members.len())
            }
            RequirementSource::FromNested(nested) => {
                let available = nested
                    .iter()
                    .filter(|r| r.is_satisfied_by(descriptors, satisfied))
                    .count();
                (available, nested.len())
            }
        };

        let satisfiable = self.admits_selection_within(available, total);
        tracing::debug!(
            "submission requirement `{}`: {available} of {total} units available, satisfiable: {satisfiable}",
            self.label()
        );
        satisfiable
    }

    /// Return whether bounds admit any selection at all given the definition's descriptors,
    /// as if every unit could be submitted.
    pub fn is_possible(&self, descriptors: &[InputDescriptor]) -> bool {
        let total = self.unit_count(descriptors);
        let own = self.admits_selection_within(total, total);

        match &self.source {
            RequirementSource::From(_) => own,
            RequirementSource::FromNested(nested) => {
                own && nested.iter().all(|r| r.is_possible(descriptors))
            }
        }
    }

    /// Validate a final selection of input descriptors against this requirement,
    /// applying the bounds exactly.
    pub fn validate_selection(
        &self,
        descriptors: &[InputDescriptor],
        selected: &HashSet<&str>,
    ) -> Result<(), SubmissionValidationError> {
        let (found, total) = match &self.source {
            RequirementSource::From(group) => {
                let members = group_members(descriptors, group);
                let found = members
                    .iter()
                    .filter(|d| selected.contains(d.id().as_str()))
                    .count();
                (found, members.len())
            }
            RequirementSource::FromNested(nested) => {
                let mut found = 0;
                for requirement in nested {
                    match requirement.validate_selection(descriptors, selected) {
                        Ok(()) => found += 1,
                        Err(e) if self.rule == Rule::All => return Err(e),
                        Err(e) => tracing::debug!("nested requirement not satisfied: {e}"),
                    }
                }
                (found, nested.len())
            }
        };

        self.check_bounds(found, total)
    }

    fn unit_count(&self, descriptors: &[InputDescriptor]) -> usize {
        match &self.source {
            RequirementSource::From(group) => group_members(descriptors, group).len(),
            RequirementSource::FromNested(nested) => nested.len(),
        }
    }

    /// True if some selection of at most `available` out of `total` units meets the bounds.
    fn admits_selection_within(&self, available: usize, total: usize) -> bool {
        (0..=available.min(total))
            .rev()
            .any(|found| self.check_bounds(found, total).is_ok())
    }

    fn check_bounds(&self, found: usize, total: usize) -> Result<(), SubmissionValidationError> {
        let group = self.label();

        match self.rule {
            Rule::All if total == 0 => {
                Err(SubmissionValidationError::SelectionTooSmall { group, min: 1, found })
            }
            Rule::All if found != total => Err(SubmissionValidationError::SelectionSizeMismatch {
                group,
                expected: total,
                found,
            }),
            Rule::All => Ok(()),
            Rule::Pick => match self.count {
                Some(count) if found != count || count > total => {
                    Err(SubmissionValidationError::SelectionSizeMismatch {
                        group,
                        expected: count,
                        found,
                    })
                }
                Some(_) => Ok(()),
                None => {
                    let min = self.min.unwrap_or(0);
                    if found < min {
                        return Err(SubmissionValidationError::SelectionTooSmall {
                            group,
                            min,
                            found,
                        });
                    }
                    match self.max {
                        Some(max) if found > max => {
                            Err(SubmissionValidationError::SelectionTooLarge { group, max, found })
                        }
                        _ => Ok(()),
                    }
                }
            },
        }
    }

    fn label(&self) -> String {
        match (&self.name, &self.source) {
            (Some(name), _) => name.clone(),
            (None, RequirementSource::From(group)) => group.clone(),
            (None, RequirementSource::FromNested(_)) => "from_nested".to_owned(),
        }
    }
}

fn group_members<'a>(descriptors: &'a [InputDescriptor], group: &str) -> Vec<&'a InputDescriptor> {
    descriptors.iter().filter(|d| d.belongs_to(group)).collect()
}
