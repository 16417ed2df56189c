use std::collections::HashSet;

use super::credential_format::*;
use super::input_descriptor::*;
use super::submission_requirement::SubmissionRequirement;
use crate::utils::is_valid_json_path;

use serde::{Deserialize, Serialize};

/// Errors raised while building, decoding or validating a [PresentationDefinition].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PresentationError {
    /// A submission requirement must carry exactly one of `from` and `from_nested`.
    #[error("conflicting data: a submission requirement needs exactly one of `from` and `from_nested`")]
    ConflictingData,

    #[error("invalid claim format: {0}")]
    InvalidFormat(String),

    #[error("invalid presentation definition: {0}")]
    InvalidPresentationDefinition(String),

    /// Two input descriptors share the same id.
    #[error("duplicate input descriptor id `{0}`")]
    DuplicateInputDescriptor(InputDescriptorId),

    /// A submission requirement references a group no input descriptor belongs to.
    #[error("submission requirement references undefined group `{0}`")]
    UndefinedGroup(GroupId),

    /// A field path falls outside of the supported JSONPath grammar.
    #[error("unsupported field path `{0}`")]
    UnsupportedPath(JsonPath),
}

/// A presentation definition is a JSON object that describes the information a [Verifier](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:verifier) requires of a [Holder](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:holder).
///
/// > Presentation Definitions are objects that articulate what proofs a [Verifier](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:verifier) requires.
/// > These help the [Verifier](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:verifier) to decide how or whether to interact with a [Holder](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:holder).
///
/// Presentation Definitions are composed of inputs, which describe the forms and details of the
/// proofs they require, and optional sets of selection rules, to allow [Holder](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:holder)s flexibility
/// in cases where different types of proofs may satisfy an input requirement.
///
/// For more information, see: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#presentation-definition](https://identity.foundation/presentation-exchange/spec/v2.0.0/#presentation-definition)
#[derive(Clone, Default, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresentationDefinition {
    id: String,
    input_descriptors: Vec<InputDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    submission_requirements: Option<Vec<SubmissionRequirement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<FormatContainer>,
}

impl PresentationDefinition {
    /// The Presentation Definition MUST contain an id property. The value of this property MUST be a string.
    /// The string SHOULD provide a unique ID for the desired context.
    ///
    /// The Presentation Definition MUST contain an input_descriptors property. Its value MUST be an array of Input Descriptor Objects,
    /// the composition of which are found [InputDescriptor] type.
    pub fn new(id: impl Into<String>, input_descriptor: InputDescriptor) -> Self {
        Self {
            id: id.into(),
            input_descriptors: vec![input_descriptor],
            ..Default::default()
        }
    }

    /// Return the id of the presentation definition.
    pub fn id(&self) -> &String {
        &self.id
    }

    /// Add a new input descriptor to the presentation definition.
    pub fn add_input_descriptors(mut self, input_descriptor: InputDescriptor) -> Self {
        self.input_descriptors.push(input_descriptor);
        self
    }

    /// Return the input descriptors of the presentation definition.
    pub fn input_descriptors(&self) -> &[InputDescriptor] {
        &self.input_descriptors
    }

    /// Return the input descriptor with the given id, if any.
    pub fn input_descriptor(&self, id: &str) -> Option<&InputDescriptor> {
        self.input_descriptors.iter().find(|d| d.id() == id)
    }

    /// Set the name of the presentation definition.
    ///
    /// The [PresentationDefinition] MAY contain a name property. If present, its value SHOULD be a
    /// human-friendly string intended to constitute a distinctive designation of the Presentation Definition.
    pub fn set_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&String> {
        self.name.as_ref()
    }

    /// Set the purpose of the presentation definition.
    pub fn set_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn purpose(&self) -> Option<&String> {
        self.purpose.as_ref()
    }

    /// Attach a format to the presentation definition.
    ///
    /// The Presentation Definition MAY include a format property. If present,
    /// the value MUST be an object with one or more properties matching the
    /// registered Claim Format Designations (e.g., jwt, jwt_vc, jwt_vp, etc.).
    ///
    /// The properties inform the [Holder](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:holder) of the Claim format configurations the [Verifier](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:verifier) can process.
    /// Input descriptors carrying their own `format` override it.
    pub fn set_format(mut self, format: FormatContainer) -> Self {
        self.format = Some(format);
        self
    }

    /// Add a new format to the presentation definition.
    pub fn add_format(mut self, format: FormatDescriptor) -> Self {
        self.format = Some(self.format.take().unwrap_or_default().add_format(format));
        self
    }

    pub fn format(&self) -> Option<&FormatContainer> {
        self.format.as_ref()
    }

    /// Set the submission requirements of the presentation definition.
    ///
    /// See: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#submission-requirement-feature](https://identity.foundation/presentation-exchange/spec/v2.0.0/#submission-requirement-feature)
    pub fn set_submission_requirements(mut self, requirements: Vec<SubmissionRequirement>) -> Self {
        self.submission_requirements = Some(requirements);
        self
    }

    pub fn add_submission_requirement(mut self, requirement: SubmissionRequirement) -> Self {
        self.submission_requirements
            .get_or_insert_with(Vec::new)
            .push(requirement);
        self
    }

    /// Return the submission requirements, `None` when the property is absent.
    pub fn submission_requirements(&self) -> Option<&[SubmissionRequirement]> {
        self.submission_requirements.as_deref()
    }

    /// Check the structural consistency of the definition.
    ///
    /// Input descriptor ids must be unique, every group referenced by a submission
    /// requirement must have at least one member, and `pick` bounds must admit a selection.
    pub fn validate(&self) -> Result<(), PresentationError> {
        let mut ids = HashSet::new();
        for descriptor in &self.input_descriptors {
            if !ids.insert(descriptor.id()) {
                return Err(PresentationError::DuplicateInputDescriptor(
                    descriptor.id().clone(),
                ));
            }
        }

        for requirement in self.submission_requirements().unwrap_or_default() {
            for group in requirement.all_groups() {
                if !self.input_descriptors.iter().any(|d| d.belongs_to(group)) {
                    return Err(PresentationError::UndefinedGroup(group.clone()));
                }
            }

            if !requirement.is_possible(&self.input_descriptors) {
                return Err(PresentationError::InvalidPresentationDefinition(format!(
                    "submission requirement `{}` has bounds no selection can meet",
                    requirement
                        .name()
                        .map(String::as_str)
                        .unwrap_or("<unnamed>")
                )));
            }
        }

        Ok(())
    }

    /// Check every field path against the supported JSONPath grammar: dot child access,
    /// `[n]`, `[*]` and a single-level `[?(@field OP value)]` filter.
    pub fn validate_paths(&self) -> Result<(), PresentationError> {
        self.input_descriptors
            .iter()
            .flat_map(|d| d.constraints().fields())
            .flat_map(|field| field.path().iter())
            .find(|path| !is_valid_json_path(path))
            .map_or(Ok(()), |path| {
                Err(PresentationError::UnsupportedPath(path.clone()))
            })
    }
}

/// The envelope a presentation definition is usually exchanged in.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresentationDefinitionContainer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    presentation_definition: PresentationDefinition,
}

impl PresentationDefinitionContainer {
    pub fn new(presentation_definition: PresentationDefinition) -> Self {
        Self {
            comment: None,
            presentation_definition,
        }
    }

    pub fn set_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn comment(&self) -> Option<&String> {
        self.comment.as_ref()
    }

    pub fn presentation_definition(&self) -> &PresentationDefinition {
        &self.presentation_definition
    }

    pub fn into_presentation_definition(self) -> PresentationDefinition {
        self.presentation_definition
    }
}
