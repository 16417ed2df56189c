use std::collections::HashSet;

use super::{
    credential_format::*,
    input_descriptor::*,
    presentation_definition::PresentationDefinition,
};
use serde::{Deserialize, Serialize};

/// A DescriptorMapId is a unique identifier for a DescriptorMap.
pub type DescriptorMapId = String;

/// Presentation Submissions are objects embedded within target
/// [Claim](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:claim) negotiation
/// formats that express how the inputs presented as proofs to a
/// [Verifier](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:verifier) are
/// provided in accordance with the requirements specified in a [PresentationDefinition].
///
/// Embedded Presentation Submission objects MUST be located within target data format as
/// the value of a `presentation_submission` property, see [PresentationSubmissionContainer].
///
/// For more information, see: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#presentation-submission](https://identity.foundation/presentation-exchange/spec/v2.0.0/#presentation-submission)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresentationSubmission {
    id: String,
    definition_id: String,
    descriptor_map: Vec<DescriptorMap>,
}

impl PresentationSubmission {
    /// Create a presentation submission identified by a fresh v4 UUID.
    ///
    /// The presentation submission object MUST contain a `definition_id` property.
    /// The value of this property MUST be the id value of a valid [PresentationDefinition::id()].
    ///
    /// The object MUST include a `descriptor_map` property. The value of this property MUST be an array of
    /// Input [DescriptorMap] Objects.
    pub fn new(definition_id: impl Into<String>, descriptor_map: Vec<DescriptorMap>) -> Self {
        Self::with_id(
            uuid::Uuid::new_v4().to_string(),
            definition_id,
            descriptor_map,
        )
    }

    pub fn with_id(
        id: impl Into<String>,
        definition_id: impl Into<String>,
        descriptor_map: Vec<DescriptorMap>,
    ) -> Self {
        Self {
            id: id.into(),
            definition_id: definition_id.into(),
            descriptor_map,
        }
    }

    /// Return the id of the presentation submission.
    pub fn id(&self) -> &String {
        &self.id
    }

    /// Return the definition id of the presentation submission.
    pub fn definition_id(&self) -> &String {
        &self.definition_id
    }

    /// Return the descriptor map of the presentation submission.
    pub fn descriptor_map(&self) -> &[DescriptorMap] {
        &self.descriptor_map
    }

    /// Validate the submission against the presentation `definition` it answers.
    ///
    /// Each descriptor map entry must reference an input descriptor of the definition, in
    /// a format that descriptor accepts. The submitted descriptors must then meet every
    /// submission requirement or, when the definition has none (or an empty list), cover
    /// every input descriptor.
    pub fn validate(&self, definition: &PresentationDefinition) -> Result<(), SubmissionError> {
        if self.definition_id != *definition.id() {
            return Err(SubmissionError::DefinitionMismatch {
                expected: definition.id().clone(),
                found: self.definition_id.clone(),
            });
        }

        for entry in &self.descriptor_map {
            entry.validate(definition)?;
        }

        let selected: HashSet<&str> = self
            .descriptor_map
            .iter()
            .map(|entry| entry.id.as_str())
            .collect();

        match definition.submission_requirements() {
            Some(requirements) if !requirements.is_empty() => {
                for requirement in requirements {
                    requirement.validate_selection(definition.input_descriptors(), &selected)?;
                }
            }
            _ => {
                // By default each input descriptor must have an associated entry.
                if let Some(missing) = definition
                    .input_descriptors()
                    .iter()
                    .find(|d| !selected.contains(d.id().as_str()))
                {
                    return Err(SubmissionValidationError::MissingRequiredInput(
                        missing.id().clone(),
                    )
                    .into());
                }
            }
        }

        Ok(())
    }
}

/// The envelope a presentation submission is embedded in.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresentationSubmissionContainer {
    presentation_submission: PresentationSubmission,
}

impl PresentationSubmissionContainer {
    pub fn new(presentation_submission: PresentationSubmission) -> Self {
        Self {
            presentation_submission,
        }
    }

    pub fn presentation_submission(&self) -> &PresentationSubmission {
        &self.presentation_submission
    }

    pub fn into_presentation_submission(self) -> PresentationSubmission {
        self.presentation_submission
    }
}

/// Descriptor Maps are objects used to describe the information a [Holder](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:holder) provides to a [Verifier](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:verifier).
///
/// For more information, see: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#presentation-submission](https://identity.foundation/presentation-exchange/spec/v2.0.0/#presentation-submission)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DescriptorMap {
    pub id: DescriptorMapId,
    pub format: ClaimFormatDesignation,
    pub path: JsonPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_nested: Option<Box<DescriptorMap>>,
}

impl DescriptorMap {
    /// The descriptor map MUST include an `id` property matching the `id` of an [InputDescriptor]
    /// of the related [PresentationDefinition], a `format` property naming the
    /// [ClaimFormatDesignation] of the submitted claim, and a `path` property locating the claim
    /// within the object the [PresentationSubmission] is embedded in.
    ///
    /// For more information, see: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#presentation-submission](https://identity.foundation/presentation-exchange/spec/v2.0.0/#presentation-submission)
    pub fn new(
        id: impl Into<DescriptorMapId>,
        format: impl Into<ClaimFormatDesignation>,
        path: impl Into<JsonPath>,
    ) -> Self {
        Self {
            id: id.into(),
            format: format.into(),
            path: path.into(),
            path_nested: None,
        }
    }

    /// Set the nested path of the descriptor map.
    ///
    /// The format of a path_nested object mirrors that of a [DescriptorMap] property. The nesting may be any number of levels deep.
    /// The `id` property MUST be the same for each level of nesting.
    ///
    /// See: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#processing-of-submission-entries](https://identity.foundation/presentation-exchange/spec/v2.0.0/#processing-of-submission-entries)
    pub fn set_path_nested(mut self, mut path_nested: DescriptorMap) -> Self {
        // Ensure the nested path has the same id as the parent.
        path_nested.id.clone_from(&self.id);

        self.path_nested = Some(Box::new(path_nested));

        self
    }

    fn validate(&self, definition: &PresentationDefinition) -> Result<(), SubmissionError> {
        let descriptor = definition
            .input_descriptor(&self.id)
            .ok_or_else(|| SubmissionError::UndefinedInputDescriptor(self.id.clone()))?;

        if !descriptor.accepts_format(definition.format(), &self.format) {
            return Err(SubmissionError::FormatMismatch(self.format.clone()));
        }

        Ok(())
    }
}

/// Presentation submission error.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// The submission answers another presentation definition.
    #[error("definition id mismatch: expected `{expected}`, found `{found}`")]
    DefinitionMismatch { expected: String, found: String },

    /// Submission contains inputs that are not defined in the presentation
    /// definition.
    #[error("undefined input descriptor: {0}")]
    UndefinedInputDescriptor(String),

    /// Input format does not match the format expected by the presentation
    /// definition.
    #[error("format mismatch: unexpected format {0}")]
    FormatMismatch(ClaimFormatDesignation),

    /// Input validation failed.
    #[error("presentation submission validation failed: {0}")]
    Validation(#[from] SubmissionValidationError),
}

/// Presentation submission inputs validation error.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionValidationError {
    /// Missing an input required by the presentation definition.
    #[error("missing required input `{0}`")]
    MissingRequiredInput(String),

    /// Input group selection is too small.
    #[error("not enough inputs for group `{group}` (expected at least {min}, found {found})")]
    SelectionTooSmall {
        group: GroupId,
        min: usize,
        found: usize,
    },

    /// Input group selection is too large.
    #[error("too many inputs for group `{group}` (expected at most {max}, found {found})")]
    SelectionTooLarge {
        group: GroupId,
        max: usize,
        found: usize,
    },

    /// Input group selection is of the wrong size.
    #[error("invalid number of inputs for group `{group}` (expected {expected}, found {found})")]
    SelectionSizeMismatch {
        group: GroupId,
        expected: usize,
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::submission_requirement::{Rule, SubmissionRequirement};
    use serde_json::json;

    fn definition() -> PresentationDefinition {
        serde_json::from_value(json!({
            "id": "32f54163-7166-48f1-93d8-ff217bdb0653",
            "format": { "jwt_vc": {}, "ldp_vc": {} },
            "input_descriptors": [
                { "id": "banking_input_1", "group": ["A"], "constraints": {} },
                { "id": "banking_input_2", "group": ["A"], "constraints": {} },
                {
                    "id": "citizenship_input",
                    "format": { "mso_mdoc": {} },
                    "group": ["B"],
                    "constraints": {}
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn submission_decoding() {
        let value = json!({
            "presentation_submission": {
                "id": "a30e3b91-fb77-4d22-95fa-871689c322e2",
                "definition_id": "32f54163-7166-48f1-93d8-ff217bdb0653",
                "descriptor_map": [
                    {
                        "id": "banking_input_2",
                        "format": "jwt_vp",
                        "path": "$.outerClaim[0]",
                        "path_nested": {
                            "id": "banking_input_2",
                            "format": "jwt_vc",
                            "path": "$.innerClaim[1]"
                        }
                    }
                ]
            }
        });

        let container: PresentationSubmissionContainer =
            serde_json::from_value(value.clone()).unwrap();
        let submission = container.presentation_submission();

        assert_eq!(submission.id(), "a30e3b91-fb77-4d22-95fa-871689c322e2");
        let entry = &submission.descriptor_map()[0];
        assert_eq!(entry.format, ClaimFormatDesignation::JwtVp);
        assert_eq!(
            entry.path_nested.as_ref().map(|n| &n.format),
            Some(&ClaimFormatDesignation::JwtVc)
        );
        assert_eq!(serde_json::to_value(&container).unwrap(), value);
    }

    #[test]
    fn new_submission_gets_uuid() {
        let a = PresentationSubmission::new("pd", vec![]);
        let b = PresentationSubmission::new("pd", vec![]);

        assert!(uuid::Uuid::parse_str(a.id()).is_ok());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn nested_path_inherits_id() {
        let entry = DescriptorMap::new("outer", "jwt_vp", "$")
            .set_path_nested(DescriptorMap::new("ignored", "jwt_vc", "$.vp.verifiableCredential[0]"));

        assert_eq!(entry.path_nested.map(|n| n.id), Some("outer".to_string()));
    }

    #[test]
    fn validate_without_requirements() {
        let definition = definition();
        let complete = PresentationSubmission::new(
            definition.id().clone(),
            vec![
                DescriptorMap::new("banking_input_1", "jwt_vc", "$[0]"),
                DescriptorMap::new("banking_input_2", "ldp_vc", "$[1]"),
                DescriptorMap::new("citizenship_input", "mso_mdoc", "$[2]"),
            ],
        );
        assert!(complete.validate(&definition).is_ok());

        let incomplete = PresentationSubmission::new(
            definition.id().clone(),
            vec![DescriptorMap::new("banking_input_1", "jwt_vc", "$[0]")],
        );
        assert!(matches!(
            incomplete.validate(&definition),
            Err(SubmissionError::Validation(
                SubmissionValidationError::MissingRequiredInput(id)
            )) if id == "banking_input_2"
        ));

        let definition = definition.set_submission_requirements(vec![]);
        assert!(complete.validate(&definition).is_ok());
        assert!(matches!(
            incomplete.validate(&definition),
            Err(SubmissionError::Validation(
                SubmissionValidationError::MissingRequiredInput(_)
            ))
        ));
    }

    #[test]
    fn validate_rejects_undefined_descriptor_and_format() {
        let definition = definition();

        let undefined = PresentationSubmission::new(
            definition.id().clone(),
            vec![DescriptorMap::new("unknown", "jwt_vc", "$")],
        );
        assert!(matches!(
            undefined.validate(&definition),
            Err(SubmissionError::UndefinedInputDescriptor(id)) if id == "unknown"
        ));

        // `citizenship_input` overrides the definition level formats.
        let wrong_format = PresentationSubmission::new(
            definition.id().clone(),
            vec![DescriptorMap::new("citizenship_input", "jwt_vc", "$")],
        );
        assert!(matches!(
            wrong_format.validate(&definition),
            Err(SubmissionError::FormatMismatch(ClaimFormatDesignation::JwtVc))
        ));

        let other_definition = PresentationSubmission::new("other", vec![]);
        assert!(matches!(
            other_definition.validate(&definition),
            Err(SubmissionError::DefinitionMismatch { .. })
        ));
    }

    #[test]
    fn validate_with_requirements() {
        let definition = definition().set_submission_requirements(vec![
            SubmissionRequirement::from_group(Rule::Pick, "A").set_count(1),
            SubmissionRequirement::from_group(Rule::All, "B"),
        ]);

        let valid = PresentationSubmission::new(
            definition.id().clone(),
            vec![
                DescriptorMap::new("banking_input_2", "jwt_vc", "$[0]"),
                DescriptorMap::new("citizenship_input", "mso_mdoc", "$[1]"),
            ],
        );
        assert!(valid.validate(&definition).is_ok());

        let too_many = PresentationSubmission::new(
            definition.id().clone(),
            vec![
                DescriptorMap::new("banking_input_1", "jwt_vc", "$[0]"),
                DescriptorMap::new("banking_input_2", "jwt_vc", "$[1]"),
                DescriptorMap::new("citizenship_input", "mso_mdoc", "$[2]"),
            ],
        );
        assert!(matches!(
            too_many.validate(&definition),
            Err(SubmissionError::Validation(
                SubmissionValidationError::SelectionSizeMismatch { expected: 1, found: 2, .. }
            ))
        ));
    }
}
