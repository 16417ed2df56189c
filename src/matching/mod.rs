//! Evaluation of claims against a presentation definition.
//!
//! [PresentationMatcher::match_claims] evaluates every claim against every input
//! descriptor, regroups the results per descriptor and renders a [Match].

pub mod descriptor;
pub mod evaluation;
pub mod field;

use std::collections::{HashMap, HashSet};

pub use descriptor::DescriptorEvaluator;
pub use evaluation::{
    CandidateField, ClaimsEvaluation, InputDescriptorEvaluation,
    InputDescriptorEvaluationPerClaim, Match,
};
pub use field::FieldMatcher;

use crate::{
    config::{Config, SubmissionRequirementsMode},
    core::{
        claim::Claim,
        filter::{JsonSchemaValidator, SchemaValidator},
        presentation_definition::PresentationDefinition,
        query::{JsonPathQuery, PathQuery},
    },
};

/// Decides whether a set of claims satisfies a presentation definition.
///
/// The matcher holds no state across calls. It is `Send + Sync` whenever its path query
/// and schema validator are.
///
/// ```ignore
/// use presentation_exchange::matching::PresentationMatcher;
///
/// let outcome = PresentationMatcher::new().match_claims(&claims, &definition);
/// if let Some(matches) = outcome.matches() {
///     // Pick a claim per input descriptor and build the presentation submission.
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct PresentationMatcher<Q = JsonPathQuery, S = JsonSchemaValidator> {
    query: Q,
    validator: S,
    config: Config,
}

impl PresentationMatcher {
    /// Create a matcher backed by `serde_json_path` and `jsonschema`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<Q, S> PresentationMatcher<Q, S> {
    /// Create a matcher using the given path query and schema validator.
    pub fn with_capabilities(query: Q, validator: S) -> Self {
        Self {
            query,
            validator,
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<Q, S> PresentationMatcher<Q, S>
where
    Q: PathQuery,
    S: SchemaValidator,
{
    /// Match `claims` against `definition`.
    ///
    /// Claim ids are expected to be unique; when two claims share an id, the last one
    /// is kept.
    pub fn match_claims(&self, claims: &[Claim], definition: &PresentationDefinition) -> Match {
        let claims_evaluation = self.evaluate_claims(claims, definition);
        let (candidates, not_matching) = split_per_descriptor(claims_evaluation);

        self.decide(definition, candidates, not_matching)
    }

    /// Evaluate every claim against every input descriptor of `definition`.
    pub fn evaluate_claims(
        &self,
        claims: &[Claim],
        definition: &PresentationDefinition,
    ) -> ClaimsEvaluation {
        let evaluator = DescriptorEvaluator::new(&self.query, &self.validator, &self.config);

        claims
            .iter()
            .map(|claim| {
                let per_descriptor = definition
                    .input_descriptors()
                    .iter()
                    .map(|descriptor| {
                        (
                            descriptor.id().clone(),
                            evaluator.evaluate(descriptor, definition.format(), claim),
                        )
                    })
                    .collect();

                (claim.id().clone(), per_descriptor)
            })
            .collect()
    }

    fn decide(
        &self,
        definition: &PresentationDefinition,
        candidates: InputDescriptorEvaluationPerClaim,
        not_matching: InputDescriptorEvaluationPerClaim,
    ) -> Match {
        let every_descriptor = || {
            definition
                .input_descriptors()
                .iter()
                .all(|descriptor| candidates.contains_key(descriptor.id()))
        };

        let matched = match definition.submission_requirements() {
            None => every_descriptor(),
            Some(requirements) => match self.config.submission_requirements {
                SubmissionRequirementsMode::Reject => {
                    tracing::debug!(
                        "definition `{}` carries submission requirements, rejecting",
                        definition.id()
                    );
                    return Match::NotMatched {
                        details: HashMap::new(),
                    };
                }
                // An empty list selects nothing, so every descriptor is still needed.
                SubmissionRequirementsMode::Evaluate if requirements.is_empty() => {
                    every_descriptor()
                }
                SubmissionRequirementsMode::Evaluate => {
                    let satisfied: HashSet<&str> = candidates.keys().map(String::as_str).collect();
                    requirements.iter().all(|requirement| {
                        requirement.is_satisfied_by(definition.input_descriptors(), &satisfied)
                    })
                }
            },
        };

        tracing::debug!(
            "definition `{}`: {} of {} input descriptors have candidates, matched: {matched}",
            definition.id(),
            candidates.len(),
            definition.input_descriptors().len()
        );

        if matched {
            Match::Matched {
                matches: candidates,
            }
        } else {
            Match::NotMatched {
                details: not_matching,
            }
        }
    }
}

/// Regroup per claim results per input descriptor, keeping candidate claims and claims
/// failing field constraints apart. Descriptors without entries are omitted.
fn split_per_descriptor(
    claims_evaluation: ClaimsEvaluation,
) -> (
    InputDescriptorEvaluationPerClaim,
    InputDescriptorEvaluationPerClaim,
) {
    let mut candidates = InputDescriptorEvaluationPerClaim::new();
    let mut not_matching = InputDescriptorEvaluationPerClaim::new();

    for (claim_id, per_descriptor) in claims_evaluation {
        for (descriptor_id, evaluation) in per_descriptor {
            let target = match evaluation {
                InputDescriptorEvaluation::CandidateClaim { .. } => &mut candidates,
                InputDescriptorEvaluation::NotMatchedFieldConstraints => &mut not_matching,
                InputDescriptorEvaluation::NotMatchingClaim
                | InputDescriptorEvaluation::UnsupportedFormat => continue,
            };

            target
                .entry(descriptor_id)
                .or_default()
                .insert(claim_id.clone(), evaluation);
        }
    }

    (candidates, not_matching)
}
