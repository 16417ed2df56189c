use std::collections::HashMap;

use super::{
    evaluation::{CandidateField, InputDescriptorEvaluation},
    field::FieldMatcher,
};
use crate::{
    config::Config,
    core::{
        claim::Claim,
        credential_format::FormatContainer,
        filter::SchemaValidator,
        input_descriptor::{ConstraintsField, InputDescriptor},
        query::PathQuery,
    },
};

/// Evaluates an input descriptor against a claim: format negotiation first, then every
/// constraint field.
#[derive(Debug)]
pub struct DescriptorEvaluator<'a, Q, S> {
    fields: FieldMatcher<'a, Q, S>,
}

impl<'a, Q, S> DescriptorEvaluator<'a, Q, S>
where
    Q: PathQuery,
    S: SchemaValidator,
{
    pub fn new(query: &'a Q, validator: &'a S, config: &'a Config) -> Self {
        Self {
            fields: FieldMatcher::new(query, validator, config),
        }
    }

    /// `definition_format` is the `format` of the enclosing presentation definition; the
    /// descriptor's own `format` takes precedence over it.
    pub fn evaluate(
        &self,
        descriptor: &InputDescriptor,
        definition_format: Option<&FormatContainer>,
        claim: &Claim,
    ) -> InputDescriptorEvaluation {
        if !descriptor.accepts_format(definition_format, claim.format()) {
            tracing::debug!(
                "claim `{}`: format {} not accepted by input descriptor `{}`",
                claim.id(),
                claim.format(),
                descriptor.id()
            );
            return InputDescriptorEvaluation::UnsupportedFormat;
        }

        // Fields equal up to `optional` share a map slot, so the verdict is taken per field
        // before the outcomes are keyed.
        let outcomes: Vec<_> = descriptor
            .constraints()
            .fields()
            .iter()
            .map(|field| (field, self.fields.evaluate(field, claim)))
            .collect();

        if outcomes.iter().any(|(field, outcome)| disqualifies(field, outcome)) {
            tracing::debug!(
                "claim `{}`: required field not satisfied for input descriptor `{}`",
                claim.id(),
                descriptor.id()
            );
            return InputDescriptorEvaluation::NotMatchedFieldConstraints;
        }

        let matches: HashMap<_, _> = outcomes
            .into_iter()
            .map(|(field, outcome)| (field.clone(), outcome))
            .collect();

        InputDescriptorEvaluation::CandidateClaim { matches }
    }
}

/// A required field is unsatisfied when no value was found or its predicate failed.
fn disqualifies(field: &ConstraintsField, outcome: &CandidateField) -> bool {
    outcome.is_required_field_not_found() || (field.is_required() && outcome.is_failed_predicate())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::{
        credential_format::FormatDescriptor,
        filter::JsonSchemaValidator,
        input_descriptor::{Constraints, Predicate},
        query::JsonPathQuery,
    };
    use serde_json::json;

    fn evaluate(
        descriptor: &InputDescriptor,
        definition_format: Option<&FormatContainer>,
        claim: &Claim,
    ) -> InputDescriptorEvaluation {
        let config = Config::default();
        DescriptorEvaluator::new(&JsonPathQuery, &JsonSchemaValidator, &config).evaluate(
            descriptor,
            definition_format,
            claim,
        )
    }

    fn descriptor() -> InputDescriptor {
        InputDescriptor::new(
            "passport",
            Constraints::new().add_constraint(ConstraintsField::new("$.credentialSubject.birth_date")),
        )
    }

    #[test]
    fn unrestricted_formats_accept_any_claim() {
        let claim = Claim::new(
            "claim",
            "some_unregistered_format",
            json!({ "credentialSubject": { "birth_date": "1974-11-11" } }),
        );

        assert!(evaluate(&descriptor(), None, &claim).is_candidate());
    }

    #[test]
    fn unsupported_format_short_circuits_fields() {
        let descriptor = descriptor()
            .set_format(FormatContainer::default().add_format(FormatDescriptor::new("jwt")));
        let claim = Claim::new(
            "claim",
            "ldp",
            json!({ "credentialSubject": { "birth_date": "1974-11-11" } }),
        );

        assert_eq!(
            evaluate(&descriptor, None, &claim),
            InputDescriptorEvaluation::UnsupportedFormat
        );

        // Format designations are case-sensitive.
        let claim = Claim::new("claim", "JWT", json!({}));
        assert_eq!(
            evaluate(&descriptor, None, &claim),
            InputDescriptorEvaluation::UnsupportedFormat
        );
    }

    #[test]
    fn definition_format_applies_when_descriptor_has_none() {
        let definition_format =
            FormatContainer::default().add_format(FormatDescriptor::new("mso_mdoc"));
        let claim = Claim::new(
            "claim",
            "jwt",
            json!({ "credentialSubject": { "birth_date": "1974-11-11" } }),
        );

        assert_eq!(
            evaluate(&descriptor(), Some(&definition_format), &claim),
            InputDescriptorEvaluation::UnsupportedFormat
        );

        let descriptor = descriptor()
            .set_format(FormatContainer::default().add_format(FormatDescriptor::new("jwt")));
        assert!(evaluate(&descriptor, Some(&definition_format), &claim).is_candidate());
    }

    #[test]
    fn required_field_missing() {
        let claim = Claim::new("claim", "ldp", json!({ "credentialSubject": {} }));

        assert_eq!(
            evaluate(&descriptor(), None, &claim),
            InputDescriptorEvaluation::NotMatchedFieldConstraints
        );
    }

    #[test]
    fn optional_field_missing_keeps_candidate() {
        let optional = ConstraintsField::new("$.credentialSubject.nickname").set_optional(true);
        let descriptor = InputDescriptor::new(
            "passport",
            Constraints::new()
                .add_constraint(ConstraintsField::new("$.credentialSubject.birth_date"))
                .add_constraint(optional.clone()),
        );
        let claim = Claim::new(
            "claim",
            "ldp",
            json!({ "credentialSubject": { "birth_date": "1974-11-11" } }),
        );

        match evaluate(&descriptor, None, &claim) {
            InputDescriptorEvaluation::CandidateClaim { matches } => {
                assert_eq!(matches.len(), 2);
                assert_eq!(
                    matches.get(&optional),
                    Some(&CandidateField::OptionalFieldNotFound)
                );
                assert_eq!(
                    matches.get(&ConstraintsField::new("$.credentialSubject.birth_date")),
                    Some(&CandidateField::Found {
                        path: "$.credentialSubject.birth_date".into(),
                        value: json!("1974-11-11")
                    })
                );
            }
            other => panic!("unexpected evaluation: {other}"),
        }
    }

    #[test]
    fn optional_twin_does_not_hide_missing_required_field() {
        let descriptor = InputDescriptor::new(
            "twins",
            Constraints::new()
                .add_constraint(ConstraintsField::new("$.a"))
                .add_constraint(ConstraintsField::new("$.a").set_optional(true)),
        );
        let claim = Claim::new("claim", "jwt", json!({}));

        assert_eq!(
            evaluate(&descriptor, None, &claim),
            InputDescriptorEvaluation::NotMatchedFieldConstraints
        );

        // Reversed order, same verdict.
        let descriptor = InputDescriptor::new(
            "twins",
            Constraints::new()
                .add_constraint(ConstraintsField::new("$.a").set_optional(true))
                .add_constraint(ConstraintsField::new("$.a")),
        );
        assert_eq!(
            evaluate(&descriptor, None, &claim),
            InputDescriptorEvaluation::NotMatchedFieldConstraints
        );
    }

    #[test]
    fn failed_predicate_on_required_field() {
        let predicate = ConstraintsField::new("$.age")
            .set_filter(json!({ "type": "string", "pattern": "^[0-9]{2}$" }))
            .set_predicate(Predicate::Required);
        let claim = Claim::new("claim", "jwt", json!({ "age": "7" }));

        let descriptor = InputDescriptor::new("adult", Constraints::new().add_constraint(predicate.clone()));
        assert_eq!(
            evaluate(&descriptor, None, &claim),
            InputDescriptorEvaluation::NotMatchedFieldConstraints
        );

        let optional = predicate.set_optional(true);
        let descriptor = InputDescriptor::new("adult", Constraints::new().add_constraint(optional.clone()));
        match evaluate(&descriptor, None, &claim) {
            InputDescriptorEvaluation::CandidateClaim { matches } => assert_eq!(
                matches.get(&optional),
                Some(&CandidateField::PredicateEvaluated {
                    path: "$.age".into(),
                    result: false
                })
            ),
            other => panic!("unexpected evaluation: {other}"),
        }
    }

    #[test]
    fn descriptor_without_fields_is_a_candidate() {
        let descriptor = InputDescriptor::new("any", Constraints::new());
        let claim = Claim::new("claim", "jwt", json!({}));

        assert_eq!(
            evaluate(&descriptor, None, &claim),
            InputDescriptorEvaluation::CandidateClaim {
                matches: Default::default()
            }
        );
    }
}
