use serde_json::Value;

use super::evaluation::CandidateField;
use crate::{
    config::Config,
    core::{
        claim::Claim, filter::SchemaValidator, input_descriptor::ConstraintsField,
        query::PathQuery,
    },
    utils::is_valid_date,
};

/// Matches a single constraint field against a claim.
///
/// Paths are tried in order and the first one yielding a string value that passes the
/// field filter wins; later paths are not queried. Query and validator faults count as
/// "no value on this path".
///
/// A field with a `predicate` whose values are present but all fail the filter evaluates
/// to `PredicateEvaluated { result: false }` rather than to a missing field.
#[derive(Debug)]
pub struct FieldMatcher<'a, Q, S> {
    query: &'a Q,
    validator: &'a S,
    date_format: &'a str,
}

impl<'a, Q, S> FieldMatcher<'a, Q, S>
where
    Q: PathQuery,
    S: SchemaValidator,
{
    pub fn new(query: &'a Q, validator: &'a S, config: &'a Config) -> Self {
        Self {
            query,
            validator,
            date_format: &config.date_format,
        }
    }

    pub fn evaluate(&self, field: &ConstraintsField, claim: &Claim) -> CandidateField {
        // First path whose values all failed the filter of a predicate field.
        let mut failed_predicate = None;

        for path in field.path().iter() {
            let values = match self.query.query(path, claim.content()) {
                Ok(values) => values,
                Err(e) => {
                    tracing::debug!("claim `{}`: skipping path {path}: {e:#}", claim.id());
                    continue;
                }
            };

            let mut strings = values.into_iter().filter_map(Value::as_str).peekable();
            if strings.peek().is_none() {
                continue;
            }

            let Some(value) = strings.find(|value| self.passes_filter(field.filter(), value))
            else {
                if field.predicate().is_some() {
                    failed_predicate.get_or_insert(path);
                }
                continue;
            };

            tracing::debug!("claim `{}`: field satisfied by path {path}", claim.id());

            return match field.predicate() {
                Some(_) => CandidateField::PredicateEvaluated {
                    path: path.clone(),
                    result: true,
                },
                None => CandidateField::Found {
                    path: path.clone(),
                    value: Value::String(value.to_owned()),
                },
            };
        }

        if let Some(path) = failed_predicate {
            tracing::debug!("claim `{}`: predicate on path {path} evaluated to false", claim.id());
            return CandidateField::PredicateEvaluated {
                path: path.clone(),
                result: false,
            };
        }

        if field.is_optional() {
            CandidateField::OptionalFieldNotFound
        } else {
            CandidateField::RequiredFieldNotFound
        }
    }

    fn passes_filter(&self, filter: Option<&Value>, value: &str) -> bool {
        let Some(filter) = filter else {
            return true;
        };

        // Dates are checked against the configured layout instead of the schema.
        if filter.get("format").and_then(Value::as_str) == Some("date") {
            return is_valid_date(value, self.date_format);
        }

        match self
            .validator
            .validate(filter, &Value::String(value.to_owned()))
        {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!("field filter could not be evaluated: {e:#}");
                false
            }
        }
    }
}
