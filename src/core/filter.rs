use anyhow::{anyhow, Result};
use jsonschema::JSONSchema;
use serde_json::Value;

/// Decides whether a JSON value conforms to a JSON Schema document.
///
/// A schema that cannot be compiled is reported as an error, a value that does not
/// conform is `Ok(false)`.
pub trait SchemaValidator {
    fn validate(&self, schema: &Value, instance: &Value) -> Result<bool>;
}

/// [SchemaValidator] backed by the `jsonschema` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaValidator;

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, schema: &Value, instance: &Value) -> Result<bool> {
        let compiled = JSONSchema::compile(schema)
            .map_err(|e| anyhow!("invalid filter schema: {e}"))?;

        Ok(compiled.is_valid(instance))
    }
}

impl<T: SchemaValidator + ?Sized> SchemaValidator for &T {
    fn validate(&self, schema: &Value, instance: &Value) -> Result<bool> {
        (**self).validate(schema, instance)
    }
}
