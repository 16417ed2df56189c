use std::{
    collections::BTreeSet,
    hash::{Hash, Hasher},
};

use super::credential_format::*;
use crate::utils::NonEmptyVec;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A GroupId represents a unique identifier for a group of Input Descriptors.
///
/// This type is also used by the submission requirements to group input descriptors.
pub type GroupId = String;

/// Identifier of an [InputDescriptor], unique within a presentation definition.
pub type InputDescriptorId = String;

/// A JSONPath is a string that represents a path to a specific value within a JSON object.
///
/// For syntax details, see [https://identity.foundation/presentation-exchange/spec/v2.0.0/#jsonpath-syntax-definition](https://identity.foundation/presentation-exchange/spec/v2.0.0/#jsonpath-syntax-definition)
pub type JsonPath = String;

/// The predicate Feature introduces properties enabling Verifier to request that Holder apply a predicate and return the result.
///
/// The predicate Feature extends the Input Descriptor Object `constraints.fields` object to add a predicate property.
///
/// The value of predicate **MUST** be one of the following strings: `required` or `preferred`.
///
/// If the predicate property is not present, a Conformant Consumer **MUST NOT** return derived predicate values.
///
/// See: [https://identity.foundation/presentation-exchange/#predicate-feature](https://identity.foundation/presentation-exchange/#predicate-feature)
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Predicate {
    /// The returned value **MUST** be the boolean result of applying the filter
    /// to the result of evaluating the path.
    Required,
    /// The returned value **SHOULD** be the boolean result of applying the filter
    /// to the result of evaluating the path.
    Preferred,
}

/// Input Descriptors are objects used to describe the information a
/// [Verifier](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:verifier) requires of a
/// [Holder](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:holder).
///
/// All Input Descriptors MUST be satisfied, unless otherwise specified by a
/// [Feature](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:feature).
///
/// See: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#input-descriptor-object](https://identity.foundation/presentation-exchange/spec/v2.0.0/#input-descriptor-object)
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputDescriptor {
    id: InputDescriptorId,
    #[serde(default)]
    constraints: Constraints,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<FormatContainer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<Vec<GroupId>>,
}

impl InputDescriptor {
    /// Create a new instance of the input descriptor with the given id and constraints.
    ///
    /// The Input Descriptor Object MUST contain an id property. The value of the id
    /// property MUST be a string that does not conflict with the id of another
    /// Input Descriptor Object in the same Presentation Definition.
    ///
    /// See: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#input-descriptor-object](https://identity.foundation/presentation-exchange/spec/v2.0.0/#input-descriptor-object)
    pub fn new(id: impl Into<InputDescriptorId>, constraints: Constraints) -> Self {
        Self {
            id: id.into(),
            constraints,
            ..Default::default()
        }
    }

    /// Return the id of the input descriptor.
    pub fn id(&self) -> &InputDescriptorId {
        &self.id
    }

    /// Return the constraints of the input descriptor.
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn set_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&String> {
        self.name.as_ref()
    }

    /// Set the purpose of the input descriptor.
    ///
    /// If present, the purpose MUST be a string that describes the purpose for which the
    /// [Claim](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:claim)'s
    /// data is being requested.
    pub fn set_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn purpose(&self) -> Option<&String> {
        self.purpose.as_ref()
    }

    /// Set the format of the input descriptor.
    ///
    /// This format property is identical in value signature to the top-level format object,
    /// but can be used to specifically constrain submission of a single input to a subset of formats or algorithms.
    pub fn set_format(mut self, format: FormatContainer) -> Self {
        self.format = Some(format);
        self
    }

    /// Return the format of the input descriptor, if restricted at this level.
    pub fn format(&self) -> Option<&FormatContainer> {
        self.format.as_ref()
    }

    /// Return the formats in effect for this descriptor: its own `format` when present,
    /// otherwise the presentation definition's. `None` means any format is accepted.
    pub fn effective_format<'a>(
        &'a self,
        definition_format: Option<&'a FormatContainer>,
    ) -> Option<&'a FormatContainer> {
        self.format.as_ref().or(definition_format)
    }

    /// Return whether a claim of the given format may satisfy this descriptor.
    pub fn accepts_format(
        &self,
        definition_format: Option<&FormatContainer>,
        format: &ClaimFormatDesignation,
    ) -> bool {
        self.effective_format(definition_format)
            .map_or(true, |container| container.contains(format))
    }

    /// Set the groups of the input descriptor.
    pub fn set_group(mut self, group: Vec<GroupId>) -> Self {
        self.group = Some(group);
        self
    }

    pub fn add_to_group(mut self, member: impl Into<GroupId>) -> Self {
        self.group.get_or_insert_with(Vec::new).push(member.into());
        self
    }

    /// Return the groups of the input descriptor.
    pub fn groups(&self) -> &[GroupId] {
        self.group.as_deref().unwrap_or_default()
    }

    pub fn belongs_to(&self, group: &str) -> bool {
        self.groups().iter().any(|g| g == group)
    }
}

/// Constraints are objects used to describe the constraints that a [Holder](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:holder) must satisfy to fulfill an Input Descriptor.
///
/// A constraint object MAY be empty, or it may include a `fields` and/or `limit_disclosure` property.
///
/// For more information, see: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#input-descriptor-object](https://identity.foundation/presentation-exchange/spec/v2.0.0/#input-descriptor-object)
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    fields: Vec<ConstraintsField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit_disclosure: Option<ConstraintsLimitDisclosure>,
}

impl Constraints {
    /// Returns an empty Constraints object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new field constraint to the constraints list.
    pub fn add_constraint(mut self, field: ConstraintsField) -> Self {
        self.fields.push(field);
        self
    }

    /// Returns the fields of the constraints object.
    pub fn fields(&self) -> &[ConstraintsField] {
        &self.fields
    }

    /// Set the limit disclosure value.
    ///
    /// For all [Claims](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:claims)
    /// submitted in relation to [InputDescriptor] Objects that include a `constraints` object with a
    /// `limit_disclosure` property set to `required`, the data submitted is limited to the entries
    /// specified in the `fields` property of the `constraints` object.
    ///
    /// For more information: see [https://identity.foundation/presentation-exchange/spec/v2.0.0/#limited-disclosure-submissions](https://identity.foundation/presentation-exchange/spec/v2.0.0/#limited-disclosure-submissions)
    pub fn set_limit_disclosure(mut self, limit_disclosure: ConstraintsLimitDisclosure) -> Self {
        self.limit_disclosure = Some(limit_disclosure);
        self
    }

    pub fn limit_disclosure(&self) -> Option<&ConstraintsLimitDisclosure> {
        self.limit_disclosure.as_ref()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintsLimitDisclosure {
    Required,
    Preferred,
}

/// ConstraintsField objects are used to describe the constraints that a
/// [Holder](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:holder)
/// must satisfy to fulfill an Input Descriptor.
///
/// Two fields are equal when their paths, purpose, intent to retain and filter are equal;
/// `id`, `name`, `predicate` and `optional` do not take part in the comparison. Fields key
/// the per-claim match results, so the hash is computed over the same properties, reducing
/// the filter to its sorted key set.
///
/// For more information, see: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#input-descriptor-object](https://identity.foundation/presentation-exchange/spec/v2.0.0/#input-descriptor-object)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConstraintsField {
    path: NonEmptyVec<JsonPath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    predicate: Option<Predicate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    optional: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    intent_to_retain: Option<bool>,
}

impl From<NonEmptyVec<JsonPath>> for ConstraintsField {
    fn from(path: NonEmptyVec<JsonPath>) -> Self {
        Self {
            path,
            id: None,
            purpose: None,
            name: None,
            predicate: None,
            filter: None,
            optional: None,
            intent_to_retain: None,
        }
    }
}

impl ConstraintsField {
    /// Create a new instance of the constraints field with the given path.
    ///
    /// Constraint fields must have at least one JSONPath to the field for which the constraint is applied.
    /// Use the `From<NonEmptyVec<JsonPath>>` implementation if more than one path is known.
    pub fn new(path: impl Into<JsonPath>) -> ConstraintsField {
        NonEmptyVec::new(path.into()).into()
    }

    /// Add a fallback path to the constraints field.
    pub fn add_path(mut self, path: impl Into<JsonPath>) -> Self {
        self.path.push(path.into());
        self
    }

    /// Return the paths of the constraints field, in evaluation order.
    ///
    /// For syntax definition, see: [https://identity.foundation/presentation-exchange/spec/v2.0.0/#jsonpath-syntax-definition](https://identity.foundation/presentation-exchange/spec/v2.0.0/#jsonpath-syntax-definition)
    pub fn path(&self) -> &NonEmptyVec<JsonPath> {
        &self.path
    }

    pub fn set_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&String> {
        self.id.as_ref()
    }

    pub fn set_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn purpose(&self) -> Option<&String> {
        self.purpose.as_ref()
    }

    /// Set the name of the constraints field.
    ///
    /// If present, its value SHOULD be a human-friendly name that describes what the target field represents.
    pub fn set_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&String> {
        self.name.as_ref()
    }

    /// Set the filter of the constraints field.
    ///
    /// If present its value MUST be a JSON Schema descriptor used to filter against
    /// the values returned from evaluation of the JSONPath string expressions in the path array.
    pub fn set_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn filter(&self) -> Option<&Value> {
        self.filter.as_ref()
    }

    /// Set the predicate of the constraints field.
    ///
    /// See: [https://identity.foundation/presentation-exchange/#predicate-feature](https://identity.foundation/presentation-exchange/#predicate-feature)
    pub fn set_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    /// Set the optional value of the constraints field.
    ///
    /// `true` indicates the field is optional, and `false` or non-presence of the property
    /// indicates the field is required. Even when the field is optional, the value located
    /// at the indicated path MUST validate against the filter, if a filter is present.
    pub fn set_optional(mut self, optional: bool) -> Self {
        self.optional = Some(optional);
        self
    }

    pub fn is_optional(&self) -> bool {
        self.optional.unwrap_or(false)
    }

    /// Inverse alias for `!is_optional()`.
    pub fn is_required(&self) -> bool {
        !self.is_optional()
    }

    /// Set the verifier's intent to retain the field value in its system.
    pub fn set_retained(mut self, intent_to_retain: bool) -> Self {
        self.intent_to_retain = Some(intent_to_retain);
        self
    }

    pub fn intent_to_retain(&self) -> Option<bool> {
        self.intent_to_retain
    }

    fn filter_keys(&self) -> BTreeSet<&str> {
        self.filter
            .as_ref()
            .and_then(Value::as_object)
            .map(|filter| filter.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

impl PartialEq for ConstraintsField {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.purpose == other.purpose
            && self.intent_to_retain == other.intent_to_retain
            && self.filter == other.filter
    }
}

impl Eq for ConstraintsField {}

impl Hash for ConstraintsField {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
        self.filter_keys().hash(state);
        self.purpose.hash(state);
        self.intent_to_retain.hash(state);
    }
}
