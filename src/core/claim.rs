use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::credential_format::ClaimFormatDesignation;

/// Identifier of a [Claim], unique within one matching call.
pub type ClaimId = String;

/// A [Claim](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:claim) held by
/// the [Holder](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:holder),
/// already decoded into its JSON representation.
///
/// Field paths of input descriptors are evaluated against [Claim::content].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claim {
    id: ClaimId,
    format: ClaimFormatDesignation,
    content: Value,
}

impl Claim {
    pub fn new(
        id: impl Into<ClaimId>,
        format: impl Into<ClaimFormatDesignation>,
        content: Value,
    ) -> Self {
        Self {
            id: id.into(),
            format: format.into(),
            content,
        }
    }

    pub fn id(&self) -> &ClaimId {
        &self.id
    }

    pub fn format(&self) -> &ClaimFormatDesignation {
        &self.format
    }

    pub fn content(&self) -> &Value {
        &self.content
    }
}
