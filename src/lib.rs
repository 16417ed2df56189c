//! This library provides a Rust implementation of the matching side of
//! [DIF Presentation Exchange 2.0].
//!
//! [DIF Presentation Exchange 2.0]: <https://identity.foundation/presentation-exchange/spec/v2.0.0/>
//!
//! # Usage
//!
//! A holder decides which of its claims can answer a verifier's
//! [`PresentationDefinition`] using the [`PresentationMatcher`]:
//!
//! ```ignore
//! use presentation_exchange::core::claim::Claim;
//! use presentation_exchange::core::presentation_definition::PresentationDefinitionContainer;
//! use presentation_exchange::matching::{Match, PresentationMatcher};
//! use presentation_exchange::parser;
//! use serde_json::json;
//!
//! let container: PresentationDefinitionContainer = parser::decode_str(request)?;
//! let definition = container.presentation_definition();
//! definition.validate()?;
//!
//! let claims = vec![Claim::new(
//!     "samplePassport",
//!     "ldp",
//!     json!({ "credentialSubject": { "birth_date": "1974-11-11" } }),
//! )];
//!
//! match PresentationMatcher::new().match_claims(&claims, definition) {
//!     Match::Matched { matches } => {
//!         // Candidate claims per input descriptor, ready for user consent.
//!     }
//!     Match::NotMatched { details } => {
//!         // Claims failing field constraints, per input descriptor.
//!     }
//! }
//! ```
//!
//! [`PresentationDefinition`]: crate::core::presentation_definition::PresentationDefinition
//! [`PresentationMatcher`]: crate::matching::PresentationMatcher
//!
//! # Overview
//!
//! 1. *Decoding*: presentation definitions, submissions and claims are decoded with the
//!    [`parser`] module, which reports the path of the first malformed element.
//! 2. *Format negotiation*: a claim is only evaluated against an input descriptor whose
//!    `format` (or the definition's) accepts the claim's [`ClaimFormatDesignation`].
//! 3. *Field evaluation*: every constraint field is resolved with a [`PathQuery`] and
//!    filtered with a [`SchemaValidator`].
//! 4. *Submission requirements*: `all` and `pick` rules are evaluated over the input
//!    descriptors that have at least one candidate claim. See [`Config`] to reject
//!    definitions carrying submission requirements instead.
//!
//! The holder's answer, a [`PresentationSubmission`], can be checked against the
//! definition with [`PresentationSubmission::validate`].
//!
//! [`ClaimFormatDesignation`]: crate::core::credential_format::ClaimFormatDesignation
//! [`PathQuery`]: crate::core::query::PathQuery
//! [`SchemaValidator`]: crate::core::filter::SchemaValidator
//! [`Config`]: crate::config::Config
//! [`PresentationSubmission`]: crate::core::presentation_submission::PresentationSubmission
//! [`PresentationSubmission::validate`]: crate::core::presentation_submission::PresentationSubmission::validate

pub mod config;
pub mod core;
pub mod matching;
pub mod parser;
pub mod utils;
pub use serde_json_path::JsonPath;
