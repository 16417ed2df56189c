pub mod claim;
pub mod credential_format;
pub mod filter;
pub mod input_descriptor;
pub mod presentation_definition;
pub mod presentation_submission;
pub mod query;
pub mod submission_requirement;
