//! Translation file input: naming and parsing.

/// JSON translation documents
pub mod json;
/// Resource naming and filtering
pub mod resource;
