//! The error types surfaced by the expectation store and its registration boundary.
use std::fmt;

/// One or more mandatory fields were missing from a registration payload.
///
/// All missing fields are reported together, in the order they appear in the payload,
/// so that the caller can fix every omission in a single round trip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct ValidationError {
    missing_fields: Vec<&'static str>,
}

impl ValidationError {
    pub(crate) fn new(missing_fields: Vec<&'static str>) -> Self {
        Self { missing_fields }
    }

    /// The dotted path of every missing field, e.g. `expectedRequest.url`.
    pub fn missing_fields(&self) -> &[&'static str] {
        &self.missing_fields
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Missing mandatory fields: {}",
            self.missing_fields.join(", ")
        )
    }
}

/// Why an expectation could not be admitted to the store.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The field is present but its value can never be replayed (e.g. status code `1000`).
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidField { field: String, reason: String },
    #[error("Error decoding registration payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

impl RegistrationError {
    pub(crate) fn invalid_field(field: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.to_string(),
        }
    }
}

/// The body of an incoming request had to be compared against an expectation
/// but could not be parsed as JSON.
///
/// This is a fault, not a routing miss: it is reported separately from
/// [`MatchOutcome::NoMatch`](crate::MatchOutcome::NoMatch).
#[derive(Debug, thiserror::Error)]
#[error("Request body is not valid JSON: {source}")]
pub struct MalformedBodyError {
    #[from]
    source: serde_json::Error,
}
