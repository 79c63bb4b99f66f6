//! The wire shape of a registration request and its validation into an [`Expectation`].
//!
//! ```json
//! {
//!   "expectedRequest": {
//!     "method": "POST",
//!     "url": "/widgets",
//!     "headers": {"Content-Type": "application/json"},
//!     "body": {"id": 1}
//!   },
//!   "wantedResponse": {
//!     "statusCode": 202,
//!     "headers": {"X-Trace": "1"},
//!     "body": {"ok": true}
//!   }
//! }
//! ```
use crate::{Expectation, ExpectedRequest, RegistrationError, ValidationError, WantedResponse};
use base64::prelude::{Engine as _, BASE64_STANDARD};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::{Deserialize, Deserializer};
use serde_json::value::RawValue;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub expected_request: ExpectedRequestPayload,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wanted_response: WantedResponsePayload,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpectedRequestPayload {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    /// `None` if the field was absent. An explicit `null` is a constraint like any other value.
    #[serde(default, deserialize_with = "present")]
    pub body: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WantedResponsePayload {
    #[serde(default)]
    pub status_code: Option<u64>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    /// Kept as raw JSON text so that it is replayed byte for byte.
    #[serde(default, deserialize_with = "present")]
    pub body: Option<Box<RawValue>>,
    /// A binary body, base64-encoded. Alternative to `body`.
    #[serde(default)]
    pub body_base64: Option<String>,
}

/// Distinguish an absent field (`None`, via `#[serde(default)]`) from an explicit `null`
/// (`Some(null)`): serde maps both to `None` for a plain `Option`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// A section sent as an explicit `null` is treated like an absent one, so that its mandatory
/// fields are reported as missing.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl RegisterPayload {
    /// Decode a payload from the raw body of a registration request.
    pub fn from_slice(body: &[u8]) -> Result<Self, RegistrationError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Field paths that are mandatory but were not supplied, in payload order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let request = &self.expected_request;
        let response = &self.wanted_response;
        let mut missing_fields = Vec::new();
        if request.method.as_deref().map_or(true, str::is_empty) {
            missing_fields.push("expectedRequest.method");
        }
        if request.url.as_deref().map_or(true, str::is_empty) {
            missing_fields.push("expectedRequest.url");
        }
        if response.status_code.map_or(true, |code| code == 0) {
            missing_fields.push("wantedResponse.statusCode");
        }
        if response.body.is_none() && response.body_base64.is_none() {
            missing_fields.push("wantedResponse.body");
        }
        missing_fields
    }

    /// Validate the payload and turn it into an [`Expectation`] ready to be registered.
    ///
    /// Every missing mandatory field is reported at once, as a [`ValidationError`].
    /// Values that could never be replayed (an out-of-range status code, an invalid header,
    /// a body that is not base64) are rejected as [`RegistrationError::InvalidField`].
    pub fn into_expectation(self) -> Result<Expectation, RegistrationError> {
        let missing_fields = self.missing_fields();
        if !missing_fields.is_empty() {
            return Err(ValidationError::new(missing_fields).into());
        }
        let Self {
            expected_request,
            wanted_response,
        } = self;

        let request = ExpectedRequest {
            method: expected_request.method.unwrap_or_default(),
            url: expected_request.url.unwrap_or_default(),
            headers: header_map("expectedRequest.headers", expected_request.headers)?,
            body: expected_request.body,
        };

        let status_code = wanted_response.status_code.unwrap_or_default();
        let status_code = u16::try_from(status_code)
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .ok_or_else(|| {
                RegistrationError::invalid_field(
                    "wantedResponse.statusCode",
                    format!("{} is not a valid HTTP status code", status_code),
                )
            })?;
        let response = WantedResponse::from_status(status_code)
            .with_headers(header_map("wantedResponse.headers", wanted_response.headers)?);
        let response = match (wanted_response.body, wanted_response.body_base64) {
            (Some(_), Some(_)) => {
                return Err(RegistrationError::invalid_field(
                    "wantedResponse.bodyBase64",
                    "it cannot be combined with `wantedResponse.body`",
                ))
            }
            (Some(body), None) => response.set_body_json_bytes(body.get().as_bytes().to_vec()),
            (None, Some(encoded)) => {
                let body = BASE64_STANDARD.decode(encoded).map_err(|e| {
                    RegistrationError::invalid_field("wantedResponse.bodyBase64", e)
                })?;
                response.set_body_bytes(body)
            }
            // Ruled out by `missing_fields`.
            (None, None) => response,
        };

        Ok(Expectation::new(request, response))
    }
}

fn header_map(
    field: &str,
    headers: Option<BTreeMap<String, String>>,
) -> Result<HeaderMap, RegistrationError> {
    let mut header_map = HeaderMap::new();
    for (name, value) in headers.unwrap_or_default() {
        let field_path = || format!("{}.{}", field, name);
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| RegistrationError::invalid_field(field_path(), e))?;
        if header_map.contains_key(&header_name) {
            return Err(RegistrationError::invalid_field(
                field_path(),
                "header names are case-insensitive, it is already set under another casing",
            ));
        }
        let header_value = HeaderValue::from_str(&value)
            .map_err(|e| RegistrationError::invalid_field(field_path(), e))?;
        header_map.insert(header_name, header_value);
    }
    Ok(header_map)
}
