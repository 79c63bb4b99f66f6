use crate::matchers::{body_matches, headers_match, method_matches, path_matches, IncomingBody};
use crate::{MalformedBodyError, Request, WantedResponse};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// The request pattern half of an [`Expectation`].
///
/// All constraints must be satisfied for an incoming [`Request`] to match:
/// - `method` and `url` are compared **exactly**, case-sensitively;
/// - every entry in `headers` must be present on the request with an equal value (extra
///   request headers are ignored);
/// - `body`, if set, must be structurally equal to the request body parsed as JSON.
#[derive(Debug, Clone)]
pub struct ExpectedRequest {
    pub method: String,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

/// A registered rule: when an incoming request satisfies the [`ExpectedRequest`],
/// reply with the [`WantedResponse`].
///
/// Expectations are immutable once registered on a [`Store`](crate::Store).
///
/// ### Example:
/// ```rust
/// use tea::{Expectation, WantedResponse};
/// use serde_json::json;
///
/// let expectation = Expectation::given("POST", "/widgets")
///     .header("content-type", "application/json")
///     .body_json(json!({"id": 1}))
///     .respond_with(
///         WantedResponse::new(202)
///             .insert_header("X-Trace", "1")
///             .set_body_json(json!({"ok": true})),
///     );
///
/// assert_eq!(expectation.request().url, "/widgets");
/// assert_eq!(expectation.response().status().as_u16(), 202);
/// ```
#[derive(Debug, Clone)]
pub struct Expectation {
    request: ExpectedRequest,
    response: WantedResponse,
}

impl Expectation {
    /// Start building an [`Expectation`] for requests with the given method and path.
    pub fn given(method: impl Into<String>, url: impl Into<String>) -> ExpectationBuilder {
        ExpectationBuilder {
            request: ExpectedRequest {
                method: method.into(),
                url: url.into(),
                headers: HeaderMap::new(),
                body: None,
            },
        }
    }

    pub fn new(request: ExpectedRequest, response: WantedResponse) -> Self {
        Self { request, response }
    }

    pub fn request(&self) -> &ExpectedRequest {
        &self.request
    }

    pub fn response(&self) -> &WantedResponse {
        &self.response
    }

    /// Check `request` against method, body, headers and path - in this order, stopping at
    /// the first condition that does not hold.
    ///
    /// It fails with a [`MalformedBodyError`] if a body constraint is set and the request
    /// body is not valid JSON.
    pub fn matches(&self, request: &Request) -> Result<bool, MalformedBodyError> {
        self.matches_with_body(request, &IncomingBody::new(&request.body))
    }

    pub(crate) fn matches_with_body(
        &self,
        request: &Request,
        body: &IncomingBody<'_>,
    ) -> Result<bool, MalformedBodyError> {
        let expected = &self.request;
        if !method_matches(&expected.method, request) {
            return Ok(false);
        }
        if !body_matches(expected.body.as_ref(), body)? {
            return Ok(false);
        }
        Ok(headers_match(&expected.headers, request) && path_matches(&expected.url, request))
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}",
            self.request.method,
            self.request.url,
            self.response.status()
        )
    }
}

/// A fluent builder to assemble an [`Expectation`] step by step.
/// Use [`Expectation::given`] to get started.
///
/// Like [`WantedResponse`], the builder is meant to be used in test code: it panics if a
/// header name or value cannot be converted, instead of pushing the conversion on the caller.
#[derive(Debug)]
pub struct ExpectationBuilder {
    request: ExpectedRequest,
}

impl ExpectationBuilder {
    /// Require the request to carry header `key` with value `value`.
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        <K as TryInto<HeaderName>>::Error: std::fmt::Debug,
        V: TryInto<HeaderValue>,
        <V as TryInto<HeaderValue>>::Error: std::fmt::Debug,
    {
        let key = key.try_into().expect("Failed to convert to header name.");
        let value = value
            .try_into()
            .expect("Failed to convert to header value.");
        self.request.headers.insert(key, value);
        self
    }

    /// Require the request body to be structurally equal to `body` once serialized to JSON.
    pub fn body_json<B: Serialize>(mut self, body: B) -> Self {
        let body = serde_json::to_value(body).expect("Failed to serialize JSON body");
        self.request.body = Some(body);
        self
    }

    /// Finalise the builder, pairing the request pattern with the response to replay.
    pub fn respond_with(self, response: WantedResponse) -> Expectation {
        Expectation::new(self.request, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde_json::json;

    fn widgets() -> Expectation {
        Expectation::given("POST", "/widgets")
            .header("Content-Type", "application/json")
            .body_json(json!({"id": 1}))
            .respond_with(WantedResponse::new(202))
    }

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        headers.insert("x-request-id", "42".parse().unwrap());
        headers
    }

    #[test]
    fn a_request_satisfying_every_condition_matches() {
        let request = Request::new(Method::POST, "/widgets")
            .with_headers(json_headers())
            .with_body(r#"{ "id": 1 }"#);

        assert!(widgets().matches(&request).unwrap());
    }

    #[test]
    fn a_method_mismatch_short_circuits_before_the_body_is_parsed() {
        let request = Request::new(Method::GET, "/widgets")
            .with_headers(json_headers())
            .with_body("not json");

        assert!(!widgets().matches(&request).unwrap());
    }

    #[test]
    fn header_values_are_case_sensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "Application/JSON".parse().unwrap());
        let request = Request::new(Method::POST, "/widgets")
            .with_headers(headers)
            .with_body(r#"{"id":1}"#);

        assert!(!widgets().matches(&request).unwrap());
    }

    #[test]
    fn display_shows_the_route_and_status() {
        assert_eq!(widgets().to_string(), "POST /widgets -> 202 Accepted");
    }
}
