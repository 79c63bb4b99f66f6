use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Response, StatusCode};
use http_body_util::Full;
use hyper::body::Bytes;
use serde::Serialize;

/// The response half of an [`Expectation`]: what the [`TeaServer`] replies with when an
/// incoming request matches.
///
/// The body is stored already encoded, so replaying it is a cheap reference-counted clone.
///
/// [`Expectation`]: crate::Expectation
/// [`TeaServer`]: crate::TeaServer
#[derive(Clone, Debug)]
pub struct WantedResponse {
    mime: Option<HeaderValue>,
    status_code: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

// Expectations are mostly assembled in test code - failures are most likely mistakes, not
// conditions to recover from. Hence we prefer to panic and provide an easier API than to use
// `Result`s, in the same fashion as `ExpectationBuilder`.
// Payloads coming over the wire never go through these methods: they are validated by
// `RegisterPayload::into_expectation`, which reports errors instead.
impl WantedResponse {
    /// Start building a `WantedResponse` specifying the status code of the response.
    pub fn new<S>(s: S) -> Self
    where
        S: TryInto<StatusCode>,
        <S as TryInto<StatusCode>>::Error: std::fmt::Debug,
    {
        let status_code = s.try_into().expect("Failed to convert into status code.");
        Self::from_status(status_code)
    }

    pub(crate) fn from_status(status_code: StatusCode) -> Self {
        Self {
            status_code,
            headers: HeaderMap::new(),
            mime: None,
            body: Bytes::new(),
        }
    }

    /// Insert a header `value` with `key` as header name, replacing any previous value.
    ///
    /// Headers set here take precedence over the default "Content-Type" implied by the body.
    pub fn insert_header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        <K as TryInto<HeaderName>>::Error: std::fmt::Debug,
        V: TryInto<HeaderValue>,
        <V as TryInto<HeaderValue>>::Error: std::fmt::Debug,
    {
        let key = key.try_into().expect("Failed to convert into header name.");
        let value = value
            .try_into()
            .expect("Failed to convert into header value.");
        self.headers.insert(key, value);
        self
    }

    pub(crate) fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set the response body with bytes, replayed verbatim.
    ///
    /// It sets "Content-Type" to "application/octet-stream".
    pub fn set_body_bytes<B: Into<Bytes>>(mut self, body: B) -> Self {
        self.body = body.into();
        self.mime = Some(HeaderValue::from_static("application/octet-stream"));
        self
    }

    /// Set the response body from a JSON-serializable value.
    ///
    /// It sets "Content-Type" to "application/json".
    pub fn set_body_json<B: Serialize>(self, body: B) -> Self {
        let body = serde_json::to_vec(&body).expect("Failed to convert into body.");
        self.set_body_json_bytes(body)
    }

    pub(crate) fn set_body_json_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body.into();
        self.mime = Some(HeaderValue::from_static("application/json"));
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status_code
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Generate a response from the template.
    pub(crate) fn generate_response(&self) -> Response<Full<Bytes>> {
        let mut headers = self.headers.clone();
        // Set content-type, unless the user already did
        if let Some(mime) = &self.mime {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, mime.clone());
            }
        }

        let mut response = Response::new(Full::new(self.body.clone()));
        *response.status_mut() = self.status_code;
        *response.headers_mut() = headers;
        response
    }
}
