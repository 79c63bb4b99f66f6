//! Convenient re-exports of http types that are part of `tea`'s public API.
pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
