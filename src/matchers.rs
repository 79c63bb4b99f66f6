//! The four conditions an incoming [`Request`] must satisfy to match an
//! [`Expectation`](crate::Expectation): method, body, headers and path.
//!
//! Each condition is a small function over the expectation's data and the request.
//! [`Expectation::matches`](crate::Expectation::matches) evaluates them in that order and
//! stops at the first failure.
use crate::{MalformedBodyError, Request};
use http::HeaderMap;
use serde_json::{Number, Value};
use std::cell::OnceCell;

/// The body of the request being matched, parsed as JSON on first use.
///
/// A single match call may compare the body against many expectations:
/// we decode it at most once.
pub(crate) struct IncomingBody<'a> {
    raw: &'a [u8],
    parsed: OnceCell<Value>,
}

impl<'a> IncomingBody<'a> {
    pub(crate) fn new(raw: &'a [u8]) -> Self {
        Self {
            raw,
            parsed: OnceCell::new(),
        }
    }

    fn json(&self) -> Result<&Value, MalformedBodyError> {
        if let Some(value) = self.parsed.get() {
            return Ok(value);
        }
        let value = serde_json::from_slice(self.raw)?;
        Ok(self.parsed.get_or_init(|| value))
    }
}

/// Match **exactly** the method of a request. No case normalisation is performed.
pub(crate) fn method_matches(expected: &str, request: &Request) -> bool {
    request.method.as_str() == expected
}

/// Match the body of a request against an optional JSON constraint.
///
/// `None` matches any body, including an empty or non-JSON one.
/// Otherwise the incoming body must decode to a JSON document which is
/// [structurally equal](json_structurally_equal) to the expected one.
pub(crate) fn body_matches(
    expected: Option<&Value>,
    body: &IncomingBody<'_>,
) -> Result<bool, MalformedBodyError> {
    match expected {
        None => Ok(true),
        Some(expected) => Ok(json_structurally_equal(expected, body.json()?)),
    }
}

/// Every expected header must be present on the request with an equal value.
///
/// Header names are case-insensitive (`HeaderName`s are stored lower-cased on both sides),
/// values are compared byte for byte. Only the first value of a request header is
/// considered. Headers the expectation does not mention are ignored.
pub(crate) fn headers_match(expected: &HeaderMap, request: &Request) -> bool {
    expected
        .iter()
        .all(|(name, value)| request.headers.get(name) == Some(value))
}

/// Match **exactly** the path of a request.
pub(crate) fn path_matches(expected: &str, request: &Request) -> bool {
    request.path == expected
}

/// Deep structural equality between two JSON documents.
///
/// - objects are equal if they have the same set of keys, mapped to equal values; key order
///   is irrelevant;
/// - arrays are equal if they have the same length and equal elements in the same order;
/// - numbers are compared by value, hence `1`, `1.0` and `1e0` are all equal;
/// - strings, booleans and `null` are compared as you would expect.
///
/// Values of different kinds are never equal: `"1"` is not `1`.
pub fn json_structurally_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .zip(b.iter())
                    .all(|(a, b)| json_structurally_equal(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter().all(|(key, a)| {
                    b.get(key)
                        .map_or(false, |b| json_structurally_equal(a, b))
                })
        }
        _ => false,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (a.is_f64(), b.is_f64()) {
        (true, true) => a.as_f64() == b.as_f64(),
        // Every integer fits in at least one of the two representations.
        (false, false) => a.as_i64() == b.as_i64() && a.as_u64() == b.as_u64(),
        (false, true) => integer_equals_float(a, b),
        (true, false) => integer_equals_float(b, a),
    }
}

/// Integers are compared exactly: a float only equals an integer if it has no fractional part
/// and converts to that very integer. Going through `f64` would lose precision above 2^53.
fn integer_equals_float(integer: &Number, float: &Number) -> bool {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

    let Some(float) = float.as_f64() else {
        return false;
    };
    if float.fract() != 0.0 {
        return false;
    }
    if let Some(integer) = integer.as_i64() {
        (-TWO_POW_63..TWO_POW_63).contains(&float) && float as i64 == integer
    } else if let Some(integer) = integer.as_u64() {
        (0.0..TWO_POW_64).contains(&float) && float as u64 == integer
    } else {
        false
    }
}
