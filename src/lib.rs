//! `tea` is a standalone HTTP expectation server: register canned responses, then point the
//! code under test at it and let it replay them.
//!
//! It stands in for a real backend during integration testing, whatever language the code
//! under test is written in.
//!
//! # Table of Contents
//! 1. [Getting started](#getting-started)
//! 2. [Matching](#matching)
//! 3. [Outcomes](#outcomes)
//! 4. [In-process usage](#in-process-usage)
//!
//! ## Getting started
//!
//! Run the `tea` binary (it listens on `0.0.0.0:7111` by default, check `tea --help`), then
//! register an expectation:
//!
//! ```text
//! POST /register-request
//! {
//!   "expectedRequest": {"method": "POST", "url": "/widgets", "body": {"id": 1}},
//!   "wantedResponse":  {"statusCode": 202, "headers": {"X-Trace": "1"}, "body": {"ok": true}}
//! }
//! ```
//!
//! From now on a `POST /widgets` with body `{"id": 1}` gets back a `202` with body
//! `{"ok": true}` and an `X-Trace: 1` header.
//!
//! `expectedRequest.method`, `expectedRequest.url`, `wantedResponse.statusCode` and
//! `wantedResponse.body` are mandatory: if any is missing the registration is rejected with a
//! `400`, listing all the missing fields at once.
//!
//! ## Matching
//!
//! An incoming request matches an [`Expectation`] if:
//! - its method is **exactly** the expected one;
//! - its body is structurally equal to the expected one, if one was given: both are decoded as
//!   JSON, so whitespace, key order and number formatting are irrelevant;
//! - it carries every expected header with an equal value - header names are case-insensitive,
//!   extra headers are ignored;
//! - its path is **exactly** the expected url.
//!
//! If more than one expectation matches, the earliest registered one wins.
//!
//! ## Outcomes
//!
//! | Outcome                             | Status code                 |
//! |-------------------------------------|-----------------------------|
//! | An expectation matched              | The wanted one              |
//! | Nothing matched                     | `404`, "Unconfigured call"  |
//! | A body had to be compared, not JSON | `400`, "malformed_body"     |
//!
//! ## In-process usage
//!
//! ```rust
//! use tea::{Expectation, TeaServer, WantedResponse};
//! use serde_json::json;
//!
//! let server = TeaServer::start().unwrap();
//! server.register(
//!     Expectation::given("POST", "/widgets")
//!         .body_json(json!({"id": 1}))
//!         .respond_with(WantedResponse::new(202).set_body_json(json!({"ok": true}))),
//! );
//! // Point the code under test at `server.uri()`.
//! ```
mod error;
mod expectation;
pub mod http;
pub mod matchers;
mod payload;
mod request;
mod response_template;
mod store;
mod tea_server;

pub use error::{MalformedBodyError, RegistrationError, ValidationError};
pub use expectation::{Expectation, ExpectationBuilder, ExpectedRequest};
pub use payload::{ExpectedRequestPayload, RegisterPayload, WantedResponsePayload};
pub use request::{BodyPrintLimit, Request, BODY_PRINT_LIMIT};
pub use response_template::WantedResponse;
pub use store::{MatchOutcome, Store};
pub use tea_server::{TeaServer, TeaServerBuilder, REGISTER_PATH};
