use crate::{BodyPrintLimit, MatchOutcome, RegisterPayload, RegistrationError, Request, Store};
use http::header::{ALLOW, CONTENT_TYPE};
use http::{HeaderValue, Method, Response, StatusCode};
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use log::{debug, info, log_enabled, warn, Level};
use serde_json::{json, Value};

/// Where expectations are registered. Every other path is replayed against the store.
pub const REGISTER_PATH: &str = "/register-request";

/// What every connection task needs to serve requests.
#[derive(Clone, Debug)]
pub(super) struct ServerState {
    pub(super) store: Store,
    pub(super) body_print_limit: BodyPrintLimit,
}

pub(super) async fn handle_request(
    request: hyper::Request<Incoming>,
    server_state: &ServerState,
) -> Response<Full<Bytes>> {
    let request = match Request::from_hyper(request).await {
        Ok(request) => request,
        Err(e) => {
            warn!("Error reading request body: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "unreadable_body", "message": format!("Error reading request body: {}", e)}),
            );
        }
    };
    debug!("Handling request: {} {}", request.method, request.path);

    if request.path == REGISTER_PATH {
        register(request, &server_state.store)
    } else {
        replay(request, server_state)
    }
}

fn register(request: Request, store: &Store) -> Response<Full<Bytes>> {
    if request.method != Method::POST {
        let mut response = error_response(
            StatusCode::METHOD_NOT_ALLOWED,
            json!({"error": "method_not_allowed", "message": "Method Not Allowed"}),
        );
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static("POST"));
        return response;
    }

    match RegisterPayload::from_slice(&request.body).and_then(RegisterPayload::into_expectation) {
        Ok(expectation) => {
            info!("Registered expectation: {}", expectation);
            store.register(expectation);
            let mut response = Response::new(Full::new(Bytes::new()));
            *response.status_mut() = StatusCode::CREATED;
            response
        }
        Err(e) => {
            debug!("Rejected registration: {}", e);
            error_response(StatusCode::BAD_REQUEST, registration_error_body(&e))
        }
    }
}

fn registration_error_body(e: &RegistrationError) -> Value {
    let message = e.to_string();
    match e {
        RegistrationError::Validation(e) => json!({
            "error": "validation_error",
            "message": message,
            "missingFields": e.missing_fields(),
        }),
        RegistrationError::InvalidField { field, .. } => json!({
            "error": "invalid_field",
            "message": message,
            "field": field,
        }),
        RegistrationError::MalformedPayload(_) => json!({
            "error": "malformed_payload",
            "message": message,
        }),
    }
}

fn replay(request: Request, server_state: &ServerState) -> Response<Full<Bytes>> {
    match server_state.store.find_match(&request) {
        MatchOutcome::Matched(expectation) => {
            debug!("Matched expectation: {}", expectation);
            expectation.response().generate_response()
        }
        MatchOutcome::NoMatch => {
            if log_enabled!(Level::Debug) {
                let mut dump = String::new();
                if request
                    .print_with_limit(&mut dump, server_state.body_print_limit)
                    .is_ok()
                {
                    debug!("Got unconfigured call:\n{}", dump);
                }
            }
            error_response(
                StatusCode::NOT_FOUND,
                json!({"error": "unconfigured_call", "message": "Unconfigured call"}),
            )
        }
        MatchOutcome::MalformedBody(e) => {
            warn!("{} {}: {}", request.method, request.path, e);
            error_response(
                StatusCode::BAD_REQUEST,
                json!({"error": "malformed_body", "message": e.to_string()}),
            )
        }
    }
}

fn error_response(status: StatusCode, body: Value) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
