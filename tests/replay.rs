use base64::prelude::{Engine as _, BASE64_STANDARD};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tea::{Expectation, TeaServer, WantedResponse, REGISTER_PATH};

async fn register(server: &TeaServer, payload: Value) {
    let response = Client::new()
        .post(format!("{}{}", server.uri(), REGISTER_PATH))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

async fn post(server: &TeaServer, path: &str, body: &str) -> reqwest::Response {
    Client::new()
        .post(format!("{}{}", server.uri(), path))
        .body(body.to_owned())
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn matched_calls_replay_the_wanted_response() {
    // Arrange
    let server = TeaServer::start().unwrap();
    register(
        &server,
        json!({
            "expectedRequest": {"method": "POST", "url": "/widgets", "headers": {}, "body": {"id": 1}},
            "wantedResponse": {"statusCode": 202, "headers": {"X-Trace": "1"}, "body": {"ok": true}}
        }),
    )
    .await;

    // Act
    let matched = post(&server, "/widgets", r#"{"id":1}"#).await;
    let unconfigured = post(&server, "/widgets", r#"{"id":2}"#).await;

    // Assert
    assert_eq!(matched.status(), StatusCode::ACCEPTED);
    assert_eq!(matched.headers()["x-trace"], "1");
    assert_eq!(matched.headers()["content-type"], "application/json");
    assert_eq!(matched.json::<Value>().await.unwrap(), json!({"ok": true}));

    assert_eq!(unconfigured.status(), StatusCode::NOT_FOUND);
    let body: Value = unconfigured.json().await.unwrap();
    assert_eq!(body["error"], "unconfigured_call");
}

#[tokio::test]
async fn returns_404_if_nothing_is_registered() {
    // Arrange
    let server = TeaServer::start().unwrap();

    // Act
    let status = reqwest::get(server.uri()).await.unwrap().status();

    // Assert
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn the_wanted_body_is_replayed_verbatim() {
    // Arrange
    let server = TeaServer::start().unwrap();
    let payload = r#"{
        "expectedRequest": {"method": "GET", "url": "/verbatim"},
        "wantedResponse": {"statusCode": 200, "body": {"z": 1,  "a": [1.50, 2]}}
    }"#;
    let response = Client::new()
        .post(format!("{}{}", server.uri(), REGISTER_PATH))
        .body(payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Act
    let response = reqwest::get(format!("{}/verbatim", server.uri()))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.text().await.unwrap(),
        r#"{"z": 1,  "a": [1.50, 2]}"#
    );
}

#[tokio::test]
async fn binary_bodies_are_replayed_as_bytes() {
    // Arrange
    let server = TeaServer::start().unwrap();
    let bytes = vec![0u8, 159, 146, 150];
    register(
        &server,
        json!({
            "expectedRequest": {"method": "GET", "url": "/blob"},
            "wantedResponse": {"statusCode": 200, "bodyBase64": BASE64_STANDARD.encode(&bytes)}
        }),
    )
    .await;

    // Act
    let response = reqwest::get(format!("{}/blob", server.uri()))
        .await
        .unwrap();

    // Assert
    assert_eq!(
        response.headers()["content-type"],
        "application/octet-stream"
    );
    assert_eq!(response.bytes().await.unwrap().to_vec(), bytes);
}

#[tokio::test]
async fn wanted_headers_override_the_default_content_type() {
    // Arrange
    let server = TeaServer::start().unwrap();
    register(
        &server,
        json!({
            "expectedRequest": {"method": "GET", "url": "/text"},
            "wantedResponse": {"statusCode": 200, "headers": {"Content-Type": "text/plain"}, "body": "hello"}
        }),
    )
    .await;

    // Act
    let response = reqwest::get(format!("{}/text", server.uri()))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.headers()["content-type"], "text/plain");
    assert_eq!(response.text().await.unwrap(), r#""hello""#);
}

#[tokio::test]
async fn header_names_are_matched_case_insensitively() {
    // Arrange
    let server = TeaServer::start().unwrap();
    register(
        &server,
        json!({
            "expectedRequest": {"method": "GET", "url": "/typed", "headers": {"Content-Type": "application/json"}},
            "wantedResponse": {"statusCode": 200, "body": null}
        }),
    )
    .await;
    let client = Client::new();
    let url = format!("{}/typed", server.uri());

    // Act
    let with_extra_headers = client
        .get(&url)
        .header("content-type", "application/json")
        .header("x-unrelated", "whatever")
        .send()
        .await
        .unwrap();
    let wrong_value = client
        .get(&url)
        .header("content-type", "application/xml")
        .send()
        .await
        .unwrap();
    let missing = client.get(&url).send().await.unwrap();

    // Assert
    assert_eq!(with_extra_headers.status(), StatusCode::OK);
    assert_eq!(wrong_value.status(), StatusCode::NOT_FOUND);
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bodies_are_compared_structurally() {
    // Arrange
    let server = TeaServer::start().unwrap();
    register(
        &server,
        json!({
            "expectedRequest": {"method": "POST", "url": "/sum", "body": {"a": 1, "b": 2}},
            "wantedResponse": {"statusCode": 200, "body": 3}
        }),
    )
    .await;

    // Act & Assert
    for matching in [r#"{"b":2,"a":1}"#, r#"{ "a": 1, "b": 2 }"#, r#"{"a":1.0,"b":2}"#] {
        assert_eq!(post(&server, "/sum", matching).await.status(), StatusCode::OK);
    }
    for not_matching in [r#"{"a":1}"#, r#"{"a":"1","b":2}"#] {
        assert_eq!(
            post(&server, "/sum", not_matching).await.status(),
            StatusCode::NOT_FOUND
        );
    }
}

#[tokio::test]
async fn a_malformed_body_is_a_fault_not_a_miss() {
    // Arrange
    let server = TeaServer::start().unwrap();
    register(
        &server,
        json!({
            "expectedRequest": {"method": "POST", "url": "/sum", "body": {"a": 1}},
            "wantedResponse": {"statusCode": 200, "body": 1}
        }),
    )
    .await;

    // Act
    let response = post(&server, "/sum", "{\"a\": ").await;

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "malformed_body");
}

#[tokio::test]
async fn the_earliest_registered_expectation_wins() {
    // Arrange
    let server = TeaServer::start().unwrap();
    server.register(Expectation::given("GET", "/abcd").respond_with(WantedResponse::new(200)));
    server.register(Expectation::given("GET", "/abcd").respond_with(WantedResponse::new(201)));

    // Act
    let status = reqwest::get(format!("{}/abcd", server.uri()))
        .await
        .unwrap()
        .status();

    // Assert
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn query_strings_are_not_part_of_the_path() {
    // Arrange
    let server = TeaServer::start().unwrap();
    server.register(Expectation::given("GET", "/search").respond_with(WantedResponse::new(200)));

    // Act
    let with_query = reqwest::get(format!("{}/search?q=tea", server.uri()))
        .await
        .unwrap()
        .status();
    let with_trailing_slash = reqwest::get(format!("{}/search/", server.uri()))
        .await
        .unwrap()
        .status();

    // Assert
    assert_eq!(with_query, StatusCode::OK);
    assert_eq!(with_trailing_slash, StatusCode::NOT_FOUND);
}

#[async_std::test]
async fn works_from_an_async_std_executor() {
    // Arrange
    let server = TeaServer::start().unwrap();
    server.register(
        Expectation::given("GET", "/hello")
            .respond_with(WantedResponse::new(200).set_body_json(json!({"hello": "world"}))),
    );

    // Act
    let response = reqwest::get(format!("{}/hello", server.uri()))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({"hello": "world"})
    );
}

#[tokio::test]
async fn http2_is_supported() {
    // Arrange
    let server = TeaServer::start().unwrap();
    server.register(Expectation::given("GET", "/").respond_with(WantedResponse::new(200)));

    // Act
    let response = Client::builder()
        .http2_prior_knowledge()
        .build()
        .expect("http client")
        .get(server.uri())
        .send()
        .await
        .expect("response");

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.version(), reqwest::Version::HTTP_2);
}
