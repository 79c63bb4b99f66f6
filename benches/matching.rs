use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use tea::http::{HeaderMap, Method};
use tea::{Expectation, Request, Store, WantedResponse};

fn populated_store(n: usize) -> Store {
    let store = Store::new();
    for i in 0..n {
        store.register(
            Expectation::given("POST", format!("/items/{}", i))
                .header("content-type", "application/json")
                .body_json(json!({"id": i, "tags": ["a", "b"], "nested": {"x": 1.5}}))
                .respond_with(WantedResponse::new(200).set_body_json(json!({"ok": true}))),
        );
    }
    store
}

// The worst case: the matching expectation is the last one registered.
pub fn find_match_last_of_1000(c: &mut Criterion) {
    let store = populated_store(1000);
    let mut headers = HeaderMap::new();
    headers.insert("content-type", "application/json".parse().unwrap());
    let request = Request::new(Method::POST, "/items/999")
        .with_headers(headers)
        .with_body(r#"{"nested": {"x": 1.5}, "tags": ["a", "b"], "id": 999}"#);

    c.bench_function("Store::find_match (1000 expectations)", |b| {
        b.iter(|| store.find_match(black_box(&request)))
    });
}

criterion_group!(benches, find_match_last_of_1000);
criterion_main!(benches);
