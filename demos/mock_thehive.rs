//! Pretend TheHive server for trying the bridge locally.
//!
//! Run with `cargo run --example mock_thehive`, then point the bridge at
//! `host = "127.0.0.1"`, `port = 9000`, `use_ssl = false`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Store {
    next_id: Arc<AtomicU64>,
    objects: Arc<Mutex<HashMap<String, Value>>>,
}

impl Store {
    fn insert(&self, kind: &str, mut object: Value) -> Value {
        let id = (self.next_id.fetch_add(1, Ordering::Relaxed) + 100_000).to_string();
        if let Value::Object(map) = &mut object {
            map.insert("id".into(), json!(id));
            map.insert("_type".into(), json!(kind));
        }
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert(id, object.clone());
        }
        object
    }

    fn create(&self, kind: &str, object: Value) -> Json<Value> {
        Json(self.insert(kind, object))
    }

    fn create_child(&self, kind: &str, case_id: &str, mut object: Value) -> Json<Value> {
        if let Value::Object(map) = &mut object {
            map.insert("caseId".into(), json!(case_id));
        }
        Json(self.insert(kind, object))
    }

    fn get(&self, kind: &str, id: &str) -> (StatusCode, Json<Value>) {
        let found = self
            .objects
            .lock()
            .ok()
            .and_then(|objects| objects.get(id).cloned())
            .filter(|object| object["_type"] == kind);
        match found {
            Some(object) => (StatusCode::OK, Json(object)),
            None => (
                StatusCode::NOT_FOUND,
                Json(json!({"type": "NotFoundError", "message": format!("{} {} not found", kind, id)})),
            ),
        }
    }

    fn search(&self, kind: &str) -> Json<Value> {
        let found: Vec<Value> = self
            .objects
            .lock()
            .map(|objects| objects.values().filter(|o| o["_type"] == kind).cloned().collect())
            .unwrap_or_default();
        Json(Value::Array(found))
    }
}

#[tokio::main]
async fn main() {
    let app = Router::new()
        .route("/api/case", post(|State(s): State<Store>, Json(b): Json<Value>| async move { s.create("case", b) }))
        .route("/api/case/_search", post(|State(s): State<Store>| async move { s.search("case") }))
        .route("/api/case/{id}", get(|State(s): State<Store>, Path(id): Path<String>| async move { s.get("case", &id) }))
        .route(
            "/api/case/{id}/task",
            post(|State(s): State<Store>, Path(id): Path<String>, Json(b): Json<Value>| async move {
                s.create_child("case_task", &id, b)
            }),
        )
        .route(
            "/api/case/{id}/artifact",
            post(|State(s): State<Store>, Path(id): Path<String>, Json(b): Json<Value>| async move {
                s.create_child("case_artifact", &id, b)
            }),
        )
        .route("/api/case/task/_search", post(|State(s): State<Store>| async move { s.search("case_task") }))
        .route(
            "/api/case/task/{id}",
            get(|State(s): State<Store>, Path(id): Path<String>| async move { s.get("case_task", &id) }),
        )
        .route(
            "/api/case/artifact/_search",
            post(|State(s): State<Store>| async move { s.search("case_artifact") }),
        )
        .route(
            "/api/case/artifact/{id}",
            get(|State(s): State<Store>, Path(id): Path<String>| async move { s.get("case_artifact", &id) }),
        )
        .route("/api/alert", post(|State(s): State<Store>, Json(b): Json<Value>| async move { s.create("alert", b) }))
        .route("/api/alert/_search", post(|State(s): State<Store>| async move { s.search("alert") }))
        .route("/api/alert/{id}", get(|State(s): State<Store>, Path(id): Path<String>| async move { s.get("alert", &id) }))
        .with_state(Store::default());

    let addr = SocketAddr::from(([127, 0, 0, 1], 9000));
    println!("Mock TheHive listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
