//! End-to-end flow over the in-process fabric.
//!
//! Starts a stand-in TheHive on an ephemeral port, builds the bridge
//! against it and sends a `create_case_task` request on the fabric.

use axum::{extract::Path, routing::post, Json, Router};
use serde_json::{json, Value};
use std::time::Duration;

use hive_bridge::config::parse_config;
use hive_bridge::fabric::{Fabric, Request};
use hive_bridge::service::{topic_for, Operation};
use hive_bridge::Application;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let upstream = Router::new().route(
        "/api/case/{id}/task",
        post(|Path(case_id): Path<String>, Json(task): Json<Value>| async move {
            Json(json!({"id": "567890", "caseId": case_id, "title": task["title"], "status": task["status"]}))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    tokio::spawn(async move {
        let _ = axum::serve(listener, upstream).await;
    });

    let config = parse_config(&format!(
        r#"
        [general]
        host = "127.0.0.1"
        port = {port}
        use_ssl = false
        api_names = ["create_case_task"]
        api_principal = "demo-api-key"
        "#
    ))?;
    let app = Application::build(config)?;

    let topic = topic_for(Operation::CreateCaseTask, None);
    let request = Request::json(
        topic.as_str(),
        &json!({"caseId": "123456", "title": "Collect triage package", "status": "InProgress"}),
    )?;
    println!("Sending request {} on {}", request.message_id, topic);

    let response = app.fabric().sync_request(request, Duration::from_secs(10)).await?;
    if response.is_error() {
        println!(
            "Error (code {:?}): {}",
            response.error_code(),
            response.error_message().unwrap_or_default()
        );
    } else {
        let task: Value = response.json()?;
        println!("Created task:\n{}", serde_json::to_string_pretty(&task)?);
    }
    Ok(())
}
