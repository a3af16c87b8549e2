//! Integration test: Server API endpoints

use axum::body::Body;
use axum::http::{Request, StatusCode};
use flowsight::data::FlowDataset;
use flowsight::model::{ActionClassifier, Artifacts, LabelEncoder, TreeNode};
use flowsight::server::{create_router, AppState, ServerConfig};
use http_body_util::BodyExt;
use std::io::Write;
use std::sync::Arc;
use tower::ServiceExt;

/// Stump splitting on the "Bytes" column (schema index 4):
/// Bytes <= 750 -> allow (0), else deny (1).
fn write_fixtures(dir: &std::path::Path) -> ServerConfig {
    let root = TreeNode::Split {
        feature_idx: 4,
        threshold: 750.0,
        left: Box::new(TreeNode::Leaf {
            class: 0,
            n_samples: 3,
        }),
        right: Box::new(TreeNode::Leaf {
            class: 1,
            n_samples: 2,
        }),
    };
    let classifier = ActionClassifier::from_parts(root, 11, vec![0, 1]).unwrap();
    let model_path = dir.join("model.json");
    classifier.save(&model_path).unwrap();

    let encoder = LabelEncoder::new(vec!["allow".to_string(), "deny".to_string()]);
    let encoder_path = dir.join("label_encoder.json");
    encoder.save(&encoder_path).unwrap();

    let dataset_path = dir.join("log2.csv");
    let mut file = std::fs::File::create(&dataset_path).unwrap();
    writeln!(
        file,
        "Source Port,Destination Port,NAT Source Port,NAT Destination Port,Bytes,Bytes Sent,Bytes Received,Packets,Elapsed Time (sec),pkts_sent,pkts_received,Action"
    )
    .unwrap();
    for bytes in [100, 200, 300] {
        writeln!(file, "1000,443,2000,443,{},50,50,4,30,2,2,allow", bytes).unwrap();
    }
    for bytes in [900, 1000] {
        writeln!(file, "1000,443,2000,443,{},450,450,9,30,5,4,deny", bytes).unwrap();
    }

    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        model_path: model_path.to_str().unwrap().to_string(),
        encoder_path: encoder_path.to_str().unwrap().to_string(),
        dataset_path: dataset_path.to_str().unwrap().to_string(),
    }
}

fn test_app(dir: &std::path::Path) -> axum::Router {
    let config = write_fixtures(dir);
    let artifacts = Artifacts::load(&config.model_path, &config.encoder_path).unwrap();
    let dataset = FlowDataset::load(&config.dataset_path, &artifacts.encoder).unwrap();
    let state = Arc::new(AppState::new(config, artifacts, dataset));
    create_router(state)
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

async fn post_json(app: axum::Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value =
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn default_form_body() -> serde_json::Value {
    serde_json::json!({
        "Source Port": 12345,
        "Destination Port": 443,
        "NAT Source Port": 56789,
        "NAT Destination Port": 443,
        "Bytes": 1000,
        "Bytes Sent": 500,
        "Bytes Received": 500,
        "Packets": 10,
        "Elapsed Time (sec)": 60,
        "pkts_sent": 5,
        "pkts_received": 5
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let (status, json) = get_json(test_app(dir.path()), "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["rows"], 5);
    assert_eq!(json["classes"], serde_json::json!(["allow", "deny"]));
    assert_eq!(json["encoded_provenance"], "derived");
}

#[tokio::test]
async fn test_root_serves_html() {
    let dir = tempfile::tempdir().unwrap();
    let response = test_app(dir.path())
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains("Network Traffic Action Predictor"));
}

#[tokio::test]
async fn test_data_preview_returns_head_rows() {
    let dir = tempfile::tempdir().unwrap();
    let (status, json) = get_json(test_app(dir.path()), "/api/data/preview").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["rows"], 5);
    let names: Vec<&str> = json["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Action"));
    assert!(names.contains(&"Bytes"));
}

#[tokio::test]
async fn test_action_distribution_descending_counts() {
    let dir = tempfile::tempdir().unwrap();
    let (status, json) = get_json(test_app(dir.path()), "/api/data/distribution").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["labels"], serde_json::json!(["allow", "deny"]));
    assert_eq!(json["counts"], serde_json::json!([3, 2]));
}

#[tokio::test]
async fn test_scatter_covers_full_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let (status, json) = get_json(test_app(dir.path()), "/api/data/scatter").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["points"].as_array().unwrap().len(), 5);
    assert_eq!(json["points"][0]["action"], "allow");
}

#[tokio::test]
async fn test_predict_default_values() {
    let dir = tempfile::tempdir().unwrap();
    let (status, json) = post_json(test_app(dir.path()), "/api/predict", default_form_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    // Default Bytes=1000 > 750 -> deny
    assert_eq!(json["prediction"], "deny");
    assert_eq!(json["prediction_display"], "DENY");
    assert_eq!(json["inputs"].as_array().unwrap().len(), 11);
    assert_eq!(json["inputs"][0]["field"], "Source Port");
    assert_eq!(json["inputs"][0]["value"], 12345.0);
}

#[tokio::test]
async fn test_predict_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let (_, first) = post_json(test_app(dir.path()), "/api/predict", default_form_body()).await;
    let (_, second) = post_json(test_app(dir.path()), "/api/predict", default_form_body()).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_predict_rejects_incomplete_body() {
    let dir = tempfile::tempdir().unwrap();
    let (status, _) = post_json(
        test_app(dir.path()),
        "/api/predict",
        serde_json::json!({ "Bytes": 1000 }),
    )
    .await;
    assert!(
        status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY,
        "unexpected status: {}",
        status
    );
}

#[tokio::test]
async fn test_predict_rejects_unknown_field() {
    let dir = tempfile::tempdir().unwrap();
    let mut body = default_form_body();
    body.as_object_mut()
        .unwrap()
        .insert("Totally Unknown Field".to_string(), serde_json::json!(999));
    let (status, _) = post_json(test_app(dir.path()), "/api/predict", body).await;
    assert!(
        status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY,
        "unexpected status: {}",
        status
    );
}

#[tokio::test]
async fn test_evaluation_confusion_matrix() {
    let dir = tempfile::tempdir().unwrap();
    let (status, json) = get_json(test_app(dir.path()), "/api/evaluation").await;

    assert_eq!(status, StatusCode::OK);
    // The stump perfectly separates the fixture dataset
    assert_eq!(json["matrix"], serde_json::json!([[3, 0], [0, 2]]));
    assert_eq!(json["class_names"], serde_json::json!(["allow", "deny"]));
    assert_eq!(json["report"]["accuracy"], 1.0);

    let support_sum: u64 = json["report"]["per_class"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["support"].as_u64().unwrap())
        .sum();
    assert_eq!(support_sum, 5);

    let text = json["report_text"].as_str().unwrap();
    assert!(text.contains("allow"));
    assert!(text.contains("weighted avg"));
}

#[tokio::test]
async fn test_evaluation_is_repeatable_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());
    let (_, first) = get_json(app.clone(), "/api/evaluation").await;
    let (_, second) = get_json(app, "/api/evaluation").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_evaluation_is_repeatable_across_recomputation() {
    // Two independent states, so each computes its own evaluation from scratch
    let dir = tempfile::tempdir().unwrap();
    let (_, first) = get_json(test_app(dir.path()), "/api/evaluation").await;
    let (_, second) = get_json(test_app(dir.path()), "/api/evaluation").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unknown_route_404() {
    let dir = tempfile::tempdir().unwrap();
    let (status, json) = get_json(test_app(dir.path()), "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], true);
}

#[tokio::test]
async fn test_predict_get_is_method_not_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let (status, _) = get_json(test_app(dir.path()), "/api/predict").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
