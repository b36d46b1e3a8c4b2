//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use quotelens_core::{InferenceService, fixtures};
use quotelens_services::{ApiState, build_router};
use quotelens_types::config::{InferenceConfig, ServerConfig};

fn router_with(server: &ServerConfig) -> axum::Router {
    let service = InferenceService::new(
        Arc::new(fixtures::bundle()),
        Arc::new(fixtures::model()),
        InferenceConfig::default(),
    )
    .expect("fixture service");
    build_router(ApiState::new(Arc::new(service)), server)
}

fn router() -> axum::Router {
    router_with(&ServerConfig::default())
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    serde_json::from_str(&body_string(resp).await).unwrap()
}

fn multipart(field: &str, csv: &str) -> Request<Body> {
    let boundary = "quotelens-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"quotes.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {csv}\r\n\
         --{boundary}--\r\n"
    );
    Request::post("/data")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn predict_request(csv: String) -> Request<Body> {
    Request::post("/api/predict")
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(csv))
        .unwrap()
}

// ── Browser flow ────────────────────────────────────────────────────────

#[tokio::test]
async fn index_serves_upload_form() {
    let resp = router()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("name=\"file\""));
}

#[tokio::test]
async fn upload_renders_verdict() {
    let resp = router()
        .oneshot(multipart("file", &fixtures::csv_upload()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Quote 1: Churned"), "{html}");
}

#[tokio::test]
async fn upload_with_missing_column_is_400_page() {
    let resp = router()
        .oneshot(multipart("file", "QuoteNumber,Original_Quote_Date\n1,2023-07-15\n"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let html = body_string(resp).await;
    assert!(html.contains("Could not score this file"));
}

#[tokio::test]
async fn upload_without_file_field_is_400() {
    let resp = router()
        .oneshot(multipart("attachment", &fixtures::csv_upload()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── JSON API ────────────────────────────────────────────────────────────

#[tokio::test]
async fn predict_returns_label_and_probability() {
    let resp = router()
        .oneshot(predict_request(fixtures::csv_upload()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    let first = &json[0];
    assert_eq!(first["quote_number"], "1");
    assert_eq!(first["label"], 1);
    let p = first["probability"].as_f64().unwrap();
    assert!((p - 1.0 / (1.0 + (-1.3f64).exp())).abs() < 1e-9);
}

#[tokio::test]
async fn predict_rejects_malformed_date_with_422() {
    let csv = fixtures::csv_upload().replace("2023-07-15", "July 15th");
    let resp = router().oneshot(predict_request(csv)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "validation");
    assert!(json["message"].as_str().unwrap().contains("Original_Quote_Date"));
}

#[tokio::test]
async fn predict_rejects_missing_column_with_422() {
    let csv = fixtures::csv_upload().replacen("CoverageField2B", "Other", 1);
    let resp = router().oneshot(predict_request(csv)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(resp).await["error"], "schema");
}

#[tokio::test]
async fn server_keeps_serving_after_rejection() {
    let app = router();
    let bad = fixtures::csv_upload().replace("2023-07-15", "nope");
    let resp = app.clone().oneshot(predict_request(bad)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let resp = app.oneshot(predict_request(fixtures::csv_upload())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let server = ServerConfig {
        max_upload_bytes: 64,
        ..Default::default()
    };
    let resp = router_with(&server)
        .oneshot(predict_request(fixtures::csv_upload()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn health_reports_feature_count() {
    let resp = router()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["features"], fixtures::FEATURE_COUNT);
}

#[tokio::test]
async fn schema_lists_ordered_columns() {
    let resp = router()
        .oneshot(Request::get("/api/schema").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(resp).await;
    let columns = json["columns"].as_array().unwrap();
    assert_eq!(columns.len(), fixtures::FEATURE_COUNT);
    assert_eq!(columns[0]["name"], "Field7");
    assert_eq!(columns[0]["kind"], "passthrough");
    assert_eq!(columns.last().unwrap()["name"], "GeographicField63_Y");
}
