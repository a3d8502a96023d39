/// End-to-end tests for the HTTP surface
/// Drives the router in-process with the solar provider and webhook mocked
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use solar_lead_relay::config::Config;
use solar_lead_relay::handlers::AppState;
use solar_lead_relay::router::{build_router, MAX_BODY_BYTES};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(solar_api_base_url: String, webhook_url: Option<String>) -> Config {
    Config {
        port: 8080,
        google_solar_api_key: Some("test_key".to_string()),
        webhook_url,
        allowed_origins: vec!["https://solar.example.com".to_string()],
        solar_api_base_url,
        required_quality: "HIGH".to_string(),
    }
}

fn app(config: Config) -> Router {
    build_router(Arc::new(AppState::new(config)))
}

fn valid_submission() -> Value {
    json!({
        "userInfo": {"name": "Ana Lima", "phone": "555-0100", "email": "ana@example.com"},
        "location": {"address": "1600 Amphitheatre Pkwy", "latitude": 37.4219, "longitude": -122.0841},
        "propertyInfo": {"isOwner": true, "monthlyElectricityBill": "150"}
    })
}

fn insights_document() -> Value {
    json!({
        "name": "buildings/ChIJtest",
        "solarPotential": {
            "maxArrayPanelsCount": 30,
            "maxArrayAreaMeters2": 55.5,
            "panelCapacityWatts": 400,
            "financialAnalyses": [
                {
                    "monthlyBill": {"currencyCode": "USD", "units": "100"},
                    "panelConfigIndex": 0,
                    "cashPurchaseSavings": {"upfrontCost": {"units": "20000"}}
                },
                {
                    "monthlyBill": {"currencyCode": "USD", "units": "155"},
                    "panelConfigIndex": 1,
                    "leasingSavings": {"annualLeasingCost": {"units": "1200"}}
                }
            ],
            "solarPanelConfigs": [{"panelsCount": 8}, {"panelsCount": 12}]
        }
    })
}

async fn mock_provider(body: Value) -> MockServer {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/buildingInsights:findClosest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&provider)
        .await;
    provider
}

async fn post_json(app: Router, body: String) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_root_and_health() {
    let app = app(create_test_config("http://localhost:1".to_string(), None));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_submission_forwarded_to_webhook() {
    let provider = mock_provider(insights_document()).await;
    let webhook = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&webhook)
        .await;

    let config = create_test_config(provider.uri(), Some(format!("{}/hook", webhook.uri())));
    let (status, body) = post_json(app(config), valid_submission().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["webhookResult"]["success"], true);
    assert_eq!(body["webhookResult"]["status"], 200);
    assert_eq!(body["userInfo"]["name"], "Ana Lima");
    assert_eq!(body["propertyInfo"]["monthlyElectricityBill"], 150.0);
    assert_eq!(body["propertyInfo"]["isOwner"], true);
    assert!(body["timestamp"].is_string());

    let analysis = &body["solarAnalysis"];
    assert_eq!(analysis["electricityBillInfo"]["matchedBill"], 155.0);
    assert_eq!(analysis["recommendedPanels"], 12);
    assert_eq!(analysis["financingOptions"]["lease"]["annualLeasingCost"], 1200);
    assert!(analysis["financingOptions"].get("cash").is_none());

    // The forwarded document is the response minus the delivery outcome
    let received = webhook.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let forwarded: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert!(forwarded.get("webhookResult").is_none());
    assert_eq!(forwarded["submissionId"], body["submissionId"]);
    assert_eq!(forwarded["solarAnalysis"], body["solarAnalysis"]);
}

#[tokio::test]
async fn test_missing_webhook_url_is_not_fatal() {
    let provider = mock_provider(insights_document()).await;
    let config = create_test_config(provider.uri(), None);

    let (status, body) = post_json(app(config), valid_submission().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["webhookResult"]["success"], false);
    assert_eq!(body["webhookResult"]["message"], "Webhook URL not configured");
}

#[tokio::test]
async fn test_webhook_failure_is_not_fatal() {
    let provider = mock_provider(insights_document()).await;
    let webhook = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&webhook)
        .await;

    let config = create_test_config(provider.uri(), Some(webhook.uri()));
    let (status, body) = post_json(app(config), valid_submission().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["webhookResult"]["success"], false);
    assert_eq!(body["webhookResult"]["status"], 503);
}

#[tokio::test]
async fn test_validation_errors() {
    let config = create_test_config("http://localhost:1".to_string(), None);

    let mut missing_section = valid_submission();
    missing_section.as_object_mut().unwrap().remove("userInfo");

    let mut missing_longitude = valid_submission();
    missing_longitude["location"]
        .as_object_mut()
        .unwrap()
        .remove("longitude");

    let mut bad_bill = valid_submission();
    bad_bill["propertyInfo"]["monthlyElectricityBill"] = json!("about 150");

    for submission in [missing_section, missing_longitude, bad_bill] {
        let (status, body) = post_json(app(config.clone()), submission.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "submission: {}", submission);
        assert!(body["error"].is_string());
    }

    let (status, _) = post_json(app(config), "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_api_key_is_server_error() {
    let mut config = create_test_config("http://localhost:1".to_string(), None);
    config.google_solar_api_key = None;

    let (status, body) = post_json(app(config), valid_submission().to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Google Solar API key is not configured");
}

#[tokio::test]
async fn test_provider_failure_is_server_error() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&provider)
        .await;

    let config = create_test_config(provider.uri(), None);
    let (status, body) = post_json(app(config), valid_submission().to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Failed to fetch solar data for the provided location"
    );
}

#[tokio::test]
async fn test_unusable_insights_reported_in_band() {
    let provider = mock_provider(json!({"name": "buildings/empty"})).await;
    let config = create_test_config(provider.uri(), None);

    let (status, body) = post_json(app(config), valid_submission().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["solarAnalysis"],
        json!({"error": "invalid or missing solar potential data"})
    );
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let config = create_test_config("http://localhost:1".to_string(), None);
    let oversized = format!("{{\"padding\": \"{}\"}}", "x".repeat(MAX_BODY_BYTES + 1));

    let response = app(config)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::CONTENT_LENGTH, oversized.len())
                .body(Body::from(oversized))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_cors_allows_configured_origin_only() {
    let app = app(create_test_config("http://localhost:1".to_string(), None));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::ORIGIN, "https://solar.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "https://solar.example.com"
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::ORIGIN, "https://evil.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
