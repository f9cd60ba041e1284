use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use delivery_partner::api::rest::router;
use delivery_partner::state::AppState;
use delivery_partner::store::DeliveryStore;
use delivery_partner::store::blob::MemoryBlobStore;
use delivery_partner::store::clock::FixedClock;
use delivery_partner::store::transition::TransitionPolicy;
use serde_json::{Value, json};
use tower::ServiceExt;

fn store_with(blobs: &MemoryBlobStore, policy: TransitionPolicy) -> DeliveryStore {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    DeliveryStore::open(Box::new(blobs.clone()), Box::new(FixedClock(now)), policy)
}

fn setup() -> axum::Router {
    let blobs = MemoryBlobStore::new();
    let state = AppState::new(store_with(&blobs, TransitionPolicy::Strict), 1024);
    router(Arc::new(state))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn set_status(app: &axum::Router, id: &str, status: &str) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            &format!("/orders/{id}/status"),
            json!({ "status": status }),
        ))
        .await
        .unwrap()
}

async fn go_online(app: &axum::Router) {
    let res = app
        .clone()
        .oneshot(post_empty("/partner/toggle-status"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["status"], "active");
}

#[tokio::test]
async fn health_returns_ok() {
    let app = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["orders"], 2);
    assert_eq!(body["activeOrders"], 0);
    assert_eq!(body["transitionPolicy"], "strict");
    assert_eq!(body["persistFailures"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let app = setup();
    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("partner_online"));
    assert!(body.contains("orders_by_status"));
}

#[tokio::test]
async fn seeded_partner_starts_offline() {
    let app = setup();
    let response = app.oneshot(get_request("/partner")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["id"], "DP_7788");
    assert_eq!(body["status"], "offline");
    assert_eq!(body["totalDelivered"], 142);
    assert!(body["activeOrderId"].is_null());
}

#[tokio::test]
async fn patch_partner_merges_fields() {
    let app = setup();
    let response = app
        .oneshot(json_request(
            "PATCH",
            "/partner",
            json!({ "currentLocation": { "lat": 12.95, "lng": 77.6 } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["currentLocation"]["lat"], 12.95);
    assert_eq!(body["currentLocation"]["lng"], 77.6);
    assert_eq!(body["status"], "offline");
}

#[tokio::test]
async fn empty_partner_patch_returns_400() {
    let app = setup();
    let response = app
        .oneshot(json_request("PATCH", "/partner", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn location_update_is_visible_on_partner() {
    let app = setup();
    let res = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/partner/location",
            json!({ "lat": 12.98, "lng": 77.61 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = app.oneshot(get_request("/partner")).await.unwrap();
    let body = body_json(res).await;
    assert_eq!(body["currentLocation"]["lat"], 12.98);
    assert_eq!(body["currentLocation"]["lng"], 77.61);
}

#[tokio::test]
async fn out_of_range_location_returns_400() {
    let app = setup();
    let res = app
        .oneshot(json_request(
            "PATCH",
            "/partner/location",
            json!({ "lat": 123.0, "lng": 77.61 }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn orders_keep_insertion_order_and_filter_by_status() {
    let app = setup();
    let res = app.clone().oneshot(get_request("/orders")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    let ids: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["PR-1029", "PR-1030"]);

    let res = app
        .oneshot(get_request("/orders?status=delivered"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn get_nonexistent_order_returns_404() {
    let app = setup();
    let response = app.oneshot(get_request("/orders/NOT-REAL")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn transition_on_unknown_order_returns_404() {
    let app = setup();
    let response = set_status(&app, "NOT-REAL", "accepted").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn accepting_while_offline_returns_409() {
    let app = setup();
    let response = set_status(&app, "PR-1029", "accepted").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let res = app.oneshot(get_request("/orders/PR-1029")).await.unwrap();
    assert_eq!(body_json(res).await["status"], "assigned");
}

#[tokio::test]
async fn skipping_a_step_returns_409() {
    let app = setup();
    go_online(&app).await;

    let response = set_status(&app, "PR-1029", "enRoute").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("illegal transition"));
}

#[tokio::test]
async fn wrong_delivery_code_returns_400() {
    let app = setup();
    go_online(&app).await;
    for status in ["accepted", "pickedUp", "enRoute"] {
        assert_eq!(set_status(&app, "PR-1029", status).await.status(), StatusCode::OK);
    }

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/orders/PR-1029/deliver",
            json!({ "code": "9999" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.oneshot(get_request("/orders/PR-1029")).await.unwrap();
    assert_eq!(body_json(res).await["status"], "enRoute");
}

#[tokio::test]
async fn tracking_reports_distance_and_step() {
    let app = setup();
    go_online(&app).await;
    set_status(&app, "PR-1029", "accepted").await;

    let res = app
        .oneshot(get_request("/orders/PR-1029/tracking"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    assert_eq!(body["status"], "accepted");
    assert_eq!(body["step"], 1);
    assert_eq!(body["totalSteps"], 5);
    assert_eq!(body["followPartner"], false);
    assert!(body["distanceKm"].as_f64().unwrap() > 1.0);
}

#[tokio::test]
async fn full_delivery_flow() {
    let app = setup();
    go_online(&app).await;

    let res = set_status(&app, "PR-1029", "accepted").await;
    assert_eq!(res.status(), StatusCode::OK);
    let order = body_json(res).await;
    assert_eq!(order["deliveryPartnerId"], "DP_7788");

    let res = app.clone().oneshot(get_request("/dashboard")).await.unwrap();
    let dashboard = body_json(res).await;
    assert_eq!(dashboard["partner"]["activeOrderId"], "PR-1029");
    assert_eq!(dashboard["activeOrder"]["id"], "PR-1029");
    assert_eq!(dashboard["assignedOrders"].as_array().unwrap().len(), 1);

    let res = set_status(&app, "PR-1029", "pickedUp").await;
    let order = body_json(res).await;
    assert!(order["pickedUpAt"].is_string());
    assert!(order.get("deliveredAt").is_none());

    let res = app.clone().oneshot(get_request("/partner")).await.unwrap();
    assert_eq!(body_json(res).await["earningsToday"], 0.0);

    set_status(&app, "PR-1029", "enRoute").await;

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/orders/PR-1029/deliver",
            json!({ "code": "1234" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let order = body_json(res).await;
    assert_eq!(order["status"], "delivered");
    assert!(order["deliveredAt"].is_string());

    let res = app.clone().oneshot(get_request("/partner")).await.unwrap();
    let partner = body_json(res).await;
    assert_eq!(partner["totalDelivered"], 143);
    assert_eq!(partner["earningsToday"], 45.0);
    assert!(partner["activeOrderId"].is_null());

    let res = app.clone().oneshot(get_request("/history")).await.unwrap();
    let history = body_json(res).await;
    assert_eq!(history["deliveredOrders"].as_array().unwrap().len(), 1);
    assert_eq!(history["deliveredOrders"][0]["id"], "PR-1029");
    assert_eq!(history["lifetimeEarnings"], 143.0 * 45.0);

    let res = app
        .oneshot(json_request(
            "POST",
            "/orders/PR-1029/deliver",
            json!({ "code": "1234" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn state_survives_restart() {
    let blobs = MemoryBlobStore::new();
    let app = router(Arc::new(AppState::new(
        store_with(&blobs, TransitionPolicy::Strict),
        16,
    )));
    go_online(&app).await;
    set_status(&app, "PR-1030", "accepted").await;

    let before_partner = body_json(app.clone().oneshot(get_request("/partner")).await.unwrap()).await;
    let before_orders = body_json(app.oneshot(get_request("/orders")).await.unwrap()).await;

    let restarted = router(Arc::new(AppState::new(
        store_with(&blobs, TransitionPolicy::Strict),
        16,
    )));
    let after_partner =
        body_json(restarted.clone().oneshot(get_request("/partner")).await.unwrap()).await;
    let after_orders = body_json(restarted.oneshot(get_request("/orders")).await.unwrap()).await;

    assert_eq!(after_partner, before_partner);
    assert_eq!(after_orders, before_orders);
}

#[tokio::test]
async fn permissive_policy_applies_unordered_transitions() {
    let blobs = MemoryBlobStore::new();
    let app = router(Arc::new(AppState::new(
        store_with(&blobs, TransitionPolicy::Permissive),
        16,
    )));

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/orders/PR-1030/deliver",
            json!({ "code": "5678" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["status"], "delivered");

    let res = app.oneshot(get_request("/partner")).await.unwrap();
    let partner = body_json(res).await;
    assert_eq!(partner["totalDelivered"], 143);
}

#[tokio::test]
async fn status_route_refuses_delivery_without_code() {
    for policy in [TransitionPolicy::Strict, TransitionPolicy::Permissive] {
        let blobs = MemoryBlobStore::new();
        let app = router(Arc::new(AppState::new(store_with(&blobs, policy), 16)));
        go_online(&app).await;
        for status in ["accepted", "pickedUp", "enRoute"] {
            assert_eq!(set_status(&app, "PR-1029", status).await.status(), StatusCode::OK);
        }

        let res = set_status(&app, "PR-1029", "delivered").await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert!(body["error"].as_str().unwrap().contains("/deliver"));

        let res = app.clone().oneshot(get_request("/partner")).await.unwrap();
        let partner = body_json(res).await;
        assert_eq!(partner["totalDelivered"], 142);
        assert_eq!(partner["earningsToday"], 0.0);
        assert_eq!(partner["activeOrderId"], "PR-1029");

        let res = app.oneshot(get_request("/orders/PR-1029")).await.unwrap();
        assert_eq!(body_json(res).await["status"], "enRoute");
    }
}

#[tokio::test]
async fn store_events_are_broadcast() {
    let blobs = MemoryBlobStore::new();
    let state = Arc::new(AppState::new(
        store_with(&blobs, TransitionPolicy::Strict),
        16,
    ));
    let mut rx = state.events_tx.subscribe();
    let app = router(state);

    go_online(&app).await;

    let event = serde_json::to_value(rx.recv().await.unwrap()).unwrap();
    assert_eq!(event["type"], "partnerUpdated");
    assert_eq!(event["partner"]["status"], "active");
    assert!(event["id"].is_string());
}
