use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::geo::haversine_km;
use crate::models::event::StoreEvent;
use crate::models::order::{Order, OrderStatus};
use crate::models::partner::GeoPoint;
use crate::state::AppState;
use crate::store::DeliveryStore;
use crate::store::error::TransitionError;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/tracking", get(track_order))
        .route("/orders/:id/status", post(update_order_status))
        .route("/orders/:id/deliver", post(deliver_order))
}

#[derive(Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Deserialize)]
pub struct DeliverRequest {
    pub code: String,
}

/// Data behind the live order view: where the partner is, where the order
/// is going, and how far along the lifecycle it is.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingView {
    pub order_id: String,
    pub status: OrderStatus,
    pub step: usize,
    pub total_steps: usize,
    pub partner_location: GeoPoint,
    pub destination: GeoPoint,
    pub distance_km: f64,
    pub follow_partner: bool,
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("order {id} not found"))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<Order>>, AppError> {
    let store = state.store()?;
    let orders = match filter.status {
        Some(status) => store.orders_with_status(status),
        None => store.get_orders(),
    };
    Ok(Json(orders))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    let order = state.store()?.get_order_by_id(&id).ok_or_else(|| not_found(&id))?;
    Ok(Json(order))
}

async fn track_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TrackingView>, AppError> {
    let store = state.store()?;
    let order = store.get_order_by_id(&id).ok_or_else(|| not_found(&id))?;
    let partner_location = store.get_partner().current_location;

    Ok(Json(TrackingView {
        order_id: order.id,
        status: order.status,
        step: order.status.step(),
        total_steps: OrderStatus::ALL.len(),
        partner_location,
        destination: order.location_coordinates,
        distance_km: haversine_km(&partner_location, &order.location_coordinates),
        follow_partner: order.status == OrderStatus::EnRoute,
    }))
}

async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let mut store = state.store()?;
    if store.get_order_by_id(&id).is_none() {
        return Err(not_found(&id));
    }

    // Completion needs the customer's code.
    if payload.status == OrderStatus::Delivered {
        state.metrics.record_transition(payload.status, "rejected");
        return Err(AppError::BadRequest(format!(
            "order {id} can only be delivered via /orders/{id}/deliver"
        )));
    }

    if payload.status == OrderStatus::Accepted && !store.get_partner().is_online() {
        state.metrics.record_transition(payload.status, "rejected");
        return Err(AppError::PartnerOffline);
    }

    let result = store.transition_status(&id, payload.status);
    finish_transition(&state, &store, &id, payload.status, result)
}

async fn deliver_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<DeliverRequest>,
) -> Result<Json<Order>, AppError> {
    if payload.code.trim().is_empty() {
        return Err(AppError::BadRequest("delivery code cannot be empty".to_string()));
    }

    let mut store = state.store()?;
    let result = store.complete_delivery(&id, &payload.code);
    finish_transition(&state, &store, &id, OrderStatus::Delivered, result)
}

fn finish_transition(
    state: &AppState,
    store: &DeliveryStore,
    id: &str,
    status: OrderStatus,
    result: Result<Option<Order>, TransitionError>,
) -> Result<Json<Order>, AppError> {
    match result {
        Ok(Some(order)) => {
            state.metrics.record_transition(status, "applied");
            state.refresh_gauges(store);
            state.publish(StoreEvent::OrderUpdated {
                order: order.clone(),
            });
            state.publish(StoreEvent::PartnerUpdated {
                partner: store.get_partner(),
            });
            Ok(Json(order))
        }
        Ok(None) => Err(not_found(id)),
        Err(err) => {
            state.metrics.record_transition(status, "rejected");
            Err(err.into())
        }
    }
}
