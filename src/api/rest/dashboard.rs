use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::get;
use serde::Serialize;

use crate::error::AppError;
use crate::models::order::{Order, OrderStatus};
use crate::models::partner::DeliveryPartner;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/history", get(history))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub partner: DeliveryPartner,
    pub assigned_orders: Vec<Order>,
    pub active_order: Option<Order>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryView {
    pub delivered_orders: Vec<Order>,
    pub total_delivered: u32,
    pub lifetime_earnings: f64,
    pub earnings_today: f64,
}

async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Json<DashboardView>, AppError> {
    let store = state.store()?;
    Ok(Json(DashboardView {
        partner: store.get_partner(),
        assigned_orders: store.orders_with_status(OrderStatus::Assigned),
        active_order: store.active_order(),
    }))
}

async fn history(State(state): State<Arc<AppState>>) -> Result<Json<HistoryView>, AppError> {
    let store = state.store()?;
    let partner = store.get_partner();
    Ok(Json(HistoryView {
        delivered_orders: store.delivered_orders(),
        total_delivered: partner.total_delivered,
        lifetime_earnings: store.lifetime_earnings(),
        earnings_today: partner.earnings_today,
    }))
}
