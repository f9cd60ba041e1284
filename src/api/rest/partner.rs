use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use tracing::info;

use crate::error::AppError;
use crate::models::event::StoreEvent;
use crate::models::partner::{DeliveryPartner, GeoPoint, PartnerUpdate};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/partner", get(get_partner).patch(update_partner))
        .route("/partner/toggle-status", post(toggle_status))
        .route("/partner/location", patch(update_location))
}

fn validate_location(location: &GeoPoint) -> Result<(), AppError> {
    let valid = location.lat.is_finite()
        && location.lng.is_finite()
        && (-90.0..=90.0).contains(&location.lat)
        && (-180.0..=180.0).contains(&location.lng);

    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "location out of range: {}, {}",
            location.lat, location.lng
        )))
    }
}

async fn get_partner(State(state): State<Arc<AppState>>) -> Result<Json<DeliveryPartner>, AppError> {
    Ok(Json(state.store()?.get_partner()))
}

async fn update_partner(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PartnerUpdate>,
) -> Result<Json<DeliveryPartner>, AppError> {
    if payload.is_empty() {
        return Err(AppError::BadRequest("no fields to update".to_string()));
    }
    if let Some(location) = &payload.current_location {
        validate_location(location)?;
    }

    let mut store = state.store()?;
    let partner = store.update_partner(payload);
    state.refresh_gauges(&store);
    state.publish(StoreEvent::PartnerUpdated {
        partner: partner.clone(),
    });

    Ok(Json(partner))
}

async fn toggle_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DeliveryPartner>, AppError> {
    let mut store = state.store()?;
    let partner = store.toggle_status();
    state.refresh_gauges(&store);
    state.publish(StoreEvent::PartnerUpdated {
        partner: partner.clone(),
    });

    info!(partner_id = %partner.id, status = partner.status.as_str(), "presence changed");
    Ok(Json(partner))
}

async fn update_location(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GeoPoint>,
) -> Result<StatusCode, AppError> {
    validate_location(&payload)?;

    let mut store = state.store()?;
    store.update_location(payload.lat, payload.lng);
    state.metrics.location_updates_total.inc();
    state.publish(StoreEvent::PartnerUpdated {
        partner: store.get_partner(),
    });

    Ok(StatusCode::NO_CONTENT)
}
