use std::sync::{Mutex, MutexGuard};

use tokio::sync::broadcast;

use crate::error::AppError;
use crate::models::event::{EventEnvelope, StoreEvent};
use crate::models::order::OrderStatus;
use crate::observability::metrics::Metrics;
use crate::store::DeliveryStore;

pub struct AppState {
    store: Mutex<DeliveryStore>,
    pub events_tx: broadcast::Sender<EventEnvelope>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(store: DeliveryStore, event_buffer_size: usize) -> Self {
        let (events_tx, _unused_rx) = broadcast::channel(event_buffer_size);
        let metrics = Metrics::new();
        refresh_gauges(&metrics, &store);

        Self {
            store: Mutex::new(store),
            events_tx,
            metrics,
        }
    }

    /// Store operations are synchronous; the guard must not be held across
    /// an `.await`.
    pub fn store(&self) -> Result<MutexGuard<'_, DeliveryStore>, AppError> {
        self.store
            .lock()
            .map_err(|_| AppError::Internal("delivery store lock poisoned".to_string()))
    }

    pub fn publish(&self, event: StoreEvent) {
        // No subscribers is the common case.
        let _ = self.events_tx.send(EventEnvelope::new(event));
    }

    pub fn refresh_gauges(&self, store: &DeliveryStore) {
        refresh_gauges(&self.metrics, store);
    }
}

fn refresh_gauges(metrics: &Metrics, store: &DeliveryStore) {
    for status in OrderStatus::ALL {
        metrics.set_order_count(status, store.count_by_status(status));
    }
    metrics
        .partner_online
        .set(i64::from(store.get_partner().is_online()));
}
