use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};

use crate::models::order::OrderStatus;

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub status_transitions_total: IntCounterVec,
    pub location_updates_total: IntCounter,
    pub orders_by_status: IntGaugeVec,
    pub partner_online: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let status_transitions_total = IntCounterVec::new(
            Opts::new(
                "status_transitions_total",
                "Order status transitions by target status and outcome",
            ),
            &["status", "outcome"],
        )
        .expect("valid status_transitions_total metric");

        let location_updates_total =
            IntCounter::new("location_updates_total", "Partner location updates received")
                .expect("valid location_updates_total metric");

        let orders_by_status = IntGaugeVec::new(
            Opts::new("orders_by_status", "Current number of orders in each status"),
            &["status"],
        )
        .expect("valid orders_by_status metric");

        let partner_online = IntGauge::new("partner_online", "1 while the partner is online")
            .expect("valid partner_online metric");

        registry
            .register(Box::new(status_transitions_total.clone()))
            .expect("register status_transitions_total");
        registry
            .register(Box::new(location_updates_total.clone()))
            .expect("register location_updates_total");
        registry
            .register(Box::new(orders_by_status.clone()))
            .expect("register orders_by_status");
        registry
            .register(Box::new(partner_online.clone()))
            .expect("register partner_online");

        Self {
            registry,
            status_transitions_total,
            location_updates_total,
            orders_by_status,
            partner_online,
        }
    }

    pub fn record_transition(&self, status: OrderStatus, outcome: &str) {
        self.status_transitions_total
            .with_label_values(&[status.as_str(), outcome])
            .inc();
    }

    pub fn set_order_count(&self, status: OrderStatus, count: usize) {
        self.orders_by_status
            .with_label_values(&[status.as_str()])
            .set(count as i64);
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
