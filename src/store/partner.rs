use crate::models::order::OrderStatus;
use crate::models::partner::{DeliveryPartner, PartnerUpdate};

/// Flat amount credited to the partner for each completed delivery.
pub const EARNINGS_PER_DELIVERY: f64 = 45.0;

#[derive(Debug, Clone)]
pub struct PartnerStore {
    partner: DeliveryPartner,
}

impl PartnerStore {
    pub fn new(partner: DeliveryPartner) -> Self {
        Self { partner }
    }

    pub fn get(&self) -> &DeliveryPartner {
        &self.partner
    }

    pub fn update(&mut self, update: PartnerUpdate) -> &DeliveryPartner {
        self.partner.apply(update);
        &self.partner
    }

    /// Side effects of an order reaching `status`. This is the only writer of
    /// earnings, delivered count and the active-order pointer.
    pub fn record_transition(&mut self, order_id: &str, status: OrderStatus) {
        match status {
            OrderStatus::Accepted => {
                self.partner.active_order_id = Some(order_id.to_string());
            }
            OrderStatus::Delivered => {
                self.partner.total_delivered = self.partner.total_delivered.saturating_add(1);
                self.partner.earnings_today += EARNINGS_PER_DELIVERY;
                self.partner.active_order_id = None;
            }
            OrderStatus::Assigned | OrderStatus::PickedUp | OrderStatus::EnRoute => {}
        }
    }

    /// Earnings over the partner's whole history at the flat delivery rate.
    pub fn lifetime_earnings(&self) -> f64 {
        f64::from(self.partner.total_delivered) * EARNINGS_PER_DELIVERY
    }
}
