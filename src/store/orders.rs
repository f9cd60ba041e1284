use chrono::{DateTime, Utc};

use crate::models::order::{Order, OrderStatus};
use crate::store::error::TransitionError;
use crate::store::transition::TransitionPolicy;

#[derive(Debug, Clone)]
pub struct OrderStore {
    orders: Vec<Order>,
}

impl OrderStore {
    pub fn new(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    pub fn all(&self) -> &[Order] {
        &self.orders
    }

    pub fn get(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == id)
    }

    pub fn with_status(&self, status: OrderStatus) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(move |order| order.status == status)
    }

    pub fn count_by_status(&self, status: OrderStatus) -> usize {
        self.with_status(status).count()
    }

    /// Moves an order to `next` and stamps its milestone timestamps.
    /// Timestamps are only ever set once. Returns `Ok(None)` for an unknown id.
    pub fn transition(
        &mut self,
        order_id: &str,
        next: OrderStatus,
        policy: TransitionPolicy,
        partner_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Order>, TransitionError> {
        let Some(order) = self.orders.iter_mut().find(|order| order.id == order_id) else {
            return Ok(None);
        };

        policy.check(order.status, next)?;
        order.status = next;

        if next == OrderStatus::Accepted {
            order.delivery_partner_id = Some(partner_id.to_string());
        }
        if next.is_picked_up() && order.picked_up_at.is_none() {
            order.picked_up_at = Some(now);
        }
        if next == OrderStatus::Delivered && order.delivered_at.is_none() {
            order.delivered_at = Some(now);
        }

        Ok(Some(order.clone()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::OrderStore;
    use crate::models::order::OrderStatus;
    use crate::store::seed::default_orders;
    use crate::store::transition::TransitionPolicy;

    #[test]
    fn unknown_order_is_absent_and_untouched() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let mut store = OrderStore::new(default_orders(now));
        let before = store.all().to_vec();

        let result = store
            .transition("NOT-REAL", OrderStatus::Accepted, TransitionPolicy::Strict, "DP", now)
            .unwrap();

        assert!(result.is_none());
        assert_eq!(store.all(), before.as_slice());
    }

    #[test]
    fn timestamps_are_stamped_once() {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let t1 = t0 + Duration::minutes(10);
        let mut store = OrderStore::new(default_orders(t0));
        let policy = TransitionPolicy::Permissive;

        store.transition("PR-1029", OrderStatus::PickedUp, policy, "DP", t0).unwrap();
        let order = store
            .transition("PR-1029", OrderStatus::EnRoute, policy, "DP", t1)
            .unwrap()
            .unwrap();

        assert_eq!(order.picked_up_at, Some(t0));
        assert!(order.delivered_at.is_none());
    }

    #[test]
    fn permissive_jump_still_stamps_pickup() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let mut store = OrderStore::new(default_orders(now));

        let order = store
            .transition("PR-1030", OrderStatus::Delivered, TransitionPolicy::Permissive, "DP", now)
            .unwrap()
            .unwrap();

        assert_eq!(order.picked_up_at, Some(now));
        assert_eq!(order.delivered_at, Some(now));
    }

    #[test]
    fn accept_records_partner_on_order() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let mut store = OrderStore::new(default_orders(now));

        let order = store
            .transition("PR-1029", OrderStatus::Accepted, TransitionPolicy::Strict, "DP_7788", now)
            .unwrap()
            .unwrap();

        assert_eq!(order.delivery_partner_id.as_deref(), Some("DP_7788"));
        assert_eq!(store.count_by_status(OrderStatus::Assigned), 1);
    }
}
