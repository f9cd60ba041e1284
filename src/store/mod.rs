pub mod blob;
pub mod clock;
pub mod error;
pub mod orders;
pub mod partner;
pub mod seed;
pub mod transition;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::models::order::{Order, OrderStatus};
use crate::models::partner::{DeliveryPartner, PartnerUpdate};
use crate::store::blob::BlobStore;
use crate::store::clock::Clock;
use crate::store::error::{StoreError, TransitionError};
use crate::store::orders::OrderStore;
use crate::store::partner::PartnerStore;
use crate::store::transition::TransitionPolicy;

pub const PARTNER_KEY: &str = "partner";
pub const ORDERS_KEY: &str = "orders";

/// The partner record and the order collection, persisted together after
/// every mutation. The two keys are written one after the other, so a crash
/// between them can leave the snapshot mutually stale.
pub struct DeliveryStore {
    partner: PartnerStore,
    orders: OrderStore,
    blobs: Box<dyn BlobStore>,
    clock: Box<dyn Clock>,
    policy: TransitionPolicy,
    persist_failures: u64,
}

impl DeliveryStore {
    /// Loads both keys, falling back to seed data for any key that is missing
    /// or fails to parse.
    pub fn open(
        blobs: Box<dyn BlobStore>,
        clock: Box<dyn Clock>,
        policy: TransitionPolicy,
    ) -> Self {
        let now = clock.now();
        let partner = load_or_seed(blobs.as_ref(), PARTNER_KEY, seed::default_partner);
        let orders = load_or_seed(blobs.as_ref(), ORDERS_KEY, || seed::default_orders(now));

        info!(
            partner_id = %partner.id,
            orders = orders.len(),
            policy = ?policy,
            "delivery store opened"
        );

        Self {
            partner: PartnerStore::new(partner),
            orders: OrderStore::new(orders),
            blobs,
            clock,
            policy,
            persist_failures: 0,
        }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub fn persist_failures(&self) -> u64 {
        self.persist_failures
    }

    pub fn get_partner(&self) -> DeliveryPartner {
        self.partner.get().clone()
    }

    pub fn update_partner(&mut self, update: PartnerUpdate) -> DeliveryPartner {
        let partner = self.partner.update(update).clone();
        self.persist();
        partner
    }

    pub fn update_location(&mut self, lat: f64, lng: f64) {
        self.partner.update(PartnerUpdate::location(lat, lng));
        self.persist();
    }

    pub fn toggle_status(&mut self) -> DeliveryPartner {
        let next = self.partner.get().status.toggled();
        info!(status = next.as_str(), "partner status toggled");
        self.update_partner(PartnerUpdate::status(next))
    }

    pub fn get_orders(&self) -> Vec<Order> {
        self.orders.all().to_vec()
    }

    pub fn get_order_by_id(&self, id: &str) -> Option<Order> {
        self.orders.get(id).cloned()
    }

    pub fn orders_with_status(&self, status: OrderStatus) -> Vec<Order> {
        self.orders.with_status(status).cloned().collect()
    }

    pub fn count_by_status(&self, status: OrderStatus) -> usize {
        self.orders.count_by_status(status)
    }

    pub fn active_order(&self) -> Option<Order> {
        let id = self.partner.get().active_order_id.as_deref()?;
        self.get_order_by_id(id)
    }

    pub fn delivered_orders(&self) -> Vec<Order> {
        self.orders_with_status(OrderStatus::Delivered)
    }

    pub fn lifetime_earnings(&self) -> f64 {
        self.partner.lifetime_earnings()
    }

    /// Applies `next` to the order and its side effects to the partner, then
    /// persists both. An unknown order id yields `Ok(None)` without mutation.
    pub fn transition_status(
        &mut self,
        order_id: &str,
        next: OrderStatus,
    ) -> Result<Option<Order>, TransitionError> {
        if self.policy.is_strict() && next == OrderStatus::Accepted {
            if let Some(active) = self.partner.get().active_order_id.as_deref() {
                if active != order_id && self.orders.get(order_id).is_some() {
                    return Err(TransitionError::PartnerBusy {
                        active_order_id: active.to_string(),
                    });
                }
            }
        }

        let now = self.clock.now();
        let partner_id = self.partner.get().id.clone();
        let Some(order) = self
            .orders
            .transition(order_id, next, self.policy, &partner_id, now)?
        else {
            debug!(order_id, "transition requested for unknown order");
            return Ok(None);
        };

        self.partner.record_transition(order_id, next);
        self.persist();

        info!(order_id, status = %next, "order status updated");
        Ok(Some(order))
    }

    /// Checks the customer's code before completing the delivery.
    pub fn complete_delivery(
        &mut self,
        order_id: &str,
        code: &str,
    ) -> Result<Option<Order>, TransitionError> {
        let Some(order) = self.orders.get(order_id) else {
            return Ok(None);
        };

        if !order.verify_delivery_code(code) {
            warn!(order_id, "delivery code mismatch");
            return Err(TransitionError::CodeMismatch {
                order_id: order_id.to_string(),
            });
        }

        self.transition_status(order_id, OrderStatus::Delivered)
    }

    fn persist(&mut self) {
        if let Err(err) = self.try_persist() {
            self.persist_failures += 1;
            error!(error = %err, "failed to persist delivery snapshot");
        }
    }

    fn try_persist(&self) -> Result<(), StoreError> {
        write_json(self.blobs.as_ref(), ORDERS_KEY, self.orders.all())?;
        write_json(self.blobs.as_ref(), PARTNER_KEY, self.partner.get())
    }
}

fn write_json<T: Serialize + ?Sized>(
    blobs: &dyn BlobStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    blobs.set(key, &bytes)
}

fn load_or_seed<T, F>(blobs: &dyn BlobStore, key: &str, seed: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match blobs.get(key) {
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "stored snapshot is malformed; using seed data");
                seed()
            }
        },
        Ok(None) => {
            debug!(key, "no stored snapshot; using seed data");
            seed()
        }
        Err(err) => {
            warn!(key, error = %err, "failed to read snapshot; using seed data");
            seed()
        }
    }
}
