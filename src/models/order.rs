use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::partner::GeoPoint;

/// Code accepted for orders that were seeded without their own delivery code.
pub const DEFAULT_DELIVERY_CODE: &str = "1234";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    Assigned,
    Accepted,
    PickedUp,
    EnRoute,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Assigned,
        OrderStatus::Accepted,
        OrderStatus::PickedUp,
        OrderStatus::EnRoute,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Assigned => "assigned",
            OrderStatus::Accepted => "accepted",
            OrderStatus::PickedUp => "pickedUp",
            OrderStatus::EnRoute => "enRoute",
            OrderStatus::Delivered => "delivered",
        }
    }

    /// Statuses reachable in one step from `self`. `Delivered` is terminal.
    pub fn allowed_next(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Assigned => &[OrderStatus::Accepted],
            OrderStatus::Accepted => &[OrderStatus::PickedUp],
            OrderStatus::PickedUp => &[OrderStatus::EnRoute],
            OrderStatus::EnRoute => &[OrderStatus::Delivered],
            OrderStatus::Delivered => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    /// Position in the lifecycle, starting at 0 for `Assigned`.
    pub fn step(&self) -> usize {
        match self {
            OrderStatus::Assigned => 0,
            OrderStatus::Accepted => 1,
            OrderStatus::PickedUp => 2,
            OrderStatus::EnRoute => 3,
            OrderStatus::Delivered => 4,
        }
    }

    /// Accepted through en route: the order occupies the partner.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            OrderStatus::Accepted | OrderStatus::PickedUp | OrderStatus::EnRoute
        )
    }

    pub fn is_picked_up(&self) -> bool {
        self.step() >= OrderStatus::PickedUp.step()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    pub delivery_partner_id: Option<String>,
    pub status: OrderStatus,
    pub delivery_address: String,
    pub location_coordinates: GeoPoint,
    pub weight: String,
    pub time_slot: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picked_up_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_notes: Option<String>,
    pub pickup_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_otp: Option<String>,
}

impl Order {
    /// Plain-text comparison against the code the customer reads out.
    pub fn verify_delivery_code(&self, code: &str) -> bool {
        let expected = self.delivery_otp.as_deref().unwrap_or(DEFAULT_DELIVERY_CODE);
        code.trim() == expected
    }
}
