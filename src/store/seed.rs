use chrono::{DateTime, Duration, Utc};

use crate::models::order::{Order, OrderStatus};
use crate::models::partner::{DeliveryPartner, GeoPoint, PartnerStatus};

const HUB_ADDRESS: &str = "Pureingo Central Hub, Domlur, Bangalore";
const FRUIT_BOX: &str = "450-500g Fruit Box";
const MORNING_SLOT: &str = "08:00 AM - 11:00 AM";

pub fn default_partner() -> DeliveryPartner {
    DeliveryPartner {
        id: "DP_7788".to_string(),
        name: "Rahul Sharma".to_string(),
        phone: "+91 98765 43210".to_string(),
        profile_image: "https://picsum.photos/seed/rahul/200".to_string(),
        status: PartnerStatus::Offline,
        current_location: GeoPoint {
            lat: 12.9716,
            lng: 77.5946,
        },
        active_order_id: None,
        total_delivered: 142,
        earnings_today: 0.0,
        rating: 4.8,
    }
}

pub fn default_orders(now: DateTime<Utc>) -> Vec<Order> {
    vec![
        Order {
            id: "PR-1029".to_string(),
            user_id: "U_112".to_string(),
            customer_name: "Sanjay Gupta".to_string(),
            customer_phone: "+91 88776 65544".to_string(),
            subscription_id: None,
            delivery_partner_id: None,
            status: OrderStatus::Assigned,
            delivery_address: "Flat 402, Green Valley Apartments, Indiranagar, Bangalore"
                .to_string(),
            location_coordinates: GeoPoint {
                lat: 12.9784,
                lng: 77.6408,
            },
            weight: FRUIT_BOX.to_string(),
            time_slot: MORNING_SLOT.to_string(),
            created_at: now - Duration::hours(1),
            picked_up_at: None,
            delivered_at: None,
            special_notes: Some("Leave at front desk if not available".to_string()),
            pickup_address: HUB_ADDRESS.to_string(),
            delivery_otp: Some("1234".to_string()),
        },
        Order {
            id: "PR-1030".to_string(),
            user_id: "U_113".to_string(),
            customer_name: "Anjali Menon".to_string(),
            customer_phone: "+91 77665 54433".to_string(),
            subscription_id: None,
            delivery_partner_id: None,
            status: OrderStatus::Assigned,
            delivery_address: "No. 12, 4th Cross, Koramangala 5th Block, Bangalore".to_string(),
            location_coordinates: GeoPoint {
                lat: 12.9352,
                lng: 77.6245,
            },
            weight: FRUIT_BOX.to_string(),
            time_slot: MORNING_SLOT.to_string(),
            created_at: now - Duration::minutes(30),
            picked_up_at: None,
            delivered_at: None,
            special_notes: None,
            pickup_address: HUB_ADDRESS.to_string(),
            delivery_otp: Some("5678".to_string()),
        },
    ]
}
