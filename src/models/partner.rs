use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PartnerStatus {
    Active,
    Offline,
}

impl PartnerStatus {
    pub fn toggled(self) -> Self {
        match self {
            PartnerStatus::Active => PartnerStatus::Offline,
            PartnerStatus::Offline => PartnerStatus::Active,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PartnerStatus::Active => "active",
            PartnerStatus::Offline => "offline",
        }
    }
}

/// The courier operating this client. Identity fields never change after
/// creation; earnings, delivered count and the active-order pointer are only
/// written by order status transitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPartner {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub profile_image: String,
    pub status: PartnerStatus,
    pub current_location: GeoPoint,
    pub active_order_id: Option<String>,
    pub total_delivered: u32,
    pub earnings_today: f64,
    pub rating: f64,
}

/// Fields a caller may overwrite directly. Absent fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PartnerUpdate {
    pub status: Option<PartnerStatus>,
    pub current_location: Option<GeoPoint>,
}

impl PartnerUpdate {
    pub fn status(status: PartnerStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn location(lat: f64, lng: f64) -> Self {
        Self {
            current_location: Some(GeoPoint { lat, lng }),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.current_location.is_none()
    }
}

impl DeliveryPartner {
    pub fn apply(&mut self, update: PartnerUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(location) = update.current_location {
            self.current_location = location;
        }
    }

    pub fn is_online(&self) -> bool {
        self.status == PartnerStatus::Active
    }
}
