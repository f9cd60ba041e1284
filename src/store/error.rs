use thiserror::Error;

use crate::models::order::OrderStatus;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("blob io failed for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("blob store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransitionError {
    #[error("illegal transition from {from} to {to}")]
    Illegal { from: OrderStatus, to: OrderStatus },

    #[error("partner already has active order {active_order_id}")]
    PartnerBusy { active_order_id: String },

    #[error("delivery code does not match for order {order_id}")]
    CodeMismatch { order_id: String },
}
