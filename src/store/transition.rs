use std::str::FromStr;

use crate::models::order::OrderStatus;
use crate::store::error::TransitionError;

/// How strictly status changes follow the lifecycle table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Only the single forward step in `OrderStatus::allowed_next` is applied,
    /// and a partner holds at most one active order.
    #[default]
    Strict,
    /// Any requested status is applied as-is.
    Permissive,
}

impl TransitionPolicy {
    pub fn check(&self, from: OrderStatus, to: OrderStatus) -> Result<(), TransitionError> {
        match self {
            TransitionPolicy::Permissive => Ok(()),
            TransitionPolicy::Strict if from.can_transition_to(to) => Ok(()),
            TransitionPolicy::Strict => Err(TransitionError::Illegal { from, to }),
        }
    }

    pub fn is_strict(&self) -> bool {
        *self == TransitionPolicy::Strict
    }
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(TransitionPolicy::Strict),
            "permissive" => Ok(TransitionPolicy::Permissive),
            other => Err(format!(
                "unknown transition policy: {other}, expected strict/permissive"
            )),
        }
    }
}
