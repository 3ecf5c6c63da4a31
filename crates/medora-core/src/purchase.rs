//! # Purchase Order Status
//!
//! ```text
//!              ┌──────────► received   (terminal, stamps received_at)
//!              │               ▲
//!   pending ───┼──► ordered ───┤
//!              │               ▼
//!              └──────────► cancelled  (terminal)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PurchaseOrderStatus {
    /// Drafted, not yet sent to the supplier.
    #[default]
    Pending,
    Ordered,
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Pending => "pending",
            PurchaseOrderStatus::Ordered => "ordered",
            PurchaseOrderStatus::Received => "received",
            PurchaseOrderStatus::Cancelled => "cancelled",
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PurchaseOrderStatus::Received | PurchaseOrderStatus::Cancelled
        )
    }

    /// Whether `next` is a legal move from this status.
    pub fn can_transition_to(&self, next: PurchaseOrderStatus) -> bool {
        use PurchaseOrderStatus::*;

        matches!(
            (self, next),
            (Pending, Ordered)
                | (Pending, Received)
                | (Pending, Cancelled)
                | (Ordered, Received)
                | (Ordered, Cancelled)
        )
    }

    /// Validates a move, returning the new status.
    pub fn transition(self, next: PurchaseOrderStatus) -> CoreResult<PurchaseOrderStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidStatusTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PurchaseOrderStatus::*;

    #[test]
    fn test_forward_transitions() {
        assert_eq!(Pending.transition(Ordered).unwrap(), Ordered);
        assert_eq!(Pending.transition(Received).unwrap(), Received);
        assert_eq!(Ordered.transition(Received).unwrap(), Received);
        assert_eq!(Ordered.transition(Cancelled).unwrap(), Cancelled);
    }

    #[test]
    fn test_terminal_states_are_final() {
        for next in [Pending, Ordered, Received, Cancelled] {
            assert!(!Received.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
        assert!(Received.is_terminal());
    }

    #[test]
    fn test_same_status_rejected() {
        let err = Ordered.transition(Ordered).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot change purchase order status from ordered to ordered"
        );
        assert!(!Ordered.can_transition_to(Pending));
    }
}
