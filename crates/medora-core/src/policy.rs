//! # Roles & Permissions
//!
//! ```text
//! ┌────────────────────────┬───────┬────────────┬───────┐
//! │ Action                 │ owner │ pharmacist │ staff │
//! ├────────────────────────┼───────┼────────────┼───────┤
//! │ create invoice         │   ✓   │     ✓      │   ✓   │
//! │ manage catalog         │   ✓   │     ✓      │       │
//! │ manage suppliers       │   ✓   │     ✓      │       │
//! │ adjust stock           │   ✓   │     ✓      │       │
//! │ manage purchase orders │   ✓   │     ✓      │       │
//! │ manage users           │   ✓   │            │       │
//! │ view audit log         │   ✓   │            │       │
//! │ manage settings        │   ✓   │            │       │
//! └────────────────────────┴───────┴────────────┴───────┘
//! ```
//!
//! Reads of catalog, stock, invoices and the dashboard are open to every
//! active user and are not listed as actions.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Owner,
    Pharmacist,
    #[default]
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Pharmacist => "pharmacist",
            Role::Staff => "staff",
        }
    }

    /// Whether this role may perform `action`.
    pub fn permits(&self, action: Action) -> bool {
        match action {
            Action::CreateInvoice => true,
            Action::ManageCatalog
            | Action::ManageSuppliers
            | Action::AdjustStock
            | Action::ManagePurchaseOrders => matches!(self, Role::Owner | Role::Pharmacist),
            Action::ManageUsers | Action::ViewAuditLog | Action::ManageSettings => {
                matches!(self, Role::Owner)
            }
        }
    }

    /// Like [`Role::permits`] but returns [`CoreError::PermissionDenied`].
    pub fn require(&self, action: Action) -> CoreResult<()> {
        if self.permits(action) {
            Ok(())
        } else {
            Err(CoreError::PermissionDenied {
                role: self.to_string(),
                action: action.to_string(),
            })
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A privileged operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateInvoice,
    ManageCatalog,
    ManageSuppliers,
    AdjustStock,
    ManagePurchaseOrders,
    ManageUsers,
    ViewAuditLog,
    ManageSettings,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Action::CreateInvoice => "create invoices",
            Action::ManageCatalog => "manage the catalog",
            Action::ManageSuppliers => "manage suppliers",
            Action::AdjustStock => "adjust stock",
            Action::ManagePurchaseOrders => "manage purchase orders",
            Action::ManageUsers => "manage users",
            Action::ViewAuditLog => "view the audit log",
            Action::ManageSettings => "manage settings",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_everyone_can_bill() {
        for role in [Role::Owner, Role::Pharmacist, Role::Staff] {
            assert!(role.permits(Action::CreateInvoice));
        }
    }

    #[test]
    fn test_staff_cannot_adjust_stock() {
        assert!(Role::Pharmacist.permits(Action::AdjustStock));
        let err = Role::Staff.require(Action::AdjustStock).unwrap_err();
        assert_eq!(err.to_string(), "Role staff is not allowed to adjust stock");
    }

    #[test]
    fn test_owner_only_actions() {
        for action in [Action::ManageUsers, Action::ViewAuditLog, Action::ManageSettings] {
            assert!(Role::Owner.permits(action));
            assert!(!Role::Pharmacist.permits(action));
            assert!(!Role::Staff.permits(action));
        }
    }
}
