//! # Error Types
//!
//! Domain-specific error types for medora-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  medora-core errors (this file)                                        │
//! │  ├── CoreError        - Pharmacy rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  medora-db errors                                                      │
//! │  └── DbError          - Database failures (carries CoreError)          │
//! │                                                                         │
//! │  medora-server errors                                                  │
//! │  └── ApiError         - What the mobile client sees                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Medicine cannot be found.
    #[error("Medicine not found: {0}")]
    MedicineNotFound(String),

    /// Batch cannot be found.
    #[error("Batch not found: {0}")]
    BatchNotFound(String),

    /// A batch was referenced for a different medicine than the line item.
    ///
    /// ## When This Occurs
    /// - Client picked a batch from the wrong medicine
    /// - Stale batch id after a catalog edit
    #[error("Batch {batch_id} does not belong to medicine {medicine_id}")]
    BatchMedicineMismatch {
        batch_id: String,
        medicine_id: String,
    },

    /// Not enough unexpired stock to satisfy a FEFO allocation.
    ///
    /// ## User Workflow
    /// ```text
    /// Bill: Paracetamol x 30 (no batch chosen)
    ///      │
    ///      ▼
    /// FEFO batches: B-01 (12), B-02 (10)
    ///      │
    ///      ▼
    /// InsufficientStock { medicine: "Paracetamol", available: 22, requested: 30 }
    /// ```
    #[error("Insufficient stock for {medicine}: available {available}, requested {requested}")]
    InsufficientStock {
        medicine: String,
        available: i64,
        requested: i64,
    },

    /// Purchase order cannot move to the requested status.
    #[error("Cannot change purchase order status from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// The acting user lacks the role for an action.
    #[error("Role {role} is not allowed to {action}")]
    PermissionDenied { role: String, action: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid barcode).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// An amount does not fit in an `i64` count of minor units.
    #[error("{field} is too large")]
    AmountOverflow { field: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            medicine: "Paracetamol 500mg".to_string(),
            available: 22,
            requested: 30,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Paracetamol 500mg: available 22, requested 30"
        );

        let err = CoreError::InvalidStatusTransition {
            from: "received".to_string(),
            to: "pending".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot change purchase order status from received to pending"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("name").to_string(), "name is required");

        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        };
        assert_eq!(err.to_string(), "password must be at least 6 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("batchNumber").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
