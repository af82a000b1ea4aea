use thiserror::Error;

use crate::domain::{MovementId, Quantity};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Movement not found: {0}")]
    MovementNotFound(MovementId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid movement type '{0}'. Valid types: Entrada, Salida, Ajuste")]
    InvalidMovementType(String),

    #[error("SKU already in use: {0}")]
    DuplicateSku(String),

    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: Quantity,
        requested: Quantity,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    /// True for the errors that mean the referenced record doesn't exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::ProductNotFound(_) | AppError::MovementNotFound(_)
        )
    }

    /// True for input rejected before anything was read or written.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_) | AppError::InvalidMovementType(_)
        )
    }
}
