use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Quantity;

pub type MovementId = i64;

/// Actor recorded when the caller doesn't name one.
pub const DEFAULT_USER: &str = "Admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementType {
    /// Goods received: purchases, customer returns
    Entrada,
    /// Goods leaving: sales, shrinkage
    Salida,
    /// Stock count correction, applied as given
    Ajuste,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Entrada => "Entrada",
            MovementType::Salida => "Salida",
            MovementType::Ajuste => "Ajuste",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "entrada" => Some(MovementType::Entrada),
            "salida" => Some(MovementType::Salida),
            "ajuste" => Some(MovementType::Ajuste),
            _ => None,
        }
    }

    /// Sign a user-entered quantity: exits subtract, everything else adds.
    pub fn signed_quantity(&self, quantity: Quantity) -> Quantity {
        match self {
            MovementType::Salida => -quantity,
            MovementType::Entrada | MovementType::Ajuste => quantity,
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recorded change to a product's stock.
/// The product fields are a snapshot taken when the movement was registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub timestamp: DateTime<Utc>,
    pub product_sku: String,
    pub product_name: String,
    pub movement_type: MovementType,
    /// Signed: negative for exits
    pub quantity: Quantity,
    pub user: String,
    pub reference: String,
}

impl Movement {
    /// Create a movement. The id is assigned by the repository.
    pub fn new(
        product_sku: impl Into<String>,
        product_name: impl Into<String>,
        movement_type: MovementType,
        quantity: Quantity,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            timestamp,
            product_sku: product_sku.into(),
            product_name: product_name.into(),
            movement_type,
            quantity: movement_type.signed_quantity(quantity),
            user: DEFAULT_USER.to_string(),
            reference: String::new(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn is_exit(&self) -> bool {
        self.movement_type == MovementType::Salida
    }

    pub fn apply_patch(&mut self, patch: MovementPatch) {
        if let Some(timestamp) = patch.timestamp {
            self.timestamp = timestamp;
        }
        if let Some(user) = patch.user {
            self.user = user;
        }
        if let Some(reference) = patch.reference {
            self.reference = reference;
        }
    }
}

/// Editable movement fields. Quantity, type and the product snapshot
/// are fixed once the movement has been posted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementPatch {
    pub timestamp: Option<DateTime<Utc>>,
    pub user: Option<String>,
    pub reference: Option<String>,
}

impl MovementPatch {
    pub fn is_empty(&self) -> bool {
        *self == MovementPatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_type_roundtrip() {
        for mt in [
            MovementType::Entrada,
            MovementType::Salida,
            MovementType::Ajuste,
        ] {
            assert_eq!(MovementType::from_str(mt.as_str()), Some(mt));
        }
        assert_eq!(MovementType::from_str("SALIDA"), Some(MovementType::Salida));
    }

    #[test]
    fn test_unknown_movement_type() {
        assert_eq!(MovementType::from_str("transferencia"), None);
        assert_eq!(MovementType::from_str(""), None);
    }

    #[test]
    fn test_only_exits_are_negated() {
        assert_eq!(MovementType::Entrada.signed_quantity(10), 10);
        assert_eq!(MovementType::Salida.signed_quantity(10), -10);
        assert_eq!(MovementType::Ajuste.signed_quantity(10), 10);
    }

    #[test]
    fn test_new_movement_stores_signed_quantity() {
        let movement = Movement::new(
            "FER-001",
            "Martillo de Acero",
            MovementType::Salida,
            20,
            Utc::now(),
        )
        .with_reference("Boleta B001-123");

        assert_eq!(movement.quantity, -20);
        assert_eq!(movement.user, DEFAULT_USER);
        assert!(movement.is_exit());
    }

    #[test]
    fn test_patch_leaves_ledger_fields_alone() {
        let mut movement = Movement::new("FER-002", "Destornillador", MovementType::Entrada, 5, Utc::now());
        let patch: MovementPatch =
            serde_json::from_str(r#"{"id": 7, "quantity": 500, "reference": "Guia 0042"}"#).unwrap();

        movement.apply_patch(patch);

        assert_eq!(movement.id, 0);
        assert_eq!(movement.quantity, 5);
        assert_eq!(movement.reference, "Guia 0042");
    }
}
