/// Stock rules that can be tightened per deployment.
/// The defaults accept duplicate SKUs and stock below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockPolicy {
    /// Let exits take stock below zero (backorders)
    pub allow_negative_stock: bool,
    /// Reject a product whose SKU is already in the catalog
    pub unique_sku: bool,
}

impl Default for StockPolicy {
    fn default() -> Self {
        Self {
            allow_negative_stock: true,
            unique_sku: false,
        }
    }
}

impl StockPolicy {
    pub fn strict() -> Self {
        Self {
            allow_negative_stock: false,
            unique_sku: true,
        }
    }
}
