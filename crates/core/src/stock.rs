//! Stock threshold and status derivation rules.
//!
//! The minimum stock for a product is always 10% of its original maximum
//! stock, floored to a whole unit. Status is recomputed by every writer from
//! the values it is about to persist; nothing enforces it after the fact.
//!
//! Two derivation rules coexist on purpose:
//!
//! - [`derive_status`] (three-way) is applied when creating a product and
//!   when editing stock: a quantity of exactly zero is `out-of-stock`.
//! - [`derive_listing_status`] (two-way) is applied when summarizing product
//!   listings: it has no zero case and reports `low-stock` for an empty
//!   shelf. Callers that need the distinction must use the three-way rule.
//!
//! The mismatch is inherited behavior. Unify it only as a deliberate
//! migration, not in passing.

use crate::types::StockStatus;

/// Compute the low-stock threshold: `floor(0.1 * max_stock)`.
///
/// Integer division floors for the non-negative quantities used here.
#[must_use]
pub const fn low_stock_threshold(max_stock: i32) -> i32 {
    max_stock / 10
}

/// Three-way stock status: out-of-stock at exactly zero, low-stock at or
/// below the minimum, in-stock otherwise.
#[must_use]
pub const fn derive_status(quantity: i32, min_stock: i32) -> StockStatus {
    if quantity == 0 {
        StockStatus::OutOfStock
    } else if quantity <= min_stock {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

/// Two-way stock status used by listing summaries: low-stock at or below the
/// minimum, in-stock otherwise. No explicit zero case.
#[must_use]
pub const fn derive_listing_status(quantity: i32, min_stock: i32) -> StockStatus {
    if quantity <= min_stock {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_ten_percent_floored() {
        assert_eq!(low_stock_threshold(60), 6);
        assert_eq!(low_stock_threshold(59), 5);
        assert_eq!(low_stock_threshold(100), 10);
        assert_eq!(low_stock_threshold(9), 0);
        assert_eq!(low_stock_threshold(0), 0);
    }

    #[test]
    fn test_three_way_boundary() {
        // max_stock = 60 -> minimum = 6
        let min = low_stock_threshold(60);
        assert_eq!(derive_status(6, min), StockStatus::LowStock);
        assert_eq!(derive_status(7, min), StockStatus::InStock);
        assert_eq!(derive_status(8, min), StockStatus::InStock);
    }

    #[test]
    fn test_three_way_zero_is_out_of_stock() {
        assert_eq!(derive_status(0, 6), StockStatus::OutOfStock);
        // Even with a zero minimum, an empty shelf is out-of-stock.
        assert_eq!(derive_status(0, 0), StockStatus::OutOfStock);
    }

    #[test]
    fn test_two_way_has_no_zero_case() {
        let min = low_stock_threshold(60);
        assert_eq!(derive_listing_status(0, min), StockStatus::LowStock);
        assert_eq!(derive_listing_status(6, min), StockStatus::LowStock);
        assert_eq!(derive_listing_status(7, min), StockStatus::InStock);
    }

    #[test]
    fn test_variants_agree_above_zero() {
        for max in [10, 37, 60, 250] {
            let min = low_stock_threshold(max);
            for quantity in 1..=max {
                assert_eq!(
                    derive_status(quantity, min),
                    derive_listing_status(quantity, min),
                    "variants diverge at quantity {quantity} (max {max})"
                );
            }
        }
    }
}
