//! Status enums for the store's entities.
//!
//! Stored statuses (`OrderStatus`, `StockStatus`, `VehicleType`,
//! `DiscountKind`) map to `PostgreSQL` enum types created by the admin
//! migrations. `PromotionStatus` is never stored: it is derived from the
//! validity window on every read.

use serde::{Deserialize, Serialize};

/// Order fulfillment status.
///
/// Exactly four values exist; an order can never carry an unknown status,
/// so per-status aggregation counts always sum to the group size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Processing, Self::Shipped, Self::Delivered];
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Product stock status, derived from the current quantity and the minimum
/// threshold (see [`crate::stock`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "stock_status", rename_all = "kebab-case")
)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    #[default]
    InStock,
    LowStock,
    OutOfStock,
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InStock => write!(f, "in-stock"),
            Self::LowStock => write!(f, "low-stock"),
            Self::OutOfStock => write!(f, "out-of-stock"),
        }
    }
}

/// Promotion lifecycle status, derived by comparing the validity window
/// against "now" at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionStatus {
    /// The window has not opened yet.
    Scheduled,
    /// Inside the validity window.
    Active,
    /// The window has closed.
    Expired,
}

/// Discount kind for promotions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "discount_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// Percentage off the product price (value interpreted as 0-100).
    Percentage,
    /// Fixed amount off, in currency units.
    Fixed,
}

/// Delivery driver vehicle type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "vehicle_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Motorcycle,
    Car,
    Van,
    Truck,
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Motorcycle => write!(f, "motorcycle"),
            Self::Car => write!(f, "car"),
            Self::Van => write!(f, "van"),
            Self::Truck => write!(f, "truck"),
        }
    }
}

impl std::str::FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "motorcycle" => Ok(Self::Motorcycle),
            "car" => Ok(Self::Car),
            "van" => Ok(Self::Van),
            "truck" => Ok(Self::Truck),
            _ => Err(format!("invalid vehicle type: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_roundtrip() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.to_string().parse().expect("roundtrip");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_order_status_rejects_unknown() {
        assert!("cancelled".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_stock_status_serde_kebab_case() {
        let json = serde_json::to_string(&StockStatus::LowStock).expect("serialize");
        assert_eq!(json, "\"low-stock\"");
        let json = serde_json::to_string(&StockStatus::OutOfStock).expect("serialize");
        assert_eq!(json, "\"out-of-stock\"");
    }

    #[test]
    fn test_vehicle_type_roundtrip() {
        for vehicle in [
            VehicleType::Motorcycle,
            VehicleType::Car,
            VehicleType::Van,
            VehicleType::Truck,
        ] {
            let parsed: VehicleType = vehicle.to_string().parse().expect("roundtrip");
            assert_eq!(parsed, vehicle);
        }
    }
}
