//! Delivery driver domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use terra_verde_core::{DeliveryId, DriverAccountId, DriverId, Email, OrderId, VehicleType};

/// A delivery driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    /// Unique driver ID.
    pub id: DriverId,
    /// Full name.
    pub name: String,
    /// Contact email; also the login email of the linked account.
    pub email: Email,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Vehicle used for deliveries.
    pub vehicle_type: VehicleType,
    /// Public URL of the uploaded driver's license, once stored.
    pub license_url: Option<String>,
    /// Public URL of the uploaded ID card, once stored.
    pub id_card_url: Option<String>,
    /// Linked login account. Nullable: the account write and the driver write
    /// are independent, and a failed second write leaves an orphaned account.
    pub account_id: Option<DriverAccountId>,
    /// When the driver was registered.
    pub created_at: DateTime<Utc>,
}

/// Live delivery counters for one driver. These are the only statistics the
/// drivers page shows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriverStats {
    /// Deliveries currently underway.
    pub in_progress: i64,
    /// Completed deliveries.
    pub completed: i64,
}

/// One delivery assignment. `delivered_at` unset means in progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    /// Unique delivery ID.
    pub id: DeliveryId,
    /// Assigned driver.
    pub driver_id: DriverId,
    /// Delivered order.
    pub order_id: OrderId,
    /// When the delivery started.
    pub started_at: DateTime<Utc>,
    /// When the delivery completed, if it has.
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Input for registering a driver. The login account is provisioned first,
/// then the driver row is inserted referencing it.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDriver {
    /// Full name.
    pub name: String,
    /// Contact/login email.
    pub email: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Vehicle used for deliveries.
    pub vehicle_type: VehicleType,
    /// Initial login password.
    pub password: String,
}

/// Input for assigning a delivery to a driver.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NewDelivery {
    /// Order to deliver.
    pub order_id: OrderId,
}

/// Which uploaded document a driver-document request refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Driver's license.
    License,
    /// National ID card.
    IdCard,
}

impl DocumentKind {
    /// Storage folder for this document kind.
    #[must_use]
    pub const fn folder(self) -> &'static str {
        match self {
            Self::License => "drivers/licenses",
            Self::IdCard => "drivers/id-cards",
        }
    }
}
