use chrono::{DateTime, Utc};

use crate::domain::{DeliveryShipment, ShipmentStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum ShipmentAction {
    /// Append a hop to the log and move the shipment to `status`.
    UpdateStatus {
        status: ShipmentStatus,
        note: String,
        at: DateTime<Utc>,
        delivered_at: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShipmentActionResult {
    StatusUpdated(DeliveryShipment),
}
