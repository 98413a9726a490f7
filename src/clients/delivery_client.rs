use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::clock::SharedClock;
use crate::delivery_actor::{DeliveryError, ShipmentAction, ShipmentActionResult};
use crate::domain::{DeliveryShipment, NewShipment, OrderId, ShipmentId, ShipmentStatus};

/// Handle to the delivery collaborator. Shipments are addressed by order id.
#[derive(Clone)]
pub struct DeliveryClient {
    inner: ResourceClient<DeliveryShipment>,
    clock: SharedClock,
}

impl DeliveryClient {
    pub fn new(inner: ResourceClient<DeliveryShipment>, clock: SharedClock) -> Self {
        Self { inner, clock }
    }

    #[instrument(skip(self, shipment), fields(order_id = %shipment.order_id, cod = %shipment.cod_amount))]
    pub async fn create_shipment(&self, shipment: NewShipment) -> Result<ShipmentId, DeliveryError> {
        debug!("Sending request");
        self.inner.create(shipment).await.map_err(DeliveryError::from)
    }

    #[instrument(skip(self))]
    pub async fn get_shipment(&self, order_id: OrderId) -> Result<Option<DeliveryShipment>, DeliveryError> {
        debug!("Sending request");
        self.inner.get(shipment_id(&order_id)).await.map_err(DeliveryError::from)
    }

    #[instrument(skip(self))]
    pub async fn update_shipment_status(
        &self,
        order_id: OrderId,
        status: ShipmentStatus,
        delivered_at: Option<DateTime<Utc>>,
    ) -> Result<DeliveryShipment, DeliveryError> {
        debug!("Sending request");
        let action = ShipmentAction::UpdateStatus {
            status,
            note: format!("Order {} is {}", order_id, status.as_str().replace('_', " ")),
            at: self.clock.now(),
            delivered_at,
        };
        match self.inner.perform_action(shipment_id(&order_id), action).await? {
            ShipmentActionResult::StatusUpdated(shipment) => Ok(shipment),
        }
    }
}

/// Shipment ids mirror the order they belong to.
pub fn shipment_id(order_id: &OrderId) -> ShipmentId {
    ShipmentId::new(order_id.as_str())
}
