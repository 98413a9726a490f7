use crate::actor_framework::ActorEntity;
use crate::domain::{DeliveryShipment, NewShipment, ShipmentId, ShipmentLog, ShipmentStatus};

use super::actions::{ShipmentAction, ShipmentActionResult};
use super::error::DeliveryError;

fn can_move(from: ShipmentStatus, to: ShipmentStatus) -> bool {
    use ShipmentStatus::*;
    matches!((from, to), (Pending, InTransit) | (InTransit, Delivered) | (Pending, Cancelled) | (InTransit, Cancelled))
}

impl ActorEntity for DeliveryShipment {
    const KIND: &'static str = "Shipment";
    type Id = ShipmentId;
    type CreateParams = NewShipment;
    type UpdateParams = ();
    type Action = ShipmentAction;
    type ActionResult = ShipmentActionResult;
    type Error = DeliveryError;

    fn id(&self) -> &ShipmentId {
        &self.id
    }

    fn from_create_params(id: ShipmentId, params: NewShipment) -> Result<Self, DeliveryError> {
        if params.cod_amount.is_negative() {
            return Err(DeliveryError::ValidationError("COD amount must not be negative".to_string()));
        }
        let first_hop = ShipmentLog {
            status: ShipmentStatus::Pending,
            note: format!("Awaiting pickup from {}", params.seller.name),
            at: params.requested_at,
        };
        Ok(Self {
            id,
            order_id: params.order_id,
            address: params.address,
            seller: params.seller,
            recipient_name: params.recipient_name,
            recipient_phone: params.recipient_phone,
            cod_amount: params.cod_amount,
            payment_status: params.payment_status,
            status: ShipmentStatus::Pending,
            logs: vec![first_hop],
            delivered_at: None,
        })
    }

    fn on_update(&mut self, _update: ()) -> Result<(), DeliveryError> {
        Ok(())
    }

    fn handle_action(&mut self, action: ShipmentAction) -> Result<ShipmentActionResult, DeliveryError> {
        match action {
            ShipmentAction::UpdateStatus { status, note, at, delivered_at } => {
                if !can_move(self.status, status) {
                    return Err(DeliveryError::InvalidStatusChange { from: self.status, to: status });
                }
                self.status = status;
                self.logs.push(ShipmentLog { status, note, at });
                if status == ShipmentStatus::Delivered {
                    self.delivered_at = Some(delivered_at.unwrap_or(at));
                }
                Ok(ShipmentActionResult::StatusUpdated(self.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipment_moves_forward_only() {
        use ShipmentStatus::*;
        assert!(can_move(Pending, InTransit));
        assert!(can_move(InTransit, Delivered));
        assert!(can_move(Pending, Cancelled));
        assert!(!can_move(Delivered, InTransit));
        assert!(!can_move(Pending, Delivered));
        assert!(!can_move(Cancelled, InTransit));
    }
}
