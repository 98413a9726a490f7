use crate::actor_framework::ActorEntity;
use crate::domain::{Payout, PayoutCreate, PayoutId, PayoutStatus};

use super::error::PayoutError;

impl ActorEntity for Payout {
    const KIND: &'static str = "Payout";
    type Id = PayoutId;
    type CreateParams = PayoutCreate;
    type UpdateParams = ();
    type Action = ();
    type ActionResult = ();
    type Error = PayoutError;

    fn id(&self) -> &PayoutId {
        &self.id
    }

    fn from_create_params(id: PayoutId, params: PayoutCreate) -> Result<Self, PayoutError> {
        if params.order_ids.is_empty() {
            return Err(PayoutError::ValidationError("Payout must include at least one order".to_string()));
        }
        Ok(Self {
            id,
            seller_id: params.seller_id,
            order_ids: params.order_ids,
            total_payout: params.total_payout,
            status: PayoutStatus::Pending,
            created_at: params.created_at,
        })
    }

    fn on_update(&mut self, _update: ()) -> Result<(), PayoutError> {
        Err(PayoutError::Immutable(self.id.clone()))
    }

    fn on_delete(&self) -> Result<(), PayoutError> {
        Err(PayoutError::Immutable(self.id.clone()))
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), PayoutError> {
        Err(PayoutError::Immutable(self.id.clone()))
    }
}
