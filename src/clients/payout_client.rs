use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Payout, PayoutCreate, PayoutId, StoreId};
use crate::payout_actor::PayoutError;

#[derive(Clone)]
pub struct PayoutClient {
    inner: ResourceClient<Payout>,
}

impl PayoutClient {
    pub fn new(inner: ResourceClient<Payout>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn create_payout(&self, payout: PayoutCreate) -> Result<PayoutId, PayoutError> {
        debug!("Sending request");
        self.inner.create(payout).await.map_err(PayoutError::from)
    }

    #[instrument(skip(self))]
    pub async fn get_payout(&self, id: PayoutId) -> Result<Option<Payout>, PayoutError> {
        debug!("Sending request");
        self.inner.get(id).await.map_err(PayoutError::from)
    }

    /// Every payout issued to a store, oldest first.
    #[instrument(skip(self))]
    pub async fn payouts_for_store(&self, store_id: StoreId) -> Result<Vec<Payout>, PayoutError> {
        debug!("Sending request");
        let mut payouts = self.inner.list(move |payout: &Payout| payout.seller_id == store_id).await?;
        payouts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(payouts)
    }
}
