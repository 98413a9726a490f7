use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::domain::{InventoryCreate, InventoryRecord, ProductId};
use crate::inventory_actor::{InventoryAction, InventoryActionResult, InventoryError};

/// One line of stock movement: how many units of which product.
pub type StockLine = (ProductId, u32);

#[derive(Clone)]
pub struct InventoryClient {
    inner: ResourceClient<InventoryRecord>,
}

impl InventoryClient {
    pub fn new(inner: ResourceClient<InventoryRecord>) -> Self {
        Self { inner }
    }

    /// Open the ledger entry for a newly listed product.
    #[instrument(skip(self))]
    pub async fn open_record(&self, product_id: ProductId, quantity: u32) -> Result<ProductId, InventoryError> {
        debug!("Sending request");
        self.inner.create(InventoryCreate { product_id, quantity }).await.map_err(InventoryError::from)
    }

    #[instrument(skip(self))]
    pub async fn snapshot(&self, product_id: ProductId) -> Result<Option<InventoryRecord>, InventoryError> {
        debug!("Sending request");
        self.inner.get(product_id).await.map_err(InventoryError::from)
    }

    #[instrument(skip(self))]
    pub async fn reserve(&self, product_id: ProductId, quantity: u32) -> Result<InventoryRecord, InventoryError> {
        debug!("Sending request");
        self.act(product_id, InventoryAction::Reserve(quantity)).await
    }

    #[instrument(skip(self))]
    pub async fn release(&self, product_id: ProductId, quantity: u32) -> Result<InventoryRecord, InventoryError> {
        debug!("Sending request");
        self.act(product_id, InventoryAction::Release(quantity)).await
    }

    #[instrument(skip(self))]
    pub async fn commit_sold(&self, product_id: ProductId, quantity: u32) -> Result<InventoryRecord, InventoryError> {
        debug!("Sending request");
        self.act(product_id, InventoryAction::CommitSold(quantity)).await
    }

    #[instrument(skip(self))]
    pub async fn restock(&self, product_id: ProductId, quantity: u32) -> Result<InventoryRecord, InventoryError> {
        debug!("Sending request");
        self.act(product_id, InventoryAction::Restock(quantity)).await
    }

    /// Reserve every line or none of them.
    ///
    /// Lines are reserved in order. On the first rejection every reservation
    /// already made by this call is released before the error is returned.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn reserve_all(&self, lines: &[StockLine]) -> Result<(), InventoryError> {
        for (index, (product_id, quantity)) in lines.iter().enumerate() {
            if let Err(e) = self.reserve(product_id.clone(), *quantity).await {
                warn!(product_id = %product_id, error = %e, "Reservation rejected, rolling back");
                self.release_all(&lines[..index]).await;
                return Err(e);
            }
        }
        info!("All lines reserved");
        Ok(())
    }

    /// Release every line, continuing past failures. Returns how many
    /// releases failed; each failure is logged.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn release_all(&self, lines: &[StockLine]) -> usize {
        let mut failed = 0;
        for (product_id, quantity) in lines {
            if let Err(e) = self.release(product_id.clone(), *quantity).await {
                error!(product_id = %product_id, quantity, error = %e, "Failed to release reservation");
                failed += 1;
            }
        }
        failed
    }

    async fn act(&self, product_id: ProductId, action: InventoryAction) -> Result<InventoryRecord, InventoryError> {
        self.inner
            .perform_action(product_id, action)
            .await
            .map(InventoryActionResult::into_record)
            .map_err(InventoryError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::ResourceActor;

    fn start() -> InventoryClient {
        let (actor, client) =
            ResourceActor::<InventoryRecord>::new(32, |params: &InventoryCreate| params.product_id.clone());
        tokio::spawn(actor.run());
        InventoryClient::new(client)
    }

    #[tokio::test]
    async fn test_reserve_all_rolls_back_on_partial_failure() {
        let inventory = start();
        inventory.open_record(ProductId::new("a"), 5).await.unwrap();
        inventory.open_record(ProductId::new("b"), 5).await.unwrap();
        inventory.open_record(ProductId::new("c"), 1).await.unwrap();

        let lines = vec![(ProductId::new("a"), 3), (ProductId::new("b"), 2), (ProductId::new("c"), 2)];
        let err = inventory.reserve_all(&lines).await.unwrap_err();
        assert_eq!(
            err,
            InventoryError::InsufficientStock { product_id: ProductId::new("c"), requested: 2, available: 1 }
        );

        for id in ["a", "b", "c"] {
            let record = inventory.snapshot(ProductId::new(id)).await.unwrap().unwrap();
            assert_eq!(record.reserved_quantity, 0, "{} still holds a reservation", id);
        }
    }

    #[tokio::test]
    async fn test_reserve_unknown_product() {
        let inventory = start();
        let err = inventory.reserve(ProductId::new("ghost"), 1).await.unwrap_err();
        assert_eq!(err, InventoryError::NotFound(ProductId::new("ghost")));
    }

    #[tokio::test]
    async fn test_concurrent_reservations_never_oversell() {
        let inventory = start();
        inventory.open_record(ProductId::new("hot"), 10).await.unwrap();

        let tasks: Vec<_> = (0..25)
            .map(|_| {
                let inventory = inventory.clone();
                tokio::spawn(async move { inventory.reserve(ProductId::new("hot"), 1).await })
            })
            .collect();

        let mut accepted = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 10);
        let record = inventory.snapshot(ProductId::new("hot")).await.unwrap().unwrap();
        assert_eq!(record.reserved_quantity, 10);
        assert!(record.reserved_quantity <= record.quantity);
    }
}
