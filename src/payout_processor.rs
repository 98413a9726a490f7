//! Periodic seller settlement.
//!
//! A run selects the stores on one payment cycle and, for each store, turns
//! its unsettled delivered or completed orders into a single payout. Orders
//! are claimed (`settled = true`) before the payout is written and released
//! again if the write fails, so an order is never counted by two payouts and
//! never left claimed without one. A failing store is logged and retried by
//! the next run; it never stops the other stores.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use crate::clients::{DirectoryClient, OrderClient, PayoutClient};
use crate::clock::SharedClock;
use crate::domain::{Money, Order, PaymentCycle, Payout, PayoutCreate, RecipientId, Store, StoreId};
use crate::notifications::{Notification, NotificationClient, NotificationEvent};
use crate::order_actor::OrderError;
use crate::payout_actor::PayoutError;

/// Outcome of one settlement run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayoutRunReport {
    pub payouts_created: Vec<Payout>,
    /// Stores with nothing to settle.
    pub stores_skipped: usize,
    pub stores_failed: Vec<(StoreId, PayoutError)>,
}

impl PayoutRunReport {
    pub fn total_paid(&self) -> Money {
        self.payouts_created.iter().map(|payout| payout.total_payout).sum()
    }
}

#[derive(Clone)]
pub struct PayoutProcessor {
    directory: DirectoryClient,
    orders: OrderClient,
    payouts: PayoutClient,
    notifier: NotificationClient,
    clock: SharedClock,
    store_batch_size: usize,
    run_lock: Arc<Mutex<()>>,
}

impl PayoutProcessor {
    pub fn new(
        directory: DirectoryClient,
        orders: OrderClient,
        payouts: PayoutClient,
        notifier: NotificationClient,
        clock: SharedClock,
        store_batch_size: usize,
    ) -> Self {
        Self {
            directory,
            orders,
            payouts,
            notifier,
            clock,
            store_batch_size: store_batch_size.max(1),
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn run_weekly(&self) -> Result<PayoutRunReport, PayoutError> {
        self.run_cycle(PaymentCycle::Weekly).await
    }

    pub async fn run_monthly(&self) -> Result<PayoutRunReport, PayoutError> {
        self.run_cycle(PaymentCycle::Monthly).await
    }

    /// Settle every store on `cycle`. Only a failure to list the stores fails
    /// the run; per-store failures are collected in the report.
    #[instrument(skip(self), fields(cycle = cycle.as_str()))]
    pub async fn run_cycle(&self, cycle: PaymentCycle) -> Result<PayoutRunReport, PayoutError> {
        let _run = self.run_lock.lock().await;
        info!("Payout run starting");

        let stores = self
            .directory
            .stores_with_cycle(cycle)
            .await
            .map_err(|e| PayoutError::StoreLookup(e.to_string()))?;

        let mut report = PayoutRunReport::default();
        for batch in stores.chunks(self.store_batch_size) {
            let outcomes = join_all(batch.iter().map(|store| self.settle_store(store))).await;
            for (store, outcome) in batch.iter().zip(outcomes) {
                match outcome {
                    Ok(Some(payout)) => report.payouts_created.push(payout),
                    Ok(None) => report.stores_skipped += 1,
                    Err(e) => {
                        error!(store_id = %store.id, error = %e, "Store settlement failed, will retry next run");
                        report.stores_failed.push((store.id.clone(), e));
                    }
                }
            }
        }

        info!(
            stores = stores.len(),
            payouts = report.payouts_created.len(),
            skipped = report.stores_skipped,
            failed = report.stores_failed.len(),
            total = %report.total_paid(),
            "Payout run finished"
        );
        Ok(report)
    }

    #[instrument(skip(self, store), fields(store_id = %store.id))]
    async fn settle_store(&self, store: &Store) -> Result<Option<Payout>, PayoutError> {
        let candidates = self
            .orders
            .settlement_candidates(store.id.clone())
            .await
            .map_err(|e| PayoutError::OrderLookup { store_id: store.id.clone(), message: e.to_string() })?;
        if candidates.is_empty() {
            return Ok(None);
        }

        let mut claimed: Vec<Order> = Vec::with_capacity(candidates.len());
        for order in candidates {
            match self.orders.mark_settled(order.id.clone()).await {
                Ok(order) => claimed.push(order),
                // Claimed elsewhere or no longer eligible since the listing.
                Err(OrderError::AlreadySettled(_)) | Err(OrderError::NotSettleable { .. }) => {
                    warn!(order_id = %order.id, "Order no longer claimable, skipping");
                }
                Err(e) => {
                    self.release_claims(&claimed).await;
                    return Err(PayoutError::Claim { order_id: order.id, message: e.to_string() });
                }
            }
        }
        if claimed.is_empty() {
            return Ok(None);
        }

        let total_payout: Money = claimed.iter().map(Order::net_revenue).sum();
        let request = PayoutCreate {
            seller_id: store.id.clone(),
            order_ids: claimed.iter().map(|order| order.id.clone()).collect(),
            total_payout,
            created_at: self.clock.now(),
        };
        let payout_id = match self.payouts.create_payout(request).await {
            Ok(id) => id,
            Err(e) => {
                self.release_claims(&claimed).await;
                return Err(e);
            }
        };
        // The payout exists from here on, so its claims must stand.
        let payout = self.payouts.get_payout(payout_id.clone()).await?.ok_or(PayoutError::NotFound(payout_id))?;

        info!(payout_id = %payout.id, orders = payout.order_ids.len(), total = %payout.total_payout, "Payout created");
        self.notifier.publish(Notification::new(
            RecipientId::new(store.id.as_str()),
            NotificationEvent::PayoutCreated { payout_id: payout.id.clone(), total_payout: payout.total_payout },
            payout.created_at,
        ));
        Ok(Some(payout))
    }

    async fn release_claims(&self, claimed: &[Order]) {
        for order in claimed {
            if let Err(e) = self.orders.revert_settled(order.id.clone()).await {
                error!(order_id = %order.id, error = %e, "Failed to release settlement claim");
            }
        }
    }
}
