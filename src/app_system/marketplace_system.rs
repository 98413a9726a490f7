use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::actor_framework::{sequential_ids, ResourceActor};
use crate::clients::{DeliveryClient, DirectoryClient, InventoryClient, OrderClient, PayoutClient};
use crate::clock::{SharedClock, SystemClock};
use crate::domain::{
    Category, CategoryCreate, CategoryId, Coupon, CouponCreate, CouponId, DeliveryShipment, InventoryCreate,
    InventoryRecord, NewShipment, Order, OrderCreate, OrderId, PaymentMethod, PaymentMethodCreate, PaymentMethodId,
    Payout, PayoutCreate, PayoutId, Product, ProductCreate, ProductId, ShipmentId, Store, StoreCreate, StoreId, User,
    UserCreate, UserId,
};
use crate::notifications::{NotificationClient, NotificationHub};
use crate::payout_processor::PayoutProcessor;
use crate::scheduler::Scheduler;

use super::config::MarketplaceConfig;

/// The running marketplace: every actor, the clients wired over them and the
/// payout schedule.
///
/// Responsible for starting actors in dependency order and for shutdown.
pub struct MarketplaceSystem {
    pub directory: DirectoryClient,
    pub inventory: InventoryClient,
    pub orders: OrderClient,
    pub delivery: DeliveryClient,
    pub payouts: PayoutClient,
    pub payout_processor: PayoutProcessor,
    pub notifications: NotificationClient,
    pub config: MarketplaceConfig,
    handles: Vec<(&'static str, JoinHandle<()>)>,
    scheduler: Scheduler,
}

impl MarketplaceSystem {
    pub fn new(config: MarketplaceConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: MarketplaceConfig, clock: SharedClock) -> Self {
        let buffer = config.actor_buffer_size;
        let mut handles = Vec::new();

        // 1. Reference data
        let (users, user_client) = ResourceActor::<User>::new(buffer, sequential_ids::<UserCreate, UserId>("user"));
        handles.push(("users", tokio::spawn(users.run())));
        let (stores, store_client) = ResourceActor::<Store>::new(buffer, sequential_ids::<StoreCreate, StoreId>("store"));
        handles.push(("stores", tokio::spawn(stores.run())));
        let (payment_methods, payment_method_client) = ResourceActor::<PaymentMethod>::new(
            buffer,
            sequential_ids::<PaymentMethodCreate, PaymentMethodId>("payment_method"),
        );
        handles.push(("payment_methods", tokio::spawn(payment_methods.run())));
        let (categories, category_client) =
            ResourceActor::<Category>::new(buffer, sequential_ids::<CategoryCreate, CategoryId>("category"));
        handles.push(("categories", tokio::spawn(categories.run())));
        let (products, product_client) =
            ResourceActor::<Product>::new(buffer, sequential_ids::<ProductCreate, ProductId>("product"));
        handles.push(("products", tokio::spawn(products.run())));
        let (coupons, coupon_client) = ResourceActor::<Coupon>::new(buffer, sequential_ids::<CouponCreate, CouponId>("coupon"));
        handles.push(("coupons", tokio::spawn(coupons.run())));
        let directory = DirectoryClient::new(
            user_client,
            store_client,
            payment_method_client,
            category_client,
            product_client,
            coupon_client,
        );

        // 2. Inventory ledger, keyed by product
        let (ledger, ledger_client) =
            ResourceActor::<InventoryRecord>::new(buffer, |params: &InventoryCreate| params.product_id.clone());
        handles.push(("inventory", tokio::spawn(ledger.run())));
        let inventory = InventoryClient::new(ledger_client);

        // 3. Delivery, keyed by order
        let (shipments, shipment_client) = ResourceActor::<DeliveryShipment>::new(buffer, |params: &NewShipment| {
            ShipmentId::new(params.order_id.as_str())
        });
        handles.push(("delivery", tokio::spawn(shipments.run())));
        let delivery = DeliveryClient::new(shipment_client, clock.clone());

        // 4. Notifications
        let (hub, notifications) = NotificationHub::new(buffer, buffer);
        handles.push(("notifications", tokio::spawn(hub.run())));

        // 5. Orders
        let (order_actor, order_resource_client) =
            ResourceActor::<Order>::new(buffer, sequential_ids::<OrderCreate, OrderId>("order"));
        handles.push(("orders", tokio::spawn(order_actor.run())));
        let orders = OrderClient::new(
            order_resource_client,
            directory.clone(),
            inventory.clone(),
            delivery.clone(),
            notifications.clone(),
            config.fees,
            clock.clone(),
        );

        // 6. Payouts
        let (payout_actor, payout_resource_client) =
            ResourceActor::<Payout>::new(buffer, sequential_ids::<PayoutCreate, PayoutId>("payout"));
        handles.push(("payouts", tokio::spawn(payout_actor.run())));
        let payouts = PayoutClient::new(payout_resource_client);
        let payout_processor = PayoutProcessor::new(
            directory.clone(),
            orders.clone(),
            payouts.clone(),
            notifications.clone(),
            clock,
            config.payouts.store_batch_size,
        );

        // 7. Schedule
        let mut scheduler = Scheduler::new();
        if config.payouts.enabled {
            let weekly = payout_processor.clone();
            scheduler.every("weekly_payouts", config.payouts.weekly_interval(), move || {
                let processor = weekly.clone();
                async move {
                    if let Err(e) = processor.run_weekly().await {
                        error!(error = %e, "Weekly payout run failed");
                    }
                }
            });
            let monthly = payout_processor.clone();
            scheduler.every("monthly_payouts", config.payouts.monthly_interval(), move || {
                let processor = monthly.clone();
                async move {
                    if let Err(e) = processor.run_monthly().await {
                        error!(error = %e, "Monthly payout run failed");
                    }
                }
            });
        }

        info!(actors = handles.len(), jobs = scheduler.job_count(), "Marketplace system started");
        Self {
            directory,
            inventory,
            orders,
            delivery,
            payouts,
            payout_processor,
            notifications,
            config,
            handles,
            scheduler,
        }
    }

    /// Stop the schedule, close every mailbox and wait for the actors to drain.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down marketplace system...");
        self.scheduler.shutdown().await;

        // Actors stop once every client handle is gone.
        drop(self.payout_processor);
        drop(self.orders);
        drop(self.payouts);
        drop(self.delivery);
        drop(self.inventory);
        drop(self.directory);
        drop(self.notifications);

        for (name, handle) in self.handles {
            if let Err(e) = handle.await {
                error!(actor = name, "Actor task failed: {:?}", e);
                return Err(format!("Actor task {} failed: {:?}", name, e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
