use chrono::{DateTime, Utc};
use futures::future::{join_all, try_join_all};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::{ActorEntity, ResourceClient};
use crate::clock::SharedClock;
use crate::directory_actor::DirectoryError;
use crate::domain::{
    Category, CategoryId, CouponRejection, InventoryRecord, Money, NewShipment, Order, OrderCreate, OrderId,
    OrderLineItem, OrderStatus, PaymentKind, Product, ProductId, RecipientId, SellerInfo, ShipmentPaymentStatus, ShipmentStatus,
    StoreId,
};
use crate::inventory_actor::InventoryError;
use crate::notifications::{Notification, NotificationClient, NotificationEvent};
use crate::order_actor::{CreateOrderRequest, OrderAction, OrderActionResult, OrderError, OrderStep};
use crate::pricing::{compute_total, ChargeLine, FeeSchedule};

use super::{DeliveryClient, DirectoryClient, InventoryClient, StockLine};

/// A line item joined with the catalog entry it was bought from.
/// Catalog fields are `None` when the product has since been removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemDetails {
    #[serde(flatten)]
    pub item: OrderLineItem,
    pub product_name: Option<String>,
    pub category_id: Option<CategoryId>,
}

/// An order prepared for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<LineItemDetails>,
}

/// Catalog and stock state for one requested product.
struct LineLookup {
    product: Option<Product>,
    category: Option<Category>,
    stock: Option<InventoryRecord>,
}

/// Order workflows: checkout, status changes, cancellation and the
/// settlement claims used by the payout run.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    directory: DirectoryClient,
    inventory: InventoryClient,
    delivery: DeliveryClient,
    notifier: NotificationClient,
    fees: FeeSchedule,
    clock: SharedClock,
}

impl OrderClient {
    pub fn new(
        inner: ResourceClient<Order>,
        directory: DirectoryClient,
        inventory: InventoryClient,
        delivery: DeliveryClient,
        notifier: NotificationClient,
        fees: FeeSchedule,
        clock: SharedClock,
    ) -> Self {
        Self { inner, directory, inventory, delivery, notifier, fees, clock }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Place an order.
    ///
    /// Each line must quote the product's current catalog price; a stale
    /// quote is rejected with [`OrderError::PriceChanged`] and the stored
    /// line keeps the quoted price as its snapshot.
    ///
    /// Stock for every line is reserved before the order is written. A
    /// failure at any later step releases the reservations, and a failure
    /// after the write also removes the order, so a rejected checkout leaves
    /// nothing behind.
    #[instrument(
        skip(self, request),
        fields(buyer_id = %request.buyer_id, seller_id = %request.seller_id, lines = request.line_items.len())
    )]
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, OrderError> {
        info!("Processing create_order request");
        request.validate()?;
        let placed_at = self.clock.now();

        let coupon_lookup = async {
            match &request.coupon_id {
                Some(id) => self.directory.require_coupon(id.clone()).await.map(Some),
                None => Ok(None),
            }
        };
        let line_lookups = try_join_all(request.line_items.iter().map(|line| self.load_line(line.product_id.clone())));
        let (buyer, seller, payment, coupon, lookups) = tokio::join!(
            self.directory.require_user(request.buyer_id.clone()),
            self.directory.require_store(request.seller_id.clone()),
            self.directory.require_payment_method(request.payment_id.clone()),
            coupon_lookup,
            line_lookups,
        );
        let buyer = buyer.map_err(from_directory)?;
        let seller = seller.map_err(from_directory)?;
        let payment = payment.map_err(from_directory)?;
        let coupon = coupon.map_err(from_directory)?;
        let lookups = lookups?;

        let mut items = Vec::with_capacity(request.line_items.len());
        let mut commission_rates = Vec::with_capacity(request.line_items.len());
        for (line, lookup) in request.line_items.iter().zip(lookups) {
            let product = lookup.product.ok_or_else(|| OrderError::not_found("Product", &line.product_id))?;
            if product.store_id != seller.id {
                return Err(OrderError::ValidationError(format!(
                    "Product {} is not sold by store {}",
                    product.id, seller.id
                )));
            }
            if !product.active {
                return Err(OrderError::InactiveProduct(product.id));
            }
            if product.price != line.price {
                return Err(OrderError::PriceChanged {
                    product_id: product.id,
                    quoted: line.price,
                    current: product.price,
                });
            }
            let category = lookup.category.ok_or_else(|| OrderError::not_found("Category", &product.category_id))?;
            let stock = lookup.stock.ok_or_else(|| OrderError::not_found("Inventory record", &product.id))?;
            if !stock.can_fulfill(line.quantity) {
                return Err(OrderError::InsufficientStock {
                    product_id: product.id,
                    requested: line.quantity,
                    available: stock.available(),
                });
            }
            items.push(OrderLineItem {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                price: line.price,
                discount: line.discount,
            });
            commission_rates.push(category.commission_rate);
        }

        if let Some(coupon) = &coupon {
            coupon.check_applicable(&seller.id, placed_at).map_err(|rejection| match rejection {
                CouponRejection::NotStarted | CouponRejection::Expired => OrderError::CouponExpired(coupon.id.clone()),
                CouponRejection::WrongStore | CouponRejection::Revoked => {
                    OrderError::CouponNotApplicable(coupon.id.clone())
                }
            })?;
        }

        let charge_lines: Vec<ChargeLine<'_>> = items
            .iter()
            .zip(&commission_rates)
            .map(|(item, rate)| ChargeLine { item, commission_rate: *rate })
            .collect();
        let totals = compute_total(
            &charge_lines,
            coupon.as_ref().map(|c| &c.discount),
            request.shipping_fee.unwrap_or(Money::ZERO),
            &self.fees,
        )
        .map_err(|e| OrderError::ValidationError(e.to_string()))?;
        debug!(subtotal = %totals.subtotal, coupon_value = %totals.coupon_value, total = %totals.total, "Totals computed");

        let reservations = stock_lines(&items);
        self.inventory.reserve_all(&reservations).await.map_err(from_inventory)?;

        let params = OrderCreate {
            buyer_id: buyer.id.clone(),
            seller_id: seller.id.clone(),
            payment_id: payment.id.clone(),
            payment_kind: payment.kind,
            coupon_id: coupon.as_ref().map(|c| c.id.clone()),
            line_items: items,
            address: request.address.clone(),
            subtotal: totals.subtotal,
            coupon_value: totals.coupon_value,
            shipping_fee: request.shipping_fee.unwrap_or(Money::ZERO),
            total: totals.total,
            fees: totals.fees,
            placed_at,
        };
        let fallback = params.clone();
        let order_id = match self.inner.create(params).await {
            Ok(id) => id,
            Err(e) => {
                let e = OrderError::internal(OrderStep::Persist, e);
                error!(error = %e, "Failed to persist order, releasing stock");
                self.inventory.release_all(&reservations).await;
                return Err(e);
            }
        };

        let cash_on_delivery = payment.kind == PaymentKind::CashOnDelivery;
        let shipment = NewShipment {
            order_id: order_id.clone(),
            address: request.address.clone(),
            seller: SellerInfo {
                store_id: seller.id.clone(),
                name: seller.name.clone(),
                phone: seller.phone.clone(),
                address: seller.address.clone(),
            },
            recipient_name: request.address.recipient_name.clone().unwrap_or_else(|| buyer.name.clone()),
            recipient_phone: request.address.phone.clone().unwrap_or_else(|| buyer.phone.clone()),
            cod_amount: if cash_on_delivery { totals.total } else { Money::ZERO },
            payment_status: if cash_on_delivery { ShipmentPaymentStatus::Unpaid } else { ShipmentPaymentStatus::Paid },
            requested_at: placed_at,
        };
        if let Err(e) = self.delivery.create_shipment(shipment).await {
            let e = OrderError::internal(OrderStep::Shipment, e);
            error!(order_id = %order_id, error = %e, "Shipment request failed, rolling back order");
            self.discard_order(&order_id, &reservations).await;
            return Err(e);
        }

        // The order is committed from here on; a failed read-back must not
        // report the checkout as failed.
        let order = match self.get_order(order_id.clone()).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                warn!(order_id = %order_id, "Created order not readable, answering from the request");
                Order::from_create_params(order_id, fallback)?
            }
            Err(e) => {
                warn!(order_id = %order_id, error = %e, "Created order not readable, answering from the request");
                Order::from_create_params(order_id, fallback)?
            }
        };
        info!(order_id = %order.id, total = %order.total, "Order created");
        self.notify_parties(
            &order,
            NotificationEvent::OrderPlaced { order_id: order.id.clone(), total: order.total },
            placed_at,
        );
        Ok(order)
    }

    async fn load_line(&self, product_id: ProductId) -> Result<LineLookup, OrderError> {
        let (product, stock) =
            tokio::join!(self.directory.get_product(product_id.clone()), self.inventory.snapshot(product_id));
        let product = product.map_err(from_directory)?;
        let stock = stock.map_err(|e| OrderError::internal(OrderStep::Lookup, e))?;
        let category = match &product {
            Some(product) => self.directory.get_category(product.category_id.clone()).await.map_err(from_directory)?,
            None => None,
        };
        Ok(LineLookup { product, category, stock })
    }

    /// Undo a checkout whose order was written but never handed back.
    ///
    /// Another caller may already have moved the order on, in which case the
    /// delete is refused. The order is then cancelled instead, and the stock
    /// is released only once the order can no longer hold it.
    async fn discard_order(&self, order_id: &OrderId, reservations: &[StockLine]) {
        let removed = match self.inner.delete(order_id.clone()).await {
            Ok(()) => true,
            Err(e) => {
                warn!(order_id = %order_id, error = %e, "Rolled back order was not removed, cancelling it");
                let note = Some("Shipment could not be arranged".to_string());
                match self.inner.perform_action(order_id.clone(), OrderAction::Cancel { note, at: self.clock.now() }).await
                {
                    Ok(OrderActionResult::Cancelled { order, .. }) => {
                        self.notify_parties(
                            &order,
                            NotificationEvent::OrderCancelled {
                                order_id: order.id.clone(),
                                note: order.cancel_note.clone(),
                            },
                            self.clock.now(),
                        );
                        true
                    }
                    Ok(other) => {
                        error!(order_id = %order_id, result = ?other, "Unexpected cancel result, keeping reservations");
                        false
                    }
                    Err(e) => {
                        error!(order_id = %order_id, error = %e, "Order outlived its rollback, keeping reservations");
                        false
                    }
                }
            }
        };
        if removed {
            let failed = self.inventory.release_all(reservations).await;
            if failed > 0 {
                error!(order_id = %order_id, failed, "Rollback left reservations held");
            }
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Option<Order>, OrderError> {
        debug!("Sending request");
        self.inner.get(id).await.map_err(|e| OrderError::internal(OrderStep::Load, e))
    }

    pub async fn require_order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.get_order(id.clone()).await?.ok_or_else(|| OrderError::not_found("Order", &id))
    }

    #[instrument(skip(self))]
    pub async fn get_order_details(&self, id: OrderId) -> Result<OrderDetails, OrderError> {
        let order = self.require_order(id).await?;
        self.details_for(order).await
    }

    async fn details_for(&self, order: Order) -> Result<OrderDetails, OrderError> {
        let products =
            join_all(order.line_items.iter().map(|item| self.directory.get_product(item.product_id.clone()))).await;
        let mut items = Vec::with_capacity(order.line_items.len());
        for (item, product) in order.line_items.iter().zip(products) {
            let product = product.map_err(|e| OrderError::internal(OrderStep::Load, e))?;
            items.push(LineItemDetails {
                item: item.clone(),
                product_name: product.as_ref().map(|p| p.name.clone()),
                category_id: product.map(|p| p.category_id),
            });
        }
        Ok(OrderDetails { order, items })
    }

    // =========================================================================
    // Status changes
    // =========================================================================

    /// Move an order along the status table and sync its side effects.
    ///
    /// `Cancelled` takes the cancellation path so reservations are released.
    #[instrument(skip(self))]
    pub async fn set_status(&self, order_id: OrderId, status: OrderStatus) -> Result<OrderDetails, OrderError> {
        if status == OrderStatus::Cancelled {
            let order = self.cancel_order(order_id, None).await?;
            return self.details_for(order).await;
        }

        let at = self.clock.now();
        let (from, order) =
            match self.inner.perform_action(order_id.clone(), OrderAction::Transition { to: status, at }).await? {
                OrderActionResult::Transitioned { from, order } => (from, order),
                other => return Err(unexpected(OrderStep::Transition, other)),
            };
        info!(from = %from, to = %status, "Order status changed");

        match status {
            OrderStatus::Shipped => self.sync_shipment(&order_id, ShipmentStatus::InTransit, None).await,
            OrderStatus::Delivered => {
                self.sync_shipment(&order_id, ShipmentStatus::Delivered, Some(at)).await;
                for item in &order.line_items {
                    if let Err(e) = self.inventory.commit_sold(item.product_id.clone(), item.quantity).await {
                        error!(product_id = %item.product_id, error = %e, "Failed to record sold quantity");
                    }
                }
            }
            _ => {}
        }

        self.notify_parties(
            &order,
            NotificationEvent::OrderStatusChanged { order_id: order.id.clone(), from, to: status },
            at,
        );
        self.details_for(order).await
    }

    /// Cancel a pending or confirmed order and give its stock back.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId, note: Option<String>) -> Result<Order, OrderError> {
        let at = self.clock.now();
        let (from, order) = match self.inner.perform_action(order_id.clone(), OrderAction::Cancel { note, at }).await? {
            OrderActionResult::Cancelled { from, order } => (from, order),
            other => return Err(unexpected(OrderStep::Transition, other)),
        };
        info!(from = %from, "Order cancelled");

        let failed = self.inventory.release_all(&stock_lines(&order.line_items)).await;
        if failed > 0 {
            error!(failed, "Cancellation left reservations held");
        }
        self.sync_shipment(&order_id, ShipmentStatus::Cancelled, None).await;

        self.notify_parties(
            &order,
            NotificationEvent::OrderCancelled { order_id: order.id.clone(), note: order.cancel_note.clone() },
            at,
        );
        Ok(order)
    }

    async fn sync_shipment(&self, order_id: &OrderId, status: ShipmentStatus, delivered_at: Option<DateTime<Utc>>) {
        if let Err(e) = self.delivery.update_shipment_status(order_id.clone(), status, delivered_at).await {
            warn!(order_id = %order_id, status = status.as_str(), error = %e, "Failed to update shipment");
        }
    }

    // =========================================================================
    // Settlement
    // =========================================================================

    /// Unsettled delivered or completed orders of one store, oldest first.
    #[instrument(skip(self))]
    pub async fn settlement_candidates(&self, store_id: StoreId) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        let mut orders = self
            .inner
            .list(move |order: &Order| {
                order.seller_id == store_id && !order.settled && order.status.is_settlement_eligible()
            })
            .await
            .map_err(|e| OrderError::internal(OrderStep::Load, e))?;
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(orders)
    }

    /// Claim an order for a payout. Fails if another payout already holds it.
    #[instrument(skip(self))]
    pub async fn mark_settled(&self, order_id: OrderId) -> Result<Order, OrderError> {
        debug!("Sending request");
        let at = self.clock.now();
        match self.inner.perform_action(order_id, OrderAction::MarkSettled { at }).await? {
            OrderActionResult::Settled(order) => Ok(order),
            other => Err(unexpected(OrderStep::Transition, other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn revert_settled(&self, order_id: OrderId) -> Result<Order, OrderError> {
        debug!("Sending request");
        let at = self.clock.now();
        match self.inner.perform_action(order_id, OrderAction::RevertSettled { at }).await? {
            OrderActionResult::SettlementReverted(order) => Ok(order),
            other => Err(unexpected(OrderStep::Transition, other)),
        }
    }

    fn notify_parties(&self, order: &Order, event: NotificationEvent, at: DateTime<Utc>) {
        self.notifier.publish(Notification::new(RecipientId::new(order.buyer_id.as_str()), event.clone(), at));
        self.notifier.publish(Notification::new(RecipientId::new(order.seller_id.as_str()), event, at));
    }
}

fn stock_lines(items: &[OrderLineItem]) -> Vec<StockLine> {
    items.iter().map(|item| (item.product_id.clone(), item.quantity)).collect()
}

fn unexpected(step: OrderStep, result: OrderActionResult) -> OrderError {
    OrderError::internal(step, format!("Unexpected result: {:?}", result))
}

fn from_directory(e: DirectoryError) -> OrderError {
    match e {
        DirectoryError::NotFound { kind, id } => OrderError::NotFound { kind, id },
        other => OrderError::internal(OrderStep::Lookup, other),
    }
}

fn from_inventory(e: InventoryError) -> OrderError {
    match e {
        InventoryError::InsufficientStock { product_id, requested, available } => {
            OrderError::InsufficientStock { product_id, requested, available }
        }
        InventoryError::NotFound(product_id) => OrderError::not_found("Inventory record", product_id),
        other => OrderError::internal(OrderStep::Reserve, other),
    }
}
