use std::collections::BTreeMap;

use crate::actor_framework::ActorEntity;
use crate::domain::{Order, OrderCreate, OrderId, OrderStatus};

use super::actions::{OrderAction, OrderActionResult};
use super::error::OrderError;

impl ActorEntity for Order {
    const KIND: &'static str = "Order";
    type Id = OrderId;
    type CreateParams = OrderCreate;
    type UpdateParams = ();
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Error = OrderError;

    fn id(&self) -> &OrderId {
        &self.id
    }

    /// Creates a new Order from a fully priced payload.
    ///
    /// The order starts `pending`, unsettled, with the pending timestamp set
    /// to the placement time.
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        if params.line_items.is_empty() {
            return Err(OrderError::ValidationError("Order has no line items".to_string()));
        }
        let mut status_timestamps = BTreeMap::new();
        status_timestamps.insert(OrderStatus::Pending, params.placed_at);
        Ok(Self {
            id,
            buyer_id: params.buyer_id,
            seller_id: params.seller_id,
            payment_id: params.payment_id,
            payment_kind: params.payment_kind,
            coupon_id: params.coupon_id,
            line_items: params.line_items,
            address: params.address,
            subtotal: params.subtotal,
            coupon_value: params.coupon_value,
            shipping_fee: params.shipping_fee,
            total: params.total,
            fees: params.fees,
            status: OrderStatus::Pending,
            status_timestamps,
            settled: false,
            cancel_note: None,
            created_at: params.placed_at,
            updated_at: params.placed_at,
        })
    }

    /// Orders change only through [`OrderAction`].
    fn on_update(&mut self, _update: ()) -> Result<(), OrderError> {
        Err(OrderError::ValidationError("Orders are modified through status actions only".to_string()))
    }

    /// Only an order whose creation was rolled back is ever removed.
    fn on_delete(&self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Pending || self.status_timestamps.len() > 1 {
            return Err(OrderError::AlreadyTerminal(self.status));
        }
        Ok(())
    }

    fn handle_action(&mut self, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        match action {
            OrderAction::Transition { to, at } => {
                let from = self.status;
                if from.is_terminal() {
                    return Err(OrderError::AlreadyTerminal(from));
                }
                if !from.can_transition_to(to) {
                    return Err(OrderError::InvalidTransition { from, to });
                }
                self.status = to;
                self.status_timestamps.insert(to, at);
                self.updated_at = at;
                Ok(OrderActionResult::Transitioned { from, order: self.clone() })
            }
            OrderAction::Cancel { note, at } => {
                let from = self.status;
                if from.is_terminal() {
                    return Err(OrderError::AlreadyTerminal(from));
                }
                if !from.is_cancellable() {
                    return Err(OrderError::NotCancellable(from));
                }
                self.status = OrderStatus::Cancelled;
                self.status_timestamps.insert(OrderStatus::Cancelled, at);
                self.cancel_note = note;
                self.updated_at = at;
                Ok(OrderActionResult::Cancelled { from, order: self.clone() })
            }
            OrderAction::MarkSettled { at } => {
                if self.settled {
                    return Err(OrderError::AlreadySettled(self.id.clone()));
                }
                if !self.status.is_settlement_eligible() {
                    return Err(OrderError::NotSettleable { id: self.id.clone(), status: self.status });
                }
                self.settled = true;
                self.updated_at = at;
                Ok(OrderActionResult::Settled(self.clone()))
            }
            OrderAction::RevertSettled { at } => {
                self.settled = false;
                self.updated_at = at;
                Ok(OrderActionResult::SettlementReverted(self.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, Fees, Money, OrderLineItem, PaymentKind, PaymentMethodId, ProductId, StoreId, UserId};
    use chrono::{Duration, TimeZone, Utc};

    fn order() -> Order {
        let placed_at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        Order::from_create_params(
            OrderId::new("order_1"),
            OrderCreate {
                buyer_id: UserId::new("user_1"),
                seller_id: StoreId::new("store_1"),
                payment_id: PaymentMethodId::new("pm_1"),
                payment_kind: PaymentKind::CashOnDelivery,
                coupon_id: None,
                line_items: vec![OrderLineItem {
                    product_id: ProductId::new("product_1"),
                    quantity: 2,
                    price: Money::new(100),
                    discount: 0.0,
                }],
                address: Address {
                    recipient_name: None,
                    phone: None,
                    street: "1 Main St".into(),
                    district: None,
                    city: "Hanoi".into(),
                },
                subtotal: Money::new(200),
                coupon_value: Money::ZERO,
                shipping_fee: Money::ZERO,
                total: Money::new(200),
                fees: Fees::default(),
                placed_at,
            },
        )
        .unwrap()
    }

    fn at(minutes: i64) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    #[test]
    fn test_happy_path_stamps_every_status() {
        let mut o = order();
        for (i, to) in [OrderStatus::Confirmed, OrderStatus::Shipped, OrderStatus::Delivered, OrderStatus::Completed]
            .into_iter()
            .enumerate()
        {
            o.handle_action(OrderAction::Transition { to, at: at(i as i64 + 1) }).unwrap();
        }
        assert_eq!(o.status, OrderStatus::Completed);
        let stamped: Vec<_> = o.status_timestamps.keys().copied().collect();
        assert_eq!(
            stamped,
            vec![
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                OrderStatus::Shipped,
                OrderStatus::Delivered,
                OrderStatus::Completed
            ]
        );
        assert_eq!(o.updated_at, at(4));
    }

    #[test]
    fn test_skipping_a_status_is_rejected() {
        let mut o = order();
        let err = o.handle_action(OrderAction::Transition { to: OrderStatus::Delivered, at: at(1) }).unwrap_err();
        assert_eq!(err, OrderError::InvalidTransition { from: OrderStatus::Pending, to: OrderStatus::Delivered });
    }

    #[test]
    fn test_cancel_twice() {
        let mut o = order();
        o.handle_action(OrderAction::Cancel { note: Some("changed mind".into()), at: at(1) }).unwrap();
        assert_eq!(o.cancel_note.as_deref(), Some("changed mind"));
        let err = o.handle_action(OrderAction::Cancel { note: None, at: at(2) }).unwrap_err();
        assert_eq!(err, OrderError::AlreadyTerminal(OrderStatus::Cancelled));
        assert_eq!(o.cancel_note.as_deref(), Some("changed mind"));
    }

    #[test]
    fn test_cannot_cancel_after_shipping() {
        let mut o = order();
        o.handle_action(OrderAction::Transition { to: OrderStatus::Confirmed, at: at(1) }).unwrap();
        o.handle_action(OrderAction::Transition { to: OrderStatus::Shipped, at: at(2) }).unwrap();
        let err = o.handle_action(OrderAction::Cancel { note: None, at: at(3) }).unwrap_err();
        assert_eq!(err, OrderError::NotCancellable(OrderStatus::Shipped));
    }

    #[test]
    fn test_settlement_claim() {
        let mut o = order();
        assert!(matches!(
            o.handle_action(OrderAction::MarkSettled { at: at(1) }),
            Err(OrderError::NotSettleable { .. })
        ));
        for to in [OrderStatus::Confirmed, OrderStatus::Shipped, OrderStatus::Delivered] {
            o.handle_action(OrderAction::Transition { to, at: at(1) }).unwrap();
        }
        o.handle_action(OrderAction::MarkSettled { at: at(2) }).unwrap();
        assert!(o.settled);
        assert_eq!(
            o.handle_action(OrderAction::MarkSettled { at: at(3) }),
            Err(OrderError::AlreadySettled(OrderId::new("order_1")))
        );
        o.handle_action(OrderAction::RevertSettled { at: at(4) }).unwrap();
        assert!(!o.settled);
    }

    #[test]
    fn test_only_fresh_orders_can_be_deleted() {
        let mut o = order();
        assert!(o.on_delete().is_ok());
        o.handle_action(OrderAction::Transition { to: OrderStatus::Confirmed, at: at(1) }).unwrap();
        assert!(o.on_delete().is_err());
    }
}
