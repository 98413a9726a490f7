use tracing::{error, info, Instrument};

use marketplace_fulfillment::app_system::{setup_tracing, MarketplaceConfig, MarketplaceSystem};
use marketplace_fulfillment::domain::{
    Address, CategoryCreate, Money, OrderStatus, PaymentCycle, PaymentKind, PaymentMethodCreate, ProductCreate,
    StoreCreate, UserCreate,
};
use marketplace_fulfillment::order_actor::{CreateOrderRequest, LineItemRequest};

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = MarketplaceConfig::load().map_err(|e| e.to_string())?;
    setup_tracing(&config.log_filter);

    info!("Starting marketplace fulfillment demo");
    let system = MarketplaceSystem::new(config);

    // Reference data
    let span = tracing::info_span!("seed_directory");
    let (buyer_id, store_id, payment_id, product_id) = async {
        let directory = &system.directory;
        let buyer_id = directory
            .create_user(UserCreate {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                phone: "555-0100".to_string(),
            })
            .await
            .map_err(|e| e.to_string())?;
        let owner_id = directory
            .create_user(UserCreate {
                name: "Bob".to_string(),
                email: "bob@example.com".to_string(),
                phone: "555-0199".to_string(),
            })
            .await
            .map_err(|e| e.to_string())?;
        let store_id = directory
            .create_store(StoreCreate {
                name: "Bob's Books".to_string(),
                owner_id,
                phone: "555-0101".to_string(),
                address: "1 Market Square".to_string(),
                payment_cycle: PaymentCycle::Weekly,
            })
            .await
            .map_err(|e| e.to_string())?;
        let payment_id = directory
            .create_payment_method(PaymentMethodCreate {
                name: "Cash on delivery".to_string(),
                kind: PaymentKind::CashOnDelivery,
            })
            .await
            .map_err(|e| e.to_string())?;
        let category_id = directory
            .create_category(CategoryCreate { name: "Books".to_string(), commission_rate: 0.08 })
            .await
            .map_err(|e| e.to_string())?;
        let product_id = directory
            .create_product(ProductCreate {
                store_id: store_id.clone(),
                category_id,
                name: "The Rust Programming Language".to_string(),
                price: Money::new(4_000),
            })
            .await
            .map_err(|e| e.to_string())?;
        system.inventory.open_record(product_id.clone(), 25).await.map_err(|e| e.to_string())?;
        info!(product_id = %product_id, "Directory seeded");
        Ok::<_, String>((buyer_id, store_id, payment_id, product_id))
    }
    .instrument(span)
    .await?;

    // Checkout through delivery
    let request = CreateOrderRequest {
        buyer_id,
        seller_id: store_id.clone(),
        payment_id,
        coupon_id: None,
        line_items: vec![LineItemRequest { product_id, quantity: 2, price: Money::new(4_000), discount: 0.0 }],
        address: Address {
            recipient_name: None,
            phone: None,
            street: "12 Elm Street".to_string(),
            district: None,
            city: "Springfield".to_string(),
        },
        shipping_fee: Some(Money::new(300)),
    };

    let span = tracing::info_span!("order_processing");
    let order_result = async {
        info!("Processing order through the marketplace");
        let order = system.orders.create_order(request).await?;
        for status in [OrderStatus::Confirmed, OrderStatus::Shipped, OrderStatus::Delivered, OrderStatus::Completed] {
            system.orders.set_status(order.id.clone(), status).await?;
        }
        Ok::<_, marketplace_fulfillment::order_actor::OrderError>(order)
    }
    .instrument(span)
    .await;

    match order_result {
        Ok(order) => info!(order_id = %order.id, total = %order.total, "Order fulfilled"),
        Err(e) => error!(error = %e, kind = %e.kind(), "Order processing failed"),
    }

    // Settlement
    match system.payout_processor.run_weekly().await {
        Ok(report) => info!(
            payouts = report.payouts_created.len(),
            total = %report.total_paid(),
            "Weekly payout run complete"
        ),
        Err(e) => error!(error = %e, "Weekly payout run failed"),
    }

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
