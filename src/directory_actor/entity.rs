//! [`ActorEntity`] implementations for the reference data the fulfillment
//! core reads but does not own.

use crate::actor_framework::ActorEntity;
use crate::domain::{
    Category, CategoryCreate, Coupon, CouponCreate, CouponDiscount, CouponId, CategoryId, PaymentMethod,
    PaymentMethodCreate, PaymentMethodId, Product, ProductCreate, ProductId, ProductPatch, Store, StoreCreate,
    StoreId, StorePatch, User, UserCreate, UserId,
};

use super::error::DirectoryError;

fn invalid(msg: impl Into<String>) -> DirectoryError {
    DirectoryError::ValidationError(msg.into())
}

fn check_rate(name: &str, rate: f64) -> Result<(), DirectoryError> {
    if (0.0..=1.0).contains(&rate) {
        Ok(())
    } else {
        Err(invalid(format!("{} must be within 0..=1, got {}", name, rate)))
    }
}

impl ActorEntity for User {
    const KIND: &'static str = "User";
    type Id = UserId;
    type CreateParams = UserCreate;
    type UpdateParams = ();
    type Action = ();
    type ActionResult = ();
    type Error = DirectoryError;

    fn id(&self) -> &UserId {
        &self.id
    }

    fn from_create_params(id: UserId, params: UserCreate) -> Result<Self, DirectoryError> {
        if params.email.trim().is_empty() {
            return Err(invalid("Email required"));
        }
        Ok(Self { id, name: params.name, email: params.email, phone: params.phone })
    }

    fn on_update(&mut self, _update: ()) -> Result<(), DirectoryError> {
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), DirectoryError> {
        Ok(())
    }
}

impl ActorEntity for Store {
    const KIND: &'static str = "Store";
    type Id = StoreId;
    type CreateParams = StoreCreate;
    type UpdateParams = StorePatch;
    type Action = ();
    type ActionResult = ();
    type Error = DirectoryError;

    fn id(&self) -> &StoreId {
        &self.id
    }

    fn from_create_params(id: StoreId, params: StoreCreate) -> Result<Self, DirectoryError> {
        if params.owner_id.is_blank() {
            return Err(invalid("Store owner required"));
        }
        Ok(Self {
            id,
            name: params.name,
            owner_id: params.owner_id,
            phone: params.phone,
            address: params.address,
            payment_cycle: params.payment_cycle,
        })
    }

    fn on_update(&mut self, patch: StorePatch) -> Result<(), DirectoryError> {
        if let Some(cycle) = patch.payment_cycle {
            self.payment_cycle = cycle;
        }
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), DirectoryError> {
        Ok(())
    }
}

impl ActorEntity for PaymentMethod {
    const KIND: &'static str = "Payment method";
    type Id = PaymentMethodId;
    type CreateParams = PaymentMethodCreate;
    type UpdateParams = ();
    type Action = ();
    type ActionResult = ();
    type Error = DirectoryError;

    fn id(&self) -> &PaymentMethodId {
        &self.id
    }

    fn from_create_params(id: PaymentMethodId, params: PaymentMethodCreate) -> Result<Self, DirectoryError> {
        Ok(Self { id, name: params.name, kind: params.kind })
    }

    fn on_update(&mut self, _update: ()) -> Result<(), DirectoryError> {
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), DirectoryError> {
        Ok(())
    }
}

impl ActorEntity for Category {
    const KIND: &'static str = "Category";
    type Id = CategoryId;
    type CreateParams = CategoryCreate;
    type UpdateParams = ();
    type Action = ();
    type ActionResult = ();
    type Error = DirectoryError;

    fn id(&self) -> &CategoryId {
        &self.id
    }

    fn from_create_params(id: CategoryId, params: CategoryCreate) -> Result<Self, DirectoryError> {
        check_rate("Commission rate", params.commission_rate)?;
        Ok(Self { id, name: params.name, commission_rate: params.commission_rate })
    }

    fn on_update(&mut self, _update: ()) -> Result<(), DirectoryError> {
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), DirectoryError> {
        Ok(())
    }
}

impl ActorEntity for Product {
    const KIND: &'static str = "Product";
    type Id = ProductId;
    type CreateParams = ProductCreate;
    type UpdateParams = ProductPatch;
    type Action = ();
    type ActionResult = ();
    type Error = DirectoryError;

    fn id(&self) -> &ProductId {
        &self.id
    }

    /// New products are listed active.
    fn from_create_params(id: ProductId, params: ProductCreate) -> Result<Self, DirectoryError> {
        if params.price.is_negative() {
            return Err(invalid("Price must not be negative"));
        }
        Ok(Self {
            id,
            store_id: params.store_id,
            category_id: params.category_id,
            name: params.name,
            price: params.price,
            active: true,
        })
    }

    fn on_update(&mut self, patch: ProductPatch) -> Result<(), DirectoryError> {
        if let Some(price) = patch.price {
            if price.is_negative() {
                return Err(invalid("Price must not be negative"));
            }
            self.price = price;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), DirectoryError> {
        Ok(())
    }
}

impl ActorEntity for Coupon {
    const KIND: &'static str = "Coupon";
    type Id = CouponId;
    type CreateParams = CouponCreate;
    type UpdateParams = ();
    type Action = ();
    type ActionResult = ();
    type Error = DirectoryError;

    fn id(&self) -> &CouponId {
        &self.id
    }

    fn from_create_params(id: CouponId, params: CouponCreate) -> Result<Self, DirectoryError> {
        if params.ends_at < params.starts_at {
            return Err(invalid("Coupon ends before it starts"));
        }
        match params.discount {
            CouponDiscount::Percentage(rate) if rate < 0.0 || !rate.is_finite() => {
                return Err(invalid(format!("Percentage must be non-negative, got {}", rate)));
            }
            CouponDiscount::Fixed(amount) if amount.is_negative() => {
                return Err(invalid("Fixed discount must not be negative"));
            }
            _ => {}
        }
        Ok(Self {
            id,
            code: params.code,
            discount: params.discount,
            starts_at: params.starts_at,
            ends_at: params.ends_at,
            scope: params.scope,
            applications: params.applications,
        })
    }

    fn on_update(&mut self, _update: ()) -> Result<(), DirectoryError> {
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), DirectoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Money;

    #[test]
    fn test_category_rate_is_checked() {
        let bad = Category::from_create_params(
            CategoryId::new("c"),
            CategoryCreate { name: "Books".into(), commission_rate: 1.5 },
        );
        assert!(matches!(bad, Err(DirectoryError::ValidationError(_))));
    }

    #[test]
    fn test_product_patch_toggles_active() {
        let mut product = Product::from_create_params(
            ProductId::new("p"),
            ProductCreate {
                store_id: StoreId::new("s"),
                category_id: CategoryId::new("c"),
                name: "Lamp".into(),
                price: Money::new(100),
            },
        )
        .unwrap();
        assert!(product.active);
        product.on_update(ProductPatch { price: Some(Money::new(120)), active: Some(false) }).unwrap();
        assert!(!product.active);
        assert_eq!(product.price, Money::new(120));
    }
}
