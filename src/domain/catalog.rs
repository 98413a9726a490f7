use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CategoryId, CouponId, ProductId, StoreId};
use super::money::Money;

/// Product category; the commission rate is a fraction of the gross line price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub commission_rate: f64,
}

#[derive(Debug, Clone)]
pub struct CategoryCreate {
    pub name: String,
    pub commission_rate: f64,
}

/// Represents a product listed by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub store_id: StoreId,
    pub category_id: CategoryId,
    pub name: String,
    pub price: Money,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub store_id: StoreId,
    pub category_id: CategoryId,
    pub name: String,
    pub price: Money,
}

#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub price: Option<Money>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CouponDiscount {
    /// Fraction of the subtotal, e.g. `0.1` for ten percent.
    Percentage(f64),
    Fixed(Money),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponScope {
    AllStores,
    Store(StoreId),
}

/// A store that opted into the coupon. `deleted` is a soft delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponApplication {
    pub store_id: StoreId,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub discount: CouponDiscount,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub scope: CouponScope,
    pub applications: Vec<CouponApplication>,
}

#[derive(Debug, Clone)]
pub struct CouponCreate {
    pub code: String,
    pub discount: CouponDiscount,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub scope: CouponScope,
    pub applications: Vec<CouponApplication>,
}

/// Why a coupon cannot be used for a given order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponRejection {
    NotStarted,
    Expired,
    WrongStore,
    Revoked,
}

impl Coupon {
    /// Checks the validity window, the scope and the store's application entry.
    pub fn check_applicable(&self, store_id: &StoreId, at: DateTime<Utc>) -> Result<(), CouponRejection> {
        if at < self.starts_at {
            return Err(CouponRejection::NotStarted);
        }
        if at > self.ends_at {
            return Err(CouponRejection::Expired);
        }
        if let CouponScope::Store(scoped) = &self.scope {
            if scoped != store_id {
                return Err(CouponRejection::WrongStore);
            }
        }
        let revoked = self
            .applications
            .iter()
            .any(|application| &application.store_id == store_id && application.deleted);
        if revoked {
            return Err(CouponRejection::Revoked);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn coupon(scope: CouponScope, applications: Vec<CouponApplication>) -> Coupon {
        Coupon {
            id: CouponId::new("coupon_1"),
            code: "SAVE".into(),
            discount: CouponDiscount::Fixed(Money::new(50)),
            starts_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            ends_at: Utc.with_ymd_and_hms(2026, 12, 31, 0, 0, 0).unwrap(),
            scope,
            applications,
        }
    }

    #[test]
    fn test_validity_window() {
        let c = coupon(CouponScope::AllStores, vec![]);
        let store = StoreId::new("store_1");
        assert_eq!(c.check_applicable(&store, c.starts_at - Duration::days(1)), Err(CouponRejection::NotStarted));
        assert_eq!(c.check_applicable(&store, c.ends_at + Duration::seconds(1)), Err(CouponRejection::Expired));
        assert_eq!(c.check_applicable(&store, c.starts_at), Ok(()));
    }

    #[test]
    fn test_scope_and_soft_deleted_application() {
        let at = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let scoped = coupon(CouponScope::Store(StoreId::new("store_1")), vec![]);
        assert_eq!(scoped.check_applicable(&StoreId::new("store_2"), at), Err(CouponRejection::WrongStore));
        assert_eq!(scoped.check_applicable(&StoreId::new("store_1"), at), Ok(()));

        let revoked = coupon(
            CouponScope::AllStores,
            vec![CouponApplication { store_id: StoreId::new("store_1"), deleted: true }],
        );
        assert_eq!(revoked.check_applicable(&StoreId::new("store_1"), at), Err(CouponRejection::Revoked));
        assert_eq!(revoked.check_applicable(&StoreId::new("store_3"), at), Ok(()));
    }

    #[test]
    fn test_discount_wire_shape() {
        let json = serde_json::to_value(CouponDiscount::Percentage(0.6)).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "percentage", "value": 0.6 }));
    }
}
