//! Newtype ids so a `ProductId` can never be passed where an `OrderId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(String);

            impl $name {
                pub fn new(id: impl Into<String>) -> Self {
                    Self(id.into())
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }

                pub fn is_blank(&self) -> bool {
                    self.0.trim().is_empty()
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<String> for $name {
                fn from(s: String) -> Self {
                    Self(s)
                }
            }

            impl From<&str> for $name {
                fn from(s: &str) -> Self {
                    Self(s.to_string())
                }
            }

            impl AsRef<str> for $name {
                fn as_ref(&self) -> &str {
                    &self.0
                }
            }
        )*
    };
}

define_id!(
    UserId,
    StoreId,
    PaymentMethodId,
    CategoryId,
    ProductId,
    CouponId,
    OrderId,
    PayoutId,
    ShipmentId,
    RecipientId,
);
