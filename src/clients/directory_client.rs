use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::directory_actor::DirectoryError;
use crate::domain::{
    Category, Coupon, PaymentCycle, PaymentMethod, Product, ProductId, ProductPatch, Store, StoreId, StorePatch,
    User,
};

/// Reference data read by checkout and by the payout run.
#[derive(Clone)]
pub struct DirectoryClient {
    users: ResourceClient<User>,
    stores: ResourceClient<Store>,
    payment_methods: ResourceClient<PaymentMethod>,
    categories: ResourceClient<Category>,
    products: ResourceClient<Product>,
    coupons: ResourceClient<Coupon>,
}

impl DirectoryClient {
    pub fn new(
        users: ResourceClient<User>,
        stores: ResourceClient<Store>,
        payment_methods: ResourceClient<PaymentMethod>,
        categories: ResourceClient<Category>,
        products: ResourceClient<Product>,
        coupons: ResourceClient<Coupon>,
    ) -> Self {
        Self { users, stores, payment_methods, categories, products, coupons }
    }

    /// Stores settled by the given cycle, ordered by id.
    #[instrument(skip(self))]
    pub async fn stores_with_cycle(&self, cycle: PaymentCycle) -> Result<Vec<Store>, DirectoryError> {
        debug!("Sending request");
        let mut stores = self.stores.list(move |store: &Store| store.payment_cycle == cycle).await?;
        stores.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(stores)
    }

    #[instrument(skip(self))]
    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Product, DirectoryError> {
        debug!("Sending request");
        self.products.update(id, patch).await.map_err(DirectoryError::from)
    }

    #[instrument(skip(self))]
    pub async fn update_store(&self, id: StoreId, patch: StorePatch) -> Result<Store, DirectoryError> {
        debug!("Sending request");
        self.stores.update(id, patch).await.map_err(DirectoryError::from)
    }
}

crate::impl_resource_methods!(DirectoryClient, users, User, DirectoryError, user);
crate::impl_resource_methods!(DirectoryClient, stores, Store, DirectoryError, store);
crate::impl_resource_methods!(DirectoryClient, payment_methods, PaymentMethod, DirectoryError, payment_method);
crate::impl_resource_methods!(DirectoryClient, categories, Category, DirectoryError, category);
crate::impl_resource_methods!(DirectoryClient, products, Product, DirectoryError, product);
crate::impl_resource_methods!(DirectoryClient, coupons, Coupon, DirectoryError, coupon);
