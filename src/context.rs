//! App Context

use std::sync::Arc;

use chrono::Local;

use crate::application::auth_service::{AuthService, SessionAuth};
use crate::application::dashboard_service::{Dashboard, DashboardService};
use crate::application::order_service::{OrderAdmin, OrderService};
use crate::application::product_service::{ProductCatalog, ProductService};
use crate::application::user_service::{UserAdmin, UserService};
use crate::config::Config;
use crate::db::DbPool;
use crate::domain::ports::BlobStore;
use crate::infrastructure::blob_store::FsBlobStore;
use crate::infrastructure::identity::IdentityToolkitClient;
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::infrastructure::product_repo::DieselProductRepository;
use crate::infrastructure::stats_repo::DieselStatsRepository;
use crate::infrastructure::user_repo::DieselUserRepository;

/// Everything a request handler can reach.
#[derive(Clone)]
pub struct AppContext {
    pub auth: Arc<dyn SessionAuth>,
    pub users: Arc<dyn UserAdmin>,
    pub orders: Arc<dyn OrderAdmin>,
    pub products: Arc<dyn ProductCatalog>,
    pub dashboard: Arc<dyn Dashboard>,
    pub blobs: Arc<dyn BlobStore>,
}

impl AppContext {
    /// Wire the PostgreSQL repositories, the identity service client and the
    /// filesystem blob store.
    pub fn from_pool(pool: DbPool, config: &Config) -> Self {
        let identity = Arc::new(IdentityToolkitClient::new(&config.identity));
        let blobs = Arc::new(FsBlobStore::new(&config.blob_root, &config.blob_public_url));
        let users = DieselUserRepository::new(pool.clone());

        Self {
            auth: Arc::new(AuthService::new(users.clone(), identity.clone())),
            users: Arc::new(UserService::new(users, identity, config.page_size)),
            orders: Arc::new(OrderService::new(
                DieselOrderRepository::new(pool.clone()),
                config.page_size,
            )),
            products: Arc::new(ProductService::new(
                DieselProductRepository::new(pool.clone()),
                blobs.clone(),
                config.page_size,
            )),
            dashboard: Arc::new(DashboardService::new(DieselStatsRepository::new(pool), Local)),
            blobs,
        }
    }
}
