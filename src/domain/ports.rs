use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{Order, OrderCursor, OrderStatus};
use super::pagination::PageSource;
use super::product::{Product, ProductCursor, ProductRecord, Review, ReviewDraft};
use super::stats::TimeRange;
use super::user::{NewUser, User, UserCursor};

pub trait UserRepository:
    PageSource<Item = User, Filter = (), Cursor = UserCursor> + Send + Sync + 'static
{
    fn find_by_id(&self, id: &str) -> Result<Option<User>, DomainError>;
    fn insert(&self, user: NewUser) -> Result<User, DomainError>;
    /// `NotFound` when no such user exists.
    fn set_blocked(&self, id: &str, blocked: bool) -> Result<(), DomainError>;
    fn delete(&self, id: &str) -> Result<(), DomainError>;
}

/// Orders are listed newest first, optionally filtered by status.
pub trait OrderRepository:
    PageSource<Item = Order, Filter = Option<OrderStatus>, Cursor = OrderCursor>
    + Send
    + Sync
    + 'static
{
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), DomainError>;
}

pub trait ProductRepository:
    PageSource<Item = Product, Filter = (), Cursor = ProductCursor> + Send + Sync + 'static
{
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn insert(&self, record: ProductRecord) -> Result<Product, DomainError>;
    fn update(&self, id: Uuid, record: ProductRecord) -> Result<Product, DomainError>;
    fn delete(&self, id: Uuid) -> Result<(), DomainError>;
    fn add_review(&self, product_id: Uuid, review: ReviewDraft) -> Result<Review, DomainError>;
    /// Newest first.
    fn list_reviews(&self, product_id: Uuid) -> Result<Vec<Review>, DomainError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Orders,
}

pub trait StatsRepository: Send + Sync + 'static {
    /// Records created within `range`, or all records when `None`.
    fn count(&self, collection: Collection, range: Option<TimeRange>) -> Result<i64, DomainError>;
    fn sum_order_totals(&self, range: Option<TimeRange>) -> Result<BigDecimal, DomainError>;
    /// `(created_at, total_price)` of every order created within `range`.
    fn order_totals(&self, range: TimeRange)
        -> Result<Vec<(DateTime<Utc>, BigDecimal)>, DomainError>;
    /// Number of orders of each ordering customer.
    fn orders_per_customer(&self) -> Result<Vec<i64>, DomainError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignedIn {
    pub uid: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// The hosted identity service.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Email/password sign-in. Bad credentials are `Unauthorized`.
    fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, DomainError>;
    /// `None` for expired, revoked or malformed tokens.
    fn verify(&self, id_token: &str) -> Result<Option<Identity>, DomainError>;
    fn revoke_sessions(&self, uid: &str) -> Result<(), DomainError>;
    fn send_password_reset(&self, email: &str) -> Result<(), DomainError>;
    /// Returns the new account's uid.
    fn create_account(&self, account: &NewAccount) -> Result<String, DomainError>;
    fn grant_admin(&self, uid: &str) -> Result<(), DomainError>;
    fn delete_account(&self, uid: &str) -> Result<(), DomainError>;
}

pub trait BlobStore: Send + Sync + 'static {
    /// Stores `bytes` under `key` and returns a URL the object can be fetched from.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<String, DomainError>;
    /// `None` when nothing is stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError>;
}
