//! In-memory ports for service tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::auth_service::AuthService;
use crate::application::dashboard_service::DashboardService;
use crate::application::order_service::OrderService;
use crate::application::product_service::ProductService;
use crate::application::user_service::UserService;
use crate::context::AppContext;
use crate::domain::errors::DomainError;
use crate::domain::guard::Session;
use crate::domain::order::{Order, OrderCursor, OrderStatus, ShippingAddress};
use crate::domain::pagination::PageSource;
use crate::domain::ports::{
    BlobStore, Collection, Identity, IdentityProvider, NewAccount, OrderRepository,
    ProductRepository, SignedIn, StatsRepository, UserRepository,
};
use crate::domain::product::{Product, ProductCursor, ProductRecord, Review, ReviewDraft};
use crate::domain::stats::TimeRange;
use crate::domain::user::{NewUser, User, UserCursor};

pub fn user(id: &str, email: &str) -> User {
    User {
        id: id.into(),
        email: email.into(),
        display_name: id.to_uppercase(),
        is_admin: false,
        is_super_admin: false,
        blocked: false,
        created_by: None,
        created_at: Utc::now(),
    }
}

pub fn admin(id: &str, email: &str) -> User {
    User {
        is_admin: true,
        ..user(id, email)
    }
}

pub fn super_admin(id: &str, email: &str) -> User {
    User {
        is_super_admin: true,
        ..admin(id, email)
    }
}

pub fn session_of(user: &User) -> Session {
    Session {
        uid: user.id.clone(),
        email: user.email.clone(),
        profile: Some(user.clone()),
    }
}

/// Shared, cloneable state with a log of the calls made.
#[derive(Debug, Default)]
pub struct Recorded<T> {
    pub state: Mutex<T>,
    pub calls: Mutex<Vec<String>>,
}

impl<T> Recorded<T> {
    pub fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryUsers {
    pub inner: Arc<Recorded<Vec<User>>>,
}

impl InMemoryUsers {
    pub fn with(users: Vec<User>) -> Self {
        let repo = Self::default();
        *repo.inner.state.lock().unwrap() = users;
        repo
    }

    pub fn get(&self, id: &str) -> Option<User> {
        self.inner.state.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }

    fn sorted(&self) -> Vec<User> {
        let mut users = self.inner.state.lock().unwrap().clone();
        users.sort_by(|a, b| (&a.email, &a.id).cmp(&(&b.email, &b.id)));
        users
    }
}

impl PageSource for InMemoryUsers {
    type Item = User;
    type Filter = ();
    type Cursor = UserCursor;

    fn count(&self, _: &()) -> Result<i64, DomainError> {
        self.inner.record("count");
        Ok(self.sorted().len() as i64)
    }

    fn cursor_at(&self, _: &(), position: i64) -> Result<Option<UserCursor>, DomainError> {
        self.inner.record("cursor_at");
        Ok(self.sorted().get(position as usize).map(UserCursor::from))
    }

    fn page_after(
        &self,
        _: &(),
        after: Option<&UserCursor>,
        limit: i64,
    ) -> Result<Vec<User>, DomainError> {
        self.inner.record("page_after");
        Ok(self
            .sorted()
            .into_iter()
            .filter(|u| after.map_or(true, |c| (&u.email, &u.id) > (&c.email, &c.id)))
            .take(limit as usize)
            .collect())
    }

    fn cursor_of(item: &User) -> UserCursor {
        UserCursor::from(item)
    }
}

impl UserRepository for InMemoryUsers {
    fn find_by_id(&self, id: &str) -> Result<Option<User>, DomainError> {
        self.inner.record(format!("find {id}"));
        Ok(self.get(id))
    }

    fn insert(&self, new: NewUser) -> Result<User, DomainError> {
        self.inner.record(format!("insert {}", new.id));
        let user = User {
            id: new.id,
            email: new.email,
            display_name: new.display_name,
            is_admin: new.is_admin,
            is_super_admin: false,
            blocked: false,
            created_by: new.created_by,
            created_at: Utc::now(),
        };
        self.inner.state.lock().unwrap().push(user.clone());
        Ok(user)
    }

    fn set_blocked(&self, id: &str, blocked: bool) -> Result<(), DomainError> {
        self.inner.record(format!("set_blocked {id} {blocked}"));
        let mut users = self.inner.state.lock().unwrap();
        let user = users.iter_mut().find(|u| u.id == id).ok_or(DomainError::NotFound)?;
        user.blocked = blocked;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.inner.record(format!("delete {id}"));
        let mut users = self.inner.state.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}

pub fn order(code: &str, date: DateTime<Utc>, status: OrderStatus) -> Order {
    Order {
        id: Uuid::new_v4(),
        order_code: code.into(),
        order_date: date,
        user_id: "customer-1".into(),
        items: Vec::new(),
        payment_method: "cash".into(),
        shipping_address: ShippingAddress::default(),
        status,
        total_price: BigDecimal::from(100),
        created_at: date,
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryOrders {
    pub inner: Arc<Recorded<Vec<Order>>>,
}

impl InMemoryOrders {
    pub fn with(orders: Vec<Order>) -> Self {
        let repo = Self::default();
        *repo.inner.state.lock().unwrap() = orders;
        repo
    }

    fn matching(&self, filter: &Option<OrderStatus>) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .inner
            .state
            .lock()
            .unwrap()
            .iter()
            .filter(|o| filter.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        orders.sort_by(|a, b| (b.order_date, b.id).cmp(&(a.order_date, a.id)));
        orders
    }
}

impl PageSource for InMemoryOrders {
    type Item = Order;
    type Filter = Option<OrderStatus>;
    type Cursor = OrderCursor;

    fn count(&self, filter: &Option<OrderStatus>) -> Result<i64, DomainError> {
        Ok(self.matching(filter).len() as i64)
    }

    fn cursor_at(
        &self,
        filter: &Option<OrderStatus>,
        position: i64,
    ) -> Result<Option<OrderCursor>, DomainError> {
        Ok(self.matching(filter).get(position as usize).map(OrderCursor::from))
    }

    fn page_after(
        &self,
        filter: &Option<OrderStatus>,
        after: Option<&OrderCursor>,
        limit: i64,
    ) -> Result<Vec<Order>, DomainError> {
        Ok(self
            .matching(filter)
            .into_iter()
            .filter(|o| after.map_or(true, |c| (o.order_date, o.id) < (c.order_date, c.id)))
            .take(limit as usize)
            .collect())
    }

    fn cursor_of(item: &Order) -> OrderCursor {
        OrderCursor::from(item)
    }
}

impl OrderRepository for InMemoryOrders {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.inner.state.lock().unwrap().iter().find(|o| o.id == id).cloned())
    }

    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), DomainError> {
        let mut orders = self.inner.state.lock().unwrap();
        let order = orders.iter_mut().find(|o| o.id == id).ok_or(DomainError::NotFound)?;
        order.status = status;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryProducts {
    pub inner: Arc<Recorded<(Vec<Product>, Vec<Review>)>>,
}

impl InMemoryProducts {
    pub fn products(&self) -> Vec<Product> {
        let mut products = self.inner.state.lock().unwrap().0.clone();
        products.sort_by(|a, b| (&a.code, a.id).cmp(&(&b.code, b.id)));
        products
    }
}

impl PageSource for InMemoryProducts {
    type Item = Product;
    type Filter = ();
    type Cursor = ProductCursor;

    fn count(&self, _: &()) -> Result<i64, DomainError> {
        Ok(self.products().len() as i64)
    }

    fn cursor_at(&self, _: &(), position: i64) -> Result<Option<ProductCursor>, DomainError> {
        Ok(self.products().get(position as usize).map(ProductCursor::from))
    }

    fn page_after(
        &self,
        _: &(),
        after: Option<&ProductCursor>,
        limit: i64,
    ) -> Result<Vec<Product>, DomainError> {
        Ok(self
            .products()
            .into_iter()
            .filter(|p| after.map_or(true, |c| (&p.code, p.id) > (&c.code, c.id)))
            .take(limit as usize)
            .collect())
    }

    fn cursor_of(item: &Product) -> ProductCursor {
        ProductCursor::from(item)
    }
}

impl ProductRepository for InMemoryProducts {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.products().into_iter().find(|p| p.id == id))
    }

    fn insert(&self, record: ProductRecord) -> Result<Product, DomainError> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            code: record.draft.code,
            name: record.draft.name,
            description: record.draft.description,
            price: record.draft.price,
            unmissable_offer: record.draft.unmissable_offer,
            image_url: record.image_url,
            created_at: now,
            updated_at: now,
        };
        self.inner.state.lock().unwrap().0.push(product.clone());
        Ok(product)
    }

    fn update(&self, id: Uuid, record: ProductRecord) -> Result<Product, DomainError> {
        let mut state = self.inner.state.lock().unwrap();
        let product = state.0.iter_mut().find(|p| p.id == id).ok_or(DomainError::NotFound)?;
        product.code = record.draft.code;
        product.name = record.draft.name;
        product.description = record.draft.description;
        product.price = record.draft.price;
        product.unmissable_offer = record.draft.unmissable_offer;
        product.image_url = record.image_url;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut state = self.inner.state.lock().unwrap();
        let before = state.0.len();
        state.0.retain(|p| p.id != id);
        if state.0.len() == before {
            return Err(DomainError::NotFound);
        }
        state.1.retain(|r| r.product_id != id);
        Ok(())
    }

    fn add_review(&self, product_id: Uuid, review: ReviewDraft) -> Result<Review, DomainError> {
        let review = Review {
            id: Uuid::new_v4(),
            product_id,
            reviewer_name: review.reviewer_name,
            rating: review.rating,
            comment: review.comment,
            review_date: Utc::now(),
        };
        self.inner.state.lock().unwrap().1.push(review.clone());
        Ok(review)
    }

    fn list_reviews(&self, product_id: Uuid) -> Result<Vec<Review>, DomainError> {
        let mut reviews: Vec<Review> = self
            .inner
            .state
            .lock()
            .unwrap()
            .1
            .iter()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.review_date.cmp(&a.review_date));
        Ok(reviews)
    }
}

/// Users and orders by creation time, for dashboard tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStats {
    pub users: Vec<DateTime<Utc>>,
    pub orders: Vec<(String, DateTime<Utc>, BigDecimal)>,
    pub failing_ranges: bool,
}

impl InMemoryStats {
    fn in_range(range: Option<TimeRange>, at: &DateTime<Utc>) -> bool {
        range.map_or(true, |r| r.contains(at))
    }
}

impl StatsRepository for InMemoryStats {
    fn count(&self, collection: Collection, range: Option<TimeRange>) -> Result<i64, DomainError> {
        if self.failing_ranges && range.is_some() {
            return Err(DomainError::Internal("window query failed".into()));
        }
        let count = match collection {
            Collection::Users => self.users.iter().filter(|t| Self::in_range(range, t)).count(),
            Collection::Orders => self
                .orders
                .iter()
                .filter(|(_, t, _)| Self::in_range(range, t))
                .count(),
        };
        Ok(count as i64)
    }

    fn sum_order_totals(&self, range: Option<TimeRange>) -> Result<BigDecimal, DomainError> {
        if self.failing_ranges && range.is_some() {
            return Err(DomainError::Internal("window query failed".into()));
        }
        Ok(self
            .orders
            .iter()
            .filter(|(_, t, _)| Self::in_range(range, t))
            .fold(BigDecimal::from(0), |acc, (_, _, total)| acc + total))
    }

    fn order_totals(
        &self,
        range: TimeRange,
    ) -> Result<Vec<(DateTime<Utc>, BigDecimal)>, DomainError> {
        Ok(self
            .orders
            .iter()
            .filter(|(_, t, _)| range.contains(t))
            .map(|(_, t, total)| (*t, total.clone()))
            .collect())
    }

    fn orders_per_customer(&self) -> Result<Vec<i64>, DomainError> {
        let mut counts: HashMap<&str, i64> = HashMap::new();
        for (customer, _, _) in &self.orders {
            *counts.entry(customer.as_str()).or_default() += 1;
        }
        Ok(counts.into_values().collect())
    }
}

/// Identity service double. Accounts map email -> (uid, password, token).
#[derive(Debug, Clone, Default)]
pub struct FakeIdentity {
    pub inner: Arc<Recorded<Vec<(String, String, String)>>>,
    pub unreachable: bool,
}

impl FakeIdentity {
    pub fn with_account(uid: &str, email: &str, password: &str) -> Self {
        let identity = Self::default();
        identity.inner.state.lock().unwrap().push((
            uid.to_string(),
            email.to_string(),
            password.to_string(),
        ));
        identity
    }

    pub fn add_account(&self, uid: &str, email: &str, password: &str) {
        self.inner.state.lock().unwrap().push((
            uid.to_string(),
            email.to_string(),
            password.to_string(),
        ));
    }

    pub fn token_for(uid: &str) -> String {
        format!("token-{uid}")
    }

    fn reachable(&self) -> Result<(), DomainError> {
        if self.unreachable {
            return Err(DomainError::Internal("identity service unreachable".into()));
        }
        Ok(())
    }
}

impl IdentityProvider for FakeIdentity {
    fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, DomainError> {
        self.inner.record(format!("sign_in {email}"));
        self.reachable()?;
        let accounts = self.inner.state.lock().unwrap();
        accounts
            .iter()
            .find(|(_, e, p)| e == email && p == password)
            .map(|(uid, email, _)| SignedIn {
                uid: uid.clone(),
                email: email.clone(),
                id_token: Self::token_for(uid),
                refresh_token: format!("refresh-{uid}"),
            })
            .ok_or_else(|| DomainError::Unauthorized("INVALID_LOGIN_CREDENTIALS".into()))
    }

    fn verify(&self, id_token: &str) -> Result<Option<Identity>, DomainError> {
        self.inner.record("verify");
        self.reachable()?;
        let accounts = self.inner.state.lock().unwrap();
        Ok(accounts
            .iter()
            .find(|(uid, _, _)| Self::token_for(uid) == id_token)
            .map(|(uid, email, _)| Identity {
                uid: uid.clone(),
                email: email.clone(),
            }))
    }

    fn revoke_sessions(&self, uid: &str) -> Result<(), DomainError> {
        self.inner.record(format!("revoke {uid}"));
        self.reachable()
    }

    fn send_password_reset(&self, email: &str) -> Result<(), DomainError> {
        self.inner.record(format!("reset {email}"));
        self.reachable()
    }

    fn create_account(&self, account: &NewAccount) -> Result<String, DomainError> {
        self.inner.record(format!("create {}", account.email));
        self.reachable()?;
        let uid = format!("uid-{}", account.email);
        self.inner.state.lock().unwrap().push((
            uid.clone(),
            account.email.clone(),
            account.password.clone(),
        ));
        Ok(uid)
    }

    fn grant_admin(&self, uid: &str) -> Result<(), DomainError> {
        self.inner.record(format!("grant_admin {uid}"));
        self.reachable()
    }

    fn delete_account(&self, uid: &str) -> Result<(), DomainError> {
        self.inner.record(format!("delete_account {uid}"));
        self.reachable()?;
        self.inner.state.lock().unwrap().retain(|(id, _, _)| id != uid);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBlobs {
    pub objects: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl BlobStore for MemoryBlobs {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<String, DomainError> {
        self.objects.lock().unwrap().push((key.to_string(), bytes.to_vec()));
        Ok(format!("https://blobs.test/{key}"))
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, bytes)| bytes.clone()))
    }
}

/// Every fake behind one `AppContext`, for HTTP tests.
#[derive(Debug, Clone, Default)]
pub struct FakeConsole {
    pub users: InMemoryUsers,
    pub orders: InMemoryOrders,
    pub products: InMemoryProducts,
    pub stats: InMemoryStats,
    pub identity: FakeIdentity,
    pub blobs: MemoryBlobs,
}

impl FakeConsole {
    /// Registers `user` with the identity fake and the profile store.
    /// Its bearer token is `FakeIdentity::token_for(&user.id)`.
    pub fn with_member(self, user: User) -> Self {
        self.identity.add_account(&user.id, &user.email, "secret1");
        self.users.inner.state.lock().unwrap().push(user);
        self
    }

    pub fn context(&self, page_size: i64) -> AppContext {
        let identity = Arc::new(self.identity.clone());
        let blobs = Arc::new(self.blobs.clone());
        AppContext {
            auth: Arc::new(AuthService::new(self.users.clone(), identity.clone())),
            users: Arc::new(UserService::new(self.users.clone(), identity, page_size)),
            orders: Arc::new(OrderService::new(self.orders.clone(), page_size)),
            products: Arc::new(ProductService::new(
                self.products.clone(),
                blobs.clone(),
                page_size,
            )),
            dashboard: Arc::new(DashboardService::new(self.stats.clone(), Utc)),
            blobs,
        }
    }
}

pub fn bearer(uid: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", FakeIdentity::token_for(uid)))
}
