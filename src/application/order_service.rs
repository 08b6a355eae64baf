use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderCursor, OrderStatus};
use crate::domain::pagination::{paginate, CursorCache, Page, PageRequest};
use crate::domain::ports::OrderRepository;

pub trait OrderAdmin: Send + Sync {
    fn list_orders(&self, page: i64, status: Option<OrderStatus>)
        -> Result<Page<Order>, DomainError>;
    fn get_order(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, DomainError>;
}

pub struct OrderService<R> {
    repo: R,
    cursors: CursorCache<Option<OrderStatus>, OrderCursor>,
    page_size: i64,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R, page_size: i64) -> Self {
        Self {
            repo,
            cursors: CursorCache::new(),
            page_size,
        }
    }
}

impl<R: OrderRepository> OrderAdmin for OrderService<R> {
    fn list_orders(
        &self,
        page: i64,
        status: Option<OrderStatus>,
    ) -> Result<Page<Order>, DomainError> {
        paginate(
            &self.repo,
            &self.cursors,
            &status,
            PageRequest {
                page,
                page_size: self.page_size,
            },
        )
    }

    fn get_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        self.repo.find_by_id(id)
    }

    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, DomainError> {
        self.repo.update_status(id, status)?;
        // Status-filtered listings change membership.
        self.cursors.clear();
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound)
    }
}
