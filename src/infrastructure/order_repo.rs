use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderCursor, OrderStatus};
use crate::domain::pagination::PageSource;
use crate::domain::ports::OrderRepository;
use crate::schema::{order_items, orders};

use super::models::{OrderItemRow, OrderRow};

#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

type BoxedOrders<'a> = orders::BoxedQuery<'a, Pg>;

/// Orders matching `status`, newest first.
fn listing<'a>(status: Option<OrderStatus>) -> BoxedOrders<'a> {
    let mut query = orders::table
        .order((orders::order_date.desc(), orders::id.desc()))
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(orders::status.eq(status.as_str()));
    }
    query
}

fn with_items(conn: &mut PgConnection, rows: Vec<OrderRow>) -> Result<Vec<Order>, DomainError> {
    let items = OrderItemRow::belonging_to(&rows)
        .select(OrderItemRow::as_select())
        .order(order_items::position.asc())
        .load(conn)?;
    items
        .grouped_by(&rows)
        .into_iter()
        .zip(rows)
        .map(|(items, order)| order.into_order(items))
        .collect()
}

impl PageSource for DieselOrderRepository {
    type Item = Order;
    type Filter = Option<OrderStatus>;
    type Cursor = OrderCursor;

    fn count(&self, status: &Option<OrderStatus>) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = orders::table.into_boxed();
        if let Some(status) = status {
            query = query.filter(orders::status.eq(status.as_str()));
        }
        Ok(query.count().get_result(&mut conn)?)
    }

    fn cursor_at(
        &self,
        status: &Option<OrderStatus>,
        position: i64,
    ) -> Result<Option<OrderCursor>, DomainError> {
        let mut conn = self.pool.get()?;
        let key = listing(*status)
            .select((orders::order_date, orders::id))
            .offset(position)
            .first::<(DateTime<Utc>, Uuid)>(&mut conn)
            .optional()?;
        Ok(key.map(|(order_date, id)| OrderCursor { order_date, id }))
    }

    fn page_after(
        &self,
        status: &Option<OrderStatus>,
        after: Option<&OrderCursor>,
        limit: i64,
    ) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = listing(*status).select(OrderRow::as_select()).limit(limit);
        if let Some(c) = after {
            query = query.filter(
                orders::order_date
                    .lt(c.order_date)
                    .or(orders::order_date.eq(c.order_date).and(orders::id.lt(c.id))),
            );
        }
        let rows = query.load(&mut conn)?;
        with_items(&mut conn, rows)
    }

    fn cursor_of(item: &Order) -> OrderCursor {
        OrderCursor::from(item)
    }
}

impl OrderRepository for DieselOrderRepository {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        Ok(with_items(&mut conn, vec![order])?.pop())
    }

    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(orders::table.find(id))
            .set(orders::status.eq(status.as_str()))
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}
