use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::dsl::{count_star, sum};
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::{Collection, StatsRepository};
use crate::domain::stats::TimeRange;
use crate::schema::{orders, users};

/// Aggregates run in the database; nothing is counted client-side.
#[derive(Clone)]
pub struct DieselStatsRepository {
    pool: DbPool,
}

impl DieselStatsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl StatsRepository for DieselStatsRepository {
    fn count(&self, collection: Collection, range: Option<TimeRange>) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;
        let count = match collection {
            Collection::Users => {
                let mut query = users::table.into_boxed();
                if let Some(r) = range {
                    query = query
                        .filter(users::created_at.ge(r.start).and(users::created_at.lt(r.end)));
                }
                query.count().get_result(&mut conn)?
            }
            Collection::Orders => {
                let mut query = orders::table.into_boxed();
                if let Some(r) = range {
                    query = query
                        .filter(orders::created_at.ge(r.start).and(orders::created_at.lt(r.end)));
                }
                query.count().get_result(&mut conn)?
            }
        };
        Ok(count)
    }

    fn sum_order_totals(&self, range: Option<TimeRange>) -> Result<BigDecimal, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = orders::table.select(sum(orders::total_price)).into_boxed();
        if let Some(r) = range {
            query = query.filter(orders::created_at.ge(r.start).and(orders::created_at.lt(r.end)));
        }
        let total: Option<BigDecimal> = query.get_result(&mut conn)?;
        Ok(total.unwrap_or_else(|| BigDecimal::from(0)))
    }

    fn order_totals(
        &self,
        range: TimeRange,
    ) -> Result<Vec<(DateTime<Utc>, BigDecimal)>, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(orders::table
            .select((orders::created_at, orders::total_price))
            .filter(orders::created_at.ge(range.start))
            .filter(orders::created_at.lt(range.end))
            .order(orders::created_at.asc())
            .load(&mut conn)?)
    }

    fn orders_per_customer(&self) -> Result<Vec<i64>, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(orders::table
            .group_by(orders::user_id)
            .select(count_star())
            .load(&mut conn)?)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use diesel::prelude::*;
    use uuid::Uuid;

    use super::DieselStatsRepository;
    use crate::db::DbPool;
    use crate::domain::ports::{Collection, StatsRepository};
    use crate::domain::stats::TimeRange;
    use crate::infrastructure::test_db::setup_db;
    use crate::schema::{orders, users};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 10, 0, 0).unwrap()
    }

    fn seed(pool: &DbPool) {
        let mut conn = pool.get().expect("Failed to get connection");
        for (i, at) in [day(1), day(2), day(2)].into_iter().enumerate() {
            diesel::insert_into(users::table)
                .values((
                    users::id.eq(format!("u{i}")),
                    users::email.eq(format!("u{i}@shop.eg")),
                    users::created_at.eq(at),
                ))
                .execute(&mut conn)
                .expect("insert user failed");
        }
        for (customer, at, total) in [
            ("a", day(1), "10.25"),
            ("a", day(2), "20.50"),
            ("b", day(3), "5.00"),
        ] {
            diesel::insert_into(orders::table)
                .values((
                    orders::id.eq(Uuid::new_v4()),
                    orders::order_code.eq("X"),
                    orders::order_date.eq(at),
                    orders::user_id.eq(customer),
                    orders::total_price.eq(BigDecimal::from_str(total).unwrap()),
                    orders::created_at.eq(at),
                ))
                .execute(&mut conn)
                .expect("insert order failed");
        }
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn counts_and_sums_within_half_open_windows() {
        let (_container, pool) = setup_db().await;
        seed(&pool);
        let repo = DieselStatsRepository::new(pool);
        let march_2 = TimeRange {
            start: day(2) - Duration::hours(10),
            end: day(3) - Duration::hours(10),
        };

        assert_eq!(repo.count(Collection::Users, None).unwrap(), 3);
        assert_eq!(repo.count(Collection::Users, Some(march_2)).unwrap(), 2);
        assert_eq!(repo.count(Collection::Orders, Some(march_2)).unwrap(), 1);
        assert_eq!(repo.sum_order_totals(None).unwrap(), BigDecimal::from_str("35.75").unwrap());
        assert_eq!(
            repo.sum_order_totals(Some(march_2)).unwrap(),
            BigDecimal::from_str("20.50").unwrap()
        );

        let empty = TimeRange { start: day(4), end: day(5) };
        assert_eq!(repo.sum_order_totals(Some(empty)).unwrap(), BigDecimal::from(0));
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn lists_totals_and_orders_per_customer() {
        let (_container, pool) = setup_db().await;
        seed(&pool);
        let repo = DieselStatsRepository::new(pool);

        let totals = repo
            .order_totals(TimeRange { start: day(1), end: day(3) })
            .unwrap();
        assert_eq!(totals.iter().map(|(at, _)| *at).collect::<Vec<_>>(), vec![day(1), day(2)]);

        let mut per_customer = repo.orders_per_customer().unwrap();
        per_customer.sort();
        assert_eq!(per_customer, vec![1, 2]);
    }
}
