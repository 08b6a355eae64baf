use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::errors::DomainError;
use crate::domain::ports::{Collection, StatsRepository};
use crate::domain::stats::{
    calculate_change, customer_breakdown, daily_sales, format_change, format_currency,
    format_number, month_range, period_range, Change, CustomerBreakdown, DailySales, Direction,
    Period, StatMetric, TimeRange,
};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StatCard {
    pub metric: StatMetric,
    /// All-time value.
    pub value: f64,
    pub display_value: String,
    /// e.g. `"12.5% Up from yesterday"`; absent when no comparison is possible.
    pub change: Option<String>,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlySales {
    /// `YYYY-MM`.
    pub month: String,
    #[schema(value_type = String)]
    pub total: BigDecimal,
    pub display_total: String,
    pub days: Vec<DailySales>,
}

pub trait Dashboard: Send + Sync {
    fn stat_cards(&self, now: DateTime<Utc>) -> Result<Vec<StatCard>, DomainError>;
    fn monthly_sales(&self, year: i32, month: u32) -> Result<MonthlySales, DomainError>;
    fn customers(&self) -> Result<CustomerBreakdown, DomainError>;
}

/// Calendar windows are taken in `tz`.
pub struct DashboardService<S, Tz> {
    stats: S,
    tz: Tz,
}

enum Measure {
    Count(i64),
    Amount(BigDecimal),
}

impl Measure {
    fn as_f64(&self) -> f64 {
        match self {
            Measure::Count(n) => *n as f64,
            Measure::Amount(amount) => amount.to_f64().unwrap_or(0.0),
        }
    }

    fn display(&self) -> String {
        match self {
            Measure::Count(n) => format_number(Some(*n)),
            Measure::Amount(amount) => format_currency(Some(amount)),
        }
    }
}

impl<S, Tz> DashboardService<S, Tz>
where
    S: StatsRepository,
    Tz: TimeZone + Send + Sync,
{
    pub fn new(stats: S, tz: Tz) -> Self {
        Self { stats, tz }
    }

    fn measure(
        &self,
        metric: StatMetric,
        range: Option<TimeRange>,
    ) -> Result<Measure, DomainError> {
        Ok(match metric {
            StatMetric::TotalUsers => Measure::Count(self.stats.count(Collection::Users, range)?),
            StatMetric::TotalOrders => Measure::Count(self.stats.count(Collection::Orders, range)?),
            StatMetric::TotalSales => Measure::Amount(self.stats.sum_order_totals(range)?),
        })
    }

    fn change(&self, metric: StatMetric, now: &DateTime<Tz>) -> Result<Change, DomainError> {
        let comparison = metric.comparison();
        let today = self.measure(metric, Some(period_range(Period::Today, now)))?;
        let window = self.measure(metric, Some(period_range(comparison.baseline_period(), now)))?;
        Ok(calculate_change(
            Some(today.as_f64()),
            Some(comparison.baseline(window.as_f64())),
        ))
    }

    fn card(&self, metric: StatMetric, now: &DateTime<Tz>) -> Result<StatCard, DomainError> {
        let current = self.measure(metric, None)?;
        let change = self.change(metric, now).unwrap_or_else(|e| {
            log::warn!("Comparison for {:?} unavailable: {}", metric, e);
            Change::UNAVAILABLE
        });
        Ok(StatCard {
            metric,
            value: current.as_f64(),
            display_value: current.display(),
            change: format_change(&change, metric.comparison().period_text()),
            direction: change.direction,
        })
    }
}

impl<S, Tz> Dashboard for DashboardService<S, Tz>
where
    S: StatsRepository,
    Tz: TimeZone + Send + Sync,
{
    fn stat_cards(&self, now: DateTime<Utc>) -> Result<Vec<StatCard>, DomainError> {
        let now = now.with_timezone(&self.tz);
        StatMetric::ALL
            .into_iter()
            .map(|metric| self.card(metric, &now))
            .collect()
    }

    fn monthly_sales(&self, year: i32, month: u32) -> Result<MonthlySales, DomainError> {
        let (range, days_in_month) = month_range(&self.tz, year, month)
            .ok_or_else(|| DomainError::InvalidInput(format!("Invalid month {year}-{month:02}")))?;
        let orders = self.stats.order_totals(range)?;
        let days = daily_sales(&self.tz, days_in_month, &orders);
        let total = days
            .iter()
            .fold(BigDecimal::from(0), |acc, day| acc + &day.total);
        Ok(MonthlySales {
            month: format!("{year:04}-{month:02}"),
            display_total: format_currency(Some(&total)),
            total,
            days,
        })
    }

    fn customers(&self) -> Result<CustomerBreakdown, DomainError> {
        Ok(customer_breakdown(self.stats.orders_per_customer()?))
    }
}
