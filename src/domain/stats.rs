//! Dashboard arithmetic: calendar windows, period-over-period change and
//! display formatting.

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Half-open `[start, end)` interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    Yesterday,
    /// The seven whole days ending at the end of yesterday.
    PastWeek,
}

/// Window of `period` in the local calendar of `now`.
pub fn period_range<Tz: TimeZone>(period: Period, now: &DateTime<Tz>) -> TimeRange {
    let tz = now.timezone();
    let today = now.date_naive();
    let (first, end) = match period {
        Period::Today => (today, today + Duration::days(1)),
        Period::Yesterday => (today - Duration::days(1), today),
        Period::PastWeek => (today - Duration::days(7), today),
    };
    TimeRange {
        start: local_midnight(&tz, first),
        end: local_midnight(&tz, end),
    }
}

/// Window of a calendar month in `tz`, with its number of days.
pub fn month_range<Tz: TimeZone>(tz: &Tz, year: i32, month: u32) -> Option<(TimeRange, u32)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let days = u32::try_from((next - first).num_days()).ok()?;
    Some((
        TimeRange {
            start: local_midnight(tz, first),
            end: local_midnight(tz, next),
        },
        days,
    ))
}

fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    // Midnight can fall in a DST gap; the UTC reading is close enough there.
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Change {
    pub percentage: Option<f64>,
    pub direction: Direction,
}

impl Change {
    pub const UNAVAILABLE: Change = Change {
        percentage: None,
        direction: Direction::Neutral,
    };
}

pub fn calculate_change(current: Option<f64>, previous: Option<f64>) -> Change {
    let (Some(current), Some(previous)) = (current, previous) else {
        return Change::UNAVAILABLE;
    };
    if previous == 0.0 {
        return Change::UNAVAILABLE;
    }
    let change = (current - previous) / previous * 100.0;
    let direction = if change > 0.0 {
        Direction::Up
    } else if change < 0.0 {
        Direction::Down
    } else {
        Direction::Neutral
    };
    Change {
        percentage: Some(change.abs()),
        direction,
    }
}

/// `"12.5% Up from yesterday"`, or `None` when the change is unavailable.
pub fn format_change(change: &Change, period_text: &str) -> Option<String> {
    let percentage = change.percentage?;
    Some(match change.direction {
        Direction::Up => format!("{percentage:.1}% Up {period_text}"),
        Direction::Down => format!("{percentage:.1}% Down {period_text}"),
        Direction::Neutral => format!("No change {period_text}"),
    })
}

pub const CURRENCY_CODE: &str = "EGP";
const CURRENCY_PLACEHOLDER: &str = "$...";
const NUMBER_PLACEHOLDER: &str = "...";

pub fn format_currency(amount: Option<&BigDecimal>) -> String {
    let Some(amount) = amount else {
        return CURRENCY_PLACEHOLDER.to_string();
    };
    let whole = amount.with_scale_round(0, RoundingMode::HalfUp).to_string();
    format!("{CURRENCY_CODE} {}", group_thousands(&whole))
}

pub fn format_number(value: Option<i64>) -> String {
    match value {
        Some(value) => group_thousands(&value.to_string()),
        None => NUMBER_PLACEHOLDER.to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}

/// Dashboard stat cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatMetric {
    TotalUsers,
    TotalOrders,
    TotalSales,
}

/// Which two windows a stat card compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    TodayVsYesterday,
    TodayVsPastWeekAverage,
}

impl StatMetric {
    pub const ALL: [StatMetric; 3] = [
        StatMetric::TotalUsers,
        StatMetric::TotalOrders,
        StatMetric::TotalSales,
    ];

    pub fn comparison(self) -> Comparison {
        match self {
            StatMetric::TotalUsers | StatMetric::TotalSales => Comparison::TodayVsYesterday,
            StatMetric::TotalOrders => Comparison::TodayVsPastWeekAverage,
        }
    }
}

impl Comparison {
    pub fn period_text(self) -> &'static str {
        match self {
            Comparison::TodayVsYesterday => "from yesterday",
            Comparison::TodayVsPastWeekAverage => "from past week avg",
        }
    }

    pub fn baseline_period(self) -> Period {
        match self {
            Comparison::TodayVsYesterday => Period::Yesterday,
            Comparison::TodayVsPastWeekAverage => Period::PastWeek,
        }
    }

    /// The value `today` is compared against, given the baseline window's total.
    pub fn baseline(self, window_total: f64) -> f64 {
        match self {
            Comparison::TodayVsYesterday => window_total,
            Comparison::TodayVsPastWeekAverage => window_total / 7.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailySales {
    pub day: u32,
    #[schema(value_type = String)]
    pub total: BigDecimal,
}

/// Order totals bucketed by local day of month, one entry per day.
pub fn daily_sales<Tz: TimeZone>(
    tz: &Tz,
    days_in_month: u32,
    orders: &[(DateTime<Utc>, BigDecimal)],
) -> Vec<DailySales> {
    let mut days: Vec<DailySales> = (1..=days_in_month)
        .map(|day| DailySales {
            day,
            total: BigDecimal::from(0),
        })
        .collect();
    for (created_at, total) in orders {
        let day = created_at.with_timezone(tz).day();
        if let Some(bucket) = days.get_mut(day as usize - 1) {
            bucket.total += total;
        }
    }
    days
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct CustomerBreakdown {
    pub new_customers: i64,
    pub repeated_customers: i64,
}

/// Customers with one order are new; more than one, repeated.
pub fn customer_breakdown(orders_per_customer: impl IntoIterator<Item = i64>) -> CustomerBreakdown {
    orders_per_customer
        .into_iter()
        .fold(CustomerBreakdown::default(), |mut acc, orders| {
            match orders {
                1 => acc.new_customers += 1,
                n if n > 1 => acc.repeated_customers += 1,
                _ => {}
            }
            acc
        })
}
