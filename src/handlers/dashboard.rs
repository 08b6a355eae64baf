use actix_web::{web, HttpResponse};
use chrono::{Datelike, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::session::AdminSession;
use crate::application::dashboard_service::{MonthlySales, StatCard};
use crate::context::AppContext;
use crate::domain::stats::CustomerBreakdown;
use crate::errors::AppError;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatCardsResponse {
    pub cards: Vec<StatCard>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SalesParams {
    /// `YYYY-MM`; the current month when absent.
    pub month: Option<String>,
}

/// Parse `YYYY-MM`.
fn parse_month(raw: &str) -> Result<(i32, u32), AppError> {
    NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
        .map(|date| (date.year(), date.month()))
        .map_err(|_| AppError::BadRequest(format!("Invalid month '{raw}', expected YYYY-MM")))
}

/// GET /dashboard/stats
///
/// Totals for users, orders and sales, each compared with its baseline window.
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    responses(
        (status = 200, description = "Stat cards", body = StatCardsResponse),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = [])),
    tag = "dashboard"
)]
pub async fn stat_cards(
    _admin: AdminSession,
    ctx: web::Data<AppContext>,
) -> Result<HttpResponse, AppError> {
    let dashboard = ctx.dashboard.clone();
    let cards = web::block(move || dashboard.stat_cards(Utc::now()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(StatCardsResponse { cards }))
}

/// GET /dashboard/sales
#[utoipa::path(
    get,
    path = "/dashboard/sales",
    params(("month" = Option<String>, Query, description = "YYYY-MM, default this month")),
    responses(
        (status = 200, description = "Daily sales of the month", body = MonthlySales),
        (status = 400, description = "Invalid month"),
    ),
    security(("bearer_auth" = [])),
    tag = "dashboard"
)]
pub async fn monthly_sales(
    _admin: AdminSession,
    ctx: web::Data<AppContext>,
    params: web::Query<SalesParams>,
) -> Result<HttpResponse, AppError> {
    let (year, month) = match params.month.as_deref().filter(|m| !m.trim().is_empty()) {
        Some(raw) => parse_month(raw)?,
        None => {
            let today = Local::now();
            (today.year(), today.month())
        }
    };
    let dashboard = ctx.dashboard.clone();
    let sales = web::block(move || dashboard.monthly_sales(year, month))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(sales))
}

/// GET /dashboard/customers
#[utoipa::path(
    get,
    path = "/dashboard/customers",
    responses(
        (status = 200, description = "New and repeat customers", body = CustomerBreakdown),
    ),
    security(("bearer_auth" = [])),
    tag = "dashboard"
)]
pub async fn customers(
    _admin: AdminSession,
    ctx: web::Data<AppContext>,
) -> Result<HttpResponse, AppError> {
    let dashboard = ctx.dashboard.clone();
    let breakdown = web::block(move || dashboard.customers())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(breakdown))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use bigdecimal::BigDecimal;
    use chrono::TimeZone;
    use serde_json::Value;

    use super::*;
    use crate::application::test_support::{admin, bearer, FakeConsole, InMemoryStats};

    fn console() -> FakeConsole {
        let day = |d: u32| Utc.with_ymd_and_hms(2024, 2, d, 12, 0, 0).unwrap();
        FakeConsole {
            stats: InMemoryStats {
                users: vec![day(1), day(2)],
                orders: vec![
                    ("c1".into(), day(3), BigDecimal::from(150)),
                    ("c1".into(), day(3), BigDecimal::from(50)),
                    ("c2".into(), day(20), BigDecimal::from(100)),
                ],
                failing_ranges: false,
            },
            ..FakeConsole::default()
        }
        .with_member(admin("a1", "ops@shop.eg"))
    }

    #[::core::prelude::v1::test]
    fn parses_year_and_month() {
        assert_eq!(parse_month("2024-02").unwrap(), (2024, 2));
        assert_eq!(parse_month(" 2023-12 ").unwrap(), (2023, 12));
    }

    #[::core::prelude::v1::test]
    fn rejects_malformed_months() {
        for raw in ["2024-13", "2024", "feb", "2024-02-10"] {
            assert!(matches!(parse_month(raw), Err(AppError::BadRequest(_))), "{raw}");
        }
    }

    #[actix_web::test]
    async fn serves_one_card_per_metric() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(console().context(10)))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/dashboard/stats")
            .insert_header(bearer("a1"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let metrics: Vec<&str> = body["cards"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["metric"].as_str().unwrap())
            .collect();
        assert_eq!(metrics, ["total_users", "total_orders", "total_sales"]);
        assert_eq!(body["cards"][1]["value"], 3.0);
    }

    #[actix_web::test]
    async fn sales_cover_every_day_of_the_month() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(console().context(10)))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/dashboard/sales?month=2024-02")
            .insert_header(bearer("a1"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["month"], "2024-02");
        assert_eq!(body["days"].as_array().unwrap().len(), 29);

        let bad = test::TestRequest::get()
            .uri("/dashboard/sales?month=2024-13")
            .insert_header(bearer("a1"))
            .to_request();
        assert_eq!(test::call_service(&app, bad).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn splits_new_and_repeated_customers() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(console().context(10)))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/dashboard/customers")
            .insert_header(bearer("a1"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["new_customers"], 1);
        assert_eq!(body["repeated_customers"], 1);
    }
}
