pub mod auth;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod session;
pub mod uploads;
pub mod users;

use std::time::Instant;

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::errors::DomainError;
use crate::domain::outcome::ActionHooks;

// ── Shared DTOs ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct PageParams {
    /// Page number (1-based). Defaults to 1; out-of-range pages show page 1.
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Succeeded {
    pub succeeded: bool,
}

impl Succeeded {
    pub fn yes() -> Self {
        Self { succeeded: true }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Timing and outcome logging around a mutation.
pub fn audited<'a, T: 'a>(
    action: &'static str,
) -> ActionHooks<'a, Result<T, DomainError>, Instant> {
    ActionHooks::new()
        .bracket(Instant::now, move |started| {
            log::debug!("{} finished in {:?}", action, started.elapsed())
        })
        .on_success(move |_| log::info!("{} succeeded", action))
        .on_error(move |outcome| {
            if let Err(e) = outcome {
                log::warn!("{} failed: {}", action, e);
            }
        })
}

/// `query` with `page` rewritten to 1.
pub fn first_page_query(query: &str) -> String {
    let mut pairs: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty() && *pair != "page" && !pair.starts_with("page="))
        .collect();
    pairs.insert(0, "page=1");
    pairs.join("&")
}

/// 200 with `body`; a listing that fell back to page 1 advertises the
/// rewritten query in `Content-Location`.
pub fn listing_response<T: Serialize>(req: &HttpRequest, reset: bool, body: T) -> HttpResponse {
    let mut response = HttpResponse::Ok();
    if reset {
        let location = format!("{}?{}", req.path(), first_page_query(req.query_string()));
        response.insert_header((header::CONTENT_LOCATION, location));
    }
    response.json(body)
}
