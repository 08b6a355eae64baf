use actix_web::http::header::{self, CacheControl, CacheDirective};
use actix_web::{web, HttpResponse};

use crate::context::AppContext;
use crate::errors::AppError;

fn content_type(key: &str) -> &'static str {
    let extension = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

/// GET /uploads/{key}
///
/// Serves stored product images. Keys are never reused, so responses are
/// cacheable indefinitely. Only raster formats are labelled as images; anything
/// else, SVG included, goes out as opaque bytes the browser must not sniff.
#[utoipa::path(
    get,
    path = "/uploads/{key}",
    params(("key" = String, Path, description = "Storage key, e.g. products/1714550400000_a.png")),
    responses(
        (status = 200, description = "The stored file"),
        (status = 400, description = "Malformed key"),
        (status = 404, description = "Nothing stored under the key"),
    ),
    tag = "uploads"
)]
pub async fn get_upload(
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let key = path.into_inner();
    let blobs = ctx.blobs.clone();
    let lookup = key.clone();
    let bytes = web::block(move || blobs.get(&lookup))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??
        .ok_or(AppError::NotFound)?;

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type(&key)))
        .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .insert_header(CacheControl(vec![
            CacheDirective::Public,
            CacheDirective::MaxAge(31_536_000),
        ]))
        .body(bytes))
}
