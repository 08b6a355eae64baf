use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::session::AdminSession;
use super::{audited, listing_response, PageParams, Succeeded};
use crate::context::AppContext;
use crate::domain::user::{AdminDraft, User};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub is_admin: bool,
    pub is_super_admin: bool,
    pub blocked: bool,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            is_admin: user.is_admin,
            is_super_admin: user.is_super_admin,
            blocked: user.blocked,
            created_by: user.created_by,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListUsersResponse {
    pub items: Vec<UserResponse>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAdminRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateAdminResponse {
    pub succeeded: bool,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BlockUserRequest {
    pub blocked: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BlockUserResponse {
    pub succeeded: bool,
    pub user_id: String,
    pub blocked: bool,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /users
///
/// One page of users ordered by email.
#[utoipa::path(
    get,
    path = "/users",
    params(("page" = Option<i64>, Query, description = "1-based page number")),
    responses(
        (status = 200, description = "A page of users", body = ListUsersResponse),
        (status = 303, description = "No session; see /login"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(
    _admin: AdminSession,
    ctx: web::Data<AppContext>,
    params: web::Query<PageParams>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let page = params.page;
    let users = ctx.users.clone();
    let result = web::block(move || users.list_users(page))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body = ListUsersResponse {
        total_pages: result.total_pages(),
        total: result.total,
        page: result.page,
        page_size: result.page_size,
        items: result.items.into_iter().map(UserResponse::from).collect(),
    };
    Ok(listing_response(&req, result.reset, body))
}

/// POST /users/admins
///
/// Creates an identity account with the admin claim and its profile.
#[utoipa::path(
    post,
    path = "/users/admins",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = CreateAdminResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Caller is no longer an admin"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn create_admin(
    AdminSession(session): AdminSession,
    ctx: web::Data<AppContext>,
    body: web::Json<CreateAdminRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let draft = AdminDraft {
        email: body.email,
        username: body.username,
        password: body.password,
    };
    let users = ctx.users.clone();
    let user = web::block(move || {
        audited("create admin").run(|| users.create_admin(&session, draft))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CreateAdminResponse {
        succeeded: true,
        user: user.into(),
    }))
}

/// PUT /users/{id}/blocked
#[utoipa::path(
    put,
    path = "/users/{id}/blocked",
    params(("id" = String, Path, description = "User id")),
    request_body = BlockUserRequest,
    responses(
        (status = 200, description = "Block state changed", body = BlockUserResponse),
        (status = 401, description = "Target is a super admin"),
        (status = 403, description = "Target is the caller"),
        (status = 404, description = "No such user"),
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn set_blocked(
    AdminSession(session): AdminSession,
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
    body: web::Json<BlockUserRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let blocked = body.blocked;
    let users = ctx.users.clone();
    let change = web::block(move || {
        audited("block user").run(|| users.block_user(&session, &user_id, blocked))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(BlockUserResponse {
        succeeded: true,
        user_id: change.user_id,
        blocked: change.blocked,
    }))
}

/// DELETE /users/{id}
///
/// Super admins only. Removes the identity account, then the profile.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = Succeeded),
        (status = 403, description = "Caller is not a super admin, or is the target"),
        (status = 404, description = "No such user"),
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_user(
    AdminSession(session): AdminSession,
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let users = ctx.users.clone();
    web::block(move || audited("delete user").run(|| users.delete_user(&session, &user_id)))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(Succeeded::yes()))
}

#[cfg(test)]
mod tests {
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use super::*;
    use crate::application::test_support::{admin, bearer, super_admin, user, FakeConsole};

    fn console() -> FakeConsole {
        FakeConsole::default()
            .with_member(admin("a1", "ops@shop.eg"))
            .with_member(super_admin("s1", "root@shop.eg"))
            .with_member(user("c1", "c1@shop.eg"))
    }

    #[actix_web::test]
    async fn anonymous_callers_are_sent_to_login() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(console().context(10)))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/users").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");
    }

    #[actix_web::test]
    async fn customers_cannot_use_the_console() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(console().context(10)))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/users").insert_header(bearer("c1")).to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn out_of_range_pages_fall_back_to_the_first() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(console().context(2)))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/users?page=9")
            .insert_header(bearer("a1"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_LOCATION).unwrap(), "/users?page=1");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["page"], 1);
        assert_eq!(body["total"], 3);
        assert_eq!(body["total_pages"], 2);
        assert_eq!(body["items"][0]["email"], "c1@shop.eg");
    }

    #[actix_web::test]
    async fn super_admins_cannot_be_blocked() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(console().context(10)))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/users/s1/blocked")
            .insert_header(bearer("a1"))
            .set_json(json!({ "blocked": true }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["succeeded"], false);
        assert_eq!(body["error"], "Unauthorized: Cannot block super admin");
    }

    #[actix_web::test]
    async fn admins_block_customers() {
        let console = console();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(console.context(10)))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/users/c1/blocked")
            .insert_header(bearer("a1"))
            .set_json(json!({ "blocked": true }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body, json!({ "succeeded": true, "user_id": "c1", "blocked": true }));
        assert!(console.users.get("c1").unwrap().blocked);
    }

    #[actix_web::test]
    async fn only_super_admins_delete_users() {
        let console = console();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(console.context(10)))
                .configure(crate::configure),
        )
        .await;

        let by_admin = test::TestRequest::delete()
            .uri("/users/c1")
            .insert_header(bearer("a1"))
            .to_request();
        assert_eq!(test::call_service(&app, by_admin).await.status(), StatusCode::FORBIDDEN);

        let by_root = test::TestRequest::delete()
            .uri("/users/c1")
            .insert_header(bearer("s1"))
            .to_request();
        assert_eq!(test::call_service(&app, by_root).await.status(), StatusCode::OK);
        assert!(console.users.get("c1").is_none());
        assert!(console.identity.inner.calls().contains(&"delete_account c1".to_string()));
    }

    #[actix_web::test]
    async fn admins_create_admins() {
        let console = console();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(console.context(10)))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/users/admins")
            .insert_header(bearer("a1"))
            .set_json(json!({
                "email": "new@shop.eg",
                "username": "newbie",
                "password": "secret1"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["user"]["is_admin"], true);
        assert_eq!(body["user"]["created_by"], "a1");
        assert!(console
            .identity
            .inner
            .calls()
            .contains(&"grant_admin uid-new@shop.eg".to_string()));
    }
}
