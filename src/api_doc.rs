use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::{auth, dashboard, orders, products, uploads, users};

#[derive(OpenApi)]
#[openapi(
    info(title = "Admin Console API", version = "0.1.0"),
    paths(
        auth::login,
        auth::forgot_password,
        auth::logout,
        auth::current_session,
        dashboard::stat_cards,
        dashboard::monthly_sales,
        dashboard::customers,
        orders::list_orders,
        orders::get_order,
        orders::update_status,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        products::list_reviews,
        products::add_review,
        uploads::get_upload,
        users::list_users,
        users::create_admin,
        users::set_blocked,
        users::delete_user,
    ),
    components(schemas(
        crate::handlers::Succeeded,
        crate::domain::order::OrderStatus,
        crate::domain::order::ShippingAddress,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Console sign-in and sessions"),
        (name = "dashboard", description = "Store statistics"),
        (name = "orders", description = "Order review"),
        (name = "products", description = "Catalog and reviews"),
        (name = "uploads", description = "Stored product images"),
        (name = "users", description = "Customer and admin accounts"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi
            .components
            .get_or_insert_with(Default::default)
            .add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
    }
}
