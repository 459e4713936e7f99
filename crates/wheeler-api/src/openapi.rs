//! # OpenAPI Document Assembly
//!
//! Collects every utoipa-documented handler and schema into one OpenAPI
//! document served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the JWT bearer scheme referenced by admin and checkout routes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "HS256 JWT with `sub` and `role` claims. Admin routes require role `admin`.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wheeler Dealer API",
        version = "0.1.0",
        description = "Vehicle marketplace backend: brand and car catalogue with image uploads, and Braintree checkout.\n\nRead endpoints are public. Catalogue writes need an admin JWT; checkout needs any valid JWT."
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server"),
    ),
    paths(
        crate::routes::brands::list_brands,
        crate::routes::brands::get_brand,
        crate::routes::brands::create_brand,
        crate::routes::brands::update_brand,
        crate::routes::brands::delete_brand,
        crate::routes::cars::list_cars,
        crate::routes::cars::get_car,
        crate::routes::cars::related_cars,
        crate::routes::cars::create_car,
        crate::routes::cars::update_car,
        crate::routes::cars::delete_car,
        crate::routes::payments::client_token,
        crate::routes::payments::pay,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::routes::MessageResponse,
        crate::state::BrandRecord,
        crate::state::CarRecord,
        crate::state::CartItem,
        crate::state::OrderRecord,
        crate::state::OrderStatus,
        crate::catalog::BrandView,
        crate::catalog::CarView,
        crate::routes::brands::CreateBrandForm,
        crate::routes::brands::UpdateBrandRequest,
        crate::routes::brands::BrandListResponse,
        crate::routes::brands::BrandViewResponse,
        crate::routes::brands::BrandResponse,
        crate::routes::cars::CreateCarForm,
        crate::routes::cars::UpdateCarRequest,
        crate::routes::cars::CarListResponse,
        crate::routes::cars::CarViewResponse,
        crate::routes::cars::CarResponse,
        crate::routes::payments::TokenResponse,
        crate::routes::payments::PaymentRequest,
        crate::routes::payments::PaymentResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "brands", description = "Vehicle manufacturers"),
        (name = "cars", description = "Car listings and related cars"),
        (name = "payments", description = "Braintree client token and checkout"),
    )
)]
pub struct ApiDoc;

/// Serves the document at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/brand",
            "/api/brand/{slug}",
            "/api/brand/{id}",
            "/api/car",
            "/api/car/{slug}",
            "/api/car/{id}",
            "/api/car/related/{cid}/{bid}",
            "/api/car/braintree/token",
            "/api/car/braintree/payment",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing path {path}");
        }
    }

    #[test]
    fn registers_schemas_and_security() {
        let doc = ApiDoc::openapi();
        let components = doc.components.as_ref().unwrap();
        for name in ["BrandView", "CarView", "OrderRecord", "ErrorBody", "PaymentRequest"] {
            assert!(components.schemas.contains_key(name), "missing schema {name}");
        }
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn serializes_to_json() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();
        assert!(json.contains("\"openapi\""));
        assert!(json.contains("Wheeler Dealer API"));
    }
}
