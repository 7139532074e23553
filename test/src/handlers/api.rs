//! API routes (any valid key).

use actix_web::{get, web, HttpResponse, Responder};

use actix_api_key_core::http::security::AuthenticatedPrincipal;

/// Returns the principal built for the presented key.
#[get("/api/me")]
pub async fn me(principal: AuthenticatedPrincipal) -> impl Responder {
    HttpResponse::Ok().json(principal.into_inner())
}

/// Key taken from the route, see `AuthenticationManager::api_key_in_route_values`.
pub async fn key_items(principal: AuthenticatedPrincipal, path: web::Path<String>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "owner": principal.get_name(),
        "key": path.into_inner(),
    }))
}
