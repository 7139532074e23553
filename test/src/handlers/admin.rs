//! Admin routes (ADMIN role).

use actix_web::{get, HttpResponse, Responder};

use actix_api_key_core::http::security::AuthenticatedPrincipal;

#[get("/admin/dashboard")]
pub async fn dashboard(principal: AuthenticatedPrincipal) -> impl Responder {
    HttpResponse::Ok().body(format!(
        "Admin: {}",
        principal.get_name().unwrap_or_default()
    ))
}
