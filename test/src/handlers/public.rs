//! Public routes (no API key required).

use actix_web::{get, HttpResponse, Responder};
use serde::Serialize;

use actix_api_key_core::http::security::OptionalPrincipal;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    caller: String,
}

#[get("/public/health")]
pub async fn health(principal: OptionalPrincipal) -> impl Responder {
    let caller = principal
        .as_ref()
        .and_then(|p| p.get_name())
        .unwrap_or("anonymous")
        .to_string();

    HttpResponse::Ok().json(Health {
        status: "up",
        caller,
    })
}
