//! Multiple scheme tests.
//!
//! A header scheme named `ApiKey` and a query scheme named `PartnerKey` guard the
//! same scope with separate key stores.


use std::sync::Arc;

use actix_web::http::header::WWW_AUTHENTICATE;
use actix_web::http::StatusCode;
use actix_web::{test, HttpResponse};

use actix_api_key_core::http::security::{
    ApiKey, ApiKeyEvents, ApiKeyHandler, ApiKeyLocation, ApiKeyOptions, ApiKeyProvider,
    AuthenticationManager, InMemoryApiKeyProvider, SecurityTransform,
};

use common::{
    claim_value, create_test_app, expected_header_challenge, read_principal, test_options,
    with_test_matchers, KEY_NAME, REALM,
};

fn partner_options() -> ApiKeyOptions {
    ApiKeyOptions::new()
        .key_name("partner_key")
        .realm("Partners")
        .provider(Arc::new(InMemoryApiKeyProvider::new().with_key(
            ApiKey::new("Acme-1").owner("Acme").role("ADMIN"),
        )))
}

fn partner_scheme(options: ApiKeyOptions) -> ApiKeyHandler {
    ApiKeyHandler::new("PartnerKey", ApiKeyLocation::QueryParams, options).unwrap()
}

fn security() -> SecurityTransform {
    with_test_matchers(
        SecurityTransform::new()
            .scheme(AuthenticationManager::api_key_in_header(test_options()).unwrap())
            .scheme(partner_scheme(partner_options())),
    )
}

// =============================================================================
// Scheme Isolation Tests
// =============================================================================

#[actix_web::test]
async fn test_first_scheme_authenticates() {
    let app = create_test_app(security()).await;

    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header((KEY_NAME, "Key2"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    let principal = read_principal(resp).await;
    assert_eq!(principal["authentication_type"], "ApiKey");
}

#[actix_web::test]
async fn test_second_scheme_authenticates() {
    let app = create_test_app(security()).await;

    let req = test::TestRequest::get()
        .uri("/api/me?partner_key=Acme-1")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let principal = read_principal(resp).await;
    assert_eq!(principal["authentication_type"], "PartnerKey");
    assert_eq!(claim_value(&principal, "name").as_deref(), Some("Acme"));
}

#[actix_web::test]
async fn test_keys_do_not_leak_between_schemes() {
    let app = create_test_app(security()).await;

    let req = test::TestRequest::get()
        .uri("/api/me?partner_key=Key1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header((KEY_NAME, "Acme-1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_failing_first_scheme_falls_through() {
    let app = create_test_app(security()).await;

    let req = test::TestRequest::get()
        .uri("/api/me?partner_key=Acme-1")
        .insert_header((KEY_NAME, "Unknown"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let principal = read_principal(resp).await;
    assert_eq!(principal["authentication_type"], "PartnerKey");
}

// =============================================================================
// Challenge Tests
// =============================================================================

#[actix_web::test]
async fn test_challenge_lists_every_scheme() {
    let app = create_test_app(security()).await;

    let req = test::TestRequest::get().uri("/api/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let challenges: Vec<&str> = resp
        .headers()
        .get_all(WWW_AUTHENTICATE)
        .map(|v| v.to_str().unwrap())
        .collect();
    assert_eq!(
        challenges,
        vec![
            expected_header_challenge(),
            r#"PartnerKey realm="Partners", charset="UTF-8", in="query_params", key_name="partner_key""#,
        ]
    );
}

#[actix_web::test]
async fn test_handled_challenge_wins() {
    let options = partner_options().events(ApiKeyEvents::new().on_handle_challenge(
        |mut ctx| async move {
            ctx.set_response(HttpResponse::Unauthorized().body("partners only"));
            ctx.handled();
            Ok(ctx)
        },
    ));
    let security = with_test_matchers(
        SecurityTransform::new()
            .scheme(AuthenticationManager::api_key_in_header(test_options()).unwrap())
            .scheme(partner_scheme(options)),
    );
    let app = create_test_app(security).await;

    let req = test::TestRequest::get().uri("/api/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().get(WWW_AUTHENTICATE).is_none());

    let body = test::read_body(resp).await;
    assert_eq!(String::from_utf8_lossy(&body), "partners only");
}

// =============================================================================
// Forbidden Tests
// =============================================================================

#[actix_web::test]
async fn test_forbid_uses_authenticating_scheme() {
    let header_options = ApiKeyOptions::new()
        .key_name(KEY_NAME)
        .realm(REALM)
        .provider(Arc::new(common::test_key_store()) as Arc<dyn ApiKeyProvider>)
        .events(ApiKeyEvents::new().on_handle_forbidden(|mut ctx| async move {
            ctx.set_response(HttpResponse::Forbidden().body("header scheme"));
            ctx.handled();
            Ok(ctx)
        }));
    let partner_options = partner_options().events(ApiKeyEvents::new().on_handle_forbidden(
        |mut ctx| async move {
            ctx.set_response(HttpResponse::Forbidden().body("partner scheme"));
            ctx.handled();
            Ok(ctx)
        },
    ));
    let security = with_test_matchers(
        SecurityTransform::new()
            .scheme(AuthenticationManager::api_key_in_header(header_options).unwrap())
            .scheme(partner_scheme(partner_options)),
    );
    let app = create_test_app(security).await;

    // Acme-1 holds ADMIN but lacks the gold tier claim
    let req = test::TestRequest::get()
        .uri("/gold/offers?partner_key=Acme-1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body = test::read_body(resp).await;
    assert_eq!(String::from_utf8_lossy(&body), "partner scheme");

    let req = test::TestRequest::get()
        .uri("/gold/offers")
        .insert_header((KEY_NAME, "Key2"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body = test::read_body(resp).await;
    assert_eq!(String::from_utf8_lossy(&body), "header scheme");
}
