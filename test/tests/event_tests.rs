//! Event tests.
//!
//! Every interception point wired through the middleware.


use std::sync::atomic::Ordering;
use std::sync::Arc;

use actix_web::http::header::{HeaderName, HeaderValue, WWW_AUTHENTICATE};
use actix_web::http::StatusCode;
use actix_web::{test, HttpResponse};

use actix_api_key_core::http::security::{
    ApiKeyError, ApiKeyEvents, ApiKeyOptions, AuthenticationManager, Claim, ClaimTypes,
    SecurityTransform,
};

use common::{
    claim_value, create_test_app, read_principal, test_options, with_test_matchers,
    FaultingProvider, KEY_NAME, REALM,
};

fn security(options: ApiKeyOptions) -> SecurityTransform {
    with_test_matchers(
        SecurityTransform::new().scheme(AuthenticationManager::api_key_in_header(options).unwrap()),
    )
}

fn get_me(key: &str) -> actix_http::Request {
    test::TestRequest::get()
        .uri("/api/me")
        .insert_header((KEY_NAME, key.to_string()))
        .to_request()
}

// =============================================================================
// Validate Key Event Tests
// =============================================================================

#[actix_web::test]
async fn test_validate_key_event_without_provider() {
    let options = ApiKeyOptions::new()
        .key_name(KEY_NAME)
        .realm(REALM)
        .events(ApiKeyEvents::new().on_validate_key(|mut ctx| async move {
            if ctx.get_api_key() == "Inline" {
                ctx.validation_succeeded(
                    Some("InlineOwner"),
                    vec![Claim::new(ClaimTypes::ROLE, "USER")],
                );
            } else {
                ctx.validation_failed(Some("Inline validation rejected the key"));
            }
            Ok(ctx)
        }));
    let app = create_test_app(security(options)).await;

    let resp = test::call_service(&app, get_me("Inline")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let principal = read_principal(resp).await;
    assert_eq!(claim_value(&principal, "name").as_deref(), Some("InlineOwner"));

    let resp = test::call_service(&app, get_me("Other")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_validate_key_event_short_circuits_faulting_provider() {
    let (provider, calls) = FaultingProvider::new();
    let options = test_options()
        .provider(Arc::new(provider))
        .events(ApiKeyEvents::new().on_validate_key(|mut ctx| async move {
            ctx.validation_succeeded(Some("FromEvent"), Vec::new());
            Ok(ctx)
        }));
    let app = create_test_app(security(options)).await;

    let resp = test::call_service(&app, get_me("Anything")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let principal = read_principal(resp).await;
    assert_eq!(claim_value(&principal, "name").as_deref(), Some("FromEvent"));
}

#[actix_web::test]
async fn test_validate_key_event_defers_to_provider() {
    let options = test_options()
        .events(ApiKeyEvents::new().on_validate_key(|ctx| async move { Ok(ctx) }));
    let app = create_test_app(security(options)).await;

    let resp = test::call_service(&app, get_me("Key2")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// =============================================================================
// Provider Fault Tests
// =============================================================================

#[actix_web::test]
async fn test_provider_fault_is_server_error() {
    let (provider, calls) = FaultingProvider::new();
    let app = create_test_app(security(test_options().provider(Arc::new(provider)))).await;

    let err = test::try_call_service(&app, get_me("Key1"))
        .await
        .err()
        .unwrap();
    assert_eq!(
        err.error_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
async fn test_failed_event_turns_fault_into_challenge() {
    let (provider, _) = FaultingProvider::new();
    let options = test_options()
        .provider(Arc::new(provider))
        .events(ApiKeyEvents::new().on_authentication_failed(|mut ctx| async move {
            ctx.fail(ApiKeyError::validation("key store is down, retry later"));
            Ok(ctx)
        }));
    let app = create_test_app(security(options)).await;

    let resp = test::call_service(&app, get_me("Key1")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Authentication Succeeded Event Tests
// =============================================================================

#[actix_web::test]
async fn test_succeeded_event_adds_claims() {
    let options = test_options().events(ApiKeyEvents::new().on_authentication_succeeded(
        |mut ctx| async move {
            let scheme = ctx.get_scheme_name().to_string();
            ctx.add_claim(Claim::new("scheme", scheme));
            Ok(ctx)
        },
    ));
    let app = create_test_app(security(options)).await;

    let resp = test::call_service(&app, get_me("Key2")).await;
    let principal = read_principal(resp).await;
    assert_eq!(claim_value(&principal, "scheme").as_deref(), Some("ApiKey"));
}

#[actix_web::test]
async fn test_succeeded_event_rejects_principal() {
    let options = test_options().events(ApiKeyEvents::new().on_authentication_succeeded(
        |mut ctx| async move {
            if ctx.get_principal().is_some_and(|p| p.is_in_role("ADMIN")) {
                ctx.reject_principal();
            }
            Ok(ctx)
        },
    ));
    let app = create_test_app(security(options)).await;

    let resp = test::call_service(&app, get_me("Key1")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(&app, get_me("Key2")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// =============================================================================
// Challenge and Forbidden Event Tests
// =============================================================================

#[actix_web::test]
async fn test_challenge_event_extends_default_response() {
    let options = test_options().events(ApiKeyEvents::new().on_handle_challenge(
        |mut ctx| async move {
            let reason = if ctx.get_failure().is_some() {
                "invalid"
            } else {
                "missing"
            };
            ctx.get_response_mut().headers_mut().insert(
                HeaderName::from_static("x-api-key-reason"),
                HeaderValue::from_static(reason),
            );
            Ok(ctx)
        },
    ));
    let app = create_test_app(security(options)).await;

    let req = test::TestRequest::get().uri("/api/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers().get("x-api-key-reason").unwrap(), "missing");
    assert!(resp.headers().contains_key(WWW_AUTHENTICATE));

    let resp = test::call_service(&app, get_me("Wrong")).await;
    assert_eq!(resp.headers().get("x-api-key-reason").unwrap(), "invalid");
}

#[actix_web::test]
async fn test_challenge_event_handles_response() {
    let options = test_options().events(ApiKeyEvents::new().on_handle_challenge(
        |mut ctx| async move {
            ctx.set_response(HttpResponse::Unauthorized().body("custom challenge"));
            ctx.handled();
            Ok(ctx)
        },
    ));
    let app = create_test_app(security(options)).await;

    let req = test::TestRequest::get().uri("/api/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().get(WWW_AUTHENTICATE).is_none());

    let body = test::read_body(resp).await;
    assert_eq!(String::from_utf8_lossy(&body), "custom challenge");
}

#[actix_web::test]
async fn test_forbidden_event_handles_response() {
    let options = test_options().events(ApiKeyEvents::new().on_handle_forbidden(
        |mut ctx| async move {
            ctx.set_response(HttpResponse::NotFound().finish());
            ctx.handled();
            Ok(ctx)
        },
    ));
    let app = create_test_app(security(options)).await;

    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .insert_header((KEY_NAME, "Key2"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_forbidden_event_error_is_server_error() {
    let options = test_options().events(
        ApiKeyEvents::new()
            .on_handle_forbidden(|_ctx| async move { Err(ApiKeyError::event("audit sink down")) }),
    );
    let app = create_test_app(security(options)).await;

    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .insert_header((KEY_NAME, "Key2"))
        .to_request();
    let err = test::try_call_service(&app, req).await.err().unwrap();
    assert_eq!(
        err.error_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
