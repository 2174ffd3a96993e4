//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde::Deserialize;
use serde_json::Value;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no"), StatusCode::UNAUTHORIZED)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn body_of(response: HttpResponse) -> Value {
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    serde_json::from_slice(&bytes).expect("JSON body")
}

#[actix_web::test]
async fn internal_errors_are_redacted_but_keep_trace_id() {
    let err = Error::internal("db password is hunter2")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "secret": "x" }));
    let response = ResponseError::error_response(&err);

    assert_eq!(
        response
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
        Some(TRACE_ID)
    );
    let body = body_of(response).await;
    assert_eq!(body["code"], "internal_error");
    assert_eq!(body["message"], "Internal server error");
    assert_eq!(body["traceId"], TRACE_ID);
    assert!(body.get("details").is_none());
}

#[actix_web::test]
async fn client_errors_keep_message_and_details() {
    let err = Error::conflict("username already registered")
        .with_details(json!({ "field": "username" }));
    let response = ResponseError::error_response(&err);

    assert!(response.headers().get(TRACE_ID_HEADER).is_none());
    let body = body_of(response).await;
    assert_eq!(body["code"], "conflict");
    assert_eq!(body["message"], "username already registered");
    assert_eq!(body["details"]["field"], "username");
}

#[derive(Deserialize)]
struct Probe {
    #[serde(rename = "n")]
    _n: u32,
}

async fn probe_json(_: web::Json<Probe>) -> HttpResponse {
    HttpResponse::Ok().finish()
}

async fn probe_query(_: web::Query<Probe>) -> HttpResponse {
    HttpResponse::Ok().finish()
}

#[actix_web::test]
async fn malformed_json_uses_error_envelope() {
    let app = actix_test::init_service(
        App::new()
            .app_data(json_config())
            .route("/", web::post().to(probe_json)),
    )
    .await;
    let request = actix_test::TestRequest::post()
        .uri("/")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();

    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], "body");
}

#[actix_web::test]
async fn malformed_query_uses_error_envelope() {
    let app = actix_test::init_service(
        App::new()
            .app_data(query_config())
            .route("/", web::get().to(probe_query)),
    )
    .await;
    let request = actix_test::TestRequest::get().uri("/?n=many").to_request();

    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
}

#[actix_web::test]
async fn oversized_json_is_payload_too_large() {
    let app = actix_test::init_service(
        App::new()
            .app_data(json_config().limit(8))
            .route("/", web::post().to(probe_json)),
    )
    .await;
    let request = actix_test::TestRequest::post()
        .uri("/")
        .insert_header(("content-type", "application/json"))
        .set_payload(r#"{"n": 1234567890}"#)
        .to_request();

    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
