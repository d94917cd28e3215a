use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use axum_extra::extract::cookie::Key;
use http_body_util::BodyExt;
use platform_store::BillStore;
use server::{
    config::AppConfig,
    http::{AppState, build_router},
};
use tower::ServiceExt;

pub fn test_router(store: Arc<dyn BillStore>) -> Router {
    let config = AppConfig {
        cookie_key: Key::generate(),
        upload_dir: std::env::temp_dir().join("frais-test-uploads"),
        public_base_url: "http://localhost:8080".to_string(),
        cors_allowed_origins: Vec::new(),
    };
    let cookie_key = config.cookie_key.clone();
    build_router(AppState {
        store,
        config: Arc::new(config),
        cookie_key,
    })
}

/// Log in as the fixture employee and return the user cookie to replay.
pub async fn login_as_employee(router: &Router) -> String {
    let response = router
        .clone()
        .oneshot(
            Request::post("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("email=e%40e&user_type=Employee"))
                .expect("request"),
        )
        .await
        .expect("login response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("user cookie set")
        .to_str()
        .expect("cookie header")
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

pub async fn get(router: &Router, cookie: &str, path: &str) -> Response<Body> {
    router
        .clone()
        .oneshot(
            Request::get(path)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response")
}

pub async fn post_form(router: &Router, cookie: &str, path: &str, body: &str) -> Response<Body> {
    router
        .clone()
        .oneshot(
            Request::post(path)
                .header(header::COOKIE, cookie)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
        .expect("response")
}

pub const MULTIPART_BOUNDARY: &str = "frais-test-boundary";

/// Hand-rolled multipart payload with a single `file` field.
pub fn multipart_file(file_name: &str) -> Vec<u8> {
    format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\nfake image bytes\r\n--{b}--\r\n",
        b = MULTIPART_BOUNDARY,
    )
    .into_bytes()
}

pub async fn post_file(router: &Router, cookie: &str, file_name: &str) -> Response<Body> {
    router
        .clone()
        .oneshot(
            Request::post("/bills/new/file")
                .header(header::COOKIE, cookie)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
                )
                .body(Body::from(multipart_file(file_name)))
                .expect("request"),
        )
        .await
        .expect("response")
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
