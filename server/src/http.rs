use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Form, Json, Router,
    extract::{FromRef, Multipart, Path, State},
    http::{self, HeaderName, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use platform_store::{BillStore, NewProof};
use serde::{Deserialize, Serialize};
use time::Duration as TimeDuration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    bills,
    config::AppConfig,
    new_bill::{self, NewBillForm},
    views::{self, BillsPage, ProofView},
};

/// Single cookie holding the serialized logged-in user record.
pub const USER_COOKIE: &str = "__Host-frais_user";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BillStore>,
    pub config: Arc<AppConfig>,
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// The stored user record: role plus email, nothing more.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(rename = "type")]
    pub user_type: String,
    pub email: String,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "frais server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::POST, Method::GET])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/login", get(login_page).post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/bills", get(bills_handler))
        .route("/bills/new", get(new_bill_page).post(submit_handler))
        .route("/bills/new/file", post(upload_handler))
        .route("/bills/{id}/proof", get(proof_handler))
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

fn current_user(jar: &PrivateCookieJar) -> Option<SessionUser> {
    let cookie = jar.get(USER_COOKIE)?;
    serde_json::from_str(cookie.value()).ok()
}

async fn index_handler(jar: PrivateCookieJar) -> Redirect {
    if current_user(&jar).is_some() {
        Redirect::to("/bills")
    } else {
        Redirect::to("/login")
    }
}

async fn login_page() -> Html<String> {
    Html(views::login_ui())
}

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    #[serde(default = "default_user_type")]
    user_type: String,
}

fn default_user_type() -> String {
    "Employee".to_string()
}

async fn login_handler(
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> HttpResult<(PrivateCookieJar, Redirect)> {
    let user = SessionUser {
        user_type: form.user_type,
        email: form.email,
    };
    let value = serde_json::to_string(&user).map_err(|err| HttpError::internal(err.into()))?;
    let cookie = Cookie::build((USER_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::days(30))
        .build();
    info!(email = %user.email, role = %user.user_type, "user logged in");
    Ok((jar.add(cookie), Redirect::to("/bills")))
}

async fn logout_handler(jar: PrivateCookieJar) -> (PrivateCookieJar, Redirect) {
    let jar = jar.remove(Cookie::build((USER_COOKIE, "")).path("/").build());
    (jar, Redirect::to("/login"))
}

async fn bills_handler(State(state): State<AppState>, jar: PrivateCookieJar) -> Response {
    if current_user(&jar).is_none() {
        return Redirect::to("/login").into_response();
    }
    let page = match bills::load_bills(state.store.as_ref()).await {
        Ok(cards) => BillsPage::Loaded(cards),
        Err(err) => {
            error!(error = %err, "failed to fetch bills");
            BillsPage::Error(err.to_string())
        }
    };
    Html(views::bills_ui(&page)).into_response()
}

async fn new_bill_page(jar: PrivateCookieJar) -> Response {
    if current_user(&jar).is_none() {
        return Redirect::to("/login").into_response();
    }
    Html(views::new_bill_ui(None, None)).into_response()
}

async fn upload_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    mut multipart: Multipart,
) -> HttpResult<Response> {
    let Some(user) = current_user(&jar) else {
        return Ok(Redirect::to("/login").into_response());
    };

    let mut file_name = String::new();
    let mut bytes = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| HttpError::new(StatusCode::BAD_REQUEST, "invalid multipart payload"))?
    {
        if field.name() == Some("file") {
            file_name = field.file_name().unwrap_or_default().to_string();
            bytes = field
                .bytes()
                .await
                .map_err(|_| HttpError::new(StatusCode::BAD_REQUEST, "invalid multipart payload"))?
                .to_vec();
        }
    }

    if !new_bill::proof_extension_allowed(&file_name) {
        info!(%file_name, "rejected proof upload with invalid extension");
        return Ok(
            Html(views::new_bill_ui(Some(new_bill::WRONG_FORMAT_ALERT), None)).into_response(),
        );
    }

    match state
        .store
        .create(NewProof {
            email: user.email,
            file_name: file_name.clone(),
            bytes,
        })
        .await
    {
        Ok(created) => {
            let proof = ProofView {
                file_url: created.file_url,
                key: created.key,
                file_name,
            };
            Ok(Html(views::new_bill_ui(None, Some(&proof))).into_response())
        }
        Err(err) => {
            error!(error = %err, "failed to store proof file");
            Ok(
                Html(views::new_bill_ui(Some(new_bill::UPLOAD_FAILED_ALERT), None))
                    .into_response(),
            )
        }
    }
}

async fn submit_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<NewBillForm>,
) -> Response {
    let Some(user) = current_user(&jar) else {
        return Redirect::to("/login").into_response();
    };

    if !form.has_proof() {
        return Html(views::new_bill_ui(Some(new_bill::MISSING_FILE_ALERT), None)).into_response();
    }

    let proof = ProofView {
        file_url: form.file_url.clone(),
        key: form.file_key.clone(),
        file_name: form.file_name.clone(),
    };
    match state.store.update(form.into_submission(&user.email)).await {
        Ok(bill) => {
            info!(bill_id = %bill.id, "bill submitted");
            Redirect::to("/bills").into_response()
        }
        Err(err) => {
            // Log-and-stay: the form is re-rendered with the proof kept.
            error!(error = %err, "failed to submit bill");
            Html(views::new_bill_ui(None, Some(&proof))).into_response()
        }
    }
}

async fn proof_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Path(id): Path<Uuid>,
) -> Response {
    if current_user(&jar).is_none() {
        return Redirect::to("/login").into_response();
    }
    match state.store.list().await {
        Ok(rows) => match rows.into_iter().find(|bill| bill.id == id) {
            Some(bill) if !bill.file_url.is_empty() => {
                Html(views::proof_modal_ui(&bill.file_url)).into_response()
            }
            _ => Redirect::to("/bills").into_response(),
        },
        Err(err) => {
            error!(error = %err, "failed to load bill for proof view");
            Redirect::to("/bills").into_response()
        }
    }
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
}

type HttpResult<T> = Result<T, HttpError>;

#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    fn new(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
        }
    }

    fn internal(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}
