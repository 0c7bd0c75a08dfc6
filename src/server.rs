//! Standalone host: serves the public blog routes and the admin page over
//! HTTP.

use crate::admin::AdminRequest;
use crate::config::BlogConfig;
use crate::errors::ServerError;
use crate::module::BlogModule;
use crate::store::JsonFileStore;
use axum::extract::{Form, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::error;

const ADMIN_TITLE: &str = "Blog admin";

pub struct AppState {
    blog: BlogModule<JsonFileStore>,
    /// Held for the whole load, mutate and save cycle of an admin request.
    admin_lock: Mutex<()>,
}

impl AppState {
    pub fn new(blog: BlogModule<JsonFileStore>) -> AppState {
        AppState {
            blog,
            admin_lock: Mutex::new(()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let prefix = state.blog.router().list_link();
    let admin_path = state.blog.admin_path.clone();
    Router::new()
        .route(&prefix, get(public_page))
        .route(&format!("{prefix}/:slug"), get(public_page))
        .route(&admin_path, get(admin_page).post(admin_action))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: &BlogConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let addr: SocketAddr = config
        .address
        .parse()
        .map_err(|source| ServerError::Address {
            address: config.address.clone(),
            source,
        })?;
    axum::Server::bind(&addr)
        .serve(create_router(state).into_make_service())
        .await
        .map_err(|e| ServerError::Serve(Box::new(e)))
}

async fn public_page(
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> Result<Response, ServerError> {
    let path = uri.path().to_owned();
    let page = tokio::task::spawn_blocking(move || -> Result<_, ServerError> {
        let page = match state.blog.route(&path)? {
            Some(page) => page,
            None => return Ok(None),
        };
        let document = state
            .blog
            .render_document(&page.title, &page.template, &page.content)?;
        Ok(Some((page.found, document)))
    })
    .await??;

    Ok(match page {
        Some((true, document)) => Html(document).into_response(),
        Some((false, document)) => (StatusCode::NOT_FOUND, Html(document)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    })
}

async fn admin_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Html<String>, ServerError> {
    admin(state, AdminRequest::get(query)).await
}

async fn admin_action(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Html<String>, ServerError> {
    let mut request = AdminRequest::post(form);
    request.query = query;
    admin(state, request).await
}

async fn admin(state: Arc<AppState>, request: AdminRequest) -> Result<Html<String>, ServerError> {
    let _guard = state.admin_lock.lock().await;
    let blog_state = state.clone();
    let document = tokio::task::spawn_blocking(move || -> Result<String, ServerError> {
        let fragment = blog_state.blog.handle_admin_request(&request)?;
        Ok(blog_state
            .blog
            .render_document(ADMIN_TITLE, "admin", &fragment)?)
    })
    .await??;
    Ok(Html(document))
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
