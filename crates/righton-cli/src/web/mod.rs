//! RightOn web app: profiles, top eights, topic bubbles and posts.
//!
//! One SQLite connection and the session table sit behind a single mutex;
//! handlers take it for the duration of their store work.

pub mod error;
pub mod handlers;
pub mod session;
pub mod views;

use std::sync::Arc;

use askama::Template;
use axum::Router;
use axum::middleware;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use righton_store::Store;

use error::WebResult;
use session::{SessionId, SessionStore, Viewer};
use views::Chrome;

pub struct WebState {
    pub store: Store,
    pub sessions: SessionStore,
}

pub type SharedState = Arc<Mutex<WebState>>;

impl WebState {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            sessions: SessionStore::default(),
        }
    }

    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    pub fn shared(store: Store) -> SharedState {
        Self::new(store).into_shared()
    }

    pub fn viewer(&self, sid: &SessionId) -> Option<Viewer> {
        self.sessions.viewer(sid).cloned()
    }

    /// Page chrome for `sid`. Pending flashes are consumed.
    pub fn chrome(&mut self, sid: &SessionId) -> Chrome {
        let viewer = self.viewer(sid);
        Chrome {
            logged_in: viewer.is_some(),
            viewer: viewer.map(|v| v.username).unwrap_or_default(),
            flashes: self.sessions.take_flashes(sid),
        }
    }
}

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/register",
            get(handlers::register_form).post(handlers::register),
        )
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route("/logout", get(handlers::logout))
        // Profiles
        .route("/profile/{username}", get(handlers::profile))
        .route(
            "/profile/{username}/edit",
            get(handlers::edit_profile_form).post(handlers::edit_profile),
        )
        // Bubbles
        .route("/bubbles", get(handlers::bubbles_home))
        .route("/bubbles/{topic}", get(handlers::bubbles_topic))
        .route(
            "/bubble/create",
            get(handlers::bubble_create_form).post(handlers::bubble_create),
        )
        .route("/bubble/{bubble_id}", get(handlers::bubble_view))
        .route("/bubble/{bubble_id}/post", post(handlers::post_create))
        .route("/search", get(handlers::search))
        .layer(middleware::from_fn(session::ensure_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` is cancelled, then drain in-flight requests.
pub async fn serve(
    listener: TcpListener,
    state: SharedState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

pub(crate) fn render(page: &impl Template) -> WebResult {
    Ok(Html(page.render()?).into_response())
}

pub(crate) fn profile_url(username: &str) -> String {
    format!("/profile/{}", urlencoding::encode(username))
}
