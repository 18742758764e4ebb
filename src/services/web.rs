//! Axum-based HTTP server for the vehicle control API.
//!
//! Provides the command routes plus a state endpoint:
//! - GET `/forward`, `/backward`, `/left`, `/right`, `/stop` - motion
//!   commands, optional `?duty=N` speed override
//! - GET `/api/state` - current direction, duty, and battery voltage
//! - GET `/` - control page (serves index.html)
//!
//! Motion routes always answer 200; the JSON body says whether the command
//! was executed, discarded on an unsafe battery reading, or ignored.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::config::WebConfig;
use crate::drive::Duty;
use crate::traits::{DigitalOutput, PwmOutput, VoltageSensor};

use super::api::{ApiResponse, CommandResponse, StateResponse};
use super::handler::{handle_command, handle_state};
use super::shared::SharedDispatcher;

/// Shorthand for the shared state the handlers extract.
type Shared<O, P, S> = Arc<SharedDispatcher<O, P, S>>;

/// Optional `?duty=N` speed override on motion routes.
#[derive(Debug, Deserialize)]
struct DutyQuery {
    duty: Option<u16>,
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn motion<O, P, S>(
    state: Shared<O, P, S>,
    token: &str,
    query: DutyQuery,
) -> Json<ApiResponse<CommandResponse>>
where
    O: DigitalOutput + Send + 'static,
    P: PwmOutput<Error = O::Error> + Send + 'static,
    S: VoltageSensor<Error = O::Error> + Send + 'static,
    O::Error: std::fmt::Debug,
{
    Json(handle_command(&state, token, query.duty.map(Duty::new)))
}

macro_rules! motion_route {
    ($name:ident, $token:literal) => {
        #[doc = concat!("GET /", $token, " - dispatch the `", $token, "` command")]
        async fn $name<O, P, S>(
            State(state): State<Shared<O, P, S>>,
            Query(query): Query<DutyQuery>,
        ) -> Json<ApiResponse<CommandResponse>>
        where
            O: DigitalOutput + Send + 'static,
            P: PwmOutput<Error = O::Error> + Send + 'static,
            S: VoltageSensor<Error = O::Error> + Send + 'static,
            O::Error: std::fmt::Debug,
        {
            motion(state, $token, query).await
        }
    };
}

motion_route!(forward, "forward");
motion_route!(backward, "backward");
motion_route!(left, "left");
motion_route!(right, "right");
motion_route!(stop, "stop");

/// GET /api/state - Returns current vehicle state
async fn get_state<O, P, S>(
    State(state): State<Shared<O, P, S>>,
) -> Json<ApiResponse<StateResponse>>
where
    O: DigitalOutput + Send + 'static,
    P: PwmOutput<Error = O::Error> + Send + 'static,
    S: VoltageSensor<Error = O::Error> + Send + 'static,
    O::Error: std::fmt::Debug,
{
    Json(handle_state(&state))
}

/// GET / - Serve the control page
async fn index() -> impl IntoResponse {
    Html(include_str!("../../www/index.html"))
}

/// Fallback handler for 404
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::err("Not found")),
    )
}

// ============================================================================
// Server Builder
// ============================================================================

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Address to bind to
    pub addr: SocketAddr,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            addr: ([0, 0, 0, 0], 8080).into(),
            cors_permissive: true,
        }
    }
}

impl WebServerConfig {
    /// Create a new config with the given address
    pub fn new(addr: impl Into<SocketAddr>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Set whether CORS should be permissive
    pub fn cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Create from shared WebConfig
    pub fn from_config(config: &WebConfig) -> Self {
        Self {
            addr: ([0, 0, 0, 0], config.port).into(),
            cors_permissive: config.cors_permissive,
        }
    }
}

/// Build the Axum router with all routes
pub fn build_router<O, P, S>(state: Shared<O, P, S>, config: &WebServerConfig) -> Router
where
    O: DigitalOutput + Send + 'static,
    P: PwmOutput<Error = O::Error> + Send + 'static,
    S: VoltageSensor<Error = O::Error> + Send + 'static,
    O::Error: std::fmt::Debug,
{
    let mut router = Router::new()
        // Motion commands
        .route("/forward", get(forward::<O, P, S>))
        .route("/backward", get(backward::<O, P, S>))
        .route("/left", get(left::<O, P, S>))
        .route("/right", get(right::<O, P, S>))
        .route("/stop", get(stop::<O, P, S>))
        // State
        .route("/api/state", get(get_state::<O, P, S>))
        // Control page
        .route("/", get(index))
        // Fallback
        .fallback(not_found)
        .with_state(state);

    if config.cors_permissive {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Start the web server with shared state
///
/// This function blocks until the server is shut down. Use the same
/// `SharedDispatcher` here and in any other transport so every command
/// serializes through one lock.
pub async fn run_server<O, P, S>(
    state: Shared<O, P, S>,
    config: WebServerConfig,
) -> Result<(), std::io::Error>
where
    O: DigitalOutput + Send + 'static,
    P: PwmOutput<Error = O::Error> + Send + 'static,
    S: VoltageSensor<Error = O::Error> + Send + 'static,
    O::Error: std::fmt::Debug,
{
    let router = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    println!("[HTTP] Listening on http://{}", config.addr);

    axum::serve(listener, router).await
}
