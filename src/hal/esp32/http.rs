//! HTTP server for the on-vehicle web API.
//!
//! Runs an esp-idf-svc HTTP server exposing the same routes as the axum
//! desktop server, backed by the same shared dispatcher and the same route
//! logic from `services::handler`.
//!
//! # Endpoints
//!
//! - `GET /forward|/backward|/left|/right|/stop` - motion commands, optional
//!   `?duty=N` override
//! - `GET /api/state` - current direction, duty, and battery voltage (JSON)
//! - `GET /` - control page (embedded HTML)
//!
//! # Example
//!
//! ```ignore
//! use rs_rover::hal::esp32::Esp32HttpServer;
//! use rs_rover::services::SharedDispatcher;
//! use rs_rover::config::WebConfig;
//! use std::sync::Arc;
//!
//! let shared = Arc::new(SharedDispatcher::new(dispatcher));
//! let config = WebConfig::default().with_port(80);
//! let server = Esp32HttpServer::new(&config, shared)?;
//! ```

use crate::config::WebConfig;
use crate::services::handler::{duty_from_uri, handle_command, handle_state};
use crate::services::shared::SharedDispatcher;
use crate::traits::{DigitalOutput, PwmOutput, VoltageSensor};
use esp_idf_hal::io::Write;
use esp_idf_svc::http::server::{Configuration, EspHttpServer};
use esp_idf_svc::io::EspIOError;
use std::sync::Arc;

/// Command tokens served as motion routes.
const MOTION_TOKENS: [&str; 5] = ["forward", "backward", "left", "right", "stop"];

/// HTTP server for the vehicle control API.
pub struct Esp32HttpServer {
    _server: EspHttpServer<'static>,
}

impl Esp32HttpServer {
    /// Create and start the HTTP server.
    ///
    /// All handlers go through the provided shared dispatcher, so commands
    /// arriving on concurrent connections are serialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP server fails to start or a route fails
    /// to register.
    pub fn new<O, P, S>(
        config: &WebConfig,
        shared: Arc<SharedDispatcher<O, P, S>>,
    ) -> anyhow::Result<Self>
    where
        O: DigitalOutput + Send + 'static,
        P: PwmOutput<Error = O::Error> + Send + 'static,
        S: VoltageSensor<Error = O::Error> + Send + 'static,
        O::Error: std::fmt::Debug,
    {
        let server_config = Configuration {
            http_port: config.port,
            ..Default::default()
        };

        let mut server = EspHttpServer::new(&server_config)?;

        // GET /<token> - motion commands, exact path routing only
        for token in MOTION_TOKENS {
            let shared = Arc::clone(&shared);
            let path = format!("/{}", token);
            server.fn_handler(&path, esp_idf_svc::http::Method::Get, move |req| {
                let duty = duty_from_uri(req.uri());
                let response = handle_command(&shared, token, duty);
                let json = serde_json::to_string(&response)
                    .unwrap_or_else(|_| r#"{"success":false}"#.into());
                let mut resp =
                    req.into_response(200, None, &[("Content-Type", "application/json")])?;
                resp.write_all(json.as_bytes())?;
                Ok::<_, EspIOError>(())
            })?;
        }

        // GET /api/state - current vehicle state
        let shared_for_state = Arc::clone(&shared);
        server.fn_handler("/api/state", esp_idf_svc::http::Method::Get, move |req| {
            let response = handle_state(&shared_for_state);
            let json = serde_json::to_string(&response)
                .unwrap_or_else(|_| r#"{"success":false}"#.into());
            let mut resp = req.into_response(200, None, &[("Content-Type", "application/json")])?;
            resp.write_all(json.as_bytes())?;
            Ok::<_, EspIOError>(())
        })?;

        // GET / - control page (shared with desktop)
        server.fn_handler("/", esp_idf_svc::http::Method::Get, move |req| {
            let html = include_str!("../../../www/index.html");
            let mut resp = req.into_response(200, None, &[("Content-Type", "text/html")])?;
            resp.write_all(html.as_bytes())?;
            Ok::<_, EspIOError>(())
        })?;

        println!("[HTTP] Server started on port {}", config.port);

        Ok(Self { _server: server })
    }
}
