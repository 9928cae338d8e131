//! HTTP webhook boundary.
//!
//! ```text
//! POST {path}
//!   ├── verify signature ── fail ──▶ 401
//!   ├── decode payload   ── fail ──▶ 400
//!   └── router.handle()  ─────────▶ 200 + JSON response
//! ```
//!
//! Only verified payloads reach the router. Component and modal handlers
//! reply out of band, so their interactions are acknowledged with a deferred
//! update, or a deferred ephemeral reply for modals opened by a command.
//! Interactions without a handler get an ephemeral notice.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tokio::signal;
use tracing::{debug, error, info, warn};

use parley_core::{Interaction, SIGNATURE_HEADER, TIMESTAMP_HEADER, Verifier};
use parley_framework::{InteractionRouter, TaskSpawner};

use crate::config::GatewayConfig;
use crate::error::{RuntimeError, RuntimeResult};

/// Serves an [`InteractionRouter`] behind signature verification.
pub struct GatewayServer<C> {
    router: Arc<InteractionRouter<C>>,
    verifier: Verifier,
    bind: String,
    path: String,
    greeting: Option<String>,
    tasks: Option<TaskSpawner>,
}

struct ServerState<C> {
    router: Arc<InteractionRouter<C>>,
    verifier: Verifier,
    greeting: Option<String>,
}

impl<C: Send + Sync + 'static> GatewayServer<C> {
    /// Creates a server with default bind address and path.
    pub fn new(router: InteractionRouter<C>, verifier: Verifier) -> Self {
        let defaults = GatewayConfig::default();
        Self {
            router: Arc::new(router),
            verifier,
            bind: defaults.server.bind,
            path: defaults.server.path,
            greeting: None,
            tasks: None,
        }
    }

    /// Creates a server from configuration.
    ///
    /// Requires `discord.public_key`; applies `server.replay_window_secs`.
    pub fn from_config(router: InteractionRouter<C>, config: &GatewayConfig) -> RuntimeResult<Self> {
        if config.discord.public_key.is_empty() {
            return Err(RuntimeError::MissingCredential("discord.public_key"));
        }

        let mut verifier = Verifier::from_hex(&config.discord.public_key)?;
        if let Some(window) = config.server.replay_window() {
            verifier = verifier.with_max_age(window);
        }

        let mut server = Self::new(router, verifier)
            .bind(&config.server.bind)
            .path(&config.server.path);
        if !config.discord.application_id.is_empty() {
            server.greeting = Some(format!("👋 {}", config.discord.application_id));
        }
        Ok(server)
    }

    /// Sets the listen address.
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.bind = addr.into();
        self
    }

    /// Sets the interaction endpoint path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        self
    }

    /// Waits for these background tasks after the listener stops.
    pub fn tasks(mut self, tasks: TaskSpawner) -> Self {
        self.tasks = Some(tasks);
        self
    }

    /// Builds the axum application.
    pub fn app(&self) -> Router {
        let state = Arc::new(ServerState {
            router: Arc::clone(&self.router),
            verifier: self.verifier.clone(),
            greeting: self.greeting.clone(),
        });

        Router::new()
            .route(
                &self.path,
                post(handle_interaction::<C>).get(handle_greeting::<C>),
            )
            .with_state(state)
    }

    /// Serves until Ctrl-C, then waits for background tasks.
    pub async fn serve(self) -> RuntimeResult<()> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    /// Serves until `shutdown` completes, then waits for background tasks.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.app();
        let listener = tokio::net::TcpListener::bind(&self.bind).await?;
        let addr: SocketAddr = listener.local_addr()?;

        info!(addr = %addr, path = %self.path, "Interaction endpoint listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Interaction endpoint stopped");
        if let Some(tasks) = self.tasks {
            tasks.shutdown().await;
            debug!("Background tasks drained");
        }
        Ok(())
    }
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl+C"),
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

async fn handle_interaction<C: Send + Sync + 'static>(
    State(state): State<Arc<ServerState<C>>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let timestamp = header(&headers, TIMESTAMP_HEADER);
    let signature = header(&headers, SIGNATURE_HEADER);

    if !state.verifier.verify(timestamp, signature, &body) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let interaction = match Interaction::from_json(&body) {
        Ok(interaction) => interaction,
        Err(e) => {
            warn!(error = %e, "Rejected undecodable interaction");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    let outcome = state.router.handle(interaction).await;
    Json(outcome.into_response()).into_response()
}

async fn handle_greeting<C: Send + Sync + 'static>(
    State(state): State<Arc<ServerState<C>>>,
) -> Response {
    match &state.greeting {
        Some(greeting) => greeting.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use ed25519_dalek::{Signer, SigningKey};
    use parley_core::{
        CommandDescriptor, CommandInteraction, ComponentInteraction, InteractionResponse,
    };
    use parley_framework::Routed;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[9u8; 32])
    }

    fn public_hex() -> String {
        hex::encode(signing_key().verifying_key().to_bytes())
    }

    fn now() -> String {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            .to_string()
    }

    async fn ping_cmd(_ctx: Arc<()>, cmd: CommandInteraction) -> InteractionResponse {
        let scope = cmd.guild_id().unwrap_or("global").to_string();
        InteractionResponse::message(format!("pong from {scope}"))
    }

    async fn noop(_ctx: Arc<()>, _click: Routed<ComponentInteraction>) {}

    fn router() -> InteractionRouter<()> {
        InteractionRouter::builder(())
            .command(CommandDescriptor::new("ping-cmd", "Ping."), ping_cmd)
            .unwrap()
            .guild_command(CommandDescriptor::new("ping-cmd", "Ping."), ["G"], ping_cmd)
            .unwrap()
            .component("noop", noop)
            .unwrap()
            .build()
    }

    fn config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.discord.public_key = public_hex();
        config.discord.application_id = "123".to_string();
        config.server.path = "/interactions".to_string();
        config
    }

    fn signed(timestamp: &str, body: &Value) -> Request<Body> {
        let body = body.to_string();
        let signature = signing_key().sign(format!("{timestamp}{body}").as_bytes());
        Request::builder()
            .method("POST")
            .uri("/interactions")
            .header(TIMESTAMP_HEADER, timestamp)
            .header(SIGNATURE_HEADER, hex::encode(signature.to_bytes()))
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn app() -> Router {
        GatewayServer::from_config(router(), &config()).unwrap().app()
    }

    #[tokio::test]
    async fn test_ping_is_ponged() {
        let (status, body) = send(app(), signed(&now(), &json!({ "type": 1 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "type": 1 }));
    }

    #[tokio::test]
    async fn test_unsigned_request_is_unauthorized() {
        let request = Request::builder()
            .method("POST")
            .uri("/interactions")
            .body(Body::from(r#"{"type":1}"#))
            .unwrap();
        let (status, _) = send(app(), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_tampered_body_is_unauthorized() {
        let mut request = signed(&now(), &json!({ "type": 1 }));
        *request.body_mut() = Body::from(r#"{"type":2}"#);
        let (status, _) = send(app(), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_stale_timestamp_is_unauthorized() {
        let (status, _) = send(app(), signed("1700000000", &json!({ "type": 1 }))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // without a replay window the same request passes
        let mut config = config();
        config.server.replay_window_secs = 0;
        let app = GatewayServer::from_config(router(), &config).unwrap().app();
        let (status, _) = send(app, signed("1700000000", &json!({ "type": 1 }))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_bad_request() {
        let (status, _) = send(app(), signed(&now(), &json!({ "type": 42 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_command_routing_end_to_end() {
        let global = json!({ "type": 2, "data": { "name": "ping-cmd" } });
        let (status, body) = send(app(), signed(&now(), &global)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], 4);
        assert_eq!(body["data"]["content"], "pong from global");

        let guild = json!({ "type": 2, "guild_id": "G", "data": { "name": "ping-cmd" } });
        let (_, body) = send(app(), signed(&now(), &guild)).await;
        assert_eq!(body["data"]["content"], "pong from G");
    }

    #[tokio::test]
    async fn test_component_acknowledged_and_unknown_unsupported() {
        let click = json!({ "type": 3, "data": { "custom_id": "noop_1", "component_type": 2 } });
        let (status, body) = send(app(), signed(&now(), &click)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], 6);

        let unknown = json!({ "type": 2, "data": { "name": "nope" } });
        let (status, body) = send(app(), signed(&now(), &unknown)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], 4);
        assert_eq!(body["data"]["flags"], 64);
    }

    #[tokio::test]
    async fn test_greeting_and_missing_key() {
        let request = Request::builder()
            .uri("/interactions")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], "👋 123".as_bytes());

        let err = GatewayServer::from_config(router(), &GatewayConfig::default()).err();
        assert!(matches!(err, Some(RuntimeError::MissingCredential(_))));
    }

    #[tokio::test]
    async fn test_serve_with_shutdown_drains_tasks() {
        let tasks = TaskSpawner::new();
        let verifier = Verifier::from_hex(&public_hex()).unwrap();
        let server = GatewayServer::new(router(), verifier)
            .bind("127.0.0.1:0")
            .tasks(tasks.clone());

        tasks.spawn("slow", async {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            Ok::<_, String>(())
        });

        server.serve_with_shutdown(async {}).await.unwrap();
        assert!(tasks.is_empty());
    }
}
