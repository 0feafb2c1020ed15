//! Router construction and server host for the API.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Router,
    http::{Method, Request, header::AUTHORIZATION, header::CONTENT_TYPE},
    middleware,
    routing::{get, post},
};
use mediarelay_telemetry::{build_sha, propagate_request_id_layer, set_request_id_layer};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::error::{ApiServerError, ApiServerResult};
use crate::http::auth::require_bearer;
use crate::http::constants::HEADER_REQUEST_ID;
use crate::http::health::{health, metrics};
use crate::http::process::process;
use crate::http::telemetry::HttpMetricsLayer;
use crate::state::ApiState;

/// Axum router wrapper that hosts the relay API.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Construct the API server with its middleware stack wired around `state`.
    #[must_use]
    pub fn new(state: ApiState) -> Self {
        let cors_layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE, AUTHORIZATION]);
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(HEADER_REQUEST_ID)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                tracing::info_span!(
                    "http.request",
                    method = %request.method(),
                    route = %request.uri().path(),
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    span.record("status_code", response.status().as_u16());
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );
        let layered = ServiceBuilder::new()
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .layer(trace_layer)
            .layer(HttpMetricsLayer::new(state.telemetry.clone()));

        let require_api = middleware::from_fn_with_state(state.clone(), require_bearer);
        let router = Router::new()
            .route("/health", get(health))
            .route("/metrics", get(metrics))
            .route("/process", post(process).route_layer(require_api))
            .layer(cors_layer)
            .route_layer(layered)
            .with_state(state);

        Self { router }
    }

    /// Serve the API on `addr` until `shutdown` resolves, then drain open connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails to bind or the server terminates unexpectedly.
    pub async fn serve_with_shutdown<F>(self, addr: SocketAddr, shutdown: F) -> ApiServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })?;
        tracing::info!(%addr, "starting API");
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|source| ApiServerError::Serve { source })
    }

    #[cfg(test)]
    pub(crate) const fn router(&self) -> &Router {
        &self.router
    }
}
