//! identity-hub manages user accounts and exposes them over REST, GraphQL
//! and gRPC.
#![forbid(unsafe_code)]

pub mod adapters;
pub mod application;
pub mod config;
mod database;
pub mod domain;
pub mod error;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{Method, StatusCode, header};
use axum::routing::{get, post};
use axum::{Router, middleware as AxumMiddleware};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use zeroize::Zeroizing;

use adapters::inbound::{graph, http};
use adapters::outbound::argon2::Argon2Hasher;
use adapters::outbound::clock::SystemClock;
use adapters::outbound::jwt::{DEFAULT_AUDIENCE, JwtIssuer};
use adapters::outbound::persistence::{MemoryUserRepository, PgUserRepository};
use application::ports::inbound::UserUsecase;
use application::ports::outbound::{Clock, TokenError, UserRepository};
use application::usecases::UserService;

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    app.oneshot(
        Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// In-memory state with cheap Argon2 parameters.
#[cfg(test)]
pub fn test_state() -> AppState {
    let clock = Arc::new(SystemClock);
    let usecase: Arc<dyn UserUsecase> = Arc::new(UserService::new(
        Arc::new(MemoryUserRepository::new()),
        application::usecases::user::tests::fast_hasher(),
        Arc::new(JwtIssuer::new("http://localhost/", b"test-secret", clock.clone()).unwrap()),
        clock,
    ));

    AppState {
        schema: graph::schema(Arc::clone(&usecase)),
        usecase,
        metrics: None,
    }
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub usecase: Arc<dyn UserUsecase>,
    pub schema: graph::IdentitySchema,
    pub metrics: Option<PrometheusHandle>,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Tag every request with an `x-request-id`.
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        // Remove sensitive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(10)))
        .layer(PropagateRequestIdLayer::x_request_id())
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
                .allow_headers(Any),
        );

    Router::new()
        // `GET /` serves GraphiQL.
        .route("/", get(graph::playground))
        // `POST /query` goes to GraphQL schema.
        .route("/query", post(graph::handler))
        .route("/health", get(http::health))
        .route("/metrics", get(http::metrics))
        .nest("/api/v1/users", http::router())
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state(
    config: &config::Configuration,
    metrics: Option<PrometheusHandle>,
) -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    let repo: Arc<dyn UserRepository> = match config.postgres {
        Some(ref postgres) => Arc::new(PgUserRepository::new(database::connect(postgres).await?)),
        None => {
            tracing::warn!("missing `postgres` entry on `config.yaml` file, users are kept in memory");
            Arc::new(MemoryUserRepository::new())
        },
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let hasher = Arc::new(Argon2Hasher::new(&config.argon2)?);

    // handle jwt.
    let secret = Zeroizing::new(config.token.secret().ok_or(TokenError::MissingSecret)?);
    let issuer: &str = if config.url.is_empty() {
        DEFAULT_AUDIENCE
    } else {
        &config.url
    };
    let mut token = JwtIssuer::new(issuer, secret.as_bytes(), Arc::clone(&clock))?;
    if let Some(audience) = &config.token.audience {
        token = token.with_audience(audience);
    }
    if let Some(expiration) = config.token.expiration {
        token = token.with_expiration(expiration);
    }

    let usecase: Arc<dyn UserUsecase> =
        Arc::new(UserService::new(repo, hasher, Arc::new(token), clock));

    Ok(AppState {
        schema: graph::schema(Arc::clone(&usecase)),
        usecase,
        metrics,
    })
}
