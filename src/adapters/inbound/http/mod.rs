//! REST HTTP API.
mod users;

use axum::Router;
use axum::extract::{FromRequest, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};

use crate::AppState;
use crate::error::ServerError;

/// JSON extractor and responder whose rejection is a [`ServerError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
    axum::Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Routes mounted under `/api/v1/users`.
pub fn router() -> Router<AppState> {
    Router::new()
        // `POST /register` goes to `register`.
        .route("/register", post(users::register))
        // `POST /login` goes to `login`.
        .route("/login", post(users::login))
        .route(
            "/{user_id}",
            get(users::get).patch(users::update).delete(users::delete),
        )
}

/// Liveness check.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Prometheus exposition, when the recorder is installed.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;

    use crate::*;

    #[tokio::test]
    async fn test_health() {
        let app = app(test_state());

        let response = make_request(app, Method::GET, "/health", String::default()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, serde_json::json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_metrics_disabled() {
        let app = app(test_state());

        let response = make_request(app, Method::GET, "/metrics", String::default()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let app = app(test_state());

        let response = make_request(app, Method::GET, "/health", String::default()).await;
        assert!(response.headers().contains_key("x-request-id"));
    }
}
