//! User account handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;

use super::Json;
use crate::AppState;
use crate::application::dto::{AuthView, LoginInput, RegisterInput, UpdateUserInput, UserView};
use crate::domain::user::UserId;
use crate::error::Result;

/// Create an account, answers `201 Created`.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterInput>,
) -> Result<(StatusCode, Json<AuthView>)> {
    let auth = state.usecase.register(body).await?;
    Ok((StatusCode::CREATED, Json(auth)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> Result<Json<AuthView>> {
    Ok(Json(state.usecase.login(body).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserView>> {
    let id = user_id.parse::<UserId>()?;
    Ok(Json(state.usecase.get_user(id).await?))
}

/// Partial update, absent fields are left unchanged.
pub async fn update(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<UpdateUserInput>,
) -> Result<Json<UserView>> {
    let id = user_id.parse::<UserId>()?;
    Ok(Json(state.usecase.update_user(id, body).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode> {
    let id = user_id.parse::<UserId>()?;
    state.usecase.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Response, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    use crate::*;

    const REGISTER: &str = "/api/v1/users/register";
    const LOGIN: &str = "/api/v1/users/login";

    async fn body(response: Response<Body>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn register_ana(app: &Router) -> Value {
        let response = make_request(
            app.clone(),
            Method::POST,
            REGISTER,
            json!({ "name": "Ana", "email": "Ana@X.com", "password": "secret1" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body(response).await
    }

    #[tokio::test]
    async fn test_register_handler() {
        let app = app(test_state());

        let auth = register_ana(&app).await;
        assert!(!auth["token"].as_str().unwrap().is_empty());
        assert_eq!(auth["user"]["name"], "Ana");
        assert_eq!(auth["user"]["email"], "ana@x.com");
        assert!(auth["user"].get("password").is_none());

        let response = make_request(
            app,
            Method::POST,
            REGISTER,
            json!({ "name": "Ana bis", "email": "ana@x.com", "password": "secret2" })
                .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body(response).await["type"], "DUPLICATE_EMAIL");
    }

    #[tokio::test]
    async fn test_register_validation() {
        let app = app(test_state());

        let response = make_request(
            app,
            Method::POST,
            REGISTER,
            json!({ "name": "", "email": "not-an-email", "password": "123" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body(response).await;
        assert_eq!(body["type"], "VALIDATION_ERROR");
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, ["email", "name", "password"]);
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let app = app(test_state());

        let response =
            make_request(app, Method::POST, REGISTER, "{\"name\":".to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_handler() {
        let app = app(test_state());
        register_ana(&app).await;

        let response = make_request(
            app.clone(),
            Method::POST,
            LOGIN,
            json!({ "email": "ana@x.com", "password": "wrong" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let wrong_password = body(response).await;

        let response = make_request(
            app.clone(),
            Method::POST,
            LOGIN,
            json!({ "email": "bob@x.com", "password": "secret1" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body(response).await, wrong_password);

        // Padding and casing are normalized away.
        let response = make_request(
            app,
            Method::POST,
            LOGIN,
            json!({ "email": "  ANA@x.com ", "password": "secret1" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!body(response).await["token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        let app = app(test_state());
        let auth = register_ana(&app).await;
        let path = format!("/api/v1/users/{}", auth["user"]["id"]);

        let response = make_request(app.clone(), Method::GET, &path, String::default()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, auth["user"]);

        let response = make_request(
            app.clone(),
            Method::PATCH,
            &path,
            json!({ "name": "Ana Maria" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body(response).await;
        assert_eq!(updated["name"], "Ana Maria");
        assert_eq!(updated["email"], "ana@x.com");

        let response =
            make_request(app.clone(), Method::DELETE, &path, String::default()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = make_request(app.clone(), Method::GET, &path, String::default()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = make_request(app, Method::DELETE, &path, String::default()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_id() {
        let app = app(test_state());

        let response =
            make_request(app, Method::GET, "/api/v1/users/abc", String::default()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(response).await["errors"][0]["field"], "id");
    }
}
