use super::{error_response, validate, CredentialsRequest, UserResponse};
use crate::auth::AuthService;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, instrument};

#[utoipa::path(
    post,
    path = "/v1/auth/signup",
    request_body = CredentialsRequest,
    responses (
        (status = 201, description = "User created", body = UserResponse, content_type = "application/json"),
        (status = 400, description = "Invalid payload or email already in use", body = String),
    ),
    tag = "auth"
)]
#[instrument(skip(auth))]
pub async fn signup(
    auth: Extension<Arc<AuthService>>,
    payload: Option<Json<CredentialsRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let (email, password) = match validate(request) {
        Ok(valid) => valid,
        Err(rejection) => return rejection.into_response(),
    };

    match auth.signup(&email, &password).await {
        Ok(user) => {
            debug!(user_id = %user.id, "user registered");

            (StatusCode::CREATED, Json(UserResponse::from(user))).into_response()
        }
        Err(err) => error_response(&err).into_response(),
    }
}
