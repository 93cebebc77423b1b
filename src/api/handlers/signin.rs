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

// Unknown email (404) and wrong password (400) share one body so the
// response text does not reveal which accounts exist.
#[utoipa::path(
    post,
    path = "/v1/auth/signin",
    request_body = CredentialsRequest,
    responses (
        (status = 200, description = "Signin successful", body = UserResponse, content_type = "application/json"),
        (status = 400, description = "Invalid payload or wrong password", body = String),
        (status = 404, description = "Unknown email", body = String),
        (status = 500, description = "Stored credential is unusable", body = String),
    ),
    tag = "auth"
)]
#[instrument(skip(auth))]
pub async fn signin(
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

    match auth.signin(&email, &password).await {
        Ok(user) => {
            debug!(user_id = %user.id, "signin successful");

            (StatusCode::OK, Json(UserResponse::from(user))).into_response()
        }
        Err(err) => error_response(&err).into_response(),
    }
}
