//! Users API handlers.
//!
//! ```text
//! GET    /users
//! GET    /users/{uuid}
//! POST   /users          {"email":"ada@example.com","username":"ada"}
//! PUT    /users/{uuid}   {"email":"ada@example.com","username":"ada"}
//! PATCH  /users/{uuid}   {"username":"countess"}
//! DELETE /users/{uuid}
//! ```
//!
//! Every handler returns `Result<_, HandlerError>` and is registered through
//! [`fallible`], so failures are classified into JSON error bodies.

use std::sync::Arc;

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use tracing::info;

use super::error::HandlerError;
use super::respond::{fallible, json_config, not_found};
use crate::models::{AppError, CreateUser, PatchUser, UpdateUser, User};
use crate::storage::UserStorage;

/// Collection route.
pub const USERS_URL: &str = "/users";
/// Single-user route.
pub const USER_URL: &str = "/users/{uuid}";

/// Dependencies shared by the user handlers.
#[derive(Clone)]
pub struct UsersState {
    /// Storage port the handlers read and write through.
    pub storage: Arc<dyn UserStorage>,
}

impl UsersState {
    /// Bundle a storage adapter for the handlers.
    pub fn new(storage: Arc<dyn UserStorage>) -> Self {
        Self { storage }
    }
}

/// Register the user routes.
///
/// Called once per worker while the application is built; the resulting
/// route table is never modified afterwards.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use actix_web::{web, App};
/// use rest_api_service::api::users::{configure, UsersState};
/// use rest_api_service::storage::MemoryUserStorage;
///
/// let state = web::Data::new(UsersState::new(Arc::new(MemoryUserStorage::new())));
/// let app = App::new().app_data(state).configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(
            web::resource(USERS_URL)
                .route(web::get().to(fallible(list_users)))
                .route(web::post().to(fallible(create_user))),
        )
        .service(
            web::resource(USER_URL)
                .route(web::get().to(fallible(get_user)))
                .route(web::put().to(fallible(update_user)))
                .route(web::patch().to(fallible(partially_update_user)))
                .route(web::delete().to(fallible(delete_user))),
        )
        .default_service(web::to(not_found));
}

/// List all users.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 500, description = "Internal server error", body = AppError)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
pub async fn list_users(
    state: web::Data<UsersState>,
) -> Result<web::Json<Vec<User>>, HandlerError> {
    let users = state.storage.find_all().await?;
    Ok(web::Json(users))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/users/{uuid}",
    params(("uuid" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 400, description = "Malformed identifier", body = AppError),
        (status = 404, description = "Not found", body = AppError),
        (status = 500, description = "Internal server error", body = AppError)
    ),
    tags = ["users"],
    operation_id = "getUserByUuid"
)]
pub async fn get_user(
    state: web::Data<UsersState>,
    uuid: web::Path<String>,
) -> Result<web::Json<User>, HandlerError> {
    let user = state.storage.find_one(&uuid).await?;
    Ok(web::Json(user))
}

/// Create a user and point the client at it.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "Created", headers(("Location" = String, description = "URL of the new user"))),
        (status = 400, description = "Invalid request", body = AppError),
        (status = 500, description = "Internal server error", body = AppError)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
pub async fn create_user(
    state: web::Data<UsersState>,
    payload: web::Json<CreateUser>,
) -> Result<HttpResponse, HandlerError> {
    let id = state.storage.create(payload.into_inner()).await?;
    info!(%id, "user created");
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("{USERS_URL}/{id}")))
        .finish())
}

/// Replace a user's fields.
#[utoipa::path(
    put,
    path = "/users/{uuid}",
    params(("uuid" = String, Path, description = "User identifier")),
    request_body = UpdateUser,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Invalid request", body = AppError),
        (status = 404, description = "Not found", body = AppError),
        (status = 500, description = "Internal server error", body = AppError)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
pub async fn update_user(
    state: web::Data<UsersState>,
    uuid: web::Path<String>,
    payload: web::Json<UpdateUser>,
) -> Result<HttpResponse, HandlerError> {
    let UpdateUser { email, username } = payload.into_inner();
    let user = User {
        id: uuid.into_inner(),
        email,
        username,
    };
    state.storage.update(&user).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Change only the fields present in the body.
#[utoipa::path(
    patch,
    path = "/users/{uuid}",
    params(("uuid" = String, Path, description = "User identifier")),
    request_body = PatchUser,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Invalid request", body = AppError),
        (status = 404, description = "Not found", body = AppError),
        (status = 500, description = "Internal server error", body = AppError)
    ),
    tags = ["users"],
    operation_id = "partiallyUpdateUser"
)]
pub async fn partially_update_user(
    state: web::Data<UsersState>,
    uuid: web::Path<String>,
    payload: web::Json<PatchUser>,
) -> Result<HttpResponse, HandlerError> {
    let patch = payload.into_inner();
    if patch == PatchUser::default() {
        return Err(AppError::invalid_request("patch has no fields to update").into());
    }
    let user = state.storage.find_one(&uuid).await?.patched(patch);
    state.storage.update(&user).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Remove a user.
#[utoipa::path(
    delete,
    path = "/users/{uuid}",
    params(("uuid" = String, Path, description = "User identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Malformed identifier", body = AppError),
        (status = 404, description = "Not found", body = AppError),
        (status = 500, description = "Internal server error", body = AppError)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
pub async fn delete_user(
    state: web::Data<UsersState>,
    uuid: web::Path<String>,
) -> Result<HttpResponse, HandlerError> {
    state.storage.delete(&uuid).await?;
    info!(id = %uuid, "user deleted");
    Ok(HttpResponse::NoContent().finish())
}
