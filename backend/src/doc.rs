//! OpenAPI documentation for the users API.
//!
//! [`ApiDoc`] registers every `/users` route and the request, response and
//! error body schemas. Swagger UI serves it in debug builds.

use utoipa::OpenApi;

use crate::models::{AppError, CreateUser, PatchUser, UpdateUser, User};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users REST API",
        description = "CRUD access to users. Failures share one JSON error body."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::api::users::list_users,
        crate::api::users::get_user,
        crate::api::users::create_user,
        crate::api::users::update_user,
        crate::api::users::partially_update_user,
        crate::api::users::delete_user,
    ),
    components(schemas(AppError, User, CreateUser, UpdateUser, PatchUser)),
    tags(
        (name = "users", description = "Operations related to users")
    )
)]
pub struct ApiDoc;
