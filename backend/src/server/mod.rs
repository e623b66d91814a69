//! Server construction and middleware wiring.

mod state_builders;

pub use state_builders::build_users_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use rest_api_service::Trace;
use rest_api_service::api::users::{UsersState, configure};
use rest_api_service::config::ServerSettings;
#[cfg(debug_assertions)]
use rest_api_service::doc::ApiDoc;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    users_state: web::Data<UsersState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(users_state)
        .wrap(Trace)
        .configure(configure);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server for the user routes.
///
/// # Returns
/// A [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    settings: &ServerSettings,
    users_state: web::Data<UsersState>,
) -> std::io::Result<Server> {
    let server = HttpServer::new(move || build_app(users_state.clone()))
        .client_request_timeout(settings.request_timeout())
        .client_disconnect_timeout(settings.disconnect_timeout())
        .bind(settings.bind_addr())?
        .run();
    Ok(server)
}
