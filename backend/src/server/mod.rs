//! Server construction and dependency wiring.
//!
//! Adapters are built here and injected into domain services, which are
//! bundled into [`HttpState`] for the handlers. Nothing in this module is
//! a process-wide singleton: everything flows through constructors.

mod config;

pub use config::{ConfigError, ServerConfig};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use chrono::Duration;

use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::domain::ports::TokenCodec;
use backend::domain::{AccountServiceImpl, FeedbackServiceImpl, TaxonomyServiceImpl};
use backend::inbound::http::categories::{
    create_category, list_categories, list_statuses,
};
use backend::inbound::http::feedback::{
    create_feedback, delete_feedback, list_feedback, toggle_vote, update_feedback,
};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::users::{
    delete_account, get_profile, login, register, update_profile,
};
use backend::outbound::auth::{BcryptPasswordHasher, JwtTokenCodec};
use backend::outbound::persistence::{
    DbPool, DieselPostRepository, DieselTaxonomyRepository, DieselUserRepository,
    DieselVoteRepository,
};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Wire Diesel adapters into domain services and bundle them for handlers.
fn build_http_state(config: &ServerConfig, pool: DbPool) -> web::Data<HttpState> {
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let posts = Arc::new(DieselPostRepository::new(pool.clone()));
    let votes = Arc::new(DieselVoteRepository::new(pool.clone()));
    let taxonomy = Arc::new(DieselTaxonomyRepository::new(pool));

    let hasher = Arc::new(BcryptPasswordHasher::new());
    let tokens: Arc<dyn TokenCodec> = Arc::new(JwtTokenCodec::new(
        config.jwt_secret.as_bytes(),
        Duration::hours(config.jwt_ttl_hours),
    ));

    let accounts = Arc::new(AccountServiceImpl::new(users, hasher, tokens.clone()));
    let feedback = Arc::new(FeedbackServiceImpl::new(posts, votes, taxonomy.clone()));
    let taxonomy_service = Arc::new(TaxonomyServiceImpl::new(taxonomy));

    web::Data::new(HttpState::new(accounts, feedback, taxonomy_service, tokens))
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api")
        .service(register)
        .service(login)
        .service(get_profile)
        .service(update_profile)
        .service(delete_account)
        .service(list_feedback)
        .service(create_feedback)
        .service(update_feedback)
        .service(delete_feedback)
        .service(toggle_vote)
        .service(list_categories)
        .service(list_statuses)
        .service(create_category);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(
        SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    app
}

/// Construct the HTTP server from pre-built configuration and pool.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: &ServerConfig,
    pool: DbPool,
) -> std::io::Result<Server> {
    let http_state = build_http_state(config, pool);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
