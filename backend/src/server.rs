//! Server construction and dependency wiring.
//!
//! Builds the in-memory repositories, the two authentication services and
//! the signers from [`AppSettings`], then hands the assembled [`HttpState`]
//! to every worker.

pub mod config;

pub use config::AppSettings;

use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::confirmation::CodeSigner;
use crate::domain::session::TokenSigner;
use crate::domain::user::{EmailAddress, Role, User, Username};
use crate::domain::{SignupService, TokenService};
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http;
use crate::inbound::http::state::HttpState;
use crate::middleware::Trace;
use crate::outbound::mail::LogMailSink;
use crate::outbound::persistence::{
    MemoryCatalogueRepository, MemoryReviewRepository, MemoryUserRepository,
};

/// Accounts seeded before the server starts accepting requests.
fn bootstrap_users(settings: &AppSettings) -> std::io::Result<Vec<User>> {
    let (Some(raw_username), Some(raw_email)) = (&settings.admin_username, &settings.admin_email)
    else {
        return Ok(Vec::new());
    };
    let username = Username::new(raw_username.clone())
        .map_err(|e| std::io::Error::other(format!("invalid admin username: {e}")))?;
    let email = EmailAddress::new(raw_email.clone())
        .map_err(|e| std::io::Error::other(format!("invalid admin email: {e}")))?;
    let mut admin = User::with_role(username, email, Role::Admin);
    admin.set_superuser(true);
    tracing::info!(username = %admin.username(), "seeding superuser account");
    Ok(vec![admin])
}

/// Assemble the handler dependency bundle from settings.
///
/// # Errors
/// Fails when the auth secret is missing in a release build or the
/// bootstrap admin account is malformed.
pub fn build_http_state(settings: &AppSettings) -> std::io::Result<HttpState> {
    let secret = settings.auth_secret()?;
    let codes = Arc::new(CodeSigner::new(secret.clone()));
    let tokens = Arc::new(TokenSigner::new(secret, settings.token_ttl()));

    let users = Arc::new(MemoryUserRepository::with_users(bootstrap_users(settings)?));
    let catalogue = Arc::new(MemoryCatalogueRepository::new());
    let reviews = Arc::new(MemoryReviewRepository::new());
    let mail = Arc::new(LogMailSink);

    let signup = Arc::new(SignupService::new(
        Arc::clone(&users),
        mail,
        Arc::clone(&codes),
        settings.mail_sender().to_owned(),
    ));
    let token_exchange = Arc::new(TokenService::new(
        Arc::clone(&users),
        codes,
        Arc::clone(&tokens),
    ));

    Ok(HttpState {
        signup,
        token_exchange,
        users,
        catalogue,
        reviews,
        sessions: tokens,
    })
}

/// Bind and start the HTTP server.
///
/// # Errors
/// Propagates [`std::io::Error`] from state assembly or socket binding.
pub fn create_server(settings: &AppSettings) -> std::io::Result<Server> {
    let state = web::Data::new(build_http_state(settings)?);

    let server = HttpServer::new(move || {
        let app = App::new()
            .app_data(state.clone())
            .wrap(Trace)
            .configure(http::configure);

        #[cfg(debug_assertions)]
        let app =
            app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
        #[cfg(not(debug_assertions))]
        let app = app;

        app
    })
    .bind(settings.bind_addr())?
    .run();

    Ok(server)
}
