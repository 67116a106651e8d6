//! Back-office administration console.
//!
//! The data layer (`domain`, `pagination`, `table`, `filters`, `search`,
//! `forms`, `backend`, `services`) works without a web server; the `server`
//! feature adds the Actix-web application that renders it.

pub mod backend;
pub mod domain;
pub mod dto;
pub mod filters;
pub mod forms;
pub mod notify;
pub mod pagination;
pub mod search;
pub mod services;
pub mod session;
pub mod table;

#[cfg(feature = "server")]
pub mod middleware;
#[cfg(feature = "server")]
pub mod models;
#[cfg(feature = "server")]
pub mod routes;

#[cfg(feature = "server")]
pub use server::run;

#[cfg(feature = "server")]
mod server {
    use std::sync::Arc;
    use std::time::Duration;

    use actix_cors::Cors;
    use actix_files::Files;
    use actix_identity::IdentityMiddleware;
    use actix_session::{SessionMiddleware, storage::CookieSessionStore};
    use actix_web::cookie::Key;
    use actix_web::{App, HttpServer, middleware, web};
    use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
    use tera::Tera;

    use crate::backend::{HttpBackend, ResourceGateway};
    use crate::forms::submit::SubmissionGuard;
    use crate::middleware::RedirectUnauthorized;
    use crate::models::config::ServerConfig;
    use crate::routes::auth::{do_login, logout, show_login};
    use crate::routes::main::show_index;
    use crate::routes::{configure_api, configure_pages};

    /// Builds and runs the Actix-Web HTTP server using the provided configuration.
    pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
        let backend = HttpBackend::new(
            server_config.backend_base_url(),
            Duration::from_secs(server_config.backend_timeout_secs),
        )
        .map_err(|e| std::io::Error::other(format!("Failed to build backend client: {e}")))?;
        log::info!(
            "Using {} backend at {}",
            server_config.app_env.as_str(),
            server_config.backend_base_url()
        );

        let gateway: web::Data<dyn ResourceGateway> =
            web::Data::from(Arc::new(backend) as Arc<dyn ResourceGateway>);
        let submission_guard = web::Data::new(SubmissionGuard::default());

        // Keys and stores for identity, sessions, and flash messages.
        let secret_key = Key::from(server_config.secret.as_bytes());

        let message_store = CookieMessageStore::builder(secret_key.clone()).build();
        let message_framework = FlashMessagesFramework::builder(message_store).build();

        let tera = Tera::new(&server_config.templates_dir)
            .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

        let cookie_domain = match server_config.domain.as_str() {
            "" | "localhost" => None,
            domain => Some(format!(".{domain}")),
        };
        let bind_address = (server_config.address.clone(), server_config.port);

        HttpServer::new(move || {
            App::new()
                .wrap(Cors::permissive())
                .wrap(message_framework.clone())
                .wrap(IdentityMiddleware::default())
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                        .cookie_secure(false) // set to true in prod
                        .cookie_domain(cookie_domain.clone())
                        .build(),
                )
                .wrap(middleware::Compress::default())
                .wrap(middleware::Logger::default())
                .service(Files::new("/assets", "./assets"))
                .service(show_login)
                .service(do_login)
                .service(logout)
                .service(web::scope("/api/v1").configure(configure_api))
                .service(
                    web::scope("")
                        .wrap(RedirectUnauthorized)
                        .service(show_index)
                        .configure(configure_pages),
                )
                .app_data(web::Data::new(tera.clone()))
                .app_data(gateway.clone())
                .app_data(submission_guard.clone())
                .app_data(web::Data::new(server_config.clone()))
        })
        .bind(bind_address)?
        .run()
        .await
    }
}
