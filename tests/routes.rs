use std::sync::Arc;
use std::time::Duration;

use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use actix_web_flash_messages::{FlashMessagesFramework, Level, storage::CookieMessageStore};
use tera::Tera;

use backoffice_console::backend::{HttpBackend, ResourceGateway};
use backoffice_console::forms::submit::SubmissionGuard;
use backoffice_console::middleware::RedirectUnauthorized;
use backoffice_console::models::config::{AppEnv, ServerConfig};
use backoffice_console::routes::auth::show_login;
use backoffice_console::routes::main::show_index;
use backoffice_console::routes::{alert_level_to_str, configure_api, configure_pages, resource_links};

#[::core::prelude::v1::test]
fn test_alert_level_to_str_mappings() {
    assert_eq!(alert_level_to_str(&Level::Error), "danger");
    assert_eq!(alert_level_to_str(&Level::Warning), "warning");
    assert_eq!(alert_level_to_str(&Level::Success), "success");
    assert_eq!(alert_level_to_str(&Level::Info), "info");
    assert_eq!(alert_level_to_str(&Level::Debug), "info");
}

#[::core::prelude::v1::test]
fn every_resource_is_linked_once() {
    let links = resource_links();
    assert_eq!(links.len(), 11);
    assert!(links.iter().any(|link| link.endpoint == "term-of-payments"));
    let mut endpoints: Vec<_> = links.iter().map(|link| link.endpoint).collect();
    endpoints.sort_unstable();
    endpoints.dedup();
    assert_eq!(endpoints.len(), 11);
}

fn server_config() -> ServerConfig {
    ServerConfig {
        domain: "localhost".into(),
        address: "127.0.0.1".into(),
        port: 8080,
        templates_dir: "templates/**/*".into(),
        secret: "s".repeat(64),
        app_env: AppEnv::Local,
        // Nothing listens here; no test reaches the backend.
        backend_base_url_local: "http://127.0.0.1:9".into(),
        backend_base_url_dev: "http://127.0.0.1:9".into(),
        backend_timeout_secs: 1,
        items_per_page: 10,
    }
}

macro_rules! console_app {
    () => {{
        let key = Key::from(&[7u8; 64]);
        let config = server_config();
        let backend = HttpBackend::new(config.backend_base_url(), Duration::from_secs(1)).unwrap();
        let gateway: web::Data<dyn ResourceGateway> =
            web::Data::from(Arc::new(backend) as Arc<dyn ResourceGateway>);
        let tera = Tera::new(&config.templates_dir).unwrap();
        let flash = FlashMessagesFramework::builder(CookieMessageStore::builder(key.clone()).build())
            .build();

        test::init_service(
            App::new()
                .wrap(flash)
                .wrap(IdentityMiddleware::default())
                .wrap(SessionMiddleware::new(CookieSessionStore::default(), key))
                .service(show_login)
                .service(web::scope("/api/v1").configure(configure_api))
                .service(
                    web::scope("")
                        .wrap(RedirectUnauthorized)
                        .service(show_index)
                        .configure(configure_pages),
                )
                .app_data(web::Data::new(tera))
                .app_data(gateway)
                .app_data(web::Data::new(SubmissionGuard::default()))
                .app_data(web::Data::new(config)),
        )
        .await
    }};
}

#[actix_web::test]
async fn templates_parse() {
    let tera = Tera::new("templates/**/*").unwrap();
    let names: Vec<_> = tera.get_template_names().collect();
    for expected in [
        "base.html",
        "auth/login.html",
        "main/index.html",
        "resources/list.html",
        "resources/form.html",
        "resources/view.html",
    ] {
        assert!(names.contains(&expected), "missing {expected}");
    }
}

#[actix_web::test]
async fn login_page_renders_for_anonymous_users() {
    let app = console_app!();

    let req = test::TestRequest::get().uri("/login").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("name=\"password\""));
}

#[actix_web::test]
async fn anonymous_index_redirects_to_login() {
    let app = console_app!();

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");
}

#[actix_web::test]
async fn anonymous_resource_pages_redirect_to_login() {
    let app = console_app!();

    for uri in ["/customers", "/regions/new", "/invoices/3", "/companies/export.csv"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");
    }
}

#[actix_web::test]
async fn anonymous_search_api_answers_unauthorized() {
    let app = console_app!();

    let req = test::TestRequest::get()
        .uri("/api/v1/customers/search?q=acme")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
