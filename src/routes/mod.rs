//! HTTP surface of the console.

use std::future::{Ready, ready};
use std::ops::Deref;

use actix_identity::Identity;
use actix_session::{Session, SessionExt};
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, HttpResponse, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use tera::{Context, Tera};

use crate::domain::bank_mutation::BankMutation;
use crate::domain::company::Company;
use crate::domain::customer::Customer;
use crate::domain::group_customer::GroupCustomer;
use crate::domain::invoice::Invoice;
use crate::domain::parameter::Parameter;
use crate::domain::purchase_order::PurchaseOrder;
use crate::domain::region::Region;
use crate::domain::resource::Resource;
use crate::domain::return_record::ReturnRecord;
use crate::domain::supplier::Supplier;
use crate::domain::term_of_payment::TermOfPayment;
use crate::dto::ResourceLink;
use crate::session::{LOGIN_ROUTE, SESSION_EXPIRED_MESSAGE, TOKEN_KEY};

pub mod api;
pub mod auth;
pub mod main;
pub mod resources;

/// Maps a flash message level to the CSS alert class used by templates.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

/// `303 See Other` to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err:?}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Context every page starts from: alerts, the signed-in user and the
/// navigation entries.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: Option<&Identity>,
    current_page: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", &user.and_then(|user| user.id().ok()));
    context.insert("current_page", current_page);
    context.insert("resources", &resource_links());
    context
}

/// Server side of the session-expired flow: drop the session, tell the user,
/// send them to the login page.
pub fn session_expired(session: &Session) -> HttpResponse {
    log::warn!("Backend rejected the session token, redirecting to {LOGIN_ROUTE}");
    session.purge();
    FlashMessage::error(SESSION_EXPIRED_MESSAGE).send();
    redirect(LOGIN_ROUTE)
}

/// Backend bearer token stored in the session at login. Requests without
/// one are answered with `401`.
#[derive(Clone, Debug)]
pub struct AccessToken(String);

impl Deref for AccessToken {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl FromRequest for AccessToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = req
            .get_session()
            .get::<String>(TOKEN_KEY)
            .unwrap_or_else(|err| {
                log::warn!("Unreadable session token: {err}");
                None
            })
            .filter(|token| !token.trim().is_empty());

        ready(
            token
                .map(AccessToken)
                .ok_or_else(|| actix_web::error::ErrorUnauthorized("not signed in")),
        )
    }
}

macro_rules! resources {
    ($($resource:ty),+ $(,)?) => {
        /// Registers the list/add/edit/view/delete pages of every resource.
        pub fn configure_pages(cfg: &mut web::ServiceConfig) {
            $(cfg.service(resources::resource_scope::<$resource>());)+
        }

        /// Registers `GET /<endpoint>/search` for every resource.
        pub fn configure_api(cfg: &mut web::ServiceConfig) {
            $(
                cfg.route(
                    &format!("/{}/search", <$resource as Resource>::ENDPOINT),
                    web::get().to(api::search::<$resource>),
                );
            )+
        }

        pub fn resource_links() -> Vec<ResourceLink> {
            vec![$(ResourceLink {
                endpoint: <$resource as Resource>::ENDPOINT,
                label: <$resource as Resource>::PLURAL,
            }),+]
        }
    };
}

resources!(
    Company,
    Customer,
    Supplier,
    Region,
    TermOfPayment,
    GroupCustomer,
    Invoice,
    PurchaseOrder,
    BankMutation,
    ReturnRecord,
    Parameter,
);
