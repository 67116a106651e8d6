use actix_identity::Identity;
use actix_web::{Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::routes::{AccessToken, base_context, render_template};

/// Dashboard linking to every resource list.
#[get("/")]
pub async fn show_index(
    _token: AccessToken,
    user: Option<Identity>,
    tera: web::Data<Tera>,
    flash_messages: IncomingFlashMessages,
) -> impl Responder {
    let context = base_context(&flash_messages, user.as_ref(), "index");
    render_template(&tera, "main/index.html", &context)
}
