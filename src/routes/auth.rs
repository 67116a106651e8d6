use actix_identity::Identity;
use actix_session::Session;
use actix_web::{HttpMessage, HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::backend::ResourceGateway;
use crate::forms::login::LoginForm;
use crate::routes::{base_context, redirect, render_template};
use crate::services::auth::login;
use crate::session::{LOGIN_ROUTE, TOKEN_KEY};

#[get("/login")]
pub async fn show_login(
    user: Option<Identity>,
    tera: web::Data<Tera>,
    flash_messages: IncomingFlashMessages,
) -> impl Responder {
    if user.is_some() {
        return redirect("/");
    }
    let context = base_context(&flash_messages, None, "login");
    render_template(&tera, "auth/login.html", &context)
}

#[post("/login")]
pub async fn do_login(
    request: HttpRequest,
    session: Session,
    gateway: web::Data<dyn ResourceGateway>,
    web::Form(form): web::Form<LoginForm>,
) -> impl Responder {
    let username = form.username.trim().to_string();

    let token = match login(gateway.get_ref(), form).await {
        Ok(token) => token,
        Err(err) => {
            FlashMessage::error(err.to_string()).send();
            return redirect(LOGIN_ROUTE);
        }
    };

    session.renew();
    if let Err(err) = session.insert(TOKEN_KEY, token) {
        log::error!("Failed to store session token: {err}");
        FlashMessage::error("Could not start a session.").send();
        return redirect(LOGIN_ROUTE);
    }
    if let Err(err) = Identity::login(&request.extensions(), username) {
        log::error!("Failed to attach identity: {err}");
    }

    redirect("/")
}

#[post("/logout")]
pub async fn logout(user: Option<Identity>, session: Session) -> impl Responder {
    if let Some(user) = user {
        user.logout();
    }
    session.purge();
    redirect(LOGIN_ROUTE)
}
