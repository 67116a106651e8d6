//! Generic list/add/edit/view/delete pages, instantiated once per resource.

use std::collections::BTreeMap;

use actix_identity::Identity;
use actix_session::Session;
use actix_web::http::header;
use actix_web::{HttpResponse, Scope, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::{Context, Tera};

use crate::backend::ResourceGateway;
use crate::domain::resource::{ColumnDef, FilterKind, Resource};
use crate::dto::FormPageData;
use crate::forms::login::DeleteForm;
use crate::forms::parse_posted;
use crate::forms::resource::{FormMode, NotifyingListener};
use crate::forms::submit::SubmissionGuard;
use crate::models::config::ServerConfig;
use crate::notify::FlashNotifier;
use crate::pagination::PaginationView;
use crate::routes::{AccessToken, base_context, redirect, render_template, session_expired};
use crate::services::ServiceError;
use crate::services::resources::{self as service, SaveOutcome};
use crate::table::{
    CellClassName, ClassName, LIMIT_PARAM, RenderState, TableModel, TableStyles, TableView,
};

pub fn resource_scope<E: Resource>() -> Scope {
    web::scope(&format!("/{}", E::ENDPOINT))
        .route("", web::get().to(list::<E>))
        .route("", web::post().to(create::<E>))
        .route("/new", web::get().to(new::<E>))
        .route("/export.csv", web::get().to(export::<E>))
        .route("/{id}", web::get().to(view::<E>))
        .route("/{id}", web::post().to(update::<E>))
        .route("/{id}/edit", web::get().to(edit::<E>))
        .route("/{id}/delete", web::post().to(remove::<E>))
}

fn list_url<E: Resource>() -> String {
    format!("/{}", E::ENDPOINT)
}

fn record_url<E: Resource>(id: E::Id) -> String {
    format!("/{}/{id}", E::ENDPOINT)
}

fn amount_cell<R>(_: &R, column: &ColumnDef) -> String {
    match column.filter {
        FilterKind::Range => "text-end".to_string(),
        _ => String::new(),
    }
}

fn table_styles<E: Resource>() -> TableStyles<E> {
    TableStyles {
        row: ClassName::Static("align-middle"),
        cell: CellClassName::Computed(amount_cell::<E>),
    }
}

/// Flashes the failure and redirects; auth failures run the session-expired
/// flow.
fn service_failure<E: Resource>(
    err: ServiceError,
    session: &Session,
    fallback: &str,
) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => session_expired(session),
        ServiceError::NotFound => {
            FlashMessage::error(format!("{} not found.", E::LABEL)).send();
            redirect(&list_url::<E>())
        }
        other => {
            FlashMessage::error(other.to_string()).send();
            redirect(fallback)
        }
    }
}

fn parse_id<E: Resource>(raw: &str) -> Option<E::Id> {
    raw.trim().parse().ok()
}

fn insert_resource<E: Resource>(context: &mut Context) {
    context.insert("endpoint", E::ENDPOINT);
    context.insert("label", E::LABEL);
    context.insert("plural", E::PLURAL);
}

fn render_list<E: Resource>(
    tera: &Tera,
    mut context: Context,
    model: &TableModel,
    table: TableView,
    pagination: PaginationView,
    limit: u32,
) -> HttpResponse {
    let mut page_pairs = model.to_query_pairs();
    page_pairs.push((LIMIT_PARAM.to_string(), limit.to_string()));
    let page_query = serde_html_form::to_string(&page_pairs).unwrap_or_default();

    insert_resource::<E>(&mut context);
    context.insert("columns", E::columns());
    context.insert("table", &table);
    context.insert("pagination", &pagination);
    context.insert("filters", model.filters());
    context.insert("search_query", &model.global_filter());
    context.insert("limit", &limit);
    context.insert("page_query", &page_query);

    render_template(tera, "resources/list.html", &context)
}

#[allow(clippy::too_many_arguments)]
pub async fn list<E: Resource>(
    token: AccessToken,
    params: web::Query<BTreeMap<String, String>>,
    gateway: web::Data<dyn ResourceGateway>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    session: Session,
    user: Option<Identity>,
    flash_messages: IncomingFlashMessages,
) -> HttpResponse {
    let context = base_context(&flash_messages, user.as_ref(), E::ENDPOINT);
    let params = params.into_inner();

    match service::load_list_page::<E, _>(
        gateway.get_ref(),
        &token,
        &params,
        server_config.items_per_page,
    )
    .await
    {
        Ok(data) => {
            let table = data.model.render::<E>(
                &RenderState::Ready,
                &data.records.items,
                &table_styles::<E>(),
            );
            render_list::<E>(
                &tera,
                context,
                &data.model,
                table,
                data.records.pagination,
                data.limit,
            )
        }
        Err(ServiceError::Unauthorized) => session_expired(&session),
        Err(err) => {
            let model = TableModel::from_params(E::columns(), &params);
            let table = model.render::<E>(
                &RenderState::Error {
                    message: err.to_string(),
                },
                &[],
                &table_styles::<E>(),
            );
            render_list::<E>(
                &tera,
                context,
                &model,
                table,
                PaginationView::new(None),
                server_config.items_per_page,
            )
        }
    }
}

fn render_form<E: Resource>(
    tera: &Tera,
    mut context: Context,
    page: &FormPageData<E>,
) -> HttpResponse {
    let label = E::LABEL.to_lowercase();
    let (mode, title, cancel_url) = match page.mode {
        FormMode::Add => ("add", format!("New {label}"), list_url::<E>()),
        FormMode::Edit(id) => ("edit", format!("Edit {label} #{id}"), record_url::<E>(id)),
    };

    insert_resource::<E>(&mut context);
    context.insert("mode", mode);
    context.insert("form_title", &title);
    context.insert("action", &page.action());
    context.insert("cancel_url", &cancel_url);
    context.insert("fields", E::form_fields());
    context.insert("draft", &page.draft);
    context.insert("field_errors", &page.field_errors);
    context.insert("error", &page.error);
    context.insert("submission_id", &page.submission_id);

    render_template(tera, "resources/form.html", &context)
}

pub async fn new<E: Resource>(
    _token: AccessToken,
    tera: web::Data<Tera>,
    user: Option<Identity>,
    flash_messages: IncomingFlashMessages,
) -> HttpResponse {
    let context = base_context(&flash_messages, user.as_ref(), E::ENDPOINT);
    render_form(&tera, context, &service::new_form::<E>())
}

pub async fn edit<E: Resource>(
    token: AccessToken,
    path: web::Path<String>,
    gateway: web::Data<dyn ResourceGateway>,
    tera: web::Data<Tera>,
    session: Session,
    user: Option<Identity>,
    flash_messages: IncomingFlashMessages,
) -> HttpResponse {
    let Some(id) = parse_id::<E>(&path) else {
        return HttpResponse::NotFound().finish();
    };

    match service::load_edit::<E, _>(gateway.get_ref(), &token, id).await {
        Ok(page) => {
            let context = base_context(&flash_messages, user.as_ref(), E::ENDPOINT);
            render_form(&tera, context, &page)
        }
        Err(err) => service_failure::<E>(err, &session, &list_url::<E>()),
    }
}

#[allow(clippy::too_many_arguments)]
async fn save<E: Resource>(
    mode: FormMode<E::Id>,
    token: AccessToken,
    body: web::Bytes,
    gateway: web::Data<dyn ResourceGateway>,
    guard: web::Data<SubmissionGuard>,
    tera: web::Data<Tera>,
    session: Session,
    user: Option<Identity>,
    flash_messages: IncomingFlashMessages,
) -> HttpResponse {
    let back = match mode {
        FormMode::Add => format!("/{}/new", E::ENDPOINT),
        FormMode::Edit(id) => format!("/{}/{id}/edit", E::ENDPOINT),
    };

    let (draft, submission_id) = match parse_posted::<E::Draft>(&body) {
        Ok(parsed) => parsed,
        Err(err) => {
            log::warn!("Rejected {} form: {err}", E::LABEL);
            FlashMessage::error(err.to_string()).send();
            return redirect(&back);
        }
    };

    // Success is flashed for the redirect target; failures are rendered
    // inline with the re-shown form.
    let mut listener = NotifyingListener::new(&FlashNotifier).inline_errors();
    match service::save::<E, _, _>(
        gateway.get_ref(),
        &token,
        mode,
        draft,
        &guard,
        submission_id,
        &mut listener,
    )
    .await
    {
        Ok(SaveOutcome::Saved(record)) => redirect(&record_url::<E>(record.id())),
        Ok(SaveOutcome::Rejected(page)) => {
            let context = base_context(&flash_messages, user.as_ref(), E::ENDPOINT);
            render_form(&tera, context, &page)
        }
        Err(err) => service_failure::<E>(err, &session, &back),
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn create<E: Resource>(
    token: AccessToken,
    body: web::Bytes,
    gateway: web::Data<dyn ResourceGateway>,
    guard: web::Data<SubmissionGuard>,
    tera: web::Data<Tera>,
    session: Session,
    user: Option<Identity>,
    flash_messages: IncomingFlashMessages,
) -> HttpResponse {
    save::<E>(
        FormMode::Add,
        token,
        body,
        gateway,
        guard,
        tera,
        session,
        user,
        flash_messages,
    )
    .await
}

#[allow(clippy::too_many_arguments)]
pub async fn update<E: Resource>(
    token: AccessToken,
    path: web::Path<String>,
    body: web::Bytes,
    gateway: web::Data<dyn ResourceGateway>,
    guard: web::Data<SubmissionGuard>,
    tera: web::Data<Tera>,
    session: Session,
    user: Option<Identity>,
    flash_messages: IncomingFlashMessages,
) -> HttpResponse {
    let Some(id) = parse_id::<E>(&path) else {
        return HttpResponse::NotFound().finish();
    };
    save::<E>(
        FormMode::Edit(id),
        token,
        body,
        gateway,
        guard,
        tera,
        session,
        user,
        flash_messages,
    )
    .await
}

pub async fn view<E: Resource>(
    token: AccessToken,
    path: web::Path<String>,
    gateway: web::Data<dyn ResourceGateway>,
    tera: web::Data<Tera>,
    session: Session,
    user: Option<Identity>,
    flash_messages: IncomingFlashMessages,
) -> HttpResponse {
    let Some(id) = parse_id::<E>(&path) else {
        return HttpResponse::NotFound().finish();
    };

    match service::load_view::<E, _>(gateway.get_ref(), &token, id).await {
        Ok(page) => {
            let mut context = base_context(&flash_messages, user.as_ref(), E::ENDPOINT);
            insert_resource::<E>(&mut context);
            context.insert("record_id", &page.record.id());
            context.insert("title", &page.title);
            context.insert("fields", &page.fields);
            context.insert("submission_id", &page.submission_id);
            render_template(&tera, "resources/view.html", &context)
        }
        Err(err) => service_failure::<E>(err, &session, &list_url::<E>()),
    }
}

pub async fn remove<E: Resource>(
    token: AccessToken,
    path: web::Path<String>,
    web::Form(form): web::Form<DeleteForm>,
    gateway: web::Data<dyn ResourceGateway>,
    guard: web::Data<SubmissionGuard>,
    session: Session,
) -> HttpResponse {
    let Some(id) = parse_id::<E>(&path) else {
        return HttpResponse::NotFound().finish();
    };

    match service::delete::<E, _>(gateway.get_ref(), &token, id, &guard, form.submission_id).await {
        Ok(()) => {
            FlashMessage::success(format!("{} #{id} deleted.", E::LABEL)).send();
            redirect(&list_url::<E>())
        }
        Err(err) => service_failure::<E>(err, &session, &record_url::<E>(id)),
    }
}

pub async fn export<E: Resource>(
    token: AccessToken,
    params: web::Query<BTreeMap<String, String>>,
    gateway: web::Data<dyn ResourceGateway>,
    server_config: web::Data<ServerConfig>,
    session: Session,
) -> HttpResponse {
    match service::export_csv::<E, _>(
        gateway.get_ref(),
        &token,
        &params,
        server_config.items_per_page,
    )
    .await
    {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.csv\"", E::ENDPOINT),
            ))
            .body(csv),
        Err(err) => service_failure::<E>(err, &session, &list_url::<E>()),
    }
}
