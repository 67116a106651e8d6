use std::collections::BTreeMap;

use crate::backend::{ListRequest, ResourceGateway, delete_resource, get_resource, list_resources};
use crate::domain::resource::Resource;
use crate::domain::types::{SearchTerm, SubmissionId};
use crate::dto::{FormPageData, ListPageData, SearchQuery, ViewPageData};
use crate::forms::FormError;
use crate::forms::resource::{FormListener, FormMode, ResourceForm, SubmitOutcome};
use crate::forms::submit::SubmissionGuard;
use crate::pagination::{ListPage, Paginated, sanitize_limit, sanitize_page};
use crate::services::{ServiceError, ServiceResult};
use crate::table::{LIMIT_PARAM, TableModel};

/// Outcome of posting an add/edit form.
pub enum SaveOutcome<E: Resource> {
    Saved(E),
    /// Re-render the form with these errors.
    Rejected(FormPageData<E>),
}

fn limit_param(params: &BTreeMap<String, String>, default_limit: u32) -> u32 {
    let requested = params
        .get(LIMIT_PARAM)
        .and_then(|limit| limit.trim().parse().ok())
        .unwrap_or(default_limit);
    sanitize_limit(Some(requested))
}

fn list_request(model: &TableModel, limit: u32) -> ListRequest {
    let request = ListRequest::new(model.page(), limit)
        .filters(model.filters().clone())
        .sort(model.sort().cloned());
    match model.global_filter().and_then(SearchTerm::parse) {
        Some(term) => request.search(term),
        None => request,
    }
}

/// Loads one page of a resource list. The table model is restored from the
/// query string so sort, filters and search survive navigation.
pub async fn load_list_page<E, G>(
    gateway: &G,
    token: &str,
    params: &BTreeMap<String, String>,
    default_limit: u32,
) -> ServiceResult<ListPageData<E>>
where
    E: Resource,
    G: ResourceGateway + ?Sized,
{
    let model = TableModel::from_params(E::columns(), params);
    let limit = limit_param(params, default_limit);

    let page = list_resources::<E, G>(gateway, token, &list_request(&model, limit))
        .await
        .map_err(|err| {
            log::error!("Failed to list {}: {err}", E::ENDPOINT);
            ServiceError::from(err)
        })?;

    Ok(ListPageData {
        model,
        records: Paginated::from_page(page),
        limit,
    })
}

pub async fn load_view<E, G>(gateway: &G, token: &str, id: E::Id) -> ServiceResult<ViewPageData<E>>
where
    E: Resource,
    G: ResourceGateway + ?Sized,
{
    let record = get_resource::<E, G>(gateway, token, id).await.map_err(|err| {
        log::error!("Failed to load {} {id}: {err}", E::LABEL);
        ServiceError::from(err)
    })?;

    Ok(ViewPageData {
        title: record.title(),
        fields: record.view_fields(),
        record,
        submission_id: SubmissionId::generate(),
    })
}

pub fn new_form<E: Resource>() -> FormPageData<E> {
    let mut form = ResourceForm::<E>::new();
    form.open_add();
    FormPageData::new(form.mode(), form.draft().clone())
}

/// Fetches a record and seeds an edit draft from it.
pub async fn load_edit<E, G>(gateway: &G, token: &str, id: E::Id) -> ServiceResult<FormPageData<E>>
where
    E: Resource,
    G: ResourceGateway + ?Sized,
{
    let record = get_resource::<E, G>(gateway, token, id).await.map_err(|err| {
        log::error!("Failed to load {} {id} for editing: {err}", E::LABEL);
        ServiceError::from(err)
    })?;

    let mut form = ResourceForm::<E>::new();
    form.open_edit(&record);
    Ok(FormPageData::new(form.mode(), form.draft().clone()))
}

/// Creates or updates a record from a posted draft. Each rendered form
/// carries a submission id; a second post with the same id is refused.
/// Submits a posted draft at most once per `submission_id`. The listener
/// hears about saves and failures as they happen.
pub async fn save<E, G, L>(
    gateway: &G,
    token: &str,
    mode: FormMode<E::Id>,
    draft: E::Draft,
    guard: &SubmissionGuard,
    submission_id: SubmissionId,
    listener: &mut L,
) -> ServiceResult<SaveOutcome<E>>
where
    E: Resource,
    G: ResourceGateway + ?Sized,
    L: FormListener<E> + ?Sized,
{
    let ticket = guard
        .begin(submission_id)
        .ok_or_else(|| ServiceError::from(FormError::DuplicateSubmission))?;

    let mut form = ResourceForm::<E>::with_draft(mode, draft);
    let outcome = form.submit(gateway, token, listener).await;

    let error = match outcome {
        SubmitOutcome::Saved(record) => {
            ticket.complete();
            return Ok(SaveOutcome::Saved(record));
        }
        SubmitOutcome::AuthExpired => return Err(ServiceError::Unauthorized),
        SubmitOutcome::Invalid => None,
        SubmitOutcome::Failed(message) => Some(message),
        SubmitOutcome::Refused => Some(FormError::DuplicateSubmission.to_string()),
    };

    Ok(SaveOutcome::Rejected(FormPageData {
        mode,
        draft: form.draft().clone(),
        field_errors: form.field_errors().clone(),
        error,
        submission_id,
    }))
}

pub async fn delete<E, G>(
    gateway: &G,
    token: &str,
    id: E::Id,
    guard: &SubmissionGuard,
    submission_id: SubmissionId,
) -> ServiceResult<()>
where
    E: Resource,
    G: ResourceGateway + ?Sized,
{
    let ticket = guard
        .begin(submission_id)
        .ok_or_else(|| ServiceError::from(FormError::DuplicateSubmission))?;

    delete_resource::<E, G>(gateway, token, id).await.map_err(|err| {
        log::error!("Failed to delete {} {id}: {err}", E::LABEL);
        ServiceError::from(err)
    })?;

    ticket.complete();
    Ok(())
}

/// JSON search. Blank queries answer an empty first page without calling
/// the backend.
pub async fn search_json<E, G>(
    gateway: &G,
    token: &str,
    query: SearchQuery,
) -> ServiceResult<ListPage<E>>
where
    E: Resource,
    G: ResourceGateway + ?Sized,
{
    let limit = sanitize_limit(query.limit);
    let Some(term) = query.q.as_deref().and_then(SearchTerm::parse) else {
        return Ok(ListPage::empty(limit));
    };

    let request = ListRequest::new(sanitize_page(query.page), limit).search(term);
    list_resources::<E, G>(gateway, token, &request)
        .await
        .map_err(|err| {
            log::error!("Search on {} failed: {err}", E::ENDPOINT);
            ServiceError::from(err)
        })
}

/// The current list page as CSV, one column per table column.
pub async fn export_csv<E, G>(
    gateway: &G,
    token: &str,
    params: &BTreeMap<String, String>,
    default_limit: u32,
) -> ServiceResult<String>
where
    E: Resource,
    G: ResourceGateway + ?Sized,
{
    let data = load_list_page::<E, G>(gateway, token, params, default_limit).await?;
    let columns = E::columns();

    let mut writer = csv::Writer::from_writer(Vec::new());
    let csv_error = |err: csv::Error| {
        log::error!("Failed to write {} CSV: {err}", E::ENDPOINT);
        ServiceError::Backend("Could not build the CSV export.".to_string())
    };

    writer
        .write_record(columns.iter().map(|column| column.header))
        .map_err(csv_error)?;
    for record in &data.records.items {
        writer
            .write_record(
                columns
                    .iter()
                    .map(|column| record.cell(column.key).unwrap_or_default()),
            )
            .map_err(csv_error)?;
    }

    let bytes = writer.into_inner().map_err(|err| {
        log::error!("Failed to flush {} CSV: {err}", E::ENDPOINT);
        ServiceError::Backend("Could not build the CSV export.".to_string())
    })?;
    String::from_utf8(bytes).map_err(|err| {
        log::error!("CSV export is not UTF-8: {err}");
        ServiceError::Backend("Could not build the CSV export.".to_string())
    })
}
