//! Data handed from services to route handlers and templates.

use serde::{Deserialize, Serialize};

use crate::domain::resource::{Resource, ViewField};
use crate::domain::types::SubmissionId;
use crate::forms::resource::{FieldErrors, FormMode};
use crate::pagination::Paginated;
use crate::table::TableModel;

/// Query accepted by the JSON search endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Everything a list page renders.
pub struct ListPageData<E> {
    pub model: TableModel,
    pub records: Paginated<E>,
    pub limit: u32,
}

/// Add/edit page: the draft being edited and its errors.
pub struct FormPageData<E: Resource> {
    pub mode: FormMode<E::Id>,
    pub draft: E::Draft,
    pub field_errors: FieldErrors,
    /// Message shown above the form when saving failed.
    pub error: Option<String>,
    pub submission_id: SubmissionId,
}

impl<E: Resource> FormPageData<E> {
    pub fn new(mode: FormMode<E::Id>, draft: E::Draft) -> Self {
        Self {
            mode,
            draft,
            field_errors: FieldErrors::new(),
            error: None,
            submission_id: SubmissionId::generate(),
        }
    }

    /// Target of the form's `action` attribute.
    pub fn action(&self) -> String {
        match self.mode {
            FormMode::Add => format!("/{}", E::ENDPOINT),
            FormMode::Edit(id) => format!("/{}/{id}", E::ENDPOINT),
        }
    }
}

/// Read-only record page.
pub struct ViewPageData<E> {
    pub record: E,
    pub title: String,
    pub fields: Vec<ViewField>,
    pub submission_id: SubmissionId,
}

/// Dashboard link to one resource list.
#[derive(Clone, Debug, Serialize)]
pub struct ResourceLink {
    pub endpoint: &'static str,
    pub label: &'static str,
}
