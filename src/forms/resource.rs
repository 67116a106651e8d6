//! Add/edit form shared by every [`Resource`].

use std::collections::BTreeMap;

use validator::{Validate, ValidationErrors};

use crate::backend::{BackendError, ResourceGateway, create_resource, update_resource};
use crate::domain::resource::Resource;
use crate::forms::submit::SubmitState;
use crate::notify::Notifier;
use crate::session::AuthErrorFlow;

pub const INVALID_FORM_MESSAGE: &str = "Please correct the highlighted fields.";

/// Field name (as the form posts it) → messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMode<Id> {
    Add,
    Edit(Id),
}

/// Callbacks the owning page receives from a form.
pub trait FormListener<E: Resource> {
    fn on_saved(&mut self, _record: &E) {}
    fn on_close(&mut self) {}
    fn on_auth_error(&mut self) {}
    fn on_error(&mut self, _message: &str) {}
}

impl<E: Resource> FormListener<E> for () {}

/// Toasts results through a [`Notifier`] and, when given a flow, routes
/// auth failures to the session-expired handling.
pub struct NotifyingListener<'a> {
    notifier: &'a dyn Notifier,
    auth: Option<&'a AuthErrorFlow>,
    toast_errors: bool,
}

impl<'a> NotifyingListener<'a> {
    pub fn new(notifier: &'a dyn Notifier) -> Self {
        Self {
            notifier,
            auth: None,
            toast_errors: true,
        }
    }

    pub fn with_auth_flow(mut self, auth: &'a AuthErrorFlow) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Leaves failures to the caller, which shows them next to the form.
    pub fn inline_errors(mut self) -> Self {
        self.toast_errors = false;
        self
    }
}

impl<E: Resource> FormListener<E> for NotifyingListener<'_> {
    fn on_saved(&mut self, record: &E) {
        self.notifier.success(&format!("{} saved.", record.title()));
    }

    fn on_auth_error(&mut self) {
        if let Some(auth) = self.auth {
            auth.trigger();
        }
    }

    fn on_error(&mut self, message: &str) {
        if self.toast_errors {
            self.notifier.error(message);
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum SubmitOutcome<E> {
    Saved(E),
    /// Hidden form or a submit already running.
    Refused,
    Invalid,
    AuthExpired,
    Failed(String),
}

/// Modal state for one resource: visibility, mode, draft and errors.
pub struct ResourceForm<E: Resource> {
    visibility: Visibility,
    mode: FormMode<E::Id>,
    draft: E::Draft,
    field_errors: FieldErrors,
    state: SubmitState,
}

impl<E: Resource> Default for ResourceForm<E> {
    fn default() -> Self {
        Self {
            visibility: Visibility::Hidden,
            mode: FormMode::Add,
            draft: E::Draft::default(),
            field_errors: FieldErrors::new(),
            state: SubmitState::Idle,
        }
    }
}

impl<E: Resource> ResourceForm<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A visible form holding a draft posted by the browser.
    pub fn with_draft(mode: FormMode<E::Id>, draft: E::Draft) -> Self {
        Self {
            visibility: Visibility::Visible,
            mode,
            draft,
            ..Self::default()
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    pub fn mode(&self) -> FormMode<E::Id> {
        self.mode
    }

    pub fn draft(&self) -> &E::Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut E::Draft {
        &mut self.draft
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn submit_state(&self) -> &SubmitState {
        &self.state
    }

    pub fn open_add(&mut self) {
        *self = Self {
            visibility: Visibility::Visible,
            ..Self::default()
        };
    }

    /// Seeds the draft from `record` unless it is already open for the same
    /// record, in which case pending edits are kept.
    pub fn open_edit(&mut self, record: &E) {
        let id = record.id();
        if self.is_visible() && self.mode == FormMode::Edit(id) {
            return;
        }
        *self = Self::with_draft(FormMode::Edit(id), record.to_draft());
    }

    /// Hides the form and abandons the draft.
    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub async fn submit<G, L>(&mut self, gateway: &G, token: &str, listener: &mut L) -> SubmitOutcome<E>
    where
        G: ResourceGateway + ?Sized,
        L: FormListener<E> + ?Sized,
    {
        if !self.is_visible() || !self.state.begin() {
            return SubmitOutcome::Refused;
        }

        self.draft = E::normalize_draft(self.draft.clone());
        self.field_errors.clear();
        if let Err(errors) = self.draft.validate() {
            self.field_errors = field_errors(&errors);
            self.state.fail(INVALID_FORM_MESSAGE);
            return SubmitOutcome::Invalid;
        }

        let result = match self.mode {
            FormMode::Add => create_resource::<E, G>(gateway, token, &self.draft).await,
            FormMode::Edit(id) => update_resource::<E, G>(gateway, token, id, &self.draft).await,
        };

        match result {
            Ok(record) => {
                self.state.succeed();
                listener.on_saved(&record);
                self.close();
                listener.on_close();
                SubmitOutcome::Saved(record)
            }
            Err(err) if err.is_auth() => {
                self.state.fail(err.user_message());
                listener.on_auth_error();
                SubmitOutcome::AuthExpired
            }
            Err(BackendError::Conflict(message)) => match E::conflict_field() {
                Some(conflict) => {
                    log::warn!("{} conflict on `{}`: {message}", E::LABEL, conflict.field);
                    self.field_errors
                        .entry(conflict.field.to_string())
                        .or_default()
                        .push(conflict.message.to_string());
                    self.state.fail(conflict.message);
                    SubmitOutcome::Failed(conflict.message.to_string())
                }
                None => self.fail(BackendError::Conflict(message), listener),
            },
            Err(err) => self.fail(err, listener),
        }
    }

    fn fail<L>(&mut self, err: BackendError, listener: &mut L) -> SubmitOutcome<E>
    where
        L: FormListener<E> + ?Sized,
    {
        log::error!("Failed to save {}: {err}", E::LABEL);
        let message = err.user_message();
        self.state.fail(message.clone());
        listener.on_error(&message);
        SubmitOutcome::Failed(message)
    }
}

/// Flattens validator output, keyed by the camelCase name the form posts.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    for (field, list) in errors.field_errors() {
        let messages = list
            .iter()
            .map(|error| {
                error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", error.code))
            })
            .collect();
        out.insert(to_camel_case(field.as_ref()), messages);
    }
    out
}

fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for ch in name.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}
