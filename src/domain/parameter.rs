use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::resource::{ColumnDef, FieldKind, FormField, Resource, clean_text};
use crate::domain::types::ParameterId;

/// Master parameter: a named configuration value kept by the backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub id: ParameterId,
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ParameterDraft {
    #[validate(length(min = 1, message = "Key is required"))]
    pub key: String,
    pub value: String,
    pub description: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("key", "Key").text_filter(),
    ColumnDef::new("value", "Value").text_filter(),
    ColumnDef::new("description", "Description").unsortable(),
];

const FORM_FIELDS: &[FormField] = &[
    FormField::new("key", "Key", FieldKind::Text).required(),
    FormField::new("value", "Value", FieldKind::Text),
    FormField::new("description", "Description", FieldKind::TextArea),
];

impl Resource for Parameter {
    type Id = ParameterId;
    type Draft = ParameterDraft;

    const ENDPOINT: &'static str = "parameters";
    const LABEL: &'static str = "Parameter";
    const PLURAL: &'static str = "Master parameters";

    fn id(&self) -> ParameterId {
        self.id
    }

    fn to_draft(&self) -> ParameterDraft {
        ParameterDraft {
            key: self.key.clone(),
            value: self.value.clone(),
            description: self.description.clone().unwrap_or_default(),
        }
    }

    fn columns() -> &'static [ColumnDef] {
        COLUMNS
    }

    fn cell(&self, column: &str) -> Option<String> {
        match column {
            "key" => Some(self.key.clone()),
            "value" => Some(self.value.clone()),
            "description" => self.description.clone(),
            _ => None,
        }
    }

    fn form_fields() -> &'static [FormField] {
        FORM_FIELDS
    }

    fn normalize_draft(draft: ParameterDraft) -> ParameterDraft {
        ParameterDraft {
            key: draft.key.trim().to_string(),
            value: draft.value.trim().to_string(),
            description: clean_text(&draft.description),
        }
    }

    fn title(&self) -> String {
        self.key.clone()
    }
}
