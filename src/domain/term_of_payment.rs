use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::resource::{ColumnDef, FieldKind, FormField, Resource, clean_text};
use crate::domain::types::TermOfPaymentId;
use crate::forms::fields;

/// Payment term granted to customers, e.g. "NET 30".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TermOfPayment {
    pub id: TermOfPaymentId,
    pub code: String,
    pub name: String,
    pub days: u32,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TermOfPaymentDraft {
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(deserialize_with = "fields::whole_number")]
    #[validate(range(max = 365, message = "Days must be between 0 and 365"))]
    pub days: u32,
    pub description: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("code", "Code").text_filter(),
    ColumnDef::new("name", "Name").text_filter(),
    ColumnDef::new("days", "Days").range_filter(),
    ColumnDef::new("description", "Description").unsortable(),
];

const FORM_FIELDS: &[FormField] = &[
    FormField::new("code", "Code", FieldKind::Text).required(),
    FormField::new("name", "Name", FieldKind::Text).required(),
    FormField::new("days", "Days", FieldKind::Number).required(),
    FormField::new("description", "Description", FieldKind::TextArea),
];

impl Resource for TermOfPayment {
    type Id = TermOfPaymentId;
    type Draft = TermOfPaymentDraft;

    const ENDPOINT: &'static str = "term-of-payments";
    const LABEL: &'static str = "Term of payment";
    const PLURAL: &'static str = "Terms of payment";

    fn id(&self) -> TermOfPaymentId {
        self.id
    }

    fn to_draft(&self) -> TermOfPaymentDraft {
        TermOfPaymentDraft {
            code: self.code.clone(),
            name: self.name.clone(),
            days: self.days,
            description: self.description.clone().unwrap_or_default(),
        }
    }

    fn columns() -> &'static [ColumnDef] {
        COLUMNS
    }

    fn cell(&self, column: &str) -> Option<String> {
        match column {
            "code" => Some(self.code.clone()),
            "name" => Some(self.name.clone()),
            "days" => Some(self.days.to_string()),
            "description" => self.description.clone(),
            _ => None,
        }
    }

    fn form_fields() -> &'static [FormField] {
        FORM_FIELDS
    }

    fn normalize_draft(draft: TermOfPaymentDraft) -> TermOfPaymentDraft {
        TermOfPaymentDraft {
            code: clean_text(&draft.code).to_uppercase(),
            name: clean_text(&draft.name),
            days: draft.days,
            description: clean_text(&draft.description),
        }
    }
}
