use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::resource::{
    ColumnDef, FieldKind, FormField, Resource, clean_text, format_flag,
};
use crate::domain::types::{
    CompanyId, normalize_optional_phone, validate_optional_email, validate_optional_phone,
};
use crate::forms::fields;

/// Legal entity operating in the back-office (issuer of invoices and orders).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: CompanyId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub tax_number: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

/// Editable fields of a [`Company`].
#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyDraft {
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub address: String,
    #[validate(custom(function = "validate_optional_phone", message = "Invalid phone number"))]
    pub phone: String,
    #[validate(custom(function = "validate_optional_email", message = "Invalid email address"))]
    pub email: String,
    pub tax_number: String,
    #[serde(deserialize_with = "fields::checkbox")]
    pub is_active: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("code", "Code").text_filter(),
    ColumnDef::new("name", "Name").text_filter(),
    ColumnDef::new("address", "Address").unsortable(),
    ColumnDef::new("phone", "Phone").unsortable(),
    ColumnDef::new("email", "Email").text_filter(),
    ColumnDef::new("taxNumber", "Tax number"),
    ColumnDef::new("isActive", "Active").boolean_filter(),
];

const FORM_FIELDS: &[FormField] = &[
    FormField::new("code", "Code", FieldKind::Text).required(),
    FormField::new("name", "Name", FieldKind::Text).required(),
    FormField::new("address", "Address", FieldKind::TextArea),
    FormField::new("phone", "Phone", FieldKind::Phone),
    FormField::new("email", "Email", FieldKind::Email),
    FormField::new("taxNumber", "Tax number", FieldKind::Text),
    FormField::new("isActive", "Active", FieldKind::Checkbox),
];

impl Resource for Company {
    type Id = CompanyId;
    type Draft = CompanyDraft;

    const ENDPOINT: &'static str = "companies";
    const LABEL: &'static str = "Company";
    const PLURAL: &'static str = "Companies";

    fn id(&self) -> CompanyId {
        self.id
    }

    fn to_draft(&self) -> CompanyDraft {
        CompanyDraft {
            code: self.code.clone(),
            name: self.name.clone(),
            address: self.address.clone().unwrap_or_default(),
            phone: self.phone.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            tax_number: self.tax_number.clone().unwrap_or_default(),
            is_active: self.is_active,
        }
    }

    fn columns() -> &'static [ColumnDef] {
        COLUMNS
    }

    fn cell(&self, column: &str) -> Option<String> {
        match column {
            "code" => Some(self.code.clone()),
            "name" => Some(self.name.clone()),
            "address" => self.address.clone(),
            "phone" => self.phone.clone(),
            "email" => self.email.clone(),
            "taxNumber" => self.tax_number.clone(),
            "isActive" => Some(format_flag(self.is_active)),
            _ => None,
        }
    }

    fn form_fields() -> &'static [FormField] {
        FORM_FIELDS
    }

    fn normalize_draft(draft: CompanyDraft) -> CompanyDraft {
        CompanyDraft {
            code: clean_text(&draft.code).to_uppercase(),
            name: clean_text(&draft.name),
            address: clean_text(&draft.address),
            phone: normalize_optional_phone(&draft.phone),
            email: draft.email.trim().to_lowercase(),
            tax_number: clean_text(&draft.tax_number),
            is_active: draft.is_active,
        }
    }

    fn title(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }
}
