use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::resource::{
    ColumnDef, FieldKind, FormField, Resource, clean_text, format_flag,
};
use crate::domain::types::{
    SupplierId, normalize_optional_phone, validate_optional_email, validate_optional_phone,
};
use crate::forms::fields;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: SupplierId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SupplierDraft {
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub contact_person: String,
    #[validate(custom(function = "validate_optional_phone", message = "Invalid phone number"))]
    pub phone: String,
    #[validate(custom(function = "validate_optional_email", message = "Invalid email address"))]
    pub email: String,
    pub address: String,
    #[serde(deserialize_with = "fields::checkbox")]
    pub is_active: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("code", "Code").text_filter(),
    ColumnDef::new("name", "Name").text_filter(),
    ColumnDef::new("contactPerson", "Contact person").text_filter(),
    ColumnDef::new("phone", "Phone").unsortable(),
    ColumnDef::new("email", "Email"),
    ColumnDef::new("isActive", "Active").boolean_filter(),
];

const FORM_FIELDS: &[FormField] = &[
    FormField::new("code", "Code", FieldKind::Text).required(),
    FormField::new("name", "Name", FieldKind::Text).required(),
    FormField::new("contactPerson", "Contact person", FieldKind::Text),
    FormField::new("phone", "Phone", FieldKind::Phone),
    FormField::new("email", "Email", FieldKind::Email),
    FormField::new("address", "Address", FieldKind::TextArea),
    FormField::new("isActive", "Active", FieldKind::Checkbox),
];

impl Resource for Supplier {
    type Id = SupplierId;
    type Draft = SupplierDraft;

    const ENDPOINT: &'static str = "suppliers";
    const LABEL: &'static str = "Supplier";
    const PLURAL: &'static str = "Suppliers";

    fn id(&self) -> SupplierId {
        self.id
    }

    fn to_draft(&self) -> SupplierDraft {
        SupplierDraft {
            code: self.code.clone(),
            name: self.name.clone(),
            contact_person: self.contact_person.clone().unwrap_or_default(),
            phone: self.phone.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            address: self.address.clone().unwrap_or_default(),
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
            "contactPerson" => self.contact_person.clone(),
            "phone" => self.phone.clone(),
            "email" => self.email.clone(),
            "address" => self.address.clone(),
            "isActive" => Some(format_flag(self.is_active)),
            _ => None,
        }
    }

    fn form_fields() -> &'static [FormField] {
        FORM_FIELDS
    }

    fn normalize_draft(draft: SupplierDraft) -> SupplierDraft {
        SupplierDraft {
            code: clean_text(&draft.code).to_uppercase(),
            name: clean_text(&draft.name),
            contact_person: clean_text(&draft.contact_person),
            phone: normalize_optional_phone(&draft.phone),
            email: draft.email.trim().to_lowercase(),
            address: clean_text(&draft.address),
            is_active: draft.is_active,
        }
    }

    fn title(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }
}
