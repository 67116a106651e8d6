use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::resource::{
    ColumnDef, FieldKind, FormField, Resource, clean_text, format_amount, format_flag,
};
use crate::domain::types::{
    CustomerId, GroupCustomerId, RegionId, TermOfPaymentId, normalize_optional_phone,
    validate_optional_email, validate_optional_phone,
};
use crate::forms::fields;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub group_customer_id: Option<GroupCustomerId>,
    #[serde(default)]
    pub group_customer_name: Option<String>,
    #[serde(default)]
    pub region_id: Option<RegionId>,
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default)]
    pub term_of_payment_id: Option<TermOfPaymentId>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub credit_limit: Option<f64>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerDraft {
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(deserialize_with = "fields::optional_id")]
    pub group_customer_id: Option<i32>,
    #[serde(deserialize_with = "fields::optional_id")]
    pub region_id: Option<i32>,
    #[serde(deserialize_with = "fields::optional_id")]
    pub term_of_payment_id: Option<i32>,
    pub address: String,
    #[validate(custom(function = "validate_optional_phone", message = "Invalid phone number"))]
    pub phone: String,
    #[validate(custom(function = "validate_optional_email", message = "Invalid email address"))]
    pub email: String,
    #[serde(deserialize_with = "fields::amount")]
    #[validate(range(min = 0.0, message = "Credit limit cannot be negative"))]
    pub credit_limit: f64,
    #[serde(deserialize_with = "fields::checkbox")]
    pub is_active: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("code", "Code").text_filter(),
    ColumnDef::new("name", "Name").text_filter(),
    ColumnDef::new("groupCustomerName", "Group").text_filter(),
    ColumnDef::new("regionName", "Region").text_filter(),
    ColumnDef::new("phone", "Phone").unsortable(),
    ColumnDef::new("email", "Email"),
    ColumnDef::new("creditLimit", "Credit limit").range_filter(),
    ColumnDef::new("isActive", "Active").boolean_filter(),
];

const FORM_FIELDS: &[FormField] = &[
    FormField::new("code", "Code", FieldKind::Text).required(),
    FormField::new("name", "Name", FieldKind::Text).required(),
    FormField::new("groupCustomerId", "Group customer id", FieldKind::Number),
    FormField::new("regionId", "Region id", FieldKind::Number),
    FormField::new("termOfPaymentId", "Term of payment id", FieldKind::Number),
    FormField::new("address", "Address", FieldKind::TextArea),
    FormField::new("phone", "Phone", FieldKind::Phone),
    FormField::new("email", "Email", FieldKind::Email),
    FormField::new("creditLimit", "Credit limit", FieldKind::Number),
    FormField::new("isActive", "Active", FieldKind::Checkbox),
];

impl Resource for Customer {
    type Id = CustomerId;
    type Draft = CustomerDraft;

    const ENDPOINT: &'static str = "customers";
    const LABEL: &'static str = "Customer";
    const PLURAL: &'static str = "Customers";

    fn id(&self) -> CustomerId {
        self.id
    }

    fn to_draft(&self) -> CustomerDraft {
        CustomerDraft {
            code: self.code.clone(),
            name: self.name.clone(),
            group_customer_id: self.group_customer_id.map(i32::from),
            region_id: self.region_id.map(i32::from),
            term_of_payment_id: self.term_of_payment_id.map(i32::from),
            address: self.address.clone().unwrap_or_default(),
            phone: self.phone.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            credit_limit: self.credit_limit.unwrap_or_default(),
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
            "groupCustomerName" => self.group_customer_name.clone(),
            "regionName" => self.region_name.clone(),
            "phone" => self.phone.clone(),
            "email" => self.email.clone(),
            "creditLimit" => self.credit_limit.map(format_amount),
            "isActive" => Some(format_flag(self.is_active)),
            _ => None,
        }
    }

    fn form_fields() -> &'static [FormField] {
        FORM_FIELDS
    }

    fn normalize_draft(draft: CustomerDraft) -> CustomerDraft {
        CustomerDraft {
            code: clean_text(&draft.code).to_uppercase(),
            name: clean_text(&draft.name),
            address: clean_text(&draft.address),
            phone: normalize_optional_phone(&draft.phone),
            email: draft.email.trim().to_lowercase(),
            ..draft
        }
    }

    fn title(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }
}
