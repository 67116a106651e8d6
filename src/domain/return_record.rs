use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::resource::{
    ColumnDef, FieldKind, FormField, Resource, clean_text, format_amount,
};
use crate::domain::types::{DATE_FORMAT, InvoiceId, ReturnId, validate_date};
use crate::forms::fields;

pub const RETURN_STATUSES: &[(&str, &str)] = &[
    ("pending", "Pending"),
    ("approved", "Approved"),
    ("rejected", "Rejected"),
    ("credited", "Credited"),
];

/// Goods returned against an invoice.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRecord {
    pub id: ReturnId,
    pub return_number: String,
    #[serde(default)]
    pub invoice_id: Option<InvoiceId>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub return_date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
    pub total_amount: f64,
    pub status: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReturnDraft {
    #[validate(length(min = 1, message = "Return number is required"))]
    pub return_number: String,
    #[serde(deserialize_with = "fields::optional_id")]
    #[validate(required(message = "Invoice is required"))]
    pub invoice_id: Option<i32>,
    #[validate(custom(function = "validate_date", message = "Return date must be YYYY-MM-DD"))]
    pub return_date: String,
    pub reason: String,
    #[serde(deserialize_with = "fields::amount")]
    #[validate(range(min = 0.0, message = "Amount cannot be negative"))]
    pub total_amount: f64,
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("returnNumber", "Return no.").text_filter(),
    ColumnDef::new("invoiceNumber", "Invoice").text_filter(),
    ColumnDef::new("customerName", "Customer").text_filter(),
    ColumnDef::new("returnDate", "Date").range_filter(),
    ColumnDef::new("totalAmount", "Total").range_filter(),
    ColumnDef::new("status", "Status").text_filter(),
    ColumnDef::new("reason", "Reason").unsortable(),
];

const FORM_FIELDS: &[FormField] = &[
    FormField::new("returnNumber", "Return number", FieldKind::Text).required(),
    FormField::new("invoiceId", "Invoice id", FieldKind::Number).required(),
    FormField::new("returnDate", "Return date", FieldKind::Date).required(),
    FormField::new("reason", "Reason", FieldKind::TextArea),
    FormField::new("totalAmount", "Total amount", FieldKind::Number).required(),
    FormField::new("status", "Status", FieldKind::Select)
        .required()
        .options(RETURN_STATUSES),
];

impl Resource for ReturnRecord {
    type Id = ReturnId;
    type Draft = ReturnDraft;

    const ENDPOINT: &'static str = "returns";
    const LABEL: &'static str = "Return";
    const PLURAL: &'static str = "Returns";

    fn id(&self) -> ReturnId {
        self.id
    }

    fn to_draft(&self) -> ReturnDraft {
        ReturnDraft {
            return_number: self.return_number.clone(),
            invoice_id: self.invoice_id.map(i32::from),
            return_date: self.return_date.format(DATE_FORMAT).to_string(),
            reason: self.reason.clone().unwrap_or_default(),
            total_amount: self.total_amount,
            status: self.status.clone(),
        }
    }

    fn columns() -> &'static [ColumnDef] {
        COLUMNS
    }

    fn cell(&self, column: &str) -> Option<String> {
        match column {
            "returnNumber" => Some(self.return_number.clone()),
            "invoiceNumber" => self.invoice_number.clone(),
            "customerName" => self.customer_name.clone(),
            "returnDate" => Some(self.return_date.format(DATE_FORMAT).to_string()),
            "totalAmount" => Some(format_amount(self.total_amount)),
            "status" => Some(self.status.clone()),
            "reason" => self.reason.clone(),
            _ => None,
        }
    }

    fn form_fields() -> &'static [FormField] {
        FORM_FIELDS
    }

    fn normalize_draft(draft: ReturnDraft) -> ReturnDraft {
        ReturnDraft {
            return_number: clean_text(&draft.return_number).to_uppercase(),
            return_date: draft.return_date.trim().to_string(),
            reason: clean_text(&draft.reason),
            status: draft.status.trim().to_lowercase(),
            ..draft
        }
    }

    fn title(&self) -> String {
        format!("Return {}", self.return_number)
    }
}
