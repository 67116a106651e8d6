use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::resource::{
    ColumnDef, FieldKind, FormField, Resource, clean_text, format_amount,
};
use crate::domain::types::{
    CustomerId, DATE_FORMAT, InvoiceId, validate_date, validate_optional_date,
};
use crate::forms::fields;

pub const INVOICE_STATUSES: &[(&str, &str)] = &[
    ("draft", "Draft"),
    ("issued", "Issued"),
    ("paid", "Paid"),
    ("cancelled", "Cancelled"),
];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub customer_id: CustomerId,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub invoice_date: NaiveDate,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub total_amount: f64,
    #[serde(default)]
    pub paid_amount: Option<f64>,
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceDraft {
    #[validate(length(min = 1, message = "Invoice number is required"))]
    pub invoice_number: String,
    #[serde(deserialize_with = "fields::optional_id")]
    #[validate(required(message = "Customer is required"))]
    pub customer_id: Option<i32>,
    #[validate(custom(function = "validate_date", message = "Invoice date must be YYYY-MM-DD"))]
    pub invoice_date: String,
    #[validate(custom(function = "validate_optional_date", message = "Due date must be YYYY-MM-DD"))]
    pub due_date: String,
    #[serde(deserialize_with = "fields::amount")]
    #[validate(range(min = 0.0, message = "Amount cannot be negative"))]
    pub total_amount: f64,
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
    pub notes: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("invoiceNumber", "Invoice no.").text_filter(),
    ColumnDef::new("customerName", "Customer").text_filter(),
    ColumnDef::new("invoiceDate", "Date").range_filter(),
    ColumnDef::new("dueDate", "Due"),
    ColumnDef::new("totalAmount", "Total").range_filter(),
    ColumnDef::new("paidAmount", "Paid"),
    ColumnDef::new("status", "Status").text_filter(),
    ColumnDef::new("notes", "Notes").unsortable(),
];

const FORM_FIELDS: &[FormField] = &[
    FormField::new("invoiceNumber", "Invoice number", FieldKind::Text).required(),
    FormField::new("customerId", "Customer id", FieldKind::Number).required(),
    FormField::new("invoiceDate", "Invoice date", FieldKind::Date).required(),
    FormField::new("dueDate", "Due date", FieldKind::Date),
    FormField::new("totalAmount", "Total amount", FieldKind::Number).required(),
    FormField::new("status", "Status", FieldKind::Select)
        .required()
        .options(INVOICE_STATUSES),
    FormField::new("notes", "Notes", FieldKind::TextArea),
];

impl Resource for Invoice {
    type Id = InvoiceId;
    type Draft = InvoiceDraft;

    const ENDPOINT: &'static str = "invoices";
    const LABEL: &'static str = "Invoice";
    const PLURAL: &'static str = "Invoices";

    fn id(&self) -> InvoiceId {
        self.id
    }

    fn to_draft(&self) -> InvoiceDraft {
        InvoiceDraft {
            invoice_number: self.invoice_number.clone(),
            customer_id: Some(self.customer_id.get()),
            invoice_date: self.invoice_date.format(DATE_FORMAT).to_string(),
            due_date: self
                .due_date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            total_amount: self.total_amount,
            status: self.status.clone(),
            notes: self.notes.clone().unwrap_or_default(),
        }
    }

    fn columns() -> &'static [ColumnDef] {
        COLUMNS
    }

    fn cell(&self, column: &str) -> Option<String> {
        match column {
            "invoiceNumber" => Some(self.invoice_number.clone()),
            "customerName" => self.customer_name.clone(),
            "invoiceDate" => Some(self.invoice_date.format(DATE_FORMAT).to_string()),
            "dueDate" => self.due_date.map(|d| d.format(DATE_FORMAT).to_string()),
            "totalAmount" => Some(format_amount(self.total_amount)),
            "paidAmount" => self.paid_amount.map(format_amount),
            "status" => Some(self.status.clone()),
            "notes" => self.notes.clone(),
            _ => None,
        }
    }

    fn form_fields() -> &'static [FormField] {
        FORM_FIELDS
    }

    fn normalize_draft(draft: InvoiceDraft) -> InvoiceDraft {
        InvoiceDraft {
            invoice_number: clean_text(&draft.invoice_number).to_uppercase(),
            invoice_date: draft.invoice_date.trim().to_string(),
            due_date: draft.due_date.trim().to_string(),
            status: draft.status.trim().to_lowercase(),
            notes: clean_text(&draft.notes),
            ..draft
        }
    }

    fn title(&self) -> String {
        format!("Invoice {}", self.invoice_number)
    }
}
