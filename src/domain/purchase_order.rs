use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::resource::{
    ColumnDef, FieldKind, FormField, Resource, clean_text, format_amount,
};
use crate::domain::types::{
    DATE_FORMAT, PurchaseOrderId, SupplierId, validate_date, validate_optional_date,
};
use crate::forms::fields;

pub const PURCHASE_ORDER_STATUSES: &[(&str, &str)] = &[
    ("open", "Open"),
    ("approved", "Approved"),
    ("received", "Received"),
    ("closed", "Closed"),
    ("cancelled", "Cancelled"),
];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub id: PurchaseOrderId,
    pub po_number: String,
    pub supplier_id: SupplierId,
    #[serde(default)]
    pub supplier_name: Option<String>,
    pub order_date: NaiveDate,
    #[serde(default)]
    pub expected_date: Option<NaiveDate>,
    pub total_amount: f64,
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseOrderDraft {
    #[validate(length(min = 1, message = "PO number is required"))]
    pub po_number: String,
    #[serde(deserialize_with = "fields::optional_id")]
    #[validate(required(message = "Supplier is required"))]
    pub supplier_id: Option<i32>,
    #[validate(custom(function = "validate_date", message = "Order date must be YYYY-MM-DD"))]
    pub order_date: String,
    #[validate(custom(
        function = "validate_optional_date",
        message = "Expected date must be YYYY-MM-DD"
    ))]
    pub expected_date: String,
    #[serde(deserialize_with = "fields::amount")]
    #[validate(range(min = 0.0, message = "Amount cannot be negative"))]
    pub total_amount: f64,
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
    pub notes: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("poNumber", "PO no.").text_filter(),
    ColumnDef::new("supplierName", "Supplier").text_filter(),
    ColumnDef::new("orderDate", "Ordered").range_filter(),
    ColumnDef::new("expectedDate", "Expected"),
    ColumnDef::new("totalAmount", "Total").range_filter(),
    ColumnDef::new("status", "Status").text_filter(),
];

const FORM_FIELDS: &[FormField] = &[
    FormField::new("poNumber", "PO number", FieldKind::Text).required(),
    FormField::new("supplierId", "Supplier id", FieldKind::Number).required(),
    FormField::new("orderDate", "Order date", FieldKind::Date).required(),
    FormField::new("expectedDate", "Expected date", FieldKind::Date),
    FormField::new("totalAmount", "Total amount", FieldKind::Number).required(),
    FormField::new("status", "Status", FieldKind::Select)
        .required()
        .options(PURCHASE_ORDER_STATUSES),
    FormField::new("notes", "Notes", FieldKind::TextArea),
];

impl Resource for PurchaseOrder {
    type Id = PurchaseOrderId;
    type Draft = PurchaseOrderDraft;

    const ENDPOINT: &'static str = "purchase-orders";
    const LABEL: &'static str = "Purchase order";
    const PLURAL: &'static str = "Purchase orders";

    fn id(&self) -> PurchaseOrderId {
        self.id
    }

    fn to_draft(&self) -> PurchaseOrderDraft {
        PurchaseOrderDraft {
            po_number: self.po_number.clone(),
            supplier_id: Some(self.supplier_id.get()),
            order_date: self.order_date.format(DATE_FORMAT).to_string(),
            expected_date: self
                .expected_date
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
            "poNumber" => Some(self.po_number.clone()),
            "supplierName" => self.supplier_name.clone(),
            "orderDate" => Some(self.order_date.format(DATE_FORMAT).to_string()),
            "expectedDate" => self.expected_date.map(|d| d.format(DATE_FORMAT).to_string()),
            "totalAmount" => Some(format_amount(self.total_amount)),
            "status" => Some(self.status.clone()),
            "notes" => self.notes.clone(),
            _ => None,
        }
    }

    fn form_fields() -> &'static [FormField] {
        FORM_FIELDS
    }

    fn normalize_draft(draft: PurchaseOrderDraft) -> PurchaseOrderDraft {
        PurchaseOrderDraft {
            po_number: clean_text(&draft.po_number).to_uppercase(),
            order_date: draft.order_date.trim().to_string(),
            expected_date: draft.expected_date.trim().to_string(),
            status: draft.status.trim().to_lowercase(),
            notes: clean_text(&draft.notes),
            ..draft
        }
    }

    fn title(&self) -> String {
        format!("Purchase order {}", self.po_number)
    }
}
