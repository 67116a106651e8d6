use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::resource::{
    ColumnDef, FieldKind, FormField, Resource, clean_text, format_amount, format_flag,
};
use crate::domain::types::{BankMutationId, DATE_FORMAT, InvoiceId, validate_date};
use crate::forms::fields;

pub const MUTATION_TYPES: &[(&str, &str)] = &[("credit", "Credit"), ("debit", "Debit")];

/// Bank statement line, reconciled by linking it to an invoice.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankMutation {
    pub id: BankMutationId,
    pub bank_account: String,
    pub transaction_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: f64,
    pub mutation_type: String,
    #[serde(default)]
    pub reconciled: bool,
    #[serde(default)]
    pub invoice_id: Option<InvoiceId>,
    #[serde(default)]
    pub invoice_number: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BankMutationDraft {
    #[validate(length(min = 1, message = "Bank account is required"))]
    pub bank_account: String,
    #[validate(custom(function = "validate_date", message = "Date must be YYYY-MM-DD"))]
    pub transaction_date: String,
    pub description: String,
    #[serde(deserialize_with = "fields::amount")]
    pub amount: f64,
    #[validate(length(min = 1, message = "Type is required"))]
    pub mutation_type: String,
    #[serde(deserialize_with = "fields::optional_id")]
    pub invoice_id: Option<i32>,
    #[serde(deserialize_with = "fields::checkbox")]
    pub reconciled: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("transactionDate", "Date").range_filter(),
    ColumnDef::new("bankAccount", "Account").text_filter(),
    ColumnDef::new("description", "Description").text_filter(),
    ColumnDef::new("amount", "Amount").range_filter(),
    ColumnDef::new("mutationType", "Type").text_filter(),
    ColumnDef::new("invoiceNumber", "Invoice"),
    ColumnDef::new("reconciled", "Reconciled").boolean_filter(),
];

const FORM_FIELDS: &[FormField] = &[
    FormField::new("bankAccount", "Bank account", FieldKind::Text).required(),
    FormField::new("transactionDate", "Transaction date", FieldKind::Date).required(),
    FormField::new("description", "Description", FieldKind::TextArea),
    FormField::new("amount", "Amount", FieldKind::Number).required(),
    FormField::new("mutationType", "Type", FieldKind::Select)
        .required()
        .options(MUTATION_TYPES),
    FormField::new("invoiceId", "Matched invoice id", FieldKind::Number),
    FormField::new("reconciled", "Reconciled", FieldKind::Checkbox),
];

impl Resource for BankMutation {
    type Id = BankMutationId;
    type Draft = BankMutationDraft;

    const ENDPOINT: &'static str = "bank-mutations";
    const LABEL: &'static str = "Bank mutation";
    const PLURAL: &'static str = "Bank mutations";

    fn id(&self) -> BankMutationId {
        self.id
    }

    fn to_draft(&self) -> BankMutationDraft {
        BankMutationDraft {
            bank_account: self.bank_account.clone(),
            transaction_date: self.transaction_date.format(DATE_FORMAT).to_string(),
            description: self.description.clone().unwrap_or_default(),
            amount: self.amount,
            mutation_type: self.mutation_type.clone(),
            invoice_id: self.invoice_id.map(i32::from),
            reconciled: self.reconciled,
        }
    }

    fn columns() -> &'static [ColumnDef] {
        COLUMNS
    }

    fn cell(&self, column: &str) -> Option<String> {
        match column {
            "transactionDate" => Some(self.transaction_date.format(DATE_FORMAT).to_string()),
            "bankAccount" => Some(self.bank_account.clone()),
            "description" => self.description.clone(),
            "amount" => Some(format_amount(self.amount)),
            "mutationType" => Some(self.mutation_type.clone()),
            "invoiceNumber" => self.invoice_number.clone(),
            "reconciled" => Some(format_flag(self.reconciled)),
            _ => None,
        }
    }

    fn form_fields() -> &'static [FormField] {
        FORM_FIELDS
    }

    fn normalize_draft(draft: BankMutationDraft) -> BankMutationDraft {
        // A mutation only counts as reconciled once it is matched to an invoice.
        let reconciled = draft.reconciled && draft.invoice_id.is_some();
        BankMutationDraft {
            bank_account: draft.bank_account.trim().to_string(),
            transaction_date: draft.transaction_date.trim().to_string(),
            description: clean_text(&draft.description),
            mutation_type: draft.mutation_type.trim().to_lowercase(),
            reconciled,
            ..draft
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_mutation_cannot_be_reconciled() {
        let draft = BankMutation::normalize_draft(BankMutationDraft {
            bank_account: "0012-3".into(),
            transaction_date: "2024-05-01".into(),
            amount: 150.0,
            mutation_type: "CREDIT".into(),
            reconciled: true,
            ..BankMutationDraft::default()
        });
        assert!(!draft.reconciled);
        assert_eq!(draft.mutation_type, "credit");
        assert!(draft.validate().is_ok());
    }
}
