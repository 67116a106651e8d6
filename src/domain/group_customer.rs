use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::resource::{
    ColumnDef, FieldConflict, FieldKind, FormField, Resource, clean_text,
};
use crate::domain::types::GroupCustomerId;

/// Parent group several customers roll up to.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupCustomer {
    pub id: GroupCustomerId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub customer_count: Option<u32>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupCustomerDraft {
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("code", "Code").text_filter(),
    ColumnDef::new("name", "Name").text_filter(),
    ColumnDef::new("customerCount", "Customers").range_filter(),
    ColumnDef::new("description", "Description").unsortable(),
];

const FORM_FIELDS: &[FormField] = &[
    FormField::new("code", "Code", FieldKind::Text).required(),
    FormField::new("name", "Name", FieldKind::Text).required(),
    FormField::new("description", "Description", FieldKind::TextArea),
];

impl Resource for GroupCustomer {
    type Id = GroupCustomerId;
    type Draft = GroupCustomerDraft;

    const ENDPOINT: &'static str = "group-customers";
    const LABEL: &'static str = "Group customer";
    const PLURAL: &'static str = "Group customers";

    fn id(&self) -> GroupCustomerId {
        self.id
    }

    fn to_draft(&self) -> GroupCustomerDraft {
        GroupCustomerDraft {
            code: self.code.clone(),
            name: self.name.clone(),
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
            "customerCount" => self.customer_count.map(|count| count.to_string()),
            "description" => self.description.clone(),
            _ => None,
        }
    }

    fn form_fields() -> &'static [FormField] {
        FORM_FIELDS
    }

    fn normalize_draft(draft: GroupCustomerDraft) -> GroupCustomerDraft {
        GroupCustomerDraft {
            code: clean_text(&draft.code).to_uppercase(),
            name: clean_text(&draft.name),
            description: clean_text(&draft.description),
        }
    }

    fn conflict_field() -> Option<FieldConflict> {
        Some(FieldConflict {
            field: "code",
            message: "A group customer with this code already exists",
        })
    }

    fn title(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }
}
