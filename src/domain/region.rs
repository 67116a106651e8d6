use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::resource::{ColumnDef, FieldKind, FormField, Resource, clean_text};
use crate::domain::types::RegionId;

/// Sales/delivery region customers are assigned to.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: RegionId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionDraft {
    #[validate(length(min = 1, max = 16, message = "Code must be 1-16 characters"))]
    pub code: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("code", "Code").text_filter(),
    ColumnDef::new("name", "Name").text_filter(),
    ColumnDef::new("description", "Description").unsortable(),
];

const FORM_FIELDS: &[FormField] = &[
    FormField::new("code", "Code", FieldKind::Text).required(),
    FormField::new("name", "Name", FieldKind::Text).required(),
    FormField::new("description", "Description", FieldKind::TextArea),
];

impl Resource for Region {
    type Id = RegionId;
    type Draft = RegionDraft;

    const ENDPOINT: &'static str = "regions";
    const LABEL: &'static str = "Region";
    const PLURAL: &'static str = "Regions";

    fn id(&self) -> RegionId {
        self.id
    }

    fn to_draft(&self) -> RegionDraft {
        RegionDraft {
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
            "description" => self.description.clone(),
            _ => None,
        }
    }

    fn form_fields() -> &'static [FormField] {
        FORM_FIELDS
    }

    fn normalize_draft(draft: RegionDraft) -> RegionDraft {
        RegionDraft {
            code: clean_text(&draft.code).to_uppercase(),
            name: clean_text(&draft.name),
            description: clean_text(&draft.description),
        }
    }
}
