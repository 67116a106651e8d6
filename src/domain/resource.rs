//! Capability interface shared by every entity the console manages.
//!
//! A [`Resource`] knows its REST endpoint, how to seed and normalize its
//! editable draft, which columns its list table shows and how to render each
//! cell. Everything else in the console (list pages, forms, the search
//! session, CSV export) is written once against this trait.

use std::collections::HashSet;
use std::fmt::Display;
use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::pagination::ListPage;

/// Placeholder shown for optional values the backend did not send.
pub const MISSING_VALUE: &str = "N/A";
/// Placeholder shown for values that are present but blank.
pub const BLANK_VALUE: &str = "-";

/// How a column can be filtered from the list header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    None,
    Text,
    Range,
    Boolean,
}

/// Static description of a list column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub sortable: bool,
    pub filter: FilterKind,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str) -> Self {
        Self {
            key,
            header,
            sortable: true,
            filter: FilterKind::None,
        }
    }

    pub const fn text_filter(mut self) -> Self {
        self.filter = FilterKind::Text;
        self
    }

    pub const fn range_filter(mut self) -> Self {
        self.filter = FilterKind::Range;
        self
    }

    pub const fn boolean_filter(mut self) -> Self {
        self.filter = FilterKind::Boolean;
        self
    }

    pub const fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }
}

/// Input widget used for a form field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    TextArea,
    Email,
    Phone,
    Number,
    Date,
    Checkbox,
    Select,
}

/// Field schema rendered by the generic add/edit form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub options: &'static [(&'static str, &'static str)],
}

impl FormField {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            options: &[],
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn options(mut self, options: &'static [(&'static str, &'static str)]) -> Self {
        self.kind = FieldKind::Select;
        self.options = options;
        self
    }
}

/// Field-level message shown when the backend answers `409 Conflict`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldConflict {
    pub field: &'static str,
    pub message: &'static str,
}

/// One label/value line of the read-only view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ViewField {
    pub label: &'static str,
    pub value: String,
}

impl ViewField {
    /// Applies the `N/A` / `-` fallbacks.
    pub fn new(label: &'static str, value: Option<String>) -> Self {
        let value = match value {
            None => MISSING_VALUE.to_string(),
            Some(v) if v.trim().is_empty() => BLANK_VALUE.to_string(),
            Some(v) => v,
        };
        Self { label, value }
    }
}

pub trait Resource: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Id: Copy + Display + FromStr + PartialEq + Serialize + Send + Sync + 'static;
    type Draft: Default + Clone + Serialize + DeserializeOwned + Validate + Send + Sync + 'static;

    /// Path segment under `api/v1/`, also used for console routes.
    const ENDPOINT: &'static str;
    const LABEL: &'static str;
    const PLURAL: &'static str;

    fn id(&self) -> Self::Id;

    /// Seeds an edit draft from the fetched record.
    fn to_draft(&self) -> Self::Draft;

    fn columns() -> &'static [ColumnDef];

    /// Display text for a column, `None` when the value is absent.
    fn cell(&self, column: &str) -> Option<String>;

    fn form_fields() -> &'static [FormField];

    /// Trims and sanitizes user input before validation and submission.
    fn normalize_draft(draft: Self::Draft) -> Self::Draft {
        draft
    }

    fn conflict_field() -> Option<FieldConflict> {
        None
    }

    /// Converts the raw list response into a page of records.
    fn from_list_response(value: serde_json::Value) -> Result<ListPage<Self>, serde_json::Error> {
        ListPage::from_envelope(value)
    }

    fn title(&self) -> String {
        format!("{} #{}", Self::LABEL, self.id())
    }

    fn view_fields(&self) -> Vec<ViewField> {
        Self::columns()
            .iter()
            .map(|column| ViewField::new(column.header, self.cell(column.key)))
            .collect()
    }
}

/// Renders a money amount with two decimals.
pub fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}

pub fn format_flag(value: bool) -> String {
    String::from(if value { "Yes" } else { "No" })
}

/// Trims free text and strips any markup. The result is plain text:
/// `&`, `<` and `>` survive as typed and are escaped only when rendered.
pub fn clean_text(value: &str) -> String {
    let stripped = ammonia::Builder::empty()
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(value.trim())
        .to_string();
    unescape_text(&stripped).trim().to_string()
}

/// Reverses the entity escaping the sanitizer applies to text nodes.
fn unescape_text(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_field_applies_fallbacks() {
        assert_eq!(ViewField::new("Email", None).value, "N/A");
        assert_eq!(ViewField::new("Email", Some("  ".into())).value, "-");
        assert_eq!(ViewField::new("Email", Some("a@b.c".into())).value, "a@b.c");
    }

    #[test]
    fn clean_text_strips_markup() {
        assert_eq!(clean_text("  <script>x()</script>Hello "), "Hello");
        assert_eq!(clean_text("<b>Bold</b> &amp; co"), "Bold & co");
        assert_eq!(format_amount(12.5), "12.50");
        assert_eq!(format_flag(true), "Yes");
    }

    #[test]
    fn clean_text_keeps_ampersands_and_angle_brackets() {
        assert_eq!(clean_text("PT Maju & Jaya"), "PT Maju & Jaya");
        assert_eq!(clean_text(" A < B > C "), "A < B > C");
        assert_eq!(clean_text("literal &lt; stays"), "literal < stays");
        assert_eq!(clean_text("5 &amp;lt; 6"), "5 &lt; 6");
    }

    #[test]
    fn column_builders_compose() {
        let column = ColumnDef::new("amount", "Amount").range_filter().unsortable();
        assert_eq!(column.filter, FilterKind::Range);
        assert!(!column.sortable);
    }
}
