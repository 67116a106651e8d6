//! Table model behind every entity list.
//!
//! The model owns sort, filter and page state; rows stay with the caller.
//! [`TableModel::render`] is a pure function of that state and the rows, so
//! the same inputs always yield the same [`TableView`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::resource::{BLANK_VALUE, ColumnDef, FilterKind, Resource};

pub const SORT_BY_PARAM: &str = "sortBy";
pub const SORT_ORDER_PARAM: &str = "sortOrder";
pub const SEARCH_PARAM: &str = "q";
pub const PAGE_PARAM: &str = "page";
pub const LIMIT_PARAM: &str = "limit";
pub const RANGE_MIN_SUFFIX: &str = "_min";
pub const RANGE_MAX_SUFFIX: &str = "_max";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

/// Row class: none, fixed, or derived from the row.
pub enum ClassName<R> {
    None,
    Static(&'static str),
    Computed(fn(&R) -> String),
}

/// Cell class: none, fixed, or derived from the row and column.
pub enum CellClassName<R> {
    None,
    Static(&'static str),
    Computed(fn(&R, &ColumnDef) -> String),
}

pub struct TableStyles<R> {
    pub row: ClassName<R>,
    pub cell: CellClassName<R>,
}

impl<R> Default for TableStyles<R> {
    fn default() -> Self {
        Self {
            row: ClassName::None,
            cell: CellClassName::None,
        }
    }
}

impl<R> ClassName<R> {
    fn resolve(&self, row: &R) -> String {
        match self {
            ClassName::None => String::new(),
            ClassName::Static(class) => (*class).to_string(),
            ClassName::Computed(f) => f(row),
        }
    }
}

impl<R> CellClassName<R> {
    fn resolve(&self, row: &R, column: &ColumnDef) -> String {
        match self {
            CellClassName::None => String::new(),
            CellClassName::Static(class) => (*class).to_string(),
            CellClassName::Computed(f) => f(row, column),
        }
    }
}

/// What the table body should show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderState {
    Loading { message: String },
    Error { message: String },
    Ready,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    NoData,
    NoMatches,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HeaderCell {
    pub key: &'static str,
    pub label: &'static str,
    pub sortable: bool,
    pub sort: Option<SortDirection>,
    pub filter: FilterKind,
    /// Query string that applies the next sort state for this column.
    pub toggle_query: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub class: String,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub id: String,
    pub class: String,
    pub cells: Vec<CellView>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TableBody {
    Loading { message: String },
    Error { message: String },
    Empty { reason: EmptyReason, message: String },
    Rows { rows: Vec<RowView> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub headers: Vec<HeaderCell>,
    pub body: TableBody,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableModel {
    columns: &'static [ColumnDef],
    sort: Option<SortSpec>,
    filters: BTreeMap<String, String>,
    global_filter: Option<String>,
    page: u32,
}

impl TableModel {
    pub fn new(columns: &'static [ColumnDef]) -> Self {
        Self {
            columns,
            sort: None,
            filters: BTreeMap::new(),
            global_filter: None,
            page: 1,
        }
    }

    pub fn for_resource<E: Resource>() -> Self {
        Self::new(E::columns())
    }

    pub fn columns(&self) -> &'static [ColumnDef] {
        self.columns
    }

    fn column(&self, key: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|column| column.key == key)
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn sort_direction(&self, column: &str) -> Option<SortDirection> {
        self.sort
            .as_ref()
            .filter(|sort| sort.column == column)
            .map(|sort| sort.direction)
    }

    /// Cycles unsorted → ascending → descending → unsorted. Sorting a new
    /// column replaces the previous one. Returns `false` for columns that
    /// cannot be sorted.
    pub fn toggle_sort(&mut self, column: &str) -> bool {
        let Some(def) = self.column(column) else {
            return false;
        };
        if !def.sortable {
            return false;
        }

        self.sort = match self.sort_direction(column) {
            None => Some(SortSpec {
                column: column.to_string(),
                direction: SortDirection::Asc,
            }),
            Some(SortDirection::Asc) => Some(SortSpec {
                column: column.to_string(),
                direction: SortDirection::Desc,
            }),
            Some(SortDirection::Desc) => None,
        };
        true
    }

    /// Committed filter value, empty when unset.
    pub fn filter_value(&self, key: &str) -> &str {
        self.filters.get(key).map(String::as_str).unwrap_or("")
    }

    /// Commits a filter value; blank removes the filter. Unknown keys are
    /// ignored.
    pub fn set_filter_value(&mut self, key: &str, value: &str) {
        if !self.allowed_filter_keys().iter().any(|allowed| allowed == key) {
            log::debug!("Ignoring filter on unknown column `{key}`");
            return;
        }
        let value = value.trim();
        if value.is_empty() {
            self.filters.remove(key);
        } else {
            self.filters.insert(key.to_string(), value.to_string());
        }
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    pub fn global_filter(&self) -> Option<&str> {
        self.global_filter.as_deref()
    }

    pub fn set_global_filter(&mut self, value: &str) {
        let value = value.trim();
        self.global_filter = (!value.is_empty()).then(|| value.to_string());
    }

    pub fn has_active_filters(&self) -> bool {
        !self.filters.is_empty() || self.global_filter.is_some()
    }

    pub fn reset_filters(&mut self) {
        self.filters.clear();
        self.global_filter = None;
        self.page = 1;
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Filter parameter names accepted for the configured columns.
    pub fn allowed_filter_keys(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|column| match column.filter {
                FilterKind::None => vec![],
                FilterKind::Text | FilterKind::Boolean => vec![column.key.to_string()],
                FilterKind::Range => vec![
                    format!("{}{RANGE_MIN_SUFFIX}", column.key),
                    format!("{}{RANGE_MAX_SUFFIX}", column.key),
                ],
            })
            .collect()
    }

    /// Restores the model from URL query parameters.
    pub fn from_params(columns: &'static [ColumnDef], params: &BTreeMap<String, String>) -> Self {
        let mut model = Self::new(columns);

        for key in model.allowed_filter_keys() {
            if let Some(value) = params.get(&key) {
                model.set_filter_value(&key, value);
            }
        }

        if let Some(search) = params.get(SEARCH_PARAM) {
            model.set_global_filter(search);
        }

        let direction = params
            .get(SORT_ORDER_PARAM)
            .and_then(|d| SortDirection::parse(d))
            .unwrap_or(SortDirection::Asc);
        model.sort = params
            .get(SORT_BY_PARAM)
            .filter(|column| model.column(column).is_some_and(|c| c.sortable))
            .map(|column| SortSpec {
                column: column.clone(),
                direction,
            });

        if let Some(page) = params.get(PAGE_PARAM).and_then(|p| p.parse().ok()) {
            model.set_page(page);
        }

        model
    }

    /// Query pairs for filters, search and sort (page excluded).
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.global_filter {
            pairs.push((SEARCH_PARAM.to_string(), search.clone()));
        }
        pairs.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        if let Some(sort) = &self.sort {
            pairs.push((SORT_BY_PARAM.to_string(), sort.column.clone()));
            pairs.push((SORT_ORDER_PARAM.to_string(), sort.direction.as_str().to_string()));
        }
        pairs
    }

    fn toggle_query(&self, column: &str) -> String {
        let mut next = self.clone();
        next.toggle_sort(column);
        serde_html_form::to_string(next.to_query_pairs()).unwrap_or_default()
    }

    fn headers(&self) -> Vec<HeaderCell> {
        self.columns
            .iter()
            .map(|column| HeaderCell {
                key: column.key,
                label: column.header,
                sortable: column.sortable,
                sort: self.sort_direction(column.key),
                filter: column.filter,
                toggle_query: if column.sortable {
                    self.toggle_query(column.key)
                } else {
                    String::new()
                },
            })
            .collect()
    }

    pub fn render<R: Resource>(
        &self,
        state: &RenderState,
        rows: &[R],
        styles: &TableStyles<R>,
    ) -> TableView {
        let body = match state {
            RenderState::Loading { message } => TableBody::Loading {
                message: message.clone(),
            },
            RenderState::Error { message } => TableBody::Error {
                message: message.clone(),
            },
            RenderState::Ready if rows.is_empty() => {
                if self.has_active_filters() {
                    TableBody::Empty {
                        reason: EmptyReason::NoMatches,
                        message: format!(
                            "No {} match the active filters.",
                            R::PLURAL.to_lowercase()
                        ),
                    }
                } else {
                    TableBody::Empty {
                        reason: EmptyReason::NoData,
                        message: format!("No {} yet.", R::PLURAL.to_lowercase()),
                    }
                }
            }
            RenderState::Ready => TableBody::Rows {
                rows: rows
                    .iter()
                    .map(|row| RowView {
                        id: row.id().to_string(),
                        class: styles.row.resolve(row),
                        cells: self
                            .columns
                            .iter()
                            .map(|column| CellView {
                                class: styles.cell.resolve(row, column),
                                text: row
                                    .cell(column.key)
                                    .filter(|text| !text.trim().is_empty())
                                    .unwrap_or_else(|| BLANK_VALUE.to_string()),
                            })
                            .collect(),
                    })
                    .collect(),
            },
        };

        TableView {
            headers: self.headers(),
            body,
        }
    }
}
