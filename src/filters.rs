//! Column filter inputs that commit on confirmation.
//!
//! Typing only edits a pending value; the table model is touched on Enter.
//! When the committed value changes behind the input's back (e.g. a "clear
//! filters" action) [`TextFilterInput::sync`] pulls it back in.

use crate::table::{RANGE_MAX_SUFFIX, RANGE_MIN_SUFFIX, TableModel};

/// Keys the filter inputs react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextFilterInput {
    column: String,
    pending: String,
    committed: String,
}

impl TextFilterInput {
    pub fn new(column: impl Into<String>, model: &TableModel) -> Self {
        let column = column.into();
        let committed = model.filter_value(&column).to_string();
        Self {
            column,
            pending: committed.clone(),
            committed,
        }
    }

    pub fn value(&self) -> &str {
        &self.pending
    }

    pub fn input(&mut self, text: &str) {
        self.pending = text.to_string();
    }

    /// Enter commits, Escape reverts to the committed value. Returns `true`
    /// when the model was updated.
    pub fn key(&mut self, key: Key, model: &mut TableModel) -> bool {
        match key {
            Key::Enter => {
                model.set_filter_value(&self.column, &self.pending);
                self.committed = model.filter_value(&self.column).to_string();
                true
            }
            Key::Escape => {
                self.pending = self.committed.clone();
                false
            }
            Key::Other => false,
        }
    }

    /// Resyncs the pending value if the committed value changed externally.
    pub fn sync(&mut self, model: &TableModel) {
        let current = model.filter_value(&self.column);
        if current != self.committed {
            self.committed = current.to_string();
            self.pending = self.committed.clone();
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

impl Bound {
    fn suffix(self) -> &'static str {
        match self {
            Bound::Min => RANGE_MIN_SUFFIX,
            Bound::Max => RANGE_MAX_SUFFIX,
        }
    }
}

/// `{min, max}` pair committed as `<column>_min` / `<column>_max`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeFilterInput {
    min: TextFilterInput,
    max: TextFilterInput,
    reset_page_on_commit: bool,
}

impl RangeFilterInput {
    pub fn new(column: &str, model: &TableModel) -> Self {
        Self {
            min: TextFilterInput::new(format!("{column}{}", Bound::Min.suffix()), model),
            max: TextFilterInput::new(format!("{column}{}", Bound::Max.suffix()), model),
            reset_page_on_commit: false,
        }
    }

    pub fn reset_page_on_commit(mut self, reset: bool) -> Self {
        self.reset_page_on_commit = reset;
        self
    }

    fn bound_mut(&mut self, bound: Bound) -> &mut TextFilterInput {
        match bound {
            Bound::Min => &mut self.min,
            Bound::Max => &mut self.max,
        }
    }

    pub fn value(&self, bound: Bound) -> &str {
        match bound {
            Bound::Min => self.min.value(),
            Bound::Max => self.max.value(),
        }
    }

    pub fn input(&mut self, bound: Bound, text: &str) {
        self.bound_mut(bound).input(text);
    }

    /// Commits only the bound that received the key.
    pub fn key(&mut self, bound: Bound, key: Key, model: &mut TableModel) -> bool {
        let reset = self.reset_page_on_commit;
        let committed = self.bound_mut(bound).key(key, model);
        if committed && reset {
            model.set_page(1);
        }
        committed
    }

    pub fn sync(&mut self, model: &TableModel) {
        self.min.sync(model);
        self.max.sync(model);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::invoice::Invoice;
    use crate::domain::resource::Resource;

    fn model() -> TableModel {
        TableModel::new(Invoice::columns())
    }

    #[test]
    fn keystrokes_do_not_commit() {
        let mut model = model();
        let mut input = TextFilterInput::new("status", &model);
        for prefix in ["p", "pa", "pai", "paid"] {
            input.input(prefix);
            assert!(!input.key(Key::Other, &mut model));
            assert_eq!(model.filter_value("status"), "");
        }
        assert!(input.key(Key::Enter, &mut model));
        assert_eq!(model.filter_value("status"), "paid");
    }

    #[test]
    fn external_reset_resyncs_the_input() {
        let mut model = model();
        let mut input = TextFilterInput::new("status", &model);
        input.input("foo");
        input.key(Key::Enter, &mut model);
        assert_eq!(input.value(), "foo");

        model.set_filter_value("status", "");
        input.sync(&model);
        assert_eq!(input.value(), "");
    }

    #[test]
    fn sync_keeps_uncommitted_text_when_nothing_changed() {
        let model = model();
        let mut input = TextFilterInput::new("status", &model);
        input.input("dra");
        input.sync(&model);
        assert_eq!(input.value(), "dra");
    }

    #[test]
    fn escape_reverts_pending_text() {
        let mut model = model();
        let mut input = TextFilterInput::new("status", &model);
        input.input("x");
        input.key(Key::Escape, &mut model);
        assert_eq!(input.value(), "");
    }

    #[test]
    fn range_bounds_commit_independently() {
        let mut model = model();
        model.set_page(4);
        let mut range = RangeFilterInput::new("totalAmount", &model).reset_page_on_commit(true);

        range.input(Bound::Min, "100");
        range.input(Bound::Max, "900");
        assert!(range.key(Bound::Min, Key::Enter, &mut model));

        assert_eq!(model.filter_value("totalAmount_min"), "100");
        assert_eq!(model.filter_value("totalAmount_max"), "");
        assert_eq!(model.page(), 1);
        assert_eq!(range.value(Bound::Max), "900");

        range.key(Bound::Max, Key::Enter, &mut model);
        assert_eq!(model.filter_value("totalAmount_max"), "900");
    }
}
