use super::*;

/// Rows for one table plus its load status and cursor.
pub(in crate::tui) struct Dataset<T> {
    pub(in crate::tui) rows: Vec<T>,
    pub(in crate::tui) loading: bool,
    pub(in crate::tui) failed: bool,
    pub(in crate::tui) selected: usize,
}

impl<T> Default for Dataset<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            loading: false,
            failed: false,
            selected: 0,
        }
    }
}

impl<T> Dataset<T> {
    pub(in crate::tui) fn begin(&mut self) {
        self.loading = true;
    }

    pub(in crate::tui) fn fill(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.loading = false;
        self.failed = false;
        self.selected = clamp_index(self.selected, self.rows.len());
    }

    /// A failed load replaces the table with an error state.
    pub(in crate::tui) fn fail(&mut self) {
        self.rows.clear();
        self.loading = false;
        self.failed = true;
        self.selected = 0;
    }

    pub(in crate::tui) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(in crate::tui) fn selected_row(&self) -> Option<&T> {
        self.rows.get(self.selected)
    }

    pub(in crate::tui) fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.selected = 0;
            return;
        }
        let next = self.selected.saturating_add_signed(delta);
        self.selected = clamp_index(next, self.rows.len());
    }

    pub(in crate::tui) fn empty_text(&self, what: &str) -> String {
        if self.failed {
            "Load failed, please retry (r)".to_string()
        } else if self.loading {
            "Loading...".to_string()
        } else {
            format!("No {what}")
        }
    }
}
