//! Shared application state and its mutation methods.
//!
//! Runtime-agnostic: fetching and file output live in the runtimes, which
//! hand results back through [`AppState::apply_dataset`] and
//! [`AppState::set_status`].

use crate::export::{self, ExportArtifact, ExportError, ExportFormat, ExportScope, ExportSelection};
use crate::matcher;
use crate::model::{COLUMN_COUNT, Dataset, Row};
use crate::table::{self, PageState, SortConfig};
use crate::theme::{Theme, ThemeConfig};
use chrono::NaiveDate;
use ratatui::layout::Rect;

/// Current input mode for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Mode for entering filter text
    Filtering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Filter,
    Table,
}

/// Lifecycle of the one initial fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    /// The fetch failed; the dataset stays empty.
    Failed,
}

/// Work the reducer cannot do itself because it needs the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Export(ExportFormat),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Screen regions recorded during render, used for mouse hit-testing.
#[derive(Debug, Clone, Default)]
pub struct LayoutAreas {
    /// The whole frame from the last draw.
    pub screen: Option<Rect>,
    pub filter: Option<Rect>,
    pub filter_input: Option<Rect>,
    pub table: Option<Rect>,
    /// One rect per header cell, in column order.
    pub header_cells: Vec<Rect>,
    pub previous_button: Option<Rect>,
    pub next_button: Option<Rect>,
    /// Inner area of the column picker list, when open.
    pub column_picker: Option<Rect>,
}

pub struct AppState {
    /// All rows fetched at startup, in fetch order
    pub dataset: Dataset,
    pub load_state: LoadState,
    /// Indices into dataset that match the current filter, in fetch order
    pub filtered_indices: Vec<usize>,
    /// `filtered_indices` ordered by the active sort
    pub view_indices: Vec<usize>,
    /// Filter input text
    pub filter_text: String,
    /// Cursor position in filter, in chars
    pub filter_cursor: usize,
    pub input_mode: InputMode,
    pub focused_pane: FocusPane,
    pub sort: SortConfig,
    pub pages: PageState,
    /// Header column targeted by keyboard sorting
    pub column_cursor: usize,
    pub theme_kind: Theme,
    pub theme: ThemeConfig,
    pub export_selection: ExportSelection,
    pub export_scope: ExportScope,
    pub show_help: bool,
    pub show_column_picker: bool,
    pub column_picker_cursor: usize,
    /// Result of the last export or load, shown in the status bar
    pub status: Option<StatusMessage>,
    /// Describes where data comes from (sheet range or file)
    pub source_label: String,
    pub app_version: String,
    pub pending_action: Option<AppAction>,
    pub should_quit: bool,
    pub areas: LayoutAreas,
}

impl AppState {
    pub fn new(
        theme: Theme,
        rows_per_page: usize,
        source_label: String,
        app_version: String,
    ) -> Self {
        Self {
            dataset: Dataset::default(),
            load_state: LoadState::Loading,
            filtered_indices: Vec::new(),
            view_indices: Vec::new(),
            filter_text: String::new(),
            filter_cursor: 0,
            input_mode: InputMode::Normal,
            focused_pane: FocusPane::Table,
            sort: SortConfig::default(),
            pages: PageState::new(rows_per_page),
            column_cursor: 0,
            theme_kind: theme,
            theme: theme.config(),
            export_selection: ExportSelection::default(),
            export_scope: ExportScope::default(),
            show_help: false,
            show_column_picker: false,
            column_picker_cursor: 0,
            status: None,
            source_label,
            app_version,
            pending_action: None,
            should_quit: false,
            areas: LayoutAreas::default(),
        }
    }

    /// Installs the fetched dataset and leaves the loading state.
    pub fn apply_dataset(&mut self, dataset: Dataset) {
        self.dataset = dataset;
        self.load_state = LoadState::Loaded;
        self.update_filter();
    }

    /// Leaves the loading state with an empty dataset.
    pub fn mark_load_failed(&mut self, message: impl Into<String>) {
        self.dataset = Dataset::default();
        self.load_state = LoadState::Failed;
        self.update_filter();
        self.set_status(message, true);
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    /// Recomputes the filtered set from the query and returns to page 1.
    pub fn update_filter(&mut self) {
        self.filtered_indices = matcher::find_matches(&self.filter_text, &self.dataset);
        self.pages.first();
        self.refresh_view();
    }

    /// Re-sorts the filtered set. Keeps the current page, clamped into range.
    pub fn refresh_view(&mut self) {
        self.view_indices =
            table::sort_indices(self.dataset.rows(), &self.filtered_indices, self.sort);
        self.pages.clamp(self.view_indices.len());
    }

    /// Rows on the current page, in display order.
    pub fn page_rows(&self) -> Vec<&Row> {
        let range = self.pages.page_range(self.view_indices.len());
        self.view_indices[range]
            .iter()
            .filter_map(|&idx| self.dataset.get(idx))
            .collect()
    }

    pub fn total_pages(&self) -> usize {
        self.pages.total_pages(self.view_indices.len())
    }

    pub fn toggle_sort(&mut self, column: usize) {
        if column >= COLUMN_COUNT {
            return;
        }
        self.sort.toggle(column);
        self.column_cursor = column;
        self.refresh_view();
    }

    pub fn next_page(&mut self) -> bool {
        self.pages.next(self.view_indices.len())
    }

    pub fn previous_page(&mut self) -> bool {
        self.pages.previous()
    }

    pub fn first_page(&mut self) {
        self.pages.first();
    }

    pub fn last_page(&mut self) {
        self.pages.last(self.view_indices.len());
    }

    pub fn cycle_rows_per_page(&mut self) {
        self.pages.cycle_rows_per_page(self.view_indices.len());
    }

    pub fn move_column_cursor(&mut self, direction: i32) {
        self.column_cursor = if direction < 0 {
            self.column_cursor.saturating_sub(1)
        } else {
            (self.column_cursor + 1).min(COLUMN_COUNT - 1)
        };
    }

    pub fn toggle_theme(&mut self) {
        self.theme_kind = self.theme_kind.toggled();
        self.theme = self.theme_kind.config();
    }

    pub fn toggle_export_column(&mut self, column: usize) {
        self.export_selection.toggle(column);
    }

    pub fn toggle_export_scope(&mut self) {
        self.export_scope = self.export_scope.toggled();
    }

    pub fn open_column_picker(&mut self) {
        self.show_help = false;
        self.show_column_picker = true;
        self.column_picker_cursor = self.column_picker_cursor.min(COLUMN_COUNT - 1);
    }

    pub fn move_column_picker(&mut self, direction: i32) {
        self.column_picker_cursor = if direction < 0 {
            self.column_picker_cursor.saturating_sub(1)
        } else {
            (self.column_picker_cursor + 1).min(COLUMN_COUNT - 1)
        };
    }

    /// Rows an export reads, according to the export scope. Fetch order.
    pub fn export_rows(&self) -> Vec<&Row> {
        match self.export_scope {
            ExportScope::Filtered => self
                .filtered_indices
                .iter()
                .filter_map(|&idx| self.dataset.get(idx))
                .collect(),
            ExportScope::All => self.dataset.rows().iter().collect(),
        }
    }

    /// Encodes the current export rows as `format`, named for `date`.
    pub fn render_export(
        &self,
        format: ExportFormat,
        date: NaiveDate,
    ) -> Result<ExportArtifact, ExportError> {
        export::render_export(self.export_rows(), &self.export_selection, format, date)
    }

    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error,
        });
    }

    pub fn filter_add_char(&mut self, c: char) {
        let byte_idx = self
            .filter_text
            .char_indices()
            .nth(self.filter_cursor)
            .map(|(idx, _)| idx)
            .unwrap_or(self.filter_text.len());
        self.filter_text.insert(byte_idx, c);
        self.filter_cursor += 1;
    }

    pub fn filter_backspace(&mut self) {
        if self.filter_cursor > 0 {
            self.filter_cursor -= 1;
            if let Some((byte_idx, _)) = self.filter_text.char_indices().nth(self.filter_cursor) {
                self.filter_text.remove(byte_idx);
            }
        }
    }

    pub fn filter_delete(&mut self) {
        if let Some((byte_idx, _)) = self.filter_text.char_indices().nth(self.filter_cursor) {
            self.filter_text.remove(byte_idx);
        }
    }

    pub fn filter_move_cursor_left(&mut self) {
        self.filter_cursor = self.filter_cursor.saturating_sub(1);
    }

    pub fn filter_move_cursor_right(&mut self) {
        if self.filter_cursor < self.filter_text.chars().count() {
            self.filter_cursor += 1;
        }
    }

    pub fn filter_move_to_start(&mut self) {
        self.filter_cursor = 0;
    }

    pub fn filter_move_to_end(&mut self) {
        self.filter_cursor = self.filter_text.chars().count();
    }

    pub fn filter_clear(&mut self) {
        self.filter_text.clear();
        self.filter_cursor = 0;
    }

    /// Deletes the word before the cursor, plus any whitespace after it.
    pub fn filter_delete_word(&mut self) {
        let chars: Vec<char> = self.filter_text.chars().collect();
        let mut start = self.filter_cursor.min(chars.len());
        while start > 0 && chars[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !chars[start - 1].is_whitespace() {
            start -= 1;
        }

        self.filter_text = chars[..start]
            .iter()
            .chain(&chars[self.filter_cursor.min(chars.len())..])
            .collect();
        self.filter_cursor = start;
    }

    pub fn focus_pane(&mut self, pane: FocusPane) {
        self.focused_pane = pane;
        self.input_mode = match pane {
            FocusPane::Filter => InputMode::Filtering,
            FocusPane::Table => InputMode::Normal,
        };
    }

    pub fn focus_next_pane(&mut self) {
        let next = match self.focused_pane {
            FocusPane::Filter => FocusPane::Table,
            FocusPane::Table => FocusPane::Filter,
        };
        self.focus_pane(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn scenario_app() -> AppState {
        let mut app = AppState::new(Theme::Light, 5, "test".to_string(), "v0".to_string());
        app.apply_dataset(Dataset::new(vec![
            row(&["Alice", "Y", "2020", "50k", "N", "Open", "", "10%"]),
            row(&["Bob", "N", "2021", "75k", "Y", "Closed", "5k", "15%"]),
        ]));
        app
    }

    fn names(rows: &[&Row]) -> Vec<String> {
        rows.iter().map(|r| r[0].clone()).collect()
    }

    #[test]
    fn test_new_state_is_loading() {
        let app = AppState::new(Theme::Dark, 10, String::new(), String::new());
        assert!(app.is_loading());
        assert!(app.page_rows().is_empty());
        assert_eq!(app.pages.rows_per_page, 10);
    }

    #[test]
    fn test_query_scenario() {
        let mut app = scenario_app();
        assert_eq!(app.load_state, LoadState::Loaded);

        app.filter_text = "ali".to_string();
        app.update_filter();
        assert_eq!(app.filtered_indices, vec![0]);

        app.filter_text.clear();
        app.update_filter();
        assert_eq!(names(&app.page_rows()), vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_every_query_change_matches_full_scan() {
        let mut app = AppState::new(Theme::Light, 5, String::new(), String::new());
        app.apply_dataset(Dataset::new(vec![
            row(&["Alice"]),
            row(&["Malik"]),
            row(&["alicia"]),
            row(&["Bob"]),
            row(&["İpek"]),
        ]));

        for query in ["a", "al", "ali", "alic", "ali", "b", "", "i", "i\u{307}", "i\u{307}p"] {
            app.filter_text = query.to_string();
            app.update_filter();
            assert_eq!(
                app.filtered_indices,
                matcher::find_matches(query, &app.dataset),
                "query {query:?}"
            );
        }

        app.filter_text = "i".to_string();
        app.update_filter();
        app.filter_text = "i\u{307}".to_string();
        app.update_filter();
        assert_eq!(app.filtered_indices, vec![4]);
    }

    #[test]
    fn test_pagination_scenario() {
        let mut app = scenario_app();
        app.pages.set_rows_per_page(1, 2);
        assert_eq!(app.total_pages(), 2);
        assert_eq!(names(&app.page_rows()), vec!["Alice"]);

        assert!(app.next_page());
        assert_eq!(names(&app.page_rows()), vec!["Bob"]);
        assert!(!app.pages.has_next(app.view_indices.len()));
        assert!(!app.next_page());
    }

    #[test]
    fn test_query_change_resets_page() {
        let mut app = scenario_app();
        app.pages.set_rows_per_page(1, 2);
        app.next_page();
        assert_eq!(app.pages.page, 2);

        app.filter_text = "bob".to_string();
        app.update_filter();
        assert_eq!(app.pages.page, 1);
        assert_eq!(names(&app.page_rows()), vec!["Bob"]);
    }

    #[test]
    fn test_sort_scenario() {
        let mut app = AppState::new(Theme::Light, 5, String::new(), String::new());
        app.apply_dataset(Dataset::new(vec![row(&["Bob"]), row(&["Alice"])]));

        app.toggle_sort(0);
        assert_eq!(names(&app.page_rows()), vec!["Alice", "Bob"]);
        app.toggle_sort(0);
        assert_eq!(names(&app.page_rows()), vec!["Bob", "Alice"]);
    }

    #[test]
    fn test_failed_load_is_empty_and_not_loading() {
        let mut app = AppState::new(Theme::Light, 5, String::new(), String::new());
        app.mark_load_failed("boom");
        assert!(!app.is_loading());
        assert_eq!(app.load_state, LoadState::Failed);
        assert!(app.view_indices.is_empty());
        assert!(app.status.as_ref().is_some_and(|s| s.is_error));
    }

    #[test]
    fn test_export_scope_selects_rows() {
        let mut app = scenario_app();
        app.filter_text = "bob".to_string();
        app.update_filter();
        app.toggle_sort(0);

        assert_eq!(names(&app.export_rows()), vec!["Bob"]);
        app.toggle_export_scope();
        assert_eq!(names(&app.export_rows()), vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_export_rows_ignore_sort() {
        let mut app = scenario_app();
        app.toggle_sort(0);
        app.toggle_sort(0);
        assert_eq!(names(&app.page_rows()), vec!["Bob", "Alice"]);
        assert_eq!(names(&app.export_rows()), vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_render_export_row_count() {
        let mut app = scenario_app();
        app.filter_text = "a".to_string();
        app.update_filter();
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let artifact = app.render_export(ExportFormat::Csv, date).unwrap();
        let text = String::from_utf8(artifact.bytes).unwrap();
        assert_eq!(text.lines().count(), 1 + app.filtered_indices.len());
        assert_eq!(artifact.file_name, "export-2025-01-02.csv");
    }

    #[test]
    fn test_column_selection_does_not_change_view() {
        let mut app = scenario_app();
        app.toggle_export_column(0);
        assert!(!app.export_selection.contains(0));
        assert_eq!(app.page_rows().len(), 2);
        assert_eq!(app.page_rows()[0].len(), 8);
    }

    #[test]
    fn test_filter_delete_word() {
        let mut app = scenario_app();
        app.filter_text = "hello world".to_string();
        app.filter_cursor = 11;
        app.filter_delete_word();
        assert_eq!(app.filter_text, "hello ");
        assert_eq!(app.filter_cursor, 6);

        app.filter_cursor = 0;
        app.filter_delete_word();
        assert_eq!(app.filter_text, "hello ");
    }

    #[test]
    fn test_filter_editing_multibyte() {
        let mut app = scenario_app();
        for c in "Jo€".chars() {
            app.filter_add_char(c);
        }
        app.filter_move_cursor_left();
        app.filter_delete();
        assert_eq!(app.filter_text, "Jo");
        app.filter_backspace();
        assert_eq!(app.filter_text, "J");
        assert_eq!(app.filter_cursor, 1);
    }

    #[test]
    fn test_theme_toggle() {
        let mut app = scenario_app();
        app.toggle_theme();
        assert_eq!(app.theme_kind, Theme::Dark);
        app.toggle_theme();
        assert_eq!(app.theme_kind, Theme::Light);
    }
}
