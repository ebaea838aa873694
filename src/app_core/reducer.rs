//! Shared event reducer: handlers for key and mouse events.
//!
//! Both runtimes call these after converting platform events to
//! [`AppKeyEvent`] / [`AppMouseEvent`].

use crate::app_core::input::{AppKeyCode, AppKeyEvent, AppMouseEvent, AppMouseKind};
use crate::app_core::state::{AppAction, AppState, FocusPane, InputMode};
use crate::export::ExportFormat;
use crate::model::COLUMN_COUNT;
use crate::ui;
use ratatui::layout::{Position, Rect};

fn contains(area: Option<Rect>, column: u16, row: u16) -> bool {
    area.is_some_and(|a| a.contains(Position::new(column, row)))
}

/// Maps `'1'..='8'` to a column index.
fn digit_column(c: char) -> Option<usize> {
    c.to_digit(10)
        .map(|d| d as usize)
        .filter(|&d| (1..=COLUMN_COUNT).contains(&d))
        .map(|d| d - 1)
}

/// Handle a runtime-agnostic key event, mutating `app` in place.
///
/// May set `app.pending_action`; the runtime acts on it after this returns.
pub fn handle_key_event(app: &mut AppState, event: AppKeyEvent) {
    fn apply_filter_edit(app: &mut AppState, edit: impl FnOnce(&mut AppState)) {
        edit(app);
        app.update_filter();
    }

    if event.is_release {
        return;
    }

    let code = event.code;
    let ctrl = event.ctrl;
    let alt = event.alt;

    if ctrl && code == AppKeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.is_loading() {
        if code == AppKeyCode::Char('q') {
            app.should_quit = true;
        }
        return;
    }

    if app.show_help {
        if matches!(code, AppKeyCode::Char('?') | AppKeyCode::Esc | AppKeyCode::Char('q')) {
            app.show_help = false;
        }
        return;
    }

    if app.show_column_picker {
        match code {
            AppKeyCode::Esc | AppKeyCode::Char('c') | AppKeyCode::Char('q') => {
                app.show_column_picker = false;
            }
            AppKeyCode::Up | AppKeyCode::Char('k') => app.move_column_picker(-1),
            AppKeyCode::Down | AppKeyCode::Char('j') => app.move_column_picker(1),
            AppKeyCode::Enter | AppKeyCode::Char(' ') => {
                app.toggle_export_column(app.column_picker_cursor);
            }
            AppKeyCode::Char(c) => {
                if let Some(column) = digit_column(c) {
                    app.column_picker_cursor = column;
                    app.toggle_export_column(column);
                }
            }
            _ => {}
        }
        return;
    }

    if code == AppKeyCode::Tab || code == AppKeyCode::BackTab {
        app.focus_next_pane();
        return;
    }

    match app.input_mode {
        InputMode::Normal => match code {
            // Modified letters are not commands.
            AppKeyCode::Char(_) if ctrl || alt => {}
            AppKeyCode::Char('q') => app.should_quit = true,
            AppKeyCode::Char('/') => {
                app.focus_pane(FocusPane::Filter);
                app.filter_move_to_end();
            }
            AppKeyCode::Char('?') => app.show_help = true,
            AppKeyCode::Left | AppKeyCode::Char('h') => app.move_column_cursor(-1),
            AppKeyCode::Right | AppKeyCode::Char('l') => app.move_column_cursor(1),
            AppKeyCode::Enter | AppKeyCode::Char('s') => app.toggle_sort(app.column_cursor),
            AppKeyCode::Char('n') | AppKeyCode::PageDown | AppKeyCode::Down => {
                app.next_page();
            }
            AppKeyCode::Char('p') | AppKeyCode::PageUp | AppKeyCode::Up => {
                app.previous_page();
            }
            AppKeyCode::Home | AppKeyCode::Char('g') => app.first_page(),
            AppKeyCode::End | AppKeyCode::Char('G') => app.last_page(),
            AppKeyCode::Char('r') => app.cycle_rows_per_page(),
            AppKeyCode::Char('t') => app.toggle_theme(),
            AppKeyCode::Char('c') => app.open_column_picker(),
            AppKeyCode::Char('a') => app.toggle_export_scope(),
            AppKeyCode::Char('e') => {
                app.pending_action = Some(AppAction::Export(ExportFormat::Csv));
            }
            AppKeyCode::Char('x') => {
                app.pending_action = Some(AppAction::Export(ExportFormat::Xlsx));
            }
            AppKeyCode::Char('X') => {
                app.pending_action = Some(AppAction::Export(ExportFormat::XlsxStyled));
            }
            AppKeyCode::Char(c) => {
                if let Some(column) = digit_column(c) {
                    app.toggle_sort(column);
                }
            }
            _ => {}
        },
        InputMode::Filtering => match code {
            AppKeyCode::Enter | AppKeyCode::Esc | AppKeyCode::Down => {
                app.focus_pane(FocusPane::Table);
            }
            AppKeyCode::Char('u') if ctrl => apply_filter_edit(app, AppState::filter_clear),
            AppKeyCode::Char('w') if ctrl => apply_filter_edit(app, AppState::filter_delete_word),
            AppKeyCode::Char('a') if ctrl => app.filter_move_to_start(),
            AppKeyCode::Char('e') if ctrl => app.filter_move_to_end(),
            AppKeyCode::Char(c) if !ctrl && !alt => {
                apply_filter_edit(app, |app| app.filter_add_char(c));
            }
            AppKeyCode::Backspace if alt => apply_filter_edit(app, AppState::filter_delete_word),
            AppKeyCode::Backspace => apply_filter_edit(app, AppState::filter_backspace),
            AppKeyCode::Delete => apply_filter_edit(app, AppState::filter_delete),
            AppKeyCode::Left => app.filter_move_cursor_left(),
            AppKeyCode::Right => app.filter_move_cursor_right(),
            AppKeyCode::Home => app.filter_move_to_start(),
            AppKeyCode::End => app.filter_move_to_end(),
            _ => {}
        },
    }
}

/// Handle a runtime-agnostic mouse event.
///
/// `event.column` and `event.row` must already be in terminal cell coordinates.
/// Returns `true` if the UI needs to be redrawn.
pub fn handle_mouse_event(app: &mut AppState, event: AppMouseEvent) -> bool {
    let (column, row) = (event.column, event.row);

    if app.is_loading() || app.show_help {
        return false;
    }

    if app.show_column_picker {
        if event.kind != AppMouseKind::LeftDown {
            return false;
        }
        if let Some(list) = app.areas.column_picker
            && list.contains(Position::new(column, row))
        {
            let idx = row.saturating_sub(list.y) as usize;
            if idx < COLUMN_COUNT {
                app.column_picker_cursor = idx;
                app.toggle_export_column(idx);
            }
        } else {
            app.show_column_picker = false;
        }
        return true;
    }

    match event.kind {
        AppMouseKind::ScrollDown if contains(app.areas.table, column, row) => app.next_page(),
        AppMouseKind::ScrollUp if contains(app.areas.table, column, row) => app.previous_page(),
        AppMouseKind::LeftDown => handle_left_click(app, column, row),
        _ => false,
    }
}

fn handle_left_click(app: &mut AppState, column: u16, row: u16) -> bool {
    if contains(app.areas.filter, column, row) {
        let previous = (app.focused_pane, app.filter_cursor);
        app.focus_pane(FocusPane::Filter);
        if let Some(input) = app.areas.filter_input
            && input.contains(Position::new(column, row))
        {
            let scroll =
                ui::filter_horizontal_scroll(&app.filter_text, app.filter_cursor, input.width);
            let target = scroll + column.saturating_sub(input.x);
            app.filter_cursor = ui::filter_cursor_for_column(&app.filter_text, target);
        }
        return previous != (app.focused_pane, app.filter_cursor);
    }

    if let Some(idx) = app
        .areas
        .header_cells
        .iter()
        .position(|cell| cell.contains(Position::new(column, row)))
    {
        app.focus_pane(FocusPane::Table);
        app.toggle_sort(idx);
        return true;
    }

    if contains(app.areas.previous_button, column, row) {
        app.focus_pane(FocusPane::Table);
        app.previous_page();
        return true;
    }

    if contains(app.areas.next_button, column, row) {
        app.focus_pane(FocusPane::Table);
        app.next_page();
        return true;
    }

    if contains(app.areas.table, column, row) && app.focused_pane != FocusPane::Table {
        app.focus_pane(FocusPane::Table);
        return true;
    }

    false
}
