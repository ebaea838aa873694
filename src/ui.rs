use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table},
};

use crate::app_core::state::{AppState, FocusPane, InputMode, LayoutAreas};
use crate::highlight::{self, Segment};
use crate::model::{COLUMN_COUNT, COLUMN_LABELS, NAME_COLUMN};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const PREVIOUS_LABEL: &str = "◀ Previous";
const NEXT_LABEL: &str = "Next ▶";

/// Main UI entry point that renders the entire application layout.
pub fn ui(f: &mut Frame, app: &mut AppState) {
    let area = f.area();
    app.areas = LayoutAreas {
        screen: Some(area),
        ..LayoutAreas::default()
    };
    f.render_widget(Block::default().style(app.theme.text), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(3), // Filter input
            Constraint::Length(1), // Controls
            Constraint::Min(0),    // Table
            Constraint::Length(1), // Pager
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_title(f, app, chunks[0]);
    render_filter(f, app, chunks[1]);
    render_controls(f, app, chunks[2]);
    render_table(f, app, chunks[3]);
    render_pager(f, app, chunks[4]);
    render_status_bar(f, app, chunks[5]);

    if app.show_column_picker {
        render_column_picker(f, app);
    } else if app.show_help {
        render_help_overlay(f, app);
    }
}

/// Width constraints shared by the table and the header hit areas.
fn column_constraints() -> [Constraint; COLUMN_COUNT] {
    std::array::from_fn(|idx| {
        if idx == NAME_COLUMN {
            Constraint::Fill(2)
        } else {
            Constraint::Fill(1)
        }
    })
}

/// Converts highlighter output into spans, styling matched segments.
pub fn highlighted_line<'a>(segments: Vec<Segment<'a>>, highlight_style: Style) -> Line<'a> {
    Line::from(
        segments
            .into_iter()
            .map(|segment| {
                if segment.matched {
                    Span::styled(segment.text, highlight_style)
                } else {
                    Span::raw(segment.text)
                }
            })
            .collect::<Vec<_>>(),
    )
}

fn render_title(f: &mut Frame, app: &AppState, area: Rect) {
    let area = Rect::new(area.x + 1, area.y, area.width.saturating_sub(2), area.height);
    let [left, right] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(area);

    f.render_widget(
        Paragraph::new(Line::from(Span::styled("Case Search", app.theme.title))),
        left,
    );
    f.render_widget(
        Paragraph::new(Line::from(format!("{} {}", app.source_label, app.app_version)))
            .style(app.theme.muted)
            .alignment(Alignment::Right),
        right,
    );
}

/// Renders the interactive filter input box.
fn render_filter(f: &mut Frame, app: &mut AppState, area: Rect) {
    let is_focused = app.focused_pane == FocusPane::Filter;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if is_focused {
            app.theme.border_selected
        } else {
            app.theme.border
        })
        .title(" Filter by name (/) ")
        .title_style(app.theme.title)
        .title_bottom(if is_focused {
            Line::from(" Enter/Esc table • Ctrl+U clear ").right_aligned()
        } else {
            Line::from("")
        });

    let inner = block.inner(area);
    app.areas.filter = Some(area);
    app.areas.filter_input = Some(inner);
    let horizontal_scroll =
        filter_horizontal_scroll(&app.filter_text, app.filter_cursor, inner.width);

    let content = if app.filter_text.is_empty() && app.input_mode != InputMode::Filtering {
        Text::from(Line::from(Span::styled(
            "Search by name...",
            app.theme.muted.add_modifier(Modifier::ITALIC),
        )))
    } else {
        Text::from(app.filter_text.as_str())
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .style(app.theme.text)
        .scroll((0, horizontal_scroll));

    f.render_widget(paragraph, area);

    if app.input_mode == InputMode::Filtering && inner.width > 0 && inner.height > 0 {
        let cursor_offset = filter_cursor_offset(&app.filter_text, app.filter_cursor);
        let max_x = inner.width.saturating_sub(1);
        let visible_cursor_offset = cursor_offset.saturating_sub(horizontal_scroll);
        f.set_cursor_position((inner.x + visible_cursor_offset.min(max_x), inner.y));
    }
}

fn render_controls(f: &mut Frame, app: &AppState, area: Rect) {
    let area = Rect::new(area.x + 1, area.y, area.width.saturating_sub(2), area.height);
    let key_style = app.theme.title;
    let sep = Span::styled("  │  ", app.theme.muted);

    let columns = if app.export_selection.is_empty() {
        Span::styled("none", app.theme.error)
    } else {
        Span::raw(app.export_selection.labels().join(", "))
    };

    let line = Line::from(vec![
        Span::styled("r ", key_style),
        Span::raw(format!("{} rows/page", app.pages.rows_per_page)),
        sep.clone(),
        Span::styled("t ", key_style),
        Span::raw(app.theme_kind.toggle_label()),
        sep.clone(),
        Span::styled("a ", key_style),
        Span::raw(format!("export {}", app.export_scope.label())),
        sep,
        Span::styled("c ", key_style),
        Span::raw("columns: "),
        columns,
    ]);

    f.render_widget(Paragraph::new(line).style(app.theme.text), area);
}

fn render_table(f: &mut Frame, app: &mut AppState, area: Rect) {
    let is_focused = app.focused_pane == FocusPane::Table;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if is_focused {
            app.theme.border_selected
        } else {
            app.theme.border
        })
        .title(format!(" Cases ({}) ", app.view_indices.len()))
        .title_style(app.theme.title)
        .style(app.theme.text);

    let inner = block.inner(area);
    f.render_widget(block, area);
    app.areas.table = Some(area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let placeholder = if app.is_loading() {
        Some(Span::styled("Loading data…", app.theme.muted))
    } else if app.view_indices.is_empty() {
        Some(Span::styled("No results found.", app.theme.muted))
    } else {
        None
    };
    if let Some(message) = placeholder {
        let middle = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1);
        f.render_widget(
            Paragraph::new(Line::from(message)).alignment(Alignment::Center),
            middle,
        );
        return;
    }

    let header_area = Rect::new(inner.x, inner.y, inner.width, 1);
    app.areas.header_cells = Layout::horizontal(column_constraints())
        .spacing(1)
        .split(header_area)
        .to_vec();

    let header = Row::new(COLUMN_LABELS.iter().enumerate().map(|(idx, label)| {
        let text = match app.sort.indicator(idx) {
            Some(direction) => format!("{label} {}", direction.arrow()),
            None => label.to_string(),
        };
        let style = if is_focused && idx == app.column_cursor {
            app.theme.header_cursor
        } else {
            app.theme.header
        };
        Cell::from(text).style(style)
    }))
    .style(app.theme.header);

    let query = app.filter_text.as_str();
    let rows = app.page_rows().into_iter().enumerate().map(|(idx, row)| {
        let cells = (0..COLUMN_COUNT).map(|column| {
            let text = crate::model::cell(row, column);
            Cell::from(highlighted_line(
                highlight::highlight(text, query),
                app.theme.highlight,
            ))
        });
        let style = if idx % 2 == 0 {
            app.theme.row_even
        } else {
            app.theme.row_odd
        };
        Row::new(cells).style(style)
    });

    let table = Table::new(rows, column_constraints())
        .header(header)
        .column_spacing(1)
        .style(app.theme.text);

    f.render_widget(table, inner);
}

fn render_pager(f: &mut Frame, app: &mut AppState, area: Rect) {
    if app.is_loading() || app.view_indices.is_empty() {
        return;
    }

    let area = Rect::new(area.x + 1, area.y, area.width.saturating_sub(2), area.height);
    let [previous, label, next] = Layout::horizontal([
        Constraint::Length(PREVIOUS_LABEL.width() as u16),
        Constraint::Fill(1),
        Constraint::Length(NEXT_LABEL.width() as u16),
    ])
    .areas(area);

    let button_style = |enabled: bool| {
        if enabled {
            app.theme.title
        } else {
            app.theme.muted.add_modifier(Modifier::DIM)
        }
    };
    let row_count = app.view_indices.len();

    f.render_widget(
        Paragraph::new(PREVIOUS_LABEL).style(button_style(app.pages.has_previous())),
        previous,
    );
    f.render_widget(
        Paragraph::new(format!("Page {} of {}", app.pages.page, app.total_pages()))
            .style(app.theme.text)
            .alignment(Alignment::Center),
        label,
    );
    f.render_widget(
        Paragraph::new(NEXT_LABEL).style(button_style(app.pages.has_next(row_count))),
        next,
    );

    app.areas.previous_button = Some(previous);
    app.areas.next_button = Some(next);
}

/// Renders the status bar: shortcuts on the left, last message on the right.
fn render_status_bar(f: &mut Frame, app: &AppState, area: Rect) {
    let area = Rect::new(area.x + 1, area.y, area.width.saturating_sub(2), area.height);
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(area);

    let key_style = app.theme.title;
    let bar_style = app.theme.text.add_modifier(Modifier::DIM);
    let shortcuts = Line::from(vec![
        Span::styled("e/x/X ", key_style),
        Span::raw("export  "),
        Span::styled("? ", key_style),
        Span::raw("help  "),
        Span::styled("q ", key_style),
        Span::raw("quit"),
    ]);
    f.render_widget(Paragraph::new(shortcuts).style(bar_style), left);

    let message = match &app.status {
        Some(status) if status.is_error => Span::styled(status.text.as_str(), app.theme.error),
        Some(status) => Span::raw(status.text.as_str()),
        None => Span::raw(format!(
            "{} of {} rows",
            app.view_indices.len(),
            app.dataset.len()
        )),
    };
    f.render_widget(
        Paragraph::new(Line::from(message))
            .style(bar_style)
            .alignment(Alignment::Right),
        right,
    );
}

fn centered_popup(area: Rect, width: u16, height: u16) -> Option<Rect> {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    if width == 0 || height == 0 {
        return None;
    }
    Some(Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    ))
}

fn render_column_picker(f: &mut Frame, app: &mut AppState) {
    let Some(popup_rect) = centered_popup(f.area(), 36, COLUMN_COUNT as u16 + 2) else {
        return;
    };

    f.render_widget(Clear, popup_rect);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_selected)
        .style(app.theme.text)
        .title(" Export columns ")
        .title_style(app.theme.title)
        .title_bottom(Line::from(" Space toggle • Esc close ").right_aligned());

    let inner = block.inner(popup_rect);
    f.render_widget(block, popup_rect);
    app.areas.column_picker = Some(inner);

    let lines: Vec<Line> = COLUMN_LABELS
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            let position = app.export_selection.columns().iter().position(|&c| c == idx);
            let mark = match position {
                Some(pos) => format!("[x] {label} ({})", pos + 1),
                None => format!("[ ] {label}"),
            };
            let style = if idx == app.column_picker_cursor {
                app.theme.header_cursor
            } else if position.is_some() {
                app.theme.text
            } else {
                app.theme.muted
            };
            Line::from(Span::styled(mark, style))
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}

fn render_help_overlay(f: &mut Frame, app: &AppState) {
    let Some(popup_rect) = centered_popup(f.area(), 60, 26) else {
        return;
    };

    f.render_widget(Clear, popup_rect);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_selected)
        .style(app.theme.text)
        .title(" Help ")
        .border_type(BorderType::Double)
        .title_style(app.theme.title);

    let inner_area = block.inner(popup_rect);
    f.render_widget(block, popup_rect);

    let key_style = app.theme.title;
    let desc_style = app.theme.text;
    let header_style = key_style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

    let format_section = |title: &str, items: &[(&str, &str)]| -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled(title.to_string(), header_style))];
        for (key, desc) in items {
            lines.push(Line::from(vec![
                Span::styled(format!("{: <16}", key), key_style),
                Span::styled(desc.to_string(), desc_style),
            ]));
        }
        lines
    };

    let mut lines = format_section(
        "Table",
        &[
            ("1-8 | Click", "sort by column"),
            ("Left | Right", "move column cursor"),
            ("Enter | s", "sort by cursor column"),
            ("n | p", "next | previous page"),
            ("Home | End", "first | last page"),
            ("r", "cycle rows per page"),
            ("t", "toggle light/dark"),
        ],
    );
    lines.push(Line::from(""));
    lines.extend(format_section(
        "Export",
        &[
            ("e | x | X", "CSV | Excel | styled Excel"),
            ("c", "choose columns"),
            ("a", "filtered rows or all rows"),
        ],
    ));
    lines.push(Line::from(""));
    lines.extend(format_section(
        "Filter",
        &[
            ("/ | Tab", "focus filter"),
            ("Enter | Esc", "back to table"),
            ("Ctrl+U", "clear filter"),
            ("Ctrl+W | Alt+BS", "delete word"),
            ("Ctrl+A | E", "start | end of line"),
        ],
    ));

    let body = Rect::new(
        inner_area.x + 1,
        inner_area.y,
        inner_area.width.saturating_sub(2),
        inner_area.height,
    );
    f.render_widget(Paragraph::new(lines), body);
}

/// Calculates the terminal cell width offset for a given character index.
/// Uses `unicode-width` to correctly handle multibyte and multi-cell characters.
pub fn filter_cursor_offset(text: &str, cursor: usize) -> u16 {
    text.chars()
        .take(cursor)
        .filter_map(|c| c.width())
        .map(|w| w as u16)
        .sum::<u16>()
}

/// Horizontal scroll that keeps the cursor inside an input `visible_width` cells wide.
pub fn filter_horizontal_scroll(text: &str, cursor: usize, visible_width: u16) -> u16 {
    if visible_width == 0 {
        return 0;
    }

    let cursor_offset = filter_cursor_offset(text, cursor);
    cursor_offset.saturating_sub(visible_width.saturating_sub(1))
}

/// Character index under display column `target_column`, clamped to the end.
pub fn filter_cursor_for_column(text: &str, target_column: u16) -> usize {
    let mut width = 0u16;
    for (idx, ch) in text.chars().enumerate() {
        let char_width = ch.width().unwrap_or(0) as u16;
        if width + char_width > target_column {
            return idx;
        }
        width += char_width;
    }
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dataset, Row as DataRow};
    use crate::theme::Theme;
    use ratatui::{Terminal, backend::TestBackend};

    fn create_test_app(names: &[&str]) -> AppState {
        let rows: Vec<DataRow> = names
            .iter()
            .map(|name| vec![name.to_string(), "Y".to_string(), "2021-03-04".to_string()])
            .collect();
        let mut app = AppState::new(Theme::Light, 5, "Sheet".to_string(), "v1".to_string());
        app.apply_dataset(Dataset::new(rows));
        app
    }

    fn render(app: &mut AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 24)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_render_table_and_pager() {
        let mut app = create_test_app(&["Alice", "Bob"]);
        let screen = render(&mut app);

        assert!(screen.contains("Name"));
        assert!(screen.contains("Alice"));
        assert!(screen.contains("Page 1 of 1"));
        assert!(screen.contains(PREVIOUS_LABEL));
        assert_eq!(app.areas.header_cells.len(), COLUMN_COUNT);
        assert!(app.areas.next_button.is_some());
    }

    #[test]
    fn test_render_sort_indicator() {
        let mut app = create_test_app(&["Bob", "Alice"]);
        app.toggle_sort(0);
        assert!(render(&mut app).contains("Name ▲"));
        app.toggle_sort(0);
        assert!(render(&mut app).contains("Name ▼"));
    }

    #[test]
    fn test_render_placeholders() {
        let mut app = AppState::new(Theme::Dark, 5, String::new(), String::new());
        assert!(render(&mut app).contains("Loading data…"));

        let mut app = create_test_app(&["Alice"]);
        app.filter_text = "zzz".to_string();
        app.update_filter();
        let screen = render(&mut app);
        assert!(screen.contains("No results found."));
        assert!(!screen.contains("Page 1"));
        assert!(app.areas.header_cells.is_empty());
        assert!(app.areas.previous_button.is_none());
    }

    #[test]
    fn test_render_column_picker_records_area() {
        let mut app = create_test_app(&["Alice"]);
        app.toggle_export_column(0);
        app.toggle_export_column(0);
        app.open_column_picker();
        let screen = render(&mut app);
        assert!(screen.contains("[x] Name (8)"));
        assert_eq!(app.areas.column_picker.map(|r| r.height), Some(COLUMN_COUNT as u16));
    }

    #[test]
    fn test_highlighted_line_styles_matches() {
        let style = Theme::Light.config().highlight;
        let line = highlighted_line(highlight::highlight("Malik", "ali"), style);
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "ali");
        assert_eq!(line.spans[1].style, style);
        assert_eq!(line.spans[0].style, Style::default());
    }

    #[test]
    fn test_filter_horizontal_scroll_keeps_cursor_visible() {
        let text = "abcdefghijklmnopqrstuvwxyz";

        assert_eq!(filter_horizontal_scroll(text, 0, 10), 0);
        assert_eq!(filter_horizontal_scroll(text, 9, 10), 0);
        assert_eq!(filter_horizontal_scroll(text, 10, 10), 1);
        assert_eq!(filter_horizontal_scroll(text, 15, 10), 6);
    }

    #[test]
    fn test_filter_horizontal_scroll_handles_wide_characters() {
        let text = "🦀rust";

        assert_eq!(filter_horizontal_scroll(text, 1, 2), 1);
        assert_eq!(filter_horizontal_scroll(text, 2, 3), 1);
        assert_eq!(filter_horizontal_scroll(text, 5, 4), 3);
    }

    #[test]
    fn test_filter_cursor_for_column_clamps_to_end() {
        assert_eq!(filter_cursor_for_column("abc", 0), 0);
        assert_eq!(filter_cursor_for_column("abc", 2), 2);
        assert_eq!(filter_cursor_for_column("abc", 50), 3);
    }

    #[test]
    fn test_filter_cursor_for_column_handles_wide_characters() {
        assert_eq!(filter_cursor_for_column("🦀a", 0), 0);
        assert_eq!(filter_cursor_for_column("🦀a", 1), 0);
        assert_eq!(filter_cursor_for_column("🦀a", 2), 1);
        assert_eq!(filter_cursor_for_column("🦀a", 3), 2);
    }
}
