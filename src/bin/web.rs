#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, unused_imports, unused_variables)
)]

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("sheet-search-web must be built for wasm32-unknown-unknown");
}

// ---------------------------------------------------------------------------
// Web target (wasm32). Everything below is only compiled for the browser.
// ---------------------------------------------------------------------------

#[cfg(target_arch = "wasm32")]
use anyhow::{Result, anyhow};
#[cfg(target_arch = "wasm32")]
use ratatui::Terminal;
#[cfg(target_arch = "wasm32")]
use ratzilla::web_sys::wasm_bindgen::JsCast;
#[cfg(target_arch = "wasm32")]
use ratzilla::{
    DomBackend, WebRenderer,
    event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind},
};
#[cfg(target_arch = "wasm32")]
use sheet_search::app_core::input::{AppKeyCode, AppKeyEvent, AppMouseEvent, AppMouseKind};
#[cfg(target_arch = "wasm32")]
use sheet_search::app_core::reducer;
#[cfg(target_arch = "wasm32")]
use sheet_search::app_core::state::{AppAction, AppState};
#[cfg(target_arch = "wasm32")]
use sheet_search::app_core::web_mouse::GridGeometry;
#[cfg(target_arch = "wasm32")]
use sheet_search::runtime::web::{data, download};
#[cfg(target_arch = "wasm32")]
use sheet_search::table::DEFAULT_ROWS_PER_PAGE;
#[cfg(target_arch = "wasm32")]
use sheet_search::theme::Theme;
#[cfg(target_arch = "wasm32")]
use sheet_search::ui;
#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::spawn_local;

// ---------------------------------------------------------------------------
// Ratzilla → shared input type adapters
// ---------------------------------------------------------------------------

#[cfg(target_arch = "wasm32")]
fn ratzilla_to_app_key_event(key: KeyEvent) -> Option<AppKeyEvent> {
    let key_code = match key.code {
        KeyCode::Char(c) => AppKeyCode::Char(c),
        KeyCode::Backspace => AppKeyCode::Backspace,
        KeyCode::Delete => AppKeyCode::Delete,
        KeyCode::Enter => AppKeyCode::Enter,
        KeyCode::Esc => AppKeyCode::Esc,
        KeyCode::Up => AppKeyCode::Up,
        KeyCode::Down => AppKeyCode::Down,
        KeyCode::Left => AppKeyCode::Left,
        KeyCode::Right => AppKeyCode::Right,
        KeyCode::Home => AppKeyCode::Home,
        KeyCode::End => AppKeyCode::End,
        KeyCode::PageUp => AppKeyCode::PageUp,
        KeyCode::PageDown => AppKeyCode::PageDown,
        // Shift-tab arrives as Tab with the shift modifier
        KeyCode::Tab if key.shift => AppKeyCode::BackTab,
        KeyCode::Tab => AppKeyCode::Tab,
        _ => return None,
    };
    Some(AppKeyEvent {
        code: key_code,
        ctrl: key.ctrl,
        alt: key.alt,
        is_release: false,
    })
}

/// Ratzilla 0.3 delivers no wheel events, so only left presses map.
#[cfg(target_arch = "wasm32")]
fn ratzilla_to_app_mouse_event(column: u16, row: u16, mouse: &MouseEvent) -> Option<AppMouseEvent> {
    match mouse.event {
        MouseEventKind::Pressed if mouse.button == MouseButton::Left => {
            Some(AppMouseEvent::new(AppMouseKind::LeftDown, column, row))
        }
        _ => None,
    }
}

/// Measures the DOM grid and maps the mouse pixel position to a cell.
#[cfg(target_arch = "wasm32")]
fn mouse_to_cell_position(app: &AppState, mouse: &MouseEvent) -> Option<(u16, u16)> {
    let screen = app.areas.screen?;
    let document = ratzilla::web_sys::window()?.document()?;
    let grid: ratzilla::web_sys::HtmlElement = document
        .get_element_by_id("grid_ratzilla_grid")?
        .dyn_into()
        .ok()?;
    let rect = grid.get_bounding_client_rect();

    let cell = grid
        .first_element_child()
        .and_then(|row| {
            let height = row.get_bounding_client_rect().height();
            let width = row.first_element_child()?.get_bounding_client_rect().width();
            Some((width, height))
        })
        .filter(|&(width, height)| width > 0.0 && height > 0.0);

    GridGeometry {
        left: rect.left(),
        top: rect.top(),
        width: rect.width(),
        height: rect.height(),
        columns: screen.width,
        rows: screen.height,
        cell,
    }
    .cell_at(mouse.x as f64, mouse.y as f64)
}

// ---------------------------------------------------------------------------
// Data loading and actions
// ---------------------------------------------------------------------------

#[cfg(target_arch = "wasm32")]
fn start_load(app_state: Rc<RefCell<AppState>>) {
    spawn_local(async move {
        let config = data::source_config();
        match data::fetch_dataset(&config).await {
            Ok(dataset) => app_state.borrow_mut().apply_dataset(dataset),
            Err(err) => {
                download::console_error(&format!("Error fetching data: {err:#}"));
                app_state
                    .borrow_mut()
                    .mark_load_failed(format!("Failed to load data: {err}"));
            }
        }
    });
}

#[cfg(target_arch = "wasm32")]
fn handle_action(app: &mut AppState, action: AppAction) {
    match action {
        AppAction::Export(format) => {
            let result = download::today_utc()
                .ok_or_else(|| anyhow!("browser clock unavailable"))
                .and_then(|date| Ok(app.render_export(format, date)?))
                .and_then(|artifact| {
                    download::download(&artifact)?;
                    Ok(artifact.file_name)
                });
            match result {
                Ok(file_name) => app.set_status(format!("Downloaded {file_name}"), false),
                Err(err) => {
                    download::console_error(&format!("Export failed: {err:#}"));
                    app.set_status(format!("Export failed: {err}"), true);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[cfg(target_arch = "wasm32")]
fn main() -> Result<()> {
    console_error_panic_hook::set_once();

    let app_version = format!("v{}", env!("CARGO_PKG_VERSION"));
    let config = data::source_config();
    let app = Rc::new(RefCell::new(AppState::new(
        Theme::default(),
        DEFAULT_ROWS_PER_PAGE,
        config.range,
        app_version,
    )));

    start_load(app.clone());

    let backend = DomBackend::new_by_id("grid").map_err(|err| anyhow!(err.to_string()))?;
    let terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let event_state = app.clone();
        move |key_event| {
            let mut state = event_state.borrow_mut();
            if let Some(event) = ratzilla_to_app_key_event(key_event) {
                reducer::handle_key_event(&mut state, event);
            }
            if let Some(action) = state.pending_action.take() {
                handle_action(&mut state, action);
            }
        }
    });

    terminal.on_mouse_event({
        let event_state = app.clone();
        move |mouse_event| {
            let mut state = event_state.borrow_mut();
            if let Some((column, row)) = mouse_to_cell_position(&state, &mouse_event)
                && let Some(event) = ratzilla_to_app_mouse_event(column, row, &mouse_event)
            {
                let _ = reducer::handle_mouse_event(&mut state, event);
            }
        }
    });

    terminal.draw_web(move |f| {
        let mut state = app.borrow_mut();
        ui::ui(f, &mut state);
    });

    Ok(())
}
