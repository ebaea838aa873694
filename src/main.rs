//! # sheet-search
//!
//! A terminal user interface for searching a spreadsheet-backed case list.

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use sheet_search::app_core::input::{AppKeyCode, AppKeyEvent, AppMouseEvent, AppMouseKind};
use sheet_search::app_core::reducer;
use sheet_search::app_core::state::{AppAction, AppState};
use sheet_search::export::{ExportFormat, ExportScope};
use sheet_search::runtime::native::config::{AppPaths, Args, FileConfig, Settings};
use sheet_search::runtime::native::{data, logging};
use sheet_search::ui;
use std::io;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Crossterm → shared-reducer adapters
// ---------------------------------------------------------------------------

fn crossterm_to_app_key_event(
    code: KeyCode,
    modifiers: KeyModifiers,
    kind: KeyEventKind,
) -> Option<AppKeyEvent> {
    if matches!(kind, KeyEventKind::Release) {
        return None;
    }

    let key_code = match code {
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
        KeyCode::Tab => AppKeyCode::Tab,
        KeyCode::BackTab => AppKeyCode::BackTab,
        _ => return None,
    };

    Some(AppKeyEvent {
        code: key_code,
        ctrl: modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER),
        alt: modifiers.contains(KeyModifiers::ALT),
        is_release: false,
    })
}

fn crossterm_to_app_mouse_event(mouse: &event::MouseEvent) -> Option<AppMouseEvent> {
    let kind = match mouse.kind {
        MouseEventKind::Down(event::MouseButton::Left) => AppMouseKind::LeftDown,
        MouseEventKind::ScrollUp => AppMouseKind::ScrollUp,
        MouseEventKind::ScrollDown => AppMouseKind::ScrollDown,
        _ => return None,
    };
    Some(AppMouseEvent::new(kind, mouse.column, mouse.row))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let args = Args::parse();
    let app_version = format!("v{}", env!("CARGO_PKG_VERSION"));

    let paths = AppPaths::discover()?;
    let config_file = args.config.clone().unwrap_or_else(|| paths.config_file());

    if args.paths {
        println!("App Paths:");
        println!("  Config: {}", config_file.display());
        println!("  Data:   {}", paths.data_dir.display());
        println!("  Log:    {}", paths.log_file().display());
        return Ok(());
    }

    let settings = Settings::resolve(&args, FileConfig::load(&config_file)?)?;
    logging::init_logging(&paths.log_file(), &settings.log_level)?;
    tracing::info!(
        version = %app_version,
        source = %settings.source_label(),
        "starting sheet-search"
    );

    if let Some(format) = args.export {
        let path = run_headless_export(&settings, format, args.query.as_deref(), args.all)?;
        println!("{}", path.display());
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = AppState::new(
        settings.theme,
        settings.rows_per_page,
        settings.source_label(),
        app_version,
    );

    let res = (|| -> Result<()> {
        load_initial_data(&mut terminal, &mut app, &settings)?;
        run_app(&mut terminal, &mut app, &settings)
    })();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

/// Loads, filters and writes one export without a terminal UI.
fn run_headless_export(
    settings: &Settings,
    format: ExportFormat,
    query: Option<&str>,
    all: bool,
) -> Result<PathBuf> {
    let dataset = data::load_dataset(&settings.source, settings.file.as_deref())?;

    let mut app = AppState::new(
        settings.theme,
        settings.rows_per_page,
        String::new(),
        String::new(),
    );
    app.apply_dataset(dataset);
    if let Some(query) = query {
        app.filter_text = query.to_string();
        app.update_filter();
    }
    if all {
        app.export_scope = ExportScope::All;
    }

    let artifact = app
        .render_export(format, data::today_utc())
        .with_context(|| format!("{format} export failed"))?;
    let path = data::write_artifact(&settings.export_dir, &artifact)?;
    tracing::info!(path = %path.display(), rows = app.export_rows().len(), "export written");
    Ok(path)
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    settings: &Settings,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    terminal.draw(|f| ui::ui(f, app))?;

    loop {
        if app.should_quit {
            break;
        }

        match event::read()? {
            Event::Key(key) => {
                if let Some(event) = crossterm_to_app_key_event(key.code, key.modifiers, key.kind)
                {
                    reducer::handle_key_event(app, event);
                }
                if let Some(action) = app.pending_action.take() {
                    handle_action(app, action, settings);
                }
                terminal.draw(|f| ui::ui(f, app))?;
            }
            Event::Mouse(mouse) => {
                let redraw = crossterm_to_app_mouse_event(&mouse)
                    .is_some_and(|event| reducer::handle_mouse_event(app, event));
                if redraw {
                    terminal.draw(|f| ui::ui(f, app))?;
                }
            }
            Event::Resize(_, _) => {
                terminal.draw(|f| ui::ui(f, app))?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Draws the loading frame, then performs the one fetch. A failed load is
/// logged and leaves the table empty; it does not end the session.
fn load_initial_data<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    settings: &Settings,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    terminal.draw(|f| ui::ui(f, app))?;

    match data::load_dataset(&settings.source, settings.file.as_deref()) {
        Ok(dataset) => {
            tracing::info!(rows = dataset.len(), "data loaded");
            app.apply_dataset(dataset);
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to load data");
            app.mark_load_failed(format!("Failed to load data: {err}"));
        }
    }
    Ok(())
}

fn handle_action(app: &mut AppState, action: AppAction, settings: &Settings) {
    match action {
        AppAction::Export(format) => {
            let result = app
                .render_export(format, data::today_utc())
                .map_err(anyhow::Error::from)
                .and_then(|artifact| data::write_artifact(&settings.export_dir, &artifact));
            match result {
                Ok(path) => {
                    tracing::info!(%format, path = %path.display(), "export written");
                    app.set_status(format!("Saved {}", path.display()), false);
                }
                Err(err) => {
                    tracing::error!(%format, error = %err, "export failed");
                    app.set_status(format!("Export failed: {err}"), true);
                }
            }
        }
    }
}
