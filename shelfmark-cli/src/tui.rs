//! Interactive terminal UI: event loop and key bindings.

use std::io::stdout;
use std::path::Path;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use shelfmark_core::{
    AnnotationKind, App, InputTarget, Mode, Screen, StatFilter, EXPORT_FILE_NAME,
};
use tracing::info;

use crate::commands::{self, FileLibrary};
use crate::io;
use crate::ui;

pub fn run(library: FileLibrary) -> Result<()> {
    let mut app = App::new(library);
    app.set_status("Press ? for help");

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App<io::FileStore>) -> Result<()> {
    info!(books = app.library.catalog().len(), "terminal UI started");
    while app.running {
        terminal.draw(|f| ui::draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            app.clear_status();

            match app.mode {
                Mode::Normal => match app.screen {
                    Screen::Home => handle_home(app, key.code),
                    Screen::Book => handle_book(app, key.code),
                },
                Mode::Input => handle_input_mode(app, key.code),
                Mode::ConfirmDelete => match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete_book(),
                    _ => app.cancel_confirm(),
                },
                Mode::Help => app.toggle_help(),
            }
        }
    }
    Ok(())
}

/// Keys shared by both screens; returns `true` when handled
fn handle_common(app: &mut App<io::FileStore>, code: KeyCode) -> bool {
    match code {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('c') => app.start_add_annotation(AnnotationKind::Citation),
        KeyCode::Char('Q') => app.start_add_annotation(AnnotationKind::Question),
        KeyCode::Char('i') => app.start_import(),
        KeyCode::Char('e') => export_json(app),
        _ => return false,
    }
    true
}

fn handle_home(app: &mut App<io::FileStore>, code: KeyCode) {
    if handle_common(app, code) {
        return;
    }
    match code {
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.open_highlighted_book(),
        KeyCode::Char('/') => app.start_search(),
        KeyCode::Char('s') => app.toggle_sort(),
        KeyCode::Char('a') => app.start_add_book(),
        _ => {}
    }
}

fn handle_book(app: &mut App<io::FileStore>, code: KeyCode) {
    if handle_common(app, code) {
        return;
    }
    match code {
        KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace => app.go_home(),
        KeyCode::Enter => app.start_edit_annotation(),
        KeyCode::Char('d') => {
            app.delete_selected_annotation();
        }
        KeyCode::Char('E') => app.start_edit_book(),
        KeyCode::Char('D') => app.request_delete_book(),
        KeyCode::Char('t') => app.cycle_kind_filter(),
        KeyCode::Char('1') => app.toggle_stat(StatFilter::Questions),
        KeyCode::Char('2') => app.toggle_stat(StatFilter::NonQuestions),
        KeyCode::Char('p') => export_pdf(app),
        _ => {}
    }
}

fn handle_input_mode(app: &mut App<io::FileStore>, code: KeyCode) {
    match code {
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Enter => {
            if app.input_target == InputTarget::ImportPath {
                import_file(app);
            } else {
                app.submit_input();
            }
        }
        KeyCode::Tab => app.input_next_field(),
        KeyCode::Backspace => app.input_backspace(),
        KeyCode::Char(c) => app.input_char(c),
        _ => {}
    }
}

fn import_file(app: &mut App<io::FileStore>) {
    let path = app.input_buffer.trim().to_string();
    app.input_buffer.clear();
    match io::read_text(Path::new(&path)) {
        Ok(json) => {
            app.import_json(&json);
        }
        Err(e) => {
            app.mode = Mode::Normal;
            app.set_status(&format!("Error: {e:#}"));
        }
    }
}

fn export_json(app: &mut App<io::FileStore>) {
    let result = app
        .library
        .export_json()
        .map_err(anyhow::Error::from)
        .and_then(|json| io::write_text(Path::new(EXPORT_FILE_NAME), &json));
    match result {
        Ok(()) => app.set_status(&format!("Exported to {EXPORT_FILE_NAME}")),
        Err(e) => app.set_status(&format!("Export failed: {e:#}")),
    }
}

fn export_pdf(app: &mut App<io::FileStore>) {
    let Some(book) = app.current_book() else {
        return;
    };
    match commands::export_pdf(book, Path::new(".")) {
        Ok(path) => app.set_status(&format!("Exported to {}", path.display())),
        Err(e) => app.set_status(&format!("Export failed: {e:#}")),
    }
}
