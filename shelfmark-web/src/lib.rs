//! Shelfmark Web - WebAssembly build of the reading notebook
//!
//! The page renders the terminal UI into the DOM with Ratzilla and keeps the
//! library in `localStorage`. The service worker half lives in [`sw`].

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::Terminal;
use ratzilla::{event::KeyCode, DomBackend, WebRenderer};
use wasm_bindgen::prelude::*;

use shelfmark_core::{
    AnnotationKind, App, Library, Mode, Screen, StatFilter, EXPORT_FILE_NAME,
};

pub mod io;
pub mod sw;
mod ui;

use io::LocalStorage;

type SharedApp = Rc<RefCell<App<LocalStorage>>>;

/// Initialize the Shelfmark web application
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    // the service worker loads this module too, without a page to draw on
    if web_sys::window().is_none() {
        return Ok(());
    }

    let store = LocalStorage::open()?;
    let library = Library::load(store).map_err(|e| JsValue::from_str(&e.user_message()))?;
    let mut app = App::new(library);
    app.set_status("Welcome to Shelfmark! Press 'a' to add a book, '?' for help");

    let app_state: SharedApp = Rc::new(RefCell::new(app));

    let backend = DomBackend::new()
        .map_err(|e| JsValue::from_str(&format!("Failed to create backend: {:?}", e)))?;
    let mut terminal = Terminal::new(backend)
        .map_err(|e| JsValue::from_str(&format!("Failed to create terminal: {:?}", e)))?;

    terminal.on_key_event({
        let app_state = app_state.clone();
        move |event| {
            let mut app = app_state.borrow_mut();
            app.clear_status();

            let mode = app.mode;
            match mode {
                Mode::Normal => {
                    drop(app);
                    handle_normal_mode(&app_state, event.code);
                }
                Mode::Input => handle_input_mode(&mut app, event.code),
                Mode::ConfirmDelete => match event.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete_book(),
                    _ => app.cancel_confirm(),
                },
                Mode::Help => app.toggle_help(),
            }
        }
    });

    terminal.draw_web(move |frame| {
        let app = app_state.borrow();
        ui::draw(frame, &app);
    });

    web_sys::console::log_1(&"Shelfmark WASM initialized".into());

    Ok(())
}

fn handle_normal_mode(app_state: &SharedApp, code: KeyCode) {
    // the file picker calls back later, so it needs the shared handle
    if matches!(code, KeyCode::Char('i')) {
        import_json(app_state);
        return;
    }

    let mut app = app_state.borrow_mut();
    match code {
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('c') => app.start_add_annotation(AnnotationKind::Citation),
        KeyCode::Char('Q') => app.start_add_annotation(AnnotationKind::Question),
        KeyCode::Char('e') => export_json(&mut app),
        _ => match app.screen {
            Screen::Home => handle_home(&mut app, code),
            Screen::Book => handle_book(&mut app, code),
        },
    }
}

fn handle_home(app: &mut App<LocalStorage>, code: KeyCode) {
    match code {
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.open_highlighted_book(),
        KeyCode::Char('/') => app.start_search(),
        KeyCode::Char('s') => app.toggle_sort(),
        KeyCode::Char('a') => app.start_add_book(),
        _ => {}
    }
}

fn handle_book(app: &mut App<LocalStorage>, code: KeyCode) {
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
        _ => {}
    }
}

fn handle_input_mode(app: &mut App<LocalStorage>, code: KeyCode) {
    match code {
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Enter => app.submit_input(),
        KeyCode::Tab => app.input_next_field(),
        KeyCode::Backspace => app.input_backspace(),
        KeyCode::Char(c) => app.input_char(c),
        _ => {}
    }
}

fn export_json(app: &mut App<LocalStorage>) {
    match app.library.export_json() {
        Ok(json) => match io::download_json(EXPORT_FILE_NAME, &json) {
            Ok(()) => app.set_status(&format!("Exported to {EXPORT_FILE_NAME}")),
            Err(e) => app.set_status(&format!("Export failed: {}", io::describe(&e))),
        },
        Err(e) => app.report(&e),
    }
}

fn import_json(app_state: &SharedApp) {
    let target = Rc::clone(app_state);
    let picked = io::pick_json_file(move |text| {
        let mut app = target.borrow_mut();
        match text {
            Ok(json) => {
                app.import_json(&json);
            }
            Err(e) => {
                web_sys::console::error_1(&e);
                app.set_status("Could not read the JSON file.");
            }
        }
    });
    if let Err(e) = picked {
        web_sys::console::error_1(&e);
        app_state.borrow_mut().set_status("File picker unavailable");
    }
}
