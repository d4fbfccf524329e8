use tracing::warn;

use crate::error::LibraryError;
use crate::model::{
    parse_number_prefix, Annotation, AnnotationDraft, AnnotationKind, Book, BookDraft, EntryId,
};
use crate::progress::{self, ProgressTrack};
use crate::query::{
    self, AnnotationFilter, AnnotationStats, AnnotationView, BookQuery, StatFilter,
};
use crate::store::{KeyValueStore, Library};

/// Which page is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Book,
}

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Input,
    ConfirmDelete,
    Help,
}

/// Input target for text input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    Search,
    Book,
    Annotation,
    ImportPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookField {
    #[default]
    Title,
    Author,
    Pages,
}

impl BookField {
    fn next(self) -> Self {
        match self {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Pages,
            BookField::Pages => BookField::Title,
        }
    }
}

/// Book add/edit form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    /// `None` when adding
    pub editing: Option<EntryId>,
    pub title: String,
    pub author: String,
    pub pages: String,
    pub field: BookField,
}

impl BookForm {
    fn draft(&self) -> BookDraft {
        BookDraft::new(&self.title, &self.author, parse_number_prefix(&self.pages))
    }

    fn focused(&mut self) -> &mut String {
        match self.field {
            BookField::Title => &mut self.title,
            BookField::Author => &mut self.author,
            BookField::Pages => &mut self.pages,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnotationField {
    Page,
    Kind,
    #[default]
    Text,
}

impl AnnotationField {
    fn next(self) -> Self {
        match self {
            AnnotationField::Page => AnnotationField::Kind,
            AnnotationField::Kind => AnnotationField::Text,
            AnnotationField::Text => AnnotationField::Page,
        }
    }
}

/// Annotation add/edit form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationForm {
    /// `None` when adding
    pub editing: Option<EntryId>,
    pub page: String,
    pub kind: AnnotationKind,
    pub text: String,
    pub field: AnnotationField,
}

impl AnnotationForm {
    fn draft(&self) -> AnnotationDraft {
        AnnotationDraft::new(
            parse_number_prefix(&self.page).unwrap_or(0),
            self.kind.clone(),
            &self.text,
        )
    }
}

/// Platform-agnostic application state
pub struct App<S> {
    pub library: Library<S>,
    pub screen: Screen,
    pub mode: Mode,
    pub running: bool,

    // Home state
    pub book_query: BookQuery,
    pub book_selected: usize,

    // Book state
    pub current_book: Option<EntryId>,
    pub filter: AnnotationFilter,
    pub annotation_selected: usize,

    // Input state
    pub input_target: InputTarget,
    pub input_buffer: String,
    pub book_form: BookForm,
    pub annotation_form: AnnotationForm,

    // Status message
    pub status_message: Option<String>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(library: Library<S>) -> Self {
        Self {
            library,
            screen: Screen::Home,
            mode: Mode::Normal,
            running: true,

            book_query: BookQuery::default(),
            book_selected: 0,

            current_book: None,
            filter: AnnotationFilter::All,
            annotation_selected: 0,

            input_target: InputTarget::Search,
            input_buffer: String::new(),
            book_form: BookForm::default(),
            annotation_form: AnnotationForm::default(),

            status_message: None,
        }
    }

    /// Books matching the current search, in display order
    pub fn visible_books(&self) -> Vec<&Book> {
        query::search_books(self.library.catalog().books(), &self.book_query)
    }

    /// Book highlighted on the home screen
    pub fn highlighted_book(&self) -> Option<&Book> {
        self.visible_books().get(self.book_selected).copied()
    }

    pub fn current_book(&self) -> Option<&Book> {
        self.library.book(self.current_book.as_ref()?)
    }

    pub fn annotation_view(&self) -> Option<AnnotationView<'_>> {
        let book = self.current_book()?;
        Some(query::query_annotations(&book.annotations, &self.filter))
    }

    pub fn stats(&self) -> AnnotationStats {
        self.current_book()
            .map(|b| AnnotationStats::of(&b.annotations))
            .unwrap_or_default()
    }

    pub fn progress(&self) -> Option<ProgressTrack> {
        self.current_book().map(progress::project_book)
    }

    pub fn selected_annotation(&self) -> Option<&Annotation> {
        self.annotation_view()?
            .annotations
            .get(self.annotation_selected)
            .copied()
    }

    pub fn move_down(&mut self) {
        match self.screen {
            Screen::Home => {
                let count = self.visible_books().len();
                if count > 0 {
                    self.book_selected = (self.book_selected + 1) % count;
                }
            }
            Screen::Book => {
                let count = self.shown_annotation_count();
                if count > 0 {
                    self.annotation_selected = (self.annotation_selected + 1) % count;
                }
            }
        }
    }

    pub fn move_up(&mut self) {
        let count = match self.screen {
            Screen::Home => self.visible_books().len(),
            Screen::Book => self.shown_annotation_count(),
        };
        let selected = match self.screen {
            Screen::Home => &mut self.book_selected,
            Screen::Book => &mut self.annotation_selected,
        };
        if count > 0 {
            *selected = if *selected == 0 { count - 1 } else { *selected - 1 };
        }
    }

    pub fn open_highlighted_book(&mut self) {
        if let Some(id) = self.highlighted_book().map(|b| b.id.clone()) {
            self.open_book(id);
        }
    }

    pub fn open_book(&mut self, id: EntryId) {
        if self.library.book(&id).is_none() {
            return;
        }
        self.current_book = Some(id);
        self.annotation_selected = 0;
        self.screen = Screen::Book;
    }

    /// Back to the book list; the stat toggles do not survive leaving a book
    pub fn go_home(&mut self) {
        self.current_book = None;
        if self.filter.stat() != StatFilter::All {
            self.filter = AnnotationFilter::All;
        }
        self.screen = Screen::Home;
        self.clamp_selection();
    }

    pub fn toggle_sort(&mut self) {
        self.book_query.sort = self.book_query.sort.toggle();
        self.set_status(&format!("Sorted by {}", self.book_query.sort));
    }

    /// Step the kind filter: all → each available kind → all
    pub fn cycle_kind_filter(&mut self) {
        let Some(book) = self.current_book() else {
            return;
        };
        let kinds = query::available_kinds(&book.annotations);
        let next = match self.filter.kind() {
            None => kinds.first().cloned(),
            Some(current) => kinds
                .iter()
                .position(|k| k == current)
                .and_then(|i| kinds.get(i + 1))
                .cloned(),
        };
        self.filter.select_kind(next);
        self.annotation_selected = 0;
    }

    pub fn toggle_stat(&mut self, stat: StatFilter) {
        self.filter.toggle_stat(stat);
        self.annotation_selected = 0;
    }

    pub fn start_search(&mut self) {
        self.input_target = InputTarget::Search;
        self.mode = Mode::Input;
    }

    pub fn start_import(&mut self) {
        self.input_buffer.clear();
        self.input_target = InputTarget::ImportPath;
        self.mode = Mode::Input;
    }

    pub fn start_add_book(&mut self) {
        self.book_form = BookForm::default();
        self.input_target = InputTarget::Book;
        self.mode = Mode::Input;
    }

    pub fn start_edit_book(&mut self) {
        let Some(book) = self.current_book() else {
            return;
        };
        self.book_form = BookForm {
            editing: Some(book.id.clone()),
            title: book.title.clone(),
            author: book.author.clone(),
            pages: book.pages.map(|p| p.to_string()).unwrap_or_default(),
            field: BookField::Title,
        };
        self.input_target = InputTarget::Book;
        self.mode = Mode::Input;
    }

    /// New annotation of `kind`. From the home screen the highlighted
    /// book is opened first.
    pub fn start_add_annotation(&mut self, kind: AnnotationKind) {
        if self.screen == Screen::Home {
            self.open_highlighted_book();
        }
        if self.current_book().is_none() {
            self.set_status("Add a book first");
            return;
        }
        self.annotation_form = AnnotationForm {
            kind,
            ..AnnotationForm::default()
        };
        self.input_target = InputTarget::Annotation;
        self.mode = Mode::Input;
    }

    pub fn start_edit_annotation(&mut self) {
        let Some(ann) = self.selected_annotation() else {
            return;
        };
        self.annotation_form = AnnotationForm {
            editing: Some(ann.id.clone()),
            page: if ann.page == 0 {
                String::new()
            } else {
                ann.page.to_string()
            },
            kind: ann.kind.clone(),
            text: ann.text.clone(),
            field: AnnotationField::Text,
        };
        self.input_target = InputTarget::Annotation;
        self.mode = Mode::Input;
    }

    pub fn input_char(&mut self, c: char) {
        match self.input_target {
            InputTarget::Search => {
                self.book_query.search.push(c);
                self.clamp_selection();
            }
            InputTarget::ImportPath => self.input_buffer.push(c),
            InputTarget::Book => self.book_form.focused().push(c),
            InputTarget::Annotation => match self.annotation_form.field {
                AnnotationField::Page => self.annotation_form.page.push(c),
                AnnotationField::Text => self.annotation_form.text.push(c),
                AnnotationField::Kind => {
                    if c == ' ' {
                        self.cycle_form_kind();
                    }
                }
            },
        }
    }

    pub fn input_backspace(&mut self) {
        match self.input_target {
            InputTarget::Search => {
                self.book_query.search.pop();
                self.clamp_selection();
            }
            InputTarget::ImportPath => {
                self.input_buffer.pop();
            }
            InputTarget::Book => {
                self.book_form.focused().pop();
            }
            InputTarget::Annotation => match self.annotation_form.field {
                AnnotationField::Page => {
                    self.annotation_form.page.pop();
                }
                AnnotationField::Text => {
                    self.annotation_form.text.pop();
                }
                AnnotationField::Kind => {}
            },
        }
    }

    /// Move focus to the next form field
    pub fn input_next_field(&mut self) {
        match self.input_target {
            InputTarget::Book => self.book_form.field = self.book_form.field.next(),
            InputTarget::Annotation => {
                self.annotation_form.field = self.annotation_form.field.next()
            }
            InputTarget::Search | InputTarget::ImportPath => {}
        }
    }

    pub fn cycle_form_kind(&mut self) {
        self.annotation_form.kind = self.annotation_form.kind.cycle();
    }

    pub fn cancel_input(&mut self) {
        if self.input_target == InputTarget::Search {
            self.book_query.search.clear();
            self.clamp_selection();
        }
        self.input_buffer.clear();
        self.mode = Mode::Normal;
    }

    /// Submit the active form. Validation notices keep the form open.
    ///
    /// Import paths are read by the frontend, which then calls
    /// [`App::import_json`].
    pub fn submit_input(&mut self) {
        match self.input_target {
            InputTarget::Search | InputTarget::ImportPath => self.mode = Mode::Normal,
            InputTarget::Book => self.submit_book_form(),
            InputTarget::Annotation => self.submit_annotation_form(),
        }
    }

    fn submit_book_form(&mut self) {
        let draft = self.book_form.draft();
        let result = match self.book_form.editing.clone() {
            Some(id) => self.library.edit_book(&id, draft).map(|_| "Book updated"),
            None => self.library.add_book(draft).map(|_| "Book added"),
        };
        self.finish_form(result);
    }

    fn submit_annotation_form(&mut self) {
        let Some(book_id) = self.current_book.clone() else {
            self.mode = Mode::Normal;
            return;
        };
        let draft = self.annotation_form.draft();
        let result = match self.annotation_form.editing.clone() {
            Some(id) => self
                .library
                .edit_annotation(&book_id, &id, draft)
                .map(|_| "Annotation updated"),
            None => self
                .library
                .add_annotation(&book_id, draft)
                .map(|_| "Annotation added"),
        };
        self.finish_form(result);
    }

    fn finish_form(&mut self, result: Result<&str, LibraryError>) {
        match result {
            Ok(message) => {
                self.mode = Mode::Normal;
                self.clamp_selection();
                self.set_status(message);
            }
            Err(err) => self.report(&err),
        }
    }

    pub fn delete_selected_annotation(&mut self) -> bool {
        let (Some(book_id), Some(id)) = (
            self.current_book.clone(),
            self.selected_annotation().map(|a| a.id.clone()),
        ) else {
            return false;
        };
        match self.library.delete_annotation(&book_id, &id) {
            Ok(Some(_)) => {
                self.clamp_selection();
                self.set_status("Annotation deleted");
                true
            }
            Ok(None) => false,
            Err(err) => {
                self.report(&err);
                false
            }
        }
    }

    /// Ask before deleting the open book
    pub fn request_delete_book(&mut self) {
        if self.current_book().is_some() {
            self.mode = Mode::ConfirmDelete;
        }
    }

    pub fn confirm_delete_book(&mut self) {
        self.mode = Mode::Normal;
        let Some(id) = self.current_book.clone() else {
            return;
        };
        match self.library.delete_book(&id) {
            Ok(_) => {
                self.go_home();
                self.set_status("Book deleted");
            }
            Err(err) => self.report(&err),
        }
    }

    pub fn cancel_confirm(&mut self) {
        self.mode = Mode::Normal;
    }

    /// Replace the catalog with an imported document
    pub fn import_json(&mut self, json: &str) -> bool {
        self.mode = Mode::Normal;
        match self.library.import_json(json) {
            Ok(count) => {
                self.go_home();
                self.book_selected = 0;
                self.set_status(&format!("Imported {count} books"));
                true
            }
            Err(err) => {
                self.report(&err);
                false
            }
        }
    }

    pub fn toggle_help(&mut self) {
        self.mode = if self.mode == Mode::Help {
            Mode::Normal
        } else {
            Mode::Help
        };
    }

    /// Set status message
    pub fn set_status(&mut self, msg: &str) {
        self.status_message = Some(msg.to_string());
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn report(&mut self, err: &LibraryError) {
        warn!(error = %err, "operation rejected");
        self.set_status(&err.user_message());
    }

    /// Get title for display
    pub fn title(&self) -> String {
        self.current_book()
            .map(|b| b.title.clone())
            .unwrap_or_else(|| "Library".to_string())
    }

    fn shown_annotation_count(&self) -> usize {
        self.annotation_view()
            .map(|v| v.annotations.len())
            .unwrap_or(0)
    }

    fn clamp_selection(&mut self) {
        let books = self.visible_books().len();
        if self.book_selected >= books {
            self.book_selected = books.saturating_sub(1);
        }
        let shown = self.shown_annotation_count();
        if self.annotation_selected >= shown {
            self.annotation_selected = shown.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn app() -> App<MemoryStore> {
        App::new(Library::load(MemoryStore::new()).unwrap())
    }

    fn type_text(app: &mut App<MemoryStore>, text: &str) {
        for c in text.chars() {
            app.input_char(c);
        }
    }

    fn add_book(app: &mut App<MemoryStore>, title: &str, author: &str) {
        app.start_add_book();
        type_text(app, title);
        app.input_next_field();
        type_text(app, author);
        app.submit_input();
    }

    #[test]
    fn test_add_book_through_form() {
        let mut app = app();
        add_book(&mut app, "Dune", "Herbert");
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.visible_books().len(), 1);
        assert_eq!(app.status_message.as_deref(), Some("Book added"));
    }

    #[test]
    fn test_invalid_form_stays_open_with_notice() {
        let mut app = app();
        add_book(&mut app, "Dune", "");
        assert_eq!(app.mode, Mode::Input);
        assert_eq!(
            app.status_message.as_deref(),
            Some("author must not be empty")
        );
        assert!(app.library.catalog().is_empty());
    }

    #[test]
    fn test_question_from_home_opens_highlighted_book() {
        let mut app = app();
        add_book(&mut app, "Dune", "Herbert");
        app.start_add_annotation(AnnotationKind::Question);
        assert_eq!(app.screen, Screen::Book);
        assert_eq!(app.annotation_form.kind, AnnotationKind::Question);

        type_text(&mut app, "Why spice?");
        app.input_next_field();
        type_text(&mut app, "12");
        app.submit_input();

        let ann = app.selected_annotation().unwrap();
        assert_eq!(ann.page, 12);
        assert_eq!(ann.text, "Why spice?");
        assert_eq!(app.stats().questions, 1);
    }

    #[test]
    fn test_annotation_without_book() {
        let mut app = app();
        app.start_add_annotation(AnnotationKind::Citation);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.status_message.as_deref(), Some("Add a book first"));
    }

    #[test]
    fn test_kind_filter_cycles_back_to_all() {
        let mut app = app();
        add_book(&mut app, "Dune", "Herbert");
        app.open_highlighted_book();
        app.cycle_kind_filter();
        assert_eq!(app.filter, AnnotationFilter::Kind(AnnotationKind::Citation));
        app.cycle_kind_filter();
        assert_eq!(app.filter, AnnotationFilter::Kind(AnnotationKind::Question));
        app.cycle_kind_filter();
        assert_eq!(app.filter, AnnotationFilter::All);
    }

    #[test]
    fn test_going_home_resets_stat_toggle() {
        let mut app = app();
        add_book(&mut app, "Dune", "Herbert");
        app.open_highlighted_book();
        app.toggle_stat(StatFilter::Questions);
        app.go_home();
        assert_eq!(app.filter, AnnotationFilter::All);
        assert_eq!(app.screen, Screen::Home);
    }

    #[test]
    fn test_delete_book_needs_confirmation() {
        let mut app = app();
        add_book(&mut app, "Dune", "Herbert");
        app.open_highlighted_book();
        app.request_delete_book();
        assert_eq!(app.mode, Mode::ConfirmDelete);
        app.cancel_confirm();
        assert_eq!(app.library.catalog().len(), 1);

        app.request_delete_book();
        app.confirm_delete_book();
        assert!(app.library.catalog().is_empty());
        assert_eq!(app.screen, Screen::Home);
    }

    #[test]
    fn test_search_narrows_and_clamps_selection() {
        let mut app = app();
        add_book(&mut app, "Dune", "Herbert");
        add_book(&mut app, "Emma", "Austen");
        app.move_down();
        assert_eq!(app.book_selected, 1);

        app.start_search();
        type_text(&mut app, "dune");
        assert_eq!(app.visible_books().len(), 1);
        assert_eq!(app.book_selected, 0);

        app.cancel_input();
        assert_eq!(app.visible_books().len(), 2);
    }

    #[test]
    fn test_bad_import_keeps_catalog() {
        let mut app = app();
        add_book(&mut app, "Dune", "Herbert");
        assert!(!app.import_json("{\"not\":\"an array\"}"));
        assert_eq!(app.status_message.as_deref(), Some("Invalid JSON file."));
        assert_eq!(app.library.catalog().len(), 1);
    }
}
