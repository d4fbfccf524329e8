//! Terminal UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};
use shelfmark_core::{
    AnnotationField, AnnotationKind, App, BookField, InputTarget, KeyValueStore, Mode,
    ProgressTrack, Screen, StatFilter,
};

// Catppuccin Mocha colors
const SURFACE0: Color = Color::Rgb(49, 50, 68);
const SURFACE1: Color = Color::Rgb(69, 71, 90);
const TEXT: Color = Color::Rgb(205, 214, 244);
const SUBTEXT0: Color = Color::Rgb(166, 173, 200);
const RED: Color = Color::Rgb(243, 139, 168);
const YELLOW: Color = Color::Rgb(249, 226, 175);
const GREEN: Color = Color::Rgb(166, 227, 161);
const BLUE: Color = Color::Rgb(137, 180, 250);
const MAUVE: Color = Color::Rgb(203, 166, 247);
const TEAL: Color = Color::Rgb(148, 226, 213);

pub fn draw<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_title_bar(frame, app, chunks[0]);
    match app.screen {
        Screen::Home => draw_home(frame, app, chunks[1]),
        Screen::Book => draw_book(frame, app, chunks[1]),
    }
    draw_status_bar(frame, app, chunks[2]);

    match (app.mode, app.input_target) {
        (Mode::Input, InputTarget::Book) => draw_book_form(frame, app),
        (Mode::Input, InputTarget::Annotation) => draw_annotation_form(frame, app),
        (Mode::Input, InputTarget::ImportPath) => draw_import_dialog(frame, app),
        (Mode::ConfirmDelete, _) => draw_confirm(frame, app),
        (Mode::Help, _) => draw_help(frame),
        _ => {}
    }
}

fn draw_title_bar<S: KeyValueStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let catalog = app.library.catalog();
    let title_text = format!(
        " Shelfmark - {} [{} books, {} annotations]",
        app.title(),
        catalog.len(),
        catalog.annotation_count()
    );

    let title_bar = Paragraph::new(title_text).style(Style::default().fg(TEXT).bg(SURFACE0));
    frame.render_widget(title_bar, area);
}

fn draw_home<S: KeyValueStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let searching = app.mode == Mode::Input && app.input_target == InputTarget::Search;
    let search = if searching {
        format!(" search: {}_ ", app.book_query.search)
    } else if app.book_query.search.is_empty() {
        String::new()
    } else {
        format!(" search: {} ", app.book_query.search)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BLUE))
        .title(format!("Books (by {}){search}", app.book_query.sort));

    let books = app.visible_books();
    if books.is_empty() {
        let hint = if app.library.catalog().is_empty() {
            "No books yet. Press 'a' to add one."
        } else {
            "No book matches the search."
        };
        let empty = Paragraph::new(hint).style(Style::default().fg(SUBTEXT0)).block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = books
        .iter()
        .enumerate()
        .map(|(i, book)| {
            let selected = i == app.book_selected;
            let marker = if selected { ">" } else { " " };
            let style = if selected {
                Style::default().fg(TEXT).bg(SURFACE1)
            } else {
                Style::default().fg(TEXT)
            };
            let pages = book
                .pages
                .map(|p| format!("{p} p."))
                .unwrap_or_else(|| "? p.".to_string());

            ListItem::new(vec![
                Line::from(Span::styled(
                    format!("{marker} {}", book.title),
                    style.add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!(
                        "   {}  ·  {}  ·  {} notes",
                        book.author,
                        pages,
                        book.annotations.len()
                    ),
                    style.fg(SUBTEXT0),
                )),
            ])
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn draw_book<S: KeyValueStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let Some(book) = app.current_book() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header + progress
            Constraint::Min(0),    // Annotations
        ])
        .split(area);

    let stats = app.stats();
    let active = |stat: StatFilter| {
        if app.filter.stat() == stat {
            Style::default().fg(MAUVE).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(SUBTEXT0)
        }
    };
    let header = vec![
        Line::from(vec![
            Span::styled(book.author.clone(), Style::default().fg(TEXT)),
            Span::styled(
                book.pages.map(|p| format!("  ·  {p} pages")).unwrap_or_default(),
                Style::default().fg(SUBTEXT0),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                format!("[1] {} questions", stats.questions),
                active(StatFilter::Questions),
            ),
            Span::raw("   "),
            Span::styled(
                format!("[2] {} non-questions", stats.non_questions),
                active(StatFilter::NonQuestions),
            ),
            Span::raw("   "),
            Span::styled(
                format!("[t] type: {}", app.filter.kind().map_or("all", AnnotationKind::as_str)),
                Style::default().fg(SUBTEXT0),
            ),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::LEFT | Borders::RIGHT | Borders::TOP)
        .border_style(Style::default().fg(BLUE))
        .title(book.title.clone());
    let inner = block.inner(chunks[0]);
    frame.render_widget(block, chunks[0]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(1)])
        .split(inner);
    frame.render_widget(Paragraph::new(header), rows[0]);
    if let Some(track) = app.progress() {
        frame.render_widget(Paragraph::new(track_line(&track, rows[1].width)), rows[1]);
    }

    draw_annotations(frame, app, chunks[1]);
}

/// Progress bar with one colored run per annotation; only the end label
fn track_line(track: &ProgressTrack, width: u16) -> Line<'static> {
    let label = format!(" {}", track.total_pages);
    let columns = (width as usize).saturating_sub(label.len());
    let mut spans: Vec<Span> = track
        .cells(columns)
        .into_iter()
        .map(|cell| match cell {
            Some(kind) => Span::styled("█", Style::default().fg(kind_color(kind))),
            None => Span::styled("─", Style::default().fg(SURFACE1)),
        })
        .collect();
    spans.push(Span::styled(label, Style::default().fg(SUBTEXT0)));
    Line::from(spans)
}

fn draw_annotations<S: KeyValueStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BLUE));

    let Some(view) = app.annotation_view() else {
        frame.render_widget(block, area);
        return;
    };
    if view.annotations.is_empty() {
        let empty = Paragraph::new("No annotations. Press 'c' for a citation, 'Q' for a question.")
            .style(Style::default().fg(SUBTEXT0))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = view
        .annotations
        .iter()
        .enumerate()
        .map(|(i, ann)| {
            let selected = i == app.annotation_selected;
            let marker = if selected { ">" } else { " " };
            let base = if selected {
                Style::default().fg(TEXT).bg(SURFACE1)
            } else {
                Style::default().fg(TEXT)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{marker} p.{:<4} ", ann.page), base.fg(SUBTEXT0)),
                Span::styled(format!("{:<9}", ann.kind.as_str()), base.fg(kind_color(&ann.kind))),
                Span::styled(ann.text.replace('\n', " "), base),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn draw_status_bar<S: KeyValueStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let mode_str = match app.mode {
        Mode::Normal => "NORMAL",
        Mode::Input => "INPUT",
        Mode::ConfirmDelete => "CONFIRM",
        Mode::Help => "HELP",
    };

    let status = app.status_message.as_deref().unwrap_or("");

    let help_hint = match app.screen {
        Screen::Home => "j/k move | enter open | / search | a add book | c/Q note | ? help",
        Screen::Book => "esc back | c/Q note | enter edit | d delete | t type | p pdf | ? help",
    };

    let status_text = format!(
        " {} | {}",
        mode_str,
        if status.is_empty() { help_hint } else { status },
    );

    let status_bar = Paragraph::new(status_text).style(Style::default().fg(SUBTEXT0).bg(SURFACE0));
    frame.render_widget(status_bar, area);
}

fn form_line<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let (marker, style) = if focused {
        (">", Style::default().fg(TEXT).bg(SURFACE1))
    } else {
        (" ", Style::default().fg(TEXT))
    };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!("{marker} {label:<8}"), Style::default().fg(SUBTEXT0)),
        Span::styled(format!("{value}{cursor}"), style),
    ])
}

fn draw_book_form<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    let form = &app.book_form;
    let area = centered_rect(60, 7, frame.area());
    frame.render_widget(Clear, area);

    let title = if form.editing.is_some() { "Edit book" } else { "Add book" };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(GREEN))
        .title(format!("{title} (Tab next field, Enter save, Esc cancel)"));

    let lines = vec![
        form_line("Title", form.title.clone(), form.field == BookField::Title),
        form_line("Author", form.author.clone(), form.field == BookField::Author),
        form_line("Pages", form.pages.clone(), form.field == BookField::Pages),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_annotation_form<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    let form = &app.annotation_form;
    let area = centered_rect(70, 10, frame.area());
    frame.render_widget(Clear, area);

    let title = if form.editing.is_some() { "Edit annotation" } else { "Add annotation" };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(GREEN))
        .title(format!("{title} (Tab next field, Enter save, Esc cancel)"));

    let kind_focused = form.field == AnnotationField::Kind;
    let lines = vec![
        form_line("Page", form.page.clone(), form.field == AnnotationField::Page),
        Line::from(vec![
            Span::styled(
                format!("{} {:<8}", if kind_focused { ">" } else { " " }, "Type"),
                Style::default().fg(SUBTEXT0),
            ),
            Span::styled(
                form.kind.as_str().to_string(),
                Style::default().fg(kind_color(&form.kind)).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                if kind_focused { "  (space to change)" } else { "" },
                Style::default().fg(SUBTEXT0),
            ),
        ]),
        form_line("Text", form.text.clone(), form.field == AnnotationField::Text),
    ];
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn draw_import_dialog<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    let area = centered_rect(60, 3, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(GREEN))
        .title("Import JSON file (replaces the library)");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let input = Paragraph::new(format!("{}_", app.input_buffer)).style(Style::default().fg(TEXT));
    frame.render_widget(input, inner);
}

fn draw_confirm<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    let area = centered_rect(50, 5, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(RED))
        .title("Delete book");

    let text = vec![
        Line::from(format!("Delete \"{}\" and all its annotations?", app.title())),
        Line::from(Span::styled(
            "y to confirm, any other key to cancel",
            Style::default().fg(SUBTEXT0),
        )),
    ];
    frame.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), area);
}

fn draw_help(frame: &mut Frame) {
    let area = centered_rect(60, 24, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BLUE))
        .title("Help (press any key to close)");

    let heading = Style::default().fg(MAUVE).add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(Span::styled("Library", heading)),
        Line::from("  j/k      Move down/up"),
        Line::from("  Enter    Open book"),
        Line::from("  /        Search title or author"),
        Line::from("  s        Toggle sort (title/author)"),
        Line::from("  a        Add book"),
        Line::from(""),
        Line::from(Span::styled("Book", heading)),
        Line::from("  Esc      Back to library"),
        Line::from("  c / Q    Add citation / question"),
        Line::from("  Enter    Edit annotation"),
        Line::from("  d        Delete annotation"),
        Line::from("  t        Cycle type filter"),
        Line::from("  1 / 2    Only questions / non-questions"),
        Line::from("  E / D    Edit / delete book"),
        Line::from("  p        Export annotations as PDF"),
        Line::from(""),
        Line::from(Span::styled("File", heading)),
        Line::from("  e        Export library as JSON"),
        Line::from("  i        Import library from JSON"),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", Style::default().fg(SUBTEXT0))),
    ];

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn kind_color(kind: &AnnotationKind) -> Color {
    match kind {
        AnnotationKind::Citation => BLUE,
        AnnotationKind::Question => YELLOW,
        AnnotationKind::Other(_) => TEAL,
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
