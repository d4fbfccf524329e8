//! Terminal UI rendering for Shelfmark Web
//!
//! Same screens as the native terminal UI, drawn through ratzilla. Files are
//! picked and downloaded by the browser, so there is no path dialog.

use ratzilla::ratatui::{
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

    let title = format!(
        " Shelfmark (Web) - {} [{} books]",
        app.title(),
        app.library.catalog().len()
    );
    frame.render_widget(
        Paragraph::new(title).style(Style::default().fg(TEXT).bg(SURFACE0)),
        chunks[0],
    );

    match app.screen {
        Screen::Home => draw_books(frame, app, chunks[1]),
        Screen::Book => draw_book(frame, app, chunks[1]),
    }
    draw_status_bar(frame, app, chunks[2]);

    match (app.mode, app.input_target) {
        (Mode::Input, InputTarget::Book) => draw_book_form(frame, app),
        (Mode::Input, InputTarget::Annotation) => draw_annotation_form(frame, app),
        (Mode::ConfirmDelete, _) => draw_confirm(frame, app),
        (Mode::Help, _) => draw_help(frame),
        _ => {}
    }
}

fn draw_books<S: KeyValueStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let query = &app.book_query;
    let typing = app.mode == Mode::Input && app.input_target == InputTarget::Search;
    let title = match (typing, query.search.is_empty()) {
        (true, _) => format!("Books by {} - search: {}_", query.sort, query.search),
        (false, false) => format!("Books by {} - search: {}", query.sort, query.search),
        (false, true) => format!("Books by {}", query.sort),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BLUE))
        .title(title);

    let books = app.visible_books();
    if books.is_empty() {
        let hint = if app.library.catalog().is_empty() {
            "Your library is empty. Press 'a' to add a book or 'i' to import one."
        } else {
            "Nothing matches."
        };
        frame.render_widget(
            Paragraph::new(hint).style(Style::default().fg(SUBTEXT0)).block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = books
        .iter()
        .enumerate()
        .map(|(i, book)| {
            let style = if i == app.book_selected {
                Style::default().fg(TEXT).bg(SURFACE1)
            } else {
                Style::default().fg(TEXT)
            };
            let detail = match book.pages {
                Some(pages) => format!("   {} - {pages} pages", book.author),
                None => format!("   {}", book.author),
            };
            ListItem::new(vec![
                Line::from(Span::styled(
                    format!(" {}", book.title),
                    style.add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(detail, style.fg(SUBTEXT0))),
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
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let stats = app.stats();
    let toggle = |stat: StatFilter, label: String| {
        let style = if app.filter.stat() == stat {
            Style::default().fg(MAUVE).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(SUBTEXT0)
        };
        Span::styled(label, style)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BLUE))
        .title(book.title.clone());
    let inner = block.inner(chunks[0]);
    frame.render_widget(block, chunks[0]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);
    frame.render_widget(
        Paragraph::new(book.author.clone()).style(Style::default().fg(TEXT)),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            toggle(StatFilter::Questions, format!("{} questions", stats.questions)),
            Span::raw("  "),
            toggle(StatFilter::NonQuestions, format!("{} others", stats.non_questions)),
            Span::styled(
                format!("  type: {}", app.filter.kind().map_or("all", AnnotationKind::as_str)),
                Style::default().fg(SUBTEXT0),
            ),
        ])),
        rows[1],
    );
    if let Some(track) = app.progress() {
        frame.render_widget(Paragraph::new(progress_line(&track, rows[2].width)), rows[2]);
    }

    let list_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(SUBTEXT0))
        .title("Annotations");
    let view = app.annotation_view();
    let items: Vec<ListItem> = view
        .iter()
        .flat_map(|v| v.annotations.iter())
        .enumerate()
        .map(|(i, ann)| {
            let style = if i == app.annotation_selected {
                Style::default().fg(TEXT).bg(SURFACE1)
            } else {
                Style::default().fg(TEXT)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" p.{:<4}", ann.page), style.fg(SUBTEXT0)),
                Span::styled(format!("{:<9}", ann.kind.as_str()), style.fg(kind_color(&ann.kind))),
                Span::styled(ann.text.clone(), style),
            ]))
        })
        .collect();
    frame.render_widget(List::new(items).block(list_block), chunks[1]);
}

fn progress_line(track: &ProgressTrack, width: u16) -> Line<'static> {
    let end = format!(" {}", track.total_pages);
    let columns = (width as usize).saturating_sub(end.len());
    let mut spans: Vec<Span> = track
        .cells(columns)
        .into_iter()
        .map(|cell| match cell {
            Some(kind) => Span::styled("▮", Style::default().fg(kind_color(kind))),
            None => Span::styled("·", Style::default().fg(SURFACE1)),
        })
        .collect();
    spans.push(Span::styled(end, Style::default().fg(SUBTEXT0)));
    Line::from(spans)
}

fn draw_status_bar<S: KeyValueStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let status = app.status_message.as_deref().unwrap_or(match app.screen {
        Screen::Home => {
            "j/k move | enter open | / search | s sort | a add | i import | e export | ? help"
        }
        Screen::Book => {
            "esc back | c cite | Q ask | enter edit | d delete | t type | 1/2 counts | ? help"
        }
    });
    frame.render_widget(
        Paragraph::new(format!(" {status}")).style(Style::default().fg(SUBTEXT0).bg(SURFACE0)),
        area,
    );
}

fn field<'a>(label: &'a str, value: &str, focused: bool) -> Line<'a> {
    let style = if focused {
        Style::default().fg(TEXT).bg(SURFACE1)
    } else {
        Style::default().fg(TEXT)
    };
    Line::from(vec![
        Span::styled(format!(" {label:<7}"), Style::default().fg(SUBTEXT0)),
        Span::styled(format!("{value}{}", if focused { "_" } else { "" }), style),
    ])
}

fn dialog(frame: &mut Frame, width: u16, height: u16, color: Color, title: &str) -> Rect {
    let area = centered_rect(width, height, frame.area());
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title.to_string());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

fn draw_book_form<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    let form = &app.book_form;
    let title = if form.editing.is_some() { "Edit book" } else { "New book" };
    let inner = dialog(frame, 56, 6, GREEN, title);
    let lines = vec![
        field("Title", &form.title, form.field == BookField::Title),
        field("Author", &form.author, form.field == BookField::Author),
        field("Pages", &form.pages, form.field == BookField::Pages),
        Line::from(Span::styled(
            " tab next - enter save - esc cancel",
            Style::default().fg(SUBTEXT0),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_annotation_form<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    let form = &app.annotation_form;
    let title = if form.editing.is_some() { "Edit annotation" } else { "New annotation" };
    let inner = dialog(frame, 64, 9, GREEN, title);
    let kind_style = Style::default().fg(kind_color(&form.kind)).add_modifier(Modifier::BOLD);
    let kind_line = Line::from(vec![
        Span::styled(format!(" {:<7}", "Type"), Style::default().fg(SUBTEXT0)),
        if form.field == AnnotationField::Kind {
            Span::styled(format!("< {} >", form.kind), kind_style.bg(SURFACE1))
        } else {
            Span::styled(form.kind.to_string(), kind_style)
        },
    ]);
    let lines = vec![
        field("Page", &form.page, form.field == AnnotationField::Page),
        kind_line,
        field("Text", &form.text, form.field == AnnotationField::Text),
        Line::from(""),
        Line::from(Span::styled(
            " tab next - space changes type - enter save - esc cancel",
            Style::default().fg(SUBTEXT0),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_confirm<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    let inner = dialog(frame, 48, 4, RED, "Delete book?");
    let lines = vec![
        Line::from(format!(" \"{}\" and its annotations", app.title())),
        Line::from(Span::styled(
            " y delete - any other key keeps it",
            Style::default().fg(SUBTEXT0),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_help(frame: &mut Frame) {
    let inner = dialog(frame, 56, 20, BLUE, "Help (press any key to close)");
    let heading = Style::default().fg(MAUVE).add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(Span::styled("Library", heading)),
        Line::from("  j/k      Move down/up"),
        Line::from("  Enter    Open book"),
        Line::from("  /  s     Search, toggle sort"),
        Line::from("  a        Add book"),
        Line::from("  i  e     Import / download JSON"),
        Line::from(""),
        Line::from(Span::styled("Book", heading)),
        Line::from("  Esc      Back to library"),
        Line::from("  c  Q     Add citation / question"),
        Line::from("  Enter d  Edit / delete annotation"),
        Line::from("  t        Cycle type filter"),
        Line::from("  1  2     Questions / non-questions only"),
        Line::from("  E  D     Edit / delete book"),
    ];
    frame.render_widget(Paragraph::new(help_text), inner);
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
