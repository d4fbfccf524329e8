//! Paginated text layout for the per-book annotation document.
//!
//! Coordinates are millimetres on an A4 portrait page, measured from the
//! top-left corner. A document generator (PDF or otherwise) only has to
//! place each line at its position using its style.

use crate::model::Book;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

const MARGIN_X: f32 = 10.0;
const TITLE_Y: f32 = 10.0;
const AUTHOR_Y: f32 = 18.0;
const FIRST_ENTRY_Y: f32 = 28.0;
const CONTINUATION_Y: f32 = 20.0;
const LINE_STEP: f32 = 8.0;
/// An entry starting below this line moves to a fresh page
const PAGE_BREAK_Y: f32 = 270.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    /// Bold, 16pt
    Heading,
    /// Bold, 12pt
    Subheading,
    /// Regular, 12pt
    Body,
}

impl TextStyle {
    pub fn font_size(&self) -> f32 {
        match self {
            TextStyle::Heading => 16.0,
            TextStyle::Subheading | TextStyle::Body => 12.0,
        }
    }

    pub fn is_bold(&self) -> bool {
        !matches!(self, TextStyle::Body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub x: f32,
    pub y: f32,
    pub style: TextStyle,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPage {
    pub lines: Vec<PlacedText>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub file_name: String,
    pub pages: Vec<LayoutPage>,
}

/// One printed line per annotation
pub fn entry_line(page: u32, kind: &str, text: &str) -> String {
    format!("[p.{page}] ({kind}) {text}")
}

/// Lay out a book's annotations, page-ascending, over as many pages as needed
pub fn layout_book(book: &Book) -> DocumentLayout {
    let author = if book.author.is_empty() {
        "-"
    } else {
        book.author.as_str()
    };

    let mut current = LayoutPage::default();
    current.lines.push(PlacedText {
        x: MARGIN_X,
        y: TITLE_Y,
        style: TextStyle::Heading,
        text: format!("Annotations of \"{}\"", book.title),
    });
    current.lines.push(PlacedText {
        x: MARGIN_X,
        y: AUTHOR_Y,
        style: TextStyle::Subheading,
        text: format!("Author: {author}"),
    });

    let mut pages = Vec::new();
    let mut y = FIRST_ENTRY_Y;
    for ann in book.annotations_by_page() {
        if y > PAGE_BREAK_Y {
            pages.push(std::mem::take(&mut current));
            y = CONTINUATION_Y;
        }
        current.lines.push(PlacedText {
            x: MARGIN_X,
            y,
            style: TextStyle::Body,
            text: entry_line(ann.page, ann.kind.as_str(), &ann.text),
        });
        y += LINE_STEP;
    }
    pages.push(current);

    DocumentLayout {
        file_name: document_file_name(&book.title),
        pages,
    }
}

/// `<title>.pdf`, or `annotations.pdf` for an untitled book
pub fn document_file_name(title: &str) -> String {
    let title = title.trim();
    let stem: String = if title.is_empty() {
        "annotations".to_string()
    } else {
        title
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '\0' => '-',
                c => c,
            })
            .collect()
    };
    format!("{stem}.pdf")
}
