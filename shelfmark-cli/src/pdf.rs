//! Render a [`DocumentLayout`] into a PDF with the standard Helvetica fonts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use shelfmark_core::layout::{PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use shelfmark_core::{DocumentLayout, PlacedText};

const PT_PER_MM: f32 = 72.0 / 25.4;
const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

pub fn render(layout: &DocumentLayout) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(font("Helvetica"));
    let bold = doc.add_object(font("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR_FONT => regular,
            BOLD_FONT => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content: Content<Vec<_>> = Content {
            operations: page.lines.iter().flat_map(text_operations).collect(),
        };
        let bytes = content.encode().context("encode page content")?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, bytes));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            (PAGE_WIDTH_MM * PT_PER_MM).into(),
            (PAGE_HEIGHT_MM * PT_PER_MM).into(),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out).context("serialize PDF")?;
    Ok(out)
}

/// Render and write into `dir` under the layout's file name
pub fn write(layout: &DocumentLayout, dir: &Path) -> Result<PathBuf> {
    let bytes = render(layout)?;
    let path = dir.join(&layout.file_name);
    std::fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Layout coordinates are millimetres from the top-left; PDF user space is
/// points from the bottom-left.
fn text_operations(line: &PlacedText) -> Vec<Operation> {
    let font = if line.style.is_bold() {
        BOLD_FONT
    } else {
        REGULAR_FONT
    };
    let x = line.x * PT_PER_MM;
    let y = (PAGE_HEIGHT_MM - line.y) * PT_PER_MM;

    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), line.style.font_size().into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(win_ansi(&line.text))]),
        Operation::new("ET", vec![]),
    ]
}

/// Encode for the standard fonts. Characters outside WinAnsi become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{a0}'..='\u{ff}' => c as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}
