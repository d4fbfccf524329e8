//! One-shot subcommands over the on-disk library.

use std::path::Path;

use anyhow::{bail, Context, Result};
use shelfmark_core::{
    layout_book, project_book, query_annotations, search_books, AnnotationDraft, AnnotationFilter,
    Book, BookDraft, BookQuery, Catalog, EntryId, Library, ProgressTrack, StatFilter,
};
use tracing::info;

use crate::cli::{
    BookAddArgs, BookCommand, BookEditArgs, BookListArgs, BookRef, ExportCommand, ImportArgs,
    NoteAddArgs, NoteCommand, NoteEditArgs, NoteRef, ShowArgs,
};
use crate::io::{self, FileStore};
use crate::pdf;

pub type FileLibrary = Library<FileStore>;

pub fn book(lib: &mut FileLibrary, command: BookCommand) -> Result<()> {
    match command {
        BookCommand::List(args) => list_books(lib, args),
        BookCommand::Add(args) => add_book(lib, args),
        BookCommand::Edit(args) => edit_book(lib, args),
        BookCommand::Delete(args) => delete_book(lib, args),
    }
}

pub fn note(lib: &mut FileLibrary, command: NoteCommand) -> Result<()> {
    match command {
        NoteCommand::Add(args) => add_note(lib, args),
        NoteCommand::Edit(args) => edit_note(lib, args),
        NoteCommand::Delete(args) => delete_note(lib, args),
    }
}

fn list_books(lib: &FileLibrary, args: BookListArgs) -> Result<()> {
    let query = BookQuery {
        search: args.search,
        sort: args.sort,
    };
    for book in search_books(lib.catalog().books(), &query) {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            book.id,
            book.title,
            book.author,
            book.pages.map_or_else(|| "-".to_string(), |p| p.to_string()),
            book.annotations.len()
        );
    }
    Ok(())
}

fn add_book(lib: &mut FileLibrary, args: BookAddArgs) -> Result<()> {
    let id = lib
        .add_book(BookDraft::new(args.title, args.author, args.pages))
        .context("add book")?;
    info!(%id, "book added");
    println!("{id}");
    Ok(())
}

fn edit_book(lib: &mut FileLibrary, args: BookEditArgs) -> Result<()> {
    let id = resolve_book(lib.catalog(), &args.book)?;
    let current = lib.book(&id).context("book vanished")?;
    let draft = BookDraft::new(
        args.title.unwrap_or_else(|| current.title.clone()),
        args.author.unwrap_or_else(|| current.author.clone()),
        args.pages.or(current.pages),
    );
    if !lib.edit_book(&id, draft).context("edit book")? {
        bail!("no book with id {id}");
    }
    println!("{id}");
    Ok(())
}

fn delete_book(lib: &mut FileLibrary, args: BookRef) -> Result<()> {
    let id = resolve_book(lib.catalog(), &args.book)?;
    let removed = lib
        .delete_book(&id)
        .context("delete book")?
        .with_context(|| format!("no book with id {id}"))?;
    info!(%id, annotations = removed.annotations.len(), "book deleted");
    println!("deleted {:?} and {} annotations", removed.title, removed.annotations.len());
    Ok(())
}

fn add_note(lib: &mut FileLibrary, args: NoteAddArgs) -> Result<()> {
    let book = resolve_book(lib.catalog(), &args.book)?;
    let id = lib
        .add_annotation(&book, AnnotationDraft::new(args.page, args.kind, args.text))
        .context("add annotation")?
        .with_context(|| format!("no book with id {book}"))?;
    println!("{id}");
    Ok(())
}

fn edit_note(lib: &mut FileLibrary, args: NoteEditArgs) -> Result<()> {
    let book_id = resolve_book(lib.catalog(), &args.book)?;
    let book = lib.book(&book_id).context("book vanished")?;
    let note_id = resolve_note(book, &args.note)?;
    let current = book.annotation(&note_id).context("annotation vanished")?;
    let draft = AnnotationDraft::new(
        args.page.unwrap_or(current.page),
        args.kind.unwrap_or_else(|| current.kind.clone()),
        args.text.unwrap_or_else(|| current.text.clone()),
    );
    if !lib
        .edit_annotation(&book_id, &note_id, draft)
        .context("edit annotation")?
    {
        bail!("no annotation with id {note_id}");
    }
    println!("{note_id}");
    Ok(())
}

fn delete_note(lib: &mut FileLibrary, args: NoteRef) -> Result<()> {
    let book_id = resolve_book(lib.catalog(), &args.book)?;
    let note_id = resolve_note(lib.book(&book_id).context("book vanished")?, &args.note)?;
    lib.delete_annotation(&book_id, &note_id)
        .context("delete annotation")?
        .with_context(|| format!("no annotation with id {note_id}"))?;
    println!("deleted {note_id}");
    Ok(())
}

pub fn show(lib: &FileLibrary, args: ShowArgs) -> Result<()> {
    let id = resolve_book(lib.catalog(), &args.book)?;
    let book = lib.book(&id).context("book vanished")?;

    let mut filter = AnnotationFilter::All;
    if let Some(kind) = args.kind {
        filter.select_kind(Some(kind));
    } else if args.questions {
        filter.toggle_stat(StatFilter::Questions);
    } else if args.non_questions {
        filter.toggle_stat(StatFilter::NonQuestions);
    }
    let view = query_annotations(&book.annotations, &filter);

    println!("{} by {}", book.title, book.author);
    println!(
        "questions: {}  non-questions: {}",
        view.stats.questions, view.stats.non_questions
    );
    println!("{}", track_line(&project_book(book), args.width));
    for ann in &view.annotations {
        println!("{}  [p.{}] ({}) {}", ann.id, ann.page, ann.kind, ann.text);
    }
    Ok(())
}

/// Text rendering of the progress track, end label only
fn track_line(track: &ProgressTrack, width: usize) -> String {
    let cells: String = track
        .cells(width)
        .into_iter()
        .map(|cell| match cell {
            None => '·',
            Some(kind) if kind.is_question() => '?',
            Some(_) => '|',
        })
        .collect();
    format!("[{cells}] {}", track.total_pages)
}

pub fn export(lib: &FileLibrary, command: ExportCommand) -> Result<()> {
    match command {
        ExportCommand::Json(args) => {
            let json = lib.export_json().context("export library")?;
            io::write_text(&args.out, &json)?;
            info!(path = %args.out.display(), books = lib.catalog().len(), "library exported");
            println!("{}", args.out.display());
        }
        ExportCommand::Pdf(args) => {
            let id = resolve_book(lib.catalog(), &args.book)?;
            let path = export_pdf(lib.book(&id).context("book vanished")?, &args.out)?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

pub fn export_pdf(book: &Book, dir: &Path) -> Result<std::path::PathBuf> {
    let layout = layout_book(book);
    let path = pdf::write(&layout, dir).context("export PDF")?;
    info!(path = %path.display(), pages = layout.pages.len(), "annotations exported");
    Ok(path)
}

pub fn import(lib: &mut FileLibrary, args: ImportArgs) -> Result<()> {
    let json = io::read_text(&args.path)?;
    let count = lib
        .import_json(&json)
        .map_err(|err| anyhow::anyhow!("{}: {err}", err.user_message()))
        .with_context(|| format!("import {}", args.path.display()))?;
    println!("imported {count} books");
    Ok(())
}

/// Exact id, or an unambiguous prefix of one
fn resolve_book(catalog: &Catalog, key: &str) -> Result<EntryId> {
    resolve(catalog.books().iter().map(|b| &b.id), key, "book")
}

fn resolve_note(book: &Book, key: &str) -> Result<EntryId> {
    resolve(book.annotations.iter().map(|a| &a.id), key, "annotation")
}

fn resolve<'a>(
    ids: impl Iterator<Item = &'a EntryId> + Clone,
    key: &str,
    what: &str,
) -> Result<EntryId> {
    if let Some(exact) = ids.clone().find(|id| id.as_str() == key) {
        return Ok(exact.clone());
    }
    let mut matches = ids.filter(|id| !key.is_empty() && id.as_str().starts_with(key));
    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(id.clone()),
        (Some(_), Some(_)) => bail!("{what} id {key:?} is ambiguous"),
        (None, _) => bail!("no {what} with id {key:?}"),
    }
}
