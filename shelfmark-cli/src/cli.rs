use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shelfmark_core::{AnnotationKind, SortKey};

#[derive(Debug, Parser)]
#[command(name = "shelfmark", author, version, about)]
pub struct Cli {
    /// Directory holding the library (default: ~/.shelfmark).
    #[arg(long, global = true, env = "SHELFMARK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Without a subcommand the interactive terminal UI starts.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, add, edit or delete books.
    Book {
        #[command(subcommand)]
        command: BookCommand,
    },
    /// Add, edit or delete annotations of a book.
    Note {
        #[command(subcommand)]
        command: NoteCommand,
    },
    /// Print a book's annotations, counts and progress track.
    Show(ShowArgs),
    /// Write the library or one book to a file.
    Export {
        #[command(subcommand)]
        command: ExportCommand,
    },
    /// Replace the whole library with a JSON export.
    Import(ImportArgs),
}

#[derive(Debug, Subcommand)]
pub enum BookCommand {
    List(BookListArgs),
    Add(BookAddArgs),
    Edit(BookEditArgs),
    Delete(BookRef),
}

#[derive(Debug, Args)]
pub struct BookListArgs {
    /// Case-insensitive match on title or author.
    #[arg(long, default_value = "")]
    pub search: String,

    /// Sort key (title or author).
    #[arg(long, default_value_t = SortKey::Title)]
    pub sort: SortKey,
}

#[derive(Debug, Args)]
pub struct BookAddArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub author: String,

    /// Page count; 0 leaves it unset.
    #[arg(long)]
    pub pages: Option<u32>,
}

#[derive(Debug, Args)]
pub struct BookEditArgs {
    /// Book id (or a unique prefix of it).
    pub book: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub author: Option<String>,

    /// New page count; 0 clears it.
    #[arg(long)]
    pub pages: Option<u32>,
}

#[derive(Debug, Args)]
pub struct BookRef {
    /// Book id (or a unique prefix of it).
    pub book: String,
}

#[derive(Debug, Subcommand)]
pub enum NoteCommand {
    Add(NoteAddArgs),
    Edit(NoteEditArgs),
    Delete(NoteRef),
}

#[derive(Debug, Args)]
pub struct NoteAddArgs {
    /// Book id (or a unique prefix of it).
    pub book: String,

    #[arg(long, default_value_t = 0)]
    pub page: u32,

    /// citation, question, or any other label.
    #[arg(long, default_value_t = AnnotationKind::Citation)]
    pub kind: AnnotationKind,

    #[arg(long)]
    pub text: String,
}

#[derive(Debug, Args)]
pub struct NoteEditArgs {
    pub book: String,

    /// Annotation id (or a unique prefix of it).
    pub note: String,

    #[arg(long)]
    pub page: Option<u32>,

    #[arg(long)]
    pub kind: Option<AnnotationKind>,

    #[arg(long)]
    pub text: Option<String>,
}

#[derive(Debug, Args)]
pub struct NoteRef {
    pub book: String,
    pub note: String,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Book id (or a unique prefix of it).
    pub book: String,

    /// Only annotations of this kind.
    #[arg(long, conflicts_with_all = ["questions", "non_questions"])]
    pub kind: Option<AnnotationKind>,

    /// Only questions.
    #[arg(long, conflicts_with = "non_questions")]
    pub questions: bool,

    /// Everything except questions.
    #[arg(long)]
    pub non_questions: bool,

    /// Width of the progress track in characters.
    #[arg(long, default_value_t = 60)]
    pub width: usize,
}

#[derive(Debug, Subcommand)]
pub enum ExportCommand {
    /// Whole library as a JSON array.
    Json(ExportJsonArgs),
    /// One book's annotations as a PDF document.
    Pdf(ExportPdfArgs),
}

#[derive(Debug, Args)]
pub struct ExportJsonArgs {
    #[arg(long, default_value = shelfmark_core::EXPORT_FILE_NAME)]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct ExportPdfArgs {
    pub book: String,

    /// Directory the document is written to.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    pub path: PathBuf,
}
