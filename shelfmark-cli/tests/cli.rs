use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn shelfmark(data_dir: &Path) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("shelfmark");
    cmd.env("SHELFMARK_DATA_DIR", data_dir).env_remove("RUST_LOG");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap().trim().to_string()
}

fn add_book(dir: &Path, title: &str, author: &str) -> String {
    stdout_of(shelfmark(dir).args(["book", "add", "--title", title, "--author", author]))
}

#[test]
fn book_add_then_list() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_book(dir.path(), "Middlemarch", "George Eliot");

    shelfmark(dir.path())
        .args(["book", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()).and(predicate::str::contains("Middlemarch")));

    assert!(dir.path().join("library.json").exists());
}

#[test]
fn book_list_sorts_and_searches() {
    let dir = tempfile::tempdir().unwrap();
    add_book(dir.path(), "Beta", "Zed");
    add_book(dir.path(), "Alpha", "Young");

    let by_title = stdout_of(shelfmark(dir.path()).args(["book", "list"]));
    assert!(by_title.find("Alpha").unwrap() < by_title.find("Beta").unwrap());

    let by_author = stdout_of(shelfmark(dir.path()).args(["book", "list", "--sort", "author"]));
    assert!(by_author.find("Young").unwrap() < by_author.find("Zed").unwrap());

    let searched = stdout_of(shelfmark(dir.path()).args(["book", "list", "--search", "ZED"]));
    assert!(searched.contains("Beta"));
    assert!(!searched.contains("Alpha"));
}

#[test]
fn blank_title_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    shelfmark(dir.path())
        .args(["book", "add", "--title", "  ", "--author", "Someone"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("title must not be empty"));
}

#[test]
fn notes_show_filtered_and_page_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let book = add_book(dir.path(), "Dune", "Frank Herbert");

    let notes = [
        ("40", "citation", "fear is the mind-killer"),
        ("12", "question", "who are the Fremen?"),
    ];
    for (page, kind, text) in notes {
        shelfmark(dir.path())
            .args(["note", "add", book.as_str(), "--page", page])
            .args(["--kind", kind, "--text", text])
            .assert()
            .success();
    }

    let all = stdout_of(shelfmark(dir.path()).args(["show", book.as_str()]));
    assert!(all.contains("questions: 1  non-questions: 1"));
    assert!(all.find("[p.12]").unwrap() < all.find("[p.40]").unwrap());

    let questions = stdout_of(shelfmark(dir.path()).args(["show", book.as_str(), "--questions"]));
    assert!(questions.contains("Fremen"));
    assert!(!questions.contains("mind-killer"));
    // counts cover the whole book
    assert!(questions.contains("questions: 1  non-questions: 1"));
}

#[test]
fn show_rejects_kind_together_with_stat_toggle() {
    let dir = tempfile::tempdir().unwrap();
    let book = add_book(dir.path(), "Dune", "Frank Herbert");
    shelfmark(dir.path())
        .args(["show", book.as_str(), "--kind", "citation", "--questions"])
        .assert()
        .failure();
}

#[test]
fn note_edit_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let book = add_book(dir.path(), "Emma", "Jane Austen");
    let note = stdout_of(shelfmark(dir.path()).args([
        "note",
        "add",
        book.as_str(),
        "--text",
        "first draft",
    ]));

    shelfmark(dir.path())
        .args(["note", "edit", book.as_str(), note.as_str(), "--text", "final"])
        .assert()
        .success();
    let shown = stdout_of(shelfmark(dir.path()).args(["show", book.as_str()]));
    assert!(shown.contains("(citation) final"));

    shelfmark(dir.path())
        .args(["note", "delete", book.as_str(), note.as_str()])
        .assert()
        .success();
    let shown = stdout_of(shelfmark(dir.path()).args(["show", book.as_str()]));
    assert!(!shown.contains("final"));
}

#[test]
fn book_delete_removes_it() {
    let dir = tempfile::tempdir().unwrap();
    let book = add_book(dir.path(), "Emma", "Jane Austen");

    shelfmark(dir.path()).args(["book", "delete", book.as_str()]).assert().success();
    let listed = stdout_of(shelfmark(dir.path()).args(["book", "list"]));
    assert!(listed.is_empty());

    shelfmark(dir.path())
        .args(["book", "delete", book.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no book with id"));
}

#[test]
fn export_then_import_into_fresh_library() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let book = add_book(source.path(), "Ulysses", "James Joyce");
    shelfmark(source.path())
        .args(["note", "add", book.as_str(), "--page", "7", "--text", "stately, plump"])
        .assert()
        .success();

    let export = source.path().join("export.json");
    shelfmark(source.path())
        .args(["export", "json", "--out"])
        .arg(&export)
        .assert()
        .success();

    shelfmark(target.path())
        .arg("import")
        .arg(&export)
        .assert()
        .success()
        .stdout("imported 1 books\n");

    let shown = stdout_of(shelfmark(target.path()).args(["show", book.as_str()]));
    assert!(shown.contains("stately, plump"));
}

#[test]
fn import_rejects_non_array_and_keeps_library() {
    let dir = tempfile::tempdir().unwrap();
    add_book(dir.path(), "Emma", "Jane Austen");
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, r#"{"title":"not a list"}"#).unwrap();

    shelfmark(dir.path())
        .arg("import")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON file."));

    let listed = stdout_of(shelfmark(dir.path()).args(["book", "list"]));
    assert!(listed.contains("Emma"));
}

#[test]
fn export_pdf_writes_named_document() {
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let book = add_book(dir.path(), "Dune", "Frank Herbert");

    shelfmark(dir.path())
        .args(["export", "pdf", book.as_str(), "--out"])
        .arg(out.path())
        .assert()
        .success();

    let pdf = std::fs::read(out.path().join("Dune.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn rust_log_debug_emits_debug_line_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    shelfmark(dir.path())
        .env("RUST_LOG", "debug")
        .args(["book", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed cli"));
}
