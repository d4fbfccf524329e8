//! Shelfmark CLI - reading notebook in the terminal

mod cli;
mod commands;
mod io;
mod logging;
mod pdf;
mod tui;
mod ui;

use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;
use shelfmark_core::Library;

use crate::cli::{Cli, Command};
use crate::io::FileStore;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let dir = io::data_dir(cli.data_dir.as_deref()).context("resolve data directory")?;

    // the terminal UI owns stderr's screen, so it logs to a file
    let logged = match &cli.command {
        None => logging::init_file(&dir.join(io::LOG_FILE_NAME)),
        Some(_) => logging::init(),
    };
    logged.context("init logging")?;
    tracing::debug!(?cli, data_dir = %dir.display(), "parsed cli");

    let mut library = Library::load(FileStore::new(&dir))
        .map_err(|err| anyhow::anyhow!("{}: {err}", err.user_message()))
        .context("load library")?;

    match cli.command {
        None => tui::run(library).context("terminal UI")?,
        Some(Command::Book { command }) => commands::book(&mut library, command)?,
        Some(Command::Note { command }) => commands::note(&mut library, command)?,
        Some(Command::Show(args)) => commands::show(&library, args)?,
        Some(Command::Export { command }) => commands::export(&library, command)?,
        Some(Command::Import(args)) => commands::import(&mut library, args)?,
    }

    Ok(())
}
