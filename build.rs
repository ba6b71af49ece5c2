//! Renders the `ci-trigger` manual pages into `OUT_DIR`.
//!
//! `ci-trigger.1` documents the top-level command and `ci-trigger-submit.1`
//! the `submit` subcommand with its `--devices`, `--source` and `--platform`
//! options. Both are generated from the clap definitions the binary parses.

use std::env;
use std::fs;
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Command, CommandFactory};
use clap_mangen::Man;

#[path = "src/cli/mod.rs"]
mod cli;

use cli::Cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = io::stdout();
    for watched in ["build.rs", "src/cli/mod.rs"] {
        writeln!(stdout, "cargo:rerun-if-changed={watched}")?;
    }

    let out_dir = out_dir()?;
    let command = Cli::command();
    write_page(&out_dir, "ci-trigger.1", command.clone())?;
    if let Some(submit) = command.find_subcommand("submit") {
        let page = submit.clone().name("ci-trigger-submit");
        write_page(&out_dir, "ci-trigger-submit.1", page)?;
    }

    Ok(())
}

fn out_dir() -> io::Result<Utf8PathBuf> {
    let raw = env::var_os("OUT_DIR")
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "OUT_DIR was not set"))?;
    Utf8PathBuf::from_path_buf(raw.into()).map_err(|path| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("OUT_DIR is not UTF-8: {}", path.display()),
        )
    })
}

fn write_page(out_dir: &Utf8Path, file_name: &str, command: Command) -> io::Result<()> {
    let mut page = Vec::new();
    Man::new(command).render(&mut page)?;
    fs::write(out_dir.join(file_name), page)
}
