//! Renders the rmflash(1) man page from the command line definition
//!
//! `cargo run --bin gen-manpage -- [DIR]` writes `DIR/rmflash.1`, with `DIR`
//! defaulting to `man`. The page lists the subcommands along with the exit
//! codes operator scripts rely on.

use clap::CommandFactory;
use std::fs;
use std::io;
use std::path::PathBuf;

#[path = "../cli.rs"]
mod cli;

/// Render the page into memory
fn render() -> io::Result<Vec<u8>> {
    let cmd = cli::Cli::command().after_long_help(
        "Exit codes: 12 unknown flash part, 13 part unknown to the programmer, \
         14 part invalid for the chip, 15 image not found, 16 wrong image size, \
         17 programmer failure, 18 other failure, 19 malformed MAC or device id.",
    );

    let mut page = Vec::new();
    clap_mangen::Man::new(cmd).render(&mut page)?;
    Ok(page)
}

fn main() -> io::Result<()> {
    let dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));

    fs::create_dir_all(&dir)?;
    let path = dir.join("rmflash.1");
    fs::write(&path, render()?)?;

    println!("Wrote {} (view with: man -l {})", path.display(), path.display());
    Ok(())
}
