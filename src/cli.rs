// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
// =============================================================================

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "mdsplice",
    version,
    about = "Split Markdown documents into section files, put them back together, and check their links",
    long_about = "mdsplice explodes a long Markdown document into one file per level-2 section plus a \
                  navigable index.md, assembles such a directory back into a single document, and \
                  checks that every link in a document (and, optionally, the documents it links to) resolves."
)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv). RUST_LOG directives are honoured too
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a document into one file per level-2 section plus index.md
    ///
    /// Example: mdsplice explode guide.md --output-dir guide/
    Explode {
        /// Markdown document to split
        input: PathBuf,

        /// Directory to write into (default: the input path without its extension)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Output a JSON summary instead of text
        #[arg(long)]
        json: bool,
    },

    /// Rebuild a single document from a directory produced by explode
    ///
    /// Example: mdsplice assemble guide/ --output guide.md
    Assemble {
        /// Directory containing index.md and the section files
        dir: PathBuf,

        /// File to write (default: <dir>.md next to the directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output a JSON summary instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check that every link in a document resolves
    ///
    /// Example: mdsplice check-links README.md --recursive
    CheckLinks {
        /// Markdown document to scan
        input: PathBuf,

        /// Also scan local Markdown files the document links to, transitively
        #[arg(short, long)]
        recursive: bool,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        /// Timeout in seconds for each remote request
        #[arg(long, default_value_t = 10)]
        timeout: u64,

        /// Maximum number of links checked at once
        #[arg(long, default_value_t = 50)]
        concurrency: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_links() {
        let cli = Cli::parse_from(["mdsplice", "-vv", "check-links", "README.md", "--recursive"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::CheckLinks { input, recursive, timeout, concurrency, json } => {
                assert_eq!(input, PathBuf::from("README.md"));
                assert!(recursive);
                assert!(!json);
                assert_eq!(timeout, 10);
                assert_eq!(concurrency, 50);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
