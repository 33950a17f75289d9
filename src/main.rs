mod alias;
mod batch;
mod books;
mod commands;
mod config;
mod dedupe;
mod detect;
mod diagnostics;
mod error;
mod info;
mod matcher;
mod resolver;
mod segment;
mod store;
mod types;
mod watch;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "verseref", about = "Verse references for outline documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage custom book aliases
    Alias {
        #[command(subcommand)]
        action: AliasAction,
    },
    /// Detect references and attach verse text from the store
    Annotate {
        /// Outline document to annotate
        file: String,
    },
    /// Detect references across a directory of outlines in parallel
    Batch {
        /// Directory to scan
        dir: String,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List the canonical books
    Books {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Detect and resolve references in one outline document
    Detect {
        /// Outline document to scan
        file: String,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the verseref reference document
    Info {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Resolve one citation string and print its verse text
    Lookup {
        /// Citation such as "Eph. 4:7-16"
        citation: String,
    },
    /// Re-run batch detection when outline files change
    Watch {
        /// Directory to watch
        dir: String,
    },
}

#[derive(Subcommand)]
enum AliasAction {
    /// Add an alias for a canonical book
    Add {
        /// Alias spelling as it appears in documents
        name: String,
        /// Canonical book name or abbreviation
        book: String,
    },
    /// List configured aliases
    List,
    /// Remove a configured alias
    Remove {
        /// Alias spelling to remove
        name: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Alias { action } => match action {
            AliasAction::Add { name, book } => alias::cmd_add(&name, &book).map(|()| ExitCode::SUCCESS),
            AliasAction::List => alias::cmd_list().map(|()| ExitCode::SUCCESS),
            AliasAction::Remove { name } => alias::cmd_remove(&name).map(|()| ExitCode::SUCCESS),
        },
        Commands::Annotate { file } => commands::annotate(&file),
        Commands::Batch { dir, json } => batch::run(&dir, json),
        Commands::Books { json } => {
            commands::books_list(json);
            Ok(ExitCode::SUCCESS)
        },
        Commands::Detect { file, json } => commands::detect_file(&file, json),
        Commands::Info { json } => {
            info::run(json);
            Ok(ExitCode::SUCCESS)
        },
        Commands::Lookup { citation } => commands::lookup(&citation),
        Commands::Watch { dir } => watch::run(&dir),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(2)
        },
    }
}
