//! PatternSync CLI entry point.

use clap::Parser;
use patternsync::cli::{commands, Cli, Commands};
use patternsync::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let db = cli.db.as_ref();
    let dir = cli.dir.as_ref();
    let json = cli.json;

    match &cli.command {
        Commands::Init { force } => commands::init::execute(*force, db, dir, json),

        Commands::List { trashed, all } => commands::list::execute(*trashed, *all, db, json),

        Commands::Status => commands::status::execute(db, dir, cli.include_trashed, json),

        Commands::Sync { command } => {
            commands::sync::execute(command, db, dir, cli.include_trashed, json)
        }

        Commands::Trash { slugs } => commands::trash::execute_trash(slugs, db, dir, json),

        Commands::Restore { slug } => commands::trash::execute_restore(slug, db, dir, json),

        Commands::Upload { file, overwrite, write_to_disk } => {
            commands::upload::execute_upload(file, *overwrite, *write_to_disk, db, dir, json)
        }

        Commands::Stage { file } => commands::upload::execute_stage(file, db, dir, json),

        Commands::Confirm { session_id, overwrite, write_to_disk } => {
            commands::upload::execute_confirm(session_id, *overwrite, *write_to_disk, db, dir, json)
        }

        Commands::Pack { out, slugs } => commands::pack::execute(out, slugs, db, json),

        Commands::Completions { shell } => commands::completions::execute(shell),

        Commands::Version => commands::version::execute(json),
    }
}
