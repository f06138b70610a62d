pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "replykit",
    about = "Replykit operator CLI",
    long_about = "Apply migrations, seed builtin content packs, and inspect configuration.",
    after_help = "Examples:\n  replykit migrate\n  replykit seed\n  replykit seed --organization 7f8d2c1e-0a4b-4c7d-9e61-3f5a8b2c4d6e"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations")]
    Migrate,
    #[command(about = "Reconcile builtin content packs into tenant storage (idempotent)")]
    Seed {
        #[arg(long, help = "Seed a single organization by id instead of all organizations")]
        organization: Option<String>,
    },
    #[command(about = "Print the effective configuration")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed { organization } => commands::seed::run(organization),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
