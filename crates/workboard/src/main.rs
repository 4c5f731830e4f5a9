use std::path::PathBuf;

use clap::{Parser, Subcommand};

use workboard::cli::commands::{
    self, CreateArgs, EditArgs, IdArgs, ListArgs, MarksArgs, PrintArgs, PrintImageArgs,
};
use workboard::cli::{CliResult, Context};
use workboard::service::BoardCommand;

#[derive(Parser)]
#[command(name = "workboard")]
#[command(about = "Sign shop work-order board", long_about = None)]
struct Cli {
    /// Config file (default: ~/.workboard/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Default log filter when WORKBOARD_LOG / RUST_LOG are unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the board
    List(ListArgs),

    /// Register a new job
    Create(CreateArgs),

    /// Change a job's details
    Edit(EditArgs),

    /// Mark a job completed
    Complete(IdArgs),

    /// Move a completed job back to in-progress
    Recover(IdArgs),

    /// Soft-delete a job
    Delete(IdArgs),

    /// Permanently remove a completed or deleted job
    Purge(IdArgs),

    /// Move a job out of the just-upload holding area
    Release(IdArgs),

    /// Toggle the ready-for-pickup flag
    WorkDone(IdArgs),

    /// Save annotation points over a job's image
    Marks(MarksArgs),

    /// Keep the board on screen and re-sync periodically
    Watch(ListArgs),

    /// Print today's work summary as HTML
    PrintToday(PrintArgs),

    /// Print a job's manuscript image as HTML
    PrintImage(PrintImageArgs),

    /// Unlock the board with the shared password
    Login,

    /// Lock the board
    Logout,
}

#[tokio::main]
async fn main() -> CliResult {
    let cli = Cli::parse();

    workboard::logging::init(&cli.log_level, cli.log_json)?;

    let ctx = Context::open(cli.config)?;

    match cli.command {
        Commands::List(args) => commands::list(&ctx, args).await?,
        Commands::Create(args) => commands::create(&ctx, args).await?,
        Commands::Edit(args) => commands::edit(&ctx, args).await?,
        Commands::Complete(args) => {
            commands::transition(&ctx, BoardCommand::Complete(args.id), args.yes, "완료됨").await?
        }
        Commands::Recover(args) => {
            commands::transition(&ctx, BoardCommand::Recover(args.id), args.yes, "복구됨").await?
        }
        Commands::Delete(args) => {
            commands::transition(&ctx, BoardCommand::SoftDelete(args.id), args.yes, "삭제됨").await?
        }
        Commands::Purge(args) => {
            commands::transition(
                &ctx,
                BoardCommand::PermanentDelete(args.id),
                args.yes,
                "완전 삭제됨",
            )
            .await?
        }
        Commands::Release(args) => {
            commands::transition(
                &ctx,
                BoardCommand::MoveOutOfHolding(args.id),
                args.yes,
                "작업으로 이동됨",
            )
            .await?
        }
        Commands::WorkDone(args) => {
            commands::transition(&ctx, BoardCommand::ToggleWorkDone(args.id), args.yes, "변경됨")
                .await?
        }
        Commands::Marks(args) => commands::marks(&ctx, args).await?,
        Commands::Watch(args) => commands::watch(&ctx, args).await?,
        Commands::PrintToday(args) => commands::print_today(&ctx, args).await?,
        Commands::PrintImage(args) => commands::print_image(&ctx, args).await?,
        Commands::Login => commands::login(&ctx)?,
        Commands::Logout => commands::logout(&ctx)?,
    }

    Ok(())
}
