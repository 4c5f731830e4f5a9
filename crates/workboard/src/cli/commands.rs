//! Subcommand arguments and handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use clap::Args;
use tokio::sync::Notify;

use super::render::render_board;
use super::{confirmer, parse_date, parse_point, BucketArg, CliResult, Context};
use crate::error::{BoardError, ValidationError};
use crate::model::{CheckMark, ImageUpload, RequestDraft, WorkRequest};
use crate::report::{single_image_html, today_work_html};
use crate::service::{BoardCommand, CommandOutcome};
use crate::sync::SyncScheduler;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Substring filter on company, program or creator
    #[arg(short, long)]
    pub search: Option<String>,

    /// Show a single bucket
    #[arg(short, long, value_enum)]
    pub bucket: Option<BucketArg>,

    /// Print the partitioned board as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(long)]
    pub company: String,

    #[arg(long)]
    pub program: String,

    /// Pickup date (YYYY-MM-DD); defaults to today
    #[arg(long, value_parser = parse_date)]
    pub pickup: Option<NaiveDate>,

    #[arg(long, default_value = "")]
    pub note: String,

    /// Manuscript image to upload
    #[arg(long)]
    pub image: Option<PathBuf>,

    #[arg(long)]
    pub urgent: bool,

    /// Park the job in the just-upload holding area
    #[arg(long)]
    pub just_upload: bool,

    #[arg(long, default_value = "")]
    pub creator: String,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: i64,

    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub program: Option<String>,

    #[arg(long, value_parser = parse_date)]
    pub pickup: Option<NaiveDate>,

    #[arg(long)]
    pub note: Option<String>,

    /// Replace the manuscript image
    #[arg(long, conflicts_with = "clear_image")]
    pub image: Option<PathBuf>,

    #[arg(long)]
    pub clear_image: bool,

    #[arg(long)]
    pub urgent: Option<bool>,

    #[arg(long)]
    pub just_upload: Option<bool>,

    #[arg(long)]
    pub creator: Option<String>,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    pub id: i64,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct MarksArgs {
    pub id: i64,

    /// Annotation points as x,y (repeatable); none clears the marks
    #[arg(long = "point", value_parser = parse_point)]
    pub points: Vec<CheckMark>,
}

#[derive(Args, Debug)]
pub struct PrintArgs {
    /// Write the HTML here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PrintImageArgs {
    pub id: i64,

    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

fn read_image(path: &Path) -> CliResult<ImageUpload> {
    let bytes = std::fs::read(path)
        .map_err(|e| format!("failed to read image '{}': {}", path.display(), e))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("invalid image file name '{}'", path.display()))?;
    Ok(ImageUpload::from_file_name(filename, bytes))
}

fn write_output(out: Option<&Path>, content: &str) -> CliResult {
    match out {
        Some(path) => {
            std::fs::write(path, content)
                .map_err(|e| format!("failed to write '{}': {}", path.display(), e))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Refreshes and returns the row, or a not-found error.
async fn load_row(ctx: &Context, id: i64) -> Result<WorkRequest, BoardError> {
    ctx.fetcher().refresh_now().await;
    ctx.fetcher()
        .find(id)
        .ok_or_else(|| ValidationError::NotFound(id).into())
}

fn report_outcome(outcome: CommandOutcome, done: &str) {
    match outcome {
        CommandOutcome::Applied(id) => println!("{} #{}", done, id),
        CommandOutcome::Declined => println!("취소되었습니다."),
    }
}

pub async fn list(ctx: &Context, args: ListArgs) -> CliResult {
    ctx.ensure_unlocked()?;
    ctx.fetcher().refresh_now().await;

    let snapshot = ctx.fetcher().snapshot();
    if let Some(error) = &snapshot.error {
        eprintln!("⚠ {}", error);
    }

    let view = ctx.fetcher().view().search(args.search.as_deref().unwrap_or(""));
    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render_board(&view, args.bucket.map(Into::into), ctx.today()));
    }
    Ok(())
}

pub async fn create(ctx: &Context, args: CreateArgs) -> CliResult {
    ctx.ensure_unlocked()?;
    let image = args.image.as_deref().map(read_image).transpose()?;
    let draft = RequestDraft {
        company: args.company,
        program: args.program,
        pickup_date: Some(args.pickup.unwrap_or_else(|| ctx.today())),
        note: args.note,
        image_url: None,
        image,
        is_urgent: args.urgent,
        is_just_upload: args.just_upload,
        creator: args.creator,
    };

    let outcome = ctx
        .service
        .execute(BoardCommand::Create(draft), confirmer(true))
        .await?;
    report_outcome(outcome, "등록됨");
    Ok(())
}

pub async fn edit(ctx: &Context, args: EditArgs) -> CliResult {
    ctx.ensure_unlocked()?;
    let row = load_row(ctx, args.id).await?;

    let mut draft = RequestDraft::from_request(&row);
    if let Some(company) = args.company {
        draft.company = company;
    }
    if let Some(program) = args.program {
        draft.program = program;
    }
    if let Some(pickup) = args.pickup {
        draft.pickup_date = Some(pickup);
    }
    if let Some(note) = args.note {
        draft.note = note;
    }
    if let Some(urgent) = args.urgent {
        draft.is_urgent = urgent;
    }
    if let Some(just_upload) = args.just_upload {
        draft.is_just_upload = just_upload;
    }
    if let Some(creator) = args.creator {
        draft.creator = creator;
    }
    if args.clear_image {
        draft.image_url = None;
    }
    if let Some(path) = &args.image {
        draft.image = Some(read_image(path)?);
    }

    let outcome = ctx
        .service
        .execute(BoardCommand::Edit { id: args.id, draft }, confirmer(true))
        .await?;
    report_outcome(outcome, "수정됨");
    Ok(())
}

/// Runs one of the id-only transitions.
pub async fn transition(ctx: &Context, command: BoardCommand, yes: bool, done: &str) -> CliResult {
    ctx.ensure_unlocked()?;
    ctx.fetcher().refresh_now().await;
    let outcome = ctx.service.execute(command, confirmer(yes)).await?;
    report_outcome(outcome, done);
    Ok(())
}

pub async fn marks(ctx: &Context, args: MarksArgs) -> CliResult {
    let command = BoardCommand::SetCheckMarks {
        id: args.id,
        marks: args.points,
    };
    transition(ctx, command, true, "체크 표시 저장됨").await
}

/// Keeps the board on screen, re-rendering after every sync until Ctrl-C.
pub async fn watch(ctx: &Context, args: ListArgs) -> CliResult {
    ctx.ensure_unlocked()?;

    let shutdown = Arc::new(Notify::new());
    let notify = Arc::clone(&shutdown);
    ctrlc::set_handler(move || notify.notify_one())?;

    let fetcher = Arc::clone(ctx.fetcher());
    let mut rx = fetcher.subscribe();
    let scheduler = SyncScheduler::new(
        Arc::clone(&fetcher),
        Duration::from_secs(ctx.config.poll_interval_secs),
    );
    let handle = scheduler.start();
    log::info!(
        "Watching board every {}s, Ctrl-C to stop",
        ctx.config.poll_interval_secs
    );

    loop {
        tokio::select! {
            _ = shutdown.notified() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                let view = fetcher.view().search(args.search.as_deref().unwrap_or(""));
                // Clear screen and home the cursor.
                print!("\x1b[2J\x1b[H");
                println!("workboard  {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
                if let Some(error) = &snapshot.error {
                    println!("⚠ {}", error);
                }
                print!("{}", render_board(&view, args.bucket.map(Into::into), ctx.today()));
            }
        }
    }

    scheduler.stop();
    handle.await?;
    Ok(())
}

pub async fn print_today(ctx: &Context, args: PrintArgs) -> CliResult {
    ctx.ensure_unlocked()?;
    ctx.fetcher().refresh_now().await;
    let snapshot = ctx.fetcher().snapshot();
    let html = today_work_html(&snapshot.rows, Utc::now(), ctx.config.report_utc_offset_hours);
    write_output(args.out.as_deref(), &html)
}

pub async fn print_image(ctx: &Context, args: PrintImageArgs) -> CliResult {
    ctx.ensure_unlocked()?;
    let row = load_row(ctx, args.id).await?;
    let url = row
        .image_url
        .as_deref()
        .ok_or_else(|| format!("request #{} has no image", row.id))?;
    let html = single_image_html(url, &row.company, &row.program);
    write_output(args.out.as_deref(), &html)
}

pub fn login(ctx: &Context) -> CliResult {
    if ctx.gate.is_open() {
        println!("No password is configured; the board is open.");
        return Ok(());
    }
    let attempt = inquire::Password::new("비밀번호:")
        .without_confirmation()
        .prompt()?;
    let expires_at = ctx.gate.unlock(&attempt, Utc::now())?;
    println!("Unlocked until {}", expires_at.format("%Y-%m-%d %H:%M UTC"));
    Ok(())
}

pub fn logout(ctx: &Context) -> CliResult {
    ctx.gate.lock()?;
    println!("Locked.");
    Ok(())
}
