use clap::{ArgAction, Parser, Subcommand};
use countdown_cli::commands;
use countdown_cli::logging;
use countdown_cli::readline;
use countdown_cli::CliContext;
use countdown_core::{LifecycleEvent, TimerKey};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();
    let mut ctx = CliContext::new()?;

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &mut ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "countdown timers")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start (or restart) a countdown
    Start {
        #[arg(short, long)]
        key: TimerKey,
        #[arg(short, long, allow_negative_numbers = true)]
        secs: Option<i64>,
    },
    /// Stop a countdown early
    Stop {
        #[arg(short, long)]
        key: TimerKey,
    },
    /// Re-attach to a countdown's deadline
    Continue {
        #[arg(short, long)]
        key: TimerKey,
    },
    Status,
    /// Simulate the process returning to the foreground
    Resume,
    /// Simulate the process moving to the background
    Background,
    /// Show the configuration, or change and save it
    Config {
        #[arg(long, action = ArgAction::Set)]
        stop_invokes_callback: Option<bool>,
        #[arg(long, allow_negative_numbers = true)]
        default_secs: Option<i64>,
    },
    Exit,
}

async fn respond(line: &str, ctx: &mut CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "countdown".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match cli.command {
        Some(Commands::Start { key, secs }) => commands::start(ctx, key, secs),
        Some(Commands::Stop { key }) => commands::stop(ctx, key),
        Some(Commands::Continue { key }) => commands::continue_countdown(ctx, key),
        Some(Commands::Status) => commands::status(ctx),
        Some(Commands::Resume) => commands::notify(ctx, LifecycleEvent::EnteredForeground).await,
        Some(Commands::Background) => {
            commands::notify(ctx, LifecycleEvent::EnteredBackground).await
        }
        Some(Commands::Config {
            stop_invokes_callback,
            default_secs,
        }) => commands::configure(ctx, stop_invokes_callback, default_secs)?,
        Some(Commands::Exit) => {
            commands::exit(ctx)?;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
