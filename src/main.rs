//! Scacchiera: play chess in the terminal against a move-proposing agent.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use scacchiera::agent::ScriptedAgent;
use scacchiera::config::MatchConfig;
use scacchiera::game::{run_match_loop, MatchController};
use scacchiera::wire::StructuredBoard;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON match configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Initial board encoding; defaults to the standard position
    #[arg(short, long)]
    board: Option<PathBuf>,

    /// JSON array of agent replies to play back
    #[arg(short, long)]
    replies: PathBuf,

    /// Match time limit in minutes, overriding the config
    #[arg(short, long)]
    time_limit: Option<u64>,

    /// Log filter when RUST_LOG is not set
    #[arg(long, default_value_t = String::from("info"))]
    log_level: String,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => MatchConfig::from_file(path)?,
        None => MatchConfig::default(),
    };
    if let Some(minutes) = args.time_limit {
        config = config.time_limit_secs(minutes.saturating_mul(60));
    }

    let initial = match &args.board {
        Some(path) => StructuredBoard::from_json(&std::fs::read_to_string(path)?)?,
        None => StructuredBoard::standard(),
    };

    let agent = ScriptedAgent::from_file(&args.replies)?.with_history_limit(config.max_history);
    info!("loaded {} agent replies", agent.remaining());

    let mut controller = MatchController::new(&initial, agent, config)?;
    println!("Game start! - Version n. {}", env!("CARGO_PKG_VERSION"));

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let result = run_match_loop(&mut reader, &mut writer, &mut controller)?;

    match result {
        Some(result) => info!("match status: {}", result),
        None => info!("match interrupted: {}", scacchiera::board::game_status(controller.board())),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    if let Err(e) = run(args) {
        error!("match failed: {}", e);
        eprintln!("match failed: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
