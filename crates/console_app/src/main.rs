use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use console_app::kb::{self, KbAction};
use console_app::logging::{self, LogDestination};
use console_app::output::ensure_output_dir;
use console_app::{
    ConfigOverrides, ConsoleConfig, EffectRunner, Presenter, RegionOutput, SessionController,
};
use console_core::SessionState;
use console_engine::EngineHandle;
use console_logging::console_info;

#[derive(Debug, Parser)]
#[command(name = "pm-console", version, about = "Submit product requirements and follow the analysis live")]
struct Cli {
    /// Configuration file (defaults to ./console.ron when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    poll_interval_ms: Option<u64>,
    /// Per-request timeout; none by default.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    #[arg(long, global = true, value_enum)]
    log: Option<LogDestination>,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit requirements and stream the run until it settles.
    Run {
        /// Requirement text; words are joined with spaces.
        input: Vec<String>,
        /// Read the requirement text from a file instead.
        #[arg(long, conflicts_with = "input")]
        file: Option<PathBuf>,
    },
    /// Manage knowledge-base documents.
    Kb {
        #[command(subcommand)]
        action: KbAction,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ConsoleConfig::load(cli.config.as_deref())?;
    ConfigOverrides {
        base_url: cli.base_url,
        poll_interval_ms: cli.poll_interval_ms,
        request_timeout_secs: cli.timeout_secs,
        output_dir: cli.output_dir,
        log_destination: cli.log,
    }
    .apply(&mut config)?;
    logging::initialize(config.log_destination, cli.verbose);
    console_info!("pm-console starting against {}", config.base_url);

    match cli.command {
        Command::Run { input, file } => {
            let user_input = match file {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => input.join(" "),
            };
            run_session(&config, &user_input)
        }
        Command::Kb { action } => {
            let response = kb::run(action, &config.api_settings())?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
    }
}

fn run_session(config: &ConsoleConfig, user_input: &str) -> anyhow::Result<()> {
    ensure_output_dir(&config.output_dir)?;
    let engine = EngineHandle::new(&config.api_settings(), config.transport_settings())?;
    let output = RegionOutput::new(config.output_dir.clone());
    output.clear()?;
    let presenter = Presenter::new(io::stdout(), output);
    let mut session =
        SessionController::new(EffectRunner::new(engine), presenter, config.render_tick());

    session.start(user_input)?;
    let outcome = session.run_until_settled()?;
    let submitted = session.state().active_job_id().is_some();
    session.dispose();

    match outcome {
        SessionState::Failed => bail!("run failed"),
        SessionState::Idle if !submitted => bail!("nothing was submitted"),
        _ => Ok(()),
    }
}
