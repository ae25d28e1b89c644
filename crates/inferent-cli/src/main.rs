//! Inferent CLI
//!
//! Terminal front-end for forward-chaining expert systems stored as JSON:
//! - Inspecting and validating a system (`show`, `check`)
//! - Running a consultation with an explanation trail (`consult`)
//! - Writing a sample system to start from (`demo`)

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use inferent_engine::{run_consultation, EngineConfig, ScriptedAgent};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod consult;
mod demo;
mod render;

#[derive(Parser)]
#[command(name = "inferent")]
#[command(author, version, about = "Inferent: forward-chaining expert system shell")]
struct Cli {
    /// Log filter used when `RUST_LOG` is not set (e.g. `info`, `inferent_engine=debug`).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the facts and rules of a system.
    Show {
        /// System JSON file
        file: PathBuf,
    },

    /// Validate every rule against the fact database.
    ///
    /// Exits non-zero when any rule can never trigger or would write an
    /// impossible value.
    Check {
        /// System JSON file
        file: PathBuf,
    },

    /// Run a consultation and print how each fact was derived.
    Consult(ConsultArgs),

    /// Write the sample weather-advice system.
    Demo {
        /// Output JSON file
        out: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct ConsultArgs {
    /// System JSON file
    file: PathBuf,
    /// Known value, as `name=value` or `name=value@confidence` (repeatable)
    #[arg(long = "given", value_name = "FACT=VALUE")]
    given: Vec<String>,
    /// Never prompt; the consultation is cancelled at the first request
    #[arg(long)]
    non_interactive: bool,
    /// Engine config JSON (`max_rounds`, `max_request_attempts`)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override `max_rounds`
    #[arg(long)]
    max_rounds: Option<usize>,
    /// Print the explanation as JSON
    #[arg(long)]
    json: bool,
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow!("invalid log filter '{level}': {e}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = init_tracing(&cli.log_level).and_then(|()| run(cli.command)) {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Show { file } => cmd_show(&file),
        Commands::Check { file } => cmd_check(&file),
        Commands::Consult(args) => cmd_consult(args),
        Commands::Demo { out, force } => cmd_demo(&out, force),
    }
}

fn load(file: &Path) -> Result<inferent_kb::KnowledgeBase> {
    inferent_storage::load(file).with_context(|| format!("failed to load {}", file.display()))
}

fn cmd_show(file: &Path) -> Result<()> {
    let kb = load(file)?;
    print!("{}", render::knowledge_base(&kb));
    Ok(())
}

fn cmd_check(file: &Path) -> Result<()> {
    let kb = load(file)?;
    let report = kb.validate();
    if report.is_empty() {
        println!(
            "{} {} facts, {} rules",
            "ok".green().bold(),
            kb.facts.count(),
            kb.rules.count()
        );
        return Ok(());
    }
    print!("{}", render::issues(&report));
    let total: usize = report.values().map(Vec::len).sum();
    tracing::debug!(rules = report.len(), issues = total, "validation failed");
    bail!("{total} issue(s) in {} rule(s)", report.len())
}

fn cmd_consult(args: ConsultArgs) -> Result<()> {
    let mut kb = load(&args.file)?;
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(max_rounds) = args.max_rounds {
        config.max_rounds = max_rounds;
    }
    tracing::debug!(?config, "engine config");

    let given = args
        .given
        .iter()
        .map(|text| {
            consult::parse_input(&kb, text).with_context(|| format!("bad --given '{text}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    tracing::info!(
        file = %args.file.display(),
        given = given.len(),
        interactive = !args.non_interactive,
        "starting consultation"
    );

    let explanation = if args.non_interactive {
        let mut agent = ScriptedAgent::new(given);
        run_consultation(&mut kb, &mut agent, config)?
    } else {
        let mut lines = consult::terminal_lines()?;
        let mut agent = consult::TerminalAgent::new(lines.as_mut(), given);
        run_consultation(&mut kb, &mut agent, config)?
    };

    tracing::info!(
        rounds = explanation.rounds.len(),
        fired = explanation.fired_rules().len(),
        reason = ?explanation.reason,
        "consultation complete"
    );
    if args.json {
        println!("{}", serde_json::to_string_pretty(&explanation)?);
    } else {
        print!("{}", render::explanation(&explanation));
    }
    Ok(())
}

fn cmd_demo(out: &Path, force: bool) -> Result<()> {
    if out.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", out.display());
    }
    if out.exists() {
        tracing::warn!(path = %out.display(), "overwriting existing file");
    }
    let kb = demo::knowledge_base()?;
    inferent_storage::save(&kb, out)?;
    eprintln!("{} {}", "wrote".green().bold(), out.display().to_string().bold());
    Ok(())
}
