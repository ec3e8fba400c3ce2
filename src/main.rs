//! kg-eval: command-line entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI flags
//!   3. Load config
//!   4. Resolve effective log level (CLI `-v` flags > env > config)
//!   5. Init logger once
//!   6. Run the selected evaluation (precision starts the oracle first)

use std::path::PathBuf;

use tracing::info;

use kg_eval::config;
use kg_eval::error::AppError;
use kg_eval::eval::OracleService;
use kg_eval::logger;
use kg_eval::pipeline::{self, PrecisionJob, RecallJob};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present; the file is optional.
    let _ = dotenvy::dotenv();

    let args = parse_cli_args()?;

    let config = config::load(args.config_path.as_deref())?;

    let cli_level = logger::level_for_verbosity(args.verbosity);
    let effective_log_level = cli_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level, cli_level.is_some())?;

    info!(
        command = ?args.command,
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        llm_provider = %config.llm.provider,
        "config loaded"
    );

    match args.command {
        Command::Recall => {
            let mut job = RecallJob::from(&config.recall);
            apply(&mut job.base_kg_file, args.base_kg_file);
            apply(&mut job.input_kg_file, args.input_kg_file);
            apply(&mut job.output_file, args.output_file);
            apply(&mut job.output_md, args.output_md);
            pipeline::run_recall(&job)?.into_result()?;
        }
        Command::Precision => {
            if args.base_kg_file.is_some() {
                return Err(AppError::Config("-b/--base_kg_file only applies to `recall`".into()));
            }
            let mut job = PrecisionJob::from(&config.precision);
            apply(&mut job.input_kg_file, args.input_kg_file);
            apply(&mut job.output_file, args.output_file);
            apply(&mut job.output_md, args.output_md);

            let oracle = OracleService::start(&config.llm, config.llm_api_key.clone()).await?;
            pipeline::run_precision(&job, &oracle, &config.oracle).await?;
            oracle.shutdown();
        }
    }

    Ok(())
}

fn apply(target: &mut PathBuf, flag: Option<PathBuf>) {
    if let Some(path) = flag {
        *target = path;
    }
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Recall,
    Precision,
}

struct CliArgs {
    command: Command,
    verbosity: u8,
    config_path: Option<String>,
    base_kg_file: Option<PathBuf>,
    input_kg_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    output_md: Option<PathBuf>,
}

fn print_usage() {
    println!("Usage: kg-eval <recall|precision> [OPTIONS]");
    println!();
    println!("Commands:");
    println!("  recall                         Compare an input KG with a base KG");
    println!("  precision                      Validate an input KG with the LLM oracle");
    println!();
    println!("Options:");
    println!("  -h, --help                     Print help");
    println!("  -b, --base_kg_file <PATH>      Base KG file (recall only)");
    println!("  -i, --input_kg_file <PATH>     Input KG for evaluation");
    println!("  -o, --output_file <PATH>       Output CSV file");
    println!("  -m, --output_md <PATH>         Output Markdown file");
    println!("  -f, --config <PATH>            Configuration file (default: config/default.toml)");
    println!("  -v, -vv, -vvv, -vvvv           Increase logging verbosity");
}

fn parse_cli_args() -> Result<CliArgs, AppError> {
    let mut command = None;
    let mut verbosity = 0u8;
    let mut config_path = None;
    let mut base_kg_file = None;
    let mut input_kg_file = None;
    let mut output_file = None;
    let mut output_md = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if let Some(n) = verbosity_flag(&arg) {
            verbosity = verbosity.saturating_add(n);
            continue;
        }

        let mut value = |flag: &str| {
            iter.next()
                .ok_or_else(|| AppError::Config(format!("{flag} requires a path argument")))
        };

        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            "recall" => command = Some(Command::Recall),
            "precision" => command = Some(Command::Precision),
            "-f" | "--config" => config_path = Some(value("-f/--config")?),
            "-b" | "--base_kg_file" => base_kg_file = Some(PathBuf::from(value("-b/--base_kg_file")?)),
            "-i" | "--input_kg_file" => input_kg_file = Some(PathBuf::from(value("-i/--input_kg_file")?)),
            "-o" | "--output_file" => output_file = Some(PathBuf::from(value("-o/--output_file")?)),
            "-m" | "--output_md" => output_md = Some(PathBuf::from(value("-m/--output_md")?)),
            "--verbose" => verbosity = verbosity.saturating_add(1),
            other => return Err(AppError::Config(format!("unexpected argument: {other}"))),
        }
    }

    let command = command.ok_or_else(|| {
        print_usage();
        AppError::Config("missing command: expected `recall` or `precision`".into())
    })?;

    Ok(CliArgs {
        command,
        verbosity,
        config_path,
        base_kg_file,
        input_kg_file,
        output_file,
        output_md,
    })
}

/// Count of `v`s in a `-v`, `-vv`, ... flag, saturating at `u8::MAX`.
fn verbosity_flag(arg: &str) -> Option<u8> {
    let vs = arg.strip_prefix('-')?;
    if vs.is_empty() || !vs.chars().all(|c| c == 'v') {
        return None;
    }
    Some(u8::try_from(vs.len()).unwrap_or(u8::MAX))
}
