use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use revbench::config::{BenchConfig, CONFIG_TEMPLATE, DEFAULT_CONFIG_PATH};
use revbench::display;
use revbench::errors::RevbenchError;
use revbench::pipeline::Pipeline;
use revbench::runner::ShellRunner;
use revbench::types::FailurePolicy;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[derive(Parser)]
#[command(
    name = "revbench",
    version,
    about = "Benchmark a list of git revisions and summarize the samples"
)]
struct Cli {
    /// "init" prints a template config, "plan" lists the runs; omit to run the benchmark
    command: Option<String>,

    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the configured repetition count
    #[arg(short = 'n', long)]
    repetitions: Option<usize>,

    /// Override the configured report path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep going when a command exits unsuccessfully
    #[arg(long, conflicts_with = "fail_fast")]
    keep_going: bool,

    /// Stop at the first command that exits unsuccessfully
    #[arg(long)]
    fail_fast: bool,

    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "revbench=debug" } else { "revbench=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<BenchConfig> {
    let mut config = BenchConfig::load(&cli.config)?;

    if let Some(repetitions) = cli.repetitions {
        config.repetitions = repetitions;
    }
    if let Some(output) = &cli.output {
        config.output = output.clone();
    }
    if cli.keep_going {
        config.on_failure = FailurePolicy::Continue;
    } else if cli.fail_fast {
        config.on_failure = FailurePolicy::Abort;
    }

    Ok(config)
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command.as_deref() {
        Some("init") => {
            print!("{}", CONFIG_TEMPLATE);
            return Ok(());
        }
        None | Some("plan") => {}
        Some(other) => {
            return Err(RevbenchError::UnknownCommand {
                command: other.to_string(),
            }
            .into());
        }
    }

    let config = load_config(&cli)?;
    let runner = ShellRunner::new(
        &config.shell,
        &config.checkout,
        &config.command,
        config.workdir.as_deref(),
    )
    .echo_output(config.echo_output);
    let mut pipeline = Pipeline::new(config, runner)?;

    if cli.command.as_deref() == Some("plan") {
        print!("{}", display::format_plan(pipeline.plan()));
        return Ok(());
    }

    // Covers SIGINT, SIGTERM and SIGHUP.
    ctrlc::set_handler(|| INTERRUPTED.store(true, Ordering::SeqCst))?;

    let title = pipeline.config().title.clone();
    let report_path = pipeline.config().output_path().display().to_string();
    let records = pipeline.run(&INTERRUPTED)?;

    let output = if cli.json {
        display::format_json(&title, &records, &report_path)
    } else {
        display::format_summary(&title, &records, &report_path)
    };
    print!("{}", output);

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{}", err);
        let code = match err.downcast_ref::<RevbenchError>() {
            Some(RevbenchError::Interrupted { .. }) => 130,
            _ => 1,
        };
        process::exit(code);
    }
}
