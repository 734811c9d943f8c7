//! CLI entrypoint for research-agent
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use research_application::{
    NoProgress, NoRunLogger, ResearchProgressNotifier, RunLogger, RunResearchUseCase,
    SharedStateMachine, StateMachine,
};
use research_domain::{ConfigIssue, TransitionTable};
use research_infrastructure::{
    ConfigLoader, FileConfig, JsonlRunLogger, Scenario, snapshot_listener,
};
use research_presentation::{
    Cli, ConsoleFormatter, OutputConfig, ProgressReporter, SimpleProgress,
};
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_tracing(&cli)?;

    info!("Starting research-agent");

    if cli.show_config {
        println!("Configuration sources (highest priority first):");
        for line in ConfigLoader::describe_sources(cli.config.as_ref()) {
            println!("{}", line);
        }
        return Ok(ExitCode::SUCCESS);
    }

    // === Configuration ===
    let config = load_config(&cli)?;
    report_issues(&config.validate());
    let (gates, _) = config.gates.to_thresholds();
    let (params, _) = config.driver.to_params();
    let (file_format, _) = config.output.parse_format();

    if cli.print_table {
        println!("{}", ConsoleFormatter::format_table(&TransitionTable::with_gates(gates)));
        return Ok(ExitCode::SUCCESS);
    }

    let output_config = OutputConfig::default()
        .with_format(
            cli.output
                .map(Into::into)
                .or(file_format)
                .unwrap_or_default(),
        )
        .with_color(config.output.color && std::io::stdout().is_terminal())
        .with_show_progress(config.output.show_progress && !cli.quiet);

    if !output_config.color {
        colored::control::set_override(false);
    }

    // === Scenario ===
    let scenario = match &cli.scenario {
        Some(path) => Scenario::load(path)
            .with_context(|| format!("Failed to load scenario {}", path.display()))?,
        None => Scenario::demo(),
    };
    info!(scenario = %scenario.name, steps = scenario.steps.len(), "Scenario loaded");

    // === Dependency Injection ===
    let machine = SharedStateMachine::new(StateMachine::with_gates(gates));

    let run_log_path = cli.run_log.clone().or_else(|| config.logging.run_log_path());
    let run_logger = run_log_path.as_ref().and_then(|path| {
        let logger = JsonlRunLogger::new(path).map(Arc::new);
        if logger.is_none() {
            warn!(path = %path.display(), "Run log disabled: could not open file");
        }
        logger
    });
    let _snapshots = run_logger.as_ref().map(|logger| {
        let logger: Arc<dyn RunLogger> = logger.clone();
        machine.subscribe(snapshot_listener(logger))
    });

    let cancellation = CancellationToken::new();
    let ctrl_c_token = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    let use_case = RunResearchUseCase::new(scenario.collaborators())
        .with_params(params)
        .with_cancellation(cancellation);

    if output_config.wants_progress() {
        println!(
            "{} {}\n",
            "Scenario:".cyan().bold(),
            scenario.name.as_str().bold()
        );
    }

    let progress: Box<dyn ResearchProgressNotifier> = if !output_config.wants_progress() {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };
    let logger: &dyn RunLogger = match &run_logger {
        Some(logger) => logger.as_ref(),
        None => &NoRunLogger,
    };

    let output = match use_case
        .execute_with_progress(&machine, progress.as_ref(), logger)
        .await
    {
        Ok(output) => output,
        Err(e) if e.is_cancelled() => {
            eprintln!("{}", "Run cancelled".yellow());
            return Ok(ExitCode::from(130));
        }
        Err(e) => bail!(e),
    };

    println!("{}", ConsoleFormatter::render(output_config.format, &output));

    if let Some(logger) = &run_logger {
        info!(path = %logger.path().display(), "Run log written");
    }

    Ok(if output.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Initialize logging based on verbosity level. `RUST_LOG` wins when set.
fn init_tracing(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match &cli.log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("Invalid log file path: {}", path.display()))?;
            std::fs::create_dir_all(directory)
                .with_context(|| format!("Failed to create {}", directory.display()))?;

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    if let Some(path) = &cli.config
        && !path.exists()
    {
        bail!("Config file not found: {}", path.display());
    }
    ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

fn report_issues(issues: &[ConfigIssue]) {
    for issue in issues {
        warn!(field = %issue.field, "{}", issue.message);
        if issue.is_error() {
            eprintln!("{} {}", "config error:".red().bold(), issue);
        } else {
            eprintln!("{} {}", "config warning:".yellow().bold(), issue);
        }
    }
}
