//! `slowsort` — double integer CSV batches through a helper and slow-sort them.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use slowsort_cli::colors::{bold, failure_label, green, red, status_label, yellow};
use slowsort_cli::config::CONFIG_FILE;
use slowsort_cli::{run_batch, BatchOptions, BatchReport, CliError, SlowsortConfig};
use slowsort_provider_process::CommandDoubler;
use slowsort_rt::{Pipeline, SortConfig, Sorter, Transformer};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slowsort", version, about = "Double and slow-sort integer CSV files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every configured job
    Run {
        /// Config file (default: nearest slowsort.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory holding the input files and the helper
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Recursion depth below which sort halves run in parallel
        #[arg(long)]
        max_depth: Option<usize>,

        /// External calls allowed in flight at once
        #[arg(long)]
        permits: Option<usize>,

        /// Worker threads issuing external calls
        #[arg(long)]
        workers: Option<usize>,

        /// Helper command; the value is appended as the last argument
        #[arg(long)]
        command: Option<String>,
    },
    /// Slow-sort the given values without doubling them
    Sort {
        #[arg(allow_hyphen_values = true, required = true)]
        values: Vec<i64>,

        #[arg(long, default_value_t = slowsort_rt::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
    /// Create a slowsort.toml config file
    Init {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            config,
            dir,
            max_depth,
            permits,
            workers,
            command,
        } => cmd_run(config, &dir, max_depth, permits, workers, command),
        Commands::Sort { values, max_depth } => cmd_sort(values, max_depth),
        Commands::Init { dir } => cmd_init(&dir),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", red("error:"), e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_run(
    config_path: Option<PathBuf>,
    dir: &Path,
    max_depth: Option<usize>,
    permits: Option<usize>,
    workers: Option<usize>,
    command: Option<String>,
) -> Result<ExitCode, CliError> {
    let mut config = match &config_path {
        Some(path) => SlowsortConfig::load_from(path)?,
        None => SlowsortConfig::load(dir)?,
    };
    if let Some(depth) = max_depth {
        config.sort.max_depth = depth;
    }
    if let Some(permits) = permits {
        config.transform.permits = permits;
    }
    if workers.is_some() {
        config.transform.workers = workers;
    }
    if let Some(command) = command {
        config.transform.command = command;
    }
    config.validate()?;

    let dir = dir.canonicalize().map_err(|e| CliError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let doubler = CommandDoubler::new(&config.transform.command)?.with_current_dir(&dir);
    let transformer = Transformer::from_config(doubler, config.transform.limits())?;
    let pipeline = Pipeline::new(transformer, config.sort)?;
    let options = BatchOptions {
        base_dir: dir,
        mode: config.output.mode,
    };

    let report = run_batch(&config.jobs(), &pipeline, &options);
    print_report(&report);

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_report(report: &BatchReport) {
    for job in &report.jobs {
        let route = format!("{} -> {}", job.job.input.display(), job.job.output.display());
        match &job.error {
            None => println!(
                "{} {} ({} values)",
                status_label("Sorted"),
                route,
                job.written
            ),
            Some(e) => println!("{} {}: {}", failure_label("Failed"), route, e),
        }
        for failure in &job.failures {
            println!("{} {}", yellow("     skipped"), failure);
        }
    }

    let summary = format!(
        "{} job(s), {} failed, {} value(s) skipped",
        report.jobs.len(),
        report.failed_jobs(),
        report.element_failures()
    );
    if report.is_clean() {
        println!("{} {}", green("done:"), summary);
    } else {
        println!("{} {}", red("done:"), summary);
    }
}

fn cmd_sort(mut values: Vec<i64>, max_depth: usize) -> Result<ExitCode, CliError> {
    let sorter = Sorter::new(SortConfig::new(max_depth)?)?;
    let stats = sorter.sort(&mut values)?;
    tracing::debug!(calls = stats.calls, tasks = stats.tasks_spawned, "sorted");
    let line: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    println!("{}", line.join(" "));
    Ok(ExitCode::SUCCESS)
}

fn cmd_init(dir: &Path) -> Result<ExitCode, CliError> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() {
        eprintln!(
            "{} {} already exists, not overwriting",
            red("error:"),
            bold(&path.display().to_string())
        );
        return Ok(ExitCode::FAILURE);
    }
    std::fs::write(&path, SlowsortConfig::default_template()).map_err(|e| CliError::Io {
        path: path.clone(),
        source: e,
    })?;
    println!("{} {}", status_label("Created"), path.display());
    Ok(ExitCode::SUCCESS)
}
