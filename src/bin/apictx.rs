//! apictx CLI Binary
//!
//! Loads configuration, initializes logging and drives a small invocation tree
//! to show values, completion and error chains at work.

use anyhow::Context as _;
use apictx::config::{ApiCtxConfig, ConfigLoader};
use apictx::logging::{init_logging, LoggingConfig};
use apictx::{ApiContext, ErrorKind, Value};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "apictx", version, about = "Invocation context runtime")]
struct Cli {
    /// Configuration file (layered over defaults and the global file)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Override the log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Override the log format (text or json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a sample invocation tree
    Demo {
        /// Number of concurrent workers
        #[arg(long, default_value_t = 3)]
        workers: usize,

        /// Make the preparation step and odd workers fail
        #[arg(long)]
        fail: bool,
    },
    /// Print the resolved configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let logging_config = build_logging_config(&cli, &config);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    if let Err(e) = execute(&cli.command, &config) {
        error!("Command failed: {:#}", e);
        eprintln!("{:#}", e);
        process::exit(1);
    }
}

/// CLI flags override the configuration file.
fn build_logging_config(cli: &Cli, config: &ApiCtxConfig) -> LoggingConfig {
    let mut logging = config.logging.clone();
    if cli.quiet {
        logging.enabled = false;
    }
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        logging.format = format.clone();
    }
    logging
}

fn execute(command: &Command, config: &ApiCtxConfig) -> anyhow::Result<()> {
    match command {
        Command::Demo { workers, fail } => {
            run_demo(config, *workers, *fail);
            Ok(())
        }
        Command::Config => {
            let rendered = config.to_toml().context("rendering configuration")?;
            println!("{}", rendered);
            Ok(())
        }
    }
}

fn run_demo(config: &ApiCtxConfig, workers: usize, fail: bool) {
    info!(workers, fail, "starting demo");
    let root = ApiContext::from_config(&config.runtime).with_value("request_id", "demo-1");

    let prepare = root.run_blocking("prepare", |ctx| {
        ctx.set_value("batch", workers as i64);
        if fail {
            ctx.raise(
                "input rejected",
                Some(Value::from(workers as i64)),
                ErrorKind::ParamCountError,
            );
        }
        if let Err(mismatch) = ctx.int_value("request_id") {
            ctx.output(&format!("expected failure: {}", mismatch));
        }
    });
    if let Some(err) = prepare.err() {
        root.output(&format!("prepare reported:\n{}", err));
    }

    let mut pending = Vec::with_capacity(workers);
    for i in 0..workers {
        let worker = root.run_concurrent(format!("worker-{}", i), move |ctx| {
            ctx.set_value("result", (i * i) as i64);
            if fail && i % 2 == 1 {
                ctx.append_error_from(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("worker {} lost its input", i),
                ));
                ctx.raise("giving up", None, ErrorKind::Unknown);
            }
            ctx.complete();
        });
        let done = worker.subscribe();
        pending.push((worker, done));
    }

    for (worker, done) in pending {
        if done.wait().is_err() {
            root.output(&format!("{} was dropped before completing", worker.function_name()));
            continue;
        }
        let result = worker
            .int_value("result")
            .map(|n| n.to_string())
            .unwrap_or_else(|e| e.to_string());
        root.output(&format!(
            "{} (request {}) -> {}",
            worker.function_name(),
            worker.string_value("request_id").unwrap_or_default(),
            result
        ));
        if let Some(err) = worker.err() {
            root.output(&format!("{} errors:\n{}", worker.function_name(), err));
        }
    }

    root.complete();
    info!(children = root.children().len(), "demo finished");
}
