// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod cli;
mod render;
mod repl;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::warn;
use tracing_appender::rolling::{Builder, RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use fimcode_config::LoggingConfig;
use fimcode_core::AgentBuilder;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("错误: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Subcommands that need no config or logging
    if let Some(Commands::Completions { shell }) = &cli.command {
        cli::print_completions(*shell);
        return Ok(());
    }

    let mut config = fimcode_config::load(cli.config.as_deref())?;
    if let Some(model) = &cli.model {
        config.model.name = model.clone();
    }

    if let Some(Commands::ShowConfig) = &cli.command {
        print!("{}", toml::to_string_pretty(&config).context("serializing config")?);
        return Ok(());
    }

    init_logging(cli.verbose, &config.logging);
    for line in fimcode_config::env_warnings(&config, |k| std::env::var(k).ok()) {
        warn!("{line}");
    }

    let work_dir = std::env::current_dir().context("resolving working directory")?;
    let model: Arc<dyn fimcode_model::ModelProvider> = Arc::from(fimcode_model::from_config(&config.model)?);
    let config = Arc::new(config);
    let agent = AgentBuilder::new(config.clone(), &work_dir).build(model);

    match cli.task() {
        Some(task) => repl::run_command(agent, &task).await,
        None => repl::run_repl(agent, &config).await,
    }
}

/// `RUST_LOG` wins, then `-v`, then `logging.level`.
fn log_filter(verbosity: u8, configured: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = match verbosity {
        0 => configured,
        1 => "debug",
        _ => "trace",
    };
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_logging(verbosity: u8, cfg: &LoggingConfig) {
    let file_layer = if cfg.file {
        cfg.resolve_dir().and_then(|dir| match log_file_appender(&dir) {
            Ok(appender) => Some(fmt::layer().with_ansi(false).with_writer(appender)),
            Err(e) => {
                eprintln!("无法打开日志文件: {e:#}");
                None
            }
        })
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .with(log_filter(verbosity, &cfg.level))
        .init();
}

/// Daily files `{dir}/fimcode.{YYYY-MM-DD}.log`; the date is checked on
/// every write, so a session running past midnight moves to a new file.
fn log_file_appender(dir: &Path) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    Builder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix("fimcode")
        .filename_suffix("log")
        .build(dir)
        .with_context(|| format!("opening log file in {}", dir.display()))
}
