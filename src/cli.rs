// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "fimcode",
    about = "A terminal coding agent with skills, subagents and a task list",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Run a single task and exit.  Without it an interactive session starts.
    #[arg(value_name = "PROMPT")]
    pub prompt: Vec<String>,

    /// Path to config file (layered on top of the discovered ones)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Model to use, e.g. "claude-sonnet-4-5"
    #[arg(long, short = 'M')]
    pub model: Option<String>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Print the effective configuration and exit
    ShowConfig,
}

impl Cli {
    /// The one-shot task, if any.  Words are joined with single spaces.
    pub fn task(&self) -> Option<String> {
        let task = self.prompt.join(" ");
        let task = task.trim();
        (!task.is_empty()).then(|| task.to_string())
    }
}

pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "fimcode", &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn prompt_words_are_joined() {
        let cli = Cli::parse_from(["fimcode", "fix", "the", "tests"]);
        assert_eq!(cli.task().as_deref(), Some("fix the tests"));
    }

    #[test]
    fn no_prompt_means_interactive() {
        let cli = Cli::parse_from(["fimcode", "-vv"]);
        assert_eq!(cli.task(), None);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn subcommands_parse() {
        let cli = Cli::parse_from(["fimcode", "show-config"]);
        assert!(matches!(cli.command, Some(Commands::ShowConfig)));
    }
}
