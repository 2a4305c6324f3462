//! Command-line argument parsing and validation.
//!
//! This module defines the command-line interface structure using the `clap`
//! crate.

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Command-line arguments for the cmdchain CLI tool.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use cmdchain_cli::cli_args::Args;
///
/// let args = Args::parse_from(["cmdchain", "chain", "ocr_stage1", "--dry-run"]);
/// assert!(args.action.run_options().is_some_and(|run| run.dry_run));
/// ```
#[derive(Parser, Debug)] // requires `derive` feature
#[command(term_width = 0)] // Just to make testing across clap features easier
pub struct Args {
    /// Path to the block definitions YAML.
    ///
    /// If not provided, defaults to `~/.cmdchain/blocks.yml`.
    #[arg(long, short = 'c', global = true)]
    pub config_path: Option<String>,

    /// Path to the file that stores the last executed workflow.
    ///
    /// If not provided, defaults to `~/.cmdchain/last_workflow.yml`.
    #[arg(long, short = 'l', global = true)]
    pub last_workflow_path: Option<String>,

    #[command(subcommand)]
    pub action: Action,
}

#[derive(Subcommand, Debug)]
pub enum Action {
    /// List the available blocks and their flags.
    List,

    /// Run a workflow document.
    Run {
        /// Path to the workflow YAML.
        workflow: String,

        /// Name of a node in the chain to run. Overrides the workflow's `start`.
        #[arg(long)]
        start: Option<String>,

        #[command(flatten)]
        run: RunOptions,
    },

    /// Chain blocks in the given order and run them.
    Chain {
        /// Block IDs, linked first to last.
        #[arg(required = true, num_args(1..))]
        blocks: Vec<String>,

        #[command(flatten)]
        run: RunOptions,
    },

    /// Chain every bootstrap block, sorted by title, and run them.
    Bootstrap {
        #[command(flatten)]
        run: RunOptions,
    },

    /// Rerun the last executed workflow.
    Rerun {
        #[command(flatten)]
        run: RunOptions,
    },
}

impl Action {
    /// Options shared by every action that runs a pipeline.
    #[must_use]
    pub fn run_options(&self) -> Option<&RunOptions> {
        match self {
            Action::List => None,
            Action::Run { run, .. }
            | Action::Chain { run, .. }
            | Action::Bootstrap { run }
            | Action::Rerun { run } => Some(run),
        }
    }
}

#[derive(ClapArgs, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)] // silence clippy's warning on this struct
pub struct RunOptions {
    /// Enable a value flag and set its value, as `TARGET.FLAG=VALUE`.
    ///
    /// `TARGET` is a 1-based position in the chain or a block ID.
    ///
    /// # Examples
    /// ```bash
    /// cmdchain chain ocr_stage1 cleanup_stage2 --set 1.input=scan.pdf
    /// ```
    #[arg(long = "set", action = clap::ArgAction::Append)]
    pub set: Vec<String>,

    /// Enable a flag, as `TARGET.FLAG`.
    #[arg(long = "enable", action = clap::ArgAction::Append)]
    pub enable: Vec<String>,

    /// Directory to run the pipeline in.
    ///
    /// Relative paths are resolved against the block definitions directory,
    /// which is also the default.
    #[arg(long, short = 'w')]
    pub working_directory: Option<String>,

    /// Perform a dry run, which just prints out the command but does not execute it.
    #[arg(long, short = 'd', action)]
    pub dry_run: bool,

    /// Run the command without first confirming if the command should be run.
    #[arg(long, short = 'f', action)]
    pub force: bool,

    /// Skip saving this pipeline as the last workflow to rerun.
    #[arg(long, short = 's', action)]
    pub skip_workflow_save: bool,
}
