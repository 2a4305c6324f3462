use clap::Parser;
use cmdchain_core::assembler::assemble;
use cmdchain_core::block_definitions::BlockDefinition;
use cmdchain_core::config::DEFAULT_SHELL;
use cmdchain_core::error::{Error, Result};
use cmdchain_core::instance::InstanceId;
use cmdchain_core::workflow::Workflow;
use cmdchain_core::workspace::Workspace;
use cmdchain_core::{config, execution, file_handling};
use itertools::Itertools;
use log::{debug, info};
use std::env;
use std::process::ExitCode;

use crate::arguments::{apply_assignments, collect_assignments};
use crate::cli_args::{Action, Args, RunOptions};
use crate::selection::{
    confirm_command_should_run, print_blocks, print_pipeline, suggest_block_id, RunChoice,
};

mod arguments;
mod cli_args;
mod selection;

/// A workspace ready to run, with the instance its chain should be picked by.
struct Prepared {
    workspace: Workspace,
    start: Option<InstanceId>,
}

fn load_definitions(config_path: &str) -> Result<Vec<BlockDefinition>> {
    debug!("Config path: `{config_path}`");
    file_handling::get_block_definitions(config_path)
}

/// Adds a "did you mean" hint to unknown block errors.
fn explain_unknown_block(error: Error, definitions: &[BlockDefinition]) -> Error {
    if let Error::UnknownBlock(block_id) = &error {
        if let Some(suggestion) = suggest_block_id(block_id, definitions) {
            eprintln!("Did you mean `{suggestion}`?");
        }
    }
    error
}

fn prepare_chain(definitions: Vec<BlockDefinition>, blocks: &[String]) -> Result<Prepared> {
    let mut workspace = Workspace::new(definitions.clone());

    let ids = blocks
        .iter()
        .map(|block_id| workspace.spawn(block_id))
        .collect::<Result<Vec<_>>>()
        .map_err(|e| explain_unknown_block(e, &definitions))?;

    for (from, to) in ids.iter().copied().tuple_windows() {
        workspace.link(from, to)?;
    }

    Ok(Prepared {
        start: ids.first().copied(),
        workspace,
    })
}

fn prepare_bootstrap(definitions: Vec<BlockDefinition>) -> Result<Prepared> {
    let mut workspace = Workspace::new(definitions);
    let start = workspace.bootstrap()?;

    Ok(Prepared { workspace, start })
}

fn prepare_workflow(
    definitions: Vec<BlockDefinition>,
    workflow: &Workflow,
    start_name: Option<&str>,
) -> Result<Prepared> {
    let built = workflow
        .instantiate(definitions.clone())
        .map_err(|e| explain_unknown_block(e, &definitions))?;

    let start = match start_name {
        Some(name) => Some(
            built
                .names
                .get(name)
                .copied()
                .ok_or_else(|| Error::UnknownNode(name.to_string()))?,
        ),
        None => built.start,
    };

    Ok(Prepared {
        workspace: built.workspace,
        start,
    })
}

fn run_pipeline(
    args: &Args,
    run: &RunOptions,
    config_path: &str,
    mut prepared: Prepared,
) -> Result<()> {
    let chain = prepared.workspace.select_chain_ids(prepared.start)?;
    if chain.is_empty() {
        println!("Nothing to execute.");
        return Ok(());
    }

    apply_assignments(&mut prepared.workspace, &chain, &collect_assignments(run)?)?;

    let instances = prepared.workspace.instances_of(&chain);
    let command_line = assemble(&instances);
    print_pipeline(&instances, &command_line)?;

    if run.dry_run {
        println!("Dry run is specified, exiting without executing.");
        return Ok(());
    }

    if !run.force && confirm_command_should_run()? == RunChoice::No {
        println!("Pipeline execution cancelled.");
        return Ok(());
    }

    let working_directory =
        config::existing_working_directory(run.working_directory.as_deref(), config_path)?;
    let environment = execution::pipeline_environment(&working_directory)?;

    if run.skip_workflow_save {
        info!("Skipping workflow save was specified. Not (over)writing last workflow.");
    } else {
        let last_workflow_path = config::get_last_workflow_path(args.last_workflow_path.as_deref());
        let workflow = Workflow::from_workspace(&prepared.workspace, chain.first().copied());
        file_handling::write_last_workflow(&last_workflow_path, &workflow)?;
    }

    let shell = env::var("SHELL").unwrap_or_else(|_| DEFAULT_SHELL.to_string());
    info!(
        "Executing pipeline in `{}`: {command_line}",
        working_directory.display()
    );

    let command = execution::shell_command(&shell, &command_line, &working_directory);
    execution::execute_command(command, Some(environment))
}

fn execute() -> Result<()> {
    let args = Args::parse();
    let config_path = config::get_config_path(args.config_path.as_deref());
    let definitions = load_definitions(&config_path)?;

    let prepared = match &args.action {
        Action::List => return print_blocks(&definitions),
        Action::Run {
            workflow, start, ..
        } => {
            let workflow = file_handling::get_workflow(workflow)?;
            prepare_workflow(definitions, &workflow, start.as_deref())?
        }
        Action::Chain { blocks, .. } => prepare_chain(definitions, blocks)?,
        Action::Bootstrap { .. } => prepare_bootstrap(definitions)?,
        Action::Rerun { .. } => {
            let last_workflow_path =
                config::get_last_workflow_path(args.last_workflow_path.as_deref());
            let workflow =
                file_handling::get_last_workflow(&last_workflow_path)?.ok_or(Error::NoLastWorkflow)?;
            prepare_workflow(definitions, &workflow, None)?
        }
    };

    let Some(run) = args.action.run_options() else {
        return Ok(());
    };

    run_pipeline(&args, run, &config_path, prepared)
}

fn main() -> ExitCode {
    env_logger::init();

    match execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
