//! File handling and validation for cmdchain configuration.
//!
//! This module parses block definitions, checks their IDs and flag keys, and
//! reads and writes workflow documents, including the last executed one.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use log::debug;

use crate::block_definitions::{BlockConfig, BlockDefinition, RawConfig};
use crate::error::Error::{NonUniqueBlockId, NonUniqueFlagKey};
use crate::error::{Error, Result};
use crate::workflow::Workflow;

fn get_reader(file_description: &str, path: &str) -> Result<File> {
    match File::open(path) {
        Ok(reader) => Ok(reader),
        Err(e) => Err(Error::io_error(
            file_description.to_string(),
            path.to_string(),
            e,
        )),
    }
}

fn validate_flags(block: &BlockDefinition) -> Result<()> {
    let mut keys = HashSet::new();
    for flag in &block.flags {
        if !keys.insert(flag.key.as_str()) {
            // Found a duplicate key
            return Err(NonUniqueFlagKey(block.id.clone(), flag.key.clone()));
        }
    }

    Ok(())
}

fn validate_block_ids(blocks: &[BlockDefinition]) -> Result<()> {
    let mut ids = HashSet::new();

    for block in blocks {
        if !ids.insert(block.id.as_str()) {
            // Found a duplicate ID
            return Err(NonUniqueBlockId(block.id.clone()));
        }

        validate_flags(block)?;
    }

    Ok(())
}

/// Parses and validates block definitions from a YAML document.
///
/// The document holds a top-level `blocks` list. Option names are normalized
/// on the way in, see [`crate::block_definitions::ensure_prefixed`]. A blank
/// document yields no definitions.
///
/// # Errors
///
/// Returns an error if:
/// - The YAML is malformed or doesn't match the expected structure
/// - A block lacks `id`, `title` or `command`, or a flag lacks `long`
/// - Block IDs or flag keys within a block are not unique
/// - A value flag has a default that is not a plain scalar
///
/// # Examples
///
/// ```
/// use cmdchain_core::file_handling::load_definitions;
///
/// let blocks = load_definitions(
///     "blocks:\n  - id: list\n    title: List\n    command: ls\n    flags:\n      - long: all\n",
/// )?;
/// assert_eq!(blocks[0].flags[0].long, "--all");
/// # Ok::<(), cmdchain_core::error::Error>(())
/// ```
pub fn load_definitions(source: &str) -> Result<Vec<BlockDefinition>> {
    if source.trim().is_empty() {
        return Ok(Vec::new());
    }

    let raw: RawConfig = serde_yaml::from_str(source).map_err(Error::ConfigSyntax)?;

    let blocks = raw
        .blocks
        .into_iter()
        .enumerate()
        .map(|(index, block)| block.normalize(index))
        .collect::<Result<Vec<_>>>()?;

    validate_block_ids(&blocks)?;
    debug!("Loaded {} block definition(s)", blocks.len());

    Ok(blocks)
}

/// Serializes definitions back into the document shape [`load_definitions`]
/// reads.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn definitions_to_yaml(blocks: &[BlockDefinition]) -> Result<String> {
    serde_yaml::to_string(&BlockConfig { blocks }).map_err(Error::ConfigWrite)
}

/// Loads and validates block definitions from a configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, if it holds no blocks, or for
/// any reason listed on [`load_definitions`].
///
/// # Examples
///
/// ```no_run
/// use cmdchain_core::file_handling::get_block_definitions;
///
/// let blocks = get_block_definitions("/home/me/.cmdchain/blocks.yml")?;
/// println!("Loaded {} blocks", blocks.len());
/// # Ok::<(), cmdchain_core::error::Error>(())
/// ```
pub fn get_block_definitions(config_path: &str) -> Result<Vec<BlockDefinition>> {
    let source = std::fs::read_to_string(config_path)
        .map_err(|e| Error::io_error("config".to_string(), config_path.to_string(), e))?;

    let blocks = load_definitions(&source)?;

    if blocks.is_empty() {
        return Err(Error::empty_block_definition(config_path.to_string()));
    }

    Ok(blocks)
}

/// Reads a workflow document.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid workflow.
pub fn get_workflow(workflow_path: &str) -> Result<Workflow> {
    let reader = get_reader("workflow", workflow_path)?;

    serde_yaml::from_reader(reader).map_err(|e| {
        Error::yaml_error(
            "reading".to_string(),
            "workflow".to_string(),
            workflow_path.to_string(),
            e,
        )
    })
}

/// Reads the last executed workflow, or `None` if nothing was saved yet.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn get_last_workflow(last_workflow_path: &str) -> Result<Option<Workflow>> {
    if !Path::exists(Path::new(last_workflow_path)) {
        return Ok(None);
    }

    get_workflow(last_workflow_path).map(Some)
}

/// Writes the last executed workflow to disk, creating its directory if needed.
///
/// # Errors
///
/// Returns an error if the file cannot be created or serialization fails.
pub fn write_last_workflow(path: &str, workflow: &Workflow) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::io_error("last workflow".to_string(), path.to_string(), e))?;
    }

    let f = File::create(path)
        .map_err(|e| Error::io_error("last workflow".to_string(), path.to_string(), e))?;

    serde_yaml::to_writer(f, workflow).map_err(|e| {
        Error::yaml_error(
            "writing".to_string(),
            "last workflow".to_string(),
            path.to_string(),
            e,
        )
    })
}
