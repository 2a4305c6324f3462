//! Configuration path utilities for cmdchain.
//!
//! Resolves the block definitions and last workflow paths, and the directory
//! a pipeline runs in. Shell expansions like `~` are applied throughout.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default path for the block definitions file
const DEFAULT_CONFIG_PATH: &str = "~/.cmdchain/blocks.yml";
/// Default path for storing the last executed workflow
const DEFAULT_LAST_WORKFLOW_PATH: &str = "~/.cmdchain/last_workflow.yml";

/// Default shell to use for command execution
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Virtual environment directory looked up inside the working directory.
pub const VENV_DIRECTORY: &str = ".venv";

fn resolve(path_arg: Option<&str>, default: &str) -> String {
    shellexpand::tilde(path_arg.unwrap_or(default)).to_string()
}

/// The block definitions file, `~/.cmdchain/blocks.yml` unless overridden.
///
/// # Examples
///
/// ```
/// use cmdchain_core::config::get_config_path;
///
/// assert_eq!(get_config_path(Some("/etc/blocks.yml")), "/etc/blocks.yml");
/// assert!(get_config_path(None).ends_with("blocks.yml"));
/// ```
#[must_use]
pub fn get_config_path(config_path_arg: Option<&str>) -> String {
    resolve(config_path_arg, DEFAULT_CONFIG_PATH)
}

/// The file the last executed workflow is saved to.
#[must_use]
pub fn get_last_workflow_path(last_workflow_path_arg: Option<&str>) -> String {
    resolve(last_workflow_path_arg, DEFAULT_LAST_WORKFLOW_PATH)
}

/// Resolves the directory a pipeline runs in.
///
/// Relative paths, including the default `.`, are taken relative to the
/// directory holding the block definitions file.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use cmdchain_core::config::resolve_working_directory;
///
/// let resolved = resolve_working_directory(Some("tools"), "/srv/blocks.yml");
/// assert_eq!(resolved, PathBuf::from("/srv/tools"));
/// ```
#[must_use]
pub fn resolve_working_directory(working_directory: Option<&str>, config_path: &str) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(working_directory.unwrap_or(".")).into_owned());
    if expanded.is_absolute() {
        return expanded;
    }

    let base = Path::new(config_path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    if expanded == Path::new(".") {
        base.to_path_buf()
    } else {
        base.join(expanded)
    }
}

/// Like [`resolve_working_directory`], but the directory must exist.
///
/// # Errors
///
/// Returns [`Error::Io`] if the resolved path is not a directory.
pub fn existing_working_directory(
    working_directory: Option<&str>,
    config_path: &str,
) -> Result<PathBuf> {
    let resolved = resolve_working_directory(working_directory, config_path);
    if !resolved.is_dir() {
        return Err(Error::io_error(
            "working directory".to_string(),
            resolved.display().to_string(),
            io::Error::new(io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    Ok(resolved)
}
