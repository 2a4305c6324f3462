use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{info, warn};

use crate::config::VENV_DIRECTORY;
use crate::error::{Error, Result};

/// Executable directory of the virtual environment under `root`.
#[must_use]
pub fn venv_bin_directory(root: &Path) -> PathBuf {
    let venv = root.join(VENV_DIRECTORY);
    if cfg!(windows) {
        venv.join("Scripts")
    } else {
        venv.join("bin")
    }
}

/// Prepends `directory` to a `PATH`-style value.
///
/// # Errors
///
/// Returns [`Error::Stdio`] if the joined value contains a path separator
/// inside one of its entries.
pub fn prepend_to_path(directory: &Path, existing: Option<OsString>) -> Result<OsString> {
    let mut entries = vec![directory.to_path_buf()];
    if let Some(existing) = existing {
        entries.extend(env::split_paths(&existing));
    }

    env::join_paths(entries)
        .map_err(|e| Error::Stdio(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))
}

/// The process environment with the virtual environment under `root`
/// prepended to `PATH`, when that environment exists. Variables that are not
/// valid unicode are left out and simply inherited by the child.
///
/// # Errors
///
/// See [`prepend_to_path`].
pub fn pipeline_environment(root: &Path) -> Result<HashMap<String, String>> {
    let mut environment: HashMap<String, String> = env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect();

    let bin_directory = venv_bin_directory(root);
    if bin_directory.is_dir() {
        let path = prepend_to_path(&bin_directory, env::var_os("PATH"))?;
        environment.insert("PATH".to_string(), path.to_string_lossy().into_owned());
    } else {
        warn!(
            "Expected virtual environment at `{}` was not found",
            bin_directory.display()
        );
    }

    Ok(environment)
}

/// Executes a command with optional environment variables.
///
/// # Errors
///
/// Returns an error if command execution fails or exits with non-zero status.
pub fn execute_command<S: ::std::hash::BuildHasher>(
    mut command: Command,
    environment: Option<HashMap<String, String, S>>,
) -> Result<()> {
    let mut command = command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    if let Some(environment) = environment {
        info!("Executing with {} environment variables", environment.len());
        command = command.envs(environment);
    };

    let subprocess_exit_success = command.spawn()?.wait()?.success();

    if subprocess_exit_success {
        Ok(())
    } else {
        Err(Error::SubProcessExit)
    }
}

/// Builds the shell invocation that runs `command_line` inside `working_directory`.
#[must_use]
pub fn shell_command(shell: &str, command_line: &str, working_directory: &Path) -> Command {
    let mut command = Command::new(shell);
    command.current_dir(working_directory);
    command.args(["-c", command_line]);
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_venv_bin_directory() {
        let directory = venv_bin_directory(Path::new("/srv/edsuite"));
        assert!(directory.starts_with("/srv/edsuite/.venv"));
    }

    #[test]
    fn test_prepend_to_path() {
        let existing = env::join_paths(["/usr/bin", "/bin"]).unwrap();

        let joined = prepend_to_path(Path::new("/srv/.venv/bin"), Some(existing)).unwrap();

        let entries: Vec<PathBuf> = env::split_paths(&joined).collect();
        assert_eq!(
            entries,
            vec![
                PathBuf::from("/srv/.venv/bin"),
                PathBuf::from("/usr/bin"),
                PathBuf::from("/bin"),
            ]
        );
    }

    #[test]
    fn test_pipeline_environment_with_venv() {
        let root = tempfile::tempdir().unwrap();
        let bin_directory = venv_bin_directory(root.path());
        std::fs::create_dir_all(&bin_directory).unwrap();

        let environment = pipeline_environment(root.path()).unwrap();

        let path = environment.get("PATH").unwrap();
        let first = env::split_paths(path).next().unwrap();
        assert_eq!(first, bin_directory);
    }

    #[test]
    fn test_pipeline_environment_without_venv() {
        let root = tempfile::tempdir().unwrap();

        let environment = pipeline_environment(root.path()).unwrap();

        assert_eq!(environment.get("PATH").cloned(), env::var("PATH").ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_command_reports_failure() {
        let root = tempfile::tempdir().unwrap();

        let succeeded = shell_command("/bin/sh", "true", root.path());
        assert!(execute_command::<std::hash::RandomState>(succeeded, None).is_ok());

        let failed = shell_command("/bin/sh", "exit 3", root.path());
        assert!(matches!(
            execute_command::<std::hash::RandomState>(failed, None),
            Err(Error::SubProcessExit)
        ));
    }
}
