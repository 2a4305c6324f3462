use crate::arguments::validation::{resolve_target, Target};
use crate::cli_args::RunOptions;
use cmdchain_core::error::Error::ArgumentFormat;
use cmdchain_core::error::Result;
use cmdchain_core::instance::InstanceId;
use cmdchain_core::workspace::Workspace;
use log::debug;

/// One parsed `--set` or `--enable` argument.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct FlagAssignment {
    pub target: Target,
    pub flag: String,
    /// `None` enables the flag without touching its value.
    pub value: Option<String>,
}

/// Parses `TARGET.FLAG=VALUE` (with `with_value`) or `TARGET.FLAG`.
///
/// # Errors
///
/// Returns [`ArgumentFormat`] if the target, flag or `=` is missing, or if
/// an `=` is given where no value is expected. The value itself may be empty.
///
/// # Examples
///
/// ```rust
/// use cmdchain_cli::arguments::{parse_assignment, Target};
///
/// let assignment = parse_assignment("2.input=scan.pdf", true).unwrap();
/// assert_eq!(assignment.target, Target::Position(2));
/// assert_eq!(assignment.flag, "input");
/// assert_eq!(assignment.value.as_deref(), Some("scan.pdf"));
/// ```
pub fn parse_assignment(raw: &str, with_value: bool) -> Result<FlagAssignment> {
    let expected = if with_value {
        "TARGET.FLAG=VALUE"
    } else {
        "TARGET.FLAG"
    };
    let format_error = || ArgumentFormat(raw.to_string(), expected.to_string());

    let (address, value) = match (raw.split_once('='), with_value) {
        (Some((address, value)), true) => (address, Some(value.to_string())),
        (None, false) => (raw, None),
        _ => return Err(format_error()),
    };

    let (target, flag) = address.split_once('.').ok_or_else(format_error)?;
    let (target, flag) = (target.trim(), flag.trim());
    if target.is_empty() || flag.is_empty() {
        return Err(format_error());
    }

    Ok(FlagAssignment {
        target: Target::parse(target),
        flag: flag.to_string(),
        value,
    })
}

/// Parses every `--enable` and then every `--set` of `run`.
///
/// # Errors
///
/// Returns the first [`ArgumentFormat`] error encountered.
pub fn collect_assignments(run: &RunOptions) -> Result<Vec<FlagAssignment>> {
    let enabled = run.enable.iter().map(|raw| parse_assignment(raw, false));
    let set = run.set.iter().map(|raw| parse_assignment(raw, true));

    enabled.chain(set).collect()
}

/// Applies assignments to the instances of `chain`, in order.
///
/// # Errors
///
/// Returns an error if a target does not resolve, a flag is unknown, or a
/// value is given for a flag that takes none.
pub fn apply_assignments(
    workspace: &mut Workspace,
    chain: &[InstanceId],
    assignments: &[FlagAssignment],
) -> Result<()> {
    for assignment in assignments {
        let id = resolve_target(&assignment.target, chain, workspace)?;
        let Some(instance) = workspace.instance_mut(id) else {
            continue;
        };

        if let Some(value) = &assignment.value {
            instance.set_value(&assignment.flag, value.as_str())?;
        }
        instance.set_enabled(&assignment.flag, true)?;
        debug!("Enabled `{}` on {id}", assignment.flag);
    }

    Ok(())
}
