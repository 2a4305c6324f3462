use thiserror::Error;

use crate::instance::InstanceId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("The sub process exiting with non-success code.")]
    SubProcessExit,

    #[error("Error with sub process process: {}", _0)]
    SubProcess(#[from] std::io::Error),

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Yaml {
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    },

    #[error("Error parsing block configuration: {}", .0)]
    ConfigSyntax(serde_yaml::Error),

    #[error("Error writing block configuration: {}", .0)]
    ConfigWrite(serde_yaml::Error),

    #[error("No blocks were found in the block definition YAML. Is `{}` empty?", .path)]
    EmptyBlockDefinition { path: String },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("STDIO error: {}", .0)]
    Stdio(std::io::Error),

    #[error("Found a non-unique block ID: `{}`", .0)]
    NonUniqueBlockId(String),

    #[error("Found a non-unique flag key on block {}: `{}`", .0, .1)]
    NonUniqueFlagKey(String, String),

    #[error("Block {} is missing required field `{}`", .block, .field)]
    MissingField { block: String, field: String },

    #[error("Flag `{}` on block {} has no long option", .1, .0)]
    MissingLongOption(String, String),

    #[error("Flag `{}` on block {} has a default that is not a plain value", .1, .0)]
    InvalidDefault(String, String),

    #[error("Block instance {} already has an outgoing connection or {} already has an incoming one", .from, .to)]
    DegreeViolation { from: InstanceId, to: InstanceId },

    #[error("Connecting {} to {} would close a cycle", .from, .to)]
    CycleViolation { from: InstanceId, to: InstanceId },

    #[error("Block instance {} cannot be connected to itself", .0)]
    SelfLoop(InstanceId),

    #[error("No connection from {} to {}", .from, .to)]
    NotFound { from: InstanceId, to: InstanceId },

    #[error("No block instance with ID {}", .0)]
    UnknownInstance(InstanceId),

    #[error("Invalid operation on block {}: {}", .0, .1)]
    InvalidOperation(String, String),

    #[error("Block {} has no flag `{}`", .0, .1)]
    UnknownFlag(String, String),

    #[error("No block definition with ID `{}`", .0)]
    UnknownBlock(String),

    #[error("Workflow has no node named `{}`", .0)]
    UnknownNode(String),

    #[error("Found a non-unique node name in workflow: `{}`", .0)]
    NonUniqueNodeName(String),

    #[error("Workspace holds {} separate chains, a start block is required to pick one", .0)]
    AmbiguousChain(usize),

    #[error("Flag assignment `{}` is malformed, expected {}", .0, .1)]
    ArgumentFormat(String, String),

    #[error("No block in the chain matches `{}`", .0)]
    UnknownTarget(String),

    #[error("There is no previous workflow to rerun.")]
    NoLastWorkflow,
}

impl Error {
    pub fn empty_block_definition(path: String) -> Self {
        Self::EmptyBlockDefinition { path }
    }

    pub fn missing_field(block: &str, field: &str) -> Self {
        Self::MissingField {
            block: block.to_string(),
            field: field.to_string(),
        }
    }

    pub fn yaml_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }

    /// Whether the error was raised while loading block definitions.
    ///
    /// These are fatal to loading and surface before any instance exists.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Yaml { .. }
                | Self::ConfigSyntax(_)
                | Self::EmptyBlockDefinition { .. }
                | Self::Io { .. }
                | Self::NonUniqueBlockId(_)
                | Self::NonUniqueFlagKey(..)
                | Self::MissingField { .. }
                | Self::MissingLongOption(..)
                | Self::InvalidDefault(..)
        )
    }

    /// Whether the error is a rejected link or unlink.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::DegreeViolation { .. }
                | Self::CycleViolation { .. }
                | Self::SelfLoop(_)
                | Self::NotFound { .. }
                | Self::UnknownInstance(_)
        )
    }
}
