//! cmdchain Core Library
//!
//! This crate provides the core functionality for cmdchain, a tool that chains
//! command-line invocations ("blocks") into a single shell command. Blocks are
//! defined in YAML, placed as instances with their own flag state, linked into
//! linear chains, and rendered in chain order.
//!
//! # Key Features
//!
//! - **Block Definitions**: Parse, normalize and validate YAML block configurations
//! - **Block Instances**: Per-instance flag state with deterministic rendering
//! - **Connections**: Linear-chain links with degree, cycle and self-loop checks
//! - **Assembly**: Render a chain of instances into one command string
//! - **Workflows**: Describe and persist a workspace as YAML
//! - **Execution**: Virtual environment `PATH` wiring and subprocess launch
//!
//! # Examples
//!
//! ```
//! use cmdchain_core::file_handling::load_definitions;
//! use cmdchain_core::workspace::Workspace;
//!
//! let blocks = load_definitions(
//!     "blocks:\n  - id: list\n    title: List\n    command: ls\n    flags:\n      - long: all\n",
//! )?;
//! let mut workspace = Workspace::new(blocks);
//! let id = workspace.spawn("list")?;
//! if let Some(instance) = workspace.instance_mut(id) {
//!     instance.set_enabled("all", true)?;
//! }
//! assert_eq!(workspace.assemble_from(id)?, "ls --all");
//! # Ok::<(), cmdchain_core::error::Error>(())
//! ```

pub mod assembler;
pub mod block_definitions;
pub mod config;
pub mod connections;
pub mod error;
pub mod execution;
pub mod file_handling;
pub mod instance;
pub mod workflow;
pub mod workspace;
