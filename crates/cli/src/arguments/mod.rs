//! Flag assignments given on the command line.
//!
//! Assignments address a block in the chain and one of its flags:
//! - **`--set TARGET.FLAG=VALUE`**: enable a value flag with a new value
//! - **`--enable TARGET.FLAG`**: enable a flag as it is
//!
//! `TARGET` is either a 1-based chain position or a block ID.

// Export public items from submodules
pub mod processing;
pub mod validation;

// Re-exports for convenience
pub use processing::{apply_assignments, collect_assignments, parse_assignment, FlagAssignment};
pub use validation::{resolve_target, Target};
