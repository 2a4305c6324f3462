//! Terminal output and user input for cmdchain.
//!
//! - **Block Colors**: Blocks and pipeline segments are drawn in their block color
//! - **Suggestions**: Unknown block IDs get a fuzzy "did you mean" hint
//! - **Command Confirmation**: Confirmation prompt before execution

// Export public items from submodules
pub mod colors;
pub mod input;
pub mod suggestions;

// Re-exports for convenience
pub use colors::{print_blocks, print_pipeline, AsTermColor};
pub use input::{confirm_command_should_run, RunChoice};
pub use suggestions::suggest_block_id;
