//! cmdchain CLI Library
//!
//! This crate provides the command-line interface for cmdchain. It builds a
//! chain of blocks from a workflow file, from block IDs on the command line or
//! from every bootstrap block, applies flag assignments, shows the assembled
//! command and runs it after confirmation.
//!
//! # Architecture
//!
//! - [`cli_args`]: Command-line argument parsing
//! - [`arguments`]: `--set` / `--enable` flag assignments
//! - [`selection`]: Colored output, suggestions and confirmation
//!
//! # Examples
//!
//! ```bash
//! # Show the blocks from ~/.cmdchain/blocks.yml
//! cmdchain list
//!
//! # Chain two blocks and set a value on the first
//! cmdchain chain ocr_stage1 cleanup_stage2 --set 1.input=scan.pdf --enable ocr_stage1.jpeg-quality
//!
//! # Run a workflow document starting from one of its nodes
//! cmdchain run pipeline.yml --start scan
//!
//! # Dry run (don't execute, just show what would run)
//! cmdchain bootstrap --dry-run
//!
//! # Rerun the last pipeline
//! cmdchain rerun
//! ```

pub mod arguments;
pub mod cli_args;
pub mod selection;
