//! Turns an ordered chain of block instances into one command string.

use itertools::Itertools;

use crate::instance::BlockInstance;

/// Renders one block: its base command followed by every enabled flag, in the
/// order the definition declares them.
#[must_use]
pub fn render_segment(instance: &BlockInstance) -> String {
    let definition = instance.definition();

    std::iter::once(definition.command.clone())
        .chain(
            definition
                .flags
                .iter()
                .filter_map(|flag| instance.render_flag(&flag.key)),
        )
        .join(" ")
}

/// Renders a chain in order, one segment per block, separated by single spaces.
///
/// An empty chain renders as an empty string.
#[must_use]
pub fn assemble(chain: &[&BlockInstance]) -> String {
    chain.iter().map(|instance| render_segment(instance)).join(" ")
}
