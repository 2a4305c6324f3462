use cmdchain_core::error::Error::UnknownTarget;
use cmdchain_core::error::Result;
use cmdchain_core::instance::InstanceId;
use cmdchain_core::workspace::Workspace;

/// The block an assignment addresses.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Target {
    /// 1-based position in the chain
    Position(usize),
    /// First instance of this block in the chain
    Block(String),
}

impl Target {
    /// Purely numeric targets are positions, anything else is a block ID.
    #[must_use]
    pub fn parse(target: &str) -> Self {
        match target.parse::<usize>() {
            Ok(position) => Target::Position(position),
            Err(_) => Target::Block(target.to_string()),
        }
    }
}

/// Finds the instance in `chain` that `target` addresses.
///
/// # Errors
///
/// Returns [`UnknownTarget`] if the position is out of range or no block in
/// the chain has that ID.
pub fn resolve_target(
    target: &Target,
    chain: &[InstanceId],
    workspace: &Workspace,
) -> Result<InstanceId> {
    let found = match target {
        Target::Position(position) => position
            .checked_sub(1)
            .and_then(|index| chain.get(index))
            .copied(),
        Target::Block(block_id) => chain.iter().copied().find(|id| {
            workspace
                .instance(*id)
                .is_some_and(|instance| instance.definition().id == *block_id)
        }),
    };

    found.ok_or_else(|| {
        UnknownTarget(match target {
            Target::Position(position) => position.to_string(),
            Target::Block(block_id) => block_id.clone(),
        })
    })
}
