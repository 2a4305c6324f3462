//! Block instances: placed, mutable copies of a block definition.

use std::fmt::{Display, Formatter};
use std::rc::Rc;

use indexmap::IndexMap;
use log::debug;

use crate::block_definitions::{BlockDefinition, FlagDefinition, FlagValue};
use crate::error::{Error, Result};

/// Identifies a block instance within a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

impl Display for InstanceId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagState {
    pub enabled: bool,
    pub value: FlagValue,
}

impl FlagState {
    fn from_definition(flag: &FlagDefinition) -> Self {
        Self {
            enabled: false,
            value: flag.default.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BlockInstance {
    definition: Rc<BlockDefinition>,
    flags: IndexMap<String, FlagState>,
}

impl BlockInstance {
    #[must_use]
    pub fn new(definition: Rc<BlockDefinition>) -> Self {
        let flags = definition
            .flags
            .iter()
            .map(|flag| (flag.key.clone(), FlagState::from_definition(flag)))
            .collect();

        Self { definition, flags }
    }

    #[must_use]
    pub fn definition(&self) -> &BlockDefinition {
        &self.definition
    }

    #[must_use]
    pub fn flag_state(&self, key: &str) -> Option<&FlagState> {
        self.flags.get(key)
    }

    fn flag_definition(&self, key: &str) -> Result<&FlagDefinition> {
        self.definition
            .flag(key)
            .ok_or_else(|| Error::UnknownFlag(self.definition.id.clone(), key.to_string()))
    }

    fn state_mut(&mut self, key: &str) -> Result<&mut FlagState> {
        let block = &self.definition.id;
        self.flags
            .get_mut(key)
            .ok_or_else(|| Error::UnknownFlag(block.clone(), key.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`Error::UnknownFlag`] if the block has no flag `key`.
    pub fn set_enabled(&mut self, key: &str, enabled: bool) -> Result<()> {
        self.state_mut(key)?.enabled = enabled;
        Ok(())
    }

    /// Replaces the value of a value-taking flag. Does not enable it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFlag`] for an unknown key and
    /// [`Error::InvalidOperation`] if the flag does not take a value.
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        if !self.flag_definition(key)?.takes_value {
            return Err(Error::InvalidOperation(
                self.definition.id.clone(),
                format!("flag `{key}` does not take a value"),
            ));
        }

        self.state_mut(key)?.value = FlagValue::Text(value.into());
        Ok(())
    }

    /// The command-line form of one flag, or `None` while it is disabled.
    ///
    /// The placeholder is never rendered: an enabled value flag with an empty
    /// value still renders, followed by an empty value token.
    #[must_use]
    pub fn render_flag(&self, key: &str) -> Option<String> {
        let flag = self.definition.flag(key)?;
        let state = self.flags.get(key)?;

        if !state.enabled {
            return None;
        }

        if flag.takes_value {
            let value = state.value.as_text().unwrap_or_default();
            Some(format!("{} {value}", flag.long))
        } else {
            Some(flag.long.clone())
        }
    }

    /// Binds the instance to a reloaded definition of the same block.
    ///
    /// Keys missing from the new definition are dropped, new keys start from
    /// their default, and a flag that switched between taking a value and not
    /// is reset.
    pub fn rebind(&mut self, definition: Rc<BlockDefinition>) {
        let mut flags = IndexMap::with_capacity(definition.flags.len());

        for flag in &definition.flags {
            let kept = self.flags.get(&flag.key).filter(|state| {
                matches!(
                    (&state.value, flag.takes_value),
                    (FlagValue::Text(_), true) | (FlagValue::Switch(_), false)
                )
            });

            let state = match kept {
                Some(state) => state.clone(),
                None => FlagState::from_definition(flag),
            };
            flags.insert(flag.key.clone(), state);
        }

        for key in self.flags.keys().filter(|key| !flags.contains_key(*key)) {
            debug!("Dropping stale flag `{key}` from block `{}`", definition.id);
        }

        self.definition = definition;
        self.flags = flags;
    }
}
