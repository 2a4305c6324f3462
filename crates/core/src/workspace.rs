//! The working set of block instances and their connections.

use std::rc::Rc;

use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, warn};

use crate::assembler;
use crate::block_definitions::BlockDefinition;
use crate::connections::{Connection, ConnectionSet};
use crate::error::{Error, Result};
use crate::instance::{BlockInstance, InstanceId};

#[derive(Debug, Default)]
pub struct Workspace {
    definitions: IndexMap<String, Rc<BlockDefinition>>,
    instances: IndexMap<InstanceId, BlockInstance>,
    connections: ConnectionSet,
    next_id: u64,
}

impl Workspace {
    #[must_use]
    pub fn new(definitions: Vec<BlockDefinition>) -> Self {
        Self {
            definitions: index_definitions(definitions),
            ..Self::default()
        }
    }

    pub fn definitions(&self) -> impl Iterator<Item = &BlockDefinition> {
        self.definitions.values().map(|definition| &**definition)
    }

    #[must_use]
    pub fn definition(&self, block_id: &str) -> Option<&BlockDefinition> {
        self.definitions.get(block_id).map(|definition| &**definition)
    }

    /// Places a new instance of the block `block_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBlock`] if no definition has that ID.
    pub fn spawn(&mut self, block_id: &str) -> Result<InstanceId> {
        let definition = self
            .definitions
            .get(block_id)
            .cloned()
            .ok_or_else(|| Error::UnknownBlock(block_id.to_string()))?;

        self.next_id += 1;
        let id = InstanceId(self.next_id);

        self.instances.insert(id, BlockInstance::new(definition));
        self.connections.insert_instance(id);
        debug!("Spawned {id} from block `{block_id}`");

        Ok(id)
    }

    #[must_use]
    pub fn instance(&self, id: InstanceId) -> Option<&BlockInstance> {
        self.instances.get(&id)
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut BlockInstance> {
        self.instances.get_mut(&id)
    }

    pub fn instances(&self) -> impl Iterator<Item = (InstanceId, &BlockInstance)> {
        self.instances.iter().map(|(id, instance)| (*id, instance))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    #[must_use]
    pub fn connections(&self) -> &ConnectionSet {
        &self.connections
    }

    /// Removes an instance together with every connection touching it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownInstance`] if the ID is not in the workspace.
    pub fn remove_instance(&mut self, id: InstanceId) -> Result<BlockInstance> {
        let instance = self
            .instances
            .shift_remove(&id)
            .ok_or(Error::UnknownInstance(id))?;

        let removed: Vec<Connection> = self.connections.remove_instance(id);
        debug!("Removed {id} and {} connection(s)", removed.len());

        Ok(instance)
    }

    /// # Errors
    ///
    /// See [`ConnectionSet::link`].
    pub fn link(&mut self, from: InstanceId, to: InstanceId) -> Result<()> {
        self.connections.link(from, to)
    }

    /// # Errors
    ///
    /// See [`ConnectionSet::unlink`].
    pub fn unlink(&mut self, from: InstanceId, to: InstanceId) -> Result<()> {
        self.connections.unlink(from, to)
    }

    #[must_use]
    pub fn chains(&self) -> Vec<Vec<InstanceId>> {
        self.connections.chains()
    }

    /// Looks up instances in the given order, skipping unknown IDs.
    #[must_use]
    pub fn instances_of(&self, ids: &[InstanceId]) -> Vec<&BlockInstance> {
        ids.iter().filter_map(|id| self.instances.get(id)).collect()
    }

    /// The instances of the chain containing `id`, head first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownInstance`] if the ID is not in the workspace.
    pub fn chain_from(&self, id: InstanceId) -> Result<Vec<&BlockInstance>> {
        let ids = self
            .connections
            .chain_containing(id)
            .ok_or(Error::UnknownInstance(id))?;

        Ok(self.instances_of(&ids))
    }

    /// Picks the chain to execute.
    ///
    /// With a start instance this is the chain containing it. Without one the
    /// workspace must hold exactly one chain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownInstance`] for an unknown start and
    /// [`Error::AmbiguousChain`] when no start is given and there are several
    /// chains.
    pub fn select_chain_ids(&self, start: Option<InstanceId>) -> Result<Vec<InstanceId>> {
        if let Some(start) = start {
            return self
                .connections
                .chain_containing(start)
                .ok_or(Error::UnknownInstance(start));
        }

        let mut chains = self.chains();
        match chains.len() {
            0 => Ok(Vec::new()),
            1 => Ok(chains.remove(0)),
            count => Err(Error::AmbiguousChain(count)),
        }
    }

    /// Like [`Workspace::select_chain_ids`], resolved to the instances.
    ///
    /// # Errors
    ///
    /// See [`Workspace::select_chain_ids`].
    pub fn select_chain(&self, start: Option<InstanceId>) -> Result<Vec<&BlockInstance>> {
        Ok(self.instances_of(&self.select_chain_ids(start)?))
    }

    /// Renders the chain containing `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownInstance`] if the ID is not in the workspace.
    pub fn assemble_from(&self, id: InstanceId) -> Result<String> {
        Ok(assembler::assemble(&self.chain_from(id)?))
    }

    /// Places every bootstrap block, sorted by title, and links them in order.
    ///
    /// Returns the head of the new chain, or `None` if no block is marked for
    /// bootstrapping.
    ///
    /// # Errors
    ///
    /// Propagates link failures, which cannot happen on fresh instances.
    pub fn bootstrap(&mut self) -> Result<Option<InstanceId>> {
        let block_ids: Vec<String> = self
            .definitions
            .values()
            .filter(|definition| definition.include_in_bootstrap)
            .sorted_by(|a, b| a.title.cmp(&b.title))
            .map(|definition| definition.id.clone())
            .collect();

        let mut head = None;
        let mut previous = None;

        for block_id in block_ids {
            let id = self.spawn(&block_id)?;
            if let Some(previous) = previous {
                self.link(previous, id)?;
            }
            head.get_or_insert(id);
            previous = Some(id);
        }

        Ok(head)
    }

    /// Swaps in freshly loaded definitions.
    ///
    /// Instances of blocks that no longer exist are removed along with their
    /// connections. The rest are rebound, see [`BlockInstance::rebind`].
    ///
    /// Returns the IDs of removed instances.
    pub fn reload_definitions(&mut self, definitions: Vec<BlockDefinition>) -> Vec<InstanceId> {
        self.definitions = index_definitions(definitions);

        let stale: Vec<InstanceId> = self
            .instances
            .iter()
            .filter(|(_, instance)| !self.definitions.contains_key(&instance.definition().id))
            .map(|(id, _)| *id)
            .collect();

        for id in &stale {
            if let Some(instance) = self.instances.shift_remove(id) {
                warn!(
                    "Block `{}` is gone after reload, removing {id}",
                    instance.definition().id
                );
            }
            self.connections.remove_instance(*id);
        }

        for instance in self.instances.values_mut() {
            if let Some(definition) = self.definitions.get(&instance.definition().id) {
                instance.rebind(Rc::clone(definition));
            }
        }

        stale
    }
}

fn index_definitions(definitions: Vec<BlockDefinition>) -> IndexMap<String, Rc<BlockDefinition>> {
    definitions
        .into_iter()
        .map(|definition| (definition.id.clone(), Rc::new(definition)))
        .collect()
}
