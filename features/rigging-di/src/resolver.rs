use parking_lot::Mutex;

use crate::{
    dependency_graph::{DependencyGraph, Lookup, NodeId},
    errors::ResolveError,
    history::ProvideHistory,
    key::{Key, Parameter},
    provider::{embed::EmbedDescriptor, Produced, Scope},
    types::Instance,
};

/// Per node state
///
/// The memo lock is held for the whole production of a singleton, which is
/// what guarantees a single construction. Locks are taken along graph edges
/// only, and the graph is acyclic, so they can not deadlock.
#[derive(Default)]
struct Slot {
    memo: Mutex<Option<Instance>>,
    modified: Mutex<bool>,
}

/// Produces values by walking the compiled graph
pub(crate) struct Resolver {
    graph: DependencyGraph,
    slots: Vec<Slot>,
    history: Mutex<ProvideHistory>,
}

impl Resolver {
    pub fn new(graph: DependencyGraph) -> Self {
        let slots = (0..graph.len()).map(|_| Slot::default()).collect();
        Resolver {
            graph,
            slots,
            history: Mutex::new(ProvideHistory::default()),
        }
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Resolves a node, failures are wrapped with its Key
    pub fn resolve(&self, id: NodeId) -> Result<Instance, ResolveError> {
        let node = self.graph.node(id);
        let key = node.key();

        match node.scope {
            Scope::Singleton => {
                let mut memo = self.slots[id].memo.lock();
                if let Some(instance) = memo.as_ref() {
                    tracing::trace!(%key, "Using memoized instance");
                    return Ok(instance.clone());
                }

                let instance = self.produce(id).map_err(|e| ResolveError::wrap(key, e))?;
                *memo = Some(instance.clone());
                Ok(instance)
            }
            Scope::Prototype => self.produce(id).map_err(|e| ResolveError::wrap(key, e)),
        }
    }

    fn produce(&self, id: NodeId) -> Result<Instance, ResolveError> {
        let node = self.graph.node(id);
        let key = node.key();
        tracing::trace!(%key, "Resolving dependencies");

        let values = self.resolve_edges(&node.edges)?;
        let Produced { instance, cleanup } = node.provider.provide(&values)?;

        if let Err(error) = self.modify(id, &instance) {
            tracing::warn!(%key, %error, "Discarding instance, a modifier failed");
            if let Some(cleanup) = cleanup {
                cleanup.run();
            }
            return Err(error);
        }

        tracing::debug!(%key, cleanup = cleanup.is_some(), "Produced instance");
        self.history.lock().add(key.clone(), cleanup);
        Ok(instance)
    }

    fn resolve_edges(&self, edges: &[Option<NodeId>]) -> Result<Vec<Option<Instance>>, ResolveError> {
        edges
            .iter()
            .map(|edge| edge.map(|dep| self.resolve(dep)).transpose())
            .collect()
    }

    /// Runs the modifiers of a node, once per Key
    fn modify(&self, id: NodeId, instance: &Instance) -> Result<(), ResolveError> {
        let node = self.graph.node(id);
        if node.modifiers.is_empty() {
            return Ok(());
        }

        let mut modified = self.slots[id].modified.lock();
        if *modified {
            return Ok(());
        }

        for modifier in &node.modifiers {
            tracing::trace!(modifier = %modifier.key, target = %node.key(), "Applying modifier");
            let mut values = vec![Some(instance.clone())];
            values.extend(self.resolve_edges(&modifier.edges)?);
            (modifier.call)(&values).map_err(|e| ResolveError::wrap(&modifier.key, e))?;
        }

        *modified = true;
        Ok(())
    }

    /// Resolves an ad hoc parameter, as requested by extract or invoke
    ///
    /// Parameter bags are assembled inline, they have no node of their own.
    pub fn resolve_parameter(
        &self,
        parameter: &Parameter,
        embedded: Option<&EmbedDescriptor>,
    ) -> Result<Option<Instance>, ResolveError> {
        if let Some(descriptor) = embedded {
            if let Some(error) = &descriptor.error {
                return Err(error.clone().into());
            }
            let values = descriptor
                .fields
                .iter()
                .map(|field| self.resolve_parameter(&field.parameter, None))
                .collect::<Result<Vec<_>, _>>()?;
            return descriptor.assemble(&values).map(Some);
        }

        // A bag field never stands for a bag of its own
        if parameter.embed {
            return Err(ResolveError::NoProviderForKey(parameter.to_string()));
        }

        match self.graph.lookup(parameter) {
            Lookup::Found(id) => self.resolve(id).map(Some),
            Lookup::Missing if parameter.optional => Ok(None),
            Lookup::Missing => Err(ResolveError::NoProviderForKey(parameter.to_string())),
            Lookup::Ambiguous(candidates) => {
                tracing::warn!(requested = %parameter, candidates = candidates.len(), "Ambiguous request");
                Err(ResolveError::AmbiguousKey {
                    requested: parameter.to_string(),
                    candidates,
                })
            }
        }
    }

    /// Runs every recorded cleanup, newest first
    pub fn cleanup(&self) {
        let cleanups = self.history.lock().drain_reverse();
        for (key, cleanup) in cleanups {
            tracing::debug!(%key, "Running cleanup");
            cleanup.run();
        }
    }

    pub fn produced(&self) -> Vec<Key> {
        self.history.lock().keys()
    }
}
