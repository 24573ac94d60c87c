use std::collections::HashMap;

use crate::{
    builder::{Modifier, ModifierFn, Registration},
    errors::{GraphError, GraphErrors},
    key::{Key, Parameter, ParameterList, ProviderKind},
    provider::{
        constructor::ConstructorProvider,
        embed::{EmbedDescriptor, EmbedProvider},
        group::GroupProvider,
        interface::{As, InterfaceProvider},
        Provider, Scope,
    },
    types::TypeInfo,
};

pub(crate) type NodeId = usize;

/// A provider with its dependency edges resolved
pub(crate) struct Node {
    pub provider: Box<dyn Provider>,
    pub scope: Scope,
    /// Aligned with the provider's parameters, `None` for optional parameters without provider
    pub edges: Vec<Option<NodeId>>,
    pub modifiers: Vec<ModifierNode>,
    /// Scope follows the dependencies instead of being configured
    derived: bool,
}

impl Node {
    fn new(provider: Box<dyn Provider>, scope: Scope, derived: bool) -> Self {
        Node {
            provider,
            scope,
            edges: Vec::new(),
            modifiers: Vec::new(),
            derived,
        }
    }

    pub fn key(&self) -> &Key {
        self.provider.key()
    }
}

pub(crate) struct ModifierNode {
    pub key: Key,
    pub edges: Vec<Option<NodeId>>,
    pub call: ModifierFn,
}

enum Slot {
    Node(NodeId),
    /// Several interface aliases share the Key; holds the backing Keys
    Ambiguous(Vec<Key>),
}

/// Outcome of matching a parameter against the graph
pub(crate) enum Lookup {
    Found(NodeId),
    Missing,
    Ambiguous(Vec<Key>),
}

/// Graph of the entire application
///
/// Compiled once from the registrations, immutable afterwards.
pub struct DependencyGraph {
    nodes: Vec<Node>,
    index: HashMap<Key, Slot>,
}

impl DependencyGraph {
    pub(crate) fn compile(
        providers: Vec<Registration>,
        modifiers: Vec<Modifier>,
    ) -> Result<Self, GraphErrors> {
        let mut graph = DependencyGraph {
            nodes: Vec::new(),
            index: HashMap::new(),
        };

        let mut aliases = Vec::new();
        for registration in providers {
            let key = registration.key();
            for alias in &registration.aliases {
                aliases.push((key.clone(), alias.clone()));
            }
            graph.add_constructor(key, registration)?;
        }
        graph.add_aliases(aliases)?;

        let mut errors = Vec::new();
        graph.link(&mut errors);
        graph.attach_modifiers(modifiers, &mut errors);
        graph.check_cycles(&mut errors);

        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "Dependency graph rejected");
            return Err(GraphErrors { errors });
        }

        graph.derive_scopes();
        tracing::debug!(providers = graph.nodes.len(), "Dependency graph compiled");
        Ok(graph)
    }

    fn insert(&mut self, node: Node) -> Result<NodeId, GraphError> {
        let key = node.key().clone();
        if self.index.contains_key(&key) {
            return Err(GraphError::DuplicateProvider(key));
        }

        tracing::trace!(%key, kind = ?key.kind, "Indexed provider");
        let id = self.nodes.len();
        self.nodes.push(node);
        self.index.insert(key, Slot::Node(id));
        Ok(id)
    }

    fn add_constructor(&mut self, key: Key, registration: Registration) -> Result<(), GraphError> {
        let parameters = self.add_embeds(&key, registration.parameters, &registration.embedded)?;
        let provider = ConstructorProvider::new(key, parameters, registration.ctor);
        self.insert(Node::new(Box::new(provider), registration.scope, false))?;
        Ok(())
    }

    /// Adds one embed provider per bag parameter, owned by `owner`
    ///
    /// Returns the parameters with the bag parameters pointing at those providers.
    fn add_embeds(
        &mut self,
        owner: &Key,
        mut parameters: ParameterList,
        embedded: &[Option<EmbedDescriptor>],
    ) -> Result<ParameterList, GraphError> {
        for (parameter, descriptor) in parameters.iter_mut().zip(embedded) {
            let Some(descriptor) = descriptor else {
                continue;
            };
            parameter.name = Some(owner.to_string());
            let provider = EmbedProvider::new(owner, descriptor.clone());
            self.insert(Node::new(Box::new(provider), Scope::Singleton, true))?;
        }
        Ok(parameters)
    }

    /// Publishes interface aliases and collects them into groups
    fn add_aliases(&mut self, aliases: Vec<(Key, As)>) -> Result<(), GraphError> {
        let mut interfaces: Vec<(Key, Vec<(Key, As)>)> = Vec::new();
        let mut groups: Vec<GroupProvider> = Vec::new();

        for (backing, alias) in aliases {
            let interface = Key::new(alias.target(), backing.name.clone(), ProviderKind::Interface);

            let group = match groups.iter().position(|g| g.key().info == alias.group()) {
                Some(position) => position,
                None => {
                    groups.push(GroupProvider::new(&alias));
                    groups.len() - 1
                }
            };
            groups[group].add(&backing, alias.clone());

            match interfaces.iter_mut().find(|(key, _)| *key == interface) {
                Some((_, members)) => {
                    if members.iter().any(|(existing, _)| *existing == backing) {
                        return Err(GraphError::DuplicateProvider(interface));
                    }
                    members.push((backing, alias));
                }
                None => interfaces.push((interface, vec![(backing, alias)])),
            }
        }

        for (interface, mut members) in interfaces {
            if members.len() == 1 {
                let (backing, alias) = members.remove(0);
                let provider = InterfaceProvider::new(&backing, alias);
                self.insert(Node::new(Box::new(provider), Scope::Singleton, true))?;
            } else {
                tracing::debug!(%interface, members = members.len(), "Interface published by several providers");
                let candidates = members.into_iter().map(|(backing, _)| backing).collect();
                self.index.insert(interface, Slot::Ambiguous(candidates));
            }
        }

        for group in groups {
            self.insert(Node::new(Box::new(group), Scope::Singleton, true))?;
        }
        Ok(())
    }

    /// Matches a parameter to a provider, trying kinds in lookup order
    pub(crate) fn lookup(&self, parameter: &Parameter) -> Lookup {
        for kind in ProviderKind::LOOKUP_SEQUENCE {
            match self.index.get(&parameter.key(kind)) {
                Some(Slot::Node(id)) => return Lookup::Found(*id),
                Some(Slot::Ambiguous(candidates)) => return Lookup::Ambiguous(candidates.clone()),
                None => {}
            }
        }

        // Without a name, several named providers of the type can't be told apart
        if parameter.name.is_none() {
            let candidates = self.named_candidates(parameter.info);
            if candidates.len() > 1 {
                return Lookup::Ambiguous(candidates);
            }
        }
        Lookup::Missing
    }

    fn named_candidates(&self, info: TypeInfo) -> Vec<Key> {
        let mut candidates: Vec<Key> = self
            .index
            .keys()
            .filter(|key| key.info == info && key.name.is_some() && key.kind != ProviderKind::Embed)
            .cloned()
            .collect();
        candidates.sort_by_key(ToString::to_string);
        candidates
    }

    fn edges(
        &self,
        consumer: &Key,
        parameters: &ParameterList,
        errors: &mut Vec<GraphError>,
    ) -> Vec<Option<NodeId>> {
        parameters
            .iter()
            .map(|parameter| match self.lookup(parameter) {
                Lookup::Found(id) => Some(id),
                Lookup::Missing => {
                    if !parameter.optional {
                        errors.push(GraphError::UnsatisfiedDependency {
                            consumer: consumer.clone(),
                            missing: parameter.to_string(),
                        });
                    }
                    None
                }
                Lookup::Ambiguous(candidates) => {
                    errors.push(GraphError::AmbiguousKey {
                        consumer: consumer.clone(),
                        requested: parameter.to_string(),
                        candidates,
                    });
                    None
                }
            })
            .collect()
    }

    fn link(&mut self, errors: &mut Vec<GraphError>) {
        let edges: Vec<_> = self
            .nodes
            .iter()
            .map(|node| self.edges(node.key(), node.provider.parameters(), errors))
            .collect();

        for (node, edges) in self.nodes.iter_mut().zip(edges) {
            node.edges = edges;
        }
    }

    fn attach_modifiers(&mut self, modifiers: Vec<Modifier>, errors: &mut Vec<GraphError>) {
        for modifier in modifiers {
            let target = match self.lookup(&modifier.target) {
                Lookup::Found(id) => id,
                Lookup::Missing => {
                    errors.push(GraphError::UnsatisfiedDependency {
                        consumer: modifier.key,
                        missing: modifier.target.to_string(),
                    });
                    continue;
                }
                Lookup::Ambiguous(candidates) => {
                    errors.push(GraphError::AmbiguousKey {
                        consumer: modifier.key,
                        requested: modifier.target.to_string(),
                        candidates,
                    });
                    continue;
                }
            };

            let first_embed = self.nodes.len();
            let parameters =
                match self.add_embeds(&modifier.key, modifier.parameters, &modifier.embedded) {
                    Ok(parameters) => parameters,
                    Err(error) => {
                        errors.push(error);
                        continue;
                    }
                };

            // Embed providers added above still need their own edges
            for id in first_embed..self.nodes.len() {
                let edges = self.edges(self.nodes[id].key(), self.nodes[id].provider.parameters(), errors);
                self.nodes[id].edges = edges;
            }

            let edges = self.edges(&modifier.key, &parameters, errors);
            tracing::trace!(modifier = %modifier.key, target = %self.nodes[target].key(), "Attached modifier");
            self.nodes[target].modifiers.push(ModifierNode {
                key: modifier.key,
                edges,
                call: modifier.call,
            });
        }
    }

    /// Dependencies of a node, modifier dependencies included
    fn successors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let node = &self.nodes[id];
        node.edges
            .iter()
            .chain(node.modifiers.iter().flat_map(|m| m.edges.iter()))
            .flatten()
            .copied()
    }

    fn check_cycles(&self, errors: &mut Vec<GraphError>) {
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Gray,
            Black,
        }

        fn visit(
            graph: &DependencyGraph,
            id: NodeId,
            colors: &mut [Color],
            path: &mut Vec<NodeId>,
            errors: &mut Vec<GraphError>,
        ) {
            colors[id] = Color::Gray;
            path.push(id);

            for next in graph.successors(id) {
                match colors[next] {
                    Color::White => visit(graph, next, colors, path, errors),
                    Color::Gray => {
                        let start = path.iter().position(|n| *n == next).unwrap_or(0);
                        let mut cycle: Vec<Key> =
                            path[start..].iter().map(|n| graph.nodes[*n].key().clone()).collect();
                        cycle.push(graph.nodes[next].key().clone());
                        errors.push(GraphError::DependencyCycle { path: cycle });
                    }
                    Color::Black => {}
                }
            }

            path.pop();
            colors[id] = Color::Black;
        }

        let mut colors = vec![Color::White; self.nodes.len()];
        let mut path = Vec::new();
        for id in 0..self.nodes.len() {
            if colors[id] == Color::White {
                visit(self, id, &mut colors, &mut path, errors);
            }
        }
    }

    /// Derived providers are singletons unless a dependency is a prototype
    ///
    /// Runs on the validated, acyclic graph.
    fn derive_scopes(&mut self) {
        fn scope_of(graph: &DependencyGraph, id: NodeId, memo: &mut [Option<Scope>]) -> Scope {
            if let Some(scope) = memo[id] {
                return scope;
            }
            let node = &graph.nodes[id];
            let scope = if !node.derived {
                node.scope
            } else if node
                .edges
                .iter()
                .flatten()
                .any(|dep| scope_of(graph, *dep, memo) == Scope::Prototype)
            {
                Scope::Prototype
            } else {
                Scope::Singleton
            };
            memo[id] = Some(scope);
            scope
        }

        let mut memo = vec![None; self.nodes.len()];
        for id in 0..self.nodes.len() {
            let scope = scope_of(self, id, &mut memo);
            self.nodes[id].scope = scope;
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Every compiled Key, in indexing order
    pub fn keys(&self) -> Vec<Key> {
        self.nodes.iter().map(|node| node.key().clone()).collect()
    }

    /// Keys the provider of `key` depends on, `None` if the Key is unknown
    pub fn dependencies(&self, key: &Key) -> Option<Vec<Key>> {
        let Some(Slot::Node(id)) = self.index.get(key) else {
            return None;
        };
        Some(
            self.nodes[*id]
                .edges
                .iter()
                .flatten()
                .map(|dep| self.nodes[*dep].key().clone())
                .collect(),
        )
    }

    pub fn scope(&self, key: &Key) -> Option<Scope> {
        match self.index.get(key) {
            Some(Slot::Node(id)) => Some(self.nodes[*id].scope),
            _ => None,
        }
    }
}
