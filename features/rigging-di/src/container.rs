use std::{fmt::Debug, sync::Arc};

use crate::{
    builder::{bag_error, ContainerBuilder},
    dependency_graph::DependencyGraph,
    errors::ResolveError,
    inject::{Function, Inject, InvokeOutput},
    key::{Key, Parameter},
    provider::Scope,
    resolver::Resolver,
    types::{Injectable, TypeInfo},
};

/// Container producing values from the compiled dependency graph
///
/// Cheap to clone; all clones share memoized values and the provide history.
/// Remaining cleanups run when the last clone is dropped.
#[derive(Clone)]
pub struct Container(Arc<ContainerInner>);

struct ContainerInner {
    resolver: Resolver,
}

impl Drop for ContainerInner {
    fn drop(&mut self) {
        self.resolver.cleanup();
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let graph = self.0.resolver.graph();
        let mut map = f.debug_map();
        for key in graph.keys() {
            let scope = match graph.scope(&key) {
                Some(Scope::Prototype) => "prototype",
                _ => "singleton",
            };
            map.entry(&key.to_string(), &scope);
        }
        map.finish()
    }
}

impl Container {
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub(crate) fn new(graph: DependencyGraph) -> Self {
        Self(Arc::new(ContainerInner {
            resolver: Resolver::new(graph),
        }))
    }

    /// Resolves the unnamed value of type `T`
    ///
    /// Fails with `AmbiguousKey` if only several named providers exist for `T`.
    pub fn extract<T: Injectable + ?Sized>(&self) -> Result<Arc<T>, ResolveError> {
        self.extract_parameter(Parameter::required(TypeInfo::of::<T>()))
    }

    /// Resolves the value of type `T` named `name`
    pub fn extract_named<T: Injectable + ?Sized>(&self, name: &str) -> Result<Arc<T>, ResolveError> {
        self.extract_parameter(Parameter::required(TypeInfo::of::<T>()).with_name(name))
    }

    fn extract_parameter<T: Injectable + ?Sized>(
        &self,
        parameter: Parameter,
    ) -> Result<Arc<T>, ResolveError> {
        tracing::trace!(requested = %parameter, "Extracting");
        let instance = self.0.resolver.resolve_parameter(&parameter, None)?;
        Arc::<T>::from_resolved(instance.as_ref())
    }

    /// Like [Container::extract], panics on failure
    pub fn must_extract<T: Injectable + ?Sized>(&self) -> Arc<T> {
        match self.extract::<T>() {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        }
    }

    /// Like [Container::extract_named], panics on failure
    pub fn must_extract_named<T: Injectable + ?Sized>(&self, name: &str) -> Arc<T> {
        match self.extract_named::<T>(name) {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        }
    }

    /// Calls `function` with its parameters resolved from the graph
    ///
    /// An error returned by the function is reported as `InvokeFailed`.
    /// Parameter bags nesting another bag fail with `MalformedParameter`
    /// before anything is resolved.
    pub fn invoke<F, Args>(&self, function: F) -> Result<(), ResolveError>
    where
        F: Function<Args>,
        F::Output: InvokeOutput,
    {
        let embedded = F::embedded();
        if let Some(error) = bag_error(&embedded) {
            return Err(error.into());
        }

        let values = F::parameters()
            .iter()
            .zip(embedded)
            .map(|(parameter, embedded)| {
                self.0.resolver.resolve_parameter(parameter, embedded.as_ref())
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::trace!(function = std::any::type_name::<F>(), "Invoking");
        Function::call(&function, &values)?
            .into_result()
            .map_err(ResolveError::InvokeFailed)
    }

    /// Like [Container::invoke], panics on failure
    pub fn must_invoke<F, Args>(&self, function: F)
    where
        F: Function<Args>,
        F::Output: InvokeOutput,
    {
        if let Err(error) = self.invoke(function) {
            panic!("{error}");
        }
    }

    /// Runs the cleanup of every produced instance, in reverse production order
    ///
    /// Calling it again only runs cleanups of instances produced in between.
    /// Must not race with extract or invoke.
    pub fn cleanup(&self) {
        self.0.resolver.cleanup();
    }

    /// Every compiled Key
    pub fn keys(&self) -> Vec<Key> {
        self.0.resolver.graph().keys()
    }

    /// Direct dependencies of `key`
    pub fn dependencies(&self, key: &Key) -> Option<Vec<Key>> {
        self.0.resolver.graph().dependencies(key)
    }

    /// Keys produced so far, in production order
    pub fn history(&self) -> Vec<Key> {
        self.0.resolver.produced()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Provide;

    #[test]
    fn debug_lists_scopes() {
        let container = Container::builder()
            .provide(Provide::new(|| 1_u8).prototype())
            .build()
            .unwrap();

        assert_eq!(format!("{container:?}"), r#"{"u8": "prototype"}"#);
    }

    #[test]
    fn clones_share_memo() {
        let container = Container::builder()
            .provide(Provide::new(|| String::from("shared")))
            .build()
            .unwrap();
        let clone = container.clone();

        let first = container.extract::<String>().unwrap();
        let second = clone.extract::<String>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(clone.history().len(), 1);
    }
}
