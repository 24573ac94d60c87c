use crate::{
    errors::ResolveError,
    key::{Key, ParameterList},
    types::Instance,
};

pub mod constructor;
pub mod embed;
pub mod group;
pub mod interface;

/// Production policy of a Key
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Built once, then served from the memo cache
    #[default]
    Singleton,
    /// Rebuilt on every resolution
    Prototype,
}

/// Teardown action of a produced instance
pub struct Cleanup(Box<dyn FnOnce() + Send + 'static>);

impl Cleanup {
    pub fn new(cleanup: impl FnOnce() + Send + 'static) -> Self {
        Cleanup(Box::new(cleanup))
    }

    pub(crate) fn run(self) {
        (self.0)()
    }
}

impl std::fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Cleanup")
    }
}

/// Output of a successful [Provider::provide]
pub(crate) struct Produced {
    pub instance: Instance,
    pub cleanup: Option<Cleanup>,
}

impl From<Instance> for Produced {
    fn from(instance: Instance) -> Self {
        Produced {
            instance,
            cleanup: None,
        }
    }
}

/// Anything in the graph which can produce the value of its Key
///
/// Variants are [constructor::ConstructorProvider], [interface::InterfaceProvider],
/// [group::GroupProvider] and [embed::EmbedProvider].
pub(crate) trait Provider: Send + Sync {
    /// The identity of the produced value
    fn key(&self) -> &Key;

    /// Dependencies, resolved by the caller before [Provider::provide]
    fn parameters(&self) -> &ParameterList;

    /// Produces the value from already resolved parameter values
    ///
    /// `values` is aligned with [Provider::parameters]; `None` marks an optional
    /// parameter without provider.
    fn provide(&self, values: &[Option<Instance>]) -> Result<Produced, ResolveError>;
}
