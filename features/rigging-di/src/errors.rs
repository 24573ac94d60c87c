use thiserror::Error;

use crate::{key::Key, types::DynError};

/// Errors in a single provider descriptor, detected before the graph is built
#[derive(Error, Debug, Clone)]
pub enum RegistrationError {
    /// The constructor does not declare a usable result
    #[error("The constructor '{constructor}' must be a function like {expected}")]
    MalformedConstructor {
        constructor: String,
        expected: &'static str,
    },
    /// Interfaces can only be published as trait objects
    #[error("'{target}' is not an interface - interface targets must be `dyn Trait` types")]
    InvalidInterfaceTarget { target: &'static str },
    /// The cast used for an interface alias does not start from the provided type
    #[error("'{provided}' does not implement '{interface}'")]
    InterfaceNotImplemented {
        provided: String,
        interface: &'static str,
    },
    /// Parameter bags embed one level deep
    #[error("Parameter bag '{bag}' field '{field}' is itself a parameter bag")]
    MalformedParameterBag { bag: &'static str, field: &'static str },
    /// A modifier without a usable target
    #[error("Modifier '{modifier}' is invalid: {reason}")]
    InvalidModifier {
        modifier: &'static str,
        reason: &'static str,
    },
}

/// Issues with the dependency graph
#[derive(Error, Debug, Clone)]
pub enum GraphError {
    #[error("A Key has been registered twice: '{0}'")]
    DuplicateProvider(Key),
    #[error("'{consumer}' needs '{missing}' but it is missing")]
    UnsatisfiedDependency { consumer: Key, missing: String },
    #[error("A dependency cycle exists: {}", render_path(.path))]
    DependencyCycle { path: Vec<Key> },
    #[error("'{consumer}' needs '{requested}' which matches several providers: {}", render_path(.candidates))]
    AmbiguousKey {
        consumer: Key,
        requested: String,
        candidates: Vec<Key>,
    },
}

fn render_path(keys: &[Key]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[derive(Error, Debug, Clone)]
pub struct GraphErrors {
    pub errors: Vec<GraphError>,
}
impl std::fmt::Display for GraphErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut display = Vec::new();
        display.push("The dependency graph had one or more errors:".to_string());
        for error in &self.errors {
            display.push(format!("- {}", error));
        }
        f.write_str(&display.join("\n"))
    }
}
impl From<GraphError> for GraphErrors {
    fn from(error: GraphError) -> Self {
        GraphErrors {
            errors: vec![error],
        }
    }
}

/// Errors while compiling a container - no container is created
#[derive(Error, Debug, Clone)]
pub enum CompileError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error(transparent)]
    Graph(#[from] GraphErrors),
}
impl From<GraphError> for CompileError {
    fn from(error: GraphError) -> Self {
        CompileError::Graph(error.into())
    }
}

impl CompileError {
    /// All graph errors, empty for registration errors
    pub fn graph_errors(&self) -> &[GraphError] {
        match self {
            CompileError::Graph(graph) => &graph.errors,
            CompileError::Registration(_) => &[],
        }
    }
}

/// Errors when extracting a value or invoking a function
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Nothing in the graph provides the requested Key
    #[error("No provider for '{0}'")]
    NoProviderForKey(String),
    /// Several providers match and no name was given to pick one
    #[error("'{requested}' is ambiguous, candidates: {}", render_path(.candidates))]
    AmbiguousKey {
        requested: String,
        candidates: Vec<Key>,
    },
    /// Producing a Key failed, `cause` holds the nested error
    #[error("Failed to resolve '{key}': {cause}")]
    ResolutionFailed {
        key: Key,
        #[source]
        cause: Box<ResolveError>,
    },
    /// A constructor or modifier returned an error
    #[error("{0}")]
    ConstructorFailed(#[source] DynError),
    /// A parameter of an invoked function is malformed
    #[error(transparent)]
    MalformedParameter(#[from] RegistrationError),
    /// The invoked function returned an error
    #[error("Invoked function failed: {0}")]
    InvokeFailed(#[source] DynError),
    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}

impl ResolveError {
    pub(crate) fn wrap(key: &Key, cause: ResolveError) -> Self {
        ResolveError::ResolutionFailed {
            key: key.clone(),
            cause: Box::new(cause),
        }
    }

    /// Keys from the outermost to the innermost failed resolution
    pub fn key_chain(&self) -> Vec<&Key> {
        let mut chain = Vec::new();
        let mut current = self;
        while let ResolveError::ResolutionFailed { key, cause } = current {
            chain.push(key);
            current = cause;
        }
        chain
    }

    /// The innermost error, below all `ResolutionFailed` layers
    pub fn root_cause(&self) -> &ResolveError {
        match self {
            ResolveError::ResolutionFailed { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{key::ProviderKind, types::TypeInfo};

    fn key<T: 'static>() -> Key {
        Key::new(TypeInfo::of::<T>(), None, ProviderKind::Constructor)
    }

    #[test]
    fn key_chain_walks_nested_failures() {
        let error = ResolveError::wrap(
            &key::<u8>(),
            ResolveError::wrap(&key::<u16>(), ResolveError::ConstructorFailed("boom".into())),
        );

        let chain: Vec<String> = error.key_chain().iter().map(|k| k.to_string()).collect();
        assert_eq!(chain, vec!["u8", "u16"]);
        assert!(matches!(error.root_cause(), ResolveError::ConstructorFailed(_)));
        assert!(error.to_string().contains("boom"));
    }

    #[test]
    fn cycle_display_lists_path() {
        let error = GraphError::DependencyCycle {
            path: vec![key::<u8>(), key::<u16>(), key::<u8>()],
        };
        assert_eq!(error.to_string(), "A dependency cycle exists: u8 -> u16 -> u8");
    }
}
