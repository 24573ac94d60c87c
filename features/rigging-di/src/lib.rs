//! Rigging DI resolves values from a graph of constructors registered up front.
//!
//! Rigging DI is split into two major parts:
//! 1. ContainerBuilder: Used to register constructors, interface aliases and modifiers
//! 2. Container: The compiled, validated graph which produces values on demand
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use rigging_di::{As, Container, Provide};
//!
//! trait Handler: Send + Sync {
//!     fn handle(&self) -> String;
//! }
//!
//! struct Addr(String);
//! struct Mux;
//! impl Handler for Mux {
//!     fn handle(&self) -> String {
//!         "ok".to_string()
//!     }
//! }
//!
//! struct Server {
//!     addr: Arc<Addr>,
//!     handler: Arc<dyn Handler>,
//! }
//!
//! let container = Container::builder()
//!     .provide(Provide::new(|| Addr("0.0.0.0:8080".to_string())))
//!     .provide(Provide::new(|| Mux).as_interface(As::new(|m: Arc<Mux>| m as Arc<dyn Handler>)))
//!     .provide(
//!         Provide::new(|addr: Arc<Addr>, handler: Arc<dyn Handler>| Server { addr, handler })
//!             .prototype()
//!             .named("server"),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let first = container.extract_named::<Server>("server").unwrap();
//! let second = container.extract_named::<Server>("server").unwrap();
//! assert!(!Arc::ptr_eq(&first, &second));
//! assert!(Arc::ptr_eq(&first.addr, &second.addr));
//! assert_eq!(first.handler.handle(), "ok");
//!
//! container.invoke(|addr: Arc<Addr>| assert_eq!(addr.0, "0.0.0.0:8080")).unwrap();
//! ```
//!
//! Rigging DI consists of the following components:
//!
//! 1. Key - identity of a value: type, optional name and provider kind
//! 2. Provider - constructors, interface aliases, groups and parameter bags
//! 3. Dependency Graph - compile time validation: duplicates, missing dependencies, cycles
//! 4. Resolver - memoized, thread safe production and teardown
//! 5. Errors - registration, graph and resolution errors

pub mod builder;
pub mod container;
pub mod dependency_graph;
pub mod errors;
pub mod history;
pub mod inject;
pub mod key;
pub mod provider;
mod resolver;
pub mod types;

pub use builder::{Apply, Bundle, ContainerBuilder, Provide};
pub use container::Container;
pub use errors::{CompileError, GraphError, GraphErrors, RegistrationError, ResolveError};
pub use inject::{Function, Inject, InvokeOutput};
pub use key::{Key, Parameter, ParameterList, ProviderKind};
pub use provider::{
    constructor::CtorShape,
    embed::{BagFields, BagValues, Embed, EmbedDescriptor, ParameterBag},
    interface::As,
    Cleanup, Scope,
};
pub use types::{DynError, Injectable, Instance, TypeInfo};
