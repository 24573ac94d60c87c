use std::{any::type_name, sync::Arc};

use crate::{
    container::Container,
    dependency_graph::DependencyGraph,
    errors::{CompileError, RegistrationError, ResolveError},
    inject::{Function, InvokeOutput},
    key::{Key, Parameter, ParameterList, ProviderKind},
    provider::{
        constructor::Ctor, embed::EmbedDescriptor, interface::As, Cleanup, Scope,
    },
    types::{DynError, Injectable, Instance, TypeInfo},
};

//////////////////////////////////////////////////////////////////////
///
/// Using the container happens in two steps.
/// 1. The ContainerBuilder where one registers all providers and modifiers
/// 2. Then `build` compiles and validates the graph into a Container
///
/// Nothing is constructed while building; values are produced on demand.
///
#[derive(Default)]
pub struct ContainerBuilder {
    pub(crate) providers: Vec<Registration>,
    pub(crate) modifiers: Vec<Modifier>,
    error: Option<RegistrationError>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provide(mut self, provide: Provide) -> Self {
        match provide.0 {
            Ok(registration) => self.providers.push(registration),
            Err(error) => self.record(error),
        }
        self
    }

    /// Registers an already built value as a singleton
    pub fn instance<T: Injectable>(self, value: T) -> Self {
        self.provide(Provide::instance(value))
    }

    /// Registers an already built value under a name
    pub fn instance_named<T: Injectable>(self, name: impl Into<String>, value: T) -> Self {
        self.provide(Provide::instance(value).named(name))
    }

    pub fn apply(mut self, apply: Apply) -> Self {
        match apply.0 {
            Ok(modifier) => self.modifiers.push(modifier),
            Err(error) => self.record(error),
        }
        self
    }

    /// Appends all descriptors of the bundle, in order
    pub fn bundle(self, bundle: Bundle) -> Self {
        bundle.items.into_iter().fold(self, |builder, item| match item {
            BundleItem::Provide(provide) => builder.provide(provide),
            BundleItem::Apply(apply) => builder.apply(apply),
        })
    }

    /// Compiles the registered providers into a Container
    ///
    /// Fails with the first registration error, or with every issue found in the graph.
    pub fn build(self) -> Result<Container, CompileError> {
        if let Some(error) = self.error {
            tracing::debug!(%error, "Rejecting registration");
            return Err(error.into());
        }

        let graph = DependencyGraph::compile(self.providers, self.modifiers)?;
        Ok(Container::new(graph))
    }

    fn record(&mut self, error: RegistrationError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

/// A validated constructor with its options
pub(crate) struct Registration {
    pub ctor: Ctor,
    pub parameters: ParameterList,
    pub embedded: Vec<Option<EmbedDescriptor>>,
    pub name: Option<String>,
    pub scope: Scope,
    pub aliases: Vec<As>,
}

impl Registration {
    pub fn key(&self) -> Key {
        Key::new(self.ctor.product, self.name.clone(), ProviderKind::Constructor)
    }
}

pub(crate) fn bag_error(embedded: &[Option<EmbedDescriptor>]) -> Option<RegistrationError> {
    embedded.iter().flatten().find_map(|d| d.error.clone())
}

/// Describes a provider registration
///
/// The constructor shape is chosen by the function creating the descriptor:
/// ```
/// # use std::sync::Arc;
/// # use rigging_di::{Cleanup, ContainerBuilder, Provide};
/// struct Addr(String);
/// struct Pool;
///
/// let builder = ContainerBuilder::new()
///     .provide(Provide::new(|| Addr("0.0.0.0:8080".into())))
///     .provide(Provide::with_cleanup(|_: Arc<Addr>| (Pool, Cleanup::new(|| ()))));
/// ```
pub struct Provide(Result<Registration, RegistrationError>);

impl Provide {
    fn from_ctor<F: Function<Args>, Args>(ctor: Result<Ctor, RegistrationError>) -> Self {
        let registration = ctor.and_then(|ctor| {
            let embedded = F::embedded();
            if let Some(error) = bag_error(&embedded) {
                return Err(error);
            }
            Ok(Registration {
                ctor,
                parameters: F::parameters(),
                embedded,
                name: None,
                scope: Scope::Singleton,
                aliases: Vec::new(),
            })
        });
        Provide(registration)
    }

    /// `(deps) -> T`
    pub fn new<F, Args>(ctor: F) -> Self
    where
        F: Function<Args>,
        F::Output: Injectable,
    {
        Self::from_ctor::<F, Args>(Ctor::plain(ctor))
    }

    /// `(deps) -> Result<T, E>`
    pub fn fallible<F, Args, T, E>(ctor: F) -> Self
    where
        F: Function<Args, Output = Result<T, E>>,
        T: Injectable,
        E: Into<DynError>,
    {
        Self::from_ctor::<F, Args>(Ctor::fallible(ctor))
    }

    /// `(deps) -> (T, Cleanup)`
    pub fn with_cleanup<F, Args, T>(ctor: F) -> Self
    where
        F: Function<Args, Output = (T, Cleanup)>,
        T: Injectable,
    {
        Self::from_ctor::<F, Args>(Ctor::with_cleanup(ctor))
    }

    /// `(deps) -> Result<(T, Cleanup), E>`
    pub fn fallible_with_cleanup<F, Args, T, E>(ctor: F) -> Self
    where
        F: Function<Args, Output = Result<(T, Cleanup), E>>,
        T: Injectable,
        E: Into<DynError>,
    {
        Self::from_ctor::<F, Args>(Ctor::fallible_with_cleanup(ctor))
    }

    /// An already built value without dependencies
    pub fn instance<T: Injectable>(value: T) -> Self {
        Self::shared(Arc::new(value))
    }

    /// An already shared value, extraction hands out this very `Arc`
    pub fn shared<T: Injectable + ?Sized>(value: Arc<T>) -> Self {
        Provide(Ok(Registration {
            ctor: Ctor::shared(value),
            parameters: Vec::new(),
            embedded: Vec::new(),
            name: None,
            scope: Scope::Singleton,
            aliases: Vec::new(),
        }))
    }

    pub fn named(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.map(|registration| registration.name = Some(name))
    }

    /// Rebuild the value on every resolution
    pub fn prototype(self) -> Self {
        self.map(|registration| registration.scope = Scope::Prototype)
    }

    /// Build the value once and share it, the default
    pub fn singleton(self) -> Self {
        self.map(|registration| registration.scope = Scope::Singleton)
    }

    /// Also publish the value under an interface, may be repeated
    pub fn as_interface(self, alias: As) -> Self {
        Provide(self.0.and_then(|mut registration| {
            alias.verify(registration.ctor.product)?;
            registration.aliases.push(alias);
            Ok(registration)
        }))
    }

    fn map(mut self, f: impl FnOnce(&mut Registration)) -> Self {
        if let Ok(registration) = &mut self.0 {
            f(registration);
        }
        self
    }
}

pub(crate) type ModifierFn =
    Arc<dyn Fn(&[Option<Instance>]) -> Result<(), ResolveError> + Send + Sync>;

/// A validated modifier
pub(crate) struct Modifier {
    /// Identity used in logs and errors, built from the function type
    pub key: Key,
    pub target: Parameter,
    /// Everything after the target
    pub parameters: ParameterList,
    pub embedded: Vec<Option<EmbedDescriptor>>,
    /// Receives the target value first, then `parameters`
    pub call: ModifierFn,
}

/// Post construction step on a produced value
///
/// The first parameter is the modified value, the others are resolved
/// like constructor dependencies. Runs once, after the target's first production.
/// ```
/// # use std::sync::{atomic::AtomicBool, Arc};
/// # use rigging_di::{Apply, ContainerBuilder};
/// let builder = ContainerBuilder::new()
///     .instance(AtomicBool::new(false))
///     .apply(Apply::new(|flag: Arc<AtomicBool>| {
///         flag.store(true, std::sync::atomic::Ordering::SeqCst)
///     }));
/// ```
pub struct Apply(Result<Modifier, RegistrationError>);

impl Apply {
    pub fn new<F, Args>(modifier: F) -> Self
    where
        F: Function<Args>,
        F::Output: InvokeOutput,
    {
        Apply(Self::validate(modifier))
    }

    fn validate<F, Args>(modifier: F) -> Result<Modifier, RegistrationError>
    where
        F: Function<Args>,
        F::Output: InvokeOutput,
    {
        let function = type_name::<F>();
        let mut parameters = F::parameters();
        let mut embedded = F::embedded();

        if parameters.is_empty() {
            return Err(RegistrationError::InvalidModifier {
                modifier: function,
                reason: "the first parameter must be the modified value",
            });
        }
        let target = parameters.remove(0);
        embedded.remove(0);

        if target.optional || target.embed {
            return Err(RegistrationError::InvalidModifier {
                modifier: function,
                reason: "the modified value must be a required `Arc<T>`",
            });
        }
        if let Some(error) = bag_error(&embedded) {
            return Err(error);
        }

        let call: ModifierFn = Arc::new(move |values: &[Option<Instance>]| {
            Function::call(&modifier, values)?
                .into_result()
                .map_err(ResolveError::ConstructorFailed)
        });

        Ok(Modifier {
            key: Key::new(TypeInfo::of::<F>(), None, ProviderKind::Constructor),
            target,
            parameters,
            embedded,
            call,
        })
    }
}

enum BundleItem {
    Provide(Provide),
    Apply(Apply),
}

/// Reusable, ordered set of registrations
#[derive(Default)]
pub struct Bundle {
    items: Vec<BundleItem>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provide(mut self, provide: Provide) -> Self {
        self.items.push(BundleItem::Provide(provide));
        self
    }

    pub fn apply(mut self, apply: Apply) -> Self {
        self.items.push(BundleItem::Apply(apply));
        self
    }
}
