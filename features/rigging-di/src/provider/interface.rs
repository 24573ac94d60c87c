use std::sync::Arc;

use crate::{
    errors::{RegistrationError, ResolveError},
    inject::Inject,
    key::{Key, Parameter, ParameterList, ProviderKind},
    provider::{Produced, Provider},
    types::{Injectable, Instance, TypeInfo},
};

type CastFn = Arc<dyn Fn(&Instance) -> Result<Instance, ResolveError> + Send + Sync>;
type CollectFn = fn(&[Instance]) -> Result<Instance, ResolveError>;

/// Publishes a provider's result under an interface (`dyn Trait`)
///
/// The cast proves `T` implements the interface:
/// ```
/// # use std::sync::Arc;
/// # use rigging_di::As;
/// trait Controller: Send + Sync {}
/// struct OrderController;
/// impl Controller for OrderController {}
///
/// let alias = As::new(|c: Arc<OrderController>| c as Arc<dyn Controller>);
/// ```
#[derive(Clone)]
pub struct As {
    pub(crate) source: TypeInfo,
    pub(crate) target: TypeInfo,
    pub(crate) group: TypeInfo,
    pub(crate) cast: CastFn,
    pub(crate) collect: CollectFn,
}

impl As {
    pub fn new<T, I, F>(cast: F) -> Self
    where
        T: Injectable,
        I: Injectable + ?Sized,
        F: Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
    {
        As {
            source: TypeInfo::of::<T>(),
            target: TypeInfo::of::<I>(),
            group: TypeInfo::of::<Vec<Arc<I>>>(),
            cast: Arc::new(move |instance: &Instance| {
                let concrete = Arc::<T>::from_resolved(Some(instance))?;
                Ok(Instance::new(cast(concrete)))
            }),
            collect: collect::<I>,
        }
    }

    /// Checks the alias against the type a provider produces
    pub(crate) fn verify(&self, provided: TypeInfo) -> Result<(), RegistrationError> {
        if !self.target.is_trait_object() {
            return Err(RegistrationError::InvalidInterfaceTarget {
                target: self.target.type_name,
            });
        }
        if self.source != provided {
            return Err(RegistrationError::InterfaceNotImplemented {
                provided: provided.to_string(),
                interface: self.target.type_name,
            });
        }
        Ok(())
    }

    pub(crate) fn target(&self) -> TypeInfo {
        self.target
    }

    pub(crate) fn group(&self) -> TypeInfo {
        self.group
    }
}

fn collect<I: Injectable + ?Sized>(members: &[Instance]) -> Result<Instance, ResolveError> {
    let members = members
        .iter()
        .map(|member| Arc::<I>::from_resolved(Some(member)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Instance::new(Arc::new(members)))
}

/// Republishes the result of another provider under an interface Key
pub(crate) struct InterfaceProvider {
    key: Key,
    parameters: ParameterList,
    alias: As,
}

impl InterfaceProvider {
    /// `backing` is the Key of the wrapped constructor
    pub fn new(backing: &Key, alias: As) -> Self {
        let mut parameter = Parameter::required(backing.info);
        parameter.name = backing.name.clone();

        InterfaceProvider {
            key: Key::new(alias.target, backing.name.clone(), ProviderKind::Interface),
            parameters: vec![parameter],
            alias,
        }
    }
}

impl Provider for InterfaceProvider {
    fn key(&self) -> &Key {
        &self.key
    }

    fn parameters(&self) -> &ParameterList {
        &self.parameters
    }

    fn provide(&self, values: &[Option<Instance>]) -> Result<Produced, ResolveError> {
        match values.first() {
            Some(Some(value)) => Ok((self.alias.cast)(value)?.into()),
            _ => Err(ResolveError::NoProviderForKey(self.parameters[0].to_string())),
        }
    }
}
