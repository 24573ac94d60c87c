use std::{any::type_name, ops::Deref, sync::Arc};

use crate::{
    errors::{RegistrationError, ResolveError},
    inject::Inject,
    key::{Key, Parameter, ParameterList, ProviderKind},
    provider::{Produced, Provider},
    types::{Injectable, Instance, TypeInfo},
};

/// A struct whose fields are injected one by one
///
/// Fields are listed explicitly; each field may point at a named Key.
/// Bags embed one level deep: a field can not itself be an [Embed].
///
/// ```
/// # use std::sync::Arc;
/// # use rigging_di::{BagFields, BagValues, ParameterBag, ResolveError};
/// struct Ports {
///     http: Arc<u16>,
///     admin: Option<Arc<u16>>,
/// }
///
/// impl ParameterBag for Ports {
///     fn fields(fields: &mut BagFields) {
///         fields.named::<Arc<u16>>("http", "http");
///         fields.named::<Option<Arc<u16>>>("admin", "admin");
///     }
///
///     fn assemble(values: &BagValues) -> Result<Self, ResolveError> {
///         Ok(Ports {
///             http: values.get("http")?,
///             admin: values.get("admin")?,
///         })
///     }
/// }
/// ```
pub trait ParameterBag: Injectable + Sized {
    /// Declares the injected fields
    fn fields(fields: &mut BagFields);

    /// Builds the bag from the resolved field values
    ///
    /// Optional fields without provider resolve to `None`.
    fn assemble(values: &BagValues) -> Result<Self, ResolveError>;
}

/// Constructor parameter standing for a [ParameterBag]
pub struct Embed<B>(Arc<B>);

impl<B> Embed<B> {
    pub fn into_inner(self) -> Arc<B> {
        self.0
    }
}

impl<B> Deref for Embed<B> {
    type Target = B;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<B: ParameterBag> Inject for Embed<B> {
    fn parameter() -> Parameter {
        Parameter {
            embed: true,
            ..Parameter::required(TypeInfo::of::<B>())
        }
    }

    fn embedded() -> Option<EmbedDescriptor> {
        Some(EmbedDescriptor::of::<B>())
    }

    fn from_resolved(value: Option<&Instance>) -> Result<Self, ResolveError> {
        Arc::<B>::from_resolved(value).map(Embed)
    }
}

#[derive(Debug, Clone)]
pub struct BagField {
    pub field: &'static str,
    pub parameter: Parameter,
}

/// Field list of a parameter bag
pub struct BagFields {
    bag: &'static str,
    fields: Vec<BagField>,
    error: Option<RegistrationError>,
}

impl BagFields {
    /// Adds a field resolving the unnamed Key of `D`
    pub fn field<D: Inject>(&mut self, field: &'static str) -> &mut Self {
        self.push(field, D::parameter())
    }

    /// Adds a field resolving the Key of `D` named `key_name`
    pub fn named<D: Inject>(&mut self, field: &'static str, key_name: impl Into<String>) -> &mut Self {
        self.push(field, D::parameter().with_name(key_name))
    }

    fn push(&mut self, field: &'static str, parameter: Parameter) -> &mut Self {
        if parameter.embed && self.error.is_none() {
            self.error = Some(RegistrationError::MalformedParameterBag {
                bag: self.bag,
                field,
            });
        }
        self.fields.push(BagField { field, parameter });
        self
    }
}

/// Resolved field values handed to [ParameterBag::assemble]
pub struct BagValues {
    bag: &'static str,
    values: Vec<(&'static str, Option<Instance>)>,
}

impl BagValues {
    /// Converts the value of a declared field
    pub fn get<D: Inject>(&self, field: &str) -> Result<D, ResolveError> {
        match self.values.iter().find(|(name, _)| *name == field) {
            Some((_, value)) => D::from_resolved(value.as_ref()),
            None => Err(ResolveError::NoProviderForKey(format!(
                "{}.{field}",
                self.bag
            ))),
        }
    }
}

type AssembleFn = fn(&BagValues) -> Result<Instance, ResolveError>;

/// Field layout of a parameter bag type, captured at registration
#[derive(Clone)]
pub struct EmbedDescriptor {
    pub(crate) info: TypeInfo,
    pub(crate) fields: Vec<BagField>,
    pub(crate) error: Option<RegistrationError>,
    assemble: AssembleFn,
}

impl EmbedDescriptor {
    pub fn of<B: ParameterBag>() -> Self {
        let mut fields = BagFields {
            bag: type_name::<B>(),
            fields: Vec::new(),
            error: None,
        };
        B::fields(&mut fields);

        EmbedDescriptor {
            info: TypeInfo::of::<B>(),
            fields: fields.fields,
            error: fields.error,
            assemble: |values| Ok(Instance::new(Arc::new(B::assemble(values)?))),
        }
    }

    pub(crate) fn parameters(&self) -> ParameterList {
        self.fields.iter().map(|f| f.parameter.clone()).collect()
    }

    pub(crate) fn assemble(&self, values: &[Option<Instance>]) -> Result<Instance, ResolveError> {
        let values = BagValues {
            bag: self.info.type_name,
            values: self
                .fields
                .iter()
                .zip(values.iter().cloned())
                .map(|(field, value)| (field.field, value))
                .collect(),
        };
        (self.assemble)(&values)
    }
}

/// Synthetic provider building the parameter bag of one consumer
///
/// The Key is named after the consumer, so every consumer owns its bag.
pub(crate) struct EmbedProvider {
    key: Key,
    parameters: ParameterList,
    descriptor: EmbedDescriptor,
}

impl EmbedProvider {
    pub fn new(owner: &Key, descriptor: EmbedDescriptor) -> Self {
        EmbedProvider {
            key: Key::new(descriptor.info, Some(owner.to_string()), ProviderKind::Embed),
            parameters: descriptor.parameters(),
            descriptor,
        }
    }
}

impl Provider for EmbedProvider {
    fn key(&self) -> &Key {
        &self.key
    }

    fn parameters(&self) -> &ParameterList {
        &self.parameters
    }

    fn provide(&self, values: &[Option<Instance>]) -> Result<Produced, ResolveError> {
        Ok(self.descriptor.assemble(values)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Limits {
        soft: Arc<u32>,
        hard: Option<Arc<u64>>,
    }

    impl ParameterBag for Limits {
        fn fields(fields: &mut BagFields) {
            fields.named::<Arc<u32>>("soft", "soft").field::<Option<Arc<u64>>>("hard");
        }

        fn assemble(values: &BagValues) -> Result<Self, ResolveError> {
            Ok(Limits {
                soft: values.get("soft")?,
                hard: values.get("hard")?,
            })
        }
    }

    struct Nested {
        _limits: Embed<Limits>,
    }

    impl ParameterBag for Nested {
        fn fields(fields: &mut BagFields) {
            fields.field::<Embed<Limits>>("limits");
        }

        fn assemble(values: &BagValues) -> Result<Self, ResolveError> {
            Ok(Nested {
                _limits: values.get("limits")?,
            })
        }
    }

    #[test]
    fn fields_become_parameters() {
        let descriptor = EmbedDescriptor::of::<Limits>();
        let parameters = descriptor.parameters();

        assert!(descriptor.error.is_none());
        assert_eq!(parameters[0], Parameter::required(TypeInfo::of::<u32>()).with_name("soft"));
        assert_eq!(parameters[1], Parameter::optional(TypeInfo::of::<u64>()));
    }

    #[test]
    fn unresolved_optional_field_is_none() {
        let owner = Key::new(TypeInfo::of::<String>(), None, ProviderKind::Constructor);
        let provider = EmbedProvider::new(&owner, EmbedDescriptor::of::<Limits>());
        assert_eq!(provider.key().name(), Some("alloc::string::String"));

        let produced = provider
            .provide(&[Some(Instance::new(Arc::new(10_u32))), None])
            .unwrap();
        let limits = produced.instance.downcast::<Limits>().unwrap();

        assert_eq!(*limits.soft, 10);
        assert!(limits.hard.is_none());
    }

    #[test]
    fn nested_bags_are_rejected() {
        let descriptor = EmbedDescriptor::of::<Nested>();
        assert!(matches!(
            descriptor.error,
            Some(RegistrationError::MalformedParameterBag { field: "limits", .. })
        ));
    }
}
