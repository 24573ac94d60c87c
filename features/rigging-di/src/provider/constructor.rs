use std::{any::TypeId, fmt, sync::Arc};

use crate::{
    errors::{RegistrationError, ResolveError},
    inject::Function,
    key::{Key, ParameterList},
    provider::{Cleanup, Produced, Provider},
    types::{DynError, Injectable, Instance, TypeInfo},
};

/// The constructor signatures a provider may have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtorShape {
    /// `(deps) -> T`
    Std,
    /// `(deps) -> Result<T, E>`
    Error,
    /// `(deps) -> (T, Cleanup)`
    Cleanup,
    /// `(deps) -> Result<(T, Cleanup), E>`
    CleanupError,
}

impl CtorShape {
    pub const EXPECTED: &'static str =
        "`Fn([dep1, dep2, ...]) -> T | Result<T, E> | (T, Cleanup) | Result<(T, Cleanup), E>`";
}

impl fmt::Display for CtorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CtorShape::Std => "(deps) -> T",
            CtorShape::Error => "(deps) -> Result<T, E>",
            CtorShape::Cleanup => "(deps) -> (T, Cleanup)",
            CtorShape::CleanupError => "(deps) -> Result<(T, Cleanup), E>",
        })
    }
}

pub(crate) type CtorFn =
    Arc<dyn Fn(&[Option<Instance>]) -> Result<Produced, ResolveError> + Send + Sync>;

/// A registered constructor, before it receives its Key
#[derive(Clone)]
pub(crate) struct Ctor {
    pub product: TypeInfo,
    pub shape: CtorShape,
    pub function: &'static str,
    pub call: CtorFn,
}

impl Ctor {
    fn checked<T: 'static>(
        function: &'static str,
        shape: CtorShape,
        call: CtorFn,
    ) -> Result<Self, RegistrationError> {
        let product = TypeInfo::of::<T>();
        // There is no stable way to name "any Result" in a bound, so this matches on
        // the `type_name` rendering, pinned by `result_through_plain_is_malformed`.
        let declares_no_result = product.type_id == TypeId::of::<()>()
            || product.type_name.starts_with("core::result::Result<");

        if declares_no_result {
            return Err(RegistrationError::MalformedConstructor {
                constructor: function.to_string(),
                expected: CtorShape::EXPECTED,
            });
        }

        Ok(Ctor {
            product,
            shape,
            function,
            call,
        })
    }

    pub fn plain<F, Args>(ctor: F) -> Result<Self, RegistrationError>
    where
        F: Function<Args>,
        F::Output: Injectable,
    {
        let call: CtorFn = Arc::new(move |values: &[Option<Instance>]| {
            let product = Function::call(&ctor, values)?;
            Ok(Instance::new(Arc::new(product)).into())
        });
        Self::checked::<F::Output>(std::any::type_name::<F>(), CtorShape::Std, call)
    }

    pub fn fallible<F, Args, T, E>(ctor: F) -> Result<Self, RegistrationError>
    where
        F: Function<Args, Output = Result<T, E>>,
        T: Injectable,
        E: Into<DynError>,
    {
        let call: CtorFn = Arc::new(move |values: &[Option<Instance>]| {
            let product = Function::call(&ctor, values)?
                .map_err(|e| ResolveError::ConstructorFailed(e.into()))?;
            Ok(Instance::new(Arc::new(product)).into())
        });
        Self::checked::<T>(std::any::type_name::<F>(), CtorShape::Error, call)
    }

    pub fn with_cleanup<F, Args, T>(ctor: F) -> Result<Self, RegistrationError>
    where
        F: Function<Args, Output = (T, Cleanup)>,
        T: Injectable,
    {
        let call: CtorFn = Arc::new(move |values: &[Option<Instance>]| {
            let (product, cleanup) = Function::call(&ctor, values)?;
            Ok(Produced {
                instance: Instance::new(Arc::new(product)),
                cleanup: Some(cleanup),
            })
        });
        Self::checked::<T>(std::any::type_name::<F>(), CtorShape::Cleanup, call)
    }

    pub fn fallible_with_cleanup<F, Args, T, E>(ctor: F) -> Result<Self, RegistrationError>
    where
        F: Function<Args, Output = Result<(T, Cleanup), E>>,
        T: Injectable,
        E: Into<DynError>,
    {
        let call: CtorFn = Arc::new(move |values: &[Option<Instance>]| {
            let (product, cleanup) = Function::call(&ctor, values)?
                .map_err(|e| ResolveError::ConstructorFailed(e.into()))?;
            Ok(Produced {
                instance: Instance::new(Arc::new(product)),
                cleanup: Some(cleanup),
            })
        });
        Self::checked::<T>(std::any::type_name::<F>(), CtorShape::CleanupError, call)
    }

    /// An already built value, handed out as is
    pub fn shared<T: Injectable + ?Sized>(value: Arc<T>) -> Self {
        let instance = Instance::new(value);
        Ctor {
            product: TypeInfo::of::<T>(),
            shape: CtorShape::Std,
            function: std::any::type_name::<T>(),
            call: Arc::new(move |_: &[Option<Instance>]| Ok(instance.clone().into())),
        }
    }
}

/// Produces values by calling a user function
pub(crate) struct ConstructorProvider {
    key: Key,
    parameters: ParameterList,
    ctor: Ctor,
}

impl ConstructorProvider {
    pub fn new(key: Key, parameters: ParameterList, ctor: Ctor) -> Self {
        ConstructorProvider {
            key,
            parameters,
            ctor,
        }
    }
}

impl Provider for ConstructorProvider {
    fn key(&self) -> &Key {
        &self.key
    }

    fn parameters(&self) -> &ParameterList {
        &self.parameters
    }

    fn provide(&self, values: &[Option<Instance>]) -> Result<Produced, ResolveError> {
        tracing::trace!(key = %self.key, shape = %self.ctor.shape, "Calling constructor {}", self.ctor.function);
        (self.ctor.call)(values)
    }
}
