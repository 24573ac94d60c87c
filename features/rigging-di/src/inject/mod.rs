use crate::{
    errors::ResolveError,
    key::Parameter,
    provider::embed::EmbedDescriptor,
    types::Instance,
};

pub mod arc;

/// A type which can be requested as a constructor, modifier or invoked function parameter
///
/// Implemented for `Arc<T>` (required), `Option<Arc<T>>` (optional),
/// `Vec<Arc<dyn I>>` (group of interface implementations) and
/// [Embed](crate::Embed) (parameter bag).
pub trait Inject: Sized {
    /// Describes the Key this parameter resolves
    fn parameter() -> Parameter;

    /// Field layout if this parameter is a parameter bag
    fn embedded() -> Option<EmbedDescriptor> {
        None
    }

    /// Converts the resolved value, `None` if an optional Key had no provider
    fn from_resolved(value: Option<&Instance>) -> Result<Self, ResolveError>;
}

/// Return types accepted from modifiers and invoked functions
pub trait InvokeOutput {
    fn into_result(self) -> Result<(), crate::types::DynError>;
}
impl InvokeOutput for () {
    fn into_result(self) -> Result<(), crate::types::DynError> {
        Ok(())
    }
}
impl<E: Into<crate::types::DynError>> InvokeOutput for Result<(), E> {
    fn into_result(self) -> Result<(), crate::types::DynError> {
        self.map_err(Into::into)
    }
}

/// Any function whose parameters can all be injected
///
/// Implemented for `Fn` closures and function items of up to eight parameters.
/// `Args` is the tuple of parameter types and only serves to select the impl.
pub trait Function<Args>: Send + Sync + 'static {
    type Output;

    /// One parameter per declared argument, in declaration order
    fn parameters() -> Vec<Parameter>;

    /// Parameter bag layouts, aligned with [Function::parameters]
    fn embedded() -> Vec<Option<EmbedDescriptor>>;

    /// Calls the function with positional, already resolved values
    fn call(&self, values: &[Option<Instance>]) -> Result<Self::Output, ResolveError>;
}

macro_rules! impl_function {
    ($($A:ident),*) => {
        impl<Fun, Out, $($A),*> Function<($($A,)*)> for Fun
        where
            Fun: Fn($($A),*) -> Out + Send + Sync + 'static,
            $($A: Inject,)*
        {
            type Output = Out;

            fn parameters() -> Vec<Parameter> {
                vec![$(<$A as Inject>::parameter()),*]
            }

            fn embedded() -> Vec<Option<EmbedDescriptor>> {
                vec![$(<$A as Inject>::embedded()),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn call(&self, values: &[Option<Instance>]) -> Result<Out, ResolveError> {
                let mut values = values.iter().map(Option::as_ref);
                Ok((self)($(<$A as Inject>::from_resolved(values.next().flatten())?),*))
            }
        }
    };
}

impl_function!();
impl_function!(A1);
impl_function!(A1, A2);
impl_function!(A1, A2, A3);
impl_function!(A1, A2, A3, A4);
impl_function!(A1, A2, A3, A4, A5);
impl_function!(A1, A2, A3, A4, A5, A6);
impl_function!(A1, A2, A3, A4, A5, A6, A7);
impl_function!(A1, A2, A3, A4, A5, A6, A7, A8);

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::types::TypeInfo;

    fn describe<F: Function<Args>, Args>(_: &F) -> Vec<Parameter> {
        F::parameters()
    }

    fn call<F: Function<Args>, Args>(f: &F, values: &[Option<Instance>]) -> Result<F::Output, ResolveError> {
        f.call(values)
    }

    #[test]
    fn parameters_follow_declaration_order() {
        let f = |_a: Arc<u8>, _b: Option<Arc<String>>| ();
        let parameters = describe(&f);

        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0], Parameter::required(TypeInfo::of::<u8>()));
        assert_eq!(parameters[1], Parameter::optional(TypeInfo::of::<String>()));
    }

    #[test]
    fn call_passes_positional_values() {
        let f = |a: Arc<u8>, b: Option<Arc<String>>| format!("{a}-{}", b.is_some());
        let values = vec![Some(Instance::new(Arc::new(7_u8))), None];

        assert_eq!(call(&f, &values).unwrap(), "7-false");
    }

    #[test]
    fn missing_required_value_fails() {
        let f = |a: Arc<u8>| *a;
        assert!(matches!(
            call(&f, &[None]),
            Err(ResolveError::NoProviderForKey(_))
        ));
    }

    #[test]
    fn invoke_output_carries_errors() {
        assert!(().into_result().is_ok());
        let failed: Result<(), std::io::Error> = Err(std::io::Error::other("nope"));
        assert_eq!(failed.into_result().unwrap_err().to_string(), "nope");
    }
}
