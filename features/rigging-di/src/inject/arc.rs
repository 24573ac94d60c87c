use std::{any::type_name, sync::Arc};

use crate::{
    errors::ResolveError,
    inject::Inject,
    key::Parameter,
    types::{Injectable, Instance, TypeInfo},
};

fn downcast<T: Injectable + ?Sized>(instance: &Instance) -> Result<Arc<T>, ResolveError> {
    instance
        .downcast::<T>()
        .map_err(|actual_type| ResolveError::DowncastFailed {
            required_type: type_name::<T>(),
            actual_type,
        })
}

impl<T: Injectable + ?Sized> Inject for Arc<T> {
    fn parameter() -> Parameter {
        Parameter::required(TypeInfo::of::<T>())
    }

    fn from_resolved(value: Option<&Instance>) -> Result<Self, ResolveError> {
        match value {
            Some(instance) => downcast::<T>(instance),
            None => Err(ResolveError::NoProviderForKey(type_name::<T>().to_string())),
        }
    }
}

impl<T: Injectable + ?Sized> Inject for Option<Arc<T>> {
    fn parameter() -> Parameter {
        Parameter::optional(TypeInfo::of::<T>())
    }

    fn from_resolved(value: Option<&Instance>) -> Result<Self, ResolveError> {
        value.map(downcast::<T>).transpose()
    }
}

/// Every implementation published under interface `T`, in registration order
impl<T: Injectable + ?Sized> Inject for Vec<Arc<T>> {
    fn parameter() -> Parameter {
        Parameter::required(TypeInfo::of::<Vec<Arc<T>>>())
    }

    fn from_resolved(value: Option<&Instance>) -> Result<Self, ResolveError> {
        match value {
            Some(instance) => Ok(downcast::<Vec<Arc<T>>>(instance)?.as_ref().clone()),
            None => Err(ResolveError::NoProviderForKey(
                type_name::<Vec<Arc<T>>>().to_string(),
            )),
        }
    }
}
