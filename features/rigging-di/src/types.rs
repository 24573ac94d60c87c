use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// Errors returned by user constructors, modifiers and invoked functions
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Resolution may happen from any thread after compile,
/// so anything injectable needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static + ?Sized> Injectable for T {}

/// A produced value, type erased
///
/// The payload is always an `Arc<T>` boxed as `Any`, which lets trait objects
/// (`Arc<dyn Trait>`) travel through the graph the same way concrete values do.
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    instance: Arc<dyn Any + Send + Sync + 'static>,
}

impl Instance {
    pub(crate) fn new<T: Injectable + ?Sized>(value: Arc<T>) -> Self {
        Instance {
            info: TypeInfo::of::<T>(),
            instance: Arc::new(value),
        }
    }

    /// Returns the shared value, or the name of the actual type on mismatch
    pub fn downcast<T: Injectable + ?Sized>(&self) -> Result<Arc<T>, &'static str> {
        match self.instance.downcast_ref::<Arc<T>>() {
            Some(downcasted) => Ok(downcasted.clone()),
            None => Err(self.info.type_name),
        }
    }

    /// True if both instances share the same allocation
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.info.type_name).finish()
    }
}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }

    /// True for `dyn Trait` types
    ///
    /// Trait objects are the only valid interface targets.
    pub fn is_trait_object(&self) -> bool {
        // Relies on the `type_name` rendering of trait objects, which std does not
        // guarantee, pinned by `trait_object_detection`.
        self.type_name.starts_with("dyn ")
    }
}
