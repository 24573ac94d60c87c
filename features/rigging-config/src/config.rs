use std::{ops::Deref, sync::Arc};

use rigging_di::{Inject, Instance, Parameter, ResolveError};

/// A wrapper type to allow for config injections
///
/// Resolves the same Key as `Arc<T>`, it only marks the parameter as a config
/// in constructor signatures.
///
/// # Example
/// ```rust
/// use rigging_config::{config::Config, provider::ConfigProvider};
/// use rigging_di::{Container, Provide};
///
/// pub struct MyModuleConfig {
///     enabled: bool,
/// }
///
/// struct MyModule {
///     enabled: bool,
/// }
///
/// let mut configs = ConfigProvider::new();
/// configs.add_config(MyModuleConfig { enabled: true }).unwrap();
///
/// let container = configs
///     .install(Container::builder())
///     .provide(Provide::new(|config: Config<MyModuleConfig>| MyModule {
///         enabled: config.enabled,
///     }))
///     .build()
///     .unwrap();
///
/// assert!(container.extract::<MyModule>().unwrap().enabled);
/// ```
pub struct Config<T> {
    inner: Arc<T>,
}

impl<T> Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> Config<T> {
    pub fn inner(&self) -> Arc<T> {
        self.inner.clone()
    }

    pub fn into_inner(self) -> Arc<T> {
        self.inner
    }
}

impl<T: Send + Sync + 'static> Inject for Config<T> {
    fn parameter() -> Parameter {
        Arc::<T>::parameter()
    }

    fn from_resolved(value: Option<&Instance>) -> Result<Self, ResolveError> {
        Arc::<T>::from_resolved(value).map(|inner| Config { inner })
    }
}
