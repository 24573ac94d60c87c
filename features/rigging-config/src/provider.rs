use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

use rigging_di::{ContainerBuilder, Provide, TypeInfo};

use crate::errors::ConfigError;

type InstallFn = Box<dyn Fn(ContainerBuilder) -> ContainerBuilder + Send + Sync>;

struct ConfigEntry {
    info: TypeInfo,
    config: Arc<dyn Any + Send + Sync + 'static>,
    install: InstallFn,
}

/// A provider to register all configs.
///
/// Configs can be registered and retrieved based on type,
/// then installed into a [ContainerBuilder] as singleton instances.
#[derive(Default)]
pub struct ConfigProvider {
    configs: HashMap<TypeId, ConfigEntry>,
    /// Registration order, kept so installing is deterministic
    order: Vec<TypeId>,
}

impl ConfigProvider {
    /// Initializes an empty Config Provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve a config with specified type.
    ///
    /// If the config type is not available, it will return [`ConfigError::Missing`]
    pub fn get_config<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ConfigError> {
        self.configs
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.config.clone().downcast().ok())
            .ok_or(ConfigError::Missing(TypeInfo::of::<T>()))
    }

    /// Add a config to the registry.
    ///
    /// If the config type is already registered, it will return
    /// [`ConfigError::AlreadyRegistered`]
    pub fn add_config<T: Send + Sync + 'static>(
        &mut self,
        config: T,
    ) -> Result<&mut Self, ConfigError> {
        let info = TypeInfo::of::<T>();

        if self.configs.contains_key(&info.type_id) {
            return Err(ConfigError::AlreadyRegistered(info));
        }

        let config = Arc::new(config);
        let shared = config.clone();
        let entry = ConfigEntry {
            info,
            config,
            install: Box::new(move |builder: ContainerBuilder| {
                builder.provide(Provide::shared(shared.clone()))
            }),
        };

        tracing::debug!(config = %info, "Registered config");
        self.configs.insert(info.type_id, entry);
        self.order.push(info.type_id);
        Ok(self)
    }

    /// Can optionally add a config to the registry.
    ///
    /// If the config provided is `Some(T)`, it will be the same as calling [`ConfigProvider::add_config`]
    /// If the config provided is `None`, then the function just returns `Ok(self)` for chaining
    pub fn maybe_add_config<T: Send + Sync + 'static>(
        &mut self,
        config: Option<T>,
    ) -> Result<&mut Self, ConfigError> {
        match config {
            Some(c) => self.add_config(c),
            None => Ok(self),
        }
    }

    /// Registers every config as a singleton instance, in registration order
    ///
    /// Constructors can then take `Arc<MyConfig>` or [Config](crate::config::Config) parameters.
    pub fn install(&self, builder: ContainerBuilder) -> ContainerBuilder {
        self.order
            .iter()
            .filter_map(|type_id| self.configs.get(type_id))
            .fold(builder, |builder, entry| {
                tracing::trace!(config = %entry.info, "Installing config");
                (entry.install)(builder)
            })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
