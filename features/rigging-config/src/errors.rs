use rigging_di::TypeInfo;

/// Errors of the config registry
#[derive(thiserror::Error, Debug, Clone)]
pub enum ConfigError {
    /// The required Config is not known
    #[error("The config type '{0}' is not known")]
    Missing(TypeInfo),
    /// The Config type is already registered
    #[error("The config type '{0}' is already registered")]
    AlreadyRegistered(TypeInfo),
}
