//! Rigging Config provides a registry of configs that can be injected in the rest of the
//! application.
//!
//! Rigging Config is split into two major parts:
//! 1. ConfigProvider: Used to create the registry of all configs and install them into a container
//! 2. Config<T>: A wrapper type to be able to request configs as constructor parameters
//!
//! # Examples
//!
//! ```rust
//! use rigging_config::provider::ConfigProvider;
//!
//! #[derive(Clone)]
//! struct AppConfig {
//!     host: String,
//!     port: u16,
//!     app_name: String,
//! }
//!
//! let app_config = AppConfig {
//!     host: "localhost".to_string(),
//!     port: 8080_u16,
//!     app_name: "My Awesome App".to_string(),
//! };
//!
//! let mut config_provider = ConfigProvider::new();
//! if let Err(e) = config_provider.add_config(app_config.clone()) {
//!     panic!("{e}");
//! }
//!
//! let retrieved_config = match config_provider.get_config::<AppConfig>() {
//!     Ok(c) => c,
//!     Err(e) => panic!("{e}"),
//! };
//!
//! assert_eq!(app_config.host, retrieved_config.host);
//! assert_eq!(app_config.port, retrieved_config.port);
//! assert_eq!(app_config.app_name, retrieved_config.app_name);
//! ```
//!
//! Rigging Config consists of the following components:
//!
//! 1. Config - for requesting a config as a dependency
//! 2. Provider - for creating a registry of configs, adding, retrieving and installing configs
//! 3. Errors - for config errors

pub mod config;
pub mod errors;
pub mod provider;
