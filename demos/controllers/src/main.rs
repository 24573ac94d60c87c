use std::sync::Arc;

use crate::controllers::{
    Controller, OrderController, ServeError, ServeMux, Server, ServerConfig, UserController,
};
use rigging_config::{config::Config, provider::ConfigProvider};
use rigging_di::{As, Cleanup, Container, ContainerBuilder, Provide};
use tracing_subscriber::EnvFilter;

mod controllers;

fn container(configs: &ConfigProvider) -> ContainerBuilder {
    configs
        .install(Container::builder())
        .provide(Provide::fallible_with_cleanup(
            |config: Config<ServerConfig>, mux: Arc<ServeMux>| -> Result<_, ServeError> {
                let server = Server::new(&config, mux)?;
                let addr = server.addr.clone();
                tracing::info!(%addr, "Server listening");
                Ok((
                    server,
                    Cleanup::new(move || tracing::info!(%addr, "Server stopped")),
                ))
            },
        ))
        .provide(Provide::new(ServeMux::new))
        .provide(
            Provide::new(|| OrderController)
                .as_interface(As::new(|c: Arc<OrderController>| c as Arc<dyn Controller>)),
        )
        .provide(
            Provide::new(|| UserController)
                .as_interface(As::new(|c: Arc<UserController>| c as Arc<dyn Controller>)),
        )
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let addr = std::env::var("SERVER_ADDR").ok();

    let mut configs = ConfigProvider::new();
    configs.add_config(ServerConfig {
        addr: addr.unwrap_or_else(|| "0.0.0.0:8080".to_string()),
    })?;

    let container = container(&configs).build()?;
    tracing::info!("{container:?}");

    let mux = container.extract::<ServeMux>()?;
    tracing::info!(routes = ?mux.paths(), "Routes registered");

    let server = container.extract::<Server>()?;
    for path in ["/orders", "/users", "/health"] {
        match server.serve(path) {
            Ok(response) => println!("{path} -> {} {}", response.status, response.body),
            Err(e) => println!("{path} -> {e}"),
        }
    }

    container.cleanup();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_serves_every_controller() {
        let mut configs = ConfigProvider::new();
        configs
            .add_config(ServerConfig {
                addr: "127.0.0.1:0".into(),
            })
            .unwrap();

        let container = container(&configs).build().unwrap();
        let server = container.extract::<Server>().unwrap();

        assert_eq!(server.serve("/orders").unwrap().body, "Orders");
        assert_eq!(server.serve("/users").unwrap().body, "Users");
        assert!(server.serve("/health").is_err());
    }

    #[test]
    fn invalid_addr_fails_resolution() {
        let mut configs = ConfigProvider::new();
        configs
            .add_config(ServerConfig {
                addr: "nowhere".into(),
            })
            .unwrap();

        let container = container(&configs).build().unwrap();
        let error = container.extract::<Server>().err().unwrap();

        assert_eq!(error.root_cause().to_string(), "Invalid listen address 'nowhere'");
        assert!(container.history().iter().all(|key| !key.to_string().ends_with("Server")));
    }
}
