use std::{collections::BTreeMap, sync::Arc};

use thiserror::Error;

pub type Handler = Box<dyn Fn() -> Response + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    fn ok(body: &str) -> Self {
        Response {
            status: 200,
            body: body.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("No route for '{0}'")]
    NotFound(String),
    #[error("Invalid listen address '{0}'")]
    InvalidAddr(String),
}

/// Something that can register its routes
pub trait Controller: Send + Sync {
    fn register_routes(&self, routes: &mut Routes);
}

#[derive(Default)]
pub struct Routes {
    handlers: BTreeMap<&'static str, Handler>,
}

impl Routes {
    pub fn handle(&mut self, path: &'static str, handler: Handler) {
        self.handlers.insert(path, handler);
    }
}

/// Routes collected from every controller, frozen once built
pub struct ServeMux {
    routes: Routes,
}

impl ServeMux {
    pub fn new(controllers: Vec<Arc<dyn Controller>>) -> Self {
        let mut routes = Routes::default();
        for controller in &controllers {
            controller.register_routes(&mut routes);
        }
        tracing::info!(routes = routes.handlers.len(), "Serve mux ready");
        ServeMux { routes }
    }

    pub fn paths(&self) -> Vec<&'static str> {
        self.routes.handlers.keys().copied().collect()
    }

    pub fn dispatch(&self, path: &str) -> Result<Response, ServeError> {
        match self.routes.handlers.get(path) {
            Some(handler) => Ok(handler()),
            None => Err(ServeError::NotFound(path.to_string())),
        }
    }
}

pub struct OrderController;

impl Controller for OrderController {
    fn register_routes(&self, routes: &mut Routes) {
        routes.handle("/orders", Box::new(|| Response::ok("Orders")));
    }
}

pub struct UserController;

impl Controller for UserController {
    fn register_routes(&self, routes: &mut Routes) {
        routes.handle("/users", Box::new(|| Response::ok("Users")));
    }
}

pub struct ServerConfig {
    pub addr: String,
}

pub struct Server {
    pub addr: String,
    mux: Arc<ServeMux>,
}

impl Server {
    pub fn new(config: &ServerConfig, mux: Arc<ServeMux>) -> Result<Self, ServeError> {
        if !config.addr.contains(':') {
            return Err(ServeError::InvalidAddr(config.addr.clone()));
        }
        Ok(Server {
            addr: config.addr.clone(),
            mux,
        })
    }

    pub fn serve(&self, path: &str) -> Result<Response, ServeError> {
        let response = self.mux.dispatch(path);
        tracing::debug!(addr = %self.addr, path, ok = response.is_ok(), "Served request");
        response
    }
}
