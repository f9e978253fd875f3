//! Dispatch server implementation

mod builtin;
pub mod config;
pub mod dispatch;
pub mod listener;
mod registrar;

pub use config::ServerConfig;
pub use dispatch::Dispatcher;
pub use listener::DispatchServer;
