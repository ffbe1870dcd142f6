//! RouteFlow Rust Library
//!
//! Este crate actúa como la capa de aplicación sobre los routers:
//! - Expone `errors` con el error de núcleo de la aplicación.
//! - Expone `config` para leer los parámetros de los routers desde el
//!   entorno (.env).
//!
//! Puede usarse desde `main.rs` o por otros crates/clientes.

pub mod config;
pub mod errors;

pub use config::{AppConfig, CONFIG};
pub use errors::CoreError;
