//! Contrato de una ruta / cadena anidada.
//!
//! Un `Processor` recibe un evento y devuelve la revisión resultante o un
//! `RouteExecutionError`. Tanto las rutas del fork-join como la cadena
//! anidada del foreach implementan este trait.
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::RouteExecutionError;
use crate::event::Event;

#[async_trait]
pub trait Processor: Send + Sync {
    /// Nombre usado en logs y spans.
    fn name(&self) -> &str {
        "processor"
    }

    async fn process(&self, event: Event) -> Result<Event, RouteExecutionError>;
}

/// Adaptador de closures asíncronas a `Processor`.
pub struct FnProcessor<F> {
    name: String,
    f: F,
}

#[async_trait]
impl<F, Fut> Processor for FnProcessor<F>
    where F: Fn(Event) -> Fut + Send + Sync,
          Fut: Future<Output = Result<Event, RouteExecutionError>> + Send
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn process(&self, event: Event) -> Result<Event, RouteExecutionError> {
        (self.f)(event).await
    }
}

/// Envuelve una closure `Fn(Event) -> impl Future<...>` como ruta compartible.
pub fn processor_fn<F, Fut>(name: impl Into<String>, f: F) -> Arc<dyn Processor>
    where F: Fn(Event) -> Fut + Send + Sync + 'static,
          Fut: Future<Output = Result<Event, RouteExecutionError>> + Send + 'static
{
    Arc::new(FnProcessor { name: name.into(), f })
}

/// Ruta que devuelve el evento sin cambios.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

#[async_trait]
impl Processor for PassThrough {
    fn name(&self) -> &str {
        "pass-through"
    }

    async fn process(&self, event: Event) -> Result<Event, RouteExecutionError> {
        Ok(event)
    }
}
