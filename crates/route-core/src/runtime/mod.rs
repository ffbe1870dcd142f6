//! Colaboradores externos de los routers: scheduler, reloj, tracer y el
//! contrato de las rutas/cadenas (`Processor`), con implementaciones por
//! defecto sobre tokio.

mod clock;
mod processor;
mod scheduler;
mod tracer;

pub use clock::{Clock, TokioClock};
pub use processor::{processor_fn, FnProcessor, PassThrough, Processor};
pub use scheduler::{Scheduler, TaskHandle, TokioScheduler};
pub use tracer::{EventTracer, LoggingTracer, NoopTracer};
