//! route-core: modelo de eventos y contratos del núcleo de ruteo.
//!
//! Contiene todo lo que los routers (`route-engine`) comparten con sus
//! callers: el `Event` inmutable y su builder, el registro de contextos de
//! foreach, los resultados por rama y el error compuesto, la taxonomía de
//! errores y los colaboradores externos (scheduler, reloj, tracer).
pub mod constants;
pub mod context;
pub mod errors;
pub mod event;
pub mod model;
pub mod routing;
pub mod runtime;

pub use context::{ContextRegistry, EventBuilderConfigurer, ForeachContext, SplitElement, SplitIter};
pub use errors::{RouteExecutionError, RouteTimeoutError, RoutingError, SplitError, ValidationError};
pub use event::{Event, EventBuilder};
pub use model::{ContextKey, DataType, ErrorCause, ErrorType, EventError, GroupCorrelation, ItemSequenceInfo, Message, TypedValue};
pub use routing::{CompositeRoutingError, RouteFailure, RouteOutcome, RoutingPair, RoutingResult};
pub use runtime::{processor_fn, Clock, EventTracer, NoopTracer, PassThrough, Processor, Scheduler, TokioClock, TokioScheduler};
