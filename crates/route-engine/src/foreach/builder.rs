//! Builder de `ForeachRouter`. Sólo la cadena anidada es obligatoria.
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use route_core::{ContextRegistry, EventTracer, NoopTracer, Processor, Scheduler};

use super::{ForeachRouter, SplitExpression};
use crate::config::ForeachConfig;

pub struct ForeachRouterBuilder {
    config: ForeachConfig,
    chain: Arc<dyn Processor>,
    expression: Option<Arc<dyn SplitExpression>>,
    registry: Option<Arc<ContextRegistry>>,
    tracer: Option<Arc<dyn EventTracer>>,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl ForeachRouterBuilder {
    pub(crate) fn new(chain: Arc<dyn Processor>) -> Self {
        Self { config: ForeachConfig::default(),
               chain,
               expression: None,
               registry: None,
               tracer: None,
               scheduler: None }
    }

    pub fn config(mut self, config: ForeachConfig) -> Self {
        self.config = config;
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    pub fn reject_map_payloads(mut self, reject: bool) -> Self {
        self.config.reject_map_payloads = reject;
        self
    }

    pub fn counter_variable_name(mut self, name: impl Into<String>) -> Self {
        self.config.counter_variable_name = name.into();
        self
    }

    pub fn expression(mut self, expression: Arc<dyn SplitExpression>) -> Self {
        self.expression = Some(expression);
        self
    }

    /// Registro compartido (p.ej. entre un foreach y sus anidados).
    pub fn registry(mut self, registry: Arc<ContextRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn tracer(mut self, tracer: Arc<dyn EventTracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Scheduler para el modo stream; sin él se usa el runtime actual.
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn build(self) -> ForeachRouter {
        ForeachRouter { config: self.config,
                        expression: self.expression,
                        chain: self.chain,
                        registry: self.registry.unwrap_or_default(),
                        tracer: self.tracer.unwrap_or_else(|| Arc::new(NoopTracer)),
                        scheduler: self.scheduler,
                        inflight: AtomicUsize::new(0),
                        deferred_streams: AtomicUsize::new(0) }
    }
}
