//! Builder de `ForkJoinRouter`.
//!
//! Sólo el scheduler es obligatorio; reloj, tracer y agregador toman los
//! valores por defecto (`TokioClock`, `NoopTracer`, `CollectMapAggregator`).
use std::sync::Arc;
use std::time::Duration;

use route_core::{Clock, EventTracer, NoopTracer, Scheduler, TokioClock};

use super::{CollectMapAggregator, ForkJoinRouter, ResultAggregator};
use crate::config::ForkJoinConfig;

pub struct ForkJoinRouterBuilder {
    config: ForkJoinConfig,
    scheduler: Arc<dyn Scheduler>,
    clock: Option<Arc<dyn Clock>>,
    tracer: Option<Arc<dyn EventTracer>>,
    aggregator: Option<Arc<dyn ResultAggregator>>,
}

impl ForkJoinRouterBuilder {
    pub(crate) fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self { config: ForkJoinConfig::default(),
               scheduler,
               clock: None,
               tracer: None,
               aggregator: None }
    }

    /// Reemplaza la configuración completa.
    pub fn config(mut self, config: ForkJoinConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_concurrency(mut self, max: usize) -> Self {
        self.config.max_concurrency = max;
        self
    }

    pub fn delay_errors(mut self, delay: bool) -> Self {
        self.config.delay_errors = delay;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn detailed_errors(mut self, detailed: bool) -> Self {
        self.config.detailed_errors = detailed;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn tracer(mut self, tracer: Arc<dyn EventTracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn aggregator(mut self, aggregator: Arc<dyn ResultAggregator>) -> Self {
        self.aggregator = Some(aggregator);
        self
    }

    pub fn build(self) -> ForkJoinRouter {
        ForkJoinRouter { config: self.config,
                         scheduler: self.scheduler,
                         clock: self.clock.unwrap_or_else(|| Arc::new(TokioClock)),
                         tracer: self.tracer.unwrap_or_else(|| Arc::new(NoopTracer)),
                         aggregator: self.aggregator.unwrap_or_else(|| Arc::new(CollectMapAggregator)) }
    }
}
