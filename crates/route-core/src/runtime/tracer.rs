//! Hooks de trazas. La exportación de spans queda fuera de este crate; aquí
//! sólo se definen los puntos de inicio/fin y dos implementaciones seguras.
use log::trace;

use crate::event::Event;

pub trait EventTracer: Send + Sync {
    fn start_span(&self, event: &Event, name: &str);
    fn end_span(&self, event: &Event);
}

/// No hace nada.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl EventTracer for NoopTracer {
    fn start_span(&self, _event: &Event, _name: &str) {}
    fn end_span(&self, _event: &Event) {}
}

/// Emite un registro `trace` por cada inicio/fin de span.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTracer;

impl EventTracer for LoggingTracer {
    fn start_span(&self, event: &Event, name: &str) {
        trace!("span:start event_id={} name={name} seq={:?} item={:?}",
               event.id(),
               event.group_correlation().map(|g| g.sequence),
               event.item_sequence().map(|i| i.position));
    }

    fn end_span(&self, event: &Event) {
        trace!("span:end event_id={} error={}", event.id(), event.error().is_some());
    }
}
