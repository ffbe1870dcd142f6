use std::time::Duration;

use futures::future::BoxFuture;
use tokio::time::Instant;

/// Reloj externo usado para medir los timeouts de rama.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    /// Futuro que se completa tras `duration`.
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Reloj de tokio (respeta `tokio::time::pause` en tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}
