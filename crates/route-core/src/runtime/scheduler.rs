//! Abstracción de scheduler: los routers nunca crean hilos propios, todo el
//! trabajo de rama se envía a través de `Scheduler::submit`.
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::BoxFuture;
use log::warn;
use tokio::runtime::Handle;

use crate::errors::SchedulerError;

pub trait Scheduler: Send + Sync {
    /// Encola `work` y devuelve un handle cancelable.
    fn submit(&self, work: BoxFuture<'static, ()>) -> Result<TaskHandle, SchedulerError>;
}

/// Handle de una tarea enviada al scheduler.
pub struct TaskHandle {
    cancel: Option<Box<dyn Fn() + Send + Sync>>,
}

impl TaskHandle {
    pub fn new(cancel: impl Fn() + Send + Sync + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    /// Handle sin posibilidad de cancelación.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    /// Solicita la cancelación de la tarea. Idempotente.
    pub fn cancel(&self) {
        if let Some(cancel) = &self.cancel {
            cancel();
        }
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle").field("cancellable", &self.cancel.is_some()).finish()
    }
}

/// Scheduler respaldado por un runtime tokio.
#[derive(Debug)]
pub struct TokioScheduler {
    handle: Handle,
    shut_down: AtomicBool,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle,
               shut_down: AtomicBool::new(false) }
    }

    /// Usa el runtime del contexto actual.
    pub fn current() -> Result<Self, SchedulerError> {
        Handle::try_current().map(Self::new)
                             .map_err(|e| SchedulerError::Rejected(format!("no tokio runtime: {e}")))
    }

    /// A partir de aquí todo `submit` es rechazado.
    pub fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }
}

impl Scheduler for TokioScheduler {
    fn submit(&self, work: BoxFuture<'static, ()>) -> Result<TaskHandle, SchedulerError> {
        if self.shut_down.load(Ordering::SeqCst) {
            warn!("scheduler:rejected reason=shutdown");
            return Err(SchedulerError::Rejected("scheduler is shut down".into()));
        }
        let abort = self.handle.spawn(work).abort_handle();
        Ok(TaskHandle::new(move || abort.abort()))
    }
}
