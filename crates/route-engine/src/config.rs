//! Configuración de los routers.
//!
//! Ambas estructuras son planas y `Clone`; el crate raíz las construye a
//! partir del entorno, los tests las construyen a mano.
use std::time::Duration;

use route_core::constants::{DEFAULT_COUNTER_VARIABLE, DEFAULT_ROOT_MESSAGE_VARIABLE};
use route_core::ErrorType;

#[derive(Debug, Clone, PartialEq)]
pub struct ForkJoinConfig {
    /// Ramas en vuelo como máximo (despachadas y aún no emitidas en orden).
    /// Un valor 0 se trata como 1.
    pub max_concurrency: usize,
    /// `true`: esperar todas las ramas y agregar los fallos en un
    /// `CompositeRoutingError`. `false`: abortar con el primer error nuevo.
    pub delay_errors: bool,
    /// Plazo por rama, medido desde el despacho.
    pub timeout: Option<Duration>,
    pub timeout_error_type: ErrorType,
    pub merge_variables: bool,
    /// Conservar el `RouteExecutionError` causante en cada fallo agregado.
    pub detailed_errors: bool,
    /// Nombre del componente dueño (logs, spans y etiquetado de errores).
    pub component: String,
}

impl Default for ForkJoinConfig {
    fn default() -> Self {
        Self { max_concurrency: usize::MAX,
               delay_errors: true,
               timeout: None,
               timeout_error_type: ErrorType::timeout(),
               merge_variables: true,
               detailed_errors: false,
               component: "scatter-gather".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeachConfig {
    /// Elementos agrupados por cada invocación de la cadena (>= 1).
    pub batch_size: usize,
    /// Rechazar payloads mapa cuando no hay expresión explícita.
    pub reject_map_payloads: bool,
    pub counter_variable_name: String,
    pub root_message_variable_name: String,
    pub component: String,
    /// Capacidad del canal de salida en modo stream.
    pub stream_buffer: usize,
}

impl Default for ForeachConfig {
    fn default() -> Self {
        Self { batch_size: 1,
               reject_map_payloads: true,
               counter_variable_name: DEFAULT_COUNTER_VARIABLE.to_string(),
               root_message_variable_name: DEFAULT_ROOT_MESSAGE_VARIABLE.to_string(),
               component: "foreach".to_string(),
               stream_buffer: 64 }
    }
}
