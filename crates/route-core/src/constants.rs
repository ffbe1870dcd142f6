//! Constantes del núcleo de ruteo.
//!
//! Agrupa nombres de variables por defecto, textos de diagnóstico y tipos de
//! error que forman parte del contrato observable de los routers. Cambiar
//! estos valores afecta a los mensajes que ven los consumidores aguas abajo.

/// Nombre por defecto de la variable contador del foreach (1-based).
pub const DEFAULT_COUNTER_VARIABLE: &str = "counter";

/// Nombre por defecto de la variable que guarda el mensaje previo al split.
pub const DEFAULT_ROOT_MESSAGE_VARIABLE: &str = "rootMessage";

/// Descripción corta de un error de timeout de ruta.
pub const TIMEOUT_DESCRIPTION: &str = "Route Timeout";

/// Prefijo de la descripción detallada de un timeout; se completa con
/// `'<sequence>'`.
pub const TIMEOUT_DETAILED_DESCRIPTION_PREFIX: &str = "Timeout while processing route/part:";

/// Tipo de causa usado en los eventos de timeout sintetizados.
pub const TIMEOUT_CAUSE_KIND: &str = "TimeoutException";

/// Título del mensaje de `CompositeRoutingError`.
pub const COMPOSITE_MESSAGE_TITLE: &str = "Exception(s) were found for route(s): ";

/// Mensaje de validación cuando el foreach recibe un mapa sin expresión.
pub const MAP_NOT_SUPPORTED_MESSAGE: &str = "Foreach does not support map payloads with no collection expression. To iterate \
                                             over map entries provide an explicit split expression";

/// Namespace de los tipos de error emitidos por los routers.
pub const ROUTING_NAMESPACE: &str = "ROUTING";
